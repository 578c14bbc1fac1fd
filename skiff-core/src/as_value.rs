use crate::{Error, Result, Value, truncate_long};
use anyhow::Context;
use std::{any, borrow::Cow, sync::Arc};
use time::{
    OffsetDateTime, PrimitiveDateTime, format_description::BorrowedFormatItem,
    format_description::well_known::Rfc3339, macros::format_description,
};
use uuid::Uuid;

/// Text layout used to store `PrimitiveDateTime` in backends without a native type.
pub const TIMESTAMP_FORMAT: &[BorrowedFormatItem<'static>] =
    format_description!("[year]-[month]-[day] [hour]:[minute]:[second].[subsecond]");
const TIMESTAMP_FORMAT_SHORT: &[BorrowedFormatItem<'static>] =
    format_description!("[year]-[month]-[day] [hour]:[minute]:[second]");

/// Conversion between native Rust types and the dynamically typed [`Value`].
///
/// Every attribute of an entity must implement it: the derive macro uses
/// `as_empty_value` as the column type prototype, `as_value` to produce query
/// parameters and `try_from_value` to decode result columns.
///
/// # Conversion contract
/// - `try_from_value` accepts the canonical variant for the type and any other
///   integer variant as long as the number fits, returning an error otherwise.
/// - Drivers may hand back text for types they store as text (date-times,
///   unknown kinds), implementations parse it.
///
/// # Custom types
/// Types the core does not know about can map themselves onto
/// `Value::Unknown`, they are stored as generic text:
/// ```rust
/// use skiff_core::{AsValue, Result, Value};
/// #[derive(Clone)]
/// struct Email(String);
/// impl AsValue for Email {
///     fn as_empty_value() -> Value {
///         Value::Unknown(None)
///     }
///     fn as_value(self) -> Value {
///         Value::Unknown(Some(self.0))
///     }
///     fn try_from_value(value: Value) -> Result<Self> {
///         String::try_from_value(value).map(Email)
///     }
/// }
/// ```
pub trait AsValue {
    /// The typed NULL for this type, used as column type prototype.
    fn as_empty_value() -> Value;
    /// Convert into an owned [`Value`].
    fn as_value(self) -> Value;
    /// Attempt to convert a dynamic [`Value`] into `Self`.
    fn try_from_value(value: Value) -> Result<Self>
    where
        Self: Sized;
}

impl<T: AsValue> From<T> for Value {
    fn from(value: T) -> Self {
        value.as_value()
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::Varchar(Some(value.into()))
    }
}

fn conversion_error<T>(value: &Value) -> Error {
    Error::msg(format!(
        "Cannot convert {:?} to {}",
        value,
        any::type_name::<T>()
    ))
}

/// Any integer variant widened to `i128`, booleans count as 0 and 1.
fn integer_of(value: &Value) -> Option<i128> {
    Some(match value {
        Value::Boolean(Some(v)) => *v as i128,
        Value::Int8(Some(v)) => *v as i128,
        Value::Int16(Some(v)) => *v as i128,
        Value::Int32(Some(v)) => *v as i128,
        Value::Int64(Some(v)) => *v as i128,
        Value::UInt8(Some(v)) => *v as i128,
        Value::UInt16(Some(v)) => *v as i128,
        Value::UInt32(Some(v)) => *v as i128,
        Value::UInt64(Some(v)) => *v as i128,
        _ => return None,
    })
}

macro_rules! impl_as_value_integer {
    ($source:ty, $destination:path) => {
        impl AsValue for $source {
            fn as_empty_value() -> Value {
                $destination(None)
            }
            fn as_value(self) -> Value {
                $destination(Some(self as _))
            }
            fn try_from_value(value: Value) -> Result<Self> {
                if let Some(v) = integer_of(&value) {
                    return <$source>::try_from(v).map_err(|_| {
                        Error::msg(format!(
                            "Value {v} is out of range for {}",
                            any::type_name::<Self>(),
                        ))
                    });
                }
                match value {
                    Value::Varchar(Some(ref v)) | Value::Unknown(Some(ref v)) => v
                        .trim()
                        .parse::<$source>()
                        .with_context(|| {
                            format!(
                                "Cannot parse `{}` as {}",
                                truncate_long!(v),
                                any::type_name::<Self>()
                            )
                        }),
                    _ => Err(conversion_error::<Self>(&value)),
                }
            }
        }
    };
}
impl_as_value_integer!(i8, Value::Int8);
impl_as_value_integer!(i16, Value::Int16);
impl_as_value_integer!(i32, Value::Int32);
impl_as_value_integer!(i64, Value::Int64);
impl_as_value_integer!(isize, Value::Int64);
impl_as_value_integer!(u8, Value::UInt8);
impl_as_value_integer!(u16, Value::UInt16);
impl_as_value_integer!(u32, Value::UInt32);
impl_as_value_integer!(u64, Value::UInt64);
impl_as_value_integer!(usize, Value::UInt64);

impl AsValue for bool {
    fn as_empty_value() -> Value {
        Value::Boolean(None)
    }
    fn as_value(self) -> Value {
        Value::Boolean(Some(self))
    }
    fn try_from_value(value: Value) -> Result<Self> {
        if let Some(v) = integer_of(&value) {
            return Ok(v != 0);
        }
        match value {
            Value::Varchar(Some(ref v)) | Value::Unknown(Some(ref v)) => match v.trim() {
                x if x.eq_ignore_ascii_case("true") || x == "1" => Ok(true),
                x if x.eq_ignore_ascii_case("false") || x == "0" => Ok(false),
                _ => Err(Error::msg(format!("Cannot parse boolean from `{v}`"))),
            },
            _ => Err(conversion_error::<Self>(&value)),
        }
    }
}

macro_rules! impl_as_value_float {
    ($source:ty, $destination:path) => {
        impl AsValue for $source {
            fn as_empty_value() -> Value {
                $destination(None)
            }
            fn as_value(self) -> Value {
                $destination(Some(self))
            }
            fn try_from_value(value: Value) -> Result<Self> {
                match value {
                    Value::Float32(Some(v)) => Ok(v as _),
                    Value::Float64(Some(v)) => Ok(v as _),
                    Value::Varchar(Some(ref v)) | Value::Unknown(Some(ref v)) => v
                        .trim()
                        .parse::<$source>()
                        .with_context(|| format!("Cannot parse `{}` as a float", truncate_long!(v))),
                    ref v => match integer_of(v) {
                        Some(v) => Ok(v as _),
                        None => Err(conversion_error::<Self>(&value)),
                    },
                }
            }
        }
    };
}
impl_as_value_float!(f32, Value::Float32);
impl_as_value_float!(f64, Value::Float64);

impl AsValue for String {
    fn as_empty_value() -> Value {
        Value::Varchar(None)
    }
    fn as_value(self) -> Value {
        Value::Varchar(Some(self))
    }
    fn try_from_value(value: Value) -> Result<Self> {
        match value {
            Value::Varchar(Some(v)) | Value::Unknown(Some(v)) => Ok(v),
            Value::Blob(Some(v)) => String::from_utf8(v.into_vec())
                .context("The blob value is not valid UTF-8 text"),
            _ => Err(conversion_error::<Self>(&value)),
        }
    }
}

impl<'a> AsValue for Cow<'a, str> {
    fn as_empty_value() -> Value {
        Value::Varchar(None)
    }
    fn as_value(self) -> Value {
        Value::Varchar(Some(self.into_owned()))
    }
    fn try_from_value(value: Value) -> Result<Self> {
        String::try_from_value(value).map(Cow::Owned)
    }
}

impl AsValue for Box<[u8]> {
    fn as_empty_value() -> Value {
        Value::Blob(None)
    }
    fn as_value(self) -> Value {
        Value::Blob(Some(self))
    }
    fn try_from_value(value: Value) -> Result<Self> {
        match value {
            Value::Blob(Some(v)) => Ok(v),
            Value::Varchar(Some(v)) => Ok(v.into_bytes().into_boxed_slice()),
            _ => Err(conversion_error::<Self>(&value)),
        }
    }
}

impl AsValue for Vec<u8> {
    fn as_empty_value() -> Value {
        Value::Blob(None)
    }
    fn as_value(self) -> Value {
        Value::Blob(Some(self.into_boxed_slice()))
    }
    fn try_from_value(value: Value) -> Result<Self> {
        Box::<[u8]>::try_from_value(value).map(Into::into)
    }
}

impl<const N: usize> AsValue for [u8; N] {
    fn as_empty_value() -> Value {
        Value::Blob(None)
    }
    fn as_value(self) -> Value {
        Value::Blob(Some(self.to_vec().into_boxed_slice()))
    }
    fn try_from_value(value: Value) -> Result<Self> {
        let bytes = Box::<[u8]>::try_from_value(value)?;
        let len = bytes.len();
        <[u8; N]>::try_from(bytes.as_ref())
            .map_err(|_| Error::msg(format!("Expected {N} bytes but the value has {len}")))
    }
}

impl AsValue for PrimitiveDateTime {
    fn as_empty_value() -> Value {
        Value::Timestamp(None)
    }
    fn as_value(self) -> Value {
        Value::Timestamp(Some(self))
    }
    fn try_from_value(value: Value) -> Result<Self> {
        match value {
            Value::Timestamp(Some(v)) => Ok(v),
            Value::TimestampWithTimezone(Some(v)) => Ok(PrimitiveDateTime::new(v.date(), v.time())),
            Value::Varchar(Some(ref v)) | Value::Unknown(Some(ref v)) => {
                PrimitiveDateTime::parse(v, TIMESTAMP_FORMAT)
                    .or_else(|_| PrimitiveDateTime::parse(v, TIMESTAMP_FORMAT_SHORT))
                    .with_context(|| format!("Cannot parse `{}` as a timestamp", truncate_long!(v)))
            }
            _ => Err(conversion_error::<Self>(&value)),
        }
    }
}

impl AsValue for OffsetDateTime {
    fn as_empty_value() -> Value {
        Value::TimestampWithTimezone(None)
    }
    fn as_value(self) -> Value {
        Value::TimestampWithTimezone(Some(self))
    }
    fn try_from_value(value: Value) -> Result<Self> {
        match value {
            Value::TimestampWithTimezone(Some(v)) => Ok(v),
            Value::Timestamp(Some(v)) => Ok(v.assume_utc()),
            Value::Varchar(Some(ref v)) | Value::Unknown(Some(ref v)) => {
                OffsetDateTime::parse(v, &Rfc3339).with_context(|| {
                    format!(
                        "Cannot parse `{}` as a RFC3339 timestamp",
                        truncate_long!(v)
                    )
                })
            }
            _ => Err(conversion_error::<Self>(&value)),
        }
    }
}

impl AsValue for Uuid {
    fn as_empty_value() -> Value {
        Value::Uuid(None)
    }
    fn as_value(self) -> Value {
        Value::Uuid(Some(self))
    }
    fn try_from_value(value: Value) -> Result<Self> {
        match value {
            Value::Uuid(Some(v)) => Ok(v),
            Value::Blob(Some(v)) => Uuid::from_slice(&v).context("Invalid uuid bytes"),
            Value::Varchar(Some(ref v)) | Value::Unknown(Some(ref v)) => {
                Uuid::parse_str(v).with_context(|| format!("Cannot parse `{v}` as a uuid"))
            }
            _ => Err(conversion_error::<Self>(&value)),
        }
    }
}

impl<T: AsValue> AsValue for Option<T> {
    fn as_empty_value() -> Value {
        T::as_empty_value()
    }
    fn as_value(self) -> Value {
        match self {
            Some(v) => v.as_value(),
            None => T::as_empty_value(),
        }
    }
    fn try_from_value(value: Value) -> Result<Self> {
        Ok(if value.is_null() {
            None
        } else {
            Some(<T as AsValue>::try_from_value(value)?)
        })
    }
}

impl<T: AsValue> AsValue for Box<T> {
    fn as_empty_value() -> Value {
        T::as_empty_value()
    }
    fn as_value(self) -> Value {
        (*self).as_value()
    }
    fn try_from_value(value: Value) -> Result<Self> {
        Ok(Self::new(<T as AsValue>::try_from_value(value)?))
    }
}

impl<T: AsValue + Clone> AsValue for Arc<T> {
    fn as_empty_value() -> Value {
        T::as_empty_value()
    }
    fn as_value(self) -> Value {
        Arc::unwrap_or_clone(self).as_value()
    }
    fn try_from_value(value: Value) -> Result<Self> {
        Ok(Self::new(<T as AsValue>::try_from_value(value)?))
    }
}
