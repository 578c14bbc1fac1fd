use crate::{
    Builder, ClauseType, Entity, HookKind, OrmError, Result, Schema, Session, Value, count_from,
    delete_from, dispatch, insert_into, limit, order_by, select_from, update_set, values_of,
    where_clause,
};

/// Extra clauses of a [`Session::find_with`] query.
#[derive(Default, Debug, Clone, PartialEq, Eq)]
pub struct FindOptions {
    /// Column and descending flag.
    pub order_by: Option<(String, bool)>,
    pub limit: Option<u64>,
}

impl FindOptions {
    pub fn order_by(mut self, column: impl Into<String>, descending: bool) -> Self {
        self.order_by = Some((column.into(), descending));
        self
    }
    pub fn limit(mut self, limit: u64) -> Self {
        self.limit = Some(limit);
        self
    }
}

fn value_of<E: Entity>(schema: &Schema, value: &E, column: &str) -> Result<Value> {
    let attribute = schema.resolve::<E>(column)?;
    value.get(attribute).ok_or_else(|| {
        OrmError::MissingIdentifier {
            entity: E::type_name(),
            column: column.to_string(),
        }
        .into()
    })
}

fn push_where(builder: &mut Builder, condition: &str, params: impl IntoIterator<Item = Value>) {
    if !condition.is_empty() {
        builder.push(where_clause(condition, params.into_iter().collect()));
    }
}

impl Session {
    /// Inserts every value with a single statement and returns the last
    /// inserted rowid.
    ///
    /// `before_insert` runs on each value first, so changes it makes are
    /// persisted. Auto increment primary keys are left to the database.
    pub fn insert<E: Entity>(&mut self, values: &mut [E]) -> Result<i64> {
        if values.is_empty() {
            return Err(OrmError::EmptyInsert.into());
        }
        let schema = self.bound_schema_of::<E>()?;
        for value in values.iter_mut() {
            dispatch(value, HookKind::BeforeInsert)?;
        }
        let columns: Vec<&str> = schema.writable_fields().map(|f| f.name.as_str()).collect();
        if columns.is_empty() {
            return Err(OrmError::NoFields(schema.name.to_string()).into());
        }
        let rows = values
            .iter()
            .map(|value| {
                columns
                    .iter()
                    .map(|column| value_of(&schema, value, column))
                    .collect::<Result<Vec<_>>>()
            })
            .collect::<Result<Vec<_>>>()?;
        let mut builder = Builder::new();
        builder
            .push(insert_into(schema.table_name(), &columns))
            .push(values_of(rows));
        let (sql, params) = builder.build(&[ClauseType::Insert, ClauseType::Values]);
        let id = self
            .raw(&sql, params)
            .exec()?
            .last_affected_id
            .unwrap_or_default();
        for value in values.iter_mut() {
            dispatch(value, HookKind::AfterInsert)
                .map_err(|e| OrmError::after_hook(HookKind::AfterInsert, id, e))?;
        }
        Ok(id)
    }

    /// Appends to `dest` every row matching `condition` (all rows when empty).
    pub fn find<E: Entity>(
        &mut self,
        dest: &mut Vec<E>,
        condition: &str,
        params: impl IntoIterator<Item = Value>,
    ) -> Result<()> {
        self.find_with(dest, condition, params, FindOptions::default())
    }

    pub fn find_with<E: Entity>(
        &mut self,
        dest: &mut Vec<E>,
        condition: &str,
        params: impl IntoIterator<Item = Value>,
        options: FindOptions,
    ) -> Result<()> {
        let schema = self.bound_schema_of::<E>()?;
        self.prototype_hook(HookKind::BeforeQuery)?;
        let attributes = schema
            .fields
            .iter()
            .map(|f| schema.resolve::<E>(&f.name))
            .collect::<Result<Vec<_>>>()?;
        let columns: Vec<&str> = schema.field_names.iter().map(String::as_str).collect();
        let mut builder = Builder::new();
        builder.push(select_from(schema.table_name(), &columns, ""));
        push_where(&mut builder, condition, params);
        if let Some((column, descending)) = &options.order_by {
            builder.push(order_by(column, *descending));
        }
        if let Some(count) = options.limit {
            builder.push(limit(count));
        }
        let (sql, params) = builder.build(&[
            ClauseType::Select,
            ClauseType::Where,
            ClauseType::OrderBy,
            ClauseType::Limit,
        ]);
        let rows = self.raw(&sql, params).query_rows()?;
        for row in rows {
            let row = row?;
            let mut value = E::default();
            for (attribute, column) in attributes.iter().zip(row.values.into_vec()) {
                if !value.set(attribute, column)? {
                    return Err(OrmError::MissingIdentifier {
                        entity: E::type_name(),
                        column: attribute.to_string(),
                    }
                    .into());
                }
            }
            dispatch(&mut value, HookKind::AfterQuery)?;
            dest.push(value);
        }
        Ok(())
    }

    /// First row matching `condition`, if any.
    pub fn first<E: Entity>(
        &mut self,
        condition: &str,
        params: impl IntoIterator<Item = Value>,
    ) -> Result<Option<E>> {
        let mut result = Vec::with_capacity(1);
        self.find_with(&mut result, condition, params, FindOptions::default().limit(1))?;
        Ok(result.pop())
    }

    /// Writes every attribute of `value` to the rows matching `condition`
    /// (every row when empty) and returns the number of rows affected.
    pub fn update<E: Entity>(
        &mut self,
        value: &mut E,
        condition: &str,
        params: impl IntoIterator<Item = Value>,
    ) -> Result<u64> {
        let schema = self.bound_schema_of::<E>()?;
        dispatch(&mut *value, HookKind::BeforeUpdate)?;
        let mut assignments = Vec::with_capacity(schema.fields.len());
        for field in schema.writable_fields() {
            assignments.push((field.name.as_str(), value_of(&schema, &*value, &field.name)?));
        }
        if assignments.is_empty() {
            return Err(OrmError::NoFields(schema.name.to_string()).into());
        }
        let mut builder = Builder::new();
        builder.push(update_set(schema.table_name(), assignments));
        push_where(&mut builder, condition, params);
        let (sql, params) = builder.build(&[ClauseType::Update, ClauseType::Where]);
        let affected = self.raw(&sql, params).exec()?.rows_affected;
        dispatch(&mut *value, HookKind::AfterUpdate)
            .map_err(|e| OrmError::after_hook(HookKind::AfterUpdate, affected as i64, e))?;
        Ok(affected)
    }

    /// Deletes the rows matching `condition` (every row when empty).
    ///
    /// The delete hooks run on the value last passed to [`Session::model`].
    pub fn delete(
        &mut self,
        condition: &str,
        params: impl IntoIterator<Item = Value>,
    ) -> Result<u64> {
        let schema = self.bound_schema()?;
        self.prototype_hook(HookKind::BeforeDelete)?;
        let mut builder = Builder::new();
        builder.push(delete_from(schema.table_name()));
        push_where(&mut builder, condition, params);
        let (sql, params) = builder.build(&[ClauseType::Delete, ClauseType::Where]);
        let affected = self.raw(&sql, params).exec()?.rows_affected;
        self.prototype_hook(HookKind::AfterDelete)
            .map_err(|e| OrmError::after_hook(HookKind::AfterDelete, affected as i64, e))?;
        Ok(affected)
    }

    /// Number of rows matching `condition` (every row when empty).
    pub fn count(
        &mut self,
        condition: &str,
        params: impl IntoIterator<Item = Value>,
    ) -> Result<i64> {
        let schema = self.bound_schema()?;
        let mut builder = Builder::new();
        builder.push(count_from(schema.table_name()));
        push_where(&mut builder, condition, params);
        let (sql, params) = builder.build(&[ClauseType::Count, ClauseType::Where]);
        match self.raw(&sql, params).query_row()? {
            Some(row) => row.get::<i64>(0),
            None => Err(crate::Error::msg(format!(
                "Counting the rows of `{}` returned nothing",
                schema.table_name()
            ))),
        }
    }
}
