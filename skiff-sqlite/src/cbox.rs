use std::ops::{Deref, DerefMut};

pub(crate) trait NullCheck {
    fn is_null(&self) -> bool;
}

impl<T> NullCheck for *const T {
    fn is_null(&self) -> bool {
        (*self as *const T).is_null()
    }
}

impl<T> NullCheck for *mut T {
    fn is_null(&self) -> bool {
        (*self as *const T).is_null()
    }
}

/// Owns a pointer handed out by sqlite and releases it on drop.
#[derive(Debug)]
pub(crate) struct CBox<T: NullCheck> {
    pub(crate) ptr: T,
    dealloc: fn(T),
}

impl<T: NullCheck> CBox<T> {
    pub fn new(ptr: T, dealloc: fn(T)) -> Self {
        Self { ptr, dealloc }
    }
}

impl<T: NullCheck> Drop for CBox<T> {
    fn drop(&mut self) {
        if !NullCheck::is_null(&self.ptr) {
            unsafe {
                (self.dealloc)(std::ptr::read(&self.ptr as *const T));
            }
        }
    }
}

impl<T: NullCheck> Deref for CBox<T> {
    type Target = T;

    fn deref(&self) -> &Self::Target {
        &self.ptr
    }
}

impl<T: NullCheck> DerefMut for CBox<T> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.ptr
    }
}

unsafe impl<T: NullCheck> Send for CBox<T> {}
unsafe impl<T: NullCheck> Sync for CBox<T> {}

#[cfg(test)]
mod tests {
    use crate::cbox::CBox;
    use std::{
        ptr,
        sync::atomic::{AtomicBool, Ordering},
    };

    #[test]
    fn cbox_raw_pointer() {
        static DESTROYED: AtomicBool = AtomicBool::new(false);
        let v = 123;
        let ptr: *const i32 = &v;
        {
            let ptr = CBox::new(ptr::null::<i32>(), |_| DESTROYED.store(true, Ordering::Relaxed));
            assert_eq!(*ptr, ptr::null());
        }
        assert!(!DESTROYED.load(Ordering::Relaxed));
        {
            let ptr = CBox::new(ptr, |_| DESTROYED.store(true, Ordering::Relaxed));
            assert_eq!(unsafe { **ptr }, 123);
            assert!(!DESTROYED.load(Ordering::Relaxed));
        }
        assert!(DESTROYED.load(Ordering::Relaxed));
    }
}
