use std::fmt;
use std::sync::{Arc, Weak};

/// Non-owning reference to a registered value.
///
/// Holding a `WeakHandle` never keeps the referent alive; once every `Arc`
/// elsewhere is dropped the handle turns empty on its own.
pub struct WeakHandle<T: ?Sized> {
    value: Weak<T>,
}

impl<T: ?Sized> WeakHandle<T> {
    pub fn new(value: &Arc<T>) -> Self {
        Self {
            value: Arc::downgrade(value),
        }
    }
    pub fn from_weak(value: Weak<T>) -> Self {
        Self { value }
    }
    /// Returns the referent if it is still alive.
    pub fn get(&self) -> Option<Arc<T>> {
        self.value.upgrade()
    }
    pub fn is_empty(&self) -> bool {
        self.value.strong_count() == 0
    }
    /// Whether the live referent is exactly `other`.
    pub fn refers_to(&self, other: &Arc<T>) -> bool {
        self.get().is_some_and(|it| Arc::ptr_eq(&it, other))
    }
}

/// Two handles are equal when their live referents are the same object, or
/// when both are empty.
impl<T: ?Sized> PartialEq for WeakHandle<T> {
    fn eq(&self, other: &Self) -> bool {
        match (self.get(), other.get()) {
            (Some(lhs), Some(rhs)) => Arc::ptr_eq(&lhs, &rhs),
            (None, None) => true,
            _ => false,
        }
    }
}

impl<T: ?Sized> fmt::Debug for WeakHandle<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WeakHandle")
            .field("alive", &!self.is_empty())
            .finish()
    }
}
