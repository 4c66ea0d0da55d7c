//! Managed object references
//!
//! The foreign caller cannot hold managed objects directly. A [`ManagedRef`]
//! is the runtime's shared reference to one; its [`identity`](ManagedRef::identity)
//! is what the handle heap keys on, never the object's value.

use std::any::Any;
use std::fmt;
use std::sync::Arc;

/// Shared reference to a managed object
#[derive(Clone)]
pub struct ManagedRef(Arc<dyn Any + Send + Sync>);

impl ManagedRef {
    /// Allocate a new managed object
    pub fn new<T: Any + Send + Sync>(value: T) -> Self {
        ManagedRef(Arc::new(value))
    }

    /// Wrap an existing shared object
    pub fn from_arc(object: Arc<dyn Any + Send + Sync>) -> Self {
        ManagedRef(object)
    }

    /// Address of the referenced object
    ///
    /// Stable for as long as any clone of this reference is alive.
    pub fn identity(&self) -> usize {
        Arc::as_ptr(&self.0) as *const () as usize
    }

    /// Check whether both references point at the same object
    pub fn ptr_eq(&self, other: &ManagedRef) -> bool {
        self.identity() == other.identity()
    }

    /// Borrow the object as a concrete type
    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.0.downcast_ref::<T>()
    }

    /// Check the concrete type of the object
    pub fn is<T: Any>(&self) -> bool {
        self.0.is::<T>()
    }

    /// Get the underlying shared object
    pub fn as_arc(&self) -> &Arc<dyn Any + Send + Sync> {
        &self.0
    }
}

impl fmt::Debug for ManagedRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ManagedRef({:#x})", self.identity())
    }
}
