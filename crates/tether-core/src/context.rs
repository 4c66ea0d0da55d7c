//! Shared marshaling context
//!
//! Built once when the bridge starts and handed to converter constructors
//! that need runtime services. Nothing in this crate reaches it through a
//! global.

use crate::heap::HandleHeap;
use std::sync::Arc;

/// Services available to converters at construction
#[derive(Clone, Debug)]
pub struct MarshalContext {
    heap: Arc<HandleHeap>,
}

impl MarshalContext {
    /// Create a context around a heap
    pub fn new(heap: Arc<HandleHeap>) -> Self {
        Self { heap }
    }

    /// Get the handle heap
    pub fn heap(&self) -> &Arc<HandleHeap> {
        &self.heap
    }
}
