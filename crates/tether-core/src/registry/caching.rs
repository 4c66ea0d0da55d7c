//! Memoizing registry decorator
//!
//! The same boundary function is called many times with the same declared
//! types, so almost every lookup repeats an earlier one. Results are cached
//! per distinct request, misses included, and never evicted: the converter
//! set is fixed once the inner registry is built.

use super::ConverterRegistry;
use dashmap::DashMap;
use rustc_hash::FxBuildHasher;
use std::sync::Arc;
use tether_sdk::{TypeClass, TypeConverter, TypeMapping, TypeRef};
use tracing::trace;

#[derive(Clone)]
enum CacheSlot {
    Found(Arc<dyn TypeConverter>),
    Absent,
}

impl CacheSlot {
    fn converter(&self) -> Option<Arc<dyn TypeConverter>> {
        match self {
            CacheSlot::Found(converter) => Some(Arc::clone(converter)),
            CacheSlot::Absent => None,
        }
    }
}

impl From<Option<Arc<dyn TypeConverter>>> for CacheSlot {
    fn from(converter: Option<Arc<dyn TypeConverter>>) -> Self {
        match converter {
            Some(converter) => CacheSlot::Found(converter),
            None => CacheSlot::Absent,
        }
    }
}

/// Registry that caches another registry's answers
pub struct CachingTypeConverterRegistry<R> {
    inner: R,
    to_managed: DashMap<TypeMapping, CacheSlot, FxBuildHasher>,
    to_native: DashMap<TypeRef, CacheSlot, FxBuildHasher>,
}

impl<R: ConverterRegistry> CachingTypeConverterRegistry<R> {
    /// Wrap a registry
    pub fn new(inner: R) -> Self {
        Self {
            inner,
            to_managed: DashMap::with_hasher(FxBuildHasher),
            to_native: DashMap::with_hasher(FxBuildHasher),
        }
    }

    /// Get the wrapped registry
    pub fn inner(&self) -> &R {
        &self.inner
    }

    /// Number of cached requests, hits and misses together
    pub fn cached_entries(&self) -> usize {
        self.to_managed.len() + self.to_native.len()
    }
}

impl<R: ConverterRegistry> ConverterRegistry for CachingTypeConverterRegistry<R> {
    fn find_converter(
        &self,
        native: &'static TypeClass,
        managed: &TypeRef,
    ) -> Option<Arc<dyn TypeConverter>> {
        let request = TypeMapping::to_managed(native, managed.clone());
        if let Some(slot) = self.to_managed.get(&request) {
            return slot.converter();
        }

        trace!(%request, "converter cache miss");
        let slot = CacheSlot::from(self.inner.find_converter(native, managed));
        // A racing miss may have stored first; both computed the same answer
        self.to_managed.entry(request).or_insert(slot).converter()
    }

    fn find_native_converter(&self, managed: &TypeRef) -> Option<Arc<dyn TypeConverter>> {
        if let Some(slot) = self.to_native.get(managed) {
            return slot.converter();
        }

        trace!(%managed, "native converter cache miss");
        let slot = CacheSlot::from(self.inner.find_native_converter(managed));
        self.to_native
            .entry(managed.clone())
            .or_insert(slot)
            .converter()
    }
}

impl<R> std::fmt::Debug for CachingTypeConverterRegistry<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CachingTypeConverterRegistry")
            .field("to_managed", &self.to_managed.len())
            .field("to_native", &self.to_native.len())
            .finish()
    }
}
