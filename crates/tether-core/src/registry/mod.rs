//! Type converter registries
//!
//! A registry answers "which converter handles this request" in either
//! direction:
//!
//! - [`ScanningTypeConverterRegistry`]: priority buckets scanned linearly,
//!   first accepting converter wins
//! - [`CachingTypeConverterRegistry`]: memoizes hits and misses of any
//!   other registry per distinct request
//!
//! Converters are found at startup through [`ConverterRegistration`]s
//! submitted with [`register_converter!`](crate::register_converter).

mod caching;
mod discovery;
mod scanning;

pub use caching::CachingTypeConverterRegistry;
pub use discovery::{construct_default, ConstructResult, ConverterCtor, ConverterRegistration};
pub use scanning::{ScanningRegistryBuilder, ScanningTypeConverterRegistry};

use std::sync::Arc;
use tether_sdk::{TypeClass, TypeConverter, TypeRef};

/// Registry errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RegistryError {
    /// A discovered converter could not be instantiated
    #[error("Failed to construct converter {converter}: {reason}")]
    Construction {
        /// Registration id of the converter
        converter: &'static str,
        /// Constructor failure
        reason: String,
    },
}

/// Registry result
pub type RegistryResult<T> = Result<T, RegistryError>;

/// Converter lookup in both directions
pub trait ConverterRegistry: Send + Sync {
    /// Find a converter from `native` values to `managed` objects
    fn find_converter(
        &self,
        native: &'static TypeClass,
        managed: &TypeRef,
    ) -> Option<Arc<dyn TypeConverter>>;

    /// Find a converter from `managed` objects to any native value
    fn find_native_converter(&self, managed: &TypeRef) -> Option<Arc<dyn TypeConverter>>;
}

impl<R: ConverterRegistry + ?Sized> ConverterRegistry for Arc<R> {
    fn find_converter(
        &self,
        native: &'static TypeClass,
        managed: &TypeRef,
    ) -> Option<Arc<dyn TypeConverter>> {
        (**self).find_converter(native, managed)
    }

    fn find_native_converter(&self, managed: &TypeRef) -> Option<Arc<dyn TypeConverter>> {
        (**self).find_native_converter(managed)
    }
}
