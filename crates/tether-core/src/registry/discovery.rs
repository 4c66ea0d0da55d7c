//! Converter discovery
//!
//! Each converter crate submits a [`ConverterRegistration`] through
//! `inventory`. The scanning registry collects all submissions at startup,
//! orders them by id and instantiates each one.

use super::{RegistryError, RegistryResult};
use crate::context::MarshalContext;
use std::sync::Arc;
use tether_sdk::TypeConverter;
use tracing::error;

/// Result of a converter constructor
pub type ConstructResult = Result<Arc<dyn TypeConverter>, String>;

/// How to build a converter
#[derive(Clone, Copy)]
pub enum ConverterCtor {
    /// No arguments
    Default(fn() -> ConstructResult),

    /// Receives the shared marshaling context
    WithContext(fn(&MarshalContext) -> ConstructResult),
}

/// Converter submitted for discovery
pub struct ConverterRegistration {
    /// Unique id; also fixes the discovery order
    pub id: &'static str,

    /// Constructor
    pub construct: ConverterCtor,
}

inventory::collect!(ConverterRegistration);

impl ConverterRegistration {
    /// Build the converter
    pub fn instantiate(&self, ctx: &MarshalContext) -> RegistryResult<Arc<dyn TypeConverter>> {
        let result = match self.construct {
            ConverterCtor::Default(construct) => construct(),
            ConverterCtor::WithContext(construct) => construct(ctx),
        };
        result.map_err(|reason| {
            error!(converter = self.id, %reason, "converter construction failed");
            RegistryError::Construction {
                converter: self.id,
                reason,
            }
        })
    }

    /// All submitted registrations, in discovery order
    pub fn discovered() -> Vec<&'static ConverterRegistration> {
        let mut found = Vec::new();
        for registration in inventory::iter::<ConverterRegistration> {
            found.push(registration);
        }
        found.sort_by_key(|registration| registration.id);
        found
    }
}

impl std::fmt::Debug for ConverterRegistration {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let kind = match self.construct {
            ConverterCtor::Default(_) => "default",
            ConverterCtor::WithContext(_) => "with_context",
        };
        f.debug_struct("ConverterRegistration")
            .field("id", &self.id)
            .field("construct", &kind)
            .finish()
    }
}

/// Constructor for converters implementing `Default`
pub fn construct_default<T>() -> ConstructResult
where
    T: TypeConverter + Default + 'static,
{
    Ok(Arc::new(T::default()))
}

/// Submit a converter for discovery
///
/// ```ignore
/// register_converter!(NumberConverter);
/// register_converter!(HandleConverter, with_context = HandleConverter::construct);
/// ```
#[macro_export]
macro_rules! register_converter {
    ($ty:ty, with_context = $ctor:path) => {
        $crate::inventory::submit! {
            $crate::registry::ConverterRegistration {
                id: concat!(module_path!(), "::", stringify!($ty)),
                construct: $crate::registry::ConverterCtor::WithContext($ctor),
            }
        }
    };
    ($ty:ty) => {
        $crate::inventory::submit! {
            $crate::registry::ConverterRegistration {
                id: concat!(module_path!(), "::", stringify!($ty)),
                construct: $crate::registry::ConverterCtor::Default(
                    $crate::registry::construct_default::<$ty>,
                ),
            }
        }
    };
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::heap::HandleHeap;

    fn failing() -> ConstructResult {
        Err("missing native library".to_string())
    }

    #[test]
    fn test_instantiate_failure_names_converter() {
        let ctx = MarshalContext::new(Arc::new(HandleHeap::with_seed(1)));
        let registration = ConverterRegistration {
            id: "tests::Failing",
            construct: ConverterCtor::Default(failing),
        };

        let err = registration.instantiate(&ctx).unwrap_err();
        assert_eq!(
            err,
            RegistryError::Construction {
                converter: "tests::Failing",
                reason: "missing native library".to_string(),
            }
        );
        assert!(err.to_string().contains("tests::Failing"));
    }

    #[test]
    fn test_discovered_is_sorted() {
        let found = ConverterRegistration::discovered();
        assert!(!found.is_empty());
        assert!(found.windows(2).all(|pair| pair[0].id <= pair[1].id));
    }
}
