//! Priority-ordered converter scan
//!
//! Converters are bucketed by priority. A lookup walks the buckets from the
//! highest priority down and, inside a bucket, in registration order; the
//! first converter whose declared mapping accepts the request wins. There is
//! no search for a most specific match.

use super::discovery::ConverterRegistration;
use super::{ConverterRegistry, RegistryResult};
use crate::context::MarshalContext;
use std::cmp::Reverse;
use std::collections::BTreeMap;
use std::sync::Arc;
use tether_sdk::{TypeClass, TypeConverter, TypeMapping, TypeRef};
use tracing::info;

type Buckets = BTreeMap<Reverse<i32>, Vec<Arc<dyn TypeConverter>>>;

/// Immutable registry scanned on every lookup
#[derive(Clone)]
pub struct ScanningTypeConverterRegistry {
    buckets: Arc<Buckets>,
    len: usize,
}

impl ScanningTypeConverterRegistry {
    /// Create a registry builder
    pub fn builder() -> ScanningRegistryBuilder {
        ScanningRegistryBuilder {
            buckets: BTreeMap::new(),
            len: 0,
        }
    }

    /// Instantiate every discovered converter
    ///
    /// Fails on the first converter that cannot be constructed; no partially
    /// populated registry is ever returned.
    pub fn discover(ctx: &MarshalContext) -> RegistryResult<Self> {
        Self::from_registrations(ConverterRegistration::discovered(), ctx)
    }

    /// Instantiate converters from explicit registrations, in the given order
    pub fn from_registrations<'a, I>(registrations: I, ctx: &MarshalContext) -> RegistryResult<Self>
    where
        I: IntoIterator<Item = &'a ConverterRegistration>,
    {
        let mut builder = Self::builder();
        for registration in registrations {
            builder = builder.register(registration.instantiate(ctx)?);
        }
        let registry = builder.build();
        info!(
            converters = registry.len(),
            priorities = registry.buckets.len(),
            "converter registry ready"
        );
        Ok(registry)
    }

    /// Number of converters
    pub fn len(&self) -> usize {
        self.len
    }

    /// Check if the registry has no converters
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Iterate over converters in scan order
    pub fn iter(&self) -> impl Iterator<Item = &Arc<dyn TypeConverter>> + '_ {
        self.buckets.values().flatten()
    }

    fn scan<F>(&self, mut accepts: F) -> Option<Arc<dyn TypeConverter>>
    where
        F: FnMut(&dyn TypeConverter) -> bool,
    {
        for converter in self.iter() {
            if accepts(&**converter) {
                return Some(Arc::clone(converter));
            }
        }
        None
    }
}

impl ConverterRegistry for ScanningTypeConverterRegistry {
    fn find_converter(
        &self,
        native: &'static TypeClass,
        managed: &TypeRef,
    ) -> Option<Arc<dyn TypeConverter>> {
        let request = TypeMapping::to_managed(native, managed.clone());
        self.scan(|converter| converter.to_managed_mapping().accepts(&request))
    }

    fn find_native_converter(&self, managed: &TypeRef) -> Option<Arc<dyn TypeConverter>> {
        self.scan(|converter| converter.to_native_mapping().accepts_managed(managed))
    }
}

impl std::fmt::Debug for ScanningTypeConverterRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list()
            .entries(self.iter().map(|converter| (converter.priority(), converter.name())))
            .finish()
    }
}

/// Builder for ScanningTypeConverterRegistry
///
/// The registry only exists once built, and never changes afterwards.
pub struct ScanningRegistryBuilder {
    buckets: Buckets,
    len: usize,
}

impl ScanningRegistryBuilder {
    /// Register a converter after those already registered at its priority
    pub fn register(mut self, converter: Arc<dyn TypeConverter>) -> Self {
        self.buckets
            .entry(Reverse(converter.priority()))
            .or_default()
            .push(converter);
        self.len += 1;
        self
    }

    /// Register several converters in order
    pub fn register_all<I>(self, converters: I) -> Self
    where
        I: IntoIterator<Item = Arc<dyn TypeConverter>>,
    {
        converters
            .into_iter()
            .fold(self, |builder, converter| builder.register(converter))
    }

    /// Build the registry
    pub fn build(self) -> ScanningTypeConverterRegistry {
        ScanningTypeConverterRegistry {
            buckets: Arc::new(self.buckets),
            len: self.len,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::heap::HandleHeap;
    use crate::registry::{ConstructResult, ConverterCtor, RegistryError};
    use tether_sdk::types::{
        DOUBLE, INTEGER, NATIVE_BOOL, NATIVE_NUMBER, NATIVE_VALUE, NUMBER, OBJECT, STRING,
    };
    use tether_sdk::{ConvertError, ConvertResult, ManagedRef, NativeValue};

    struct Stub {
        name: &'static str,
        priority: i32,
        to_managed: TypeMapping,
        to_native: TypeMapping,
    }

    impl Stub {
        fn arc(
            name: &'static str,
            priority: i32,
            native: &'static TypeClass,
            managed: &'static TypeClass,
        ) -> Arc<dyn TypeConverter> {
            Arc::new(Stub {
                name,
                priority,
                to_managed: TypeMapping::to_managed(native, managed),
                to_native: TypeMapping::to_native(managed, native),
            })
        }
    }

    impl TypeConverter for Stub {
        fn name(&self) -> &'static str {
            self.name
        }

        fn priority(&self) -> i32 {
            self.priority
        }

        fn to_managed_mapping(&self) -> &TypeMapping {
            &self.to_managed
        }

        fn to_native_mapping(&self) -> &TypeMapping {
            &self.to_native
        }

        fn to_managed(&self, value: &NativeValue, _target: &TypeRef) -> ConvertResult<ManagedRef> {
            Err(ConvertError::mismatch(self.name, value.type_name()))
        }

        fn to_native(&self, _object: &ManagedRef) -> ConvertResult<NativeValue> {
            Ok(NativeValue::Nil)
        }
    }

    fn found(converter: Option<Arc<dyn TypeConverter>>) -> Option<&'static str> {
        converter.map(|converter| converter.name())
    }

    #[test]
    fn test_higher_priority_wins() {
        let registry = ScanningTypeConverterRegistry::builder()
            .register(Stub::arc("low", 10, &NATIVE_NUMBER, &DOUBLE))
            .register(Stub::arc("high", 20, &NATIVE_NUMBER, &DOUBLE))
            .build();

        let double = TypeRef::of(&DOUBLE);
        assert_eq!(found(registry.find_converter(&NATIVE_NUMBER, &double)), Some("high"));
        assert_eq!(found(registry.find_native_converter(&double)), Some("high"));
    }

    #[test]
    fn test_ties_break_by_registration_order() {
        let registry = ScanningTypeConverterRegistry::builder()
            .register(Stub::arc("first", 0, &NATIVE_NUMBER, &NUMBER))
            .register(Stub::arc("second", 0, &NATIVE_NUMBER, &DOUBLE))
            .build();

        let double = TypeRef::of(&DOUBLE);
        assert_eq!(found(registry.find_converter(&NATIVE_NUMBER, &double)), Some("first"));
    }

    #[test]
    fn test_native_lookup_skips_wrong_direction() {
        let misdeclared: Arc<dyn TypeConverter> = Arc::new(Stub {
            name: "misdeclared",
            priority: 50,
            to_managed: TypeMapping::to_managed(&NATIVE_NUMBER, &NUMBER),
            to_native: TypeMapping::to_managed(&NATIVE_NUMBER, &NUMBER),
        });
        let registry = ScanningTypeConverterRegistry::builder()
            .register(misdeclared)
            .register(Stub::arc("number", 0, &NATIVE_NUMBER, &DOUBLE))
            .build();

        let double = TypeRef::of(&DOUBLE);
        assert_eq!(found(registry.find_native_converter(&double)), Some("number"));
    }

    #[test]
    fn test_first_hit_not_most_specific() {
        let registry = ScanningTypeConverterRegistry::builder()
            .register(Stub::arc("anything", 5, &NATIVE_VALUE, &OBJECT))
            .register(Stub::arc("exact", 1, &NATIVE_NUMBER, &DOUBLE))
            .build();

        let double = TypeRef::of(&DOUBLE);
        assert_eq!(found(registry.find_converter(&NATIVE_NUMBER, &double)), Some("anything"));
    }

    #[test]
    fn test_narrow_converter_does_not_serve_broad_request() {
        let registry = ScanningTypeConverterRegistry::builder()
            .register(Stub::arc("double", 0, &NATIVE_NUMBER, &DOUBLE))
            .build();

        let number = TypeRef::of(&NUMBER);
        assert!(registry.find_converter(&NATIVE_NUMBER, &number).is_none());
        assert!(registry.find_native_converter(&number).is_none());
    }

    #[test]
    fn test_miss() {
        let registry = ScanningTypeConverterRegistry::builder()
            .register(Stub::arc("number", 0, &NATIVE_NUMBER, &NUMBER))
            .build();

        assert!(registry.find_converter(&NATIVE_BOOL, &TypeRef::of(&INTEGER)).is_none());
        assert!(registry.find_native_converter(&TypeRef::of(&STRING)).is_none());
    }

    #[test]
    fn test_iter_in_scan_order() {
        let registry = ScanningTypeConverterRegistry::builder()
            .register_all(vec![
                Stub::arc("a", 0, &NATIVE_NUMBER, &DOUBLE),
                Stub::arc("b", 3, &NATIVE_NUMBER, &DOUBLE),
                Stub::arc("c", -1, &NATIVE_NUMBER, &DOUBLE),
                Stub::arc("d", 3, &NATIVE_NUMBER, &DOUBLE),
            ])
            .build();

        let names: Vec<_> = registry.iter().map(|c| c.name()).collect();
        assert_eq!(names, vec!["b", "d", "a", "c"]);
        assert_eq!(registry.len(), 4);
    }

    fn construct_ok() -> ConstructResult {
        Ok(Stub::arc("ok", 0, &NATIVE_NUMBER, &DOUBLE))
    }

    fn construct_with_context(ctx: &MarshalContext) -> ConstructResult {
        assert!(ctx.heap().is_empty());
        Ok(Stub::arc("ctx", 1, &NATIVE_NUMBER, &DOUBLE))
    }

    fn construct_broken() -> ConstructResult {
        Err("no default state".to_string())
    }

    #[test]
    fn test_from_registrations() {
        let ctx = MarshalContext::new(Arc::new(HandleHeap::with_seed(1)));
        let registrations = [
            ConverterRegistration {
                id: "tests::Ok",
                construct: ConverterCtor::Default(construct_ok),
            },
            ConverterRegistration {
                id: "tests::Ctx",
                construct: ConverterCtor::WithContext(construct_with_context),
            },
        ];

        let registry = ScanningTypeConverterRegistry::from_registrations(&registrations, &ctx).unwrap();
        assert_eq!(registry.len(), 2);
        assert_eq!(
            found(registry.find_converter(&NATIVE_NUMBER, &TypeRef::of(&DOUBLE))),
            Some("ctx")
        );
    }

    #[test]
    fn test_construction_failure_is_fatal() {
        let ctx = MarshalContext::new(Arc::new(HandleHeap::with_seed(1)));
        let registrations = [
            ConverterRegistration {
                id: "tests::Ok",
                construct: ConverterCtor::Default(construct_ok),
            },
            ConverterRegistration {
                id: "tests::Broken",
                construct: ConverterCtor::Default(construct_broken),
            },
        ];

        let err = ScanningTypeConverterRegistry::from_registrations(&registrations, &ctx).unwrap_err();
        assert_eq!(
            err,
            RegistryError::Construction {
                converter: "tests::Broken",
                reason: "no default state".to_string(),
            }
        );
    }
}
