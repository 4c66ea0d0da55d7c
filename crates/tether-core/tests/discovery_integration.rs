//! Integration tests for converter discovery
//!
//! Converters submitted from outside the crate are found by the bridge and
//! take part in priority ordering with the built-in ones.

use std::sync::Arc;
use tether_core::{register_converter, Bridge, BridgeConfig, SeedSource};
use tether_sdk::types::{DOUBLE, NATIVE_NUMBER, NUMBER, OBJECT};
use tether_sdk::{
    ConvertError, ConvertResult, ManagedRef, NativeValue, Side, TypeClass, TypeConverter,
    TypeMapping, TypeRef,
};

static CELSIUS: TypeClass = TypeClass {
    name: "Celsius",
    side: Side::Managed,
    supertypes: &[&OBJECT],
};

#[derive(Debug, PartialEq)]
struct Celsius(f64);

struct CelsiusConverter {
    to_managed: TypeMapping,
    to_native: TypeMapping,
}

impl Default for CelsiusConverter {
    fn default() -> Self {
        Self {
            to_managed: TypeMapping::to_managed(&NATIVE_NUMBER, &CELSIUS),
            to_native: TypeMapping::to_native(&CELSIUS, &NATIVE_NUMBER),
        }
    }
}

impl TypeConverter for CelsiusConverter {
    fn name(&self) -> &'static str {
        "celsius"
    }

    fn to_managed_mapping(&self) -> &TypeMapping {
        &self.to_managed
    }

    fn to_native_mapping(&self) -> &TypeMapping {
        &self.to_native
    }

    fn to_managed(&self, value: &NativeValue, _target: &TypeRef) -> ConvertResult<ManagedRef> {
        match value {
            NativeValue::Number(n) => Ok(ManagedRef::new(Celsius(*n))),
            other => Err(ConvertError::mismatch("native.number", other.type_name())),
        }
    }

    fn to_native(&self, object: &ManagedRef) -> ConvertResult<NativeValue> {
        object
            .downcast_ref::<Celsius>()
            .map(|c| NativeValue::Number(c.0))
            .ok_or_else(|| ConvertError::mismatch("Celsius", format!("{:?}", object)))
    }
}

register_converter!(CelsiusConverter);

/// Rounds every number, and outranks the built-in number converter
struct RoundingConverter {
    to_managed: TypeMapping,
    to_native: TypeMapping,
}

impl Default for RoundingConverter {
    fn default() -> Self {
        Self {
            to_managed: TypeMapping::to_managed(&NATIVE_NUMBER, &NUMBER),
            to_native: TypeMapping::to_native(&DOUBLE, &NATIVE_NUMBER),
        }
    }
}

impl TypeConverter for RoundingConverter {
    fn name(&self) -> &'static str {
        "rounding"
    }

    fn priority(&self) -> i32 {
        50
    }

    fn to_managed_mapping(&self) -> &TypeMapping {
        &self.to_managed
    }

    fn to_native_mapping(&self) -> &TypeMapping {
        &self.to_native
    }

    fn to_managed(&self, value: &NativeValue, _target: &TypeRef) -> ConvertResult<ManagedRef> {
        match value {
            NativeValue::Number(n) => Ok(ManagedRef::new(n.round())),
            other => Err(ConvertError::mismatch("native.number", other.type_name())),
        }
    }

    fn to_native(&self, object: &ManagedRef) -> ConvertResult<NativeValue> {
        object
            .downcast_ref::<f64>()
            .map(|n| NativeValue::Number(n.round()))
            .ok_or_else(|| ConvertError::mismatch("Double", format!("{:?}", object)))
    }
}

register_converter!(RoundingConverter);

fn bridge() -> Bridge {
    let _ = tracing_subscriber::fmt::try_init();
    let config = BridgeConfig::default().with_seed(SeedSource::Fixed(1));
    Bridge::new(&config).unwrap()
}

#[test]
fn test_external_converters_discovered() {
    let bridge = bridge();
    let celsius = TypeRef::of(&CELSIUS);

    let converter = bridge
        .registry()
        .find_converter(&NATIVE_NUMBER, &celsius)
        .unwrap();
    assert_eq!(converter.name(), "celsius");

    let object = bridge
        .marshaller()
        .to_managed(&NativeValue::Number(21.5), &celsius)
        .unwrap();
    assert_eq!(object.downcast_ref::<Celsius>(), Some(&Celsius(21.5)));
    assert_eq!(
        bridge.marshaller().to_native(&object, &celsius).unwrap(),
        NativeValue::Number(21.5)
    );
}

#[test]
fn test_higher_priority_wins_over_builtin() {
    let bridge = bridge();
    let marshaller = bridge.marshaller();
    let double = TypeRef::of(&DOUBLE);

    let object = marshaller.to_managed(&NativeValue::Number(2.6), &double).unwrap();
    assert_eq!(object.downcast_ref::<f64>(), Some(&3.0));

    let out = marshaller.to_native(&ManagedRef::new(1.4_f64), &double).unwrap();
    assert_eq!(out, NativeValue::Number(1.0));
}

#[test]
fn test_lower_priority_still_reached() {
    let bridge = bridge();

    // Integers are outside the rounding converter's mapping.
    let object = bridge
        .marshaller()
        .to_managed(&NativeValue::Int(4), &TypeRef::of(&tether_sdk::types::INTEGER))
        .unwrap();
    assert_eq!(object.downcast_ref::<i32>(), Some(&4));
}

#[test]
fn test_unrelated_objects_become_handles() {
    let bridge = bridge();
    let object = ManagedRef::new(Arc::new(vec![1_u8, 2, 3]));

    let native = bridge
        .marshaller()
        .to_native(&object, &TypeRef::of(&OBJECT))
        .unwrap();
    assert_eq!(native, NativeValue::Handle(1));
    assert_eq!(bridge.heap().len(), 1);
}
