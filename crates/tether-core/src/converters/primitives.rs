//! Value converters for primitive types

use super::VALUE_PRIORITY;
use crate::register_converter;
use tether_sdk::types::{
    BOOLEAN, DOUBLE, INTEGER, LONG, NATIVE_BOOL, NATIVE_INT, NATIVE_NUMBER, NATIVE_STRING, STRING,
};
use tether_sdk::{ConvertError, ConvertResult, ManagedRef, NativeValue, TypeConverter, TypeMapping, TypeRef};

/// Largest magnitude an `f64` carries without losing integer precision
const MAX_SAFE_INTEGER: i64 = (1 << 53) - 1;

fn integral(n: f64) -> Option<f64> {
    (n.is_finite() && n.fract() == 0.0).then_some(n)
}

fn downcast<'a, T: 'static>(object: &'a ManagedRef, expected: &str) -> ConvertResult<&'a T> {
    object
        .downcast_ref::<T>()
        .ok_or_else(|| ConvertError::mismatch(expected, format!("{:?}", object)))
}

/// `native.number` ↔ `Double`
pub struct NumberConverter {
    to_managed: TypeMapping,
    to_native: TypeMapping,
}

impl Default for NumberConverter {
    fn default() -> Self {
        Self {
            to_managed: TypeMapping::to_managed(&NATIVE_NUMBER, &DOUBLE),
            to_native: TypeMapping::to_native(&DOUBLE, &NATIVE_NUMBER),
        }
    }
}

impl TypeConverter for NumberConverter {
    fn name(&self) -> &'static str {
        "number"
    }

    fn priority(&self) -> i32 {
        VALUE_PRIORITY
    }

    fn to_managed_mapping(&self) -> &TypeMapping {
        &self.to_managed
    }

    fn to_native_mapping(&self) -> &TypeMapping {
        &self.to_native
    }

    fn to_managed(&self, value: &NativeValue, _target: &TypeRef) -> ConvertResult<ManagedRef> {
        match value {
            NativeValue::Number(n) => Ok(ManagedRef::new(*n)),
            NativeValue::Int(i) => Ok(ManagedRef::new(f64::from(*i))),
            other => Err(ConvertError::mismatch(NATIVE_NUMBER.name(), other.type_name())),
        }
    }

    fn to_native(&self, object: &ManagedRef) -> ConvertResult<NativeValue> {
        let n = downcast::<f64>(object, DOUBLE.name())?;
        Ok(NativeValue::Number(*n))
    }
}

register_converter!(NumberConverter);

/// `native.int` ↔ `Integer`
pub struct IntegerConverter {
    to_managed: TypeMapping,
    to_native: TypeMapping,
}

impl Default for IntegerConverter {
    fn default() -> Self {
        Self {
            to_managed: TypeMapping::to_managed(&NATIVE_INT, &INTEGER),
            to_native: TypeMapping::to_native(&INTEGER, &NATIVE_INT),
        }
    }
}

impl TypeConverter for IntegerConverter {
    fn name(&self) -> &'static str {
        "integer"
    }

    fn priority(&self) -> i32 {
        VALUE_PRIORITY
    }

    fn to_managed_mapping(&self) -> &TypeMapping {
        &self.to_managed
    }

    fn to_native_mapping(&self) -> &TypeMapping {
        &self.to_native
    }

    fn to_managed(&self, value: &NativeValue, _target: &TypeRef) -> ConvertResult<ManagedRef> {
        match value {
            NativeValue::Int(i) => Ok(ManagedRef::new(*i)),
            NativeValue::Number(n) => match integral(*n) {
                Some(n) if n >= f64::from(i32::MIN) && n <= f64::from(i32::MAX) => {
                    Ok(ManagedRef::new(n as i32))
                }
                _ => Err(ConvertError::OutOfRange(format!("{} is not an Integer", n))),
            },
            other => Err(ConvertError::mismatch(NATIVE_INT.name(), other.type_name())),
        }
    }

    fn to_native(&self, object: &ManagedRef) -> ConvertResult<NativeValue> {
        let i = downcast::<i32>(object, INTEGER.name())?;
        Ok(NativeValue::Int(*i))
    }
}

register_converter!(IntegerConverter);

/// `native.number` ↔ `Long`
///
/// Only integral values within ±(2^53 - 1) cross in either direction.
pub struct LongConverter {
    to_managed: TypeMapping,
    to_native: TypeMapping,
}

impl Default for LongConverter {
    fn default() -> Self {
        Self {
            to_managed: TypeMapping::to_managed(&NATIVE_NUMBER, &LONG),
            to_native: TypeMapping::to_native(&LONG, &NATIVE_NUMBER),
        }
    }
}

impl TypeConverter for LongConverter {
    fn name(&self) -> &'static str {
        "long"
    }

    fn priority(&self) -> i32 {
        VALUE_PRIORITY / 2
    }

    fn to_managed_mapping(&self) -> &TypeMapping {
        &self.to_managed
    }

    fn to_native_mapping(&self) -> &TypeMapping {
        &self.to_native
    }

    fn to_managed(&self, value: &NativeValue, _target: &TypeRef) -> ConvertResult<ManagedRef> {
        match value {
            NativeValue::Int(i) => Ok(ManagedRef::new(i64::from(*i))),
            NativeValue::Number(n) => match integral(*n) {
                Some(n) if n.abs() <= MAX_SAFE_INTEGER as f64 => Ok(ManagedRef::new(n as i64)),
                _ => Err(ConvertError::OutOfRange(format!("{} is not a Long", n))),
            },
            other => Err(ConvertError::mismatch(NATIVE_NUMBER.name(), other.type_name())),
        }
    }

    fn to_native(&self, object: &ManagedRef) -> ConvertResult<NativeValue> {
        let l = *downcast::<i64>(object, LONG.name())?;
        if l.unsigned_abs() > MAX_SAFE_INTEGER.unsigned_abs() {
            return Err(ConvertError::OutOfRange(format!(
                "{} does not fit a native number",
                l
            )));
        }
        Ok(NativeValue::Number(l as f64))
    }
}

register_converter!(LongConverter);

/// `native.bool` ↔ `Boolean`
pub struct BooleanConverter {
    to_managed: TypeMapping,
    to_native: TypeMapping,
}

impl Default for BooleanConverter {
    fn default() -> Self {
        Self {
            to_managed: TypeMapping::to_managed(&NATIVE_BOOL, &BOOLEAN),
            to_native: TypeMapping::to_native(&BOOLEAN, &NATIVE_BOOL),
        }
    }
}

impl TypeConverter for BooleanConverter {
    fn name(&self) -> &'static str {
        "boolean"
    }

    fn priority(&self) -> i32 {
        VALUE_PRIORITY
    }

    fn to_managed_mapping(&self) -> &TypeMapping {
        &self.to_managed
    }

    fn to_native_mapping(&self) -> &TypeMapping {
        &self.to_native
    }

    fn to_managed(&self, value: &NativeValue, _target: &TypeRef) -> ConvertResult<ManagedRef> {
        match value {
            NativeValue::Bool(b) => Ok(ManagedRef::new(*b)),
            other => Err(ConvertError::mismatch(NATIVE_BOOL.name(), other.type_name())),
        }
    }

    fn to_native(&self, object: &ManagedRef) -> ConvertResult<NativeValue> {
        let b = downcast::<bool>(object, BOOLEAN.name())?;
        Ok(NativeValue::Bool(*b))
    }
}

register_converter!(BooleanConverter);

/// `native.string` ↔ `String`
pub struct StringConverter {
    to_managed: TypeMapping,
    to_native: TypeMapping,
}

impl Default for StringConverter {
    fn default() -> Self {
        Self {
            to_managed: TypeMapping::to_managed(&NATIVE_STRING, &STRING),
            to_native: TypeMapping::to_native(&STRING, &NATIVE_STRING),
        }
    }
}

impl TypeConverter for StringConverter {
    fn name(&self) -> &'static str {
        "string"
    }

    fn priority(&self) -> i32 {
        VALUE_PRIORITY
    }

    fn to_managed_mapping(&self) -> &TypeMapping {
        &self.to_managed
    }

    fn to_native_mapping(&self) -> &TypeMapping {
        &self.to_native
    }

    fn to_managed(&self, value: &NativeValue, _target: &TypeRef) -> ConvertResult<ManagedRef> {
        match value {
            NativeValue::Str(s) => Ok(ManagedRef::new(s.clone())),
            other => Err(ConvertError::mismatch(NATIVE_STRING.name(), other.type_name())),
        }
    }

    fn to_native(&self, object: &ManagedRef) -> ConvertResult<NativeValue> {
        let s = downcast::<String>(object, STRING.name())?;
        Ok(NativeValue::Str(s.clone()))
    }
}

register_converter!(StringConverter);
