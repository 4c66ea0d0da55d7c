//! Value marshalling for the invoking layer
//!
//! The invoking layer knows the declared managed type of each parameter and
//! return value. [`Marshaller`] looks up a converter for that type and the
//! value at hand and runs it; a miss aborts the call with the types involved.

use crate::registry::ConverterRegistry;
use std::sync::Arc;
use tether_sdk::{ConvertError, ConvertResult, ManagedRef, NativeValue, TypeRef};

/// Converts arguments and return values through a registry
#[derive(Clone)]
pub struct Marshaller {
    registry: Arc<dyn ConverterRegistry>,
}

impl Marshaller {
    /// Create a marshaller over `registry`
    pub fn new(registry: Arc<dyn ConverterRegistry>) -> Self {
        Self { registry }
    }

    /// Get the registry
    pub fn registry(&self) -> &Arc<dyn ConverterRegistry> {
        &self.registry
    }

    /// Convert an incoming native value to the declared managed type
    pub fn to_managed(&self, value: &NativeValue, target: &TypeRef) -> ConvertResult<ManagedRef> {
        let native = value.native_type();
        let converter = self
            .registry
            .find_converter(native, target)
            .ok_or_else(|| ConvertError::NoConverter {
                native: native.name().to_string(),
                managed: target.to_string(),
            })?;
        converter.to_managed(value, target)
    }

    /// Convert an outgoing managed object of the declared type to a native value
    pub fn to_native(&self, object: &ManagedRef, declared: &TypeRef) -> ConvertResult<NativeValue> {
        let converter = self
            .registry
            .find_native_converter(declared)
            .ok_or_else(|| ConvertError::NoNativeConverter {
                managed: declared.to_string(),
            })?;
        converter.to_native(object)
    }

    /// Convert a list of arguments against their declared types
    pub fn to_managed_args(
        &self,
        values: &[NativeValue],
        targets: &[TypeRef],
    ) -> ConvertResult<Vec<ManagedRef>> {
        if values.len() != targets.len() {
            return Err(ConvertError::OutOfRange(format!(
                "expected {} arguments, got {}",
                targets.len(),
                values.len()
            )));
        }
        values
            .iter()
            .zip(targets)
            .map(|(value, target)| self.to_managed(value, target))
            .collect()
    }
}

impl std::fmt::Debug for Marshaller {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Marshaller").finish_non_exhaustive()
    }
}
