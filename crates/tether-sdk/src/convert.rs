//! Converter capability
//!
//! A [`TypeConverter`] declares one mapping per direction and a priority.
//! Registries pick among converters by testing the declared mappings; they
//! never rely on the converter's concrete type.
//!
//! # Example
//!
//! ```ignore
//! use tether_sdk::{ConvertError, ConvertResult, ManagedRef, NativeValue, TypeConverter, TypeMapping, TypeRef};
//! use tether_sdk::types::{BOOLEAN, NATIVE_BOOL};
//!
//! struct Flag {
//!     to_managed: TypeMapping,
//!     to_native: TypeMapping,
//! }
//!
//! impl TypeConverter for Flag {
//!     fn name(&self) -> &'static str { "flag" }
//!     fn to_managed_mapping(&self) -> &TypeMapping { &self.to_managed }
//!     fn to_native_mapping(&self) -> &TypeMapping { &self.to_native }
//!     fn to_managed(&self, value: &NativeValue, _target: &TypeRef) -> ConvertResult<ManagedRef> {
//!         match value {
//!             NativeValue::Bool(b) => Ok(ManagedRef::new(*b)),
//!             other => Err(ConvertError::mismatch("native.bool", other.type_name())),
//!         }
//!     }
//!     fn to_native(&self, object: &ManagedRef) -> ConvertResult<NativeValue> {
//!         object.downcast_ref::<bool>().map(|b| NativeValue::Bool(*b))
//!             .ok_or_else(|| ConvertError::mismatch("Boolean", "Object"))
//!     }
//! }
//! ```

use crate::error::ConvertResult;
use crate::managed::ManagedRef;
use crate::mapping::TypeMapping;
use crate::types::TypeRef;
use crate::value::NativeValue;

/// Bidirectional converter between a native class and a managed type
///
/// Implementations are immutable once constructed and shared across threads.
pub trait TypeConverter: Send + Sync {
    /// Name used in diagnostics
    fn name(&self) -> &'static str;

    /// Preference among converters that accept the same request (higher wins)
    fn priority(&self) -> i32 {
        0
    }

    /// Mapping served by [`to_managed`](TypeConverter::to_managed)
    fn to_managed_mapping(&self) -> &TypeMapping;

    /// Mapping served by [`to_native`](TypeConverter::to_native)
    fn to_native_mapping(&self) -> &TypeMapping;

    /// Convert a native value into a managed object of type `target`
    fn to_managed(&self, value: &NativeValue, target: &TypeRef) -> ConvertResult<ManagedRef>;

    /// Convert a managed object into a native value
    fn to_native(&self, object: &ManagedRef) -> ConvertResult<NativeValue>;
}

impl std::fmt::Debug for dyn TypeConverter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TypeConverter")
            .field("name", &self.name())
            .field("priority", &self.priority())
            .field("to_managed", self.to_managed_mapping())
            .field("to_native", self.to_native_mapping())
            .finish()
    }
}
