//! Tether SDK - vocabulary shared by the boundary and converter authors
//!
//! This crate provides the types needed to write type converters without
//! depending on the handle heap or the registries:
//! - [`NativeValue`]: the value-oriented wire representation
//! - [`TypeClass`] / [`TypeRef`]: native and managed type descriptors
//! - [`TypeMapping`]: one direction of a conversion
//! - [`TypeConverter`]: the converter capability
//! - [`ManagedRef`]: identity-carrying reference to a managed object

#![warn(missing_docs)]
#![warn(rust_2018_idioms)]

pub mod convert;
pub mod error;
pub mod managed;
pub mod mapping;
pub mod types;
pub mod value;

pub use convert::TypeConverter;
pub use error::{ConvertError, ConvertResult};
pub use managed::ManagedRef;
pub use mapping::{Direction, TypeMapping};
pub use types::{Side, TypeClass, TypeRef};
pub use value::{NativeErrorCode, NativeValue};
