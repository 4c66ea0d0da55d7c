//! Error types for value conversion

/// Result type for conversions
pub type ConvertResult<T> = Result<T, ConvertError>;

/// Conversion error types
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConvertError {
    /// Value does not have the shape the converter expects
    #[error("Type mismatch: expected {expected}, got {got}")]
    TypeMismatch {
        /// Expected type name
        expected: String,
        /// Actual type name
        got: String,
    },

    /// Handle not live in this heap
    #[error("No such handle: {0:#x}")]
    UnknownHandle(u64),

    /// No converter for a native to managed conversion
    #[error("No converter from {native} to {managed}")]
    NoConverter {
        /// Native type name
        native: String,
        /// Managed type name
        managed: String,
    },

    /// No converter for a managed to native conversion
    #[error("No converter from {managed} to a native value")]
    NoNativeConverter {
        /// Managed type name
        managed: String,
    },

    /// Value outside the representable range of the target
    #[error("Value out of range: {0}")]
    OutOfRange(String),
}

impl ConvertError {
    /// Shorthand for a type mismatch
    pub fn mismatch(expected: impl Into<String>, got: impl Into<String>) -> Self {
        ConvertError::TypeMismatch {
            expected: expected.into(),
            got: got.into(),
        }
    }
}
