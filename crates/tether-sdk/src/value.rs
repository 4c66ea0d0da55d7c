//! Wire values presented by the foreign caller
//!
//! `NativeValue` is the value-oriented representation of everything that can
//! cross the boundary. Managed objects never cross directly; they travel as
//! [`NativeValue::Handle`] and are resolved through the handle heap.

use crate::error::{ConvertError, ConvertResult};
use crate::types::{
    TypeClass, NATIVE_ARRAY, NATIVE_BOOL, NATIVE_ERROR, NATIVE_HANDLE, NATIVE_INT,
    NATIVE_MISSING, NATIVE_NIL, NATIVE_NUMBER, NATIVE_STRING,
};
use std::fmt;

/// Error codes the foreign side understands
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NativeErrorCode {
    /// Intersection of ranges that do not intersect
    Null,
    /// Division by zero
    Div0,
    /// Wrong kind of argument
    Value,
    /// Invalid reference
    Ref,
    /// Unrecognized name
    Name,
    /// Invalid numeric value
    Num,
    /// Value not available
    NA,
}

impl NativeErrorCode {
    /// Stable numeric code
    pub fn code(self) -> u16 {
        match self {
            NativeErrorCode::Null => 0,
            NativeErrorCode::Div0 => 7,
            NativeErrorCode::Value => 15,
            NativeErrorCode::Ref => 23,
            NativeErrorCode::Name => 29,
            NativeErrorCode::Num => 36,
            NativeErrorCode::NA => 42,
        }
    }

    /// Decode a numeric code
    pub fn from_code(code: u16) -> Option<Self> {
        match code {
            0 => Some(NativeErrorCode::Null),
            7 => Some(NativeErrorCode::Div0),
            15 => Some(NativeErrorCode::Value),
            23 => Some(NativeErrorCode::Ref),
            29 => Some(NativeErrorCode::Name),
            36 => Some(NativeErrorCode::Num),
            42 => Some(NativeErrorCode::NA),
            _ => None,
        }
    }
}

impl fmt::Display for NativeErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            NativeErrorCode::Null => "#NULL!",
            NativeErrorCode::Div0 => "#DIV/0!",
            NativeErrorCode::Value => "#VALUE!",
            NativeErrorCode::Ref => "#REF!",
            NativeErrorCode::Name => "#NAME?",
            NativeErrorCode::Num => "#NUM!",
            NativeErrorCode::NA => "#N/A",
        };
        f.write_str(text)
    }
}

/// Value crossing the foreign boundary
#[derive(Debug, Clone, PartialEq)]
pub enum NativeValue {
    /// Argument omitted by the caller
    Missing,

    /// Empty value
    Nil,

    /// Boolean value
    Bool(bool),

    /// 32-bit signed integer
    Int(i32),

    /// 64-bit floating point number
    Number(f64),

    /// String value
    Str(String),

    /// Error code
    Error(NativeErrorCode),

    /// Row-major two-dimensional array
    Array {
        /// Number of rows
        rows: usize,
        /// Number of columns
        cols: usize,
        /// `rows * cols` elements
        items: Vec<NativeValue>,
    },

    /// Opaque handle to a managed object
    Handle(u64),
}

impl NativeValue {
    /// Build an array, checking that the shape matches the element count
    pub fn array(rows: usize, cols: usize, items: Vec<NativeValue>) -> ConvertResult<Self> {
        if rows.checked_mul(cols) != Some(items.len()) {
            return Err(ConvertError::OutOfRange(format!(
                "array of {} elements does not fit {}x{}",
                items.len(),
                rows,
                cols
            )));
        }
        Ok(NativeValue::Array { rows, cols, items })
    }

    /// Native class of this value
    pub fn native_type(&self) -> &'static TypeClass {
        match self {
            NativeValue::Missing => &NATIVE_MISSING,
            NativeValue::Nil => &NATIVE_NIL,
            NativeValue::Bool(_) => &NATIVE_BOOL,
            NativeValue::Int(_) => &NATIVE_INT,
            NativeValue::Number(_) => &NATIVE_NUMBER,
            NativeValue::Str(_) => &NATIVE_STRING,
            NativeValue::Error(_) => &NATIVE_ERROR,
            NativeValue::Array { .. } => &NATIVE_ARRAY,
            NativeValue::Handle(_) => &NATIVE_HANDLE,
        }
    }

    /// Get the type name as a string
    pub fn type_name(&self) -> &'static str {
        self.native_type().name()
    }

    /// Check if this value is missing or nil
    pub fn is_empty(&self) -> bool {
        matches!(self, NativeValue::Missing | NativeValue::Nil)
    }
}

impl fmt::Display for NativeValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NativeValue::Missing => write!(f, "<missing>"),
            NativeValue::Nil => write!(f, "nil"),
            NativeValue::Bool(b) => write!(f, "{}", b),
            NativeValue::Int(i) => write!(f, "{}", i),
            NativeValue::Number(n) => write!(f, "{}", n),
            NativeValue::Str(s) => write!(f, "\"{}\"", s),
            NativeValue::Error(code) => write!(f, "{}", code),
            NativeValue::Array { cols, items, .. } => {
                // The declared shape may not match `items`.
                write!(f, "{{")?;
                for (row, chunk) in items.chunks((*cols).max(1)).enumerate() {
                    if row > 0 {
                        write!(f, "; ")?;
                    }
                    for (col, item) in chunk.iter().enumerate() {
                        if col > 0 {
                            write!(f, ", ")?;
                        }
                        write!(f, "{}", item)?;
                    }
                }
                write!(f, "}}")
            }
            NativeValue::Handle(h) => write!(f, "Handle({:#x})", h),
        }
    }
}
