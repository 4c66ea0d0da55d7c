//! Type classes for both sides of the boundary
//!
//! A [`TypeClass`] is a static descriptor naming a native wire type or a
//! managed runtime type, together with its direct supertypes. Assignability
//! walks that supertype graph. A [`TypeRef`] is a managed type with optional
//! generic arguments; only its erased class takes part in assignability.
//!
//! # Hierarchy
//!
//! ```text
//! native.value ─┬─ native.missing        Object ─┬─ Number ─┬─ Double
//!               ├─ native.nil                    │          ├─ Integer
//!               ├─ native.bool                   │          └─ Long
//!               ├─ native.int                    ├─ Boolean
//!               ├─ native.number                 ├─ String
//!               ├─ native.string                 └─ List
//!               ├─ native.error
//!               ├─ native.array
//!               └─ native.handle
//! ```

use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

/// Which side of the boundary a class belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Side {
    /// Foreign wire representation
    Native,
    /// Managed runtime representation
    Managed,
}

/// Static type descriptor
///
/// Classes are compared by side and qualified name, so two descriptors
/// declared in different crates under the same name are the same class.
pub struct TypeClass {
    /// Qualified name
    pub name: &'static str,

    /// Side of the boundary
    pub side: Side,

    /// Direct supertypes
    pub supertypes: &'static [&'static TypeClass],
}

impl TypeClass {
    /// Declare a native class
    pub const fn native(name: &'static str, supertypes: &'static [&'static TypeClass]) -> Self {
        Self {
            name,
            side: Side::Native,
            supertypes,
        }
    }

    /// Declare a managed class
    pub const fn managed(name: &'static str, supertypes: &'static [&'static TypeClass]) -> Self {
        Self {
            name,
            side: Side::Managed,
            supertypes,
        }
    }

    /// Get the qualified name
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Get the side of the boundary
    pub fn side(&self) -> Side {
        self.side
    }

    /// Check whether a value of class `other` can be used where `self` is expected
    ///
    /// Reflexive and transitive over declared supertypes.
    pub fn is_assignable_from(&self, other: &TypeClass) -> bool {
        if self == other {
            return true;
        }
        other
            .supertypes
            .iter()
            .any(|supertype| self.is_assignable_from(supertype))
    }
}

impl PartialEq for TypeClass {
    fn eq(&self, other: &Self) -> bool {
        self.side == other.side && self.name == other.name
    }
}

impl Eq for TypeClass {}

impl Hash for TypeClass {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.side.hash(state);
        self.name.hash(state);
    }
}

impl fmt::Debug for TypeClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

impl fmt::Display for TypeClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

// ============================================================================
// Native classes
// ============================================================================

/// Any native value
pub static NATIVE_VALUE: TypeClass = TypeClass {
    name: "native.value",
    side: Side::Native,
    supertypes: &[],
};

/// Omitted argument
pub static NATIVE_MISSING: TypeClass = TypeClass {
    name: "native.missing",
    side: Side::Native,
    supertypes: &[&NATIVE_VALUE],
};

/// Empty value
pub static NATIVE_NIL: TypeClass = TypeClass {
    name: "native.nil",
    side: Side::Native,
    supertypes: &[&NATIVE_VALUE],
};

/// Boolean
pub static NATIVE_BOOL: TypeClass = TypeClass {
    name: "native.bool",
    side: Side::Native,
    supertypes: &[&NATIVE_VALUE],
};

/// 32-bit integer
pub static NATIVE_INT: TypeClass = TypeClass {
    name: "native.int",
    side: Side::Native,
    supertypes: &[&NATIVE_VALUE],
};

/// 64-bit float
pub static NATIVE_NUMBER: TypeClass = TypeClass {
    name: "native.number",
    side: Side::Native,
    supertypes: &[&NATIVE_VALUE],
};

/// String
pub static NATIVE_STRING: TypeClass = TypeClass {
    name: "native.string",
    side: Side::Native,
    supertypes: &[&NATIVE_VALUE],
};

/// Error code
pub static NATIVE_ERROR: TypeClass = TypeClass {
    name: "native.error",
    side: Side::Native,
    supertypes: &[&NATIVE_VALUE],
};

/// Two-dimensional array
pub static NATIVE_ARRAY: TypeClass = TypeClass {
    name: "native.array",
    side: Side::Native,
    supertypes: &[&NATIVE_VALUE],
};

/// Opaque handle to a managed object
pub static NATIVE_HANDLE: TypeClass = TypeClass {
    name: "native.handle",
    side: Side::Native,
    supertypes: &[&NATIVE_VALUE],
};

// ============================================================================
// Managed classes
// ============================================================================

/// Root of the managed hierarchy
pub static OBJECT: TypeClass = TypeClass {
    name: "Object",
    side: Side::Managed,
    supertypes: &[],
};

/// Any number
pub static NUMBER: TypeClass = TypeClass {
    name: "Number",
    side: Side::Managed,
    supertypes: &[&OBJECT],
};

/// `f64`
pub static DOUBLE: TypeClass = TypeClass {
    name: "Double",
    side: Side::Managed,
    supertypes: &[&NUMBER],
};

/// `i32`
pub static INTEGER: TypeClass = TypeClass {
    name: "Integer",
    side: Side::Managed,
    supertypes: &[&NUMBER],
};

/// `i64`
pub static LONG: TypeClass = TypeClass {
    name: "Long",
    side: Side::Managed,
    supertypes: &[&NUMBER],
};

/// `bool`
pub static BOOLEAN: TypeClass = TypeClass {
    name: "Boolean",
    side: Side::Managed,
    supertypes: &[&OBJECT],
};

/// `String`
pub static STRING: TypeClass = TypeClass {
    name: "String",
    side: Side::Managed,
    supertypes: &[&OBJECT],
};

/// Generic list
pub static LIST: TypeClass = TypeClass {
    name: "List",
    side: Side::Managed,
    supertypes: &[&OBJECT],
};

// ============================================================================
// TypeRef
// ============================================================================

/// Managed type, possibly parameterized
///
/// Equality includes the generic arguments; assignability uses the erased
/// class only.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct TypeRef {
    class: &'static TypeClass,
    args: Arc<[TypeRef]>,
}

impl TypeRef {
    /// Non-generic type
    pub fn of(class: &'static TypeClass) -> Self {
        Self {
            class,
            args: Arc::from(Vec::new()),
        }
    }

    /// Parameterized type
    pub fn generic(class: &'static TypeClass, args: Vec<TypeRef>) -> Self {
        Self {
            class,
            args: Arc::from(args),
        }
    }

    /// Get the class
    pub fn class(&self) -> &'static TypeClass {
        self.class
    }

    /// Get the generic arguments
    pub fn args(&self) -> &[TypeRef] {
        &self.args
    }

    /// Class with generic arguments dropped
    pub fn erased(&self) -> &'static TypeClass {
        self.class
    }

    /// Check assignability of erased classes
    pub fn is_assignable_from(&self, other: &TypeRef) -> bool {
        self.class.is_assignable_from(other.class)
    }
}

impl From<&'static TypeClass> for TypeRef {
    fn from(class: &'static TypeClass) -> Self {
        TypeRef::of(class)
    }
}

impl fmt::Display for TypeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.class)?;
        if !self.args.is_empty() {
            write!(f, "<")?;
            for (i, arg) in self.args.iter().enumerate() {
                if i > 0 {
                    write!(f, ", ")?;
                }
                write!(f, "{}", arg)?;
            }
            write!(f, ">")?;
        }
        Ok(())
    }
}

impl fmt::Debug for TypeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TypeRef({})", self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_assignability_is_reflexive() {
        assert!(DOUBLE.is_assignable_from(&DOUBLE));
        assert!(NATIVE_NUMBER.is_assignable_from(&NATIVE_NUMBER));
    }

    #[test]
    fn test_assignability_is_transitive() {
        assert!(OBJECT.is_assignable_from(&DOUBLE));
        assert!(NUMBER.is_assignable_from(&LONG));
        assert!(NATIVE_VALUE.is_assignable_from(&NATIVE_HANDLE));
    }

    #[test]
    fn test_assignability_is_not_symmetric() {
        assert!(!DOUBLE.is_assignable_from(&NUMBER));
        assert!(!INTEGER.is_assignable_from(&DOUBLE));
        assert!(!NATIVE_NUMBER.is_assignable_from(&NATIVE_VALUE));
    }

    #[test]
    fn test_sides_never_mix() {
        static LOOKALIKE: TypeClass = TypeClass::native("Object", &[]);
        assert_ne!(LOOKALIKE, OBJECT);
        assert!(!OBJECT.is_assignable_from(&LOOKALIKE));
    }

    #[test]
    fn test_type_ref_equality_includes_args() {
        let strings = TypeRef::generic(&LIST, vec![TypeRef::of(&STRING)]);
        let doubles = TypeRef::generic(&LIST, vec![TypeRef::of(&DOUBLE)]);

        assert_ne!(strings, doubles);
        assert_eq!(strings.erased(), doubles.erased());
        assert!(strings.is_assignable_from(&doubles));
        assert_eq!(strings.to_string(), "List<String>");
    }
}
