//! Conversion directions
//!
//! A [`TypeMapping`] names one direction of a conversion by its native class
//! and managed type. Converters declare one mapping per direction; lookups
//! build a request mapping and test each candidate with [`TypeMapping::accepts`].

use crate::types::{TypeClass, TypeRef};
use std::fmt;
use std::hash::{Hash, Hasher};

/// Direction of a conversion
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    /// Native value in, managed object out
    ToManaged,
    /// Managed object in, native value out
    ToNative,
}

/// Immutable (native, managed) pair in one direction
#[derive(Clone)]
pub struct TypeMapping {
    direction: Direction,
    native: &'static TypeClass,
    managed: TypeRef,
    erased: &'static TypeClass,
}

impl TypeMapping {
    /// Native to managed mapping
    pub fn to_managed(native: &'static TypeClass, managed: impl Into<TypeRef>) -> Self {
        Self::new(Direction::ToManaged, native, managed.into())
    }

    /// Managed to native mapping
    pub fn to_native(managed: impl Into<TypeRef>, native: &'static TypeClass) -> Self {
        Self::new(Direction::ToNative, native, managed.into())
    }

    fn new(direction: Direction, native: &'static TypeClass, managed: TypeRef) -> Self {
        let erased = managed.erased();
        Self {
            direction,
            native,
            managed,
            erased,
        }
    }

    /// Get the direction
    pub fn direction(&self) -> Direction {
        self.direction
    }

    /// Get the native class
    pub fn native(&self) -> &'static TypeClass {
        self.native
    }

    /// Get the managed type
    pub fn managed(&self) -> &TypeRef {
        &self.managed
    }

    /// Get the erased managed class
    pub fn erased(&self) -> &'static TypeClass {
        self.erased
    }

    /// Check whether a converter declaring `self` can serve `request`
    ///
    /// Both sides of `self` must be assignable from the request's sides, so a
    /// broader declaration serves a narrower request but never the reverse.
    pub fn accepts(&self, request: &TypeMapping) -> bool {
        self.direction == request.direction
            && self.native.is_assignable_from(request.native)
            && self.erased.is_assignable_from(request.erased)
    }

    /// Check the managed side only
    ///
    /// Used for managed to native lookups that have no target native class.
    /// Only a managed to native mapping accepts.
    pub fn accepts_managed(&self, managed: &TypeRef) -> bool {
        self.direction == Direction::ToNative
            && self.erased.is_assignable_from(managed.erased())
    }
}

impl PartialEq for TypeMapping {
    fn eq(&self, other: &Self) -> bool {
        self.direction == other.direction
            && self.native == other.native
            && self.managed == other.managed
    }
}

impl Eq for TypeMapping {}

impl Hash for TypeMapping {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.direction.hash(state);
        self.native.hash(state);
        self.managed.hash(state);
    }
}

impl fmt::Display for TypeMapping {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.direction {
            Direction::ToManaged => write!(f, "{} -> {}", self.native, self.managed),
            Direction::ToNative => write!(f, "{} -> {}", self.managed, self.native),
        }
    }
}

impl fmt::Debug for TypeMapping {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TypeMapping({})", self)
    }
}
