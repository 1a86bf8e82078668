#![forbid(unsafe_code)]

//! Type-erased captured field values.
//!
//! The history engine never learns the concrete types of the fields it
//! tracks. A captured value travels through commits as a
//! `Box<dyn TrackedValue>`; the blanket implementation below makes every
//! `Clone + PartialEq + Debug` type a tracked value for free.
//!
//! # Copy-on-capture
//!
//! Capturing stores a `clone()` of the live value. For container types
//! (`Vec`, `HashMap`, `BTreeSet`, ...) a clone is an independent copy, so
//! mutating the live container after a commit can never retroactively
//! rewrite the snapshot held in history. Scalar and plain-struct fields get
//! the same treatment; tracking follows the *value* of the field, not the
//! identity of anything it might point at.

use std::any::Any;
use std::fmt;

/// A dynamically-typed snapshot value.
///
/// Object-safe so commits can hold heterogeneous values; implemented
/// automatically for anything cloneable, comparable, and debuggable.
pub trait TrackedValue: Any + fmt::Debug {
    /// Independent copy of this value.
    fn boxed_clone(&self) -> Box<dyn TrackedValue>;

    /// Equality across the type-erasure boundary.
    ///
    /// Values of different concrete types are never equal.
    fn value_eq(&self, other: &dyn TrackedValue) -> bool;

    /// Borrow as [`Any`] for downcasting.
    fn as_any(&self) -> &dyn Any;

    /// Convert into [`Any`] for by-value downcasting.
    fn into_any(self: Box<Self>) -> Box<dyn Any>;
}

impl<T> TrackedValue for T
where
    T: Any + fmt::Debug + Clone + PartialEq,
{
    fn boxed_clone(&self) -> Box<dyn TrackedValue> {
        Box::new(self.clone())
    }

    fn value_eq(&self, other: &dyn TrackedValue) -> bool {
        other.as_any().downcast_ref::<T>().is_some_and(|v| v == self)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn into_any(self: Box<Self>) -> Box<dyn Any> {
        self
    }
}

// ============================================================================
// Tests
// ============================================================================
