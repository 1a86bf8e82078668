#![forbid(unsafe_code)]

//! Field identity, typed accessors, and point-in-time snapshots.
//!
//! A tracked field is addressed by a [`FieldId`] — a stable identifier the
//! owning type declares exactly once — and reached through a
//! [`FieldAccessor`], a typed get/set pair. No reflection anywhere: the
//! accessor *is* the field-access capability, and a missing or mistyped
//! field surfaces as an explicit [`HistoryError`](crate::HistoryError)
//! instead of a runtime lookup failure.

use std::fmt;

use crate::error::HistoryError;
use crate::trackable::TrackedHandle;
use crate::value::TrackedValue;

/// Stable identifier of one tracked field, declared once per type.
pub type FieldId = &'static str;

/// Typed get/set pair for one field of `O`.
///
/// The getter returns the field *by value* (a clone for non-`Copy` types),
/// which is what makes capture copy-on-read for containers.
pub struct FieldAccessor<O: ?Sized, T> {
    /// Reads the current value off the object.
    pub get: fn(&O) -> T,
    /// Writes a value onto the object.
    pub set: fn(&mut O, T),
}

impl<O: ?Sized, T> Clone for FieldAccessor<O, T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<O: ?Sized, T> Copy for FieldAccessor<O, T> {}

/// One tracked field's identity and its captured value at a moment in time.
///
/// Snapshots are immutable after capture: a commit is a moment, and applying
/// it must always reproduce exactly the state that was captured, no matter
/// how many times history is walked over it.
pub struct FieldSnapshot {
    object: TrackedHandle,
    field: FieldId,
    value: Box<dyn TrackedValue>,
}

impl FieldSnapshot {
    /// Reads `field` off the live object and captures an independent copy.
    pub(crate) fn capture(object: &TrackedHandle, field: FieldId) -> Result<Self, HistoryError> {
        let value = object.capture(field)?;
        Ok(Self {
            object: object.clone(),
            field,
            value,
        })
    }

    /// Writes the captured value back onto the live object, returning the
    /// value it displaced.
    pub(crate) fn restore(&self) -> Result<Box<dyn TrackedValue>, HistoryError> {
        self.object.exchange(self.field, self.value.boxed_clone())
    }

    /// The object this snapshot belongs to.
    #[must_use]
    pub fn object(&self) -> &TrackedHandle {
        &self.object
    }

    /// The field this snapshot captured.
    #[must_use]
    pub fn field(&self) -> FieldId {
        self.field
    }

    /// The captured value.
    #[must_use]
    pub fn value(&self) -> &dyn TrackedValue {
        self.value.as_ref()
    }
}

impl fmt::Debug for FieldSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldSnapshot")
            .field("object", &self.object)
            .field("field", &self.field)
            .field("value", &self.value)
            .finish()
    }
}

impl PartialEq for FieldSnapshot {
    /// Same field of the same object, holding an equal value.
    fn eq(&self, other: &Self) -> bool {
        self.object.same_object(&other.object)
            && self.field == other.field
            && self.value.value_eq(other.value.as_ref())
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use super::*;
    use crate::trackable::{Tracked, TrackedFields};

    struct Probe {
        label: String,
        data: Vec<i32>,
    }

    impl Tracked for Probe {
        fn tracked_fields() -> TrackedFields<Self> {
            TrackedFields::new()
                .field("label", |p: &Probe| p.label.clone(), |p, v| p.label = v)
                .field("data", |p: &Probe| p.data.clone(), |p, v| p.data = v)
        }
    }

    fn probe() -> (Rc<RefCell<Probe>>, TrackedHandle) {
        let object = Rc::new(RefCell::new(Probe {
            label: "one".to_string(),
            data: vec![1, 2],
        }));
        let handle = TrackedHandle::new(object.clone());
        (object, handle)
    }

    #[test]
    fn capture_reads_the_live_value() {
        let (_object, handle) = probe();
        let snapshot = FieldSnapshot::capture(&handle, "label").unwrap();
        assert!(snapshot.value().value_eq(&"one".to_string()));
    }

    #[test]
    fn capture_copies_containers() {
        let (object, handle) = probe();
        let snapshot = FieldSnapshot::capture(&handle, "data").unwrap();

        object.borrow_mut().data.push(3);

        assert!(
            snapshot.value().value_eq(&vec![1, 2]),
            "snapshot must keep the value as of capture time"
        );
    }

    #[test]
    fn restore_writes_back_and_returns_displaced() {
        let (object, handle) = probe();
        let snapshot = FieldSnapshot::capture(&handle, "label").unwrap();

        object.borrow_mut().label = "two".to_string();
        let displaced = snapshot.restore().unwrap();

        assert_eq!(object.borrow().label, "one");
        assert!(displaced.value_eq(&"two".to_string()));
    }

    #[test]
    fn restore_is_repeatable() {
        let (object, handle) = probe();
        let snapshot = FieldSnapshot::capture(&handle, "label").unwrap();

        object.borrow_mut().label = "two".to_string();
        snapshot.restore().unwrap();
        object.borrow_mut().label = "three".to_string();
        snapshot.restore().unwrap();

        assert_eq!(object.borrow().label, "one");
    }

    #[test]
    fn equality_needs_same_object_and_field_and_value() {
        let (_a_obj, a) = probe();
        let (_b_obj, b) = probe();

        let a_label = FieldSnapshot::capture(&a, "label").unwrap();
        let a_label_again = FieldSnapshot::capture(&a, "label").unwrap();
        let a_data = FieldSnapshot::capture(&a, "data").unwrap();
        let b_label = FieldSnapshot::capture(&b, "label").unwrap();

        assert_eq!(a_label, a_label_again);
        assert_ne!(a_label, a_data, "different fields of one object differ");
        assert_ne!(a_label, b_label, "equal values on distinct objects differ");
    }

    #[test]
    fn capture_unknown_field_fails() {
        let (_object, handle) = probe();
        let err = FieldSnapshot::capture(&handle, "missing").unwrap_err();
        assert_eq!(err, HistoryError::UnknownField { field: "missing" });
    }

    #[test]
    fn capture_while_borrowed_fails() {
        let (object, handle) = probe();
        let _hold = object.borrow_mut();
        let err = FieldSnapshot::capture(&handle, "label").unwrap_err();
        assert_eq!(err, HistoryError::ObjectUnavailable { field: "label" });
    }
}
