#![forbid(unsafe_code)]

//! The contract a domain object implements to participate in history.
//!
//! A type opts in by implementing [`Tracked`]: one associated constructor
//! that declares, exactly once, which fields matter and how to reach them.
//! The engine then only ever sees a [`TrackedHandle`] — an object-agnostic,
//! cheaply-cloneable reference that can enumerate field identifiers and
//! capture or exchange values, without knowing the concrete type behind it.
//!
//! ```
//! use std::cell::RefCell;
//! use std::rc::Rc;
//! use rewind_core::{Tracked, TrackedFields, TrackedHandle};
//!
//! struct Note {
//!     text: String,
//!     pinned: bool,
//! }
//!
//! impl Tracked for Note {
//!     fn tracked_fields() -> TrackedFields<Self> {
//!         TrackedFields::new()
//!             .field("text", |n: &Note| n.text.clone(), |n, v| n.text = v)
//!             .field("pinned", |n: &Note| n.pinned, |n, v| n.pinned = v)
//!     }
//! }
//!
//! let note = Rc::new(RefCell::new(Note { text: String::new(), pinned: false }));
//! let handle = TrackedHandle::new(note.clone());
//! assert_eq!(handle.field_ids(), vec!["text", "pinned"]);
//! ```
//!
//! Objects live behind `Rc<RefCell<_>>`: the engine assumes a single logical
//! mutator thread (a GUI event loop), so shared ownership without locking is
//! the right shape. A borrow conflict during capture or restore maps onto
//! [`HistoryError::ObjectUnavailable`] rather than panicking.

use std::any::type_name;
use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use crate::error::HistoryError;
use crate::field::{FieldAccessor, FieldId};
use crate::value::TrackedValue;

/// Declares which fields of a type participate in history.
///
/// Implementations build their field table once; the engine calls it when an
/// object is wrapped in a [`TrackedHandle`].
pub trait Tracked: 'static {
    /// The stable, ordered field table for this type.
    fn tracked_fields() -> TrackedFields<Self>
    where
        Self: Sized;
}

type CaptureFn<O> = Box<dyn Fn(&O) -> Box<dyn TrackedValue>>;
type ExchangeFn<O> =
    Box<dyn Fn(&mut O, Box<dyn TrackedValue>) -> Result<Box<dyn TrackedValue>, HistoryError>>;

struct FieldDef<O: ?Sized> {
    id: FieldId,
    capture: CaptureFn<O>,
    exchange: ExchangeFn<O>,
}

/// Ordered, type-erased table of a type's tracked fields.
pub struct TrackedFields<O: ?Sized> {
    defs: Vec<FieldDef<O>>,
}

impl<O: 'static> TrackedFields<O> {
    /// Empty table; chain [`field`](Self::field) or [`with`](Self::with).
    #[must_use]
    pub fn new() -> Self {
        Self { defs: Vec::new() }
    }

    /// Adds one tracked field reached through a get/set pair.
    #[must_use]
    pub fn field<T>(self, id: FieldId, get: fn(&O) -> T, set: fn(&mut O, T)) -> Self
    where
        T: Clone + PartialEq + fmt::Debug + 'static,
    {
        self.with(id, FieldAccessor { get, set })
    }

    /// Adds one tracked field reached through a prebuilt [`FieldAccessor`].
    #[must_use]
    pub fn with<T>(mut self, id: FieldId, accessor: FieldAccessor<O, T>) -> Self
    where
        T: Clone + PartialEq + fmt::Debug + 'static,
    {
        let FieldAccessor { get, set } = accessor;
        self.defs.push(FieldDef {
            id,
            capture: Box::new(move |object| Box::new(get(object))),
            exchange: Box::new(move |object, incoming| {
                let incoming = incoming
                    .into_any()
                    .downcast::<T>()
                    .map_err(|_| HistoryError::ValueTypeMismatch { field: id })?;
                let displaced = get(object);
                set(object, *incoming);
                Ok(Box::new(displaced))
            }),
        });
        self
    }

    /// Declared identifiers, in declaration order.
    #[must_use]
    pub fn ids(&self) -> Vec<FieldId> {
        self.defs.iter().map(|def| def.id).collect()
    }

    /// Number of declared fields.
    #[must_use]
    pub fn len(&self) -> usize {
        self.defs.len()
    }

    /// True when no fields were declared.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.defs.is_empty()
    }

    /// Reads the current value of `id` off `object`.
    pub fn capture(&self, object: &O, id: FieldId) -> Result<Box<dyn TrackedValue>, HistoryError> {
        Ok((self.def(id)?.capture)(object))
    }

    /// Writes `value` onto `id`, returning the value it displaced.
    pub fn exchange(
        &self,
        object: &mut O,
        id: FieldId,
        value: Box<dyn TrackedValue>,
    ) -> Result<Box<dyn TrackedValue>, HistoryError> {
        (self.def(id)?.exchange)(object, value)
    }

    fn def(&self, id: FieldId) -> Result<&FieldDef<O>, HistoryError> {
        self.defs
            .iter()
            .find(|def| def.id == id)
            .ok_or(HistoryError::UnknownField { field: id })
    }
}

impl<O: 'static> Default for TrackedFields<O> {
    fn default() -> Self {
        Self::new()
    }
}

trait Slot {
    fn field_ids(&self) -> Vec<FieldId>;
    fn capture(&self, id: FieldId) -> Result<Box<dyn TrackedValue>, HistoryError>;
    fn exchange(
        &self,
        id: FieldId,
        value: Box<dyn TrackedValue>,
    ) -> Result<Box<dyn TrackedValue>, HistoryError>;
    fn cell_addr(&self) -> usize;
    fn type_name(&self) -> &'static str;
}

struct TypedSlot<O: Tracked> {
    object: Rc<RefCell<O>>,
    fields: TrackedFields<O>,
}

impl<O: Tracked> Slot for TypedSlot<O> {
    fn field_ids(&self) -> Vec<FieldId> {
        self.fields.ids()
    }

    fn capture(&self, id: FieldId) -> Result<Box<dyn TrackedValue>, HistoryError> {
        let object = self
            .object
            .try_borrow()
            .map_err(|_| HistoryError::ObjectUnavailable { field: id })?;
        self.fields.capture(&object, id)
    }

    fn exchange(
        &self,
        id: FieldId,
        value: Box<dyn TrackedValue>,
    ) -> Result<Box<dyn TrackedValue>, HistoryError> {
        let mut object = self
            .object
            .try_borrow_mut()
            .map_err(|_| HistoryError::ObjectUnavailable { field: id })?;
        self.fields.exchange(&mut object, id, value)
    }

    fn cell_addr(&self) -> usize {
        Rc::as_ptr(&self.object) as usize
    }

    fn type_name(&self) -> &'static str {
        type_name::<O>()
    }
}

/// Engine-facing handle to one tracked object.
///
/// Cloning is reference-counted. Identity is the address of the shared cell:
/// two handles are the same object iff they wrap the same `Rc<RefCell<_>>`
/// allocation, however they were created.
#[derive(Clone)]
pub struct TrackedHandle {
    slot: Rc<dyn Slot>,
}

impl TrackedHandle {
    /// Wraps a shared object together with its declared field table.
    #[must_use]
    pub fn new<O: Tracked>(object: Rc<RefCell<O>>) -> Self {
        Self {
            slot: Rc::new(TypedSlot {
                object,
                fields: O::tracked_fields(),
            }),
        }
    }

    /// Identifiers of the fields this object declared for tracking.
    #[must_use]
    pub fn field_ids(&self) -> Vec<FieldId> {
        self.slot.field_ids()
    }

    /// True when both handles refer to the same underlying object.
    #[must_use]
    pub fn same_object(&self, other: &TrackedHandle) -> bool {
        self.slot.cell_addr() == other.slot.cell_addr()
    }

    pub(crate) fn capture(&self, id: FieldId) -> Result<Box<dyn TrackedValue>, HistoryError> {
        self.slot.capture(id)
    }

    pub(crate) fn exchange(
        &self,
        id: FieldId,
        value: Box<dyn TrackedValue>,
    ) -> Result<Box<dyn TrackedValue>, HistoryError> {
        self.slot.exchange(id, value)
    }

    pub(crate) fn addr(&self) -> usize {
        self.slot.cell_addr()
    }
}

impl fmt::Debug for TrackedHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "TrackedHandle({} @ {:#x})",
            self.slot.type_name(),
            self.slot.cell_addr()
        )
    }
}

impl PartialEq for TrackedHandle {
    fn eq(&self, other: &Self) -> bool {
        self.same_object(other)
    }
}

impl Eq for TrackedHandle {}

// ============================================================================
// Tests
// ============================================================================
