#![forbid(unsafe_code)]

//! Error taxonomy for history operations.
//!
//! Two families:
//!
//! - **Precondition violations** ([`NothingToRevert`](HistoryError::NothingToRevert),
//!   [`NothingToRemake`](HistoryError::NothingToRemake),
//!   [`RemakePending`](HistoryError::RemakePending)) — a programmer-contract
//!   breach. The engine's own state is untouched; callers are expected to
//!   gate on `can_revert`/`can_remake` instead of probing.
//! - **Internal consistency failures** (the rest) — a tracked field could not
//!   be captured or restored. History may be mid-application; the expected
//!   recovery is `forget()` plus a user-facing diagnostic.
//!
//! Disabled-state calls are deliberately *not* errors and never appear here.

use std::fmt;

use crate::field::FieldId;

/// Failure modes of commit, revert, remake, and assimilate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HistoryError {
    /// Revert requested while the revert stack is empty.
    NothingToRevert,
    /// Remake requested while the remake stack is empty.
    NothingToRemake,
    /// Assimilate requested while a remake path exists; squashing would
    /// silently destroy the redo target.
    RemakePending,
    /// A tracked object no longer declares the requested field.
    UnknownField { field: FieldId },
    /// A captured value no longer matches the declared type of its field.
    ValueTypeMismatch { field: FieldId },
    /// The object holding the field was borrowed elsewhere when the engine
    /// needed to read or write it.
    ObjectUnavailable { field: FieldId },
}

impl fmt::Display for HistoryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NothingToRevert => write!(f, "nothing to revert"),
            Self::NothingToRemake => write!(f, "nothing to remake"),
            Self::RemakePending => {
                write!(f, "cannot assimilate while a remake path exists")
            }
            Self::UnknownField { field } => {
                write!(f, "object does not declare tracked field '{field}'")
            }
            Self::ValueTypeMismatch { field } => {
                write!(f, "captured value no longer matches the type of field '{field}'")
            }
            Self::ObjectUnavailable { field } => {
                write!(f, "object holding field '{field}' is borrowed elsewhere")
            }
        }
    }
}

impl std::error::Error for HistoryError {}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_names_the_field() {
        let err = HistoryError::UnknownField { field: "estimate" };
        assert!(err.to_string().contains("estimate"));
    }

    #[test]
    fn precondition_errors_are_comparable() {
        assert_eq!(HistoryError::NothingToRevert, HistoryError::NothingToRevert);
        assert_ne!(HistoryError::NothingToRevert, HistoryError::NothingToRemake);
    }
}
