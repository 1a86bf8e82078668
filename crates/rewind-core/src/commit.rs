#![forbid(unsafe_code)]

//! Whole-roster snapshots.
//!
//! A [`Commit`] is a moment, not a delta: it bundles one [`FieldSnapshot`]
//! for every tracked field of every object registered at capture time,
//! together with the roster itself. Applying a commit restores exactly that
//! moment, regardless of what happened to the live objects in between.

use std::fmt;

use rustc_hash::FxHashMap;

use crate::error::HistoryError;
use crate::field::{FieldId, FieldSnapshot};
use crate::trackable::TrackedHandle;

/// Strictly increasing commit sequence number. Assigned at creation, never
/// reused.
pub type CommitNumber = u64;

/// An immutable bundle of field snapshots for the entire tracked roster at
/// one moment, plus the roster that was registered when it was taken.
///
/// Only the message is mutable, and only so that coalesced no-op commits can
/// fold their descriptions together.
pub struct Commit {
    number: CommitNumber,
    message: String,
    snapshots: Vec<FieldSnapshot>,
    roster: Vec<TrackedHandle>,
}

impl Commit {
    /// Captures every tracked field of every object in `roster`.
    pub(crate) fn capture(
        number: CommitNumber,
        message: &str,
        roster: &[TrackedHandle],
    ) -> Result<Self, HistoryError> {
        let mut snapshots = Vec::new();
        for object in roster {
            for field in object.field_ids() {
                snapshots.push(FieldSnapshot::capture(object, field)?);
            }
        }
        Ok(Self {
            number,
            message: message.to_owned(),
            snapshots,
            roster: roster.to_vec(),
        })
    }

    /// The unique sequence number of this commit.
    #[must_use]
    pub fn number(&self) -> CommitNumber {
        self.number
    }

    /// The human-readable description of this commit.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }

    pub(crate) fn set_message(&mut self, message: String) {
        self.message = message;
    }

    /// The snapshots this commit bundles, in capture order.
    #[must_use]
    pub fn snapshots(&self) -> &[FieldSnapshot] {
        &self.snapshots
    }

    /// The objects that were registered when this commit was taken.
    #[must_use]
    pub fn roster(&self) -> &[TrackedHandle] {
        &self.roster
    }

    /// Restores every captured value onto the live objects.
    ///
    /// Either all snapshots apply or the first failure propagates; the
    /// engine treats a mid-apply failure as unrecoverable for the current
    /// history, and the caller resets via `forget`.
    pub(crate) fn apply(&self) -> Result<(), HistoryError> {
        for snapshot in &self.snapshots {
            snapshot.restore()?;
        }
        Ok(())
    }

    /// State equality: same (object, field) coverage with equal values.
    ///
    /// Field identity decides the match, never snapshot position — two
    /// commits that enumerate the same fields in different orders are still
    /// state-equal.
    #[must_use]
    pub fn same_state(&self, other: &Commit) -> bool {
        if self.snapshots.len() != other.snapshots.len() {
            return false;
        }
        let mut by_identity: FxHashMap<(usize, FieldId), &FieldSnapshot> = FxHashMap::default();
        for snapshot in &other.snapshots {
            by_identity.insert((snapshot.object().addr(), snapshot.field()), snapshot);
        }
        self.snapshots.iter().all(|snapshot| {
            by_identity
                .get(&(snapshot.object().addr(), snapshot.field()))
                .is_some_and(|candidate| snapshot.value().value_eq(candidate.value()))
        })
    }
}

impl fmt::Debug for Commit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Commit")
            .field("number", &self.number)
            .field("message", &self.message)
            .field("snapshots", &self.snapshots.len())
            .field("roster", &self.roster.len())
            .finish()
    }
}

// ============================================================================
// Tests
// ============================================================================
