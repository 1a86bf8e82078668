#![forbid(unsafe_code)]

//! The undo/redo manager: roster, head, and the two history stacks.
//!
//! # Architecture
//!
//! ```text
//! commit("step3")
//! ┌────────────────────────────────────────────────────┐
//! │ Revert Stack: [#0, #1, #2]        Head: #3          │
//! │ Remake Stack: []                                    │
//! └────────────────────────────────────────────────────┘
//!
//! revert() x2
//! ┌────────────────────────────────────────────────────┐
//! │ Revert Stack: [#0]                Head: #1          │
//! │ Remake Stack: [#3, #2]                              │
//! └────────────────────────────────────────────────────┘
//!
//! commit("branch")  <-- fresh mutation, clears remake
//! ┌────────────────────────────────────────────────────┐
//! │ Revert Stack: [#0, #1]            Head: #4          │
//! │ Remake Stack: []                                    │
//! └────────────────────────────────────────────────────┘
//! ```
//!
//! # Invariants
//!
//! 1. The remake stack is empty immediately after every successful commit.
//! 2. Commit numbers are strictly increasing and never reused.
//! 3. With a retention bound of `k`, the revert stack never exceeds `k`
//!    entries after a commit, and eviction removes the oldest entry.
//! 4. A multi-step revert/remake either reaches its target, exhausts the
//!    stack, or stops at the first internal failure — in which case history
//!    is broken and the caller is expected to `forget`.
//!
//! Everything here is synchronous and single-threaded: the engine assumes
//! one logical mutator (a GUI event loop) and performs no locking.

use std::collections::VecDeque;
use std::fmt;
use std::rc::Rc;

use crate::commit::{Commit, CommitNumber};
use crate::error::HistoryError;
use crate::listener::{ChangeKind, HistoryListener, ListenerRegistry};
use crate::trackable::TrackedHandle;

/// Retention policy for the revert stack.
#[derive(Debug, Clone, Default)]
pub struct HistoryConfig {
    /// Maximum number of commits kept on the revert stack; the oldest entry
    /// is evicted first. `None` keeps history unbounded.
    pub maximum_commits: Option<usize>,
}

impl HistoryConfig {
    /// Unbounded history.
    #[must_use]
    pub fn unlimited() -> Self {
        Self {
            maximum_commits: None,
        }
    }

    /// History bounded to `maximum_commits` revertible entries.
    #[must_use]
    pub fn bounded(maximum_commits: usize) -> Self {
        Self {
            maximum_commits: Some(maximum_commits),
        }
    }
}

/// Manager for object-agnostic undo/redo history.
///
/// Owns the roster of tracked objects, the head commit, and the revert
/// (past) and remake (future) stacks. One instance per session or open
/// project; `forget(true)` is the "switch project" reset.
pub struct HistoryManager {
    head: Option<Commit>,
    /// Past commits, newest at the back.
    revert_stack: VecDeque<Commit>,
    /// Future commits, newest at the back.
    remake_stack: VecDeque<Commit>,
    roster: Vec<TrackedHandle>,
    commit_number: CommitNumber,
    config: HistoryConfig,
    disabled: bool,
    listeners: ListenerRegistry,
}

impl fmt::Debug for HistoryManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HistoryManager")
            .field("head", &self.head.as_ref().map(Commit::number))
            .field("revert_depth", &self.revert_stack.len())
            .field("remake_depth", &self.remake_stack.len())
            .field("roster", &self.roster.len())
            .field("disabled", &self.disabled)
            .field("config", &self.config)
            .finish()
    }
}

impl Default for HistoryManager {
    fn default() -> Self {
        Self::new(HistoryConfig::default())
    }
}

impl HistoryManager {
    /// Creates an empty manager with the given retention policy.
    #[must_use]
    pub fn new(config: HistoryConfig) -> Self {
        Self {
            head: None,
            revert_stack: VecDeque::new(),
            remake_stack: VecDeque::new(),
            roster: Vec::new(),
            commit_number: 0,
            config,
            disabled: false,
            listeners: ListenerRegistry::new(),
        }
    }

    // ========================================================================
    // Roster
    // ========================================================================

    /// Registers an object for tracking. Re-adding an object that is already
    /// tracked is a no-op.
    pub fn add(&mut self, object: TrackedHandle) {
        if self.roster.iter().any(|o| o.same_object(&object)) {
            return;
        }
        self.roster.push(object);
    }

    /// Stops tracking an object. Commits already holding it are unaffected.
    pub fn remove(&mut self, object: &TrackedHandle) {
        self.roster.retain(|o| !o.same_object(object));
    }

    /// Number of objects currently registered.
    #[must_use]
    pub fn roster_len(&self) -> usize {
        self.roster.len()
    }

    // ========================================================================
    // Commit
    // ========================================================================

    /// Captures the state of every tracked field of every registered object
    /// as the new head commit.
    ///
    /// Returns the new commit number, or `None` while the engine is disabled
    /// (a disabled commit is a no-op, not an error).
    ///
    /// If the new commit is state-identical to the top of the revert stack,
    /// that duplicate is dropped again and its message folded into the new
    /// head's message — committing a no-op never grows history.
    pub fn commit(&mut self, message: &str) -> Result<Option<CommitNumber>, HistoryError> {
        if self.disabled {
            return Ok(None);
        }
        let number = self.commit_number;
        let mut commit = Commit::capture(number, message, &self.roster)?;

        if let Some(previous_head) = self.head.take() {
            self.revert_stack.push_back(previous_head);
        }

        let is_duplicate = self
            .revert_stack
            .back()
            .is_some_and(|top| commit.same_state(top));
        if is_duplicate {
            if let Some(duplicate) = self.revert_stack.pop_back() {
                if !commit.message().contains(duplicate.message()) {
                    let merged = format!("{}, {}", commit.message(), duplicate.message());
                    commit.set_message(merged);
                }
            }
        }

        if let Some(maximum) = self.config.maximum_commits {
            while self.revert_stack.len() > maximum {
                self.revert_stack.pop_front();
            }
        }

        self.remake_stack.clear();
        self.head = Some(commit);
        self.commit_number += 1;
        tracing::debug!(
            number,
            coalesced = is_duplicate,
            revert_depth = self.revert_stack.len(),
            "commit"
        );
        self.notify(ChangeKind::Commit);
        Ok(Some(number))
    }

    /// Commit wrapper for callers that must never fail over undo/redo.
    ///
    /// On an internal-consistency failure this drops all history and reports
    /// the last issued commit number (or 0) instead of propagating. This is
    /// a deliberate, documented fallback, not a silent catch-all: the error
    /// is logged before history is discarded.
    pub fn commit_or_reset(&mut self, message: &str) -> Option<CommitNumber> {
        match self.commit(message) {
            Ok(number) => number,
            Err(error) => {
                tracing::error!(%error, "commit failed; dropping history");
                self.forget(false);
                Some(self.commit_number.saturating_sub(1))
            }
        }
    }

    // ========================================================================
    // Revert / Remake
    // ========================================================================

    /// Steps back to the most recent past commit.
    pub fn revert(&mut self) -> Result<(), HistoryError> {
        let target = self
            .revert_stack
            .back()
            .map(Commit::number)
            .ok_or(HistoryError::NothingToRevert)?;
        self.revert_to(target)
    }

    /// Steps back through past commits until the commit numbered `target`
    /// has been applied, or the revert stack is exhausted.
    ///
    /// Each step moves the current head to the remake stack, applies the
    /// popped commit onto the live objects, and installs both the commit and
    /// its recorded roster. Listeners are notified once, after the loop.
    pub fn revert_to(&mut self, target: CommitNumber) -> Result<(), HistoryError> {
        if !self.can_revert() {
            return Err(HistoryError::NothingToRevert);
        }
        while let Some(commit) = self.revert_stack.pop_back() {
            if let Some(head) = self.head.take() {
                self.remake_stack.push_back(head);
            }
            commit.apply()?;
            self.roster = commit.roster().to_vec();
            let reached = commit.number() == target;
            self.head = Some(commit);
            if reached {
                break;
            }
        }
        tracing::debug!(target, remake_depth = self.remake_stack.len(), "revert");
        self.notify(ChangeKind::Revert);
        Ok(())
    }

    /// Steps forward to the next future commit.
    pub fn remake(&mut self) -> Result<(), HistoryError> {
        let target = self
            .remake_stack
            .back()
            .map(Commit::number)
            .ok_or(HistoryError::NothingToRemake)?;
        self.remake_to(target)
    }

    /// Steps forward through future commits until the commit numbered
    /// `target` has been applied, or the remake stack is exhausted.
    pub fn remake_to(&mut self, target: CommitNumber) -> Result<(), HistoryError> {
        if !self.can_remake() {
            return Err(HistoryError::NothingToRemake);
        }
        while let Some(commit) = self.remake_stack.pop_back() {
            if let Some(head) = self.head.take() {
                self.revert_stack.push_back(head);
            }
            commit.apply()?;
            self.roster = commit.roster().to_vec();
            let reached = commit.number() == target;
            self.head = Some(commit);
            if reached {
                break;
            }
        }
        tracing::debug!(target, revert_depth = self.revert_stack.len(), "remake");
        self.notify(ChangeKind::Remake);
        Ok(())
    }

    /// Re-applies the head commit onto the live objects, discarding any
    /// uncommitted drift since it was taken.
    pub fn revert_to_head(&mut self) -> Result<(), HistoryError> {
        if let Some(head) = &self.head {
            head.apply()?;
        }
        Ok(())
    }

    // ========================================================================
    // Forget / Assimilate
    // ========================================================================

    /// Discards all history. With `clear_roster`, also stops tracking every
    /// registered object — the "switch project, start fresh" transition.
    pub fn forget(&mut self, clear_roster: bool) {
        self.revert_stack.clear();
        self.remake_stack.clear();
        self.head = None;
        if clear_roster {
            self.roster.clear();
        }
        tracing::debug!(clear_roster, "history forgotten");
        self.notify(ChangeKind::Forget);
    }

    /// Squashes every past commit strictly newer than `target` out of
    /// existence, leaving the commit numbered `target` (or the oldest
    /// available boundary) as head.
    ///
    /// The live objects are untouched; the caller is expected to follow up
    /// with a fresh `commit` carrying a summary message for the squashed
    /// range. Fails while a remake path exists, because squashing would
    /// silently destroy the redo target.
    pub fn assimilate(&mut self, target: CommitNumber) -> Result<(), HistoryError> {
        if self.can_remake() {
            return Err(HistoryError::RemakePending);
        }
        while let Some(commit) = self.revert_stack.pop_back() {
            let reached = commit.number() == target;
            self.head = Some(commit);
            if reached {
                break;
            }
        }
        tracing::debug!(target, revert_depth = self.revert_stack.len(), "assimilate");
        self.notify(ChangeKind::Assimilate);
        Ok(())
    }

    /// Commits a boundary for a logical group of changes; the returned
    /// number is the `end_group` target.
    pub fn start_group(&mut self, message: &str) -> Result<Option<CommitNumber>, HistoryError> {
        self.commit(message)
    }

    /// Squashes every commit made since the `start_group` boundary and
    /// replaces them with a single commit labelled `message`.
    ///
    /// Intermediate commits made inside the group keep partial-failure
    /// safety while the operation runs; on success they collapse into one
    /// history entry.
    pub fn end_group(
        &mut self,
        start: CommitNumber,
        message: &str,
    ) -> Result<Option<CommitNumber>, HistoryError> {
        if self.disabled {
            return Ok(None);
        }
        self.assimilate(start)?;
        self.commit(message)
    }

    // ========================================================================
    // Query
    // ========================================================================

    /// True when a revert is available.
    #[must_use]
    pub fn can_revert(&self) -> bool {
        !self.revert_stack.is_empty()
    }

    /// True when a remake is available.
    #[must_use]
    pub fn can_remake(&self) -> bool {
        !self.remake_stack.is_empty()
    }

    /// Message of the change a `revert` would undo.
    #[must_use]
    pub fn revert_message(&self) -> Option<&str> {
        if self.can_revert() {
            self.head.as_ref().map(Commit::message)
        } else {
            None
        }
    }

    /// Message of the change a `remake` would reapply.
    #[must_use]
    pub fn remake_message(&self) -> Option<&str> {
        self.remake_stack.back().map(Commit::message)
    }

    /// The commit representing current live state, if any.
    #[must_use]
    pub fn head(&self) -> Option<&Commit> {
        self.head.as_ref()
    }

    /// Depth of the revert stack.
    #[must_use]
    pub fn revert_depth(&self) -> usize {
        self.revert_stack.len()
    }

    /// Depth of the remake stack.
    #[must_use]
    pub fn remake_depth(&self) -> usize {
        self.remake_stack.len()
    }

    // ========================================================================
    // Policy
    // ========================================================================

    /// Sets the retention bound; `None` keeps history unbounded. Takes
    /// effect on the next commit.
    pub fn set_maximum_commits(&mut self, maximum_commits: Option<usize>) {
        self.config.maximum_commits = maximum_commits;
    }

    /// Current retention bound.
    #[must_use]
    pub fn maximum_commits(&self) -> Option<usize> {
        self.config.maximum_commits
    }

    /// Engine-wide kill-switch. While disabled, commits return `None`,
    /// listener registration is dropped, and no notifications are
    /// delivered; re-enabling restores prior behavior.
    pub fn set_disabled(&mut self, disabled: bool) {
        self.disabled = disabled;
    }

    /// True while the kill-switch is set.
    #[must_use]
    pub fn disabled(&self) -> bool {
        self.disabled
    }

    // ========================================================================
    // Listeners
    // ========================================================================

    /// Subscribes a listener. The registry holds it weakly: dropping every
    /// other strong reference unsubscribes it automatically.
    pub fn add_change_listener(&mut self, listener: Rc<dyn HistoryListener>) {
        if self.disabled {
            return;
        }
        self.listeners.add(listener);
    }

    /// Unsubscribes a listener immediately.
    pub fn remove_change_listener(&mut self, listener: &Rc<dyn HistoryListener>) {
        if self.disabled {
            return;
        }
        self.listeners.remove(listener);
    }

    fn notify(&mut self, change: ChangeKind) {
        if self.disabled {
            return;
        }
        self.listeners.notify(change);
    }
}

// ============================================================================
// Tests
// ============================================================================
