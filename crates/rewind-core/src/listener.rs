#![forbid(unsafe_code)]

//! Weakly-held change listeners with sweep-on-notify pruning.
//!
//! The history engine outlives most of the UI components that observe it, so
//! the registry must never be the thing keeping a listener alive. Entries
//! are [`Weak`] handles: once every other strong reference to a listener is
//! gone, the entry is dead, and the next notification pass removes it in
//! place. Manual removal also works and takes effect immediately — a
//! removed listener sees no further notifications even though automatic
//! pruning is lazy.

use std::rc::{Rc, Weak};

/// What just happened to the history.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeKind {
    /// A new commit became head.
    Commit,
    /// History stepped backward.
    Revert,
    /// History stepped forward.
    Remake,
    /// All history was discarded.
    Forget,
    /// Past commits were squashed.
    Assimilate,
}

/// Observer of history state changes.
pub trait HistoryListener {
    /// Called after the engine's state changed.
    fn history_changed(&self, change: ChangeKind);
}

/// Registry of non-owning listener handles.
#[derive(Default)]
pub struct ListenerRegistry {
    entries: Vec<Weak<dyn HistoryListener>>,
}

impl ListenerRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Registers a listener. Re-adding a listener that is already present is
    /// a no-op.
    pub fn add(&mut self, listener: Rc<dyn HistoryListener>) {
        let addr = addr_of_rc(&listener);
        if self.entries.iter().any(|entry| addr_of_weak(entry) == addr) {
            return;
        }
        self.entries.push(Rc::downgrade(&listener));
    }

    /// Removes a listener immediately.
    pub fn remove(&mut self, listener: &Rc<dyn HistoryListener>) {
        let addr = addr_of_rc(listener);
        self.entries.retain(|entry| addr_of_weak(entry) != addr);
    }

    /// Notifies every listener that is still alive; dead entries are pruned
    /// in the same single pass.
    pub fn notify(&mut self, change: ChangeKind) {
        self.entries.retain(|entry| match entry.upgrade() {
            Some(listener) => {
                listener.history_changed(change);
                true
            }
            None => false,
        });
    }

    /// Number of registered handles, dead entries included until the next
    /// sweep.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when no handles are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

// Trait-object pointers are fat; identity comparison must use the data
// address only.
fn addr_of_weak(entry: &Weak<dyn HistoryListener>) -> *const () {
    entry.as_ptr().cast()
}

fn addr_of_rc(listener: &Rc<dyn HistoryListener>) -> *const () {
    Rc::as_ptr(listener).cast()
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use std::cell::RefCell;

    use super::*;

    struct Recorder {
        seen: RefCell<Vec<ChangeKind>>,
    }

    impl Recorder {
        fn new() -> Rc<Self> {
            Rc::new(Self {
                seen: RefCell::new(Vec::new()),
            })
        }
    }

    impl HistoryListener for Recorder {
        fn history_changed(&self, change: ChangeKind) {
            self.seen.borrow_mut().push(change);
        }
    }

    #[test]
    fn notify_reaches_live_listeners() {
        let mut registry = ListenerRegistry::new();
        let recorder = Recorder::new();
        registry.add(recorder.clone());

        registry.notify(ChangeKind::Commit);
        registry.notify(ChangeKind::Revert);

        assert_eq!(
            *recorder.seen.borrow(),
            vec![ChangeKind::Commit, ChangeKind::Revert]
        );
    }

    #[test]
    fn dropped_listeners_are_pruned_on_notify() {
        let mut registry = ListenerRegistry::new();
        let recorder = Recorder::new();
        registry.add(recorder.clone());
        assert_eq!(registry.len(), 1);

        drop(recorder);
        registry.notify(ChangeKind::Commit);

        assert!(registry.is_empty(), "dead entry swept during notification");
    }

    #[test]
    fn manual_remove_takes_effect_immediately() {
        let mut registry = ListenerRegistry::new();
        let recorder = Recorder::new();
        registry.add(recorder.clone());

        let as_dyn: Rc<dyn HistoryListener> = recorder.clone();
        registry.remove(&as_dyn);
        registry.notify(ChangeKind::Commit);

        assert!(recorder.seen.borrow().is_empty());
        assert!(registry.is_empty());
    }

    #[test]
    fn duplicate_registration_is_ignored() {
        let mut registry = ListenerRegistry::new();
        let recorder = Recorder::new();
        registry.add(recorder.clone());
        registry.add(recorder.clone());

        registry.notify(ChangeKind::Forget);

        assert_eq!(registry.len(), 1);
        assert_eq!(recorder.seen.borrow().len(), 1);
    }

    #[test]
    fn surviving_listeners_keep_receiving_after_a_sweep() {
        let mut registry = ListenerRegistry::new();
        let keeper = Recorder::new();
        let goner = Recorder::new();
        registry.add(keeper.clone());
        registry.add(goner.clone());

        drop(goner);
        registry.notify(ChangeKind::Commit);
        registry.notify(ChangeKind::Remake);

        assert_eq!(registry.len(), 1);
        assert_eq!(keeper.seen.borrow().len(), 2);
    }
}
