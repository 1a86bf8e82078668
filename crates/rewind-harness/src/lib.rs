#![forbid(unsafe_code)]

//! Test fixtures for the rewind history engine.
//!
//! Sample tracked domain types shaped like a small project tracker, a
//! deterministic sample-data generator, and a recording listener for
//! asserting on notifications. Everything here is plain data; the point is
//! to exercise the engine from the outside, the way an application would.

use std::cell::RefCell;
use std::rc::Rc;

use rewind_core::{ChangeKind, HistoryListener, Tracked, TrackedFields, TrackedHandle};

/// A person with a name and a set of skills.
#[derive(Debug, Clone, PartialEq)]
pub struct Person {
    pub name: String,
    pub skills: Vec<String>,
}

impl Person {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            skills: Vec::new(),
        }
    }
}

impl Tracked for Person {
    fn tracked_fields() -> TrackedFields<Self> {
        TrackedFields::new()
            .field("name", |p: &Person| p.name.clone(), |p, v| p.name = v)
            .field("skills", |p: &Person| p.skills.clone(), |p, v| p.skills = v)
    }
}

/// A team with a name and member names.
#[derive(Debug, Clone, PartialEq)]
pub struct Team {
    pub name: String,
    pub members: Vec<String>,
}

impl Team {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            members: Vec::new(),
        }
    }
}

impl Tracked for Team {
    fn tracked_fields() -> TrackedFields<Self> {
        TrackedFields::new()
            .field("name", |t: &Team| t.name.clone(), |t, v| t.name = v)
            .field("members", |t: &Team| t.members.clone(), |t, v| t.members = v)
    }
}

/// A story with a title, an estimate, and a completion flag.
#[derive(Debug, Clone, PartialEq)]
pub struct Story {
    pub title: String,
    pub estimate: i64,
    pub done: bool,
}

impl Story {
    #[must_use]
    pub fn new(title: impl Into<String>, estimate: i64) -> Self {
        Self {
            title: title.into(),
            estimate,
            done: false,
        }
    }
}

impl Tracked for Story {
    fn tracked_fields() -> TrackedFields<Self> {
        TrackedFields::new()
            .field("title", |s: &Story| s.title.clone(), |s, v| s.title = v)
            .field("estimate", |s: &Story| s.estimate, |s, v| s.estimate = v)
            .field("done", |s: &Story| s.done, |s, v| s.done = v)
    }
}

/// Wraps a fixture value in the shared cell shape the engine tracks, and
/// returns both the cell and its handle.
#[must_use]
pub fn tracked<O: Tracked>(object: O) -> (Rc<RefCell<O>>, TrackedHandle) {
    let cell = Rc::new(RefCell::new(object));
    let handle = TrackedHandle::new(cell.clone());
    (cell, handle)
}

const NAMES: [&str; 8] = [
    "Ada", "Grace", "Edsger", "Barbara", "Tony", "Niklaus", "Radia", "Donald",
];

const SKILLS: [&str; 6] = ["rust", "design", "review", "testing", "ops", "docs"];

const TITLES: [&str; 5] = [
    "sketch the board",
    "wire the backlog",
    "estimate velocity",
    "plan the release",
    "close the sprint",
];

/// Deterministic sample-data generator.
///
/// Cycles fixed pools so repeated runs produce identical fixtures; tests
/// stay reproducible without seeding anything.
#[derive(Debug, Default)]
pub struct SampleData {
    cursor: usize,
}

impl SampleData {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn person(&mut self) -> Person {
        let name = NAMES[self.cursor % NAMES.len()];
        let skill = SKILLS[self.cursor % SKILLS.len()];
        self.cursor += 1;
        let mut person = Person::new(name);
        person.skills.push(skill.to_string());
        person
    }

    pub fn team(&mut self, size: usize) -> Team {
        let mut team = Team::new(format!("team-{}", self.cursor));
        for _ in 0..size {
            team.members.push(self.person().name);
        }
        team
    }

    pub fn story(&mut self) -> Story {
        let title = TITLES[self.cursor % TITLES.len()];
        let estimate = (self.cursor % 13) as i64 + 1;
        self.cursor += 1;
        Story::new(title, estimate)
    }
}

/// Listener that records every notification it receives.
pub struct RecordingListener {
    seen: RefCell<Vec<ChangeKind>>,
}

impl RecordingListener {
    #[must_use]
    pub fn new() -> Rc<Self> {
        Rc::new(Self {
            seen: RefCell::new(Vec::new()),
        })
    }

    /// Everything received so far, in order.
    #[must_use]
    pub fn seen(&self) -> Vec<ChangeKind> {
        self.seen.borrow().clone()
    }

    /// How many notifications of `kind` were received.
    #[must_use]
    pub fn count(&self, kind: ChangeKind) -> usize {
        self.seen.borrow().iter().filter(|c| **c == kind).count()
    }

    /// Forgets everything received so far.
    pub fn clear(&self) {
        self.seen.borrow_mut().clear();
    }
}

impl HistoryListener for RecordingListener {
    fn history_changed(&self, change: ChangeKind) {
        tracing::trace!(?change, "recorded");
        self.seen.borrow_mut().push(change);
    }
}

// ============================================================================
// Tests
// ============================================================================
