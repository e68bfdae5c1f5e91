//! Test utilities for Strata development.
//!
//! Provides [`Tracked`], a demonstration element whose constructions,
//! clones and drops are counted in a per-thread [`Ledger`], and
//! [`RecordingObserver`], an [`Observer`] that records every lifecycle
//! event a container emits. Panic-injecting fixtures live in
//! [`fixtures`].

#![forbid(unsafe_code)]
#![allow(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

pub mod fixtures;

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use indexmap::IndexMap;
use strata_core::{Event, EventKind, Observer};

pub use fixtures::{CloneBudget, PanicOnClone};

/// Per-thread tally of [`Tracked`] lifecycle operations.
///
/// The test harness runs each test on its own thread, so a test sees only
/// its own values. Call [`Ledger::reset`] at the top of a test anyway when
/// the thread may be reused.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Ledger {
    pub created: usize,
    pub cloned: usize,
    pub dropped: usize,
}

thread_local! {
    static LEDGER: Cell<Ledger> = const {
        Cell::new(Ledger {
            created: 0,
            cloned: 0,
            dropped: 0,
        })
    };
}

impl Ledger {
    /// Current tally for this thread.
    pub fn snapshot() -> Ledger {
        LEDGER.with(Cell::get)
    }

    /// Zero this thread's tally.
    pub fn reset() {
        LEDGER.with(|l| l.set(Ledger::default()));
    }

    /// Values constructed or cloned and not yet dropped.
    pub fn live(&self) -> usize {
        (self.created + self.cloned).saturating_sub(self.dropped)
    }

    fn record(update: impl FnOnce(&mut Ledger)) {
        LEDGER.with(|cell| {
            let mut ledger = cell.get();
            update(&mut ledger);
            cell.set(ledger);
        });
    }
}

/// Demonstration element type.
///
/// Default-constructible, cloneable and droppable, and nothing else is
/// required of it. Each of those operations is counted in the thread's
/// [`Ledger`] and traced through `log` under the `strata::tracked`
/// target.
#[derive(Debug, PartialEq, Eq)]
pub struct Tracked {
    value: i64,
}

impl Tracked {
    pub fn new(value: i64) -> Self {
        Ledger::record(|l| l.created += 1);
        log::trace!(target: "strata::tracked", "construct {value}");
        Self { value }
    }

    pub fn value(&self) -> i64 {
        self.value
    }

    pub fn set(&mut self, value: i64) {
        self.value = value;
    }
}

impl Default for Tracked {
    fn default() -> Self {
        Self::new(0)
    }
}

impl Clone for Tracked {
    fn clone(&self) -> Self {
        Ledger::record(|l| l.cloned += 1);
        log::trace!(target: "strata::tracked", "clone {}", self.value);
        Self { value: self.value }
    }
}

impl Drop for Tracked {
    fn drop(&mut self) {
        Ledger::record(|l| l.dropped += 1);
        log::trace!(target: "strata::tracked", "drop {}", self.value);
    }
}

impl From<i64> for Tracked {
    fn from(value: i64) -> Self {
        Self::new(value)
    }
}

#[derive(Debug, Default)]
struct Record {
    counts: IndexMap<EventKind, usize>,
    events: Vec<Event>,
}

/// Observer that records every event it sees.
///
/// Clones share one record, so a container and its copies (which clone
/// their observer) all report into the same place. Per-kind counts are
/// kept in first-seen order.
#[derive(Clone, Debug, Default)]
pub struct RecordingObserver {
    record: Rc<RefCell<Record>>,
}

impl RecordingObserver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of events of `kind` seen so far.
    pub fn count(&self, kind: EventKind) -> usize {
        self.record.borrow().counts.get(&kind).copied().unwrap_or(0)
    }

    /// Distinct event kinds in the order they were first seen.
    pub fn kinds(&self) -> Vec<EventKind> {
        self.record.borrow().counts.keys().copied().collect()
    }

    /// Every event seen, in order.
    pub fn events(&self) -> Vec<Event> {
        self.record.borrow().events.clone()
    }

    pub fn total(&self) -> usize {
        self.record.borrow().events.len()
    }

    pub fn clear(&self) {
        let mut record = self.record.borrow_mut();
        record.counts.clear();
        record.events.clear();
    }
}

impl Observer for RecordingObserver {
    fn observe(&self, event: Event) {
        let mut record = self.record.borrow_mut();
        *record.counts.entry(event.kind()).or_insert(0) += 1;
        record.events.push(event);
    }
}
