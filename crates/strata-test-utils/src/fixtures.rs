//! Panic-injecting element fixtures.
//!
//! - [`PanicOnClone`]: clones succeed until a shared [`CloneBudget`]
//!   runs out, then panic. Used to check that containers stay valid and
//!   leak nothing when an element copy unwinds mid-operation.

use std::cell::Cell;
use std::rc::Rc;

use crate::Tracked;

/// Shared count of clones still allowed to succeed.
#[derive(Clone, Debug, Default)]
pub struct CloneBudget(Rc<Cell<usize>>);

impl CloneBudget {
    pub fn new(clones: usize) -> Self {
        Self(Rc::new(Cell::new(clones)))
    }

    pub fn remaining(&self) -> usize {
        self.0.get()
    }

    /// Allow `clones` more clones.
    pub fn set(&self, clones: usize) {
        self.0.set(clones);
    }

    /// Allow clones indefinitely.
    pub fn unlimited(&self) {
        self.0.set(usize::MAX);
    }

    fn spend(&self) -> bool {
        match self.0.get() {
            0 => false,
            usize::MAX => true,
            n => {
                self.0.set(n - 1);
                true
            }
        }
    }
}

/// Element whose `clone` panics once its budget is spent.
///
/// Carries a [`Tracked`] payload so leaks show up in the thread's
/// [`Ledger`](crate::Ledger).
#[derive(Debug)]
pub struct PanicOnClone {
    payload: Tracked,
    budget: CloneBudget,
}

impl PanicOnClone {
    pub fn new(value: i64, budget: &CloneBudget) -> Self {
        Self {
            payload: Tracked::new(value),
            budget: budget.clone(),
        }
    }

    pub fn value(&self) -> i64 {
        self.payload.value()
    }
}

impl Clone for PanicOnClone {
    fn clone(&self) -> Self {
        if !self.budget.spend() {
            panic!("clone budget exhausted cloning {}", self.value());
        }
        Self {
            payload: self.payload.clone(),
            budget: self.budget.clone(),
        }
    }
}
