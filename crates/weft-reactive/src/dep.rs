#![forbid(unsafe_code)]

//! Per-property subscriber lists.
//!
//! # Invariants
//!
//! 1. Subscribers are notified in registration order.
//! 2. [`Dep::add_dep`] never deduplicates: a watcher whose path reads the
//!    same property twice is notified twice.
//! 3. Notification iterates a snapshot, so callbacks that register new
//!    subscribers (or re-enter `notify` on another dep) never disturb the
//!    pass in progress.
//! 4. Subscribers are never removed.

use std::cell::RefCell;

use crate::value::Value;
use crate::watcher::Watcher;

#[derive(Clone)]
struct Entry {
    watcher: Watcher,
    /// Index of the path segment this dep guards in the watcher's path.
    depth: usize,
}

/// The subscribers of a single property.
#[derive(Default)]
pub struct Dep {
    subs: RefCell<Vec<Entry>>,
}

impl Dep {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `watcher` as depending on this property at path segment
    /// `depth`.
    pub fn add_dep(&self, watcher: Watcher, depth: usize) {
        self.subs.borrow_mut().push(Entry { watcher, depth });
    }

    /// Register unless the same watcher is already present at `depth`.
    /// Returns whether a registration was added.
    pub(crate) fn add_dep_once(&self, watcher: Watcher, depth: usize) -> bool {
        let mut subs = self.subs.borrow_mut();
        if subs
            .iter()
            .any(|e| e.depth == depth && e.watcher.ptr_eq(&watcher))
        {
            return false;
        }
        subs.push(Entry { watcher, depth });
        true
    }

    /// Deliver `value` to every subscriber, synchronously, in order.
    pub fn notify(&self, value: &Value) {
        let snapshot = self.subs.borrow().clone();
        for entry in snapshot {
            entry.watcher.update(entry.depth, value);
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.subs.borrow().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.subs.borrow().is_empty()
    }
}

impl std::fmt::Debug for Dep {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dep")
            .field("subscribers", &self.len())
            .finish()
    }
}
