#![forbid(unsafe_code)]

//! Computed properties.
//!
//! A computed property is a named getter over the view model. It is
//! evaluated on every read, with no caching, and always with dependency
//! tracking suspended: reading a computed key inside a watcher construction
//! registers nothing for the getter's own reads. A watcher bound to a
//! computed key therefore does not fire when the getter's inputs change.

use std::fmt;
use std::rc::Rc;

use ahash::AHashMap;
use weft_reactive::{Value, untracked};

use crate::model::ViewModel;

/// Getter of a computed property.
pub type Getter = Rc<dyn Fn(&ViewModel) -> Value>;

/// Named getters in installation order.
#[derive(Clone, Default)]
pub struct ComputedSet {
    getters: AHashMap<String, Getter>,
    order: Vec<String>,
}

impl ComputedSet {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Install `getter` under `name`, replacing any earlier getter.
    pub fn insert(&mut self, name: impl Into<String>, getter: Getter) {
        let name = name.into();
        if self.getters.insert(name.clone(), getter).is_none() {
            self.order.push(name);
        }
    }

    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.getters.contains_key(name)
    }

    #[must_use]
    pub fn names(&self) -> &[String] {
        &self.order
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.order.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Run the getter for `name` untracked.
    #[must_use]
    pub fn evaluate(&self, name: &str, vm: &ViewModel) -> Option<Value> {
        let getter = Rc::clone(self.getters.get(name)?);
        tracing::trace!(name, "computed evaluated");
        Some(untracked(|| getter(vm)))
    }
}

impl fmt::Debug for ComputedSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ComputedSet")
            .field("names", &self.order)
            .finish()
    }
}
