#![forbid(unsafe_code)]

//! Intercepted objects.
//!
//! An [`Object`] is a shared, ordered map from keys to properties. Each
//! property owns its current [`Value`] and a [`Dep`]. Interception is
//! explicit: reads go through [`Object::get`], writes through
//! [`Object::set`].
//!
//! - `get` registers the active watcher (see [`tracking`](crate::tracking))
//!   in the property's `Dep`, then returns the stored value.
//! - `set` compares the new value with the stored one. Equal values are a
//!   no-op; anything else is stored and the `Dep` is notified with the new
//!   value.
//!
//! Nested objects are intercepted when the value tree is built
//! ([`observe`], [`Value::from_json`], `FromIterator`), once per object
//! instance. Storing an existing `Object` under another key shares it rather
//! than wrapping it again, so no property ever gets a second `Dep`.

use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};

use ahash::AHashMap;

use crate::dep::Dep;
use crate::tracking;
use crate::value::Value;

/// Build an intercepted value tree from JSON.
///
/// Leaves and arrays pass through unchanged in shape; every JSON object,
/// at any depth, becomes an [`Object`].
#[must_use]
pub fn observe(json: serde_json::Value) -> Value {
    Value::from_json(json)
}

struct Property {
    value: RefCell<Value>,
    dep: Dep,
}

impl Property {
    fn new(value: Value) -> Rc<Self> {
        Rc::new(Self {
            value: RefCell::new(value),
            dep: Dep::new(),
        })
    }
}

#[derive(Default)]
struct ObjectInner {
    props: RefCell<AHashMap<String, Rc<Property>>>,
    order: RefCell<Vec<String>>,
}

/// A shared handle to an intercepted object.
///
/// Cloning the handle shares the same properties; equality between
/// [`Value::Object`]s is handle identity.
#[derive(Clone, Default)]
pub struct Object {
    inner: Rc<ObjectInner>,
}

/// A non-owning handle to an [`Object`].
#[derive(Clone, Default)]
pub struct WeakObject {
    inner: Weak<ObjectInner>,
}

impl WeakObject {
    #[must_use]
    pub fn upgrade(&self) -> Option<Object> {
        self.inner.upgrade().map(|inner| Object { inner })
    }
}

impl fmt::Debug for WeakObject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WeakObject")
            .field("alive", &(self.inner.strong_count() > 0))
            .finish()
    }
}

impl Object {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn property(&self, key: &str) -> Option<Rc<Property>> {
        self.inner.props.borrow().get(key).cloned()
    }

    /// Read a property, registering the active watcher in its `Dep`.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<Value> {
        let prop = self.property(key)?;
        if let Some(active) = tracking::active() {
            if active.dedup {
                prop.dep.add_dep_once(active.watcher, active.depth);
            } else {
                prop.dep.add_dep(active.watcher, active.depth);
            }
            tracing::trace!(key, depth = active.depth, "dependency registered");
        }
        let value = prop.value.borrow().clone();
        Some(value)
    }

    /// Read a property without registering anything.
    #[must_use]
    pub fn peek(&self, key: &str) -> Option<Value> {
        self.property(key).map(|prop| prop.value.borrow().clone())
    }

    /// Write a property.
    ///
    /// Returns `false` (and notifies nobody) when `value` equals the stored
    /// value. A key that does not exist yet is added without notification,
    /// since nothing can depend on it.
    pub fn set(&self, key: &str, value: impl Into<Value>) -> bool {
        let value = value.into();
        let Some(prop) = self.property(key) else {
            tracing::debug!(key, kind = value.kind(), "property added");
            self.insert_property(key, value);
            return true;
        };
        if *prop.value.borrow() == value {
            return false;
        }
        prop.value.replace(value.clone());
        tracing::debug!(
            key,
            kind = value.kind(),
            subscribers = prop.dep.len(),
            "property changed"
        );
        prop.dep.notify(&value);
        true
    }

    fn insert_property(&self, key: &str, value: Value) {
        let previous = self
            .inner
            .props
            .borrow_mut()
            .insert(key.to_owned(), Property::new(value));
        if previous.is_none() {
            self.inner.order.borrow_mut().push(key.to_owned());
        }
    }

    /// Keys in insertion order.
    #[must_use]
    pub fn keys(&self) -> Vec<String> {
        self.inner.order.borrow().clone()
    }

    #[must_use]
    pub fn contains_key(&self, key: &str) -> bool {
        self.inner.props.borrow().contains_key(key)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.order.borrow().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inner.order.borrow().is_empty()
    }

    /// Number of registrations in the property's `Dep`, or `None` if the
    /// key does not exist.
    #[must_use]
    pub fn subscriber_count(&self, key: &str) -> Option<usize> {
        self.property(key).map(|prop| prop.dep.len())
    }

    #[must_use]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }

    #[must_use]
    pub fn downgrade(&self) -> WeakObject {
        WeakObject {
            inner: Rc::downgrade(&self.inner),
        }
    }

    /// Snapshot as JSON, untracked.
    #[must_use]
    pub fn to_json(&self) -> serde_json::Value {
        let map = self
            .keys()
            .into_iter()
            .filter_map(|key| {
                let value = self.peek(&key)?;
                Some((key, value.to_json()))
            })
            .collect();
        serde_json::Value::Object(map)
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Object {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let obj = Self::new();
        for (key, value) in iter {
            obj.insert_property(&key.into(), value.into());
        }
        obj
    }
}

impl fmt::Debug for Object {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Object")
            .field("keys", &self.inner.order.borrow())
            .finish()
    }
}
