#![forbid(unsafe_code)]

//! Path watchers.
//!
//! A [`Watcher`] binds a dotted path to a callback. Construction resolves the
//! path once inside a [`TrackingScope`], so every property along the path
//! records the watcher in its [`Dep`](crate::Dep), each registration tagged
//! with the index of the segment it guards.
//!
//! # Updates
//!
//! When any property on the path changes, its `Dep` calls
//! [`Watcher::update`] with the new value and the segment index. For the
//! leaf that value is passed straight to the callback. For an ancestor, the
//! remaining segments are resolved from the ancestor's new value and the
//! callback receives the leaf; the watcher is also re-registered on the
//! properties it reaches below the new ancestor (skipping registrations that
//! already exist), so nested writes under a replaced object stay live.
//!
//! A remainder that no longer resolves is logged and the callback receives
//! [`Value::Null`] as a placeholder.
//!
//! # Invariants
//!
//! 1. A watcher holds no cached value.
//! 2. Each delivered notification invokes the callback exactly once.
//! 3. The tracking slot is released when construction returns, on success
//!    and on failure.

use std::cell::Cell;
use std::fmt;
use std::rc::Rc;

use crate::error::Result;
use crate::path::{PathSource, PropPath};
use crate::tracking::{self, TrackingScope};
use crate::value::Value;

struct WatcherInner {
    path: PropPath,
    callback: Box<dyn Fn(&Value)>,
    updates: Cell<u64>,
}

/// A subscription of a callback to a dotted path.
///
/// Cloning shares the same watcher.
#[derive(Clone)]
pub struct Watcher {
    inner: Rc<WatcherInner>,
}

impl Watcher {
    /// Create a watcher and register it on every property along `path`.
    ///
    /// A path that only partially resolves still registers on the prefix
    /// that exists, so the watcher fires once the missing part appears
    /// through an ancestor write.
    ///
    /// # Errors
    ///
    /// [`ReactiveError::ReentrantTracking`](crate::ReactiveError::ReentrantTracking)
    /// if another watcher is being constructed on this thread.
    pub fn new(
        root: &dyn PathSource,
        path: PropPath,
        callback: impl Fn(&Value) + 'static,
    ) -> Result<Self> {
        let watcher = Self::detached(path, callback);
        let _span = tracing::debug_span!("watcher.track", path = %watcher.path()).entered();
        let scope = TrackingScope::enter(&watcher)?;
        if let Err(err) = watcher.path().resolve(root) {
            tracing::debug!(%err, "tracking stopped early");
        }
        drop(scope);
        Ok(watcher)
    }

    /// A watcher registered nowhere. Useful for wiring a [`Dep`](crate::Dep)
    /// by hand.
    #[must_use]
    pub fn detached(path: PropPath, callback: impl Fn(&Value) + 'static) -> Self {
        Self {
            inner: Rc::new(WatcherInner {
                path,
                callback: Box::new(callback),
                updates: Cell::new(0),
            }),
        }
    }

    #[must_use]
    pub fn path(&self) -> &PropPath {
        &self.inner.path
    }

    /// Number of notifications delivered so far.
    #[must_use]
    pub fn update_count(&self) -> u64 {
        self.inner.updates.get()
    }

    #[must_use]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }

    /// Deliver a change of the property at segment `depth`.
    pub fn update(&self, depth: usize, value: &Value) {
        self.inner.updates.set(self.inner.updates.get() + 1);
        let leaf = if depth + 1 >= self.path().len() {
            value.clone()
        } else {
            self.resolve_below(depth, value)
        };
        (self.inner.callback)(&leaf);
    }

    fn resolve_below(&self, depth: usize, value: &Value) -> Value {
        let resolved = match TrackingScope::resubscribe(self) {
            Ok(_scope) => self.path().resolve_from(depth + 1, value.clone()),
            Err(err) => {
                tracing::warn!(%err, "re-subscription skipped");
                tracking::untracked(|| self.path().resolve_from(depth + 1, value.clone()))
            }
        };
        resolved.unwrap_or_else(|err| {
            tracing::warn!(%err, "watched path no longer resolves");
            Value::Null
        })
    }
}

impl fmt::Debug for Watcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Watcher")
            .field("path", self.path())
            .field("updates", &self.update_count())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ReactiveError;
    use crate::object::{Object, observe};
    use serde_json::json;
    use weft_harness::{CallLog, LogCapture};

    fn object(json: serde_json::Value) -> Object {
        observe(json).as_object().cloned().expect("object")
    }

    fn recording(root: &Object, path: &str) -> (Watcher, CallLog<Value>) {
        let seen = CallLog::new();
        let log = seen.clone();
        let watcher = Watcher::new(root, PropPath::parse(path).unwrap(), move |v: &Value| {
            log.push(v.clone());
        })
        .unwrap();
        (watcher, seen)
    }

    #[test]
    fn construction_registers_every_segment() {
        let root = object(json!({"info": {"name": "a"}}));
        let (_w, _) = recording(&root, "info.name");

        assert_eq!(root.subscriber_count("info"), Some(1));
        let info = root.peek("info").unwrap();
        assert_eq!(info.as_object().unwrap().subscriber_count("name"), Some(1));
        assert!(!tracking::is_tracking());
    }

    #[test]
    fn leaf_write_delivers_leaf() {
        let root = object(json!({"info": {"name": "a"}}));
        let (w, seen) = recording(&root, "info.name");

        let info = root.peek("info").unwrap();
        info.as_object().unwrap().set("name", "b");
        assert_eq!(seen.entries(), vec![Value::from("b")]);
        assert_eq!(w.update_count(), 1);
    }

    #[test]
    fn ancestor_write_delivers_leaf_of_new_ancestor() {
        let root = object(json!({"info": {"name": "a"}}));
        let (_w, seen) = recording(&root, "info.name");

        root.set("info", observe(json!({"name": "c"})));
        assert_eq!(seen.entries(), vec![Value::from("c")]);
    }

    #[test]
    fn replaced_ancestor_keeps_nested_writes_live() {
        let root = object(json!({"info": {"name": "a"}}));
        let (_w, seen) = recording(&root, "info.name");

        root.set("info", observe(json!({"name": "c"})));
        let fresh = root.peek("info").unwrap();
        fresh.as_object().unwrap().set("name", "d");
        assert_eq!(seen.entries(), vec![Value::from("c"), Value::from("d")]);
    }

    #[test]
    fn restoring_old_ancestor_does_not_duplicate() {
        let root = object(json!({"info": {"name": "a"}}));
        let original = root.peek("info").unwrap();
        let (_w, seen) = recording(&root, "info.name");

        root.set("info", observe(json!({"name": "c"})));
        root.set("info", original.clone());
        assert_eq!(original.as_object().unwrap().subscriber_count("name"), Some(1));

        original.as_object().unwrap().set("name", "z");
        assert_eq!(seen.last(), Some(Value::from("z")));
        assert_eq!(seen.len(), 3);
    }

    #[test]
    fn ancestor_without_leaf_delivers_placeholder() {
        let root = object(json!({"info": {"name": "a"}}));
        let (_w, seen) = recording(&root, "info.name");

        let logs = LogCapture::with_filter("weft_reactive=warn");
        root.set("info", observe(json!({"other": 1})));
        assert_eq!(seen.entries(), vec![Value::Null]);
        assert_eq!(logs.count("watched path no longer resolves"), 1);
        assert!(logs.contains("name"), "{}", logs.contents());
    }

    #[test]
    fn partially_resolved_path_registers_prefix() {
        let root = object(json!({"info": {}}));
        let (_w, seen) = recording(&root, "info.name");
        assert_eq!(root.subscriber_count("info"), Some(1));

        root.set("info", observe(json!({"name": "late"})));
        assert_eq!(seen.entries(), vec![Value::from("late")]);
    }

    #[test]
    fn reentrant_construction_is_rejected() {
        let root = object(json!({"a": 1}));
        let outer = Watcher::detached(PropPath::parse("outer").unwrap(), |_: &Value| {});
        let _scope = TrackingScope::enter(&outer).unwrap();

        let err = Watcher::new(&root, PropPath::parse("a").unwrap(), |_: &Value| {}).unwrap_err();
        assert!(matches!(err, ReactiveError::ReentrantTracking { .. }));
        assert_eq!(root.subscriber_count("a"), Some(0), "rejected watcher read nothing");
    }

    #[test]
    fn self_referencing_path_registers_twice() {
        let root = object(json!({"x": 1}));
        root.set("me", root.clone());
        let (_w, seen) = recording(&root, "me.me");
        assert_eq!(root.subscriber_count("me"), Some(2));

        root.set("me", observe(json!({"me": "leaf"})));
        assert_eq!(seen.len(), 2, "one callback per registration");
    }
}
