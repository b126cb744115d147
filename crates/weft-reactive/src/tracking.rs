#![forbid(unsafe_code)]

//! The active-subscriber slot.
//!
//! While a [`Watcher`] resolves its path, the slot holds that watcher so that
//! every [`Object::get`](crate::Object::get) along the way can register it in
//! the property's [`Dep`](crate::Dep). The slot is thread-local and owned
//! through a [`TrackingScope`] guard, which clears it on every exit path,
//! including early returns from a failed resolution.
//!
//! # Invariants
//!
//! 1. At most one watcher occupies the slot per thread.
//! 2. Entering a scope while the slot is occupied fails with
//!    [`ReactiveError::ReentrantTracking`] and leaves the occupant in place.
//! 3. Dropping the guard empties the slot.
//! 4. [`untracked`] vacates the slot for the duration of its closure and
//!    restores the previous occupant afterwards, even on unwind.

use std::cell::RefCell;
use std::marker::PhantomData;
use std::rc::Rc;

use crate::error::{ReactiveError, Result};
use crate::watcher::Watcher;

thread_local! {
    static ACTIVE: RefCell<Option<Active>> = const { RefCell::new(None) };
}

/// Occupant of the slot.
#[derive(Clone)]
pub(crate) struct Active {
    pub(crate) watcher: Watcher,
    /// Index of the path segment currently being read.
    pub(crate) depth: usize,
    /// Skip registrations the dep already holds (re-subscription after an
    /// ancestor was replaced).
    pub(crate) dedup: bool,
}

/// RAII guard owning the active-subscriber slot.
#[must_use = "dropping this guard ends dependency tracking"]
pub struct TrackingScope {
    _not_send: PhantomData<Rc<()>>,
}

impl TrackingScope {
    /// Occupy the slot with `watcher` for a first-time path resolution.
    ///
    /// # Errors
    ///
    /// [`ReactiveError::ReentrantTracking`] if another watcher is tracking.
    pub fn enter(watcher: &Watcher) -> Result<Self> {
        Self::acquire(watcher, false)
    }

    /// Occupy the slot to re-subscribe `watcher` below a replaced ancestor.
    /// Registrations the dependency sets already hold are skipped.
    pub(crate) fn resubscribe(watcher: &Watcher) -> Result<Self> {
        Self::acquire(watcher, true)
    }

    fn acquire(watcher: &Watcher, dedup: bool) -> Result<Self> {
        ACTIVE.with(|slot| {
            let mut slot = slot.borrow_mut();
            if let Some(active) = slot.as_ref() {
                return Err(ReactiveError::ReentrantTracking {
                    active: active.watcher.path().to_string(),
                    requested: watcher.path().to_string(),
                });
            }
            *slot = Some(Active {
                watcher: watcher.clone(),
                depth: 0,
                dedup,
            });
            Ok(Self {
                _not_send: PhantomData,
            })
        })
    }
}

impl Drop for TrackingScope {
    fn drop(&mut self) {
        ACTIVE.with(|slot| slot.borrow_mut().take());
    }
}

impl std::fmt::Debug for TrackingScope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TrackingScope")
            .field("depth", &active().map(|a| a.depth))
            .finish()
    }
}

/// Whether a watcher currently occupies the slot on this thread.
#[must_use]
pub fn is_tracking() -> bool {
    ACTIVE.with(|slot| slot.borrow().is_some())
}

/// Run `f` with tracking suspended.
///
/// Reads inside `f` register nothing. The previous occupant, if any, is
/// restored when `f` returns or unwinds.
pub fn untracked<R>(f: impl FnOnce() -> R) -> R {
    let saved = ACTIVE.with(|slot| slot.borrow_mut().take());
    let _restore = Restore(saved);
    f()
}

struct Restore(Option<Active>);

impl Drop for Restore {
    fn drop(&mut self) {
        let saved = self.0.take();
        ACTIVE.with(|slot| *slot.borrow_mut() = saved);
    }
}

pub(crate) fn active() -> Option<Active> {
    ACTIVE.with(|slot| slot.borrow().clone())
}

/// Record which path segment the occupant is about to read.
pub(crate) fn descend(depth: usize) {
    ACTIVE.with(|slot| {
        if let Some(active) = slot.borrow_mut().as_mut() {
            active.depth = depth;
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::path::PropPath;
    use crate::value::Value;

    fn watcher(path: &str) -> Watcher {
        Watcher::detached(PropPath::parse(path).unwrap(), |_: &Value| {})
    }

    #[test]
    fn scope_occupies_and_releases_slot() {
        assert!(!is_tracking());
        {
            let _scope = TrackingScope::enter(&watcher("a")).unwrap();
            assert!(is_tracking());
        }
        assert!(!is_tracking());
    }

    #[test]
    fn reentry_is_rejected_without_disturbing_occupant() {
        let outer = watcher("outer.path");
        let _scope = TrackingScope::enter(&outer).unwrap();

        let err = TrackingScope::enter(&watcher("inner")).unwrap_err();
        assert_eq!(
            err,
            ReactiveError::ReentrantTracking {
                active: "outer.path".into(),
                requested: "inner".into(),
            }
        );
        let occupant = active().expect("outer still tracking");
        assert_eq!(occupant.watcher.path().to_string(), "outer.path");
    }

    #[test]
    fn untracked_suspends_and_restores() {
        let _scope = TrackingScope::enter(&watcher("a")).unwrap();
        let inside = untracked(is_tracking);
        assert!(!inside);
        assert!(is_tracking());
    }

    #[test]
    fn untracked_allows_nested_scope() {
        let _scope = TrackingScope::enter(&watcher("a")).unwrap();
        untracked(|| {
            let nested = TrackingScope::enter(&watcher("b"));
            assert!(nested.is_ok());
        });
        assert_eq!(active().unwrap().watcher.path().to_string(), "a");
    }

    #[test]
    fn descend_updates_depth() {
        let _scope = TrackingScope::enter(&watcher("a.b.c")).unwrap();
        descend(2);
        assert_eq!(active().unwrap().depth, 2);
    }

    #[test]
    fn slot_released_after_panic() {
        let result = std::panic::catch_unwind(|| {
            let _scope = TrackingScope::enter(&watcher("a")).unwrap();
            panic!("resolution blew up");
        });
        assert!(result.is_err());
        assert!(!is_tracking());
    }
}
