#![forbid(unsafe_code)]

//! Dependency tracking for weft.
//!
//! This crate provides the change-tracking core that keeps a view in sync
//! with a mutable model:
//!
//! - [`Value`]: the typed model representation (leaf, [`Object`], [`Array`]).
//! - [`Object`]: an intercepted object; reads register dependencies, writes
//!   notify them.
//! - [`Dep`]: the ordered subscriber list of one property.
//! - [`Watcher`]: a callback bound to a dotted [`PropPath`].
//! - [`TrackingScope`]: RAII ownership of the thread-local active-subscriber
//!   slot that correlates reads with the watcher performing them.
//!
//! # Architecture
//!
//! Everything is single-threaded and synchronous. Handles are `Rc`-based and
//! therefore `!Send`. A write walks its full subscriber chain before
//! returning; there is no batching and no deferral.
//!
//! Building a `Watcher` occupies the tracking slot, resolves the path once
//! (each [`Object::get`] on the way registers the watcher, tagged with the
//! segment index), then releases the slot. A later [`Object::set`] on any of
//! those properties notifies the watcher, which resolves the rest of its path
//! from the changed value and hands the leaf to its callback.
//!
//! # Invariants
//!
//! 1. Subscribers are notified in registration order.
//! 2. Setting a value equal to the current value is a no-op (no
//!    notification).
//! 3. Objects and arrays compare by identity; leaves by value.
//! 4. The tracking slot is empty whenever no watcher is being built, even
//!    after a failed or panicking resolution.
//! 5. Two watcher constructions never interleave on one thread; the second is
//!    rejected with [`ReactiveError::ReentrantTracking`].

pub mod dep;
pub mod error;
pub mod object;
pub mod path;
pub mod tracking;
pub mod value;
pub mod watcher;

pub use dep::Dep;
pub use error::{ReactiveError, Result};
pub use object::{Object, WeakObject, observe};
pub use path::{PathSource, PropPath};
pub use tracking::{TrackingScope, is_tracking, untracked};
pub use value::{Array, Value};
pub use watcher::Watcher;
