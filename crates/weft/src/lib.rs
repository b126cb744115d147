#![forbid(unsafe_code)]

//! weft: minimal reactive data binding.
//!
//! A [`ViewModel`] keeps a view tree in sync with a mutable model without
//! re-rendering. Every model property knows exactly which view fragments
//! read it; writing the property updates those fragments and nothing else.
//!
//! ```ignore
//! use weft::prelude::*;
//! use serde_json::json;
//!
//! let vm = mount_markup(
//!     r#"<div id="app"><p>Hello {{info.name}}</p></div>"#,
//!     ModelOptions::new().el("#app").data(json!({"info": {"name": "a"}})),
//! )?;
//! assert_eq!(vm.root().text_content(), "Hello a");
//!
//! vm.set_path("info.name", "b")?;
//! assert_eq!(vm.root().text_content(), "Hello b");
//! ```
//!
//! # Crates
//!
//! | Crate | Role |
//! |---|---|
//! | `weft-reactive` | values, paths, dependency sets, watchers |
//! | `weft-view` | render target, markup, templates, binder |
//! | `weft` | options, computed properties, the view model |
//!
//! Everything is single-threaded: handles are `Rc`-based and `!Send`.

pub mod computed;
pub mod error;
pub mod model;
pub mod options;

pub use computed::{ComputedSet, Getter};
pub use error::{Error, Result};
pub use model::{ViewModel, mount_markup};
pub use options::{ModelOptions, MountedHook};

pub use weft_reactive as reactive;
pub use weft_view as view;

/// Common imports.
pub mod prelude {
    pub use crate::{Error, ModelOptions, Result, ViewModel, mount_markup};
    pub use weft_reactive::{Object, PropPath, ReactiveError, Value, Watcher, observe};
    pub use weft_view::{BindReport, Document, ViewNode};
}
