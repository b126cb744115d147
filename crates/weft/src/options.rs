#![forbid(unsafe_code)]

//! Mount options.
//!
//! [`ModelOptions`] is a builder consumed once by
//! [`ViewModel::mount`](crate::ViewModel::mount):
//!
//! ```ignore
//! let options = ModelOptions::new()
//!     .data(json!({"first": "Ada", "last": "Lovelace"}))
//!     .computed("full", |vm| {
//!         let first = vm.get("first").unwrap_or_default();
//!         let last = vm.get("last").unwrap_or_default();
//!         Value::from(format!("{first} {last}"))
//!     })
//!     .el("#app")
//!     .mounted(|vm| tracing::info!(keys = ?vm.data().keys(), "ready"));
//! ```
//!
//! `data` and `el` are required. `data` must describe an object, either as a
//! `serde_json::Value` or as JSON text.

use std::fmt;
use std::rc::Rc;

use weft_reactive::{Object, Value};
use weft_view::BinderConfig;

use crate::computed::ComputedSet;
use crate::error::{Error, Result};
use crate::model::ViewModel;

/// Lifecycle hook run once after binding completes.
pub type MountedHook = Box<dyn FnOnce(&ViewModel)>;

enum DataSource {
    Json(serde_json::Value),
    Text(String),
}

#[derive(Default)]
pub struct ModelOptions {
    data: Option<DataSource>,
    computed: ComputedSet,
    el: Option<String>,
    mounted: Option<MountedHook>,
    binder: BinderConfig,
}

impl ModelOptions {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn data(mut self, data: serde_json::Value) -> Self {
        self.data = Some(DataSource::Json(data));
        self
    }

    /// Model data as JSON text, parsed at mount time.
    #[must_use]
    pub fn data_json(mut self, text: impl Into<String>) -> Self {
        self.data = Some(DataSource::Text(text.into()));
        self
    }

    #[must_use]
    pub fn computed(
        mut self,
        name: impl Into<String>,
        getter: impl Fn(&ViewModel) -> Value + 'static,
    ) -> Self {
        self.computed.insert(name, Rc::new(getter));
        self
    }

    /// Locator of the mount root: `#id` or a tag name.
    #[must_use]
    pub fn el(mut self, locator: impl Into<String>) -> Self {
        self.el = Some(locator.into());
        self
    }

    #[must_use]
    pub fn mounted(mut self, hook: impl FnOnce(&ViewModel) + 'static) -> Self {
        self.mounted = Some(Box::new(hook));
        self
    }

    #[must_use]
    pub fn directive_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.binder = self.binder.with_directive_prefix(prefix);
        self
    }

    pub(crate) fn into_parts(self) -> Result<MountParts> {
        let el = self.el.ok_or(Error::InvalidOptions {
            reason: "`el` is required",
        })?;
        let data = self.data.ok_or(Error::InvalidOptions {
            reason: "`data` is required",
        })?;
        Ok(MountParts {
            data,
            computed: self.computed,
            el,
            mounted: self.mounted,
            binder: self.binder,
        })
    }
}

impl fmt::Debug for ModelOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModelOptions")
            .field("has_data", &self.data.is_some())
            .field("computed", &self.computed)
            .field("el", &self.el)
            .field("has_mounted", &self.mounted.is_some())
            .field("binder", &self.binder)
            .finish()
    }
}

/// Options split into the pieces mounting consumes in order.
pub(crate) struct MountParts {
    data: DataSource,
    pub(crate) computed: ComputedSet,
    pub(crate) el: String,
    pub(crate) mounted: Option<MountedHook>,
    pub(crate) binder: BinderConfig,
}

impl MountParts {
    /// Build the intercepted data object.
    pub(crate) fn observe_data(&mut self) -> Result<Object> {
        let data = std::mem::replace(&mut self.data, DataSource::Json(serde_json::Value::Null));
        let json = match data {
            DataSource::Json(json) => json,
            DataSource::Text(text) => serde_json::from_str(&text)?,
        };
        match Value::from_json(json) {
            Value::Object(obj) => Ok(obj),
            _ => Err(Error::InvalidOptions {
                reason: "`data` must be an object",
            }),
        }
    }
}
