#![forbid(unsafe_code)]

//! The view model: data, computed properties and a bound view.
//!
//! [`ViewModel::mount`] runs the whole setup in a fixed order:
//!
//! 1. install computed getters;
//! 2. intercept the data ([`Value::from_json`] turns every object into an
//!    [`Object`]);
//! 3. bind the view below the `el` root with a [`ViewBinder`];
//! 4. run the `mounted` hook, if any.
//!
//! # Key lookup
//!
//! Top-level reads check the data first and fall back to computed getters,
//! so a data key shadows a computed key of the same name. Writes go to the
//! data; writing a key that only exists as a computed property fails with
//! [`ReactiveError::ReadOnly`]. Writing any other unknown key adds it to
//! the data.
//!
//! # Invariants
//!
//! 1. The view holds only weak handles to the model; dropping every
//!    `ViewModel` clone turns view input into a no-op.
//! 2. `mounted` runs exactly once, after binding.
//! 3. Computed getters never register dependencies.

use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};

use weft_reactive::{Object, PathSource, PropPath, ReactiveError, Value, Watcher};
use weft_view::{BindReport, Document, Locator, ViewBinder, ViewNode};

use crate::computed::ComputedSet;
use crate::error::{Error, Result};
use crate::options::ModelOptions;

struct ModelInner {
    data: Object,
    computed: ComputedSet,
    this: Weak<ModelInner>,
    document: Document,
    root: ViewNode,
    report: RefCell<BindReport>,
}

impl ModelInner {
    fn handle(&self) -> Option<ViewModel> {
        self.this.upgrade().map(|inner| ViewModel { inner })
    }
}

impl PathSource for ModelInner {
    fn read(&self, key: &str) -> Option<Value> {
        if self.data.contains_key(key) {
            return self.data.get(key);
        }
        let vm = self.handle()?;
        self.computed.evaluate(key, &vm)
    }

    fn write(&self, key: &str, value: Value) -> weft_reactive::Result<bool> {
        if !self.data.contains_key(key) && self.computed.contains(key) {
            return Err(ReactiveError::ReadOnly {
                key: key.to_owned(),
            });
        }
        Ok(self.data.set(key, value))
    }
}

/// A mounted view model. Clones share the same model.
#[derive(Clone)]
pub struct ViewModel {
    inner: Rc<ModelInner>,
}

impl ViewModel {
    /// Mount onto the element of `document` selected by the `el` option.
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidOptions`] when `data` or `el` is missing, or `data`
    ///   is not an object.
    /// - [`Error::Json`] for malformed JSON text data.
    /// - [`Error::InvalidLocator`] / [`Error::ElementNotFound`] for `el`.
    /// - [`Error::Reactive`] if mounting happens while a watcher is being
    ///   built on this thread.
    pub fn mount(document: &Document, options: ModelOptions) -> Result<Self> {
        let mut parts = options.into_parts()?;
        let _span = tracing::debug_span!("model.mount", el = %parts.el).entered();

        let locator = Locator::parse(&parts.el)?;
        let root = document.find(&locator).ok_or_else(|| Error::ElementNotFound {
            locator: parts.el.clone(),
        })?;

        let computed = std::mem::take(&mut parts.computed);
        tracing::debug!(count = computed.len(), "computed installed");
        let data = parts.observe_data()?;
        tracing::debug!(keys = data.len(), "data intercepted");

        let inner = Rc::new_cyclic(|this| ModelInner {
            data,
            computed,
            this: this.clone(),
            document: document.clone(),
            root: root.clone(),
            report: RefCell::new(BindReport::default()),
        });
        let source: Rc<dyn PathSource> = inner.clone();
        let report = ViewBinder::new(parts.binder).bind(&root, &source)?;
        inner.report.replace(report);

        let vm = Self { inner };
        match parts.mounted.take() {
            Some(hook) => hook(&vm),
            None => {
                let skipped = ReactiveError::MissingHook { hook: "mounted" };
                tracing::debug!(%skipped, "lifecycle hook skipped");
            }
        }
        Ok(vm)
    }

    /// Read a top-level key: data first, then computed.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<Value> {
        self.inner.read(key)
    }

    /// Write a top-level key. Returns whether the stored value changed.
    ///
    /// # Errors
    ///
    /// [`ReactiveError::ReadOnly`] for computed keys.
    pub fn set(&self, key: &str, value: impl Into<Value>) -> Result<bool> {
        Ok(self.inner.write(key, value.into())?)
    }

    /// Resolve a dotted path.
    ///
    /// # Errors
    ///
    /// [`ReactiveError::InvalidPath`] or [`ReactiveError::UnresolvedPath`].
    pub fn get_path(&self, path: &str) -> Result<Value> {
        let path = PropPath::parse(path)?;
        Ok(path.resolve(self.inner.as_ref())?)
    }

    /// Write at a dotted path.
    ///
    /// # Errors
    ///
    /// [`ReactiveError::InvalidPath`], [`ReactiveError::UnresolvedPath`] for
    /// a missing parent, or [`ReactiveError::ReadOnly`].
    pub fn set_path(&self, path: &str, value: impl Into<Value>) -> Result<bool> {
        let path = PropPath::parse(path)?;
        Ok(path.assign(self.inner.as_ref(), value.into())?)
    }

    /// Install a programmatic watcher on a dotted path.
    ///
    /// # Errors
    ///
    /// [`ReactiveError::InvalidPath`] or [`ReactiveError::ReentrantTracking`].
    pub fn watch(&self, path: &str, callback: impl Fn(&Value) + 'static) -> Result<Watcher> {
        let path = PropPath::parse(path)?;
        Ok(Watcher::new(self.inner.as_ref(), path, callback)?)
    }

    #[must_use]
    pub fn data(&self) -> &Object {
        &self.inner.data
    }

    #[must_use]
    pub fn computed_names(&self) -> &[String] {
        self.inner.computed.names()
    }

    #[must_use]
    pub fn document(&self) -> &Document {
        &self.inner.document
    }

    /// The element the view was bound below.
    #[must_use]
    pub fn root(&self) -> &ViewNode {
        &self.inner.root
    }

    #[must_use]
    pub fn bind_report(&self) -> BindReport {
        self.inner.report.borrow().clone()
    }

    /// Snapshot of the data as JSON.
    #[must_use]
    pub fn to_json(&self) -> serde_json::Value {
        self.inner.data.to_json()
    }
}

impl PathSource for ViewModel {
    fn read(&self, key: &str) -> Option<Value> {
        self.inner.read(key)
    }

    fn write(&self, key: &str, value: Value) -> weft_reactive::Result<bool> {
        self.inner.write(key, value)
    }
}

impl fmt::Debug for ViewModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ViewModel")
            .field("data", &self.inner.data)
            .field("computed", &self.inner.computed)
            .field("root", &self.inner.root.tag())
            .finish()
    }
}

/// Parse `markup` into a new [`Document`] and mount onto it.
///
/// # Errors
///
/// [`Error::Markup`] plus everything [`ViewModel::mount`] returns.
pub fn mount_markup(markup: &str, options: ModelOptions) -> Result<ViewModel> {
    let document = Document::parse(markup)?;
    ViewModel::mount(&document, options)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::cell::Cell;

    const APP: &str = r#"<div id="app"><p>{{a}}</p></div>"#;

    fn vm(data: serde_json::Value) -> ViewModel {
        mount_markup(APP, ModelOptions::new().el("#app").data(data)).unwrap()
    }

    #[test]
    fn data_shadows_computed() {
        let vm = mount_markup(
            APP,
            ModelOptions::new()
                .el("#app")
                .data(json!({"a": "data"}))
                .computed("a", |_| Value::from("computed")),
        )
        .unwrap();
        assert_eq!(vm.get("a"), Some(Value::from("data")));
    }

    #[test]
    fn computed_keys_are_read_only() {
        let vm = mount_markup(
            APP,
            ModelOptions::new()
                .el("#app")
                .data(json!({"a": 1}))
                .computed("twice", |vm| {
                    Value::from(vm.get("a").and_then(|v| v.as_f64()).unwrap_or(0.0) * 2.0)
                }),
        )
        .unwrap();
        assert_eq!(vm.get("twice"), Some(Value::from(2)));
        let err = vm.set("twice", 5).unwrap_err();
        assert!(matches!(
            err.as_reactive(),
            Some(ReactiveError::ReadOnly { key }) if key == "twice"
        ));
    }

    #[test]
    fn unknown_key_is_added_to_data() {
        let vm = vm(json!({"a": 1}));
        assert!(vm.set("b", 2).unwrap());
        assert_eq!(vm.to_json(), json!({"a": 1, "b": 2}));
    }

    #[test]
    fn paths_read_and_write() {
        let vm = vm(json!({"a": 1, "info": {"name": "x"}}));
        assert_eq!(vm.get_path("info.name").unwrap(), Value::from("x"));
        assert!(vm.set_path("info.name", "y").unwrap());
        assert_eq!(vm.get_path(" info . name ").unwrap(), Value::from("y"));
        assert!(matches!(
            vm.get_path("info..name").unwrap_err().as_reactive(),
            Some(ReactiveError::InvalidPath { .. })
        ));
    }

    #[test]
    fn watch_fires_on_change() {
        let vm = vm(json!({"a": 1}));
        let hits = Rc::new(Cell::new(0));
        let h = Rc::clone(&hits);
        let _w = vm.watch("a", move |_| h.set(h.get() + 1)).unwrap();
        vm.set("a", 2).unwrap();
        vm.set("a", 2).unwrap();
        assert_eq!(hits.get(), 1);
    }

    #[test]
    fn missing_element_is_reported() {
        let err = mount_markup(APP, ModelOptions::new().el("#nope").data(json!({}))).unwrap_err();
        assert!(matches!(err, Error::ElementNotFound { locator } if locator == "#nope"));
    }

    #[test]
    fn invalid_locator_is_reported() {
        let err = mount_markup(APP, ModelOptions::new().el("div p").data(json!({}))).unwrap_err();
        assert!(matches!(err, Error::InvalidLocator { .. }));
    }

    #[test]
    fn dropping_the_model_disconnects_input() {
        let doc = Document::parse(r#"<div id="app"><input v-model="a"></div>"#).unwrap();
        let vm = ViewModel::mount(&doc, ModelOptions::new().el("#app").data(json!({"a": "x"})))
            .unwrap();
        let data = vm.data().clone();
        drop(vm);
        let input = doc.query("input").unwrap().unwrap();
        input.dispatch_input("typed");
        assert_eq!(data.peek("a"), Some(Value::from("x")));
    }
}
