#![forbid(unsafe_code)]

//! One-shot view binding.
//!
//! [`ViewBinder::bind`] walks a subtree once, discovers bindings and installs
//! a [`Watcher`] for each. Afterwards the tree is kept current by the
//! watchers alone; the binder keeps no state.
//!
//! # Protocol
//!
//! 1. The root's children are moved into a detached fragment.
//! 2. The fragment is walked depth-first, pre-order:
//!    - text nodes with `{{ path }}` markers get one watcher per marker;
//!    - elements get a two-way binding for every attribute whose name
//!      contains the directive prefix (default `v-`);
//!    - then the walk descends into children.
//! 3. The fragment's children are reattached to the root in one step.
//!
//! # Two-way bindings
//!
//! The model-to-view direction writes the node's value only when it differs
//! from what the node shows. The view-to-model direction is an input
//! listener holding a weak model handle; while it writes back, a shared
//! `syncing` flag suppresses the echo from its own watcher.
//!
//! # Failure Modes
//!
//! | Condition | Behavior |
//! |---|---|
//! | Path does not resolve | Empty placeholder, `warn!`, listed in [`BindReport::unresolved`] |
//! | Marker is not a dotted path | Left verbatim, `warn!`, counted in [`BindReport::rejected`] |
//! | Directive value is not a dotted path | Directive skipped, `warn!`, counted in `rejected` |
//! | Model dropped before input | Input ignored, `debug!` |
//! | Tracking slot already occupied | `Err(ReentrantTracking)`; the tree is reattached first |

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use weft_reactive::{PathSource, PropPath, Value, Watcher};

use crate::error::Result;
use crate::node::{NodeKind, ViewNode};
use crate::template::TextTemplate;

/// Default prefix of directive attributes.
pub const DEFAULT_DIRECTIVE_PREFIX: &str = "v-";

/// Binder knobs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BinderConfig {
    directive_prefix: String,
}

impl Default for BinderConfig {
    fn default() -> Self {
        Self {
            directive_prefix: DEFAULT_DIRECTIVE_PREFIX.to_owned(),
        }
    }
}

impl BinderConfig {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_directive_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.directive_prefix = prefix.into();
        self
    }

    #[must_use]
    pub fn directive_prefix(&self) -> &str {
        &self.directive_prefix
    }
}

/// Summary of one bind pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BindReport {
    /// Markers bound in text nodes.
    pub text_bindings: usize,
    /// Two-way directive bindings.
    pub directive_bindings: usize,
    /// Paths that did not resolve when first read.
    pub unresolved: Vec<PropPath>,
    /// Markers and directive values that were not dotted paths.
    pub rejected: usize,
}

impl BindReport {
    #[must_use]
    pub fn total_bindings(&self) -> usize {
        self.text_bindings + self.directive_bindings
    }
}

/// Rendered form of a model value. `Null` is the empty placeholder.
#[must_use]
pub fn display_value(value: &Value) -> String {
    if value.is_null() {
        String::new()
    } else {
        value.to_string()
    }
}

#[derive(Debug, Clone, Default)]
pub struct ViewBinder {
    config: BinderConfig,
}

impl ViewBinder {
    #[must_use]
    pub fn new(config: BinderConfig) -> Self {
        Self { config }
    }

    #[must_use]
    pub fn config(&self) -> &BinderConfig {
        &self.config
    }

    /// Bind every marker and directive below `root` to `model`.
    ///
    /// # Errors
    ///
    /// Propagates [`ReactiveError::ReentrantTracking`](weft_reactive::ReactiveError::ReentrantTracking)
    /// when called while another watcher is being built. The subtree is
    /// reattached before returning in every case.
    pub fn bind(&self, root: &ViewNode, model: &Rc<dyn PathSource>) -> Result<BindReport> {
        let _span = tracing::debug_span!("view.bind", root = ?root.tag()).entered();
        let fragment = ViewNode::fragment();
        fragment.append_children(root.take_children());

        let mut report = BindReport::default();
        let walked = self.walk(&fragment, model, &mut report);
        root.append_children(fragment.take_children());
        walked?;

        tracing::debug!(
            text = report.text_bindings,
            directives = report.directive_bindings,
            unresolved = report.unresolved.len(),
            rejected = report.rejected,
            "view bound"
        );
        Ok(report)
    }

    fn walk(
        &self,
        node: &ViewNode,
        model: &Rc<dyn PathSource>,
        report: &mut BindReport,
    ) -> Result<()> {
        for child in node.children() {
            match child.kind() {
                NodeKind::Text => self.bind_text(&child, model, report)?,
                NodeKind::Element => {
                    self.bind_directives(&child, model, report)?;
                    self.walk(&child, model, report)?;
                }
                NodeKind::Document | NodeKind::Fragment => self.walk(&child, model, report)?,
            }
        }
        Ok(())
    }

    fn bind_text(
        &self,
        node: &ViewNode,
        model: &Rc<dyn PathSource>,
        report: &mut BindReport,
    ) -> Result<()> {
        let Some(content) = node.content() else {
            return Ok(());
        };
        let template = TextTemplate::parse(&content);
        for err in template.rejected() {
            tracing::warn!(%err, "marker left verbatim");
        }
        report.rejected += template.rejected().len();
        if !template.has_slots() {
            return Ok(());
        }

        let template = Rc::new(template);
        let rendered = Rc::new(RefCell::new(vec![String::new(); template.slot_count()]));
        for (slot, path) in template.slots().enumerate() {
            let target = node.clone();
            let (tpl, values) = (Rc::clone(&template), Rc::clone(&rendered));
            Watcher::new(model.as_ref(), path.clone(), move |value: &Value| {
                values.borrow_mut()[slot] = display_value(value);
                let text = tpl.render(values.borrow().as_slice());
                target.set_text(&text);
            })?;
            let initial = initial_text(path, model, report);
            rendered.borrow_mut()[slot] = initial;
            report.text_bindings += 1;
        }
        node.set_text(&template.render(rendered.borrow().as_slice()));
        Ok(())
    }

    fn bind_directives(
        &self,
        node: &ViewNode,
        model: &Rc<dyn PathSource>,
        report: &mut BindReport,
    ) -> Result<()> {
        for (name, raw) in node.attributes() {
            if !name.contains(self.config.directive_prefix()) {
                continue;
            }
            let path = match PropPath::parse(&raw) {
                Ok(path) => path,
                Err(err) => {
                    tracing::warn!(attribute = %name, %err, "directive skipped");
                    report.rejected += 1;
                    continue;
                }
            };
            let syncing = Rc::new(Cell::new(false));

            let (target, guard) = (node.clone(), Rc::clone(&syncing));
            Watcher::new(model.as_ref(), path.clone(), move |value: &Value| {
                if !guard.get() {
                    target.set_value(&display_value(value));
                }
            })?;
            node.set_value(&initial_text(&path, model, report));

            let source = Rc::downgrade(model);
            let guard = Rc::clone(&syncing);
            node.add_input_listener(move |entered| {
                let Some(model) = source.upgrade() else {
                    tracing::debug!(path = %path, "model dropped, input ignored");
                    return;
                };
                guard.set(true);
                let written = path.assign(model.as_ref(), Value::from(entered));
                guard.set(false);
                if let Err(err) = written {
                    tracing::warn!(path = %path, %err, "input not written back");
                }
            });
            report.directive_bindings += 1;
        }
        Ok(())
    }
}

fn initial_text(path: &PropPath, model: &Rc<dyn PathSource>, report: &mut BindReport) -> String {
    match path.peek(model.as_ref()) {
        Ok(value) => display_value(&value),
        Err(err) => {
            tracing::warn!(path = %path, %err, "binding path unresolved, rendering placeholder");
            report.unresolved.push(path.clone());
            String::new()
        }
    }
}
