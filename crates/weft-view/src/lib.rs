#![forbid(unsafe_code)]

//! View side of weft.
//!
//! - [`node`]: a small in-memory render target ([`ViewNode`], [`Document`])
//!   with a mutation revision counter.
//! - [`markup`]: loads HTML-like markup into that tree.
//! - [`template`]: scans `{{ path }}` markers in text.
//! - [`binder`]: walks a subtree once and wires every marker and directive to
//!   a model through [`weft_reactive::Watcher`]s.

pub mod binder;
pub mod error;
pub mod markup;
pub mod node;
pub mod template;

pub use binder::{BindReport, BinderConfig, DEFAULT_DIRECTIVE_PREFIX, ViewBinder, display_value};
pub use error::{Result, ViewError};
pub use markup::parse_fragment;
pub use node::{Document, InputListener, Locator, NodeKind, ViewNode};
pub use template::TextTemplate;
