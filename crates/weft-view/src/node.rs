#![forbid(unsafe_code)]

//! In-memory render target.
//!
//! A [`ViewNode`] is a shared handle to one node of a small DOM-like tree:
//! documents, fragments, elements (tag, attributes, a `value` slot and input
//! listeners) and text. Parents are held weakly, children strongly, so a
//! detached subtree is freed once its last handle goes away.
//!
//! # Revisions
//!
//! A [`Document`] counts mutations. Every effective change to a node that is
//! attached to a document (text, value, attributes, children) bumps the
//! document's revision by one. Changes inside a detached fragment are not
//! counted, which is what lets the binder process a whole subtree off-tree
//! and reattach it with a single mutation.
//!
//! # Invariants
//!
//! 1. A node has at most one parent; appending an attached node moves it.
//! 2. A node is never appended below itself.
//! 3. Writes of an unchanged text or value are no-ops and leave the
//!    revision untouched.
//! 4. Input listeners run after the element's value has been updated.

use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};
use std::str::FromStr;

use crate::error::{Result, ViewError};

/// Callback invoked with the entered text when input is dispatched.
pub type InputListener = Rc<dyn Fn(&str)>;

const VOID_TAGS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "source",
    "track", "wbr",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    Document,
    Fragment,
    Element,
    Text,
}

struct Element {
    tag: String,
    attrs: Vec<(String, String)>,
    value: String,
    listeners: Vec<InputListener>,
}

enum Payload {
    Document { revision: u64 },
    Fragment,
    Element(Element),
    Text(String),
}

struct NodeData {
    payload: Payload,
    parent: Weak<RefCell<NodeData>>,
    children: Vec<ViewNode>,
}

/// Shared handle to a node. Clones refer to the same node.
#[derive(Clone)]
pub struct ViewNode(Rc<RefCell<NodeData>>);

impl ViewNode {
    fn with_payload(payload: Payload) -> Self {
        Self(Rc::new(RefCell::new(NodeData {
            payload,
            parent: Weak::new(),
            children: Vec::new(),
        })))
    }

    /// A detached container with no markup of its own.
    #[must_use]
    pub fn fragment() -> Self {
        Self::with_payload(Payload::Fragment)
    }

    /// A detached element. Tag names are stored lowercase.
    #[must_use]
    pub fn element(tag: &str) -> Self {
        Self::with_payload(Payload::Element(Element {
            tag: tag.to_ascii_lowercase(),
            attrs: Vec::new(),
            value: String::new(),
            listeners: Vec::new(),
        }))
    }

    #[must_use]
    pub fn text(content: impl Into<String>) -> Self {
        Self::with_payload(Payload::Text(content.into()))
    }

    #[must_use]
    pub fn kind(&self) -> NodeKind {
        match self.0.borrow().payload {
            Payload::Document { .. } => NodeKind::Document,
            Payload::Fragment => NodeKind::Fragment,
            Payload::Element(_) => NodeKind::Element,
            Payload::Text(_) => NodeKind::Text,
        }
    }

    #[must_use]
    pub fn is_text(&self) -> bool {
        self.kind() == NodeKind::Text
    }

    #[must_use]
    pub fn is_element(&self) -> bool {
        self.kind() == NodeKind::Element
    }

    #[must_use]
    pub fn tag(&self) -> Option<String> {
        match &self.0.borrow().payload {
            Payload::Element(el) => Some(el.tag.clone()),
            _ => None,
        }
    }

    /// Content of a text node.
    #[must_use]
    pub fn content(&self) -> Option<String> {
        match &self.0.borrow().payload {
            Payload::Text(text) => Some(text.clone()),
            _ => None,
        }
    }

    /// Replace a text node's content. Returns whether anything changed.
    pub fn set_text(&self, content: &str) -> bool {
        {
            let mut data = self.0.borrow_mut();
            match &mut data.payload {
                Payload::Text(text) if text.as_str() != content => content.clone_into(text),
                _ => return false,
            }
        }
        self.touch();
        true
    }

    #[must_use]
    pub fn attribute(&self, name: &str) -> Option<String> {
        match &self.0.borrow().payload {
            Payload::Element(el) => el
                .attrs
                .iter()
                .find(|(key, _)| key == name)
                .map(|(_, value)| value.clone()),
            _ => None,
        }
    }

    /// Attributes in source order.
    #[must_use]
    pub fn attributes(&self) -> Vec<(String, String)> {
        match &self.0.borrow().payload {
            Payload::Element(el) => el.attrs.clone(),
            _ => Vec::new(),
        }
    }

    /// Set or replace an attribute. Ignored on non-elements.
    pub fn set_attribute(&self, name: &str, value: &str) {
        {
            let mut data = self.0.borrow_mut();
            let Payload::Element(el) = &mut data.payload else {
                return;
            };
            match el.attrs.iter_mut().find(|(key, _)| key == name) {
                Some((_, existing)) if existing.as_str() == value => return,
                Some((_, existing)) => value.clone_into(existing),
                None => el.attrs.push((name.to_owned(), value.to_owned())),
            }
        }
        self.touch();
    }

    /// The element's current value (what an input field displays).
    #[must_use]
    pub fn value(&self) -> Option<String> {
        match &self.0.borrow().payload {
            Payload::Element(el) => Some(el.value.clone()),
            _ => None,
        }
    }

    /// Set the element's value. Returns whether anything changed.
    pub fn set_value(&self, value: &str) -> bool {
        {
            let mut data = self.0.borrow_mut();
            match &mut data.payload {
                Payload::Element(el) if el.value != value => value.clone_into(&mut el.value),
                _ => return false,
            }
        }
        self.touch();
        true
    }

    /// Register a listener for [`dispatch_input`](Self::dispatch_input).
    pub fn add_input_listener(&self, listener: impl Fn(&str) + 'static) {
        if let Payload::Element(el) = &mut self.0.borrow_mut().payload {
            el.listeners.push(Rc::new(listener));
        }
    }

    #[must_use]
    pub fn input_listener_count(&self) -> usize {
        match &self.0.borrow().payload {
            Payload::Element(el) => el.listeners.len(),
            _ => 0,
        }
    }

    /// Simulate the user entering `value`: update the value, then run every
    /// input listener in registration order.
    pub fn dispatch_input(&self, value: &str) {
        self.set_value(value);
        let listeners = match &self.0.borrow().payload {
            Payload::Element(el) => el.listeners.clone(),
            _ => return,
        };
        for listener in listeners {
            listener(value);
        }
    }

    #[must_use]
    pub fn parent(&self) -> Option<ViewNode> {
        self.0.borrow().parent.upgrade().map(ViewNode)
    }

    #[must_use]
    pub fn children(&self) -> Vec<ViewNode> {
        self.0.borrow().children.clone()
    }

    fn accepts_children(&self) -> bool {
        !self.is_text()
    }

    /// Whether `self` is `other` or one of its ancestors.
    fn is_inclusive_ancestor_of(&self, other: &ViewNode) -> bool {
        let mut current = Some(other.clone());
        while let Some(node) = current {
            if node.ptr_eq(self) {
                return true;
            }
            current = node.parent();
        }
        false
    }

    fn detach(&self) {
        let Some(parent) = self.parent() else {
            return;
        };
        parent
            .0
            .borrow_mut()
            .children
            .retain(|child| !child.ptr_eq(self));
        self.0.borrow_mut().parent = Weak::new();
        parent.touch();
    }

    /// Append `child` as the last child, moving it out of its previous parent.
    ///
    /// Returns `false` (and changes nothing) when `self` is a text node or
    /// `child` is `self` or one of its ancestors.
    pub fn append_child(&self, child: &ViewNode) -> bool {
        if !self.accepts_children() || child.is_inclusive_ancestor_of(self) {
            tracing::debug!(parent = ?self.kind(), child = ?child.kind(), "append rejected");
            return false;
        }
        child.detach();
        child.0.borrow_mut().parent = Rc::downgrade(&self.0);
        self.0.borrow_mut().children.push(child.clone());
        self.touch();
        true
    }

    /// Append several children as one mutation.
    ///
    /// Children that cannot be attached (see [`append_child`](Self::append_child))
    /// are skipped.
    pub fn append_children(&self, children: Vec<ViewNode>) {
        if !self.accepts_children() || children.is_empty() {
            return;
        }
        let mut attached = Vec::with_capacity(children.len());
        for child in children {
            if child.is_inclusive_ancestor_of(self) {
                tracing::debug!(child = ?child.kind(), "append rejected");
                continue;
            }
            child.detach();
            child.0.borrow_mut().parent = Rc::downgrade(&self.0);
            attached.push(child);
        }
        self.0.borrow_mut().children.extend(attached);
        self.touch();
    }

    /// Detach and return all children as one mutation.
    pub fn take_children(&self) -> Vec<ViewNode> {
        let children = std::mem::take(&mut self.0.borrow_mut().children);
        if children.is_empty() {
            return children;
        }
        for child in &children {
            child.0.borrow_mut().parent = Weak::new();
        }
        self.touch();
        children
    }

    /// All descendants in document order, excluding `self`.
    #[must_use]
    pub fn descendants(&self) -> Vec<ViewNode> {
        let mut out = Vec::new();
        let mut stack: Vec<ViewNode> = self.children().into_iter().rev().collect();
        while let Some(node) = stack.pop() {
            stack.extend(node.children().into_iter().rev());
            out.push(node);
        }
        out
    }

    /// First descendant matching `locator`, in document order.
    #[must_use]
    pub fn find(&self, locator: &Locator) -> Option<ViewNode> {
        self.descendants()
            .into_iter()
            .find(|node| locator.matches(node))
    }

    /// Concatenated content of every descendant text node.
    #[must_use]
    pub fn text_content(&self) -> String {
        if let Some(text) = self.content() {
            return text;
        }
        self.descendants()
            .iter()
            .filter_map(ViewNode::content)
            .collect()
    }

    #[must_use]
    pub fn to_html(&self) -> String {
        let mut out = String::new();
        self.write_html(&mut out);
        out
    }

    fn write_html(&self, out: &mut String) {
        let data = self.0.borrow();
        match &data.payload {
            Payload::Text(text) => {
                html_escape::encode_text_to_string(text, out);
            }
            Payload::Document { .. } | Payload::Fragment => {
                for child in &data.children {
                    child.write_html(out);
                }
            }
            Payload::Element(el) => {
                out.push('<');
                out.push_str(&el.tag);
                for (key, value) in el.attrs.iter().filter(|(key, _)| key != "value") {
                    push_attr(out, key, value);
                }
                if !el.value.is_empty() {
                    push_attr(out, "value", &el.value);
                }
                out.push('>');
                if VOID_TAGS.contains(&el.tag.as_str()) {
                    return;
                }
                for child in &data.children {
                    child.write_html(out);
                }
                out.push_str("</");
                out.push_str(&el.tag);
                out.push('>');
            }
        }
    }

    #[must_use]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }

    /// The topmost ancestor (or `self`).
    #[must_use]
    pub fn root(&self) -> ViewNode {
        let mut node = self.clone();
        while let Some(parent) = node.parent() {
            node = parent;
        }
        node
    }

    /// Record a mutation on the owning document, if attached to one.
    fn touch(&self) {
        if let Payload::Document { revision } = &mut self.root().0.borrow_mut().payload {
            *revision += 1;
        }
    }
}

impl fmt::Debug for ViewNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let data = self.0.borrow();
        let mut s = f.debug_struct("ViewNode");
        match &data.payload {
            Payload::Document { revision } => s.field("document_revision", revision),
            Payload::Fragment => s.field("kind", &NodeKind::Fragment),
            Payload::Element(el) => s.field("tag", &el.tag).field("attrs", &el.attrs),
            Payload::Text(text) => s.field("text", text),
        };
        s.field("children", &data.children.len()).finish()
    }
}

fn push_attr(out: &mut String, key: &str, value: &str) {
    out.push(' ');
    out.push_str(key);
    out.push_str("=\"");
    html_escape::encode_double_quoted_attribute_to_string(value, out);
    out.push('"');
}

// ---------------------------------------------------------------------------
// Locator
// ---------------------------------------------------------------------------

/// Selects a node: `#id` or a tag name.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Locator {
    Id(String),
    Tag(String),
}

impl Locator {
    /// # Errors
    ///
    /// [`ViewError::InvalidLocator`] for anything but `#id` or a tag name.
    pub fn parse(raw: &str) -> Result<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(ViewError::locator(raw, "locator is empty"));
        }
        if let Some(id) = trimmed.strip_prefix('#') {
            if id.is_empty() || id.chars().any(char::is_whitespace) {
                return Err(ViewError::locator(raw, "id must be a single word"));
            }
            return Ok(Self::Id(id.to_owned()));
        }
        let mut chars = trimmed.chars();
        let starts_alpha = chars.next().is_some_and(|c| c.is_ascii_alphabetic());
        if !starts_alpha || !chars.all(|c| c.is_ascii_alphanumeric() || c == '-') {
            return Err(ViewError::locator(raw, "expected #id or a tag name"));
        }
        Ok(Self::Tag(trimmed.to_ascii_lowercase()))
    }

    #[must_use]
    pub fn matches(&self, node: &ViewNode) -> bool {
        match self {
            Self::Id(id) => node.attribute("id").is_some_and(|value| value == *id),
            Self::Tag(tag) => node.tag().is_some_and(|name| name == *tag),
        }
    }
}

impl FromStr for Locator {
    type Err = ViewError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl fmt::Display for Locator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Id(id) => write!(f, "#{id}"),
            Self::Tag(tag) => f.write_str(tag),
        }
    }
}

// ---------------------------------------------------------------------------
// Document
// ---------------------------------------------------------------------------

/// The root of an attached tree. Cloning shares the same document.
#[derive(Clone)]
pub struct Document {
    root: ViewNode,
}

impl Default for Document {
    fn default() -> Self {
        Self {
            root: ViewNode::with_payload(Payload::Document { revision: 0 }),
        }
    }
}

impl Document {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse markup into a new document.
    ///
    /// # Errors
    ///
    /// [`ViewError::Markup`] when the parser rejects the input.
    pub fn parse(markup: &str) -> Result<Self> {
        let doc = Self::new();
        let nodes = crate::markup::parse_fragment(markup)?;
        doc.root.append_children(nodes);
        Ok(doc)
    }

    /// The document node itself.
    #[must_use]
    pub fn node(&self) -> &ViewNode {
        &self.root
    }

    /// Number of mutations applied to attached nodes so far.
    #[must_use]
    pub fn revision(&self) -> u64 {
        match self.root.0.borrow().payload {
            Payload::Document { revision } => revision,
            _ => 0,
        }
    }

    #[must_use]
    pub fn find(&self, locator: &Locator) -> Option<ViewNode> {
        self.root.find(locator)
    }

    /// Parse `locator` and find the first match.
    ///
    /// # Errors
    ///
    /// [`ViewError::InvalidLocator`] if `locator` does not parse.
    pub fn query(&self, locator: &str) -> Result<Option<ViewNode>> {
        Ok(self.find(&Locator::parse(locator)?))
    }

    pub fn append_child(&self, child: &ViewNode) -> bool {
        self.root.append_child(child)
    }

    #[must_use]
    pub fn to_html(&self) -> String {
        self.root.to_html()
    }
}

impl fmt::Debug for Document {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Document")
            .field("revision", &self.revision())
            .field("children", &self.root.children().len())
            .finish()
    }
}
