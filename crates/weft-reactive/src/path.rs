#![forbid(unsafe_code)]

//! Dotted property paths.
//!
//! A [`PropPath`] is parsed once from text such as `info.name` and then
//! reused for every resolution. Segments are identifiers made of ASCII
//! letters, digits, `_` and `$`; surrounding whitespace is ignored, so
//! `{{ info.name }}` and `{{info.name}}` name the same path. Anything else
//! (operators, brackets, empty segments) is rejected: paths are not an
//! expression language.
//!
//! Resolution walks the segments through a [`PathSource`] and then through
//! nested [`Object`]s. Each read goes through [`Object::get`], so resolving
//! inside a [`TrackingScope`](crate::TrackingScope) registers the active
//! watcher on every property along the way.

use std::fmt;
use std::rc::Rc;
use std::str::FromStr;

use crate::error::{ReactiveError, Result};
use crate::object::Object;
use crate::tracking;
use crate::value::Value;

/// Something a path's first segment can be read from and written to.
pub trait PathSource {
    /// Read a top-level property, registering the active watcher if any.
    fn read(&self, key: &str) -> Option<Value>;

    /// Write a top-level property. Returns whether the stored value changed.
    ///
    /// # Errors
    ///
    /// Implementations may refuse writes, e.g. [`ReactiveError::ReadOnly`].
    fn write(&self, key: &str, value: Value) -> Result<bool>;
}

impl PathSource for Object {
    fn read(&self, key: &str) -> Option<Value> {
        self.get(key)
    }

    fn write(&self, key: &str, value: Value) -> Result<bool> {
        Ok(self.set(key, value))
    }
}

/// A parsed, validated dotted path.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct PropPath {
    segments: Rc<[String]>,
}

impl PropPath {
    /// Parse a dotted path.
    ///
    /// # Errors
    ///
    /// [`ReactiveError::InvalidPath`] for empty paths, empty segments, or
    /// characters outside identifiers.
    pub fn parse(raw: &str) -> Result<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(ReactiveError::invalid(raw, "path is empty"));
        }
        let mut segments = Vec::new();
        for segment in trimmed.split('.') {
            let segment = segment.trim();
            if segment.is_empty() {
                return Err(ReactiveError::invalid(raw, "empty segment"));
            }
            if !segment.chars().all(is_ident_char) {
                return Err(ReactiveError::invalid(
                    raw,
                    "segments must be identifiers",
                ));
            }
            segments.push(segment.to_owned());
        }
        Ok(Self {
            segments: segments.into(),
        })
    }

    #[must_use]
    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.segments.len()
    }

    /// Always false: parsing rejects empty paths.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    #[must_use]
    pub fn first(&self) -> &str {
        &self.segments[0]
    }

    #[must_use]
    pub fn last(&self) -> &str {
        &self.segments[self.segments.len() - 1]
    }

    /// Resolve the full path against `root`.
    ///
    /// # Errors
    ///
    /// [`ReactiveError::UnresolvedPath`] naming the first missing segment.
    pub fn resolve(&self, root: &dyn PathSource) -> Result<Value> {
        tracking::descend(0);
        let head = root
            .read(self.first())
            .ok_or_else(|| ReactiveError::unresolved(self.to_string(), self.first()))?;
        self.walk(1, self.len(), head)
    }

    /// Resolve the full path with tracking suspended.
    ///
    /// # Errors
    ///
    /// Same as [`resolve`](Self::resolve).
    pub fn peek(&self, root: &dyn PathSource) -> Result<Value> {
        tracking::untracked(|| self.resolve(root))
    }

    /// Resolve segments `depth..` starting from `value`, which stands for the
    /// value at segment `depth - 1`.
    ///
    /// # Errors
    ///
    /// [`ReactiveError::UnresolvedPath`] naming the first missing segment.
    pub fn resolve_from(&self, depth: usize, value: Value) -> Result<Value> {
        self.walk(depth, self.len(), value)
    }

    /// Write `value` at this path. Intermediate segments must resolve to
    /// objects; the last segment is created if missing.
    ///
    /// # Errors
    ///
    /// [`ReactiveError::UnresolvedPath`] if an intermediate segment is missing
    /// or not an object, or whatever the root's [`PathSource::write`] returns.
    pub fn assign(&self, root: &dyn PathSource, value: Value) -> Result<bool> {
        tracking::untracked(|| {
            if self.len() == 1 {
                return root.write(self.first(), value);
            }
            let head = root
                .read(self.first())
                .ok_or_else(|| ReactiveError::unresolved(self.to_string(), self.first()))?;
            let parent = self.walk(1, self.len() - 1, head)?;
            match parent {
                Value::Object(obj) => Ok(obj.set(self.last(), value)),
                _ => Err(ReactiveError::unresolved(self.to_string(), self.last())),
            }
        })
    }

    fn walk(&self, from: usize, to: usize, mut current: Value) -> Result<Value> {
        for (depth, segment) in self.segments.iter().enumerate().take(to).skip(from) {
            tracking::descend(depth);
            current = step(&current, segment)
                .ok_or_else(|| ReactiveError::unresolved(self.to_string(), segment.as_str()))?;
        }
        Ok(current)
    }
}

/// Read one segment below `value`. Array elements and `length` are readable
/// but never tracked.
fn step(value: &Value, segment: &str) -> Option<Value> {
    match value {
        Value::Object(obj) => obj.get(segment),
        Value::Array(items) if segment == "length" => u32::try_from(items.len()).ok().map(Value::from),
        Value::Array(items) => segment.parse::<usize>().ok().and_then(|i| items.get(i)),
        _ => None,
    }
}

fn is_ident_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_' || c == '$'
}

impl FromStr for PropPath {
    type Err = ReactiveError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl TryFrom<&str> for PropPath {
    type Error = ReactiveError;

    fn try_from(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl fmt::Display for PropPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, segment) in self.segments.iter().enumerate() {
            if i > 0 {
                f.write_str(".")?;
            }
            f.write_str(segment)?;
        }
        Ok(())
    }
}

impl fmt::Debug for PropPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PropPath({self})")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn model() -> Object {
        match Value::from_json(json!({
            "info": {"name": "a", "tags": ["x", "y"]},
            "title": "t"
        })) {
            Value::Object(obj) => obj,
            _ => unreachable!(),
        }
    }

    #[test]
    fn parse_trims_whitespace() {
        let path = PropPath::parse("  info . name ").unwrap();
        assert_eq!(path.segments(), ["info", "name"]);
        assert_eq!(path.to_string(), "info.name");
    }

    #[test]
    fn parse_rejects_malformed() {
        for raw in ["", "   ", "a..b", ".a", "a.", "a + b", "a[0]", "a-b"] {
            assert!(
                matches!(PropPath::parse(raw), Err(ReactiveError::InvalidPath { .. })),
                "{raw:?} should be rejected"
            );
        }
    }

    #[test]
    fn resolve_nested() {
        let root = model();
        let path: PropPath = "info.name".parse().unwrap();
        assert_eq!(path.resolve(&root).unwrap(), Value::from("a"));
    }

    #[test]
    fn resolve_reports_first_missing_segment() {
        let root = model();
        let path = PropPath::parse("info.missing.deep").unwrap();
        assert_eq!(
            path.resolve(&root).unwrap_err(),
            ReactiveError::unresolved("info.missing.deep", "missing")
        );
    }

    #[test]
    fn resolve_through_leaf_fails() {
        let root = model();
        let path = PropPath::parse("title.length").unwrap();
        assert!(path.resolve(&root).unwrap_err().is_unresolved());
    }

    #[test]
    fn resolve_array_index_and_length() {
        let root = model();
        assert_eq!(
            PropPath::parse("info.tags.1").unwrap().resolve(&root).unwrap(),
            Value::from("y")
        );
        assert_eq!(
            PropPath::parse("info.tags.length").unwrap().resolve(&root).unwrap(),
            Value::from(2)
        );
        assert!(PropPath::parse("info.tags.9").unwrap().resolve(&root).is_err());
    }

    #[test]
    fn resolve_from_midpoint() {
        let path = PropPath::parse("info.name").unwrap();
        let info = Value::from_json(json!({"name": "z"}));
        assert_eq!(path.resolve_from(1, info).unwrap(), Value::from("z"));
    }

    #[test]
    fn assign_nested_and_top_level() {
        let root = model();
        let name = PropPath::parse("info.name").unwrap();
        assert!(name.assign(&root, Value::from("b")).unwrap());
        assert_eq!(name.peek(&root).unwrap(), Value::from("b"));
        assert!(!name.assign(&root, Value::from("b")).unwrap(), "same value");

        let title = PropPath::parse("title").unwrap();
        assert!(title.assign(&root, Value::from("new")).unwrap());
        assert_eq!(root.peek("title"), Some(Value::from("new")));
    }

    #[test]
    fn assign_through_missing_parent_fails() {
        let root = model();
        let path = PropPath::parse("nope.name").unwrap();
        assert!(path.assign(&root, Value::from(1)).unwrap_err().is_unresolved());
    }

    #[test]
    fn equal_paths_hash_equal() {
        use std::collections::HashSet;
        let set: HashSet<PropPath> = ["a.b", " a.b ", "a . b"]
            .into_iter()
            .map(|p| PropPath::parse(p).unwrap())
            .collect();
        assert_eq!(set.len(), 1);
    }
}
