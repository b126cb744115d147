#![forbid(unsafe_code)]

//! `{{ path }}` text templates.
//!
//! A text node's content is scanned once into literal runs and slots. Each
//! slot is a [`PropPath`]. Rendering substitutes one string per slot, in slot
//! order, and leaves literals untouched.
//!
//! # Scanning rules
//!
//! - A marker closes at the first `}}` after a `{{`. When several `{{` come
//!   before that close, the last one opens the marker and the earlier text is
//!   literal, so `{{ a {{b}} }}` binds `b`.
//! - The marker body must parse as a dotted path; otherwise the marker stays
//!   in the output verbatim and the error is kept in [`TextTemplate::rejected`].
//! - An unclosed `{{` and everything after it is literal text.
//! - There is no escaping and no nesting.

use std::fmt;

use weft_reactive::{PropPath, ReactiveError};

const OPEN: &str = "{{";
const CLOSE: &str = "}}";

#[derive(Debug, Clone, PartialEq, Eq)]
enum Part {
    Literal(String),
    Slot(PropPath),
}

/// A scanned text template.
#[derive(Clone, PartialEq, Eq)]
pub struct TextTemplate {
    parts: Vec<Part>,
    slots: usize,
    rejected: Vec<ReactiveError>,
}

impl TextTemplate {
    #[must_use]
    pub fn parse(text: &str) -> Self {
        let mut template = Self {
            parts: Vec::new(),
            slots: 0,
            rejected: Vec::new(),
        };
        let mut literal = String::new();
        let mut rest = text;

        while let Some(first) = rest.find(OPEN) {
            let Some(close) = rest[first + OPEN.len()..].find(CLOSE) else {
                break;
            };
            let close = first + OPEN.len() + close;
            // Innermost opener before the close.
            let open = rest[..close].rfind(OPEN).unwrap_or(first);
            literal.push_str(&rest[..open]);
            let body = &rest[open + OPEN.len()..close];
            match PropPath::parse(body) {
                Ok(path) => {
                    if !literal.is_empty() {
                        template.parts.push(Part::Literal(std::mem::take(&mut literal)));
                    }
                    template.parts.push(Part::Slot(path));
                    template.slots += 1;
                }
                Err(err) => {
                    literal.push_str(OPEN);
                    literal.push_str(body);
                    literal.push_str(CLOSE);
                    template.rejected.push(err);
                }
            }
            rest = &rest[close + CLOSE.len()..];
        }

        literal.push_str(rest);
        if !literal.is_empty() {
            template.parts.push(Part::Literal(literal));
        }
        template
    }

    /// Whether the text contained at least one valid marker.
    #[must_use]
    pub fn has_slots(&self) -> bool {
        self.slots > 0
    }

    #[must_use]
    pub fn slot_count(&self) -> usize {
        self.slots
    }

    /// Slot paths in order of appearance.
    pub fn slots(&self) -> impl Iterator<Item = &PropPath> {
        self.parts.iter().filter_map(|part| match part {
            Part::Slot(path) => Some(path),
            Part::Literal(_) => None,
        })
    }

    /// Markers that were left verbatim because they are not dotted paths.
    #[must_use]
    pub fn rejected(&self) -> &[ReactiveError] {
        &self.rejected
    }

    /// Substitute `values[i]` for slot `i`. Missing values render empty.
    #[must_use]
    pub fn render<S: AsRef<str>>(&self, values: &[S]) -> String {
        let mut out = String::new();
        let mut slot = 0;
        for part in &self.parts {
            match part {
                Part::Literal(text) => out.push_str(text),
                Part::Slot(_) => {
                    if let Some(value) = values.get(slot) {
                        out.push_str(value.as_ref());
                    }
                    slot += 1;
                }
            }
        }
        out
    }
}

impl fmt::Debug for TextTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TextTemplate")
            .field("slots", &self.slots().collect::<Vec<_>>())
            .field("rejected", &self.rejected.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn paths(t: &TextTemplate) -> Vec<String> {
        t.slots().map(ToString::to_string).collect()
    }

    #[test]
    fn plain_text_has_no_slots() {
        let t = TextTemplate::parse("just text");
        assert!(!t.has_slots());
        assert_eq!(t.render::<&str>(&[]), "just text");
    }

    #[test]
    fn single_marker() {
        let t = TextTemplate::parse("Hello {{info.name}}!");
        assert_eq!(paths(&t), ["info.name"]);
        assert_eq!(t.render(&["a"]), "Hello a!");
    }

    #[test]
    fn whitespace_inside_marker_is_ignored() {
        let t = TextTemplate::parse("{{  info.name }}");
        assert_eq!(paths(&t), ["info.name"]);
    }

    #[test]
    fn two_markers_render_in_order() {
        let t = TextTemplate::parse("{{a}} and {{b}}");
        assert_eq!(t.slot_count(), 2);
        assert_eq!(t.render(&["1", "2"]), "1 and 2");
    }

    #[test]
    fn markers_close_at_first_terminator() {
        let t = TextTemplate::parse("{{a}}}}");
        assert_eq!(paths(&t), ["a"]);
        assert_eq!(t.render(&["x"]), "x}}");
    }

    #[test]
    fn expression_markers_stay_verbatim() {
        let t = TextTemplate::parse("{{ a + b }} {{c}}");
        assert_eq!(paths(&t), ["c"]);
        assert_eq!(t.rejected().len(), 1);
        assert_eq!(t.render(&["C"]), "{{ a + b }} C");
    }

    #[test]
    fn innermost_opener_wins() {
        let t = TextTemplate::parse("{{ a {{b}} }}");
        assert_eq!(paths(&t), ["b"]);
        assert!(t.rejected().is_empty());
        assert_eq!(t.render(&["B"]), "{{ a B }}");

        let t = TextTemplate::parse("{{{a}}");
        assert_eq!(paths(&t), ["a"]);
        assert_eq!(t.render(&["x"]), "{x");
    }

    #[test]
    fn unclosed_marker_is_literal() {
        let t = TextTemplate::parse("{{a}} then {{ broken");
        assert_eq!(t.slot_count(), 1);
        assert_eq!(t.render(&["A"]), "A then {{ broken");
    }

    #[test]
    fn empty_marker_is_rejected() {
        let t = TextTemplate::parse("{{}}");
        assert!(!t.has_slots());
        assert!(matches!(t.rejected()[0], ReactiveError::InvalidPath { .. }));
        assert_eq!(t.render::<&str>(&[]), "{{}}");
    }

    #[test]
    fn missing_values_render_empty() {
        let t = TextTemplate::parse("[{{a}}|{{b}}]");
        assert_eq!(t.render(&["only"]), "[only|]");
    }
}
