#![forbid(unsafe_code)]

//! Markup loading.
//!
//! HTML-like markup is parsed with `tl` and converted into detached
//! [`ViewNode`]s. Comments are dropped; whitespace-only text is kept so that
//! serializing a loaded tree gives back its layout. Character references in
//! text and attribute values (named HTML entities and decimal or hex numeric
//! references) are decoded with `html_escape`; unknown references stay
//! verbatim.

use crate::error::{Result, ViewError};
use crate::node::ViewNode;

/// Parse markup into top-level detached nodes.
///
/// # Errors
///
/// [`ViewError::Markup`] when `tl` rejects the input.
pub fn parse_fragment(markup: &str) -> Result<Vec<ViewNode>> {
    let dom = tl::parse(markup, tl::ParserOptions::default()).map_err(|err| ViewError::Markup {
        reason: format!("{err:?}"),
    })?;
    let parser = dom.parser();
    let nodes: Vec<ViewNode> = dom
        .children()
        .iter()
        .filter_map(|handle| convert(*handle, parser))
        .collect();
    tracing::debug!(top_level = nodes.len(), bytes = markup.len(), "markup loaded");
    Ok(nodes)
}

fn convert(handle: tl::NodeHandle, parser: &tl::Parser<'_>) -> Option<ViewNode> {
    match handle.get(parser)? {
        tl::Node::Tag(tag) => {
            let element = ViewNode::element(&tag.name().as_utf8_str());
            for (key, value) in tag.attributes().iter() {
                let value = value.map(|v| decode_entities(&v)).unwrap_or_default();
                element.set_attribute(&key.to_ascii_lowercase(), &value);
            }
            if let Some(initial) = element.attribute("value") {
                element.set_value(&initial);
            }
            for child in tag.children().top().iter() {
                if let Some(node) = convert(*child, parser) {
                    element.append_child(&node);
                }
            }
            Some(element)
        }
        tl::Node::Raw(bytes) => Some(ViewNode::text(decode_entities(&bytes.as_utf8_str()))),
        tl::Node::Comment(_) => None,
    }
}

fn decode_entities(raw: &str) -> String {
    html_escape::decode_html_entities(raw).into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::{Document, NodeKind};

    #[test]
    fn builds_nested_tree() {
        let nodes = parse_fragment(r#"<div id="app"><p>Hello {{name}}</p><br></div>"#).unwrap();
        assert_eq!(nodes.len(), 1);
        let app = &nodes[0];
        assert_eq!(app.attribute("id").as_deref(), Some("app"));
        let children = app.children();
        assert_eq!(children.len(), 2);
        assert_eq!(children[0].tag().as_deref(), Some("p"));
        assert_eq!(children[0].text_content(), "Hello {{name}}");
        assert_eq!(children[1].tag().as_deref(), Some("br"));
    }

    #[test]
    fn value_attribute_seeds_value_slot() {
        let nodes = parse_fragment(r#"<input type="text" value="7">"#).unwrap();
        assert_eq!(nodes[0].value().as_deref(), Some("7"));
    }

    #[test]
    fn bare_attribute_has_empty_value() {
        let nodes = parse_fragment("<input disabled>").unwrap();
        assert_eq!(nodes[0].attribute("disabled").as_deref(), Some(""));
    }

    #[test]
    fn comments_are_dropped() {
        let nodes = parse_fragment("<p><!-- note -->text</p>").unwrap();
        let children = nodes[0].children();
        assert_eq!(children.len(), 1);
        assert_eq!(children[0].kind(), NodeKind::Text);
    }

    #[test]
    fn entities_decode_once() {
        assert_eq!(decode_entities("a &amp; b &lt;c&gt; &amp;amp;"), "a & b <c> &amp;");
        assert_eq!(decode_entities("lone & sign"), "lone & sign");
    }

    #[test]
    fn named_and_numeric_entities_decode() {
        assert_eq!(decode_entities("a&nbsp;b &#169; &#x41; &apos;"), "a\u{a0}b \u{a9} A '");
        assert_eq!(decode_entities("&bogus;"), "&bogus;");
    }

    #[test]
    fn document_serializes_back() {
        let source = r#"<div id="app"><p>1 &lt; 2</p></div>"#;
        let doc = Document::parse(source).unwrap();
        assert_eq!(doc.to_html(), source);
    }

    #[test]
    fn entities_survive_a_serialize_round_trip() {
        let doc = Document::parse(r#"<div id="app"><p>a&nbsp;b &#169; &apos;</p></div>"#).unwrap();
        assert_eq!(doc.node().text_content(), "a\u{a0}b \u{a9} '");
        let html = doc.to_html();
        assert_eq!(html, "<div id=\"app\"><p>a\u{a0}b \u{a9} '</p></div>");
        let again = Document::parse(&html).unwrap();
        assert_eq!(again.node().text_content(), doc.node().text_content());
    }

    #[test]
    fn attribute_entities_decode_and_reescape() {
        let doc = Document::parse(r#"<p title="&quot;x&quot; &amp; &#169;">t</p>"#).unwrap();
        let p = doc.query("p").unwrap().unwrap();
        assert_eq!(p.attribute("title").as_deref(), Some("\"x\" & \u{a9}"));
        assert_eq!(doc.to_html(), "<p title=\"&quot;x&quot; &amp; \u{a9}\">t</p>");
    }
}
