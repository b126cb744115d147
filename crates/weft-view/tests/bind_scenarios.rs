#![forbid(unsafe_code)]

//! End-to-end binding scenarios against plain intercepted objects.

use std::rc::Rc;

use serde_json::json;
use weft_harness::{LogCapture, fixtures};
use weft_reactive::{Object, PathSource, Value, observe};
use weft_view::{Document, ViewBinder, ViewNode};

fn mount(markup: &str, data: serde_json::Value) -> (Document, Object, Rc<dyn PathSource>) {
    let doc = Document::parse(markup).expect("markup");
    let obj = observe(data).as_object().cloned().expect("object data");
    let source: Rc<dyn PathSource> = Rc::new(obj.clone());
    let root = doc.query("#app").unwrap().expect("#app");
    ViewBinder::default().bind(&root, &source).expect("bind");
    (doc, obj, source)
}

fn node(doc: &Document, locator: &str) -> ViewNode {
    doc.query(locator).unwrap().expect(locator)
}

fn nested(obj: &Object, key: &str) -> Object {
    obj.peek(key).and_then(|v| v.as_object().cloned()).expect(key)
}

// ── Text markers ────────────────────────────────────────────────────────

#[test]
fn hello_name_follows_leaf_and_ancestor_writes() {
    let (doc, data, _source) = mount(fixtures::GREETING, json!({"info": {"name": "a"}}));
    let p = node(&doc, "p");
    assert_eq!(p.text_content(), "Hello a");

    nested(&data, "info").set("name", "b");
    assert_eq!(p.text_content(), "Hello b");

    data.set("info", observe(json!({"name": "c"})));
    assert_eq!(p.text_content(), "Hello c");

    nested(&data, "info").set("name", "d");
    assert_eq!(p.text_content(), "Hello d");
}

#[test]
fn two_markers_update_independently() {
    let (doc, data, _source) = mount(fixtures::TWO_MARKERS, json!({"first": "x", "second": "y"}));
    let p = node(&doc, "p");
    assert_eq!(p.text_content(), "x and y");

    data.set("first", "X");
    assert_eq!(p.text_content(), "X and y");
    data.set("second", "Y");
    assert_eq!(p.text_content(), "X and Y");
}

#[test]
fn shared_path_updates_every_site() {
    let (doc, data, _source) = mount(
        fixtures::NESTED,
        json!({"title": "T", "info": {"name": "n"}}),
    );
    assert_eq!(node(&doc, "li").text_content(), "n");
    assert_eq!(node(&doc, "em").text_content(), "n / T");

    nested(&data, "info").set("name", "m");
    assert_eq!(node(&doc, "li").text_content(), "m");
    assert_eq!(node(&doc, "em").text_content(), "m / T");
    assert_eq!(node(&doc, "h1").text_content(), "T");
}

#[test]
fn equal_write_leaves_document_untouched() {
    let (doc, data, _source) = mount(fixtures::GREETING, json!({"info": {"name": "a"}}));
    let before = doc.revision();
    nested(&data, "info").set("name", "a");
    assert_eq!(doc.revision(), before);
}

#[test]
fn unresolved_marker_is_logged() {
    let capture = LogCapture::with_filter("warn");
    let (doc, _data, _source) = mount(fixtures::GREETING, json!({"info": {}}));
    assert_eq!(node(&doc, "p").text_content(), "Hello ");
    assert!(capture.contains("binding path unresolved"));
    assert!(capture.contains("info.name"));
}

#[test]
fn expression_marker_is_logged_and_kept() {
    let capture = LogCapture::with_filter("warn");
    let (doc, _data, _source) = mount(
        r#"<div id="app"><p>{{ a + b }}</p></div>"#,
        json!({"a": 1, "b": 2}),
    );
    assert_eq!(node(&doc, "p").text_content(), "{{ a + b }}");
    assert!(capture.contains("marker left verbatim"));
}

// ── Two-way directives ──────────────────────────────────────────────────

#[test]
fn model_to_view() {
    let (doc, data, _source) = mount(fixtures::FORM, json!({"info": {"age": 20}}));
    let input = node(&doc, "input");
    assert_eq!(input.value().as_deref(), Some("20"));

    nested(&data, "info").set("age", 21);
    assert_eq!(input.value().as_deref(), Some("21"));
    assert_eq!(node(&doc, "span").text_content(), "21");
}

#[test]
fn view_to_model() {
    let (doc, data, _source) = mount(fixtures::FORM, json!({"info": {"age": 20}}));
    let input = node(&doc, "input");
    let before = doc.revision();

    input.dispatch_input("30");
    assert_eq!(nested(&data, "info").peek("age"), Some(Value::from("30")));
    assert_eq!(node(&doc, "span").text_content(), "30");
    assert_eq!(input.value().as_deref(), Some("30"));
    // input value + span text; no echo write into the input
    assert_eq!(doc.revision(), before + 2);
}

#[test]
fn repeated_identical_input_is_silent() {
    let (doc, _data, _source) = mount(fixtures::FORM, json!({"info": {"age": 20}}));
    let input = node(&doc, "input");
    input.dispatch_input("30");
    let after_first = doc.revision();
    input.dispatch_input("30");
    assert_eq!(doc.revision(), after_first);
}
