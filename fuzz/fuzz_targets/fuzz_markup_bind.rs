#![no_main]

use std::rc::Rc;

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use weft_reactive::{Object, PathSource, Value};
use weft_view::{Document, ViewBinder};

#[derive(Arbitrary, Debug)]
struct Input {
    markup: String,
    writes: Vec<(u8, i16)>,
    typed: Vec<String>,
}

const KEYS: [&str; 4] = ["a", "b", "info", "name"];

fuzz_target!(|input: Input| {
    let Ok(doc) = Document::parse(&input.markup) else {
        return;
    };
    let data: Object = KEYS.iter().map(|k| (*k, Value::from(0))).collect();
    let source: Rc<dyn PathSource> = Rc::new(data.clone());
    if ViewBinder::default().bind(doc.node(), &source).is_err() {
        return;
    }
    for (key, value) in input.writes {
        data.set(KEYS[usize::from(key) % KEYS.len()], i32::from(value));
    }
    let inputs: Vec<_> = doc
        .node()
        .descendants()
        .into_iter()
        .filter(|n| n.input_listener_count() > 0)
        .collect();
    for (node, text) in inputs.iter().cycle().zip(input.typed) {
        node.dispatch_input(&text);
    }
    let _ = doc.to_html();
});
