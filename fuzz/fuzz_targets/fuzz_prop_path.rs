#![no_main]

use libfuzzer_sys::fuzz_target;
use weft_reactive::{Object, PropPath, Value};

fuzz_target!(|data: &[u8]| {
    let Ok(raw) = std::str::from_utf8(data) else {
        return;
    };
    let Ok(path) = PropPath::parse(raw) else {
        return;
    };
    // A parsed path prints in canonical form and reparses to itself.
    let canonical = path.to_string();
    assert_eq!(PropPath::parse(&canonical).ok(), Some(path.clone()));

    let root: Object = [("a", Value::from(1))].into_iter().collect();
    let _ = path.peek(&root);
    let _ = path.assign(&root, Value::from("x"));
});
