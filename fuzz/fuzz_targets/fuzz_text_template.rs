#![no_main]

use libfuzzer_sys::fuzz_target;
use weft_view::TextTemplate;

fuzz_target!(|data: &[u8]| {
    let Ok(text) = std::str::from_utf8(data) else {
        return;
    };
    let template = TextTemplate::parse(text);
    if !text.contains("{{") {
        assert!(!template.has_slots());
        assert_eq!(template.render::<&str>(&[]), text);
    }
    let values: Vec<String> = (0..template.slot_count()).map(|i| i.to_string()).collect();
    let _ = template.render(&values);
});
