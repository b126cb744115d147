//! Markup fixtures shared by integration tests.

/// One interpolated text node under `#app`.
pub const GREETING: &str = r#"<div id="app"><p>Hello {{info.name}}</p></div>"#;

/// Two markers bound to different paths inside one text node.
pub const TWO_MARKERS: &str = r#"<div id="app"><p>{{first}} and {{second}}</p></div>"#;

/// A two-way bound input next to a text echo of the same path.
pub const FORM: &str = concat!(
    r#"<div id="app">"#,
    r#"<input type="text" v-model="info.age">"#,
    r#"<span>{{info.age}}</span>"#,
    r#"</div>"#,
);

/// Nested structure with text at several depths and an unbound sibling.
pub const NESTED: &str = concat!(
    r#"<div id="app">"#,
    r#"<h1>{{title}}</h1>"#,
    r#"<ul><li>{{info.name}}</li><li>static</li></ul>"#,
    r#"<footer><em>{{info.name}} / {{title}}</em></footer>"#,
    r#"</div>"#,
);
