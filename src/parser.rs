//! Markup → [`FormSpec`].
//!
//! A single top-down pass over the direct children of `<body>`. Two child
//! shapes are recognised:
//!
//! ```html
//! <div><label>User name</label><input type="text" id="user_name" maxlength="10"></div>
//!
//! <fieldset id="prefs">
//!     <legend>Preferences</legend>
//!     <div><label>Age</label><input type="number" id="age" min="0" max="100" value="18"></div>
//! </fieldset>
//! ```
//!
//! Anything else is skipped so newer documents still compile. The first
//! invalid field aborts the whole parse.
use std::collections::HashSet;
use std::fmt::Display;
use std::str::FromStr;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::SchemaError;
use crate::ir::{self, ContentNode, FieldKind, FieldNode, FormSpec, GroupNode};
use crate::markup::{self, Element};

static IDENTIFIER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").unwrap()
});

pub fn is_identifier(s: &str) -> bool {
    IDENTIFIER.is_match(s)
}

/// Parse markup source into a validated [`FormSpec`].
pub fn parse_str(src: &str) -> Result<FormSpec, SchemaError> {
    let root = markup::read_document(src)?;
    Parser::default().parse_document(&root)
}

// ————————————————————————————————————————————————————————————————————————————
// PARSER
// ————————————————————————————————————————————————————————————————————————————

#[derive(Default)]
pub struct Parser {
    ids: HashSet<String>,
    names: HashSet<String>,
}

impl Parser {
    pub fn parse_document(&mut self, root: &Element) -> Result<FormSpec, SchemaError> {
        if root.name != "html" {
            return Err(SchemaError::MissingElement("html"));
        }
        let body = root.child("body").ok_or(SchemaError::MissingElement("body"))?;

        let mut spec = FormSpec::empty();
        if let Some(lang) = non_empty(root.attr("lang")) {
            spec.language = lang.to_string();
        }
        if let Some(title) = root.child("head").and_then(|h| h.child("title")) {
            let title = title.text();
            if !title.is_empty() {
                spec.title = title;
            }
        }
        spec.width = dimension(body, "width", ir::DEFAULT_WIDTH)?;
        spec.height = dimension(body, "height", ir::DEFAULT_HEIGHT)?;
        if let Some(path) = non_empty(body.attr("configpath")) {
            spec.config_path = path.to_string();
        }

        for child in body.elements() {
            if child.name == "fieldset" {
                let group = self.parse_group(child)?;
                spec.content.push(ContentNode::Group(group));
            } else if let Some((label, input)) = field_block(child) {
                let field = self.parse_field(label, input)?;
                spec.content.push(ContentNode::Field(field));
            } else {
                log::debug!("ignoring unrecognised <{}> in <body>", child.name);
            }
        }

        Ok(spec)
    }

    fn parse_group(&mut self, fieldset: &Element) -> Result<GroupNode, SchemaError> {
        let id = self.claim_id(fieldset)?;

        let mut children = fieldset.elements().peekable();
        // a missing legend falls back to the id so the container stays titled
        let label = match children.peek() {
            Some(first) if first.name == "legend" || first.name == "label" => {
                let text = first.text();
                children.next();
                text
            }
            _ => id.clone(),
        };

        let mut items = Vec::new();
        for child in children {
            match field_block(child) {
                Some((label, input)) => items.push(self.parse_field(label, input)?),
                None => log::debug!("ignoring unrecognised <{}> in group `{id}`", child.name),
            }
        }
        if items.is_empty() {
            return Err(SchemaError::EmptyGroup(id));
        }

        Ok(GroupNode { id, label, items })
    }

    /// Shared by top-level and grouped fields.
    fn parse_field(&mut self, label: &Element, input: &Element) -> Result<FieldNode, SchemaError> {
        let id = self.claim_id(input)?;

        let name = non_empty(input.attr("name")).unwrap_or(&id).to_string();
        if !self.names.insert(name.clone()) {
            return Err(SchemaError::DuplicateName(name));
        }

        let kind_attr = input.attr("type").map(str::trim).unwrap_or("text").to_ascii_lowercase();
        let kind = match kind_attr.as_str() {
            "text" => text_kind(&id, input)?,
            "number" => number_kind(&id, input)?,
            _ => {
                return Err(SchemaError::UnsupportedKind { id, kind: kind_attr });
            }
        };

        log::debug!("field `{id}` ({}) persisted as {name:?}", kind.tag());
        Ok(FieldNode { id, name, label: label.text(), kind })
    }

    fn claim_id(&mut self, el: &Element) -> Result<String, SchemaError> {
        let id = non_empty(el.attr("id"))
            .ok_or_else(|| SchemaError::MissingAttribute {
                element: el.name.clone(),
                attribute: "id",
            })?
            .to_string();
        if !is_identifier(&id) {
            return Err(SchemaError::InvalidIdentifier(id));
        }
        if !self.ids.insert(id.clone()) {
            return Err(SchemaError::DuplicateId(id));
        }
        Ok(id)
    }
}

// ————————————————————————————————————————————————————————————————————————————
// FIELD KINDS
// ————————————————————————————————————————————————————————————————————————————

fn text_kind(id: &str, input: &Element) -> Result<FieldKind, SchemaError> {
    let placeholder = input.attr("placeholder").unwrap_or_default().to_string();
    let default_value = input.attr("value").unwrap_or_default().to_string();
    let min_length: u32 = int_attr(input, "minlength", 0)?;
    let max_length: u32 = int_attr(input, "maxlength", ir::DEFAULT_MAX_LENGTH)?;

    if max_length == 0 {
        return Err(bounds(id, "maxlength must be greater than 0"));
    }
    if min_length > max_length {
        return Err(bounds(id, format!("minlength {min_length} > maxlength {max_length}")));
    }
    let len = default_value.chars().count();
    if len > max_length as usize {
        return Err(bounds(id, format!("value has {len} characters, maxlength is {max_length}")));
    }

    Ok(FieldKind::Text { placeholder, default_value, min_length, max_length })
}

fn number_kind(id: &str, input: &Element) -> Result<FieldKind, SchemaError> {
    let default_value: i64 = int_attr(input, "value", 0)?;
    let min: i64 = int_attr(input, "min", 0)?;
    let max: i64 = int_attr(input, "max", ir::DEFAULT_NUMBER_MAX)?;
    let step: i64 = int_attr(input, "step", 1)?;

    if min > max {
        return Err(bounds(id, format!("min {min} > max {max}")));
    }
    if !(min..=max).contains(&default_value) {
        return Err(bounds(id, format!("value {default_value} outside [{min}, {max}]")));
    }
    if step < 1 {
        return Err(bounds(id, format!("step {step} must be at least 1")));
    }
    // spin boxes hold a 32-bit int
    for (key, v) in [("value", default_value), ("min", min), ("max", max), ("step", step)] {
        if i32::try_from(v).is_err() {
            return Err(bounds(id, format!("{key} {v} does not fit in 32 bits")));
        }
    }

    Ok(FieldKind::Number { default_value, min, max, step })
}

// ————————————————————————————————————————————————————————————————————————————
// HELPERS
// ————————————————————————————————————————————————————————————————————————————

/// `<label>` followed by `<input>`, and nothing else.
fn field_block(el: &Element) -> Option<(&Element, &Element)> {
    let mut it = el.elements();
    match (it.next(), it.next(), it.next()) {
        (Some(label), Some(input), None) if label.name == "label" && input.name == "input" => {
            Some((label, input))
        }
        _ => None,
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

fn int_attr<T>(el: &Element, key: &str, default: T) -> Result<T, SchemaError>
where
    T: FromStr,
    T::Err: Display,
{
    match non_empty(el.attr(key)) {
        None => Ok(default),
        Some(raw) => raw.parse::<T>().map_err(|err| SchemaError::InvalidAttribute {
            attribute: key.to_string(),
            value: raw.to_string(),
            reason: err.to_string(),
        }),
    }
}

fn dimension(body: &Element, key: &str, default: u32) -> Result<u32, SchemaError> {
    let value: u32 = int_attr(body, key, default)?;
    if value == 0 {
        return Err(SchemaError::InvalidAttribute {
            attribute: key.to_string(),
            value: "0".to_string(),
            reason: "must be positive".to_string(),
        });
    }
    Ok(value)
}

fn bounds(id: &str, detail: impl Into<String>) -> SchemaError {
    SchemaError::InconsistentBounds { id: id.to_string(), detail: detail.into() }
}

// ------------------------------- Tests ------------------------------------ //

#[cfg(test)]
mod tests {
    use super::*;

    fn doc(body: &str) -> String {
        format!(r#"<html lang="en"><head><title>T</title></head><body>{body}</body></html>"#)
    }

    fn ok(body: &str) -> FormSpec { parse_str(&doc(body)).unwrap() }
    fn err(body: &str) -> SchemaError { parse_str(&doc(body)).unwrap_err() }

    #[test]
    fn defaults_apply_when_attributes_are_absent() {
        let spec = parse_str("<html><body></body></html>").unwrap();
        assert_eq!(spec.language, "en");
        assert_eq!(spec.title, ir::DEFAULT_TITLE);
        assert_eq!((spec.width, spec.height), (800, 600));
        assert_eq!(spec.config_path, "./res/config.json");
        assert!(spec.content.is_empty());
    }

    #[test]
    fn layout_attributes_are_read() {
        let src = r#"<html lang="zh"><head><title> 设置 </title></head>
            <body width="300" height="200" configPath="./data/app.json"></body></html>"#;
        let spec = parse_str(src).unwrap();
        assert_eq!(spec.language, "zh");
        assert_eq!(spec.title, "设置");
        assert_eq!((spec.width, spec.height), (300, 200));
        assert_eq!(spec.config_path, "./data/app.json");
    }

    #[test]
    fn text_field_defaults() {
        let spec = ok(r#"<div><label>Name</label><input type="text" id="user_name"></div>"#);
        let ContentNode::Field(field) = &spec.content[0] else { panic!("expected field") };
        assert_eq!(field.id, "user_name");
        assert_eq!(field.name, "user_name");
        assert_eq!(field.label, "Name");
        assert_eq!(field.kind, FieldKind::text());
    }

    #[test]
    fn missing_type_is_text() {
        let spec = ok(r#"<div><label>Name</label><input id="n"></div>"#);
        let ContentNode::Field(field) = &spec.content[0] else { panic!("expected field") };
        assert_eq!(field.kind.tag(), "text");
    }

    #[test]
    fn number_field_attributes() {
        let spec = ok(r#"<div><label>Age</label>
            <input type="number" id="age" name="user_age" min="0" max="100" value="18" step="5"></div>"#);
        let ContentNode::Field(field) = &spec.content[0] else { panic!("expected field") };
        assert_eq!(field.name, "user_age");
        assert_eq!(field.kind, FieldKind::Number { default_value: 18, min: 0, max: 100, step: 5 });
    }

    #[test]
    fn group_collects_fields_in_order() {
        let spec = ok(r#"<fieldset id="prefs"><legend>Prefs</legend>
            <div><label>A</label><input type="number" id="a"></div>
            <div><label>B</label><input type="text" id="b"></div>
        </fieldset>"#);
        let ContentNode::Group(group) = &spec.content[0] else { panic!("expected group") };
        assert_eq!(group.label, "Prefs");
        let ids: Vec<_> = group.items.iter().map(|f| f.id.as_str()).collect();
        assert_eq!(ids, ["a", "b"]);
    }

    #[test]
    fn group_without_legend_uses_id() {
        let spec = ok(r#"<fieldset id="misc"><div><label>A</label><input id="a"></div></fieldset>"#);
        let ContentNode::Group(group) = &spec.content[0] else { panic!("expected group") };
        assert_eq!(group.label, "misc");
    }

    #[test]
    fn unrecognised_children_are_ignored() {
        let spec = ok(r#"<p>intro</p><hr><div><label>A</label><input id="a"></div><span></span>"#);
        assert_eq!(spec.content.len(), 1);
    }

    #[test]
    fn duplicate_id_across_group_and_top_level() {
        let e = err(r#"<div><label>A</label><input id="a"></div>
            <fieldset id="g"><legend>G</legend><div><label>A</label><input id="a"></div></fieldset>"#);
        assert_eq!(e, SchemaError::DuplicateId("a".into()));
    }

    #[test]
    fn group_id_shares_the_id_namespace() {
        let e = err(r#"<div><label>A</label><input id="g"></div>
            <fieldset id="g"><legend>G</legend><div><label>B</label><input id="b"></div></fieldset>"#);
        assert_eq!(e, SchemaError::DuplicateId("g".into()));
    }

    #[test]
    fn duplicate_persisted_name() {
        let e = err(r#"<div><label>A</label><input id="a" name="k"></div>
            <div><label>B</label><input id="b" name="k"></div>"#);
        assert_eq!(e, SchemaError::DuplicateName("k".into()));
    }

    #[test]
    fn missing_id() {
        let e = err(r#"<div><label>A</label><input type="text"></div>"#);
        assert!(matches!(e, SchemaError::MissingAttribute { attribute: "id", .. }));
    }

    #[test]
    fn invalid_identifier() {
        let e = err(r#"<div><label>A</label><input id="user-name"></div>"#);
        assert_eq!(e, SchemaError::InvalidIdentifier("user-name".into()));
    }

    #[test]
    fn unsupported_kind() {
        let e = err(r#"<div><label>A</label><input type="checkbox" id="a"></div>"#);
        assert!(matches!(e, SchemaError::UnsupportedKind { .. }));
    }

    #[test]
    fn inconsistent_bounds() {
        assert!(matches!(
            err(r#"<div><label>A</label><input type="number" id="a" min="5" max="1"></div>"#),
            SchemaError::InconsistentBounds { .. }
        ));
        assert!(matches!(
            err(r#"<div><label>A</label><input id="a" minlength="5" maxlength="2"></div>"#),
            SchemaError::InconsistentBounds { .. }
        ));
        assert!(matches!(
            err(r#"<div><label>A</label><input type="number" id="a" value="11"></div>"#),
            SchemaError::InconsistentBounds { .. }
        ));
        assert!(matches!(
            err(r#"<div><label>A</label><input type="number" id="a" step="0"></div>"#),
            SchemaError::InconsistentBounds { .. }
        ));
    }

    #[test]
    fn number_bounds_must_fit_a_spin_box() {
        for attrs in [
            r#"min="0" max="9999999999""#,
            r#"min="-2147483649" max="0" value="0""#,
            r#"max="10" step="4294967296""#,
        ] {
            let e = err(&format!(r#"<div><label>A</label><input type="number" id="a" {attrs}></div>"#));
            assert!(matches!(e, SchemaError::InconsistentBounds { ref id, .. } if id == "a"), "{attrs}: {e}");
        }
        let spec = ok(r#"<div><label>A</label><input type="number" id="a" min="-2147483648" max="2147483647"></div>"#);
        let ContentNode::Field(field) = &spec.content[0] else { panic!("expected field") };
        assert_eq!(field.kind, FieldKind::Number { default_value: 0, min: i32::MIN as i64, max: i32::MAX as i64, step: 1 });
    }

    #[test]
    fn type_is_case_insensitive() {
        let spec = ok(r#"<div><label>Age</label><input type=" Number " id="age"></div>"#);
        let ContentNode::Field(field) = &spec.content[0] else { panic!("expected field") };
        assert_eq!(field.kind, FieldKind::number());
        assert_eq!(
            err(r#"<div><label>A</label><input type="CheckBox" id="a"></div>"#),
            SchemaError::UnsupportedKind { id: "a".into(), kind: "checkbox".into() }
        );
    }

    #[test]
    fn non_integer_attribute() {
        let e = err(r#"<div><label>A</label><input type="number" id="a" max="ten"></div>"#);
        assert!(matches!(e, SchemaError::InvalidAttribute { ref attribute, .. } if attribute == "max"));
    }

    #[test]
    fn empty_group_is_rejected() {
        assert_eq!(
            err(r#"<fieldset id="g"><legend>G</legend></fieldset>"#),
            SchemaError::EmptyGroup("g".into())
        );
    }

    #[test]
    fn zero_width_is_rejected() {
        let e = parse_str(r#"<html><body width="0"></body></html>"#).unwrap_err();
        assert!(matches!(e, SchemaError::InvalidAttribute { .. }));
    }

    #[test]
    fn missing_body() {
        assert_eq!(parse_str("<html></html>").unwrap_err(), SchemaError::MissingElement("body"));
    }
}
