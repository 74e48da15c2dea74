// Emission plan derived from a FormSpec: the flat data schema and the visual sections.
use serde_json::{Map, Value};

use crate::ir::{ContentNode, FieldKind, FieldNode, FormSpec, GroupNode};

/// One visual block of the dialog, in `content` order.
#[derive(Debug, Clone, PartialEq)]
pub enum Section<'a> {
    /// A run of consecutive top-level fields; `index` counts runs from 0.
    Fields { index: usize, fields: Vec<&'a FieldNode> },
    Group(&'a GroupNode),
}

/// Every field in declaration order, group membership flattened away.
pub fn fields(spec: &FormSpec) -> Vec<&FieldNode> {
    let mut out = Vec::new();
    for node in &spec.content {
        match node {
            ContentNode::Field(f) => out.push(f),
            ContentNode::Group(g) => out.extend(g.items.iter()),
        }
    }
    out
}

pub fn sections(spec: &FormSpec) -> Vec<Section<'_>> {
    let mut out: Vec<Section<'_>> = Vec::new();
    let mut runs = 0;
    for node in &spec.content {
        match node {
            ContentNode::Field(f) => match out.last_mut() {
                Some(Section::Fields { fields, .. }) => fields.push(f),
                _ => {
                    out.push(Section::Fields { index: runs, fields: vec![f] });
                    runs += 1;
                }
            },
            ContentNode::Group(g) => out.push(Section::Group(g)),
        }
    }
    out
}

pub fn default_value(kind: &FieldKind) -> Value {
    match kind {
        FieldKind::Text { default_value, .. } => Value::from(default_value.clone()),
        FieldKind::Number { default_value, .. } => Value::from(*default_value),
    }
}

/// What the persistence object writes when no config file exists yet.
pub fn default_payload(spec: &FormSpec) -> Value {
    let mut map = Map::new();
    for f in fields(spec) {
        map.insert(f.name.clone(), default_value(&f.kind));
    }
    Value::Object(map)
}

// ------------------------------- Tests ------------------------------------ //

#[cfg(test)]
mod tests {
    use super::*;

    fn field(id: &str, kind: FieldKind) -> FieldNode {
        FieldNode { id: id.into(), name: id.into(), label: id.into(), kind }
    }

    fn spec() -> FormSpec {
        let mut spec = FormSpec::empty();
        spec.content = vec![
            ContentNode::Field(field("a", FieldKind::text())),
            ContentNode::Field(field("b", FieldKind::number())),
            ContentNode::Group(GroupNode {
                id: "g".into(),
                label: "G".into(),
                items: vec![field("c", FieldKind::number()), field("d", FieldKind::text())],
            }),
            ContentNode::Field(field("e", FieldKind::text())),
        ];
        spec
    }

    #[test]
    fn fields_flatten_groups_in_order() {
        let spec = spec();
        let ids: Vec<_> = fields(&spec).iter().map(|f| f.id.as_str()).collect();
        assert_eq!(ids, ["a", "b", "c", "d", "e"]);
    }

    #[test]
    fn consecutive_fields_share_a_section() {
        let spec = spec();
        let sections = sections(&spec);
        assert_eq!(sections.len(), 3);
        assert!(matches!(&sections[0], Section::Fields { index: 0, fields } if fields.len() == 2));
        assert!(matches!(&sections[1], Section::Group(g) if g.id == "g"));
        assert!(matches!(&sections[2], Section::Fields { index: 1, fields } if fields.len() == 1));
    }

    #[test]
    fn default_payload_uses_names_and_defaults() {
        let mut spec = FormSpec::empty();
        let mut age = field("age", FieldKind::Number { default_value: 18, min: 0, max: 100, step: 1 });
        age.name = "user_age".into();
        spec.content = vec![ContentNode::Field(field("user_name", FieldKind::text())), ContentNode::Field(age)];
        assert_eq!(
            serde_json::to_string(&default_payload(&spec)).unwrap(),
            r#"{"user_name":"","user_age":18}"#
        );
    }
}
