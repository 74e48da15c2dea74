// Validated form model shared by the parser and the emitters. No markup types here.
use serde::Serialize;

pub const DEFAULT_LANGUAGE: &str = "en";
pub const DEFAULT_TITLE: &str = "Config Window";
pub const DEFAULT_WIDTH: u32 = 800;
pub const DEFAULT_HEIGHT: u32 = 600;
pub const DEFAULT_CONFIG_PATH: &str = "./res/config.json";
pub const DEFAULT_MAX_LENGTH: u32 = 10;
pub const DEFAULT_NUMBER_MAX: i64 = 10;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FormSpec {
    pub language: String,
    pub title: String,
    pub width: u32,
    pub height: u32,
    pub config_path: String,
    pub content: Vec<ContentNode>, // order is render order and save/load order
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "node", rename_all = "camelCase")]
pub enum ContentNode {
    Field(FieldNode),
    Group(GroupNode),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldNode {
    pub id: String,
    pub name: String,         // persisted key, defaults to `id`
    pub label: String,
    #[serde(flatten)]
    pub kind: FieldKind,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum FieldKind {
    #[serde(rename_all = "camelCase")]
    Text {
        placeholder: String,
        default_value: String,
        min_length: u32,
        max_length: u32,  // > 0, >= min_length
    },
    #[serde(rename_all = "camelCase")]
    Number {
        default_value: i64,
        min: i64,
        max: i64,         // >= min
        step: i64,        // >= 1
    },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupNode {
    pub id: String,
    pub label: String,
    pub items: Vec<FieldNode>, // never empty
}

impl FormSpec {
    /// A spec with every layout attribute at its default and no content.
    pub fn empty() -> Self {
        Self {
            language: DEFAULT_LANGUAGE.to_string(),
            title: DEFAULT_TITLE.to_string(),
            width: DEFAULT_WIDTH,
            height: DEFAULT_HEIGHT,
            config_path: DEFAULT_CONFIG_PATH.to_string(),
            content: Vec::new(),
        }
    }
}

impl FieldKind {
    pub fn text() -> Self {
        FieldKind::Text {
            placeholder: String::new(),
            default_value: String::new(),
            min_length: 0,
            max_length: DEFAULT_MAX_LENGTH,
        }
    }

    pub fn number() -> Self {
        FieldKind::Number { default_value: 0, min: 0, max: DEFAULT_NUMBER_MAX, step: 1 }
    }

    pub fn tag(&self) -> &'static str {
        match self {
            FieldKind::Text { .. } => "text",
            FieldKind::Number { .. } => "number",
        }
    }
}
