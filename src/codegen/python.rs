//! Python surface syntax shared by every Python binding.
use crate::ir::FieldKind;

pub const INDENT: &str = "    ";

/// Names that cannot be used as Python attribute or method names.
pub const KEYWORDS: &[&str] = &[
    "False", "None", "True", "and", "as", "assert", "async", "await", "break", "class",
    "continue", "def", "del", "elif", "else", "except", "finally", "for", "from", "global",
    "if", "import", "in", "is", "lambda", "nonlocal", "not", "or", "pass", "raise", "return",
    "try", "while", "with", "yield",
];

/// Single-quoted string literal. Non-ASCII text is kept as is (files are UTF-8).
pub fn str_lit(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('\'');
    for c in s.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\'' => out.push_str("\\'"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if (c as u32) < 0x20 || c == '\u{7f}' => out.push_str(&format!("\\x{:02x}", c as u32)),
            c => out.push(c),
        }
    }
    out.push('\'');
    out
}

pub fn type_name(kind: &FieldKind) -> &'static str {
    match kind {
        FieldKind::Text { .. } => "str",
        FieldKind::Number { .. } => "int",
    }
}

pub fn default_lit(kind: &FieldKind) -> String {
    match kind {
        FieldKind::Text { default_value, .. } => str_lit(default_value),
        FieldKind::Number { default_value, .. } => default_value.to_string(),
    }
}
