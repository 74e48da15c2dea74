//! Source emission.
//!
//! An [`Emitter`] turns a [`FormSpec`] into two ordered line buffers: the
//! persistence class and the dialog class, each with its own import block.
//! Emission is a pure function of its inputs, so the same spec and binding
//! always give byte-identical text.
pub mod python;
pub mod qt;
mod writer;

pub use writer::SourceWriter;

use crate::binding::BindingDescriptor;
use crate::ir::FormSpec;

pub const DEFAULT_DATA_NAME: &str = "ConfigData";
pub const DEFAULT_WINDOW_NAME: &str = "ConfigWindow";

// ————————————————————————————————————————————————————————————————————————————
// TYPES
// ————————————————————————————————————————————————————————————————————————————

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmitOptions {
    /// Class name of the persistence object.
    pub data_name: String,
    /// Class name of the dialog object.
    pub window_name: String,
    /// When set, the dialog source imports the persistence class from this
    /// module instead of expecting it in the same file.
    pub data_module: Option<String>,
}

pub trait Emitter {
    fn descriptor(&self) -> &BindingDescriptor;

    /// Field ids that would shadow members of the generated classes.
    fn reserved_names(&self) -> &'static [&'static str];

    fn emit(&self, spec: &FormSpec, options: &EmitOptions) -> Emitted;
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Emitted {
    pub persistence_imports: Vec<String>,
    pub persistence: Vec<String>,
    pub dialog_imports: Vec<String>,
    pub dialog: Vec<String>,
}

// ————————————————————————————————————————————————————————————————————————————
// IMPLEMENTATION
// ————————————————————————————————————————————————————————————————————————————

impl Default for EmitOptions {
    fn default() -> Self {
        Self {
            data_name: DEFAULT_DATA_NAME.to_string(),
            window_name: DEFAULT_WINDOW_NAME.to_string(),
            data_module: None,
        }
    }
}

impl Emitted {
    /// `(persistence_source, dialog_source)`, each a complete file.
    pub fn sources(&self) -> (String, String) {
        (
            join_file(&[&self.persistence_imports], &[&self.persistence]),
            join_file(&[&self.dialog_imports], &[&self.dialog]),
        )
    }

    /// Both classes in one file, imports first.
    pub fn render(&self) -> String {
        join_file(
            &[&self.persistence_imports, &self.dialog_imports],
            &[&self.persistence, &self.dialog],
        )
    }
}

/// Imports, then each class separated by two blank lines, newline-terminated.
fn join_file(imports: &[&Vec<String>], classes: &[&Vec<String>]) -> String {
    let mut lines: Vec<&str> = Vec::new();
    for block in imports {
        lines.extend(block.iter().map(String::as_str));
    }
    for class in classes {
        if !lines.is_empty() {
            lines.extend(["", ""]);
        }
        lines.extend(class.iter().map(String::as_str));
    }
    let mut out = lines.join("\n");
    out.push('\n');
    out
}
