//! Binding descriptors and the registry that resolves them.
//!
//! A binding is pure data: the module spelling used in imports, the import
//! templates, and the localized UI strings. Bindings that share an API shape
//! share one emitter; adding a toolkit with the same shape is a new table
//! entry (or an entry in a JSON bindings file), never new emitter code.
use std::path::Path;

use indexmap::IndexMap;
use once_cell::sync::Lazy;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::codegen::{qt, Emitter};
use crate::error::{CompileError, CompileResult, RegistryError, UnsupportedBindingError};

pub const FALLBACK_LANGUAGE: &str = "en";

// ————————————————————————————————————————————————————————————————————————————
// TYPES
// ————————————————————————————————————————————————————————————————————————————

/// Localized strings baked into generated dialogs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UiStrings {
    pub save: String,
    pub cancel: String,
    pub warning_title: String,
    /// Template with `{label}` and `{min}` placeholders.
    pub min_length: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BindingDescriptor {
    /// Target source language, e.g. `Python3`.
    pub language: String,
    /// Registry key for the GUI module, e.g. `PyQt5`.
    pub module: String,
    /// Module name as spelled in generated imports. Defaults to `module`.
    #[serde(default)]
    pub module_name: String,
    /// Emitter family this binding renders through.
    #[serde(default = "default_shape")]
    pub shape: String,
    /// Import templates; `{module}` expands to `module_name`. Empty means the shape's defaults.
    #[serde(default)]
    pub imports: Vec<String>,
    /// Strings per form language tag. Empty means the built-in table.
    #[serde(default)]
    pub strings: IndexMap<String, UiStrings>,
}

pub type EmitterFactory = fn(&BindingDescriptor) -> Box<dyn Emitter>;

struct Shape {
    name: &'static str,
    factory: EmitterFactory,
    imports: &'static [&'static str],
}

const SHAPES: &[Shape] = &[Shape {
    name: qt::SHAPE,
    factory: qt::factory,
    imports: qt::IMPORT_TEMPLATES,
}];

/// A registry hit: the descriptor plus the factory for its shape.
#[derive(Debug, Clone, Copy)]
pub struct ResolvedBinding<'r> {
    pub descriptor: &'r BindingDescriptor,
    pub factory: EmitterFactory,
}

#[derive(Debug, Clone, Default)]
pub struct Registry {
    entries: IndexMap<(String, String), BindingDescriptor>,
}

// ————————————————————————————————————————————————————————————————————————————
// BUILT-IN DATA
// ————————————————————————————————————————————————————————————————————————————

static DEFAULT_STRINGS: Lazy<IndexMap<String, UiStrings>> = Lazy::new(|| {
    let mut table = IndexMap::new();
    table.insert("en".to_string(), UiStrings {
        save: "Save".into(),
        cancel: "Cancel".into(),
        warning_title: "Warning".into(),
        min_length: "\"{label}\" must be at least {min} characters long.".into(),
    });
    table.insert("zh".to_string(), UiStrings {
        save: "保存".into(),
        cancel: "取消".into(),
        warning_title: "警告".into(),
        min_length: "“{label}”至少需要{min}个字符。".into(),
    });
    table
});

const BUILTIN: &[(&str, &str)] = &[
    ("Python3", "PyQt5"),
    ("Python3", "PyQt6"),
    ("Python3", "PySide2"),
    ("Python3", "PySide6"),
];

fn default_shape() -> String {
    qt::SHAPE.to_string()
}

// ————————————————————————————————————————————————————————————————————————————
// IMPLEMENTATION
// ————————————————————————————————————————————————————————————————————————————

impl UiStrings {
    pub fn min_length_message(&self, label: &str, min: u32) -> String {
        self.min_length
            .replace("{label}", label)
            .replace("{min}", &min.to_string())
    }
}

impl BindingDescriptor {
    pub fn new(language: &str, module: &str) -> Self {
        Self {
            language: language.to_string(),
            module: module.to_string(),
            module_name: String::new(),
            shape: default_shape(),
            imports: Vec::new(),
            strings: IndexMap::new(),
        }
    }

    pub fn key(&self) -> (String, String) {
        registry_key(&self.language, &self.module)
    }

    /// Import lines with the module name substituted.
    pub fn import_lines(&self) -> Vec<String> {
        self.imports
            .iter()
            .map(|t| t.replace("{module}", &self.module_name))
            .collect()
    }

    /// Strings for `language`, falling back to English, then to whatever
    /// the table holds first.
    pub fn strings_for(&self, language: &str) -> &UiStrings {
        if let Some(strings) = self.strings.get(language) {
            return strings;
        }
        log::warn!(
            "no {}/{} strings for language {language:?}, using {FALLBACK_LANGUAGE:?}",
            self.language,
            self.module
        );
        self.strings
            .get(FALLBACK_LANGUAGE)
            .or_else(|| self.strings.values().next())
            .unwrap_or(&DEFAULT_STRINGS[FALLBACK_LANGUAGE])
    }

    /// Fill omitted fields from the shape defaults.
    fn complete(mut self, shape: &Shape) -> Self {
        if self.module_name.is_empty() {
            self.module_name = self.module.clone();
        }
        if self.imports.is_empty() {
            self.imports = shape.imports.iter().map(|s| s.to_string()).collect();
        }
        if self.strings.is_empty() {
            self.strings = DEFAULT_STRINGS.clone();
        }
        self
    }
}

impl<'r> ResolvedBinding<'r> {
    pub fn emitter(&self) -> Box<dyn Emitter> {
        (self.factory)(self.descriptor)
    }
}

impl Registry {
    /// The bindings shipped with the compiler.
    pub fn builtin() -> Self {
        let mut registry = Self::default();
        for (language, module) in BUILTIN {
            let added = registry.register(BindingDescriptor::new(language, module));
            debug_assert!(added.is_ok());
        }
        registry
    }

    /// Add or replace a binding. Fails on an unknown shape or an empty key.
    pub fn register(&mut self, descriptor: BindingDescriptor) -> Result<(), RegistryError> {
        if descriptor.language.trim().is_empty() || descriptor.module.trim().is_empty() {
            return Err(RegistryError::EmptyKey);
        }
        let shape = find_shape(&descriptor.shape).ok_or_else(|| RegistryError::UnknownShape {
            shape: descriptor.shape.clone(),
            language: descriptor.language.clone(),
            module: descriptor.module.clone(),
        })?;
        let descriptor = descriptor.complete(shape);
        let key = descriptor.key();
        if self.entries.insert(key, descriptor).is_some() {
            log::info!("binding replaced by a later registration");
        }
        Ok(())
    }

    /// Load extra descriptors from a JSON array; returns how many were added.
    pub fn load_file(&mut self, path: &Path) -> CompileResult<usize> {
        let source = std::fs::read_to_string(path).map_err(|e| CompileError::io(path, e))?;
        let descriptors: Vec<BindingDescriptor> = from_str_with_path(&source)
            .map_err(|message| CompileError::BindingFile { path: path.to_path_buf(), message })?;
        let count = descriptors.len();
        for descriptor in descriptors {
            self.register(descriptor).map_err(|err| CompileError::BindingFile {
                path: path.to_path_buf(),
                message: err.to_string(),
            })?;
        }
        log::debug!("loaded {count} binding(s) from {}", path.display());
        Ok(count)
    }

    /// Case-insensitive lookup of a (language, module) pair.
    pub fn resolve(&self, language: &str, module: &str) -> Result<ResolvedBinding<'_>, UnsupportedBindingError> {
        let unsupported = || UnsupportedBindingError {
            language: language.to_string(),
            module: module.to_string(),
        };
        let descriptor = self.entries.get(&registry_key(language, module)).ok_or_else(unsupported)?;
        let shape = find_shape(&descriptor.shape).ok_or_else(unsupported)?;
        Ok(ResolvedBinding { descriptor, factory: shape.factory })
    }

    pub fn iter(&self) -> impl Iterator<Item = &BindingDescriptor> {
        self.entries.values()
    }

    /// Registered bindings grouped by language, in registration order.
    pub fn languages(&self) -> IndexMap<&str, Vec<&str>> {
        let mut out: IndexMap<&str, Vec<&str>> = IndexMap::new();
        for d in self.entries.values() {
            out.entry(d.language.as_str()).or_default().push(d.module.as_str());
        }
        out
    }
}

// ————————————————————————————————————————————————————————————————————————————
// INTERNAL HELPERS
// ————————————————————————————————————————————————————————————————————————————

fn registry_key(language: &str, module: &str) -> (String, String) {
    (language.trim().to_uppercase(), module.trim().to_uppercase())
}

fn find_shape(name: &str) -> Option<&'static Shape> {
    SHAPES.iter().find(|s| s.name == name)
}

/// Deserialize with JSON-path context in error messages.
fn from_str_with_path<T: DeserializeOwned>(src: &str) -> Result<T, String> {
    let de = &mut serde_json::Deserializer::from_str(src);
    serde_path_to_error::deserialize::<_, T>(de).map_err(|err| {
        let path = err.path().to_string();
        format!("at JSON path {path} → {}", err.into_inner())
    })
}

// ------------------------------- Tests ------------------------------------ //
