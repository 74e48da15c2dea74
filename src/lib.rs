//! Compile HTML-like settings forms into source code.
//!
//! ```text
//! markup ──markup──▶ element tree ──parser──▶ FormSpec ──lower/codegen──▶ source text
//!                                                 ▲
//!                             binding::Registry ──┘ (selects the emitter)
//! ```
//!
//! | Module | Contents |
//! |--------|----------|
//! | [`markup`] | `quick-xml` reader into an owned element tree |
//! | [`parser`] | element tree → validated [`ir::FormSpec`] |
//! | [`ir`] | the intermediate form model |
//! | [`lower`] | flattened fields, visual sections, default payload |
//! | [`binding`] | binding descriptors and the registry |
//! | [`codegen`] | the `Emitter` trait and the Qt widgets emitter |
//! | [`cli`] | command line front end |
pub mod binding;
pub mod cli;
pub mod codegen;
pub mod error;
pub mod ir;
pub mod logging;
pub mod lower;
pub mod markup;
pub mod parser;

use std::io::Write;
use std::path::Path;

pub use binding::Registry;
pub use codegen::{EmitOptions, Emitted, Emitter};
pub use error::{CompileError, CompileResult, RegistryError, SchemaError, UnsupportedBindingError};
pub use ir::FormSpec;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompileOptions {
    /// Target language of the binding, e.g. `Python3`.
    pub language: String,
    /// GUI module of the binding, e.g. `PyQt5`.
    pub module: String,
    pub emit: EmitOptions,
}

impl Default for CompileOptions {
    fn default() -> Self {
        Self {
            language: "Python3".to_string(),
            module: "PyQt5".to_string(),
            emit: EmitOptions::default(),
        }
    }
}

// ------------------------------- Front API -------------------------------- //

/// Parse `source` and emit it for the requested binding.
///
/// The binding is resolved before anything is parsed, and nothing is
/// returned unless every stage succeeds.
pub fn compile(source: &str, options: &CompileOptions, registry: &Registry) -> CompileResult<Emitted> {
    let binding = registry.resolve(&options.language, &options.module)?;
    check_output_names(&options.emit)?;

    let spec = parser::parse_str(source)?;
    log::info!("parsed form {:?} with {} field(s)", spec.title, lower::fields(&spec).len());

    let emitter = binding.emitter();
    emit_spec(&spec, emitter.as_ref(), &options.emit)
}

pub fn compile_file(input: &Path, options: &CompileOptions, registry: &Registry) -> CompileResult<Emitted> {
    // resolve first so an unsupported binding never touches the filesystem
    registry.resolve(&options.language, &options.module)?;
    let source = std::fs::read_to_string(input).map_err(|e| CompileError::io(input, e))?;
    compile(&source, options, registry)
}

/// Emit an already-parsed spec after checking its ids against the emitter's reserved names.
pub fn emit_spec(spec: &FormSpec, emitter: &dyn Emitter, options: &EmitOptions) -> CompileResult<Emitted> {
    check_reserved(spec, emitter.reserved_names())?;
    let d = emitter.descriptor();
    log::debug!("emitting with {}/{}", d.language, d.module);
    Ok(emitter.emit(spec, options))
}

/// Replace `path` with `text` in one step: write a sibling temp file, then
/// rename it over the destination.
pub fn write_output(path: &Path, text: &str) -> CompileResult<()> {
    let dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    let mut tmp = tempfile::NamedTempFile::new_in(dir).map_err(|e| CompileError::io(dir, e))?;
    tmp.write_all(text.as_bytes()).map_err(|e| CompileError::io(tmp.path(), e))?;
    tmp.persist(path).map_err(|e| CompileError::io(path, e.error))?;
    log::info!("wrote {}", path.display());
    Ok(())
}

// ------------------------------- Helpers ---------------------------------- //

fn check_output_names(options: &EmitOptions) -> CompileResult<()> {
    for name in [&options.data_name, &options.window_name] {
        if !parser::is_identifier(name) {
            return Err(CompileError::InvalidName(name.clone()));
        }
    }
    if options.data_name == options.window_name {
        return Err(CompileError::InvalidName(options.window_name.clone()));
    }
    if let Some(module) = &options.data_module {
        if !module.split('.').all(parser::is_identifier) {
            return Err(CompileError::InvalidName(module.clone()));
        }
    }
    Ok(())
}

fn check_reserved(spec: &FormSpec, reserved: &[&str]) -> Result<(), SchemaError> {
    for field in lower::fields(spec) {
        if field.id.starts_with("__") || reserved.contains(&field.id.as_str()) {
            return Err(SchemaError::ReservedIdentifier(field.id.clone()));
        }
    }
    Ok(())
}

// ------------------------------- Tests ------------------------------------ //
