//! Error taxonomy for the form compiler.
//!
//! Every variant here is fatal to a compilation: nothing is written when any
//! of them surfaces.
use std::path::PathBuf;

use thiserror::Error;

/// The markup violates a form invariant.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemaError {
    #[error("malformed markup at byte {position}: {message}")]
    Markup { position: usize, message: String },

    #[error("document has no <{0}> element")]
    MissingElement(&'static str),

    #[error("<{element}> is missing required attribute `{attribute}`")]
    MissingAttribute { element: String, attribute: &'static str },

    #[error("attribute `{attribute}` has invalid value {value:?}: {reason}")]
    InvalidAttribute { attribute: String, value: String, reason: String },

    #[error("`{0}` is not a valid identifier")]
    InvalidIdentifier(String),

    #[error("`{0}` collides with a member of the generated dialog")]
    ReservedIdentifier(String),

    #[error("duplicate id `{0}`")]
    DuplicateId(String),

    #[error("duplicate persisted name `{0}`")]
    DuplicateName(String),

    #[error("field `{id}` has unsupported type {kind:?}")]
    UnsupportedKind { id: String, kind: String },

    #[error("field `{id}` has inconsistent bounds: {detail}")]
    InconsistentBounds { id: String, detail: String },

    #[error("group `{0}` contains no fields")]
    EmptyGroup(String),
}

/// The requested (language, module) pair is not registered.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("language {language:?} is not supported by module {module:?}")]
pub struct UnsupportedBindingError {
    pub language: String,
    pub module: String,
}

/// A binding descriptor cannot be registered.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    #[error("unknown shape {shape:?} for {language}/{module}")]
    UnknownShape { shape: String, language: String, module: String },

    #[error("binding language and module must not be empty")]
    EmptyKey,
}

#[derive(Debug, Error)]
pub enum CompileError {
    #[error(transparent)]
    Schema(#[from] SchemaError),

    #[error(transparent)]
    UnsupportedBinding(#[from] UnsupportedBindingError),

    #[error("{path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("`{0}` is not a valid name for generated code")]
    InvalidName(String),

    #[error("binding file {path}: {message}")]
    BindingFile { path: PathBuf, message: String },
}

impl CompileError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io { path: path.into(), source }
    }
}

pub type CompileResult<T> = Result<T, CompileError>;
