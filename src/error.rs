//! Fatal errors. Anything here stops the run immediately.

use std::path::PathBuf;
use thiserror::Error;

use crate::definition::DefinitionKind;
use crate::diagnostics::Diagnostic;

#[derive(Debug, Error)]
pub enum CompileError {
    #[error("Name collision: {kind} `{name}` is already defined")]
    NameCollision { name: String, kind: DefinitionKind },

    #[error("Resource error for {}: {source}", .path.display())]
    Resource {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Compilation failed with {} diagnostic(s)", .0.len())]
    Diagnostics(Vec<Diagnostic>),

    #[error("Asset manifest requires compiler >= {required}, current is {current}")]
    CompilerVersionMismatch { required: String, current: String },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, CompileError>;
