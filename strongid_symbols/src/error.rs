//! Error types for symbol queries and manifest loading.

use std::path::PathBuf;

use thiserror::Error;

use crate::query::{DeclarationId, SyntaxUnitId};

/// Result alias used by every fallible facade operation.
pub type SymbolResult<T> = Result<T, SymbolError>;

#[derive(Error, Debug)]
pub enum SymbolError {
    /// The host handed out a syntax unit id it no longer knows about
    #[error("Unknown syntax unit: {0}")]
    UnknownUnit(SyntaxUnitId),

    /// A declaration id does not point into its syntax unit
    #[error("Unknown type declaration: {0}")]
    UnknownDeclaration(DeclarationId),

    /// Failed to read a manifest from disk
    #[error("Failed to read manifest '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The manifest is not valid TOML or does not match the expected shape
    #[error("Failed to parse compilation manifest: {0}")]
    Parse(#[from] toml::de::Error),

    /// The manifest parsed but describes an impossible compilation
    #[error("Invalid compilation manifest: {0}")]
    InvalidManifest(String),
}
