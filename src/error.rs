use strongid_symbols::SymbolError;
use thiserror::Error;

pub type CodegenResult<T> = Result<T, CodegenError>;

#[derive(Error, Debug)]
pub enum CodegenError {
    #[error(transparent)]
    Symbols(#[from] SymbolError),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Failed to parse generator configuration: {0}")]
    ConfigParse(#[from] toml::de::Error),

    #[error("IO Error: {0}")]
    Io(#[from] std::io::Error),

    /// An identifier type reached emission without exactly one marker tag
    /// carrying exactly one type argument
    #[error("Type '{type_name}' must implement exactly one '{marker}' with a single type argument, found {found}")]
    SynthesisPrecondition {
        type_name: String,
        marker: String,
        found: String,
    },

    #[error("Duplicate artifact hint name: {0}")]
    DuplicateArtifact(String),

    #[error("Generation pass cancelled")]
    Cancelled,
}
