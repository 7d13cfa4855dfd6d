//! Error handling for the declaration model and CLI
//!
//! The field extractor itself never fails; these errors come from the layers
//! around it.

use thiserror::Error;

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    // ==================== Declaration Errors ====================

    #[error("Malformed declaration '{name}' at line {line}: no balanced body")]
    MalformedDeclaration { name: String, line: u32 },

    #[error("Invalid anonymous payload for member '{member}': {reason}")]
    Decode { member: String, reason: String },

    // ==================== I/O Errors ====================

    #[error("IO error: {0}")]
    Io(String),

    #[error("Serialization error: {0}")]
    Serialize(String),
}

impl Error {
    /// Source line associated with this error, if any
    pub fn line(&self) -> Option<u32> {
        match self {
            Self::MalformedDeclaration { line, .. } => Some(*line),
            Self::Decode { .. } | Self::Io(_) | Self::Serialize(_) => None,
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialize(err.to_string())
    }
}
