use std::path::PathBuf;
use thiserror::Error;

use crate::classfile::ClassId;

/// Result type for classdeps operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for classfile analysis and dependency tracking
#[derive(Error, Debug)]
pub enum Error {
    #[error("Format error: {message}")]
    Format { message: String },

    #[error("Constant pool {kind} missing at index {index}")]
    Reference { kind: &'static str, index: u16 },

    #[error("Class mismatch, expected {expected}; found {found}")]
    IdentityMismatch { expected: ClassId, found: ClassId },

    #[error("Malformed signature '{text}' at position {position}: {message}")]
    Signature {
        text: String,
        position: usize,
        message: String,
    },

    #[error("While analyzing {id}: {source}")]
    Class {
        id: ClassId,
        #[source]
        source: Box<Error>,
    },

    #[error("IO error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl Error {
    /// Create a format error
    pub fn format_error(message: impl Into<String>) -> Self {
        Self::Format { message: message.into() }
    }

    /// Create a reference error for a pool index holding no entry of `kind`
    pub fn reference_error(kind: &'static str, index: u16) -> Self {
        Self::Reference { kind, index }
    }

    /// Create a signature error at a character position
    pub fn signature_error(text: &str, position: usize, message: impl Into<String>) -> Self {
        Self::Signature {
            text: text.to_string(),
            position,
            message: message.into(),
        }
    }

    /// Wrap an IO error with the path it happened on
    pub fn io_error(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io { path: path.into(), source }
    }

    /// Attach the class being analyzed to an error
    pub fn in_class(self, id: &ClassId) -> Self {
        Self::Class { id: id.clone(), source: Box::new(self) }
    }
}

// Truncated reads surface from byteorder as UnexpectedEof
impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Self::Format { message: format!("truncated classfile: {}", err) }
    }
}
