//! Error types and handling for code list compilation

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for code list operations
#[derive(Debug, Error)]
pub enum CodelistError {
    /// A Code value appears more than once across one sheet (inline and external rows
    /// share a single namespace)
    #[error("Duplicate Code {code}")]
    DuplicateCode { code: String },

    /// A non-empty Parent did not match any Id (`#id`) or Code seen before it
    #[error("Parent {parent} not resolved in {table}")]
    UnresolvedParent { parent: String, table: String },

    /// Malformed delimited sheet input
    #[error("Sheet error in '{sheet}': {message}")]
    SheetError { sheet: String, message: String },

    /// Configuration loading or validation errors
    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    /// File system I/O errors
    #[error("IO error for path '{path}': {source}")]
    IoError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// JSON serialization errors
    #[error("JSON error for '{path}': {source}")]
    JsonError {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// Generic internal errors
    #[error("Internal error: {message}")]
    InternalError { message: String },
}

/// Error kind enumeration for categorizing errors
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    Compile,
    Sheet,
    Config,
    Io,
    Serialize,
    Internal,
}

impl CodelistError {
    /// Get the error kind for this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            CodelistError::DuplicateCode { .. } => ErrorKind::Compile,
            CodelistError::UnresolvedParent { .. } => ErrorKind::Compile,
            CodelistError::SheetError { .. } => ErrorKind::Sheet,
            CodelistError::ConfigError { .. } => ErrorKind::Config,
            CodelistError::IoError { .. } => ErrorKind::Io,
            CodelistError::JsonError { .. } => ErrorKind::Serialize,
            CodelistError::InternalError { .. } => ErrorKind::Internal,
        }
    }

    /// Check if this error only invalidates the current sheet, so a batch can
    /// continue with the next one
    pub fn is_recoverable(&self) -> bool {
        matches!(self.kind(), ErrorKind::Compile | ErrorKind::Sheet)
    }

    /// Create a duplicate code error
    pub fn duplicate_code(code: impl Into<String>) -> Self {
        Self::DuplicateCode { code: code.into() }
    }

    /// Create an unresolved parent error
    pub fn unresolved_parent(parent: impl Into<String>, table: impl Into<String>) -> Self {
        Self::UnresolvedParent {
            parent: parent.into(),
            table: table.into(),
        }
    }

    /// Create a sheet error
    pub fn sheet_error(sheet: impl Into<String>, message: impl Into<String>) -> Self {
        Self::SheetError {
            sheet: sheet.into(),
            message: message.into(),
        }
    }

    /// Create a configuration error
    pub fn config_error(message: impl Into<String>) -> Self {
        Self::ConfigError {
            message: message.into(),
        }
    }

    /// Create an IO error with path context
    pub fn io_error(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::IoError {
            path: path.into(),
            source,
        }
    }

    /// Create a JSON error with path context
    pub fn json_error(path: impl Into<PathBuf>, source: serde_json::Error) -> Self {
        Self::JsonError {
            path: path.into(),
            source,
        }
    }

    /// Create an internal error
    pub fn internal_error(message: impl Into<String>) -> Self {
        Self::InternalError {
            message: message.into(),
        }
    }
}

/// Convert from std::io::Error
impl From<std::io::Error> for CodelistError {
    fn from(err: std::io::Error) -> Self {
        Self::IoError {
            path: PathBuf::new(),
            source: err,
        }
    }
}
