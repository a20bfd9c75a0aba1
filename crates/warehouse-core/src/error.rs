//! Error types for the molecule warehouse.
//!
//! Per-command errors (parse failures, unknown names) are local: the
//! dispatcher turns them into outcomes and they never abort the server.
//! I/O, bind and configuration errors are the only ones that reach `main`.

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for the warehouse library.
#[derive(Debug, Error)]
pub enum WarehouseError {
    // Command errors
    #[error("Parse error: {message}")]
    Parse { message: String },

    #[error("Unknown atom: {0}")]
    UnknownAtom(String),

    #[error("Unknown molecule: {0}")]
    UnknownMolecule(String),

    #[error("Unknown product: {0}")]
    UnknownProduct(String),

    // File system errors
    #[error("IO error at {path:?}: {message}")]
    Io {
        message: String,
        path: Option<PathBuf>,
        #[source]
        source: Option<std::io::Error>,
    },

    // Transport errors
    #[error("Failed to bind {endpoint}: {source}")]
    Bind {
        endpoint: String,
        #[source]
        source: std::io::Error,
    },

    // Configuration errors
    #[error("Configuration error: {message}")]
    Config { message: String },
}

/// Result type alias for warehouse operations.
pub type Result<T> = std::result::Result<T, WarehouseError>;

impl From<std::io::Error> for WarehouseError {
    fn from(err: std::io::Error) -> Self {
        WarehouseError::Io {
            message: err.to_string(),
            path: None,
            source: Some(err),
        }
    }
}

impl WarehouseError {
    /// Create a parse error.
    pub fn parse(message: impl Into<String>) -> Self {
        WarehouseError::Parse {
            message: message.into(),
        }
    }

    /// Create an IO error with path context.
    pub fn io_with_path(err: std::io::Error, path: impl Into<PathBuf>) -> Self {
        WarehouseError::Io {
            message: err.to_string(),
            path: Some(path.into()),
            source: Some(err),
        }
    }

    /// Create a bind error for the named endpoint.
    pub fn bind(endpoint: impl Into<String>, source: std::io::Error) -> Self {
        WarehouseError::Bind {
            endpoint: endpoint.into(),
            source,
        }
    }

    /// The unrecognized name, for unknown-kind errors.
    pub fn unknown_name(&self) -> Option<&str> {
        match self {
            WarehouseError::UnknownAtom(name)
            | WarehouseError::UnknownMolecule(name)
            | WarehouseError::UnknownProduct(name) => Some(name),
            _ => None,
        }
    }
}
