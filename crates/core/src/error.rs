//! Error types for gdbkit

use thiserror::Error;

/// Main error type for gdbkit operations
#[derive(Error, Debug)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Malformed workspace: {0}")]
    Malformed(#[from] serde_json::Error),

    #[error("Workspace not accessible: {path} ({reason})")]
    WorkspaceUnavailable { path: String, reason: String },

    #[error("Workspace is locked by another process: {0}")]
    SchemaLocked(String),

    #[error("Container not found: {0}")]
    ContainerNotFound(String),

    #[error("Field not found: {field} in {container}")]
    FieldNotFound { container: String, field: String },

    #[error("Field already exists: {field} in {container}")]
    FieldExists { container: String, field: String },

    #[error("Field {field} in {container} has type {actual}, expected {expected}")]
    FieldTypeMismatch {
        container: String,
        field: String,
        expected: String,
        actual: String,
    },

    #[error("Domain not found: {0}")]
    DomainNotFound(String),

    #[error("Domain {name} is still referenced by {references} field(s)")]
    DomainInUse { name: String, references: usize },

    #[error("Unsupported geometry: {0}")]
    UnsupportedGeometry(String),

    #[error("CRS error: {0}")]
    Crs(String),

    #[error("Invalid parameter: {name} = {value} ({reason})")]
    InvalidParameter {
        name: &'static str,
        value: String,
        reason: String,
    },

    #[error("{0}")]
    Other(String),
}

/// Result type alias for gdbkit operations
pub type Result<T> = std::result::Result<T, Error>;
