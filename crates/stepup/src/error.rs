//! Error types for the migration sequencer.

use thiserror::Error;

use crate::version::Version;

/// Result type for migration operations
pub type MigrateResult<T> = Result<T, MigrateError>;

/// Error raised by a migration step.
///
/// Steps are opaque units of work; whatever error they produce is carried
/// through unchanged and handed to the observer.
pub type StepError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Outcome of executing a single migration step.
pub type StepResult = Result<(), StepError>;

/// Migration sequencing errors
#[derive(Error, Debug)]
pub enum MigrateError {
    #[error("invalid version `{0}`: expected three dot-separated numeric components")]
    InvalidFormat(String),

    #[error("a migration step is already registered for version {0}")]
    DuplicateRegistration(Version),

    #[error("persisted marker `{value}` under key `{key}` is not a valid version")]
    CorruptMarker { key: String, value: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("backend error: {0}")]
    Backend(String),
}
