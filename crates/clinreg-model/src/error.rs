use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ModelError {
    #[error("invalid participant identifier: {0:?}")]
    InvalidParticipantId(String),
    #[error("unknown cohort prefix: {0:?}")]
    UnknownCohort(String),
}

pub type Result<T> = std::result::Result<T, ModelError>;

/// The subject registry could not serve as ground truth.
#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("subject registry not found: {path}")]
    Missing { path: PathBuf },
    #[error("subject registry {path} is unreadable: {message}")]
    Unreadable { path: PathBuf, message: String },
    #[error("subject registry is missing column {column}")]
    MissingColumn { column: String },
    #[error("subject registry contains no subjects")]
    Empty,
}
