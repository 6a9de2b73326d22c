//! Errors surfaced by the ledger.
//!
//! - [`Validation`] when a draft or budget breaks an invariant (non-positive
//!   amount, unknown category, unknown currency).
//! - [`NotFound`] when an update/delete targets an id that is not stored.
//! - [`Persistence`] when the data file cannot be read, written or encoded.
//!
//! Validation and NotFound never leave partial state behind: the failing
//! operation is a no-op.
//!
//!  [`Validation`]: TallyError::Validation
//!  [`NotFound`]: TallyError::NotFound
//!  [`Persistence`]: TallyError::Persistence
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TallyError {
    #[error("Invalid input: {0}")]
    Validation(String),
    #[error("\"{0}\" not found!")]
    NotFound(String),
    #[error("Storage failure: {0}")]
    Persistence(String),
}

impl TallyError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn not_found(key: impl Into<String>) -> Self {
        Self::NotFound(key.into())
    }

    pub fn persistence(msg: impl Into<String>) -> Self {
        Self::Persistence(msg.into())
    }
}

pub type Result<T> = std::result::Result<T, TallyError>;
