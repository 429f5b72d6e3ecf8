//! Error taxonomy of the claim store.

use std::path::PathBuf;

use crate::consts::{MAX_CONTENT_BYTES, MAX_USERNAME_BYTES};

pub type StoreResult<T> = std::result::Result<T, StoreError>;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// No claim file at the given path.
    #[error("claim file does not exist: {0}")]
    NotFound(PathBuf),

    /// The claim file has the wrong byte length. Never repaired automatically.
    #[error("claim file has invalid size {actual} B (expected {expected} B), refusing to open")]
    InvalidSize { actual: u64, expected: u64 },

    /// Another handle holds the exclusive lock on the claim file.
    #[error("claim file is locked by another store: {0}")]
    Locked(PathBuf),

    /// Save attempted on a store opened with read_only.
    #[error("claim store is read-only: {0}")]
    ReadOnly(PathBuf),

    #[error("invalid image coordinates ({x}, {y})")]
    InvalidCoordinates { x: i64, y: i64 },

    #[error("username too long: {len} B (max {max} B)", max = MAX_USERNAME_BYTES)]
    UsernameTooLong { len: usize },

    #[error("content too long: {len} B (max {max} B)", max = MAX_CONTENT_BYTES)]
    ContentTooLong { len: usize },

    #[error("invalid claim id {0}")]
    InvalidId(f64),

    #[error("username already has a claim: {0}")]
    DuplicateUsername(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl StoreError {
    /// True for failures of `save_claim` input validation.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            StoreError::InvalidCoordinates { .. }
                | StoreError::UsernameTooLong { .. }
                | StoreError::ContentTooLong { .. }
                | StoreError::InvalidId(_)
                | StoreError::DuplicateUsername(_)
        )
    }
}
