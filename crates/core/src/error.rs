//! Structured error type for every fallible operation in the crate.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("format error: {0}")]
    Format(String),

    #[error("parameter error: {0}")]
    Parameter(String),

    #[error("index {index} out of bounds (limit {limit})")]
    Bounds { index: usize, limit: usize },

    #[error("integrity check failed: expected {expected} bytes, got {actual}")]
    Integrity { expected: u64, actual: u64 },

    #[error("compression error: {0}")]
    Compression(String),
}
