//! Error types for `census-core`.

use thiserror::Error;

/// Raised when a caller-supplied field map cannot be turned into a safe
/// statement.
#[derive(Debug, Error)]
pub enum Error {
  #[error("no fields supplied")]
  EmptyFields,

  #[error("unknown field: {0:?}")]
  UnknownField(String),

  #[error("field {0:?} is assigned by the server and cannot be written")]
  ReadOnlyField(String),

  #[error("field {field:?} expects {expected}, got {found}")]
  InvalidValue {
    field:    String,
    expected: &'static str,
    found:    String,
  },
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
