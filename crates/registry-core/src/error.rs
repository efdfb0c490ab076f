//! Error types for `registry-core`.

use thiserror::Error;
use uuid::Uuid;

use crate::validate::ValidationErrors;

#[derive(Debug, Error)]
pub enum Error {
  /// One or more fields failed validation; all failures are collected.
  #[error("validation failed: {0}")]
  Validation(ValidationErrors),

  /// The birth date and gender do not satisfy the age policy.
  #[error("age requirements not met: {}", .0.join("; "))]
  Ineligible(Vec<String>),

  /// A person with the same name and birth date is already registered.
  #[error("a person with the same name and date of birth already exists")]
  Conflict,

  #[error("person not found: {0}")]
  NotFound(Uuid),

  #[error("invalid page: {0}")]
  InvalidPage(u32),

  #[error("store error: {0}")]
  Store(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl From<ValidationErrors> for Error {
  fn from(errors: ValidationErrors) -> Self { Self::Validation(errors) }
}

impl Error {
  /// Box a backend error at the service boundary.
  pub fn store<E>(e: E) -> Self
  where
    E: std::error::Error + Send + Sync + 'static,
  {
    Self::Store(Box::new(e))
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
