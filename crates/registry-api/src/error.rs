//! API error type and [`axum::response::IntoResponse`] implementation.
//!
//! Client-facing failures carry the details the caller needs to fix the
//! request. Internal failures are logged in full and answered with a generic
//! message only.

use axum::{
  Json,
  extract::rejection::JsonRejection,
  http::StatusCode,
  response::{IntoResponse, Response},
};
use registry_core::validate::ValidationErrors;
use serde_json::json;
use thiserror::Error;

/// An error returned by an API handler.
#[derive(Debug, Error)]
pub enum ApiError {
  /// The body was not JSON, or not the JSON shape the endpoint takes.
  #[error("malformed body: {0}")]
  MalformedBody(#[from] JsonRejection),

  #[error("validation failed: {0}")]
  Validation(ValidationErrors),

  #[error("age requirements not met: {0:?}")]
  Ineligible(Vec<String>),

  #[error("duplicate registration")]
  Conflict,

  #[error("not found")]
  NotFound,

  #[error("invalid page")]
  InvalidPage,

  #[error("missing required fields")]
  MissingFields(&'static [&'static str]),

  #[error("invalid date")]
  InvalidDate,

  /// Anything unexpected. `message` is what the caller sees.
  #[error("{message}: {source}")]
  Internal {
    message: &'static str,
    #[source]
    source:  Box<dyn std::error::Error + Send + Sync>,
  },
}

impl ApiError {
  /// Map a service error, using `failure` as the caller-facing message if
  /// the failure is internal.
  pub fn from_core(err: registry_core::Error, failure: &'static str) -> Self {
    use registry_core::Error as E;
    match err {
      E::Validation(errors) => Self::Validation(errors),
      E::Ineligible(messages) => Self::Ineligible(messages),
      E::Conflict => Self::Conflict,
      E::NotFound(_) => Self::NotFound,
      E::InvalidPage(_) => Self::InvalidPage,
      E::Store(source) => Self::Internal { message: failure, source },
    }
  }
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    let (status, body) = match self {
      ApiError::MalformedBody(rejection) => (
        StatusCode::BAD_REQUEST,
        json!({ "error": "Malformed request", "message": rejection.body_text() }),
      ),
      ApiError::Validation(errors) => (
        StatusCode::BAD_REQUEST,
        json!({ "error": "Validation failed", "details": errors }),
      ),
      ApiError::Ineligible(messages) => (
        StatusCode::BAD_REQUEST,
        json!({
          "error": "Age validation failed",
          "details": { "age_validation": messages },
        }),
      ),
      ApiError::Conflict => (
        StatusCode::CONFLICT,
        json!({
          "error": "User already exists",
          "message": "A user with the same name and date of birth already exists",
        }),
      ),
      ApiError::NotFound => (
        StatusCode::NOT_FOUND,
        json!({ "error": "Not found", "message": "No user matches the given id" }),
      ),
      ApiError::InvalidPage => (
        StatusCode::NOT_FOUND,
        json!({ "error": "Invalid page", "message": "The requested page does not exist" }),
      ),
      ApiError::MissingFields(required) => (
        StatusCode::BAD_REQUEST,
        json!({ "error": "Missing required fields", "required": required }),
      ),
      ApiError::InvalidDate => (
        StatusCode::BAD_REQUEST,
        json!({ "error": "Invalid date", "message": "Please provide a valid date" }),
      ),
      ApiError::Internal { message, source } => {
        tracing::error!(error = %source, "{message}");
        (
          StatusCode::INTERNAL_SERVER_ERROR,
          json!({ "error": "Internal server error", "message": message }),
        )
      }
    };
    (status, Json(body)).into_response()
  }
}
