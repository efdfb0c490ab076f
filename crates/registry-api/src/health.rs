//! Handler for `GET /health/`.

use axum::Json;
use chrono::Local;
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct Health {
  pub status:    &'static str,
  /// Local time, ISO 8601 without offset.
  pub timestamp: String,
  pub version:   &'static str,
}

/// `GET /health/` — always 200.
pub async fn handler() -> Json<Health> {
  Json(Health {
    status:    "OK",
    timestamp: Local::now()
      .naive_local()
      .format("%Y-%m-%dT%H:%M:%S%.6f")
      .to_string(),
    version:   env!("CARGO_PKG_VERSION"),
  })
}
