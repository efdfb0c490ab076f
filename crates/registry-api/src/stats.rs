//! Handler for `GET /users/stats/`.

use axum::{Json, extract::State};
use registry_core::{service::Registry, stats::Statistics, store::PersonStore};

use crate::error::ApiError;

/// `GET /users/stats/` — overview counts and the age histogram.
pub async fn handler<S>(
  State(registry): State<Registry<S>>,
) -> Result<Json<Statistics>, ApiError>
where
  S: PersonStore + 'static,
{
  let stats = registry
    .statistics()
    .await
    .map_err(|e| ApiError::from_core(e, "Failed to fetch statistics"))?;
  Ok(Json(stats))
}
