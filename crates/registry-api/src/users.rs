//! Handlers for `/users` endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`    | `/users/` | `?gender`, `?min_age`, `?max_age`, `?search`, `?limit`, `?page` |
//! | `POST`   | `/users/`, `/register/` | Body: [`RegistrationForm`]; 201 on success |
//! | `GET`    | `/users/{id}/` | 404 if not found |
//! | `PUT`    | `/users/{id}/` | Full replacement |
//! | `PATCH`  | `/users/{id}/` | Only the supplied fields change |
//! | `DELETE` | `/users/{id}/` | 204 on success |

use axum::{
  Json,
  extract::{Path, Query, State, rejection::JsonRejection},
  http::StatusCode,
  response::IntoResponse,
};
use registry_core::{
  person::{Gender, RegistrationForm},
  service::{Listing, Registry},
  store::{PageRequest, PersonFilter, PersonStore},
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
  error::ApiError,
  view::{UserEnvelope, UserView},
};

/// Unknown or malformed ids are simply not found.
fn parse_id(raw: &str) -> Result<Uuid, ApiError> {
  Uuid::parse_str(raw).map_err(|_| ApiError::NotFound)
}

// ─── List ─────────────────────────────────────────────────────────────────────

/// Query parameters for `GET /users/`. Values that do not parse are ignored,
/// except `page`, which must be a positive integer.
#[derive(Debug, Default, Deserialize)]
pub struct ListParams {
  pub gender:  Option<String>,
  pub min_age: Option<String>,
  pub max_age: Option<String>,
  pub search:  Option<String>,
  pub limit:   Option<String>,
  pub page:    Option<String>,
}

impl ListParams {
  pub fn filter(&self) -> PersonFilter {
    PersonFilter {
      gender:  self.gender.as_deref().and_then(|g| g.parse::<Gender>().ok()),
      min_age: self.min_age.as_deref().and_then(|v| v.trim().parse().ok()),
      max_age: self.max_age.as_deref().and_then(|v| v.trim().parse().ok()),
      search:  self.search.clone().filter(|s| !s.is_empty()),
    }
  }

  pub fn page(&self) -> Result<PageRequest, ApiError> {
    let page = match self.page.as_deref() {
      None => 1,
      Some(raw) => raw
        .trim()
        .parse::<u32>()
        .ok()
        .filter(|p| *p > 0)
        .ok_or(ApiError::InvalidPage)?,
    };
    let size = self.limit.as_deref().and_then(|v| v.trim().parse().ok());
    Ok(PageRequest::new(page, size))
  }
}

#[derive(Debug, Serialize)]
pub struct UserPage {
  pub count:       u64,
  pub page:        u32,
  pub total_pages: u32,
  pub next:        Option<u32>,
  pub previous:    Option<u32>,
  pub results:     Vec<UserView>,
}

impl From<Listing> for UserPage {
  fn from(listing: Listing) -> Self {
    Self {
      count:       listing.count,
      page:        listing.page,
      total_pages: listing.total_pages,
      next:        listing.next(),
      previous:    listing.previous(),
      results:     listing.results.into_iter().map(UserView::from).collect(),
    }
  }
}

/// `GET /users/[?gender=..][&min_age=..][&max_age=..][&search=..][&limit=..][&page=..]`
pub async fn list<S>(
  State(registry): State<Registry<S>>,
  Query(params): Query<ListParams>,
) -> Result<Json<UserPage>, ApiError>
where
  S: PersonStore + 'static,
{
  let filter = params.filter();
  let page = params.page()?;
  let listing = registry
    .list(&filter, page)
    .await
    .map_err(|e| ApiError::from_core(e, "Failed to fetch users"))?;
  Ok(Json(UserPage::from(listing)))
}

// ─── Create ───────────────────────────────────────────────────────────────────

/// `POST /users/` and `POST /register/` — returns 201 + the stored record.
pub async fn create<S>(
  State(registry): State<Registry<S>>,
  body: Result<Json<RegistrationForm>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError>
where
  S: PersonStore + 'static,
{
  let Json(form) = body?;
  let record = registry
    .register(form)
    .await
    .map_err(|e| ApiError::from_core(e, "Registration failed. Please try again."))?;

  Ok((
    StatusCode::CREATED,
    Json(UserEnvelope {
      message: "User registered successfully",
      user:    UserView::from(record),
    }),
  ))
}

// ─── Get one ──────────────────────────────────────────────────────────────────

/// `GET /users/{id}/`
pub async fn get_one<S>(
  State(registry): State<Registry<S>>,
  Path(id): Path<String>,
) -> Result<Json<UserView>, ApiError>
where
  S: PersonStore + 'static,
{
  let id = parse_id(&id)?;
  let record = registry
    .get(id)
    .await
    .map_err(|e| ApiError::from_core(e, "Failed to fetch user"))?;
  Ok(Json(UserView::from(record)))
}

// ─── Update ───────────────────────────────────────────────────────────────────

async fn update<S>(
  registry: &Registry<S>,
  id: &str,
  body: Result<Json<RegistrationForm>, JsonRejection>,
  partial: bool,
) -> Result<Json<UserEnvelope>, ApiError>
where
  S: PersonStore + 'static,
{
  let id = parse_id(id)?;
  let Json(form) = body?;
  let record = registry
    .update(id, form, partial)
    .await
    .map_err(|e| ApiError::from_core(e, "Update failed. Please try again."))?;

  Ok(Json(UserEnvelope {
    message: "User updated successfully",
    user:    UserView::from(record),
  }))
}

/// `PUT /users/{id}/` — the body is the complete new field set.
pub async fn replace<S>(
  State(registry): State<Registry<S>>,
  Path(id): Path<String>,
  body: Result<Json<RegistrationForm>, JsonRejection>,
) -> Result<Json<UserEnvelope>, ApiError>
where
  S: PersonStore + 'static,
{
  update(&registry, &id, body, false).await
}

/// `PATCH /users/{id}/` — fields absent from the body keep their values.
pub async fn patch<S>(
  State(registry): State<Registry<S>>,
  Path(id): Path<String>,
  body: Result<Json<RegistrationForm>, JsonRejection>,
) -> Result<Json<UserEnvelope>, ApiError>
where
  S: PersonStore + 'static,
{
  update(&registry, &id, body, true).await
}

// ─── Delete ───────────────────────────────────────────────────────────────────

/// `DELETE /users/{id}/` — 204 on success.
pub async fn delete_one<S>(
  State(registry): State<Registry<S>>,
  Path(id): Path<String>,
) -> Result<StatusCode, ApiError>
where
  S: PersonStore + 'static,
{
  let id = parse_id(&id)?;
  registry
    .delete(id)
    .await
    .map_err(|e| ApiError::from_core(e, "Delete failed. Please try again."))?;
  Ok(StatusCode::NO_CONTENT)
}
