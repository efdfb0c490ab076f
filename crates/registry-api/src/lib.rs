//! JSON REST API for the person registry.
//!
//! Exposes an axum [`Router`] backed by a [`Registry`] over any
//! [`PersonStore`]. Auth, TLS, and transport concerns are the caller's
//! responsibility.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/api/health/` | Always 200 |
//! | `POST` | `/api/validate-age/` | Stand-alone age policy check |
//! | `POST` | `/api/register/`, `/api/users/` | Register a person |
//! | `GET`  | `/api/users/` | Filtered, paginated list |
//! | `GET`  | `/api/users/stats/` | Overview and age histogram |
//! | `GET` `PUT` `PATCH` `DELETE` | `/api/users/{id}/` | Single record |

pub mod age;
pub mod error;
pub mod health;
pub mod stats;
pub mod users;
pub mod view;

use axum::{
  Router,
  routing::{get, post},
};
use registry_core::{service::Registry, store::PersonStore};

pub use error::ApiError;

/// The API routes without their `/api` prefix.
///
/// The returned `Router<()>` can be nested into any parent router regardless
/// of its own state type.
pub fn api_router<S>(registry: Registry<S>) -> Router<()>
where
  S: PersonStore + 'static,
{
  Router::new()
    .route("/health/", get(health::handler))
    .route("/validate-age/", post(age::handler::<S>))
    .route("/register/", post(users::create::<S>))
    .route("/users/", get(users::list::<S>).post(users::create::<S>))
    .route("/users/stats/", get(stats::handler::<S>))
    .route(
      "/users/{id}/",
      get(users::get_one::<S>)
        .put(users::replace::<S>)
        .patch(users::patch::<S>)
        .delete(users::delete_one::<S>),
    )
    .with_state(registry)
}

/// The full application: [`api_router`] mounted under `/api`.
pub fn router<S>(registry: Registry<S>) -> Router<()>
where
  S: PersonStore + 'static,
{
  Router::new().nest("/api", api_router(registry))
}
