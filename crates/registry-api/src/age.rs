//! Handler for `POST /validate-age/`.
//!
//! Applies the eligibility policy to a bare birth date and gender without
//! touching the store.

use axum::{
  Json,
  extract::{State, rejection::JsonRejection},
};
use chrono::NaiveDate;
use registry_core::{
  eligibility::{self, AGE_REQUIREMENTS, AgeRequirements},
  person::{Gender, lenient_string},
  service::Registry,
  store::PersonStore,
};
use serde::{Deserialize, Serialize};

use crate::error::ApiError;

const REQUIRED: &[&str] = &["year", "month", "day", "gender"];

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct AgeCheckBody {
  #[serde(deserialize_with = "lenient_string")]
  pub year:   Option<String>,
  #[serde(deserialize_with = "lenient_string")]
  pub month:  Option<String>,
  #[serde(deserialize_with = "lenient_string")]
  pub day:    Option<String>,
  #[serde(deserialize_with = "lenient_string")]
  pub gender: Option<String>,
}

/// `age` is negative for a birth date in the future.
#[derive(Debug, Serialize)]
pub struct AgeCheck {
  pub age:              i32,
  pub is_valid:         bool,
  pub errors:           Vec<String>,
  pub age_requirements: AgeRequirements,
}

/// `POST /validate-age/` — body: `{"year","month","day","gender"}`.
pub async fn handler<S>(
  State(registry): State<Registry<S>>,
  body: Result<Json<AgeCheckBody>, JsonRejection>,
) -> Result<Json<AgeCheck>, ApiError>
where
  S: PersonStore + 'static,
{
  let Json(body) = body?;
  let (Some(year), Some(month), Some(day), Some(gender)) = (
    present(body.year),
    present(body.month),
    present(body.day),
    present(body.gender),
  ) else {
    return Err(ApiError::MissingFields(REQUIRED));
  };

  // An unrecognised gender is only held to the maximum age.
  let gender = gender.parse::<Gender>().ok();
  let birth = parse_date(&year, &month, &day).ok_or(ApiError::InvalidDate)?;

  let outcome = eligibility::check(birth, gender, registry.today());
  Ok(Json(AgeCheck {
    age:              outcome.age,
    is_valid:         outcome.is_eligible(),
    errors:           outcome.violations,
    age_requirements: AGE_REQUIREMENTS,
  }))
}

/// Blank values count as missing.
fn present(value: Option<String>) -> Option<String> {
  value.filter(|v| !v.trim().is_empty())
}

fn parse_date(year: &str, month: &str, day: &str) -> Option<NaiveDate> {
  NaiveDate::from_ymd_opt(
    year.trim().parse().ok()?,
    month.trim().parse().ok()?,
    day.trim().parse().ok()?,
  )
}
