//! Response shapes for person records.

use chrono::{DateTime, Utc};
use registry_core::person::{Gender, PersonRecord, Status};
use serde::Serialize;
use uuid::Uuid;

#[derive(Debug, Serialize)]
pub struct DateOfBirth {
  pub year:  String,
  pub month: String,
  pub day:   String,
}

/// Missing components render as empty strings.
#[derive(Debug, Serialize)]
pub struct TimeOfBirth {
  pub hour:   String,
  pub minute: String,
}

/// A person record as returned to clients.
#[derive(Debug, Serialize)]
pub struct UserView {
  pub id:                Uuid,
  pub full_name:         String,
  pub date_of_birth:     DateOfBirth,
  pub time_of_birth:     TimeOfBirth,
  pub birth_place:       Option<String>,
  pub gender:            Gender,
  pub height:            Option<String>,
  pub weight:            Option<String>,
  pub astrological_sign: Option<String>,
  pub age:               u32,
  pub status:            Status,
  pub created_at:        DateTime<Utc>,
  pub updated_at:        DateTime<Utc>,
}

impl From<PersonRecord> for UserView {
  fn from(p: PersonRecord) -> Self {
    Self {
      id:                p.id,
      full_name:         p.full_name,
      date_of_birth:     DateOfBirth {
        year:  p.birth_year,
        month: p.birth_month,
        day:   p.birth_day,
      },
      time_of_birth:     TimeOfBirth {
        hour:   p.birth_hour.unwrap_or_default(),
        minute: p.birth_minute.unwrap_or_default(),
      },
      birth_place:       p.birth_place,
      gender:            p.gender,
      height:            p.height,
      weight:            p.weight,
      astrological_sign: p.astrological_sign,
      age:               p.age,
      status:            p.status,
      created_at:        p.created_at,
      updated_at:        p.updated_at,
    }
  }
}

/// Body of a successful create or update.
#[derive(Debug, Serialize)]
pub struct UserEnvelope {
  pub message: &'static str,
  pub user:    UserView,
}
