//! Person records — the single entity held by the registry.
//!
//! Birth-date components are kept as the normalised two- and four-digit
//! strings the client submitted; `age` is always derived at write time.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, de::Error as _};
use uuid::Uuid;

// ─── Enumerations ────────────────────────────────────────────────────────────

#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Hash,
  Serialize,
  Deserialize,
  strum::Display,
  strum::EnumString,
  strum::AsRefStr,
)]
pub enum Gender {
  Male,
  Female,
}

/// Administrative status of a registration. Not settable through the public
/// API; every registration starts out [`Status::Active`].
#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Default,
  Serialize,
  Deserialize,
  strum::Display,
  strum::EnumString,
  strum::AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Status {
  #[default]
  Active,
  Inactive,
  Pending,
}

// ─── Stored record ───────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersonRecord {
  /// Assigned by the store on creation; never changes.
  pub id:                Uuid,
  pub full_name:         String,
  pub birth_year:        String,
  pub birth_month:       String,
  pub birth_day:         String,
  pub birth_hour:        Option<String>,
  pub birth_minute:      Option<String>,
  pub birth_place:       Option<String>,
  pub gender:            Gender,
  pub height:            Option<String>,
  pub weight:            Option<String>,
  pub astrological_sign: Option<String>,
  /// Whole years between the birth date and the day of the last write.
  pub age:               u32,
  pub status:            Status,
  pub created_at:        DateTime<Utc>,
  pub updated_at:        DateTime<Utc>,
}

impl PersonRecord {
  pub fn natural_key(&self) -> NaturalKey {
    NaturalKey {
      full_name:   self.full_name.clone(),
      birth_year:  self.birth_year.clone(),
      birth_month: self.birth_month.clone(),
      birth_day:   self.birth_day.clone(),
    }
  }
}

/// Input to [`crate::store::PersonStore::insert`] and
/// [`crate::store::PersonStore::update`].
///
/// `id`, `created_at` and `updated_at` are always set by the store.
#[derive(Debug, Clone, PartialEq)]
pub struct NewPerson {
  pub full_name:         String,
  pub birth_year:        String,
  pub birth_month:       String,
  pub birth_day:         String,
  pub birth_hour:        Option<String>,
  pub birth_minute:      Option<String>,
  pub birth_place:       Option<String>,
  pub gender:            Gender,
  pub height:            Option<String>,
  pub weight:            Option<String>,
  pub astrological_sign: Option<String>,
  pub age:               u32,
  pub status:            Status,
}

/// The `(full_name, birth_year, birth_month, birth_day)` tuple used for
/// duplicate detection. Not enforced by the store.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct NaturalKey {
  pub full_name:   String,
  pub birth_year:  String,
  pub birth_month: String,
  pub birth_day:   String,
}

// ─── Client input ────────────────────────────────────────────────────────────

/// Raw registration fields as submitted by a client.
///
/// Every field may be omitted so that missing values are reported alongside
/// every other field error instead of failing deserialisation. Numbers are
/// accepted wherever a string is expected; an explicit `null` is rejected.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct RegistrationForm {
  #[serde(deserialize_with = "non_null_string")]
  pub full_name:         Option<String>,
  #[serde(deserialize_with = "non_null_string")]
  pub birth_year:        Option<String>,
  #[serde(deserialize_with = "non_null_string")]
  pub birth_month:       Option<String>,
  #[serde(deserialize_with = "non_null_string")]
  pub birth_day:         Option<String>,
  #[serde(deserialize_with = "non_null_string")]
  pub birth_hour:        Option<String>,
  #[serde(deserialize_with = "non_null_string")]
  pub birth_minute:      Option<String>,
  #[serde(deserialize_with = "non_null_string")]
  pub birth_place:       Option<String>,
  #[serde(deserialize_with = "non_null_string")]
  pub gender:            Option<String>,
  #[serde(deserialize_with = "non_null_string")]
  pub height:            Option<String>,
  #[serde(deserialize_with = "non_null_string")]
  pub weight:            Option<String>,
  #[serde(deserialize_with = "non_null_string")]
  pub astrological_sign: Option<String>,
}

impl RegistrationForm {
  /// Fill every field the client left out with the stored value, producing
  /// the full field set for a partial update.
  pub fn merged_over(self, existing: &PersonRecord) -> Self {
    fn keep(new: Option<String>, old: &str) -> Option<String> {
      new.or_else(|| Some(old.to_owned()))
    }
    fn keep_opt(new: Option<String>, old: &Option<String>) -> Option<String> {
      new.or_else(|| old.clone())
    }

    Self {
      full_name:         keep(self.full_name, &existing.full_name),
      birth_year:        keep(self.birth_year, &existing.birth_year),
      birth_month:       keep(self.birth_month, &existing.birth_month),
      birth_day:         keep(self.birth_day, &existing.birth_day),
      birth_hour:        keep_opt(self.birth_hour, &existing.birth_hour),
      birth_minute:      keep_opt(self.birth_minute, &existing.birth_minute),
      birth_place:       keep_opt(self.birth_place, &existing.birth_place),
      gender:            keep(self.gender, existing.gender.as_ref()),
      height:            keep_opt(self.height, &existing.height),
      weight:            keep_opt(self.weight, &existing.weight),
      astrological_sign: keep_opt(
        self.astrological_sign,
        &existing.astrological_sign,
      ),
    }
  }
}

/// Accept a JSON string, integer or null for a string field.
pub fn lenient_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
  D: Deserializer<'de>,
{
  #[derive(Deserialize)]
  #[serde(untagged)]
  enum Raw {
    Text(String),
    Int(i64),
  }

  Ok(Option::<Raw>::deserialize(deserializer)?.map(|raw| match raw {
    Raw::Text(s) => s,
    Raw::Int(n) => n.to_string(),
  }))
}

/// Like [`lenient_string`], but an explicit `null` is an error rather than
/// being read as absent.
pub fn non_null_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
  D: Deserializer<'de>,
{
  match lenient_string(deserializer)? {
    Some(s) => Ok(Some(s)),
    None => Err(D::Error::custom("This field may not be null.")),
  }
}
