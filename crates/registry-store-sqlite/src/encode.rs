//! Encoding and decoding helpers between Rust domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! Timestamps are stored as fixed-width RFC 3339 strings (microsecond
//! precision, `Z` suffix) so that lexical order matches chronological order.
//! UUIDs are stored as hyphenated lowercase strings.

use chrono::{DateTime, SecondsFormat, Utc};
use registry_core::person::{Gender, PersonRecord, Status};
use uuid::Uuid;

use crate::{Error, Result};

/// Every column of `registration_users`, in [`RawPerson`] field order.
pub const PERSON_COLUMNS: &str = "id, full_name, birth_year, birth_month, \
  birth_day, birth_hour, birth_minute, birth_place, gender, height, weight, \
  astrological_sign, age, status, created_at, updated_at";

// ─── Uuid ─────────────────────────────────────────────────────────────────────

pub fn encode_uuid(id: Uuid) -> String { id.hyphenated().to_string() }

pub fn decode_uuid(s: &str) -> Result<Uuid> { Ok(Uuid::parse_str(s)?) }

// ─── DateTime<Utc> ───────────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String {
  dt.to_rfc3339_opts(SecondsFormat::Micros, true)
}

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

// ─── Enums ───────────────────────────────────────────────────────────────────

pub fn decode_gender(s: &str) -> Result<Gender> {
  s.parse().map_err(|_| Error::UnknownValue {
    column: "gender",
    value:  s.to_owned(),
  })
}

pub fn decode_status(s: &str) -> Result<Status> {
  s.parse().map_err(|_| Error::UnknownValue {
    column: "status",
    value:  s.to_owned(),
  })
}

// ─── LIKE patterns ───────────────────────────────────────────────────────────

/// `%term%` with the LIKE wildcards in `term` escaped by `\`.
pub fn contains_pattern(term: &str) -> String {
  let mut out = String::with_capacity(term.len() + 2);
  out.push('%');
  for c in term.chars() {
    if matches!(c, '%' | '_' | '\\') {
      out.push('\\');
    }
    out.push(c);
  }
  out.push('%');
  out
}

// ─── Row types ───────────────────────────────────────────────────────────────

/// Raw values read directly from a `registration_users` row.
pub struct RawPerson {
  pub id:                String,
  pub full_name:         String,
  pub birth_year:        String,
  pub birth_month:       String,
  pub birth_day:         String,
  pub birth_hour:        Option<String>,
  pub birth_minute:      Option<String>,
  pub birth_place:       Option<String>,
  pub gender:            String,
  pub height:            Option<String>,
  pub weight:            Option<String>,
  pub astrological_sign: Option<String>,
  pub age:               u32,
  pub status:            String,
  pub created_at:        String,
  pub updated_at:        String,
}

impl RawPerson {
  /// Read a row selected with [`PERSON_COLUMNS`].
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      id:                row.get(0)?,
      full_name:         row.get(1)?,
      birth_year:        row.get(2)?,
      birth_month:       row.get(3)?,
      birth_day:         row.get(4)?,
      birth_hour:        row.get(5)?,
      birth_minute:      row.get(6)?,
      birth_place:       row.get(7)?,
      gender:            row.get(8)?,
      height:            row.get(9)?,
      weight:            row.get(10)?,
      astrological_sign: row.get(11)?,
      age:               row.get(12)?,
      status:            row.get(13)?,
      created_at:        row.get(14)?,
      updated_at:        row.get(15)?,
    })
  }

  pub fn into_record(self) -> Result<PersonRecord> {
    Ok(PersonRecord {
      id:                decode_uuid(&self.id)?,
      full_name:         self.full_name,
      birth_year:        self.birth_year,
      birth_month:       self.birth_month,
      birth_day:         self.birth_day,
      birth_hour:        self.birth_hour,
      birth_minute:      self.birth_minute,
      birth_place:       self.birth_place,
      gender:            decode_gender(&self.gender)?,
      height:            self.height,
      weight:            self.weight,
      astrological_sign: self.astrological_sign,
      age:               self.age,
      status:            decode_status(&self.status)?,
      created_at:        decode_dt(&self.created_at)?,
      updated_at:        decode_dt(&self.updated_at)?,
    })
  }
}
