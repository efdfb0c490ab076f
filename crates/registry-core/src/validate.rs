//! Field and cross-field validation of registration input.
//!
//! Every rule is evaluated; failures accumulate into a [`ValidationErrors`]
//! map instead of stopping at the first problem. Nothing is normalised
//! unless every rule passes.

use std::{collections::BTreeMap, fmt};

use chrono::{Datelike, NaiveDate};
use serde::{Serialize, Serializer};

use crate::person::{Gender, NaturalKey, NewPerson, RegistrationForm, Status};

/// Earliest accepted birth year.
pub const MIN_BIRTH_YEAR: i32 = 1940;

pub const FULL_NAME_MAX_LEN: usize = 100;
pub const BIRTH_PLACE_MAX_LEN: usize = 200;
pub const HEIGHT_MAX_LEN: usize = 50;
pub const WEIGHT_MAX_LEN: usize = 20;
pub const ASTROLOGICAL_SIGN_MAX_LEN: usize = 50;
pub const BIRTH_YEAR_MAX_LEN: usize = 4;
/// Month, day, hour and minute.
pub const TWO_DIGIT_MAX_LEN: usize = 2;

const MONTHS: [&str; 12] = [
  "01", "02", "03", "04", "05", "06", "07", "08", "09", "10", "11", "12",
];

// ─── Errors ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldErrorKind {
  Required,
  InvalidFormat,
  InvalidChoice,
  OutOfRange,
  TooLong,
  InvalidDate,
  FutureDate,
}

/// A single failed rule. Serialises as its message alone.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
  pub kind:    FieldErrorKind,
  pub message: String,
}

impl FieldError {
  fn new(kind: FieldErrorKind, message: impl Into<String>) -> Self {
    Self { kind, message: message.into() }
  }
}

impl Serialize for FieldError {
  fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&self.message)
  }
}

/// Field name → every rule that field failed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ValidationErrors(BTreeMap<&'static str, Vec<FieldError>>);

impl ValidationErrors {
  pub fn is_empty(&self) -> bool { self.0.is_empty() }

  pub fn get(&self, field: &str) -> Option<&[FieldError]> {
    self.0.get(field).map(Vec::as_slice)
  }

  pub fn fields(&self) -> impl Iterator<Item = &'static str> + '_ {
    self.0.keys().copied()
  }

  fn push(&mut self, field: &'static str, error: FieldError) {
    self.0.entry(field).or_default().push(error);
  }
}

impl fmt::Display for ValidationErrors {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let mut first = true;
    for (field, errors) in &self.0 {
      for error in errors {
        if !first {
          f.write_str("; ")?;
        }
        write!(f, "{field}: {}", error.message)?;
        first = false;
      }
    }
    Ok(())
  }
}

// ─── Output ──────────────────────────────────────────────────────────────────

/// A registration whose every field passed validation.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidRegistration {
  pub full_name:         String,
  pub birth_year:        String,
  pub birth_month:       String,
  pub birth_day:         String,
  pub birth_date:        NaiveDate,
  pub birth_hour:        Option<String>,
  pub birth_minute:      Option<String>,
  pub birth_place:       Option<String>,
  pub gender:            Gender,
  pub height:            Option<String>,
  pub weight:            Option<String>,
  pub astrological_sign: Option<String>,
}

impl ValidRegistration {
  pub fn natural_key(&self) -> NaturalKey {
    NaturalKey {
      full_name:   self.full_name.clone(),
      birth_year:  self.birth_year.clone(),
      birth_month: self.birth_month.clone(),
      birth_day:   self.birth_day.clone(),
    }
  }

  pub fn into_new_person(self, age: u32, status: Status) -> NewPerson {
    NewPerson {
      full_name: self.full_name,
      birth_year: self.birth_year,
      birth_month: self.birth_month,
      birth_day: self.birth_day,
      birth_hour: self.birth_hour,
      birth_minute: self.birth_minute,
      birth_place: self.birth_place,
      gender: self.gender,
      height: self.height,
      weight: self.weight,
      astrological_sign: self.astrological_sign,
      age,
      status,
    }
  }
}

// ─── Entry point ─────────────────────────────────────────────────────────────

/// Validate `form` against the rules in force on `today`.
pub fn validate(
  form: &RegistrationForm,
  today: NaiveDate,
) -> Result<ValidRegistration, ValidationErrors> {
  let mut errors = ValidationErrors::default();

  let full_name = collect(&mut errors, "full_name", full_name(form.full_name.as_deref()));
  let year = collect(
    &mut errors,
    "birth_year",
    birth_year(form.birth_year.as_deref(), today.year()),
  );
  let month = collect(&mut errors, "birth_month", birth_month(form.birth_month.as_deref()));
  let day = collect(&mut errors, "birth_day", birth_day(form.birth_day.as_deref()));
  let hour = collect(
    &mut errors,
    "birth_hour",
    clock_field(form.birth_hour.as_deref(), 23, "Birth hour"),
  );
  let minute = collect(
    &mut errors,
    "birth_minute",
    clock_field(form.birth_minute.as_deref(), 59, "Birth minute"),
  );
  let gender = collect(&mut errors, "gender", gender(form.gender.as_deref()));
  let birth_place = collect(
    &mut errors,
    "birth_place",
    optional_text(form.birth_place.as_deref(), BIRTH_PLACE_MAX_LEN),
  );
  let height = collect(
    &mut errors,
    "height",
    optional_text(form.height.as_deref(), HEIGHT_MAX_LEN),
  );
  let weight = collect(
    &mut errors,
    "weight",
    optional_text(form.weight.as_deref(), WEIGHT_MAX_LEN),
  );
  let astrological_sign = collect(
    &mut errors,
    "astrological_sign",
    optional_text(form.astrological_sign.as_deref(), ASTROLOGICAL_SIGN_MAX_LEN),
  );

  // The composed date can only be checked once each component is sound.
  let birth_date = match (year, month, day) {
    (Some(y), Some(m), Some(d)) => {
      collect(&mut errors, "birth_date", birth_date(y, m, d, today))
    }
    _ => None,
  };

  match (
    full_name,
    birth_date,
    hour,
    minute,
    gender,
    birth_place,
    height,
    weight,
    astrological_sign,
  ) {
    (
      Some(full_name),
      Some(birth_date),
      Some(birth_hour),
      Some(birth_minute),
      Some(gender),
      Some(birth_place),
      Some(height),
      Some(weight),
      Some(astrological_sign),
    ) if errors.is_empty() => Ok(ValidRegistration {
      full_name,
      birth_year: format!("{:04}", birth_date.year()),
      birth_month: format!("{:02}", birth_date.month()),
      birth_day: format!("{:02}", birth_date.day()),
      birth_date,
      birth_hour,
      birth_minute,
      birth_place,
      gender,
      height,
      weight,
      astrological_sign,
    }),
    _ => Err(errors),
  }
}

fn collect<T>(
  errors: &mut ValidationErrors,
  field: &'static str,
  result: Result<T, FieldError>,
) -> Option<T> {
  match result {
    Ok(value) => Some(value),
    Err(error) => {
      errors.push(field, error);
      None
    }
  }
}

// ─── Rules ───────────────────────────────────────────────────────────────────

fn required(value: Option<&str>) -> Result<&str, FieldError> {
  value.ok_or_else(|| {
    FieldError::new(FieldErrorKind::Required, "This field is required.")
  })
}

fn too_long(max: usize) -> FieldError {
  FieldError::new(
    FieldErrorKind::TooLong,
    format!("Ensure this field has no more than {max} characters."),
  )
}

/// Trimmed `value`, rejected if longer than `max` characters.
fn bounded(value: &str, max: usize) -> Result<&str, FieldError> {
  let value = value.trim();
  if value.chars().count() > max {
    return Err(too_long(max));
  }
  Ok(value)
}

fn full_name(value: Option<&str>) -> Result<String, FieldError> {
  let name = required(value)?.trim();
  if name.is_empty() {
    return Err(FieldError::new(
      FieldErrorKind::InvalidFormat,
      "Full name cannot be empty",
    ));
  }
  if !name
    .chars()
    .all(|c| c.is_ascii_alphabetic() || c.is_whitespace())
  {
    return Err(FieldError::new(
      FieldErrorKind::InvalidFormat,
      "Full name can only contain letters and spaces",
    ));
  }
  let len = name.chars().count();
  if len < 2 {
    return Err(FieldError::new(
      FieldErrorKind::InvalidFormat,
      "Full name must be at least 2 characters long",
    ));
  }
  if len > FULL_NAME_MAX_LEN {
    return Err(too_long(FULL_NAME_MAX_LEN));
  }
  Ok(name.to_owned())
}

fn birth_year(value: Option<&str>, current_year: i32) -> Result<i32, FieldError> {
  let year: i32 = bounded(required(value)?, BIRTH_YEAR_MAX_LEN)?
    .parse()
    .map_err(|_| {
      FieldError::new(FieldErrorKind::InvalidFormat, "Birth year must be a valid number")
    })?;
  if !(MIN_BIRTH_YEAR..=current_year).contains(&year) {
    return Err(FieldError::new(
      FieldErrorKind::OutOfRange,
      format!("Birth year must be between {MIN_BIRTH_YEAR} and {current_year}"),
    ));
  }
  Ok(year)
}

fn birth_month(value: Option<&str>) -> Result<u32, FieldError> {
  let month = bounded(required(value)?, TWO_DIGIT_MAX_LEN)?;
  MONTHS
    .iter()
    .position(|m| *m == month)
    .map(|i| i as u32 + 1)
    .ok_or_else(|| {
      FieldError::new(
        FieldErrorKind::InvalidFormat,
        "Birth month must be between 01 and 12",
      )
    })
}

fn birth_day(value: Option<&str>) -> Result<u32, FieldError> {
  let day: i64 = bounded(required(value)?, TWO_DIGIT_MAX_LEN)?
    .parse()
    .map_err(|_| {
      FieldError::new(FieldErrorKind::InvalidFormat, "Birth day must be a valid number")
    })?;
  if !(1..=31).contains(&day) {
    return Err(FieldError::new(
      FieldErrorKind::OutOfRange,
      "Birth day must be between 1 and 31",
    ));
  }
  Ok(day as u32)
}

/// Optional hour or minute; blank means absent. Zero-padded on success.
fn clock_field(
  value: Option<&str>,
  max: i64,
  label: &str,
) -> Result<Option<String>, FieldError> {
  let Some(raw) = value.map(str::trim).filter(|v| !v.is_empty()) else {
    return Ok(None);
  };
  let n: i64 = bounded(raw, TWO_DIGIT_MAX_LEN)?.parse().map_err(|_| {
    FieldError::new(
      FieldErrorKind::InvalidFormat,
      format!("{label} must be a valid number"),
    )
  })?;
  if !(0..=max).contains(&n) {
    return Err(FieldError::new(
      FieldErrorKind::OutOfRange,
      format!("{label} must be between 0 and {max}"),
    ));
  }
  Ok(Some(format!("{n:02}")))
}

fn gender(value: Option<&str>) -> Result<Gender, FieldError> {
  let raw = required(value)?;
  raw.parse().map_err(|_| {
    FieldError::new(
      FieldErrorKind::InvalidChoice,
      format!("\"{raw}\" is not a valid choice."),
    )
  })
}

/// Optional free text; blank means absent.
fn optional_text(
  value: Option<&str>,
  max: usize,
) -> Result<Option<String>, FieldError> {
  let Some(text) = value.map(str::trim).filter(|v| !v.is_empty()) else {
    return Ok(None);
  };
  if text.chars().count() > max {
    return Err(too_long(max));
  }
  Ok(Some(text.to_owned()))
}

fn birth_date(
  year: i32,
  month: u32,
  day: u32,
  today: NaiveDate,
) -> Result<NaiveDate, FieldError> {
  let date = NaiveDate::from_ymd_opt(year, month, day).ok_or_else(|| {
    FieldError::new(FieldErrorKind::InvalidDate, "Invalid date of birth")
  })?;
  if date > today {
    return Err(FieldError::new(
      FieldErrorKind::FutureDate,
      "Birth date cannot be in the future",
    ));
  }
  Ok(date)
}
