//! Age derivation and the gender-conditioned age policy.

use chrono::{Datelike, NaiveDate};
use serde::Serialize;

use crate::person::Gender;

pub const MALE_MIN_AGE: i32 = 21;
pub const FEMALE_MIN_AGE: i32 = 18;
pub const MAX_AGE: i32 = 40;

pub const MALE_TOO_YOUNG: &str = "Men must be at least 21 years old";
pub const FEMALE_TOO_YOUNG: &str = "Women must be at least 18 years old";
pub const TOO_OLD: &str = "Maximum age for both genders is 40 years";

/// Human-readable summary of the policy, echoed by the age-check endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct AgeRequirements {
  pub male:    &'static str,
  pub female:  &'static str,
  pub maximum: &'static str,
}

pub const AGE_REQUIREMENTS: AgeRequirements = AgeRequirements {
  male:    "Minimum 21 years",
  female:  "Minimum 18 years",
  maximum: "Maximum 40 years for both",
};

/// Whole years elapsed between `birth` and `today`; negative when `birth` is
/// in the future.
///
/// One is subtracted from the naive year difference when today's month/day
/// precedes the birth month/day. A 29 February birthday therefore falls on
/// 1 March in common years.
pub fn years_between(birth: NaiveDate, today: NaiveDate) -> i32 {
  let mut years = today.year() - birth.year();
  if (today.month(), today.day()) < (birth.month(), birth.day()) {
    years -= 1;
  }
  years
}

/// [`years_between`] clamped at zero.
pub fn age_on(birth: NaiveDate, today: NaiveDate) -> u32 {
  u32::try_from(years_between(birth, today)).unwrap_or(0)
}

/// The outcome of applying the age policy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Eligibility {
  pub age:        i32,
  /// Policy messages in evaluation order; empty when eligible.
  pub violations: Vec<String>,
}

impl Eligibility {
  pub fn is_eligible(&self) -> bool { self.violations.is_empty() }
}

/// Violated rules for a person of `age` and `gender`.
///
/// The minimum depends on gender and is skipped when the gender is not
/// known. The maximum applies to everyone and is checked independently, so
/// both kinds of message may appear together.
pub fn violations(age: i32, gender: Option<Gender>) -> Vec<String> {
  let mut out = Vec::new();

  match gender {
    Some(Gender::Male) if age < MALE_MIN_AGE => {
      out.push(MALE_TOO_YOUNG.to_owned())
    }
    Some(Gender::Female) if age < FEMALE_MIN_AGE => {
      out.push(FEMALE_TOO_YOUNG.to_owned())
    }
    _ => {}
  }

  if age > MAX_AGE {
    out.push(TOO_OLD.to_owned());
  }

  out
}

/// Derive the age for `birth` as of `today` and apply the policy.
pub fn check(
  birth: NaiveDate,
  gender: Option<Gender>,
  today: NaiveDate,
) -> Eligibility {
  let age = years_between(birth, today);
  Eligibility { age, violations: violations(age, gender) }
}
