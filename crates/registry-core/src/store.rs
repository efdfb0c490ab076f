//! The `PersonStore` trait and supporting query types.
//!
//! The trait is implemented by storage backends (e.g.
//! `registry-store-sqlite`). It knows nothing about validation or the age
//! policy; the [`crate::service::Registry`] runs those before any write.

use std::future::Future;

use uuid::Uuid;

use crate::person::{Gender, NaturalKey, NewPerson, PersonRecord};

pub const DEFAULT_PAGE_SIZE: u32 = 10;
pub const MAX_PAGE_SIZE: u32 = 100;

// ─── Query types ─────────────────────────────────────────────────────────────

/// Filters for [`PersonStore::list`]. Every filter is optional.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PersonFilter {
  pub gender:  Option<Gender>,
  /// Inclusive lower bound on `age`.
  pub min_age: Option<i64>,
  /// Inclusive upper bound on `age`.
  pub max_age: Option<i64>,
  /// Case-insensitive substring matched against `full_name` or
  /// `birth_place`.
  pub search:  Option<String>,
}

/// A 1-based page request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
  pub page: u32,
  pub size: u32,
}

impl Default for PageRequest {
  fn default() -> Self { Self { page: 1, size: DEFAULT_PAGE_SIZE } }
}

impl PageRequest {
  /// Build a request from a page number and a caller-chosen page size.
  /// The size is clamped to [`MAX_PAGE_SIZE`]; zero falls back to the default.
  pub fn new(page: u32, size: Option<u32>) -> Self {
    let size = match size {
      Some(0) | None => DEFAULT_PAGE_SIZE,
      Some(n) => n.min(MAX_PAGE_SIZE),
    };
    Self { page, size }
  }

  pub fn offset(&self) -> u64 {
    u64::from(self.page.saturating_sub(1)) * u64::from(self.size)
  }
}

/// One page of results plus the total number of matches.
#[derive(Debug, Clone, PartialEq)]
pub struct Page<T> {
  pub items: Vec<T>,
  pub total: u64,
}

/// Raw aggregates over every stored record.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct AgeAggregate {
  pub total:        u64,
  pub male_count:   u64,
  pub female_count: u64,
  /// `None` when there are no records.
  pub avg_age:      Option<f64>,
  pub min_age:      Option<u32>,
  pub max_age:      Option<u32>,
}

// ─── Trait ───────────────────────────────────────────────────────────────────

/// Abstraction over a person-record backend.
///
/// Single-record writes are assumed atomic; nothing above this layer adds
/// locking, so two concurrent registrations with the same natural key can
/// both succeed.
///
/// All methods return `Send` futures so the trait can be used in
/// multi-threaded async runtimes (e.g. tokio with `axum`).
pub trait PersonStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  /// Persist a new record, assigning its id and timestamps.
  fn insert(
    &self,
    person: NewPerson,
  ) -> impl Future<Output = Result<PersonRecord, Self::Error>> + Send + '_;

  /// Retrieve a record by id. Returns `None` if not found.
  fn get(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<PersonRecord>, Self::Error>> + Send + '_;

  /// The first record whose name and birth date match `key` exactly.
  fn find_by_natural_key<'a>(
    &'a self,
    key: &'a NaturalKey,
  ) -> impl Future<Output = Result<Option<PersonRecord>, Self::Error>> + Send + 'a;

  /// Records matching `filter`, newest first.
  fn list<'a>(
    &'a self,
    filter: &'a PersonFilter,
    page: PageRequest,
  ) -> impl Future<Output = Result<Page<PersonRecord>, Self::Error>> + Send + 'a;

  /// Replace every mutable field of record `id` and refresh `updated_at`.
  /// Returns `None` if the record does not exist.
  fn update(
    &self,
    id: Uuid,
    person: NewPerson,
  ) -> impl Future<Output = Result<Option<PersonRecord>, Self::Error>> + Send + '_;

  /// Delete record `id`. Returns `false` if it did not exist.
  fn delete(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;

  /// Counts and age aggregates over all records.
  fn aggregate(
    &self,
  ) -> impl Future<Output = Result<AgeAggregate, Self::Error>> + Send + '_;

  /// Number of records whose age lies in `min..=max`.
  fn count_in_age_range(
    &self,
    min: u32,
    max: u32,
  ) -> impl Future<Output = Result<u64, Self::Error>> + Send + '_;
}
