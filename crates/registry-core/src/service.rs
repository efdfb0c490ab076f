//! [`Registry`] — the registration service.
//!
//! Every write goes through the same sequence: validate the full field set,
//! derive the age and apply the eligibility policy, then persist. Nothing is
//! written unless every step passes.

use std::sync::Arc;

use chrono::NaiveDate;
use uuid::Uuid;

use crate::{
  Error, Result,
  clock::{Clock, SystemClock},
  eligibility,
  person::{PersonRecord, RegistrationForm, Status},
  stats::{self, BUCKETS, Overview, Statistics},
  store::{PageRequest, PersonFilter, PersonStore},
  validate::{ValidRegistration, validate},
};

/// A page of records plus the numbers needed to navigate between pages.
#[derive(Debug, Clone, PartialEq)]
pub struct Listing {
  pub count:       u64,
  pub page:        u32,
  pub total_pages: u32,
  pub results:     Vec<PersonRecord>,
}

impl Listing {
  pub fn next(&self) -> Option<u32> {
    (self.page < self.total_pages).then(|| self.page + 1)
  }

  pub fn previous(&self) -> Option<u32> {
    (self.page > 1).then(|| self.page - 1)
  }
}

/// Orchestrates validation, eligibility, duplicate detection and persistence
/// on top of a [`PersonStore`].
pub struct Registry<S> {
  store: Arc<S>,
  clock: Arc<dyn Clock>,
}

impl<S> Clone for Registry<S> {
  fn clone(&self) -> Self {
    Self { store: Arc::clone(&self.store), clock: Arc::clone(&self.clock) }
  }
}

impl<S: PersonStore> Registry<S> {
  /// A registry that reads today's date from the system clock.
  pub fn new(store: Arc<S>) -> Self { Self::with_clock(store, Arc::new(SystemClock)) }

  pub fn with_clock(store: Arc<S>, clock: Arc<dyn Clock>) -> Self {
    Self { store, clock }
  }

  pub fn store(&self) -> &S { &self.store }

  pub fn today(&self) -> NaiveDate { self.clock.today() }

  /// Validate, check eligibility and duplicates, then persist a new record.
  ///
  /// Not safe to retry blindly: the duplicate check and the insert are two
  /// separate store calls.
  pub async fn register(&self, form: RegistrationForm) -> Result<PersonRecord> {
    let today = self.today();
    let valid = validate(&form, today)?;
    let age = eligible_age(&valid, today)?;

    let key = valid.natural_key();
    let existing = self
      .store
      .find_by_natural_key(&key)
      .await
      .map_err(Error::store)?;
    if existing.is_some() {
      return Err(Error::Conflict);
    }

    let record = self
      .store
      .insert(valid.into_new_person(age, Status::Active))
      .await
      .map_err(Error::store)?;

    tracing::info!(id = %record.id, full_name = %record.full_name, "registered person");
    Ok(record)
  }

  /// Update record `id`.
  ///
  /// With `partial`, fields absent from `form` keep their stored values;
  /// otherwise `form` is the complete new field set. The merged result is
  /// validated and checked exactly as on registration, except that no
  /// duplicate check is made.
  pub async fn update(
    &self,
    id: Uuid,
    form: RegistrationForm,
    partial: bool,
  ) -> Result<PersonRecord> {
    let existing = self.get(id).await?;

    let form = if partial { form.merged_over(&existing) } else { form };
    let today = self.today();
    let valid = validate(&form, today)?;
    let age = eligible_age(&valid, today)?;

    let record = self
      .store
      .update(id, valid.into_new_person(age, existing.status))
      .await
      .map_err(Error::store)?
      .ok_or(Error::NotFound(id))?;

    tracing::info!(id = %record.id, full_name = %record.full_name, "updated person");
    Ok(record)
  }

  pub async fn get(&self, id: Uuid) -> Result<PersonRecord> {
    self
      .store
      .get(id)
      .await
      .map_err(Error::store)?
      .ok_or(Error::NotFound(id))
  }

  pub async fn delete(&self, id: Uuid) -> Result<()> {
    let deleted = self.store.delete(id).await.map_err(Error::store)?;
    if !deleted {
      return Err(Error::NotFound(id));
    }
    tracing::info!(%id, "deleted person");
    Ok(())
  }

  /// One page of records matching `filter`, newest first.
  ///
  /// Page 1 always exists, even when empty; any later page past the end is
  /// [`Error::InvalidPage`].
  pub async fn list(
    &self,
    filter: &PersonFilter,
    page: PageRequest,
  ) -> Result<Listing> {
    if page.page == 0 {
      return Err(Error::InvalidPage(0));
    }

    let found = self.store.list(filter, page).await.map_err(Error::store)?;
    let total_pages = found.total.div_ceil(u64::from(page.size)).max(1);
    let total_pages = u32::try_from(total_pages).unwrap_or(u32::MAX);
    if page.page > total_pages {
      return Err(Error::InvalidPage(page.page));
    }

    Ok(Listing {
      count: found.total,
      page: page.page,
      total_pages,
      results: found.items,
    })
  }

  /// Overview counts and the age histogram.
  pub async fn statistics(&self) -> Result<Statistics> {
    let aggregate = self.store.aggregate().await.map_err(Error::store)?;
    if aggregate.total == 0 {
      return Ok(Statistics::default());
    }

    let mut counts = Vec::with_capacity(BUCKETS.len());
    for bucket in BUCKETS {
      let n = self
        .store
        .count_in_age_range(bucket.min, bucket.max)
        .await
        .map_err(Error::store)?;
      counts.push((bucket, n));
    }

    Ok(Statistics {
      overview:         Overview::from(aggregate),
      age_distribution: stats::distribution(counts),
    })
  }
}

fn eligible_age(valid: &ValidRegistration, today: NaiveDate) -> Result<u32> {
  let outcome = eligibility::check(valid.birth_date, Some(valid.gender), today);
  if !outcome.is_eligible() {
    return Err(Error::Ineligible(outcome.violations));
  }
  // Validation already rejected future birth dates.
  Ok(eligibility::age_on(valid.birth_date, today))
}
