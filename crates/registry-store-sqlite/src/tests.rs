//! Integration tests for `SqliteStore` against an in-memory database, and for
//! the `Registry` service running on top of it.

use std::sync::Arc;

use chrono::NaiveDate;
use registry_core::{
  Error as CoreError,
  clock::FixedClock,
  eligibility::{FEMALE_TOO_YOUNG, MALE_TOO_YOUNG, TOO_OLD},
  person::{Gender, NewPerson, PersonRecord, RegistrationForm, Status},
  service::Registry,
  store::{Page, PageRequest, PersonFilter, PersonStore},
  validate::FieldErrorKind,
};
use uuid::Uuid;

use crate::SqliteStore;

async fn store() -> SqliteStore {
  SqliteStore::open_in_memory()
    .await
    .expect("in-memory store")
}

fn person(name: &str, gender: Gender, age: u32) -> NewPerson {
  NewPerson {
    full_name:         name.into(),
    birth_year:        "1995".into(),
    birth_month:       "06".into(),
    birth_day:         "15".into(),
    birth_hour:        None,
    birth_minute:      None,
    birth_place:       None,
    gender,
    height:            None,
    weight:            None,
    astrological_sign: None,
    age,
    status:            Status::Active,
  }
}

// ─── Store: writes and reads ─────────────────────────────────────────────────

#[tokio::test]
async fn insert_and_get() {
  let s = store().await;

  let mut input = person("Alice Liddell", Gender::Female, 29);
  input.birth_place = Some("Oxford".into());
  input.birth_hour = Some("07".into());

  let record = s.insert(input).await.unwrap();
  assert_eq!(record.created_at, record.updated_at);

  let fetched = s.get(record.id).await.unwrap().unwrap();
  assert_eq!(fetched, record);
  assert_eq!(fetched.birth_place.as_deref(), Some("Oxford"));
  assert_eq!(fetched.status, Status::Active);
}

#[tokio::test]
async fn get_missing_returns_none() {
  let s = store().await;
  assert!(s.get(Uuid::new_v4()).await.unwrap().is_none());
}

#[tokio::test]
async fn find_by_natural_key_matches_exactly() {
  let s = store().await;
  let record = s
    .insert(person("Alice Liddell", Gender::Female, 29))
    .await
    .unwrap();

  let mut key = record.natural_key();
  let found = s.find_by_natural_key(&key).await.unwrap().unwrap();
  assert_eq!(found.id, record.id);

  key.full_name = "alice liddell".into();
  assert!(s.find_by_natural_key(&key).await.unwrap().is_none());
}

#[tokio::test]
async fn update_replaces_fields_and_refreshes_timestamp() {
  let s = store().await;
  let record = s
    .insert(person("Alice Liddell", Gender::Female, 29))
    .await
    .unwrap();

  let mut change = person("Alice Hargreaves", Gender::Female, 30);
  change.status = Status::Pending;
  let updated = s.update(record.id, change).await.unwrap().unwrap();

  assert_eq!(updated.id, record.id);
  assert_eq!(updated.full_name, "Alice Hargreaves");
  assert_eq!(updated.age, 30);
  assert_eq!(updated.status, Status::Pending);
  assert_eq!(updated.created_at, record.created_at);
  assert!(updated.updated_at >= record.updated_at);
}

#[tokio::test]
async fn update_missing_returns_none() {
  let s = store().await;
  let result = s
    .update(Uuid::new_v4(), person("Nobody", Gender::Male, 30))
    .await
    .unwrap();
  assert!(result.is_none());
}

#[tokio::test]
async fn delete_removes_record() {
  let s = store().await;
  let record = s.insert(person("Bob", Gender::Male, 30)).await.unwrap();

  assert!(s.delete(record.id).await.unwrap());
  assert!(s.get(record.id).await.unwrap().is_none());
  assert!(!s.delete(record.id).await.unwrap());
}

// ─── Store: listing ──────────────────────────────────────────────────────────

async fn seeded() -> SqliteStore {
  let s = store().await;
  let mut with_place = person("Carol King", Gender::Female, 26);
  with_place.birth_place = Some("Brooklyn".into());
  s.insert(with_place).await.unwrap();
  s.insert(person("Dan Brown", Gender::Male, 24)).await.unwrap();
  s.insert(person("Eve Online", Gender::Female, 29)).await.unwrap();
  s.insert(person("Frank Ocean", Gender::Male, 35)).await.unwrap();
  s.insert(person("Grace Brook", Gender::Female, 40)).await.unwrap();
  s
}

fn names(page: &Page<PersonRecord>) -> Vec<&str> {
  page.items.iter().map(|p| p.full_name.as_str()).collect()
}

#[tokio::test]
async fn list_defaults_to_newest_first() {
  let s = seeded().await;
  let page = s
    .list(&PersonFilter::default(), PageRequest::default())
    .await
    .unwrap();

  assert_eq!(page.total, 5);
  assert_eq!(
    names(&page),
    ["Grace Brook", "Frank Ocean", "Eve Online", "Dan Brown", "Carol King"]
  );
}

#[tokio::test]
async fn list_filters_by_gender() {
  let s = seeded().await;
  let filter = PersonFilter { gender: Some(Gender::Male), ..Default::default() };
  let page = s.list(&filter, PageRequest::default()).await.unwrap();

  assert_eq!(page.total, 2);
  assert!(page.items.iter().all(|p| p.gender == Gender::Male));
}

#[tokio::test]
async fn list_filters_by_inclusive_age_range() {
  let s = seeded().await;
  let filter = PersonFilter {
    min_age: Some(25),
    max_age: Some(29),
    ..Default::default()
  };
  let page = s.list(&filter, PageRequest::default()).await.unwrap();

  assert_eq!(names(&page), ["Eve Online", "Carol King"]);
  assert!(page.items.iter().all(|p| (25..=29).contains(&p.age)));
}

#[tokio::test]
async fn list_search_matches_name_or_place_case_insensitively() {
  let s = seeded().await;
  let filter = PersonFilter { search: Some("BROOK".into()), ..Default::default() };
  let page = s.list(&filter, PageRequest::default()).await.unwrap();

  // "Grace Brook" by name, "Carol King" by birth place.
  assert_eq!(names(&page), ["Grace Brook", "Carol King"]);
}

#[tokio::test]
async fn list_search_treats_wildcards_literally() {
  let s = seeded().await;
  let filter = PersonFilter { search: Some("%".into()), ..Default::default() };
  let page = s.list(&filter, PageRequest::default()).await.unwrap();
  assert_eq!(page.total, 0);
}

#[tokio::test]
async fn list_search_folds_ascii_case_only() {
  let s = store().await;
  let mut input = person("Hans Meier", Gender::Male, 30);
  input.birth_place = Some("ZÜRICH".into());
  s.insert(input).await.unwrap();

  let search = |term: &str| PersonFilter {
    search: Some(term.into()),
    ..Default::default()
  };
  let hit = s.list(&search("zÜrich"), PageRequest::default()).await.unwrap();
  assert_eq!(hit.total, 1);
  let miss = s.list(&search("zürich"), PageRequest::default()).await.unwrap();
  assert_eq!(miss.total, 0);
}

#[tokio::test]
async fn list_paginates() {
  let s = seeded().await;
  let page = s
    .list(&PersonFilter::default(), PageRequest::new(2, Some(2)))
    .await
    .unwrap();

  assert_eq!(page.total, 5);
  assert_eq!(names(&page), ["Eve Online", "Dan Brown"]);
}

// ─── Store: aggregates ───────────────────────────────────────────────────────

#[tokio::test]
async fn aggregate_empty_store() {
  let s = store().await;
  let agg = s.aggregate().await.unwrap();
  assert_eq!(agg.total, 0);
  assert_eq!(agg.male_count, 0);
  assert_eq!(agg.avg_age, None);
  assert_eq!(agg.min_age, None);
}

#[tokio::test]
async fn aggregate_and_range_counts() {
  let s = seeded().await;
  let agg = s.aggregate().await.unwrap();

  assert_eq!(agg.total, 5);
  assert_eq!(agg.male_count, 2);
  assert_eq!(agg.female_count, 3);
  assert_eq!(agg.avg_age, Some(30.8));
  assert_eq!(agg.min_age, Some(24));
  assert_eq!(agg.max_age, Some(40));

  assert_eq!(s.count_in_age_range(25, 29).await.unwrap(), 2);
  assert_eq!(s.count_in_age_range(40, 100).await.unwrap(), 1);
}

// ─── Registry service ────────────────────────────────────────────────────────

fn today() -> NaiveDate { NaiveDate::from_ymd_opt(2025, 6, 1).unwrap() }

async fn registry() -> Registry<SqliteStore> {
  Registry::with_clock(Arc::new(store().await), Arc::new(FixedClock(today())))
}

fn form(name: &str, year: &str, month: &str, day: &str, gender: &str) -> RegistrationForm {
  RegistrationForm {
    full_name: Some(name.into()),
    birth_year: Some(year.into()),
    birth_month: Some(month.into()),
    birth_day: Some(day.into()),
    gender: Some(gender.into()),
    ..Default::default()
  }
}

#[tokio::test]
async fn register_computes_age_and_defaults_status() {
  let r = registry().await;
  let record = r
    .register(form("Jane Doe", "1998", "03", "20", "Female"))
    .await
    .unwrap();

  assert_eq!(record.age, 27);
  assert_eq!(record.status, Status::Active);
  assert_eq!(record.gender, Gender::Female);
  assert_eq!(r.get(record.id).await.unwrap(), record);
}

#[tokio::test]
async fn register_age_turns_over_on_birthday() {
  let r = registry().await;
  let before = r
    .register(form("Before Birthday", "1995", "06", "02", "Male"))
    .await
    .unwrap();
  let on = r
    .register(form("On Birthday", "1995", "06", "01", "Male"))
    .await
    .unwrap();

  assert_eq!(before.age, 29);
  assert_eq!(on.age, 30);
}

#[tokio::test]
async fn register_rejects_underage_male_without_writing() {
  let r = registry().await;
  let err = r
    .register(form("Young User", "2010", "01", "01", "Male"))
    .await
    .unwrap_err();

  match err {
    CoreError::Ineligible(messages) => assert_eq!(messages, [MALE_TOO_YOUNG]),
    other => panic!("unexpected error: {other:?}"),
  }
  assert_eq!(r.store().aggregate().await.unwrap().total, 0);
}

#[tokio::test]
async fn register_applies_female_minimum() {
  let r = registry().await;
  let err = r
    .register(form("Young Female", "2010", "01", "01", "Female"))
    .await
    .unwrap_err();
  assert!(
    matches!(&err, CoreError::Ineligible(m) if m == &[FEMALE_TOO_YOUNG]),
    "{err:?}"
  );

  // 20 is old enough for women but not for men.
  r.register(form("Adult Female", "2005", "01", "01", "Female"))
    .await
    .unwrap();
}

#[tokio::test]
async fn register_rejects_over_forty_for_either_gender() {
  let r = registry().await;
  for gender in ["Male", "Female"] {
    let err = r
      .register(form("Old Timer", "1980", "01", "01", gender))
      .await
      .unwrap_err();
    assert!(
      matches!(&err, CoreError::Ineligible(m) if m == &[TOO_OLD]),
      "{gender}: {err:?}"
    );
  }
}

#[tokio::test]
async fn register_collects_field_errors() {
  let r = registry().await;
  let mut input = form("J4ne", "1998", "13", "20", "Female");
  input.birth_hour = Some("25".into());

  let Err(CoreError::Validation(errors)) = r.register(input).await else {
    panic!("expected validation failure");
  };
  let fields: Vec<_> = errors.fields().collect();
  assert_eq!(fields, ["birth_hour", "birth_month", "full_name"]);
  assert_eq!(
    errors.get("birth_hour").unwrap()[0].kind,
    FieldErrorKind::OutOfRange
  );
}

#[tokio::test]
async fn register_duplicate_is_conflict() {
  let r = registry().await;
  r.register(form("Jane Doe", "1998", "03", "20", "Female"))
    .await
    .unwrap();

  // Same natural key once normalised.
  let err = r
    .register(form(" Jane Doe ", "1998", "03", "20", "Female"))
    .await
    .unwrap_err();
  assert!(matches!(err, CoreError::Conflict), "{err:?}");
  assert_eq!(r.store().aggregate().await.unwrap().total, 1);
}

#[tokio::test]
async fn partial_update_merges_and_recomputes_age() {
  let r = registry().await;
  let record = r
    .register(form("Jane Doe", "1998", "03", "20", "Female"))
    .await
    .unwrap();

  let change = RegistrationForm {
    birth_year: Some("1990".into()),
    birth_place: Some("Lisbon".into()),
    ..Default::default()
  };
  let updated = r.update(record.id, change, true).await.unwrap();

  assert_eq!(updated.full_name, "Jane Doe");
  assert_eq!(updated.birth_year, "1990");
  assert_eq!(updated.age, 35);
  assert_eq!(updated.birth_place.as_deref(), Some("Lisbon"));
  assert_eq!(updated.created_at, record.created_at);
}

#[tokio::test]
async fn full_update_requires_every_required_field() {
  let r = registry().await;
  let record = r
    .register(form("Jane Doe", "1998", "03", "20", "Female"))
    .await
    .unwrap();

  let change = RegistrationForm {
    full_name: Some("Janet Doe".into()),
    ..Default::default()
  };
  let Err(CoreError::Validation(errors)) =
    r.update(record.id, change, false).await
  else {
    panic!("expected validation failure");
  };
  assert!(errors.get("gender").is_some());
  assert_eq!(r.get(record.id).await.unwrap().full_name, "Jane Doe");
}

#[tokio::test]
async fn update_rechecks_eligibility() {
  let r = registry().await;
  let record = r
    .register(form("Jane Doe", "1998", "03", "20", "Female"))
    .await
    .unwrap();

  // 19 is old enough for women but not for men.
  let change = RegistrationForm {
    birth_year: Some("2006".into()),
    gender: Some("Male".into()),
    ..Default::default()
  };
  let err = r.update(record.id, change, true).await.unwrap_err();
  assert!(
    matches!(&err, CoreError::Ineligible(m) if m == &[MALE_TOO_YOUNG]),
    "{err:?}"
  );
  assert_eq!(r.get(record.id).await.unwrap().age, 27);
}

#[tokio::test]
async fn update_does_not_check_duplicates() {
  let r = registry().await;
  r.register(form("Jane Doe", "1998", "03", "20", "Female"))
    .await
    .unwrap();
  let other = r
    .register(form("John Doe", "1998", "03", "20", "Male"))
    .await
    .unwrap();

  let change = RegistrationForm {
    full_name: Some("Jane Doe".into()),
    ..Default::default()
  };
  let updated = r.update(other.id, change, true).await.unwrap();
  assert_eq!(updated.full_name, "Jane Doe");
}

#[tokio::test]
async fn update_missing_is_not_found() {
  let r = registry().await;
  let id = Uuid::new_v4();
  let err = r
    .update(id, RegistrationForm::default(), true)
    .await
    .unwrap_err();
  assert!(matches!(err, CoreError::NotFound(got) if got == id), "{err:?}");
}

#[tokio::test]
async fn list_rejects_pages_past_the_end() {
  let r = registry().await;
  let filter = PersonFilter::default();

  let empty = r.list(&filter, PageRequest::default()).await.unwrap();
  assert_eq!(empty.count, 0);
  assert_eq!(empty.total_pages, 1);
  assert_eq!(empty.next(), None);

  let err = r.list(&filter, PageRequest::new(2, None)).await.unwrap_err();
  assert!(matches!(err, CoreError::InvalidPage(2)), "{err:?}");
}

#[tokio::test]
async fn statistics_on_empty_store() {
  let r = registry().await;
  let stats = r.statistics().await.unwrap();
  assert_eq!(stats.overview.total_users, 0);
  assert_eq!(stats.overview.avg_age, 0.0);
  assert!(stats.age_distribution.is_empty());
}

#[tokio::test]
async fn statistics_bucket_registered_people() {
  let r = registry().await;
  r.register(form("Ann Lee", "2004", "01", "01", "Female")).await.unwrap(); // 21
  r.register(form("Ben Lee", "1998", "01", "01", "Male")).await.unwrap(); // 27
  r.register(form("Cat Lee", "1997", "01", "01", "Female")).await.unwrap(); // 28
  r.register(form("Dev Lee", "1985", "01", "01", "Male")).await.unwrap(); // 40

  let stats = r.statistics().await.unwrap();
  assert_eq!(stats.overview.total_users, 4);
  assert_eq!(stats.overview.male_count, 2);
  assert_eq!(stats.overview.female_count, 2);
  assert_eq!(stats.overview.avg_age, 29.0);
  assert_eq!(stats.overview.min_age, 21);
  assert_eq!(stats.overview.max_age, 40);

  let labels: Vec<_> = stats
    .age_distribution
    .iter()
    .map(|b| (b.age_range, b.count))
    .collect();
  assert_eq!(labels, [("18-24", 1), ("25-29", 2), ("40+", 1)]);
}
