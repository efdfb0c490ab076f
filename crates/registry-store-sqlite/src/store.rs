//! [`SqliteStore`] — the SQLite implementation of [`PersonStore`].

use std::path::Path;

use chrono::{SubsecRound as _, Utc};
use rusqlite::OptionalExtension as _;
use uuid::Uuid;

use registry_core::{
  person::{NaturalKey, NewPerson, PersonRecord},
  store::{AgeAggregate, Page, PageRequest, PersonFilter, PersonStore},
};

use crate::{
  Result,
  encode::{PERSON_COLUMNS, RawPerson, contains_pattern, encode_dt, encode_uuid},
  schema::SCHEMA,
};

/// Shared `WHERE` clause for listing and counting. Each filter is disabled by
/// binding `NULL` to its parameter.
///
/// SQLite's `LIKE` folds case for ASCII letters only: `zürich` matches
/// `ZüRICH` but not `ZÜRICH`.
const FILTER_CLAUSE: &str = r"
  WHERE (?1 IS NULL OR gender = ?1)
    AND (?2 IS NULL OR age >= ?2)
    AND (?3 IS NULL OR age <= ?3)
    AND (?4 IS NULL
         OR full_name   LIKE ?4 ESCAPE '\'
         OR birth_place LIKE ?4 ESCAPE '\')";

// ─── Store ───────────────────────────────────────────────────────────────────

/// A person registry backed by a single SQLite file.
///
/// Cloning is cheap — the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store — useful for testing.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  /// Run a single-row `SELECT` over [`PERSON_COLUMNS`].
  async fn select_one(
    &self,
    where_clause: &'static str,
    params: Vec<String>,
  ) -> Result<Option<PersonRecord>> {
    let raw: Option<RawPerson> = self
      .conn
      .call(move |conn| {
        let sql = format!(
          "SELECT {PERSON_COLUMNS} FROM registration_users {where_clause}
           ORDER BY created_at ASC, rowid ASC
           LIMIT 1"
        );
        Ok(
          conn
            .query_row(
              &sql,
              rusqlite::params_from_iter(params.iter()),
              RawPerson::from_row,
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawPerson::into_record).transpose()
  }
}

/// Current time at the precision the `created_at`/`updated_at` columns keep.
fn now() -> chrono::DateTime<Utc> { Utc::now().trunc_subsecs(6) }

/// SQLite `COUNT`/`SUM` results are never negative.
fn count(n: i64) -> u64 { u64::try_from(n).unwrap_or(0) }

// ─── PersonStore impl ────────────────────────────────────────────────────────

impl PersonStore for SqliteStore {
  type Error = crate::Error;

  async fn insert(&self, person: NewPerson) -> Result<PersonRecord> {
    let at = now();
    let record = PersonRecord {
      id:                Uuid::new_v4(),
      full_name:         person.full_name,
      birth_year:        person.birth_year,
      birth_month:       person.birth_month,
      birth_day:         person.birth_day,
      birth_hour:        person.birth_hour,
      birth_minute:      person.birth_minute,
      birth_place:       person.birth_place,
      gender:            person.gender,
      height:            person.height,
      weight:            person.weight,
      astrological_sign: person.astrological_sign,
      age:               person.age,
      status:            person.status,
      created_at:        at,
      updated_at:        at,
    };

    let row = record.clone();
    self
      .conn
      .call(move |conn| {
        conn.execute(
          &format!(
            "INSERT INTO registration_users ({PERSON_COLUMNS})
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16)"
          ),
          rusqlite::params![
            encode_uuid(row.id),
            row.full_name,
            row.birth_year,
            row.birth_month,
            row.birth_day,
            row.birth_hour,
            row.birth_minute,
            row.birth_place,
            row.gender.as_ref(),
            row.height,
            row.weight,
            row.astrological_sign,
            row.age,
            row.status.as_ref(),
            encode_dt(row.created_at),
            encode_dt(row.updated_at),
          ],
        )?;
        Ok(())
      })
      .await?;

    Ok(record)
  }

  async fn get(&self, id: Uuid) -> Result<Option<PersonRecord>> {
    self.select_one("WHERE id = ?1", vec![encode_uuid(id)]).await
  }

  async fn find_by_natural_key(
    &self,
    key: &NaturalKey,
  ) -> Result<Option<PersonRecord>> {
    self
      .select_one(
        "WHERE full_name = ?1 AND birth_year = ?2
           AND birth_month = ?3 AND birth_day = ?4",
        vec![
          key.full_name.clone(),
          key.birth_year.clone(),
          key.birth_month.clone(),
          key.birth_day.clone(),
        ],
      )
      .await
  }

  async fn list(
    &self,
    filter: &PersonFilter,
    page: PageRequest,
  ) -> Result<Page<PersonRecord>> {
    let gender = filter.gender.map(|g| g.as_ref().to_owned());
    let min_age = filter.min_age;
    let max_age = filter.max_age;
    let pattern = filter
      .search
      .as_deref()
      .filter(|s| !s.is_empty())
      .map(contains_pattern);
    let limit = i64::from(page.size);
    let offset = i64::try_from(page.offset()).unwrap_or(i64::MAX);

    let (total, raws): (i64, Vec<RawPerson>) = self
      .conn
      .call(move |conn| {
        let total: i64 = conn.query_row(
          &format!("SELECT COUNT(*) FROM registration_users {FILTER_CLAUSE}"),
          rusqlite::params![gender, min_age, max_age, pattern],
          |r| r.get(0),
        )?;

        let mut stmt = conn.prepare(&format!(
          "SELECT {PERSON_COLUMNS} FROM registration_users {FILTER_CLAUSE}
           ORDER BY created_at DESC, rowid DESC
           LIMIT ?5 OFFSET ?6"
        ))?;
        let rows = stmt
          .query_map(
            rusqlite::params![gender, min_age, max_age, pattern, limit, offset],
            RawPerson::from_row,
          )?
          .collect::<rusqlite::Result<Vec<_>>>()?;

        Ok((total, rows))
      })
      .await?;

    let items = raws
      .into_iter()
      .map(RawPerson::into_record)
      .collect::<Result<_>>()?;
    Ok(Page { items, total: count(total) })
  }

  async fn update(
    &self,
    id: Uuid,
    person: NewPerson,
  ) -> Result<Option<PersonRecord>> {
    let id_str = encode_uuid(id);
    let at_str = encode_dt(now());

    let changed: usize = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "UPDATE registration_users SET
             full_name = ?2, birth_year = ?3, birth_month = ?4, birth_day = ?5,
             birth_hour = ?6, birth_minute = ?7, birth_place = ?8, gender = ?9,
             height = ?10, weight = ?11, astrological_sign = ?12, age = ?13,
             status = ?14, updated_at = ?15
           WHERE id = ?1",
          rusqlite::params![
            id_str,
            person.full_name,
            person.birth_year,
            person.birth_month,
            person.birth_day,
            person.birth_hour,
            person.birth_minute,
            person.birth_place,
            person.gender.as_ref(),
            person.height,
            person.weight,
            person.astrological_sign,
            person.age,
            person.status.as_ref(),
            at_str,
          ],
        )?)
      })
      .await?;

    if changed == 0 {
      return Ok(None);
    }
    self.get(id).await
  }

  async fn delete(&self, id: Uuid) -> Result<bool> {
    let id_str = encode_uuid(id);
    let deleted: usize = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "DELETE FROM registration_users WHERE id = ?1",
          rusqlite::params![id_str],
        )?)
      })
      .await?;
    Ok(deleted > 0)
  }

  async fn aggregate(&self) -> Result<AgeAggregate> {
    let aggregate = self
      .conn
      .call(|conn| {
        Ok(conn.query_row(
          "SELECT
             COUNT(*),
             COALESCE(SUM(gender = 'Male'), 0),
             COALESCE(SUM(gender = 'Female'), 0),
             AVG(age),
             MIN(age),
             MAX(age)
           FROM registration_users",
          [],
          |r| {
            Ok(AgeAggregate {
              total:        count(r.get(0)?),
              male_count:   count(r.get(1)?),
              female_count: count(r.get(2)?),
              avg_age:      r.get(3)?,
              min_age:      r.get(4)?,
              max_age:      r.get(5)?,
            })
          },
        )?)
      })
      .await?;
    Ok(aggregate)
  }

  async fn count_in_age_range(&self, min: u32, max: u32) -> Result<u64> {
    let n = self
      .conn
      .call(move |conn| {
        Ok(conn.query_row(
          "SELECT COUNT(*) FROM registration_users WHERE age BETWEEN ?1 AND ?2",
          rusqlite::params![min, max],
          |r| r.get::<_, i64>(0),
        )?)
      })
      .await?;
    Ok(count(n))
  }
}
