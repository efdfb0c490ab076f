//! SQL schema for the registry SQLite store.
//!
//! Executed once at connection startup. Future migrations will be gated on
//! `PRAGMA user_version`.

/// Full schema DDL; idempotent thanks to `IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;

-- The natural key (full_name, birth_*) is checked by the service layer and
-- deliberately not enforced here.
CREATE TABLE IF NOT EXISTS registration_users (
    id                TEXT PRIMARY KEY,
    full_name         TEXT NOT NULL,
    birth_year        TEXT NOT NULL,
    birth_month       TEXT NOT NULL,
    birth_day         TEXT NOT NULL,
    birth_hour        TEXT,
    birth_minute      TEXT,
    birth_place       TEXT,
    gender            TEXT NOT NULL,   -- 'Male' | 'Female'
    height            TEXT,
    weight            TEXT,
    astrological_sign TEXT,
    age               INTEGER NOT NULL,
    status            TEXT NOT NULL DEFAULT 'active',
    created_at        TEXT NOT NULL,   -- fixed-width RFC 3339 UTC
    updated_at        TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS users_name_gender_idx ON registration_users(full_name, gender);
CREATE INDEX IF NOT EXISTS users_age_idx         ON registration_users(age);
CREATE INDEX IF NOT EXISTS users_created_idx     ON registration_users(created_at);

PRAGMA user_version = 1;
";
