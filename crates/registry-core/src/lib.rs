//! Core types and business rules for the person registry.
//!
//! This crate is deliberately free of HTTP and database dependencies. It owns
//! the validation and eligibility engines, the statistics shaping, the
//! [`store::PersonStore`] abstraction and the [`service::Registry`] that
//! orchestrates them.

pub mod clock;
pub mod eligibility;
pub mod error;
pub mod person;
pub mod service;
pub mod stats;
pub mod store;
pub mod validate;

pub use error::{Error, Result};
