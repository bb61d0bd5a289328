//! Data model types for library circulation.
//!
//! This crate defines the persistent record types (books, users, loans,
//! loan history, waitlist entries) plus the filter and update shapes the
//! `circ-db` crate consumes, without any database dependencies.

pub mod types;

pub use types::*;
