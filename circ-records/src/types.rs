//! Record, filter, and update types for the circulation schema.
//!
//! Records are fully-populated row images. Filters and updates are
//! all-optional shapes: a `None` field takes no part in the search or the
//! update, and `Default` gives the match-everything filter / no-op update.

use serde::{Deserialize, Serialize};

// ── Records ─────────────────────────────────────────────────────────────────

/// A title the library owns, keyed by ISBN.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Book {
    pub isbn: String,
    pub title: String,
    pub author: String,
    pub publication_year: i64,
    pub publisher: String,
    /// Copies the branch owns. A capacity ceiling, not what is on the shelf.
    pub num_owned: i64,
}

/// A patron account.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub account_id: String,
    pub name: String,
    pub address: String,
    pub phone_number: String,
    pub email: String,
}

/// A currently-open loan. The row exists only while the copy is out;
/// returning it migrates the data into [`LoanHistory`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Loan {
    pub isbn: String,
    pub account_id: String,
    /// ISO-8601 date, assigned by the database at checkout.
    pub checkout_date: String,
    pub due_date: String,
}

/// An archived, completed loan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoanHistory {
    pub isbn: String,
    pub account_id: String,
    pub checkout_date: String,
    pub due_date: String,
    pub return_date: String,
}

/// A waitlist entry. Ranks for one ISBN form a dense 1..n sequence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Waitlist {
    pub isbn: String,
    pub account_id: String,
    pub place_in_line: i64,
}

// ── Match Mode ──────────────────────────────────────────────────────────────

/// How string filter values are interpreted, uniformly for one search.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MatchMode {
    /// String fields must equal the filter value exactly.
    #[default]
    Exact,
    /// String fields are SQL `LIKE` patterns (`%`, `_` wildcards).
    Pattern,
}

// ── Filters ─────────────────────────────────────────────────────────────────

/// Search criteria for books. Year bounds are inclusive and independent.
#[derive(Debug, Clone, Default)]
pub struct BookFilter<'a> {
    pub isbn: Option<&'a str>,
    pub title: Option<&'a str>,
    pub author: Option<&'a str>,
    pub publisher: Option<&'a str>,
    pub num_owned: Option<i64>,
    pub min_publication_year: Option<i64>,
    pub max_publication_year: Option<i64>,
}

/// Search criteria for users.
#[derive(Debug, Clone, Default)]
pub struct UserFilter<'a> {
    pub account_id: Option<&'a str>,
    pub name: Option<&'a str>,
    pub address: Option<&'a str>,
    pub phone_number: Option<&'a str>,
    pub email: Option<&'a str>,
}

/// Search criteria for open loans. Date bounds are inclusive ISO-8601
/// strings and may be combined with the exact-date fields.
#[derive(Debug, Clone, Default)]
pub struct LoanFilter<'a> {
    pub isbn: Option<&'a str>,
    pub account_id: Option<&'a str>,
    pub checkout_date: Option<&'a str>,
    pub due_date: Option<&'a str>,
    pub min_checkout_date: Option<&'a str>,
    pub max_checkout_date: Option<&'a str>,
    pub min_due_date: Option<&'a str>,
    pub max_due_date: Option<&'a str>,
}

/// Search criteria for archived loans.
#[derive(Debug, Clone, Default)]
pub struct LoanHistoryFilter<'a> {
    pub isbn: Option<&'a str>,
    pub account_id: Option<&'a str>,
    pub checkout_date: Option<&'a str>,
    pub due_date: Option<&'a str>,
    pub return_date: Option<&'a str>,
    pub min_checkout_date: Option<&'a str>,
    pub max_checkout_date: Option<&'a str>,
    pub min_due_date: Option<&'a str>,
    pub max_due_date: Option<&'a str>,
    pub min_return_date: Option<&'a str>,
    pub max_return_date: Option<&'a str>,
}

/// Search criteria for waitlist entries.
#[derive(Debug, Clone, Default)]
pub struct WaitlistFilter<'a> {
    pub isbn: Option<&'a str>,
    pub account_id: Option<&'a str>,
    pub place_in_line: Option<i64>,
    pub min_place_in_line: Option<i64>,
    pub max_place_in_line: Option<i64>,
}

// ── Updates ─────────────────────────────────────────────────────────────────

/// Field replacements for an existing user. `None` fields keep their
/// current value; the all-`None` update is a no-op.
#[derive(Debug, Clone, Default)]
pub struct UserUpdate<'a> {
    pub account_id: Option<&'a str>,
    pub name: Option<&'a str>,
    pub address: Option<&'a str>,
    pub phone_number: Option<&'a str>,
    pub email: Option<&'a str>,
}

/// Field replacements for an existing book.
#[derive(Debug, Clone, Default)]
pub struct BookUpdate<'a> {
    pub isbn: Option<&'a str>,
    pub title: Option<&'a str>,
    pub author: Option<&'a str>,
    pub publication_year: Option<i64>,
    pub publisher: Option<&'a str>,
    pub num_owned: Option<i64>,
}
