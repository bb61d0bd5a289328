//! SQLite persistence layer for library circulation.
//!
//! Provides schema creation, mutating operations, and filtered search
//! queries backed by SQLite (via rusqlite with bundled feature). Every
//! operation takes a `&rusqlite::Connection` owned by the caller; the
//! caller also owns transaction boundaries and connection shutdown.

mod filter;
pub mod operations;
pub mod queries;
pub mod schema;

pub use operations::{
    add_book, add_user, advance_waitlist, checkout_book, grant_extension, join_waitlist,
    leave_waitlist, remove_book, remove_user, return_book, update_book, update_user,
    OperationError,
};
pub use queries::{
    circulation_stats, line_length, number_in_stock, overdue_loans, place_in_line, search_books,
    search_loan_history, search_loans, search_users, search_waitlist, CirculationStats,
};
pub use schema::{open_database, open_memory};
