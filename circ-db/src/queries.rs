//! Search and derived lookups for the circulation database.
//!
//! The `search_*` functions build their WHERE clause from the populated
//! filter fields only; an all-`None` filter returns the whole table.

use circ_records::{
    Book, BookFilter, Loan, LoanFilter, LoanHistory, LoanHistoryFilter, MatchMode, User,
    UserFilter, Waitlist, WaitlistFilter,
};
use rusqlite::{params, Connection};

use crate::filter::Predicates;
use crate::operations::OperationError;

// ── Filtered Searches ───────────────────────────────────────────────────────

/// Search books by any combination of fields plus a publication-year range.
pub fn search_books(
    conn: &Connection,
    filter: &BookFilter,
    mode: MatchMode,
) -> Result<Vec<Book>, OperationError> {
    let mut preds = Predicates::new();
    preds.text("isbn", filter.isbn, mode);
    preds.text("title", filter.title, mode);
    preds.text("author", filter.author, mode);
    preds.text("publisher", filter.publisher, mode);
    preds.eq("num_owned", filter.num_owned);
    preds.range(
        "publication_year",
        filter.min_publication_year,
        filter.max_publication_year,
    );

    let sql = preds.sql(
        "SELECT isbn, title, author, publication_year, publisher, num_owned
         FROM books",
    );
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map(preds.params().as_slice(), row_to_book)?;
    rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
}

/// Search users by any combination of fields.
pub fn search_users(
    conn: &Connection,
    filter: &UserFilter,
    mode: MatchMode,
) -> Result<Vec<User>, OperationError> {
    let mut preds = Predicates::new();
    preds.text("account_id", filter.account_id, mode);
    preds.text("name", filter.name, mode);
    preds.text("address", filter.address, mode);
    preds.text("phone_number", filter.phone_number, mode);
    preds.text("email", filter.email, mode);

    let sql = preds.sql(
        "SELECT account_id, name, address, phone_number, email
         FROM users",
    );
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map(preds.params().as_slice(), row_to_user)?;
    rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
}

/// Search open loans by field and inclusive date ranges.
pub fn search_loans(
    conn: &Connection,
    filter: &LoanFilter,
    mode: MatchMode,
) -> Result<Vec<Loan>, OperationError> {
    let mut preds = Predicates::new();
    preds.text("isbn", filter.isbn, mode);
    preds.text("account_id", filter.account_id, mode);
    preds.text("checkout_date", filter.checkout_date, mode);
    preds.text("due_date", filter.due_date, mode);
    preds.date_range(
        "checkout_date",
        filter.min_checkout_date,
        filter.max_checkout_date,
    );
    preds.date_range("due_date", filter.min_due_date, filter.max_due_date);

    let sql = preds.sql(
        "SELECT isbn, account_id, checkout_date, due_date
         FROM loans",
    );
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map(preds.params().as_slice(), row_to_loan)?;
    rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
}

/// Search archived loans by field and inclusive date ranges.
pub fn search_loan_history(
    conn: &Connection,
    filter: &LoanHistoryFilter,
    mode: MatchMode,
) -> Result<Vec<LoanHistory>, OperationError> {
    let mut preds = Predicates::new();
    preds.text("isbn", filter.isbn, mode);
    preds.text("account_id", filter.account_id, mode);
    preds.text("checkout_date", filter.checkout_date, mode);
    preds.text("due_date", filter.due_date, mode);
    preds.text("return_date", filter.return_date, mode);
    preds.date_range(
        "checkout_date",
        filter.min_checkout_date,
        filter.max_checkout_date,
    );
    preds.date_range("due_date", filter.min_due_date, filter.max_due_date);
    preds.date_range(
        "return_date",
        filter.min_return_date,
        filter.max_return_date,
    );

    let sql = preds.sql(
        "SELECT isbn, account_id, checkout_date, due_date, return_date
         FROM loan_history",
    );
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map(preds.params().as_slice(), row_to_history)?;
    rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
}

/// Search waitlist entries by field and an inclusive rank range.
pub fn search_waitlist(
    conn: &Connection,
    filter: &WaitlistFilter,
    mode: MatchMode,
) -> Result<Vec<Waitlist>, OperationError> {
    let mut preds = Predicates::new();
    preds.text("isbn", filter.isbn, mode);
    preds.text("account_id", filter.account_id, mode);
    preds.eq("place_in_line", filter.place_in_line);
    preds.range(
        "place_in_line",
        filter.min_place_in_line,
        filter.max_place_in_line,
    );

    let sql = preds.sql(
        "SELECT isbn, account_id, place_in_line
         FROM waitlist",
    );
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map(preds.params().as_slice(), row_to_waitlist)?;
    rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
}

// ── Stock and Waitlist Lookups ──────────────────────────────────────────────

/// Copies of a book available for checkout: owned minus currently out.
///
/// `None` when the library does not own the title at all, which is
/// distinct from zero available. Loans exceeding ownership yield a
/// negative count; the inconsistency is surfaced, not clamped.
pub fn number_in_stock(conn: &Connection, isbn: &str) -> Result<Option<i64>, OperationError> {
    let owned = match conn.query_row(
        "SELECT num_owned FROM books WHERE isbn = ?1",
        params![isbn],
        |row| row.get::<_, i64>(0),
    ) {
        Ok(owned) => owned,
        Err(rusqlite::Error::QueryReturnedNoRows) => return Ok(None),
        Err(e) => return Err(e.into()),
    };

    let checked_out: i64 = conn.query_row(
        "SELECT COUNT(*) FROM loans WHERE isbn = ?1",
        params![isbn],
        |row| row.get(0),
    )?;
    Ok(Some(owned - checked_out))
}

/// The pair's waitlist rank, or `None` when the pair is not waitlisted.
pub fn place_in_line(
    conn: &Connection,
    isbn: &str,
    account_id: &str,
) -> Result<Option<i64>, OperationError> {
    let result = conn.query_row(
        "SELECT place_in_line FROM waitlist WHERE isbn = ?1 AND account_id = ?2",
        params![isbn, account_id],
        |row| row.get::<_, i64>(0),
    );
    match result {
        Ok(rank) => Ok(Some(rank)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

/// How many accounts are waiting on a book; 0 when none.
pub fn line_length(conn: &Connection, isbn: &str) -> Result<i64, OperationError> {
    let count: i64 = conn.query_row(
        "SELECT COUNT(*) FROM waitlist WHERE isbn = ?1",
        params![isbn],
        |row| row.get(0),
    )?;
    Ok(count)
}

/// Open loans whose due date has passed, oldest first.
pub fn overdue_loans(conn: &Connection) -> Result<Vec<Loan>, OperationError> {
    let mut stmt = conn.prepare(
        "SELECT isbn, account_id, checkout_date, due_date
         FROM loans WHERE due_date < date('now') ORDER BY due_date",
    )?;
    let rows = stmt.query_map([], row_to_loan)?;
    rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
}

// ── Statistics ──────────────────────────────────────────────────────────────

/// Get overall circulation statistics.
pub fn circulation_stats(conn: &Connection) -> Result<CirculationStats, OperationError> {
    let titles: i64 = conn.query_row("SELECT COUNT(*) FROM books", [], |r| r.get(0))?;
    let copies_owned: i64 = conn.query_row(
        "SELECT COALESCE(SUM(num_owned), 0) FROM books",
        [],
        |r| r.get(0),
    )?;
    let users: i64 = conn.query_row("SELECT COUNT(*) FROM users", [], |r| r.get(0))?;
    let open_loans: i64 = conn.query_row("SELECT COUNT(*) FROM loans", [], |r| r.get(0))?;
    let completed_loans: i64 =
        conn.query_row("SELECT COUNT(*) FROM loan_history", [], |r| r.get(0))?;
    let waitlisted: i64 = conn.query_row("SELECT COUNT(*) FROM waitlist", [], |r| r.get(0))?;

    Ok(CirculationStats {
        titles,
        copies_owned,
        users,
        open_loans,
        completed_loans,
        waitlisted,
    })
}

/// Summary statistics for the branch.
#[derive(Debug)]
pub struct CirculationStats {
    pub titles: i64,
    pub copies_owned: i64,
    pub users: i64,
    pub open_loans: i64,
    pub completed_loans: i64,
    pub waitlisted: i64,
}

// ── Row Mapping Helpers ─────────────────────────────────────────────────────

fn row_to_book(row: &rusqlite::Row<'_>) -> rusqlite::Result<Book> {
    Ok(Book {
        isbn: row.get(0)?,
        title: row.get(1)?,
        author: row.get(2)?,
        publication_year: row.get(3)?,
        publisher: row.get(4)?,
        num_owned: row.get(5)?,
    })
}

fn row_to_user(row: &rusqlite::Row<'_>) -> rusqlite::Result<User> {
    Ok(User {
        account_id: row.get(0)?,
        name: row.get(1)?,
        address: row.get(2)?,
        phone_number: row.get(3)?,
        email: row.get(4)?,
    })
}

fn row_to_loan(row: &rusqlite::Row<'_>) -> rusqlite::Result<Loan> {
    Ok(Loan {
        isbn: row.get(0)?,
        account_id: row.get(1)?,
        checkout_date: row.get(2)?,
        due_date: row.get(3)?,
    })
}

fn row_to_history(row: &rusqlite::Row<'_>) -> rusqlite::Result<LoanHistory> {
    Ok(LoanHistory {
        isbn: row.get(0)?,
        account_id: row.get(1)?,
        checkout_date: row.get(2)?,
        due_date: row.get(3)?,
        return_date: row.get(4)?,
    })
}

fn row_to_waitlist(row: &rusqlite::Row<'_>) -> rusqlite::Result<Waitlist> {
    Ok(Waitlist {
        isbn: row.get(0)?,
        account_id: row.get(1)?,
        place_in_line: row.get(2)?,
    })
}
