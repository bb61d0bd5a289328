//! Mutating operations for the circulation database.

use circ_records::{Book, BookUpdate, User, UserUpdate};
use rusqlite::types::ToSql;
use rusqlite::{params, Connection};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum OperationError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("Entity not found: {entity_type} with id '{id}'")]
    NotFound { entity_type: String, id: String },
}

// ── Book Operations ─────────────────────────────────────────────────────────

/// Insert a new book. All fields are expected to be populated.
pub fn add_book(conn: &Connection, book: &Book) -> Result<(), OperationError> {
    conn.execute(
        "INSERT INTO books (isbn, title, author, publication_year, publisher, num_owned)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        params![
            book.isbn,
            book.title,
            book.author,
            book.publication_year,
            book.publisher,
            book.num_owned,
        ],
    )?;
    Ok(())
}

/// Apply the populated fields of `update` to the book keyed by `isbn`.
///
/// The all-`None` update issues no statement and succeeds.
pub fn update_book(
    conn: &Connection,
    isbn: &str,
    update: &BookUpdate,
) -> Result<(), OperationError> {
    let mut sets: Vec<&str> = Vec::new();
    let mut values: Vec<Box<dyn ToSql>> = Vec::new();

    if let Some(new_isbn) = update.isbn {
        sets.push("isbn = ?");
        values.push(Box::new(new_isbn.to_string()));
    }
    if let Some(title) = update.title {
        sets.push("title = ?");
        values.push(Box::new(title.to_string()));
    }
    if let Some(author) = update.author {
        sets.push("author = ?");
        values.push(Box::new(author.to_string()));
    }
    if let Some(year) = update.publication_year {
        sets.push("publication_year = ?");
        values.push(Box::new(year));
    }
    if let Some(publisher) = update.publisher {
        sets.push("publisher = ?");
        values.push(Box::new(publisher.to_string()));
    }
    if let Some(num_owned) = update.num_owned {
        sets.push("num_owned = ?");
        values.push(Box::new(num_owned));
    }

    if sets.is_empty() {
        return Ok(());
    }

    values.push(Box::new(isbn.to_string()));
    let sql = format!("UPDATE books SET {} WHERE isbn = ?", sets.join(", "));
    let bound: Vec<&dyn ToSql> = values.iter().map(|v| v.as_ref()).collect();
    let changed = conn.execute(&sql, bound.as_slice())?;
    if changed == 0 {
        return Err(OperationError::NotFound {
            entity_type: "book".to_string(),
            id: isbn.to_string(),
        });
    }
    Ok(())
}

/// Delete a book. Fails while loans or waitlist entries still reference it.
pub fn remove_book(conn: &Connection, isbn: &str) -> Result<(), OperationError> {
    let changed = conn.execute("DELETE FROM books WHERE isbn = ?1", params![isbn])?;
    if changed == 0 {
        return Err(OperationError::NotFound {
            entity_type: "book".to_string(),
            id: isbn.to_string(),
        });
    }
    Ok(())
}

// ── User Operations ─────────────────────────────────────────────────────────

/// Insert a new user. All fields are expected to be populated.
pub fn add_user(conn: &Connection, user: &User) -> Result<(), OperationError> {
    conn.execute(
        "INSERT INTO users (account_id, name, address, phone_number, email)
         VALUES (?1, ?2, ?3, ?4, ?5)",
        params![
            user.account_id,
            user.name,
            user.address,
            user.phone_number,
            user.email,
        ],
    )?;
    Ok(())
}

/// Apply the populated fields of `update` to the user keyed by `account_id`.
///
/// The all-`None` update issues no statement and succeeds.
pub fn update_user(
    conn: &Connection,
    account_id: &str,
    update: &UserUpdate,
) -> Result<(), OperationError> {
    let mut sets: Vec<&str> = Vec::new();
    let mut values: Vec<Box<dyn ToSql>> = Vec::new();

    if let Some(new_account_id) = update.account_id {
        sets.push("account_id = ?");
        values.push(Box::new(new_account_id.to_string()));
    }
    if let Some(name) = update.name {
        sets.push("name = ?");
        values.push(Box::new(name.to_string()));
    }
    if let Some(address) = update.address {
        sets.push("address = ?");
        values.push(Box::new(address.to_string()));
    }
    if let Some(phone_number) = update.phone_number {
        sets.push("phone_number = ?");
        values.push(Box::new(phone_number.to_string()));
    }
    if let Some(email) = update.email {
        sets.push("email = ?");
        values.push(Box::new(email.to_string()));
    }

    if sets.is_empty() {
        return Ok(());
    }

    values.push(Box::new(account_id.to_string()));
    let sql = format!("UPDATE users SET {} WHERE account_id = ?", sets.join(", "));
    let bound: Vec<&dyn ToSql> = values.iter().map(|v| v.as_ref()).collect();
    let changed = conn.execute(&sql, bound.as_slice())?;
    if changed == 0 {
        return Err(OperationError::NotFound {
            entity_type: "user".to_string(),
            id: account_id.to_string(),
        });
    }
    Ok(())
}

/// Delete a user. Fails while loans or waitlist entries still reference them.
pub fn remove_user(conn: &Connection, account_id: &str) -> Result<(), OperationError> {
    let changed = conn.execute(
        "DELETE FROM users WHERE account_id = ?1",
        params![account_id],
    )?;
    if changed == 0 {
        return Err(OperationError::NotFound {
            entity_type: "user".to_string(),
            id: account_id.to_string(),
        });
    }
    Ok(())
}

// ── Loan Operations ─────────────────────────────────────────────────────────

/// Open a loan for the pair. The checkout date is today and the due date
/// fourteen days out, both computed by the database at execution time.
/// A second open loan for the same pair violates the primary key.
pub fn checkout_book(conn: &Connection, isbn: &str, account_id: &str) -> Result<(), OperationError> {
    conn.execute(
        "INSERT INTO loans (isbn, account_id, checkout_date, due_date)
         VALUES (?1, ?2, date('now'), date('now', '+14 days'))",
        params![isbn, account_id],
    )?;
    Ok(())
}

/// Archive the pair's open loan(s) into history with today's return date,
/// then delete the loan row(s). A pair with no open loan is a no-op.
pub fn return_book(conn: &Connection, isbn: &str, account_id: &str) -> Result<(), OperationError> {
    let archived = conn.execute(
        "INSERT INTO loan_history (isbn, account_id, checkout_date, due_date, return_date)
         SELECT isbn, account_id, checkout_date, due_date, date('now')
         FROM loans
         WHERE isbn = ?1 AND account_id = ?2",
        params![isbn, account_id],
    )?;
    conn.execute(
        "DELETE FROM loans WHERE isbn = ?1 AND account_id = ?2",
        params![isbn, account_id],
    )?;
    log::debug!("archived {archived} returned loan(s) for isbn {isbn}, account {account_id}");
    Ok(())
}

/// Push the due date of the pair's open loan(s) out by fourteen days.
pub fn grant_extension(
    conn: &Connection,
    isbn: &str,
    account_id: &str,
) -> Result<(), OperationError> {
    conn.execute(
        "UPDATE loans
         SET due_date = date(due_date, '+14 days')
         WHERE isbn = ?1 AND account_id = ?2",
        params![isbn, account_id],
    )?;
    Ok(())
}

// ── Waitlist Operations ─────────────────────────────────────────────────────

/// Add a user to a book's waitlist and return their assigned rank.
///
/// Rank assignment reads the current maximum and inserts max+1 as two
/// statements. With a single writer this is safe; concurrent writers can
/// be assigned the same rank unless the caller wraps this in an immediate
/// transaction.
pub fn join_waitlist(
    conn: &Connection,
    isbn: &str,
    account_id: &str,
) -> Result<i64, OperationError> {
    let current_max: i64 = conn.query_row(
        "SELECT COALESCE(MAX(place_in_line), 0) FROM waitlist WHERE isbn = ?1",
        params![isbn],
        |row| row.get(0),
    )?;
    let rank = current_max + 1;
    conn.execute(
        "INSERT INTO waitlist (isbn, account_id, place_in_line)
         VALUES (?1, ?2, ?3)",
        params![isbn, account_id, rank],
    )?;
    log::debug!("waitlisted account {account_id} for isbn {isbn} at rank {rank}");
    Ok(rank)
}

/// Serve the front of a book's waitlist: remove rank 1 and shift every
/// remaining rank down by one. Same single-writer caveat as
/// [`join_waitlist`]. An empty waitlist is a no-op.
pub fn advance_waitlist(conn: &Connection, isbn: &str) -> Result<(), OperationError> {
    conn.execute(
        "DELETE FROM waitlist WHERE isbn = ?1 AND place_in_line = 1",
        params![isbn],
    )?;
    conn.execute(
        "UPDATE waitlist
         SET place_in_line = place_in_line - 1
         WHERE isbn = ?1 AND place_in_line > 1",
        params![isbn],
    )?;
    Ok(())
}

/// Drop a user from a book's waitlist at any rank, closing the gap so the
/// remaining ranks stay a dense 1..n sequence.
pub fn leave_waitlist(
    conn: &Connection,
    isbn: &str,
    account_id: &str,
) -> Result<(), OperationError> {
    let rank = match conn.query_row(
        "SELECT place_in_line FROM waitlist WHERE isbn = ?1 AND account_id = ?2",
        params![isbn, account_id],
        |row| row.get::<_, i64>(0),
    ) {
        Ok(rank) => rank,
        Err(rusqlite::Error::QueryReturnedNoRows) => {
            return Err(OperationError::NotFound {
                entity_type: "waitlist entry".to_string(),
                id: format!("{isbn}/{account_id}"),
            });
        }
        Err(e) => return Err(e.into()),
    };

    conn.execute(
        "DELETE FROM waitlist WHERE isbn = ?1 AND account_id = ?2",
        params![isbn, account_id],
    )?;
    conn.execute(
        "UPDATE waitlist
         SET place_in_line = place_in_line - 1
         WHERE isbn = ?1 AND place_in_line > ?2",
        params![isbn, rank],
    )?;
    Ok(())
}
