//! Dynamic WHERE-clause construction for the search queries.
//!
//! Each search pushes its entity's columns in declaration order; a `None`
//! value contributes no predicate. Clauses are AND-combined and parameters
//! are positionally bound, never interpolated.

use circ_records::MatchMode;
use rusqlite::types::ToSql;

/// An ordered predicate list plus the parameters it binds.
pub(crate) struct Predicates {
    clauses: Vec<String>,
    params: Vec<Box<dyn ToSql>>,
}

impl Predicates {
    pub fn new() -> Self {
        Self {
            clauses: Vec::new(),
            params: Vec::new(),
        }
    }

    /// Match a text column exactly, or as a `LIKE` pattern in pattern mode.
    pub fn text(&mut self, column: &str, value: Option<&str>, mode: MatchMode) {
        if let Some(value) = value {
            let op = match mode {
                MatchMode::Exact => "=",
                MatchMode::Pattern => "LIKE",
            };
            self.clauses.push(format!("{column} {op} ?"));
            self.params.push(Box::new(value.to_string()));
        }
    }

    /// Match a non-text column exactly.
    pub fn eq<T: ToSql + 'static>(&mut self, column: &str, value: Option<T>) {
        if let Some(value) = value {
            self.clauses.push(format!("{column} = ?"));
            self.params.push(Box::new(value));
        }
    }

    /// Inclusive numeric bounds; either side may be absent independently.
    pub fn range<T: ToSql + 'static>(&mut self, column: &str, min: Option<T>, max: Option<T>) {
        if let Some(min) = min {
            self.clauses.push(format!("{column} >= ?"));
            self.params.push(Box::new(min));
        }
        if let Some(max) = max {
            self.clauses.push(format!("{column} <= ?"));
            self.params.push(Box::new(max));
        }
    }

    /// Inclusive ISO-8601 date bounds; lexicographic order is date order.
    pub fn date_range(&mut self, column: &str, min: Option<&str>, max: Option<&str>) {
        self.range(column, min.map(str::to_string), max.map(str::to_string));
    }

    /// Append the WHERE clause to `base`. With no predicates, `base` is
    /// returned untouched; an unfiltered search returns every row.
    pub fn sql(&self, base: &str) -> String {
        if self.clauses.is_empty() {
            base.to_string()
        } else {
            format!("{base} WHERE {}", self.clauses.join(" AND "))
        }
    }

    /// Bound parameters, in the order their clauses were pushed.
    pub fn params(&self) -> Vec<&dyn ToSql> {
        self.params.iter().map(|p| p.as_ref()).collect()
    }
}
