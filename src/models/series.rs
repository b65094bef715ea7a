//! Dated series helpers: ordering validation and the as-of backward cursor.

use crate::error::{Diagnostic, EngineError};
use chrono::NaiveDate;

/// Anything keyed by a period date.
pub trait Dated {
    fn date(&self) -> NaiveDate;
}

/// Engine output together with the defaults it had to apply.
#[derive(Debug, Clone)]
pub struct Evaluated<T> {
    pub records: Vec<T>,
    pub diagnostics: Vec<Diagnostic>,
}

impl<T> Evaluated<T> {
    pub fn new(records: Vec<T>) -> Self {
        Self {
            records,
            diagnostics: Vec::new(),
        }
    }

    pub fn with_diagnostic(mut self, diagnostic: Diagnostic) -> Self {
        self.diagnostics.push(diagnostic);
        self
    }
}

/// Reject duplicate or descending dates.
pub fn validate_series<T: Dated>(series: &'static str, rows: &[T]) -> Result<(), EngineError> {
    for pair in rows.windows(2) {
        let (prev, next) = (pair[0].date(), pair[1].date());
        if next == prev {
            return Err(EngineError::DuplicateDate { series, date: next });
        }
        if next < prev {
            return Err(EngineError::OutOfOrder { series, date: next });
        }
    }
    Ok(())
}

/// Two-pointer as-of backward lookup over an ascending series.
///
/// Queries must be issued in non-decreasing date order; each call returns the
/// most recent row dated at or before the query date.
pub struct AsOfCursor<'a, T> {
    rows: &'a [T],
    next: usize,
}

impl<'a, T: Dated> AsOfCursor<'a, T> {
    pub fn new(rows: &'a [T]) -> Self {
        Self { rows, next: 0 }
    }

    pub fn seek(&mut self, date: NaiveDate) -> Option<&'a T> {
        while self.next < self.rows.len() && self.rows[self.next].date() <= date {
            self.next += 1;
        }
        match self.next {
            0 => None,
            n => Some(&self.rows[n - 1]),
        }
    }
}
