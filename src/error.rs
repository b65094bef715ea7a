//! Error and diagnostic types shared by the engines.

use chrono::NaiveDate;
use serde::Serialize;
use thiserror::Error;

/// Fatal input-validation failures raised by the core engines.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EngineError {
    #[error("{series} series is missing required column `{column}`")]
    MissingColumn {
        series: &'static str,
        column: &'static str,
    },

    #[error("{series} series has no usable rows")]
    EmptySeries { series: &'static str },

    #[error("{series} series contains duplicate date {date}")]
    DuplicateDate {
        series: &'static str,
        date: NaiveDate,
    },

    #[error("{series} series is out of order at {date}")]
    OutOfOrder {
        series: &'static str,
        date: NaiveDate,
    },

    #[error("{series} series has a non-positive or non-finite `{column}` at {date}")]
    InvalidValue {
        series: &'static str,
        column: &'static str,
        date: NaiveDate,
    },
}

/// Non-fatal conditions resolved through a documented default.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Diagnostic {
    /// Not enough periods for a rolling statistic; `rows` were defaulted or dropped.
    InsufficientHistory {
        stage: &'static str,
        rows: usize,
        default: &'static str,
    },
    /// Zero or undefined standard deviation; Sharpe reported as 0.
    DegenerateSharpe { series: &'static str },
}

impl std::fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Diagnostic::InsufficientHistory {
                stage,
                rows,
                default,
            } => write!(
                f,
                "{}: insufficient history for {} rows ({})",
                stage, rows, default
            ),
            Diagnostic::DegenerateSharpe { series } => {
                write!(f, "{}: zero return deviation, sharpe set to 0", series)
            }
        }
    }
}
