//! CSV persistence for raw inputs and computed series under the data directory.

use chrono::NaiveDate;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fs::{self, File};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

use crate::error::EngineError;
use crate::models::backtest::BacktestRow;
use crate::models::breadth::{BreadthPoint, BreadthRecord};
use crate::models::macro_data::{MacroObservation, MacroRecord, RawObservation};
use crate::models::market::{MarketRecord, PricePoint};
use crate::models::signal::FusedRecord;
use crate::services::fred::FredSeries;
use crate::services::preprocess::RawMacroSeries;

/// Accepted headers for the market close column, in preference order.
pub const CLOSE_ALIASES: [&str; 4] = ["Close", "close", "Adj Close", "adj_close"];
const DATE_ALIASES: [&str; 3] = ["date", "Date", "DATE"];
/// ISM PMI is not published on FRED; drop a `date,value` file here to supply it.
pub const PMI_RAW_NAME: &str = "pmi";

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("failed to access {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to process CSV {path}: {source}")]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("{path} line {line}: {message}")]
    InvalidRow {
        path: PathBuf,
        line: u64,
        message: String,
    },

    #[error(transparent)]
    Engine(#[from] EngineError),
}

#[derive(Debug, Deserialize)]
struct BreadthPriceRow {
    date: NaiveDate,
    cap_price: Option<f64>,
    equal_price: Option<f64>,
}

/// File-backed store rooted at `DATA_DIR`.
#[derive(Debug, Clone)]
pub struct DataStore {
    root: PathBuf,
}

impl DataStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn raw_path(&self, name: &str) -> PathBuf {
        self.root.join("raw").join(format!("{}.csv", name))
    }

    pub fn processed_path(&self, name: &str) -> PathBuf {
        self.root.join("processed").join(format!("{}.csv", name))
    }

    pub fn ensure_dirs(&self) -> Result<(), StoreError> {
        for dir in [self.root.join("raw"), self.root.join("processed")] {
            fs::create_dir_all(&dir).map_err(|source| StoreError::Io { path: dir, source })?;
        }
        Ok(())
    }

    pub fn write_raw(&self, series: FredSeries, rows: &[RawObservation]) -> Result<(), StoreError> {
        write_csv(&self.raw_path(series.name()), rows)
    }

    /// Raw series by file stem; a missing file reads as an empty series.
    pub fn load_raw(&self, name: &str) -> Result<Vec<RawObservation>, StoreError> {
        let path = self.raw_path(name);
        if !path.exists() {
            return Ok(Vec::new());
        }
        let mut rows: Vec<RawObservation> = read_csv(&path)?;
        rows.sort_by_key(|r| r.date);
        Ok(rows)
    }

    pub fn load_raw_macro(&self) -> Result<RawMacroSeries, StoreError> {
        Ok(RawMacroSeries {
            m2: self.load_raw(FredSeries::MoneySupply.name())?,
            gdp: self.load_raw(FredSeries::Gdp.name())?,
            yield_10y: self.load_raw(FredSeries::Yield10Y.name())?,
            yield_2y: self.load_raw(FredSeries::Yield2Y.name())?,
            jobless_claims: self.load_raw(FredSeries::JoblessClaims.name())?,
            yield_spread: self.load_raw(FredSeries::YieldSpread.name())?,
            pmi: self.load_raw(PMI_RAW_NAME)?,
        })
    }

    pub fn write_macro_observations(&self, rows: &[MacroObservation]) -> Result<(), StoreError> {
        write_csv(&self.processed_path("macro"), rows)
    }

    pub fn load_macro_observations(&self) -> Result<Vec<MacroObservation>, StoreError> {
        read_csv(&self.processed_path("macro"))
    }

    pub fn write_market_prices(&self, rows: &[PricePoint]) -> Result<(), StoreError> {
        write_csv(&self.processed_path("market_prices"), rows)
    }

    pub fn write_breadth_prices(&self, rows: &[BreadthPoint]) -> Result<(), StoreError> {
        write_csv(&self.processed_path("breadth_prices"), rows)
    }

    /// Market closes, resolving the close column through [`CLOSE_ALIASES`].
    ///
    /// Rows with a blank close are skipped.
    pub fn load_market_prices(&self) -> Result<Vec<PricePoint>, StoreError> {
        let path = self.processed_path("market_prices");
        let mut reader = open_reader(&path)?;
        let headers = reader
            .headers()
            .map_err(|source| StoreError::Csv {
                path: path.clone(),
                source,
            })?
            .clone();

        let date_idx = headers
            .iter()
            .position(|h| DATE_ALIASES.contains(&h))
            .ok_or(EngineError::MissingColumn {
                series: "market",
                column: "date",
            })?;
        let close_idx = CLOSE_ALIASES
            .iter()
            .find_map(|alias| headers.iter().position(|h| h == *alias))
            .ok_or(EngineError::MissingColumn {
                series: "market",
                column: "close",
            })?;

        let mut prices = Vec::new();
        for record in reader.records() {
            let record = record.map_err(|source| StoreError::Csv {
                path: path.clone(),
                source,
            })?;
            let line = record.position().map(|p| p.line()).unwrap_or_default();
            let close = match record.get(close_idx).map(str::trim) {
                Some("") | None => continue,
                Some(raw) => raw.parse::<f64>().map_err(|e| StoreError::InvalidRow {
                    path: path.clone(),
                    line,
                    message: format!("bad close '{}': {}", raw, e),
                })?,
            };
            let raw_date = record.get(date_idx).unwrap_or_default();
            let date = parse_date(raw_date).ok_or_else(|| StoreError::InvalidRow {
                path: path.clone(),
                line,
                message: format!("bad date '{}'", raw_date),
            })?;
            prices.push(PricePoint::new(date, close));
        }
        prices.sort_by_key(|p| p.date);
        debug!(rows = prices.len(), "Loaded market prices");
        Ok(prices)
    }

    /// Breadth prices; a missing file is an empty series.
    pub fn load_breadth_prices(&self) -> Result<Vec<BreadthPoint>, StoreError> {
        let path = self.processed_path("breadth_prices");
        if !path.exists() {
            return Ok(Vec::new());
        }
        let rows: Vec<BreadthPriceRow> = read_csv(&path)?;
        let mut points: Vec<BreadthPoint> = rows
            .into_iter()
            .filter_map(|r| match (r.cap_price, r.equal_price) {
                (Some(cap), Some(equal)) => Some(BreadthPoint::new(r.date, cap, equal)),
                _ => None,
            })
            .collect();
        points.sort_by_key(|p| p.date);
        Ok(points)
    }

    pub fn write_macro_factors(&self, rows: &[MacroRecord]) -> Result<(), StoreError> {
        write_csv(&self.processed_path("macro_factor"), rows)
    }

    pub fn write_market_records(&self, rows: &[MarketRecord]) -> Result<(), StoreError> {
        write_csv(&self.processed_path("market_return"), rows)
    }

    pub fn write_breadth_records(&self, rows: &[BreadthRecord]) -> Result<(), StoreError> {
        write_csv(&self.processed_path("breadth"), rows)
    }

    pub fn write_fused(&self, rows: &[FusedRecord]) -> Result<(), StoreError> {
        write_csv(&self.processed_path("final_signal"), rows)
    }

    pub fn load_fused(&self) -> Result<Vec<FusedRecord>, StoreError> {
        read_csv(&self.processed_path("final_signal"))
    }

    pub fn write_backtest(&self, rows: &[BacktestRow]) -> Result<(), StoreError> {
        write_csv(&self.processed_path("backtest"), rows)
    }
}

fn parse_date(raw: &str) -> Option<NaiveDate> {
    let trimmed = raw.trim();
    let day = trimmed.get(..10).unwrap_or(trimmed);
    NaiveDate::parse_from_str(day, "%Y-%m-%d").ok()
}

fn open_reader(path: &Path) -> Result<csv::Reader<File>, StoreError> {
    let file = File::open(path).map_err(|source| StoreError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(file))
}

fn read_csv<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>, StoreError> {
    let mut reader = open_reader(path)?;
    reader
        .deserialize()
        .collect::<Result<Vec<T>, csv::Error>>()
        .map_err(|source| StoreError::Csv {
            path: path.to_path_buf(),
            source,
        })
}

fn write_csv<T: Serialize>(path: &Path, rows: &[T]) -> Result<(), StoreError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|source| StoreError::Io {
            path: parent.to_path_buf(),
            source,
        })?;
    }
    let csv_err = |source| StoreError::Csv {
        path: path.to_path_buf(),
        source,
    };
    let mut writer = csv::Writer::from_path(path).map_err(csv_err)?;
    for row in rows {
        writer.serialize(row).map_err(csv_err)?;
    }
    writer.flush().map_err(|source| StoreError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(())
}
