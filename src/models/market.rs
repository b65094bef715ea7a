use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::series::Dated;

/// Index close price at a point in time.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PricePoint {
    pub date: NaiveDate,
    pub close: f64,
}

impl PricePoint {
    pub fn new(date: NaiveDate, close: f64) -> Self {
        Self { date, close }
    }
}

/// Monthly market period with mean-reversion estimate and trend filter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketRecord {
    pub date: NaiveDate,
    pub close: f64,
    pub ma24: Option<f64>,
    pub bias: Option<f64>,
    pub expected_return: f64,
    pub trend_signal: bool,
}

impl Dated for PricePoint {
    fn date(&self) -> NaiveDate {
        self.date
    }
}

impl Dated for MarketRecord {
    fn date(&self) -> NaiveDate {
        self.date
    }
}
