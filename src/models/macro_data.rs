use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::series::Dated;

/// One preprocessed macro period.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MacroObservation {
    pub date: NaiveDate,
    /// 10Y minus 2Y treasury yield.
    pub yield_spread: f64,
    /// Money-supply growth minus GDP growth.
    pub excess_liquidity: f64,
    #[serde(default)]
    pub pmi: Option<f64>,
    #[serde(default)]
    pub yield_10y: Option<f64>,
    #[serde(default)]
    pub yield_2y: Option<f64>,
    #[serde(default)]
    pub jobless_claims: Option<f64>,
}

impl MacroObservation {
    pub fn new(date: NaiveDate, yield_spread: f64, excess_liquidity: f64) -> Self {
        Self {
            date,
            yield_spread,
            excess_liquidity,
            pmi: None,
            yield_10y: None,
            yield_2y: None,
            jobless_claims: None,
        }
    }

    pub fn with_pmi(mut self, pmi: f64) -> Self {
        self.pmi = Some(pmi);
        self
    }

    pub fn with_yields(mut self, yield_10y: f64, yield_2y: f64) -> Self {
        self.yield_10y = Some(yield_10y);
        self.yield_2y = Some(yield_2y);
        self
    }

    pub fn with_jobless_claims(mut self, claims: f64) -> Self {
        self.jobless_claims = Some(claims);
        self
    }
}

/// Macro period with its derived risk multiplier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MacroRecord {
    pub date: NaiveDate,
    pub yield_spread: f64,
    pub excess_liquidity: f64,
    pub pmi: f64,
    pub macro_factor: f64,
}

/// A single raw value from an external series (FRED CSV row).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawObservation {
    pub date: NaiveDate,
    pub value: Option<f64>,
}

impl Dated for MacroObservation {
    fn date(&self) -> NaiveDate {
        self.date
    }
}

impl Dated for MacroRecord {
    fn date(&self) -> NaiveDate {
        self.date
    }
}

impl Dated for RawObservation {
    fn date(&self) -> NaiveDate {
        self.date
    }
}
