use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::series::Dated;

/// Market-health classification from cap-weighted vs equal-weighted returns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum BreadthSignal {
    Healthy,
    /// Large caps rising while the equal-weighted index falls.
    Fragile,
    Weak,
}

impl BreadthSignal {
    pub fn as_str(&self) -> &'static str {
        match self {
            BreadthSignal::Healthy => "HEALTHY",
            BreadthSignal::Fragile => "FRAGILE",
            BreadthSignal::Weak => "WEAK",
        }
    }
}

impl fmt::Display for BreadthSignal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BreadthSignal {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "HEALTHY" => Ok(BreadthSignal::Healthy),
            "FRAGILE" => Ok(BreadthSignal::Fragile),
            "WEAK" => Ok(BreadthSignal::Weak),
            other => Err(format!("unknown breadth signal: {}", other)),
        }
    }
}

/// Cap-weighted and equal-weighted index prices on the same date.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BreadthPoint {
    pub date: NaiveDate,
    pub cap_price: f64,
    pub equal_price: f64,
}

impl BreadthPoint {
    pub fn new(date: NaiveDate, cap_price: f64, equal_price: f64) -> Self {
        Self {
            date,
            cap_price,
            equal_price,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BreadthRecord {
    pub date: NaiveDate,
    pub cap_return: f64,
    pub equal_return: f64,
    pub breadth_signal: BreadthSignal,
}

impl Dated for BreadthPoint {
    fn date(&self) -> NaiveDate {
        self.date
    }
}

impl Dated for BreadthRecord {
    fn date(&self) -> NaiveDate {
        self.date
    }
}
