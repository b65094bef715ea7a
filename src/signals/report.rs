//! Market diagnosis for the most recent fused period.

use chrono::NaiveDate;
use serde::Serialize;
use std::fmt;

use crate::models::signal::{FusedRecord, Signal};
use crate::signals::decision::BULL_MACRO_CONFIRMATION;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MarketReport {
    pub date: NaiveDate,
    pub macro_factor: f64,
    pub macro_safe: bool,
    pub final_return: f64,
    pub signal: Signal,
    pub recommended_exposure: f64,
    pub reason: &'static str,
}

impl MarketReport {
    pub fn from_fused(records: &[FusedRecord]) -> Option<Self> {
        let latest = records.last()?;
        Some(Self {
            date: latest.date,
            macro_factor: latest.macro_factor,
            macro_safe: latest.macro_factor >= BULL_MACRO_CONFIRMATION,
            final_return: latest.final_return,
            signal: latest.signal,
            recommended_exposure: latest.signal.exposure(),
            reason: latest.rule.description(),
        })
    }

    fn instruction(&self) -> &'static str {
        match self.signal {
            Signal::Bull => "2.0x leveraged index exposure",
            Signal::Neutral => "1.0x spot index exposure",
            Signal::Bear => "0.0x, hold cash",
        }
    }
}

impl fmt::Display for MarketReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", "=".repeat(60))?;
        writeln!(f, " Market diagnosis as of {}", self.date)?;
        writeln!(f, "{}", "=".repeat(60))?;
        writeln!(
            f,
            " Macro factor    : {:.2} ({})",
            self.macro_factor,
            if self.macro_safe { "SAFE" } else { "DANGER" }
        )?;
        writeln!(f, " Adjusted return : {:.2}%", self.final_return * 100.0)?;
        writeln!(f, " Signal          : {} ({})", self.signal, self.reason)?;
        writeln!(f, "{}", "-".repeat(60))?;
        writeln!(f, " Recommendation  : {}", self.instruction())?;
        write!(f, "{}", "=".repeat(60))
    }
}
