use chrono::NaiveDate;
use core_types::{Month, PriceRecord};
use serde::{Deserialize, Serialize};

use crate::correlation::CorrelationMatrix;
use crate::engine::AnalyticsEngine;
use crate::error::AnalyticsError;

/// A price record with every per-row metric attached.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EnrichedRecord {
    #[serde(flatten)]
    pub price: PriceRecord,
    pub sector: String,
    /// Fractional change against the ticker's previous observation.
    /// `None` on the ticker's first observation.
    pub daily_return: Option<f64>,
    /// Compounded growth since the ticker's first observation, minus one.
    pub cumulative_return: f64,
    pub month: Month,
    /// The ticker's first-to-last return, repeated on every one of its rows.
    pub yearly_return: f64,
}

/// One row per ticker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TickerSummary {
    pub ticker: String,
    pub sector: String,
    pub observations: usize,
    pub first_date: NaiveDate,
    pub last_date: NaiveDate,
    pub first_close: f64,
    pub last_close: f64,
    pub yearly_return: f64,
    pub final_cumulative_return: f64,
}

/// Unweighted mean yearly return of the tickers in one sector.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SectorSummary {
    pub sector: String,
    pub average_yearly_return: f64,
    pub tickers: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VolatilityEntry {
    pub ticker: String,
    pub sector: String,
    /// Sample standard deviation of the daily returns.
    pub volatility: f64,
    /// Number of daily returns the deviation was computed over.
    pub observations: usize,
}

/// A ticker's return within a single calendar month.
///
/// The field order is the column order of the monthly CSV export.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthlySummary {
    pub ticker: String,
    pub first: f64,
    pub last: f64,
    pub monthly_return: f64,
}

/// Everything the metrics pipeline derives from one load.
///
/// Rebuilt from scratch on every load; nothing in here is cached.
#[derive(Debug, Clone, Serialize)]
pub struct Metrics {
    /// All records, stably sorted by date.
    pub records: Vec<EnrichedRecord>,
    /// Sorted by ticker.
    pub tickers: Vec<TickerSummary>,
    /// Sorted by average yearly return, best first.
    pub sectors: Vec<SectorSummary>,
    /// Every ticker with at least two daily returns, most volatile first.
    pub volatility: Vec<VolatilityEntry>,
    pub correlation: CorrelationMatrix,
    /// Distinct months present in the data, in chronological order.
    pub months: Vec<Month>,
}

impl Metrics {
    /// Resolves the month selector: the requested month if it has data,
    /// otherwise the earliest month when nothing was requested.
    pub fn select_month(&self, requested: Option<Month>) -> Result<Month, AnalyticsError> {
        match requested {
            Some(month) if self.months.contains(&month) => Ok(month),
            Some(month) => Err(AnalyticsError::UnknownMonth(month)),
            None => self
                .months
                .first()
                .copied()
                .ok_or_else(|| AnalyticsError::NotEnoughData("no months to select from".to_string())),
        }
    }

    /// Per-ticker returns for one month, best first.
    pub fn monthly(&self, month: Month) -> Result<Vec<MonthlySummary>, AnalyticsError> {
        if !self.months.contains(&month) {
            return Err(AnalyticsError::UnknownMonth(month));
        }
        AnalyticsEngine::new().monthly_summary(&self.records, month)
    }

    pub fn ticker(&self, ticker: &str) -> Option<&TickerSummary> {
        self.tickers
            .binary_search_by(|summary| summary.ticker.as_str().cmp(ticker))
            .ok()
            .map(|idx| &self.tickers[idx])
    }
}
