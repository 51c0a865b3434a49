//! Cross-ticker correlation of daily returns.
//!
//! # Forward-fill policy
//!
//! Closes are pivoted onto one shared date axis and every missing cell is
//! filled with that ticker's last known close. A ticker that did not trade on
//! a date therefore contributes a 0% return for it, which pulls its
//! correlation with everything else towards zero. Thinly traded tickers are
//! affected most. Leading cells (before a ticker's first observation) stay
//! empty, and any date with an empty cell is dropped from every column, so a
//! late listing shortens the window for the whole matrix.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashMap};

use crate::engine::close_to_f64;
use crate::error::AnalyticsError;
use crate::report::EnrichedRecord;
use crate::stats;

/// Pairwise Pearson correlation of the tickers' aligned daily returns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CorrelationMatrix {
    /// Row and column order, sorted.
    pub tickers: Vec<String>,
    /// `values[i][j]` is the correlation of `tickers[i]` and `tickers[j]`.
    /// `None` where a column has zero variance or too few aligned returns.
    /// The diagonal is always `1.0`.
    pub values: Vec<Vec<Option<f64>>>,
    /// Number of aligned return rows the coefficients were computed over.
    pub observations: usize,
}

impl CorrelationMatrix {
    pub fn get(&self, a: &str, b: &str) -> Option<f64> {
        let i = self.tickers.iter().position(|t| t == a)?;
        let j = self.tickers.iter().position(|t| t == b)?;
        self.values[i][j]
    }
}

/// Builds the correlation matrix from date-sorted enriched records.
///
/// Steps: pivot close onto date × ticker (duplicate cells averaged),
/// forward-fill, take row-over-row percent change, drop every row holding an
/// empty cell, then correlate the columns pairwise.
pub fn correlation_matrix(records: &[EnrichedRecord]) -> Result<CorrelationMatrix, AnalyticsError> {
    let tickers: Vec<String> = records
        .iter()
        .map(|r| r.price.ticker.clone())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();
    let column: HashMap<&str, usize> = tickers
        .iter()
        .enumerate()
        .map(|(idx, ticker)| (ticker.as_str(), idx))
        .collect();
    let width = tickers.len();

    // (sum, count) per cell so duplicate dates average out.
    let mut pivot: BTreeMap<NaiveDate, Vec<(f64, u32)>> = BTreeMap::new();
    for record in records {
        let close = close_to_f64(&record.price)?;
        let row = pivot
            .entry(record.price.date)
            .or_insert_with(|| vec![(0.0, 0); width]);
        let cell = &mut row[column[record.price.ticker.as_str()]];
        cell.0 += close;
        cell.1 += 1;
    }

    let mut last_known: Vec<Option<f64>> = vec![None; width];
    let filled: Vec<(NaiveDate, Vec<Option<f64>>)> = pivot
        .into_iter()
        .map(|(date, cells)| {
            for (slot, (sum, count)) in last_known.iter_mut().zip(cells) {
                if count > 0 {
                    *slot = Some(sum / f64::from(count));
                }
            }
            (date, last_known.clone())
        })
        .collect();

    let mut columns: Vec<Vec<f64>> = vec![Vec::new(); width];
    for pair in filled.windows(2) {
        let (prev_date, prev) = &pair[0];
        let (_, curr) = &pair[1];

        let mut row = Vec::with_capacity(width);
        for (idx, (before, after)) in prev.iter().zip(curr).enumerate() {
            let (Some(before), Some(after)) = (before, after) else {
                break;
            };
            if *before == 0.0 {
                return Err(AnalyticsError::ZeroPrice {
                    ticker: tickers[idx].clone(),
                    date: *prev_date,
                });
            }
            row.push((after - before) / before);
        }

        if row.len() == width {
            for (col, value) in columns.iter_mut().zip(row) {
                col.push(value);
            }
        }
    }

    let observations = columns.first().map_or(0, Vec::len);
    let values: Vec<Vec<Option<f64>>> = (0..width)
        .map(|i| {
            (0..width)
                .map(|j| {
                    if i == j {
                        Some(1.0)
                    } else {
                        stats::pearson(&columns[i], &columns[j])
                    }
                })
                .collect()
        })
        .collect();

    tracing::debug!(tickers = width, observations, "Correlation matrix computed.");

    Ok(CorrelationMatrix {
        tickers,
        values,
        observations,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::AnalyticsEngine;
    use approx::assert_relative_eq;
    use core_types::PriceRecord;
    use rust_decimal::Decimal;

    fn price(ticker: &str, day: u32, close: f64) -> PriceRecord {
        let close = Decimal::try_from(close).unwrap();
        PriceRecord {
            ticker: ticker.to_string(),
            date: NaiveDate::from_ymd_opt(2024, 1, day).unwrap(),
            open: close,
            high: close,
            low: close,
            close,
            volume: 0,
        }
    }

    fn matrix(prices: Vec<PriceRecord>) -> CorrelationMatrix {
        let enriched = AnalyticsEngine::new().enrich(prices).unwrap();
        correlation_matrix(&enriched).unwrap()
    }

    #[test]
    fn moving_together_correlates_fully() {
        let m = matrix(vec![
            price("a", 1, 10.0),
            price("a", 2, 11.0),
            price("a", 3, 10.0),
            price("a", 4, 12.0),
            price("b", 1, 20.0),
            price("b", 2, 22.0),
            price("b", 3, 20.0),
            price("b", 4, 24.0),
        ]);
        assert_eq!(m.observations, 3);
        assert_relative_eq!(m.get("a", "b").unwrap(), 1.0, epsilon = 1e-9);
        assert_eq!(m.get("a", "a"), Some(1.0));
    }

    #[test]
    fn late_listing_shortens_the_window() {
        // "b" starts on day 3, so days 1-3 have an empty or first cell for it.
        let m = matrix(vec![
            price("a", 1, 10.0),
            price("a", 2, 11.0),
            price("a", 3, 12.0),
            price("a", 4, 11.0),
            price("a", 5, 13.0),
            price("b", 3, 5.0),
            price("b", 4, 4.0),
            price("b", 5, 6.0),
        ]);
        assert_eq!(m.observations, 2);
    }

    #[test]
    fn missing_days_are_forward_filled() {
        // "b" skips day 3; its day-3 return is a carried-forward 0%.
        let m = matrix(vec![
            price("a", 1, 10.0),
            price("a", 2, 11.0),
            price("a", 3, 12.0),
            price("a", 4, 13.0),
            price("b", 1, 10.0),
            price("b", 2, 12.0),
            price("b", 4, 11.0),
        ]);
        assert_eq!(m.observations, 3);
        assert!(m.get("a", "b").is_some());
    }

    #[test]
    fn flat_series_has_undefined_off_diagonal() {
        let m = matrix(vec![
            price("a", 1, 10.0),
            price("a", 2, 11.0),
            price("a", 3, 9.9),
            price("b", 1, 5.0),
            price("b", 2, 5.0),
            price("b", 3, 5.0),
        ]);
        assert_eq!(m.get("a", "b"), None);
        assert_eq!(m.get("b", "b"), Some(1.0));
    }

    #[test]
    fn forward_filled_zero_close_is_rejected() {
        // "x" closes at zero on day 2 and is carried into day 3, where only "y" trades.
        let enriched = AnalyticsEngine::new()
            .enrich(vec![
                price("x", 1, 5.0),
                price("x", 2, 0.0),
                price("y", 1, 1.0),
                price("y", 2, 2.0),
                price("y", 3, 3.0),
            ])
            .unwrap();
        let err = correlation_matrix(&enriched).unwrap_err();
        match err {
            AnalyticsError::ZeroPrice { ticker, date } => {
                assert_eq!(ticker, "x");
                assert_eq!(date, NaiveDate::from_ymd_opt(2024, 1, 2).unwrap());
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
