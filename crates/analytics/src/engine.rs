use crate::correlation::correlation_matrix;
use crate::error::AnalyticsError;
use crate::report::{
    EnrichedRecord, Metrics, MonthlySummary, SectorSummary, TickerSummary, VolatilityEntry,
};
use crate::stats;
use core_types::{Month, PriceRecord, sector_for};
use rust_decimal::prelude::ToPrimitive;
use std::collections::{BTreeMap, BTreeSet, HashMap};

/// A stateless calculator for deriving return and volatility metrics from
/// daily price records.
#[derive(Debug, Default)]
pub struct AnalyticsEngine {}

/// Running state of one ticker while walking the records in date order.
struct RunningSeries {
    prev_close: f64,
    prev_date: chrono::NaiveDate,
    growth: f64,
}

impl AnalyticsEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// The main entry point: annotate, enrich and summarize one load.
    ///
    /// # Arguments
    ///
    /// * `records` - Every price record across all tickers, in any order.
    ///
    /// # Returns
    ///
    /// A `Result` containing the `Metrics` or an `AnalyticsError`.
    pub fn run(&self, records: Vec<PriceRecord>) -> Result<Metrics, AnalyticsError> {
        if records.is_empty() {
            return Err(AnalyticsError::NotEnoughData("no price records were loaded".to_string()));
        }

        let mut records = self.enrich(records)?;
        let tickers = self.ticker_summaries(&records)?;

        // Broadcast each ticker's yearly return onto its rows.
        let yearly: HashMap<&str, f64> = tickers
            .iter()
            .map(|t| (t.ticker.as_str(), t.yearly_return))
            .collect();
        for record in &mut records {
            if let Some(value) = yearly.get(record.price.ticker.as_str()) {
                record.yearly_return = *value;
            }
        }

        let sectors = self.sector_performance(&tickers);
        let volatility = self.volatility_ranking(&records);
        let correlation = correlation_matrix(&records)?;
        let months = self.available_months(&records);

        tracing::info!(
            records = records.len(),
            tickers = tickers.len(),
            sectors = sectors.len(),
            months = months.len(),
            "Metrics computed."
        );

        Ok(Metrics {
            records,
            tickers,
            sectors,
            volatility,
            correlation,
            months,
        })
    }

    /// Sorts records by date and attaches sector, month, daily return and
    /// cumulative return.
    ///
    /// The sort is stable and global; returns are computed per ticker, so each
    /// ticker's subsequence only needs to be chronological. A gap between two
    /// dates counts as a single step. `yearly_return` is left at zero here and
    /// filled in by `run`.
    pub fn enrich(&self, mut records: Vec<PriceRecord>) -> Result<Vec<EnrichedRecord>, AnalyticsError> {
        records.sort_by_key(|r| r.date);

        let mut running: HashMap<String, RunningSeries> = HashMap::new();
        let mut enriched = Vec::with_capacity(records.len());

        for price in records {
            let close = close_to_f64(&price)?;

            let (daily_return, growth) = match running.get_mut(&price.ticker) {
                None => {
                    running.insert(
                        price.ticker.clone(),
                        RunningSeries {
                            prev_close: close,
                            prev_date: price.date,
                            growth: 1.0,
                        },
                    );
                    (None, 1.0)
                }
                Some(series) => {
                    if series.prev_close == 0.0 {
                        return Err(AnalyticsError::ZeroPrice {
                            ticker: price.ticker.clone(),
                            date: series.prev_date,
                        });
                    }
                    let daily = (close - series.prev_close) / series.prev_close;
                    series.growth *= 1.0 + daily;
                    series.prev_close = close;
                    series.prev_date = price.date;
                    (Some(daily), series.growth)
                }
            };

            enriched.push(EnrichedRecord {
                sector: sector_for(&price.ticker).to_string(),
                month: Month::from_date(price.date),
                daily_return,
                cumulative_return: growth - 1.0,
                yearly_return: 0.0,
                price,
            });
        }

        Ok(enriched)
    }

    /// One summary per ticker from its chronologically first and last rows.
    ///
    /// Expects date-sorted records, as produced by `enrich`.
    pub fn ticker_summaries(&self, records: &[EnrichedRecord]) -> Result<Vec<TickerSummary>, AnalyticsError> {
        let mut by_ticker: BTreeMap<&str, (&EnrichedRecord, &EnrichedRecord, usize)> = BTreeMap::new();
        for record in records {
            by_ticker
                .entry(record.price.ticker.as_str())
                .and_modify(|(_, last, count)| {
                    *last = record;
                    *count += 1;
                })
                .or_insert((record, record, 1));
        }

        by_ticker
            .into_values()
            .map(|(first, last, observations)| -> Result<TickerSummary, AnalyticsError> {
                let first_close = close_to_f64(&first.price)?;
                let last_close = close_to_f64(&last.price)?;
                Ok(TickerSummary {
                    ticker: first.price.ticker.clone(),
                    sector: first.sector.clone(),
                    observations,
                    first_date: first.price.date,
                    last_date: last.price.date,
                    first_close,
                    last_close,
                    yearly_return: period_return(&first.price, first_close, last_close)?,
                    final_cumulative_return: last.cumulative_return,
                })
            })
            .collect()
    }

    /// Mean yearly return per sector, one vote per ticker regardless of how
    /// many rows it has. Best sector first.
    pub fn sector_performance(&self, tickers: &[TickerSummary]) -> Vec<SectorSummary> {
        let mut buckets: BTreeMap<&str, Vec<f64>> = BTreeMap::new();
        for summary in tickers {
            buckets
                .entry(summary.sector.as_str())
                .or_default()
                .push(summary.yearly_return);
        }

        let mut sectors: Vec<SectorSummary> = buckets
            .into_iter()
            .filter_map(|(sector, returns)| {
                stats::mean(&returns).map(|average| SectorSummary {
                    sector: sector.to_string(),
                    average_yearly_return: average,
                    tickers: returns.len(),
                })
            })
            .collect();

        sectors.sort_by(|a, b| {
            b.average_yearly_return
                .total_cmp(&a.average_yearly_return)
                .then_with(|| a.sector.cmp(&b.sector))
        });
        sectors
    }

    /// Tickers ranked by the sample standard deviation of their daily returns,
    /// most volatile first.
    ///
    /// Tickers with fewer than two daily returns have no defined deviation
    /// and are left out.
    pub fn volatility_ranking(&self, records: &[EnrichedRecord]) -> Vec<VolatilityEntry> {
        let mut returns: BTreeMap<&str, (&str, Vec<f64>)> = BTreeMap::new();
        for record in records {
            let entry = returns
                .entry(record.price.ticker.as_str())
                .or_insert_with(|| (record.sector.as_str(), Vec::new()));
            if let Some(daily) = record.daily_return {
                entry.1.push(daily);
            }
        }

        let mut ranking: Vec<VolatilityEntry> = returns
            .into_iter()
            .filter_map(|(ticker, (sector, series))| {
                stats::sample_std_dev(&series).map(|volatility| VolatilityEntry {
                    ticker: ticker.to_string(),
                    sector: sector.to_string(),
                    volatility,
                    observations: series.len(),
                })
            })
            .collect();

        ranking.sort_by(|a, b| {
            b.volatility
                .total_cmp(&a.volatility)
                .then_with(|| a.ticker.cmp(&b.ticker))
        });
        ranking
    }

    /// Per-ticker return within `month`, computed from that month's first and
    /// last close only. Tickers without a trading day in the month are absent.
    /// Best first.
    pub fn monthly_summary(
        &self,
        records: &[EnrichedRecord],
        month: Month,
    ) -> Result<Vec<MonthlySummary>, AnalyticsError> {
        let mut bounds: BTreeMap<&str, (&PriceRecord, &PriceRecord)> = BTreeMap::new();
        for record in records.iter().filter(|r| month.contains(r.price.date)) {
            bounds
                .entry(record.price.ticker.as_str())
                .and_modify(|(_, last)| *last = &record.price)
                .or_insert((&record.price, &record.price));
        }

        let mut rows = bounds
            .into_iter()
            .map(|(ticker, (first, last))| -> Result<MonthlySummary, AnalyticsError> {
                let first_close = close_to_f64(first)?;
                let last_close = close_to_f64(last)?;
                Ok(MonthlySummary {
                    ticker: ticker.to_string(),
                    first: first_close,
                    last: last_close,
                    monthly_return: period_return(first, first_close, last_close)?,
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        rows.sort_by(|a, b| {
            b.monthly_return
                .total_cmp(&a.monthly_return)
                .then_with(|| a.ticker.cmp(&b.ticker))
        });

        tracing::debug!(%month, tickers = rows.len(), "Monthly summary computed.");
        Ok(rows)
    }

    /// The sorted, de-duplicated months present in the data.
    pub fn available_months(&self, records: &[EnrichedRecord]) -> Vec<Month> {
        records
            .iter()
            .map(|r| r.month)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }
}

/// Converts a record's close to `f64` for the float-domain metrics.
pub(crate) fn close_to_f64(price: &PriceRecord) -> Result<f64, AnalyticsError> {
    price.close.to_f64().ok_or_else(|| AnalyticsError::Conversion {
        ticker: price.ticker.clone(),
        date: price.date,
    })
}

/// `(last - first) / first`, refusing a zero starting price.
fn period_return(first: &PriceRecord, first_close: f64, last_close: f64) -> Result<f64, AnalyticsError> {
    if first_close == 0.0 {
        return Err(AnalyticsError::ZeroPrice {
            ticker: first.ticker.clone(),
            date: first.date,
        });
    }
    Ok((last_close - first_close) / first_close)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use chrono::NaiveDate;
    use rust_decimal::Decimal;
    use std::str::FromStr;

    fn record(ticker: &str, date: (i32, u32, u32), close: &str) -> PriceRecord {
        let close = Decimal::from_str(close).unwrap();
        PriceRecord {
            ticker: ticker.to_string(),
            date: NaiveDate::from_ymd_opt(date.0, date.1, date.2).unwrap(),
            open: close,
            high: close,
            low: close,
            close,
            volume: 1_000,
        }
    }

    #[test]
    fn enrich_sorts_globally_and_computes_per_ticker() {
        // Deliberately out of order and interleaved.
        let records = vec![
            record("wipro", (2024, 1, 3), "110"),
            record("infosys", (2024, 1, 2), "50"),
            record("wipro", (2024, 1, 2), "100"),
            record("infosys", (2024, 1, 3), "55"),
        ];
        let enriched = AnalyticsEngine::new().enrich(records).unwrap();

        let dates: Vec<_> = enriched.iter().map(|r| r.price.date).collect();
        assert!(dates.windows(2).all(|w| w[0] <= w[1]));

        // Stable: same-date rows keep their input order.
        assert_eq!(enriched[0].price.ticker, "infosys");
        assert_eq!(enriched[1].price.ticker, "wipro");

        assert_eq!(enriched[0].daily_return, None);
        assert_eq!(enriched[1].daily_return, None);
        assert_relative_eq!(enriched[2].daily_return.unwrap(), 0.1, epsilon = 1e-12);
        assert_relative_eq!(enriched[3].daily_return.unwrap(), 0.1, epsilon = 1e-12);
        assert_eq!(enriched[0].sector, "Technology");
    }

    #[test]
    fn date_gaps_count_as_one_step() {
        let records = vec![
            record("ntpc", (2024, 1, 1), "100"),
            record("ntpc", (2024, 3, 1), "120"),
        ];
        let enriched = AnalyticsEngine::new().enrich(records).unwrap();
        assert_relative_eq!(enriched[1].daily_return.unwrap(), 0.2, epsilon = 1e-12);
        assert_relative_eq!(enriched[1].cumulative_return, 0.2, epsilon = 1e-12);
    }

    #[test]
    fn zero_prior_close_is_rejected() {
        let records = vec![
            record("bhp", (2024, 1, 1), "0"),
            record("bhp", (2024, 1, 2), "5"),
        ];
        let err = AnalyticsEngine::new().enrich(records).unwrap_err();
        match err {
            AnalyticsError::ZeroPrice { ticker, date } => {
                assert_eq!(ticker, "bhp");
                assert_eq!(date, NaiveDate::from_ymd_opt(2024, 1, 1).unwrap());
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn single_observation_has_zero_yearly_return() {
        let engine = AnalyticsEngine::new();
        let metrics = engine.run(vec![record("gail", (2024, 2, 1), "80")]).unwrap();
        let summary = metrics.ticker("gail").unwrap();
        assert_eq!(summary.observations, 1);
        assert_eq!(summary.yearly_return, 0.0);
        assert!(metrics.volatility.is_empty());
        assert_eq!(metrics.records[0].daily_return, None);
    }

    #[test]
    fn run_broadcasts_yearly_return_to_every_row() {
        let records = vec![
            record("cipla", (2024, 1, 1), "200"),
            record("cipla", (2024, 1, 2), "210"),
            record("cipla", (2024, 1, 3), "250"),
        ];
        let metrics = AnalyticsEngine::new().run(records).unwrap();
        for row in &metrics.records {
            assert_relative_eq!(row.yearly_return, 0.25, epsilon = 1e-12);
        }
    }

    #[test]
    fn empty_load_is_not_enough_data() {
        let err = AnalyticsEngine::new().run(Vec::new()).unwrap_err();
        assert!(matches!(err, AnalyticsError::NotEnoughData(_)));
    }

    #[test]
    fn monthly_summary_is_independent_per_month() {
        let records = vec![
            record("ongc", (2024, 1, 2), "100"),
            record("ongc", (2024, 1, 31), "110"),
            record("ongc", (2024, 2, 1), "90"),
            record("ongc", (2024, 2, 29), "99"),
        ];
        let engine = AnalyticsEngine::new();
        let enriched = engine.enrich(records).unwrap();

        let feb = engine.monthly_summary(&enriched, "2024-02".parse().unwrap()).unwrap();
        assert_eq!(feb.len(), 1);
        assert_eq!(feb[0].first, 90.0);
        assert_eq!(feb[0].last, 99.0);
        assert_relative_eq!(feb[0].monthly_return, 0.1, epsilon = 1e-12);

        let months = engine.available_months(&enriched);
        assert_eq!(
            months.iter().map(ToString::to_string).collect::<Vec<_>>(),
            vec!["2024-01", "2024-02"]
        );
    }

    #[test]
    fn sectors_rank_best_first() {
        let engine = AnalyticsEngine::new();
        let records = vec![
            record("infosys", (2024, 1, 1), "100"),
            record("infosys", (2024, 1, 2), "120"),
            record("cipla", (2024, 1, 1), "100"),
            record("cipla", (2024, 1, 2), "90"),
        ];
        let metrics = engine.run(records).unwrap();
        assert_eq!(metrics.sectors[0].sector, "Technology");
        assert_eq!(metrics.sectors[1].sector, "Pharma");
    }
}
