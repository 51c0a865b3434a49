use chrono::NaiveDate;
use configuration::DashboardConfig;
use core_types::Month;
use serde::Serialize;

use crate::correlation::CorrelationMatrix;
use crate::error::AnalyticsError;
use crate::report::{Metrics, MonthlySummary, SectorSummary, TickerSummary, VolatilityEntry};
use crate::stats;

/// Headline numbers at the top of the dashboard.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Kpis {
    pub tickers: usize,
    /// Tickers whose yearly return is strictly positive.
    pub green_count: usize,
    pub green_pct: f64,
    /// Tickers whose yearly return is zero or negative.
    pub red_count: usize,
    pub red_pct: f64,
    /// Mean of every ticker's latest close.
    pub average_latest_close: f64,
    /// Mean of all per-ticker daily returns, in percent.
    pub average_daily_change_pct: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SeriesPoint {
    pub date: NaiveDate,
    pub value: f64,
}

/// One line on the cumulative-return chart.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CumulativeSeries {
    pub ticker: String,
    pub points: Vec<SeriesPoint>,
}

/// The month selector's current state and the tables it drives.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthlyView {
    pub month: Month,
    /// Every ticker that traded in the month, best first.
    pub rows: Vec<MonthlySummary>,
    pub gainers: Vec<MonthlySummary>,
    /// The tail of `rows`, still in best-first order.
    pub losers: Vec<MonthlySummary>,
}

/// The full presentation model: everything a front end needs to draw the
/// dashboard for one month selection.
#[derive(Debug, Clone, Serialize)]
pub struct Dashboard {
    pub kpis: Kpis,
    pub top_gainers: Vec<TickerSummary>,
    pub top_losers: Vec<TickerSummary>,
    pub most_volatile: Vec<VolatilityEntry>,
    pub cumulative: Vec<CumulativeSeries>,
    pub sectors: Vec<SectorSummary>,
    pub correlation: CorrelationMatrix,
    pub months: Vec<Month>,
    pub monthly: MonthlyView,
}

impl Dashboard {
    pub fn build(
        metrics: &Metrics,
        config: &DashboardConfig,
        month: Option<Month>,
    ) -> Result<Self, AnalyticsError> {
        let month = metrics.select_month(month)?;

        Ok(Self {
            kpis: kpis(metrics),
            top_gainers: top_gainers(&metrics.tickers, config.top_n),
            top_losers: top_losers(&metrics.tickers, config.top_n),
            most_volatile: most_volatile(metrics, config.top_n),
            cumulative: cumulative_series(metrics, config.cumulative_top_n),
            sectors: metrics.sectors.clone(),
            correlation: metrics.correlation.clone(),
            months: metrics.months.clone(),
            monthly: monthly_view(metrics, month, config.monthly_top_n)?,
        })
    }
}

pub fn kpis(metrics: &Metrics) -> Kpis {
    let tickers = metrics.tickers.len();
    let green_count = metrics
        .tickers
        .iter()
        .filter(|t| t.yearly_return > 0.0)
        .count();
    let red_count = tickers - green_count;
    let pct = |count: usize| {
        if tickers == 0 {
            0.0
        } else {
            count as f64 / tickers as f64 * 100.0
        }
    };

    let latest_closes: Vec<f64> = metrics.tickers.iter().map(|t| t.last_close).collect();
    let daily_returns: Vec<f64> = metrics
        .records
        .iter()
        .filter_map(|r| r.daily_return)
        .collect();

    Kpis {
        tickers,
        green_count,
        green_pct: pct(green_count),
        red_count,
        red_pct: pct(red_count),
        average_latest_close: stats::mean(&latest_closes).unwrap_or(0.0),
        average_daily_change_pct: stats::mean(&daily_returns).map(|m| m * 100.0),
    }
}

/// Best `n` yearly returns, best first. Returns fewer when there are fewer tickers.
pub fn top_gainers(tickers: &[TickerSummary], n: usize) -> Vec<TickerSummary> {
    let mut ranked = tickers.to_vec();
    ranked.sort_by(|a, b| {
        b.yearly_return
            .total_cmp(&a.yearly_return)
            .then_with(|| a.ticker.cmp(&b.ticker))
    });
    ranked.truncate(n);
    ranked
}

/// Worst `n` yearly returns, worst first.
pub fn top_losers(tickers: &[TickerSummary], n: usize) -> Vec<TickerSummary> {
    let mut ranked = tickers.to_vec();
    ranked.sort_by(|a, b| {
        a.yearly_return
            .total_cmp(&b.yearly_return)
            .then_with(|| a.ticker.cmp(&b.ticker))
    });
    ranked.truncate(n);
    ranked
}

pub fn most_volatile(metrics: &Metrics, n: usize) -> Vec<VolatilityEntry> {
    metrics.volatility.iter().take(n).cloned().collect()
}

/// Full cumulative-return lines for the `n` tickers that finish highest.
pub fn cumulative_series(metrics: &Metrics, n: usize) -> Vec<CumulativeSeries> {
    let mut leaders: Vec<&TickerSummary> = metrics.tickers.iter().collect();
    leaders.sort_by(|a, b| {
        b.final_cumulative_return
            .total_cmp(&a.final_cumulative_return)
            .then_with(|| a.ticker.cmp(&b.ticker))
    });
    leaders.truncate(n);

    leaders
        .into_iter()
        .map(|leader| CumulativeSeries {
            ticker: leader.ticker.clone(),
            points: metrics
                .records
                .iter()
                .filter(|r| r.price.ticker == leader.ticker)
                .map(|r| SeriesPoint {
                    date: r.price.date,
                    value: r.cumulative_return,
                })
                .collect(),
        })
        .collect()
}

/// The monthly table plus its head and tail of `n` rows each.
///
/// With fewer than `2n` tickers the gainers and losers overlap.
pub fn monthly_view(metrics: &Metrics, month: Month, n: usize) -> Result<MonthlyView, AnalyticsError> {
    let rows = metrics.monthly(month)?;
    let gainers = rows.iter().take(n).cloned().collect();
    let losers = rows[rows.len().saturating_sub(n)..].to_vec();

    Ok(MonthlyView {
        month,
        rows,
        gainers,
        losers,
    })
}
