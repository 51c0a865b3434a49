//! # Dashboard Analytics Engine
//!
//! This crate turns raw daily price records into every number the dashboard
//! shows: daily, cumulative, yearly and monthly returns, volatility, sector
//! performance, the correlation matrix and the headline KPIs.
//!
//! ## Architectural Principles
//!
//! - **Pure Logic:** No knowledge of the database or the web server. It depends
//!   only on `core-types` and `configuration`.
//! - **Stateless Calculation:** `AnalyticsEngine` takes a batch of `PriceRecord`s
//!   and produces `Metrics`. Nothing is cached between runs.
//! - **No Silent Infinities:** A return against a zero close is an error,
//!   `AnalyticsError::ZeroPrice`, never an infinite or NaN value.
//!
//! ## Public API
//!
//! - `AnalyticsEngine`: The metrics pipeline.
//! - `Metrics`: Enriched records plus ticker, sector, volatility and correlation tables.
//! - `Dashboard`: The presentation model assembled from `Metrics` for one month.
//! - `export`: CSV writers (and readers) for the yearly and monthly tables.
//! - `AnalyticsError`: The specific error types that can be returned from this crate.

// Declare the modules that constitute this crate.
pub mod correlation;
pub mod dashboard;
pub mod engine;
pub mod error;
pub mod export;
pub mod report;
pub mod stats;

// Re-export the key components to create a clean, public-facing API.
pub use correlation::CorrelationMatrix;
pub use dashboard::{CumulativeSeries, Dashboard, Kpis, MonthlyView, SeriesPoint};
pub use engine::AnalyticsEngine;
pub use error::AnalyticsError;
pub use report::{
    EnrichedRecord, Metrics, MonthlySummary, SectorSummary, TickerSummary, VolatilityEntry,
};
