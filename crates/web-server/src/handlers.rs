use crate::{AppState, error::AppError};
use analytics::{
    AnalyticsEngine, CorrelationMatrix, CumulativeSeries, Kpis, Metrics, MonthlyView,
    SectorSummary, TickerSummary, VolatilityEntry, dashboard,
    export::{self, MONTHLY_CSV_NAME, YEARLY_CSV_NAME},
};
use axum::{
    Json,
    extract::{Query, State},
    http::header,
    response::IntoResponse,
};
use core_types::Month;
use serde::Deserialize;
use std::sync::Arc;

/// `?month=YYYY-MM`. Absent means the earliest month in the data.
#[derive(Debug, Default, Deserialize)]
pub struct MonthQuery {
    pub month: Option<String>,
}

impl MonthQuery {
    fn parse(&self) -> Result<Option<Month>, AppError> {
        self.month
            .as_deref()
            .map(|raw| {
                raw.parse::<Month>()
                    .map_err(|e| AppError::BadRequest(format!("Invalid month '{raw}': {e}")))
            })
            .transpose()
    }
}

/// Reloads every ticker table and reruns the pipeline.
async fn compute_metrics(state: &AppState) -> Result<Metrics, AppError> {
    let records = state.db_repo.load_all_prices().await?;
    let metrics = AnalyticsEngine::new().run(records)?;
    Ok(metrics)
}

fn csv_attachment(filename: &str, body: Vec<u8>) -> impl IntoResponse {
    (
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{filename}\""),
            ),
        ],
        body,
    )
}

/// # GET /api/months
pub async fn get_months(State(state): State<Arc<AppState>>) -> Result<Json<Vec<Month>>, AppError> {
    let metrics = compute_metrics(&state).await?;
    Ok(Json(metrics.months))
}

/// # GET /api/kpis
pub async fn get_kpis(State(state): State<Arc<AppState>>) -> Result<Json<Kpis>, AppError> {
    let metrics = compute_metrics(&state).await?;
    Ok(Json(dashboard::kpis(&metrics)))
}

/// # GET /api/returns/gainers
pub async fn get_top_gainers(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<TickerSummary>>, AppError> {
    let metrics = compute_metrics(&state).await?;
    Ok(Json(dashboard::top_gainers(
        &metrics.tickers,
        state.config.dashboard.top_n,
    )))
}

/// # GET /api/returns/losers
pub async fn get_top_losers(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<TickerSummary>>, AppError> {
    let metrics = compute_metrics(&state).await?;
    Ok(Json(dashboard::top_losers(
        &metrics.tickers,
        state.config.dashboard.top_n,
    )))
}

/// # GET /api/volatility
pub async fn get_volatility(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<VolatilityEntry>>, AppError> {
    let metrics = compute_metrics(&state).await?;
    Ok(Json(dashboard::most_volatile(
        &metrics,
        state.config.dashboard.top_n,
    )))
}

/// # GET /api/cumulative
/// Line series for the tickers with the highest final cumulative return.
pub async fn get_cumulative(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<CumulativeSeries>>, AppError> {
    let metrics = compute_metrics(&state).await?;
    Ok(Json(dashboard::cumulative_series(
        &metrics,
        state.config.dashboard.cumulative_top_n,
    )))
}

/// # GET /api/sectors
pub async fn get_sectors(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<SectorSummary>>, AppError> {
    let metrics = compute_metrics(&state).await?;
    Ok(Json(metrics.sectors))
}

/// # GET /api/correlation
pub async fn get_correlation(
    State(state): State<Arc<AppState>>,
) -> Result<Json<CorrelationMatrix>, AppError> {
    let metrics = compute_metrics(&state).await?;
    Ok(Json(metrics.correlation))
}

/// # GET /api/monthly?month=YYYY-MM
pub async fn get_monthly(
    State(state): State<Arc<AppState>>,
    Query(query): Query<MonthQuery>,
) -> Result<Json<MonthlyView>, AppError> {
    let requested = query.parse()?;
    let metrics = compute_metrics(&state).await?;
    let month = metrics.select_month(requested)?;
    let view = dashboard::monthly_view(&metrics, month, state.config.dashboard.monthly_top_n)?;
    Ok(Json(view))
}

/// # GET /api/export/yearly.csv
pub async fn export_yearly_csv(
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, AppError> {
    let metrics = compute_metrics(&state).await?;
    let body = export::yearly_csv_bytes(&metrics.tickers)?;
    Ok(csv_attachment(YEARLY_CSV_NAME, body))
}

/// # GET /api/export/monthly.csv?month=YYYY-MM
pub async fn export_monthly_csv(
    State(state): State<Arc<AppState>>,
    Query(query): Query<MonthQuery>,
) -> Result<impl IntoResponse, AppError> {
    let requested = query.parse()?;
    let metrics = compute_metrics(&state).await?;
    let month = metrics.select_month(requested)?;
    let body = export::monthly_csv_bytes(&metrics.monthly(month)?)?;
    Ok(csv_attachment(MONTHLY_CSV_NAME, body))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn month_query_accepts_absent_and_valid_months() {
        assert_eq!(MonthQuery::default().parse().unwrap(), None);
        let query = MonthQuery {
            month: Some("2024-03".to_string()),
        };
        assert_eq!(query.parse().unwrap().unwrap().to_string(), "2024-03");
    }

    #[test]
    fn month_query_rejects_garbage() {
        let query = MonthQuery {
            month: Some("March".to_string()),
        };
        assert!(matches!(query.parse(), Err(AppError::BadRequest(_))));
    }
}
