use crate::DbError;
use chrono::NaiveDate;
use core_types::PriceRecord;
use rust_decimal::Decimal;
use sqlx::FromRow;
use sqlx::mysql::MySqlPool;
use std::str::FromStr;

/// The `DbRepository` provides a read-only interface to the price store.
///
/// The store holds one table per ticker, each with at least the columns
/// `date, open, high, low, close, volume`. The table name is the ticker.
#[derive(Debug, Clone)]
pub struct DbRepository {
    pool: MySqlPool,
}

/// One row as it comes back from a ticker table, before validation.
///
/// Every column is read as nullable so that a bad row produces a
/// `MalformedTable` error naming the table instead of a decode error.
/// Prices arrive as text: a server-side numeric cast would turn `'n/a'`
/// into `0` with only a warning.
#[derive(Debug, Clone, FromRow)]
pub struct RawPriceRow {
    pub date: Option<NaiveDate>,
    pub open: Option<String>,
    pub high: Option<String>,
    pub low: Option<String>,
    pub close: Option<String>,
    pub volume: Option<i64>,
}

impl RawPriceRow {
    /// Validates the row and tags it with its ticker.
    ///
    /// `date` and `close` are mandatory. Missing `open`, `high` or `low` fall back
    /// to the close, and a missing volume to zero, since no metric reads them.
    pub fn into_record(self, table: &str, ticker: &str) -> Result<PriceRecord, DbError> {
        let date = self.date.ok_or_else(|| DbError::MalformedTable {
            table: table.to_string(),
            reason: "row with a null or unparseable `date`".to_string(),
        })?;
        let close = parse_price(table, "close", date, self.close.as_deref())?.ok_or_else(|| {
            DbError::MalformedTable {
                table: table.to_string(),
                reason: format!("null `close` on {date}"),
            }
        })?;
        let open = parse_price(table, "open", date, self.open.as_deref())?;
        let high = parse_price(table, "high", date, self.high.as_deref())?;
        let low = parse_price(table, "low", date, self.low.as_deref())?;

        Ok(PriceRecord {
            ticker: ticker.to_string(),
            date,
            open: open.unwrap_or(close),
            high: high.unwrap_or(close),
            low: low.unwrap_or(close),
            close,
            volume: self.volume.unwrap_or(0),
        })
    }
}

/// Parses a price cell. `None` passes through; text that is not a number is
/// `MalformedTable`. Accepts exponent notation, which MySQL uses when
/// printing small `DOUBLE` values.
fn parse_price(
    table: &str,
    column: &str,
    date: NaiveDate,
    raw: Option<&str>,
) -> Result<Option<Decimal>, DbError> {
    let Some(raw) = raw else {
        return Ok(None);
    };
    let text = raw.trim();
    Decimal::from_str(text)
        .or_else(|_| Decimal::from_scientific(text))
        .map(Some)
        .map_err(|_e| DbError::MalformedTable {
            table: table.to_string(),
            reason: format!("unparseable `{column}` value '{raw}' on {date}"),
        })
}

impl DbRepository {
    /// Creates a new `DbRepository` with a shared database connection pool.
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }

    /// Lists every base table in the current schema, in name order.
    pub async fn list_price_tables(&self) -> Result<Vec<String>, DbError> {
        let tables = sqlx::query_scalar::<_, String>(
            r#"
            SELECT CAST(table_name AS CHAR)
            FROM information_schema.tables
            WHERE table_schema = DATABASE() AND table_type = 'BASE TABLE'
            ORDER BY table_name
            "#,
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(tables)
    }

    /// Reads one ticker table into price records.
    ///
    /// SQL errors raised by the table itself (unknown column, bad cast) are
    /// reported as `MalformedTable`; connection problems pass through unchanged.
    pub async fn load_price_table(&self, table: &str) -> Result<Vec<PriceRecord>, DbError> {
        let ticker = ticker_from_table(table);

        let rows = sqlx::query_as::<_, RawPriceRow>(&price_query(table))
            .fetch_all(&self.pool)
            .await
            .map_err(|e| match e {
                sqlx::Error::Database(db_err) => DbError::MalformedTable {
                    table: table.to_string(),
                    reason: db_err.message().to_string(),
                },
                sqlx::Error::ColumnDecode { index, source } => DbError::MalformedTable {
                    table: table.to_string(),
                    reason: format!("column {index}: {source}"),
                },
                other => DbError::from(other),
            })?;

        if rows.is_empty() {
            tracing::warn!(table, "Price table is empty; it contributes no records.");
        }

        rows.into_iter()
            .map(|row| row.into_record(table, &ticker))
            .collect()
    }

    /// Loads every ticker table and concatenates the records.
    pub async fn load_all_prices(&self) -> Result<Vec<PriceRecord>, DbError> {
        self.load_all_prices_with_progress(|_| {}).await
    }

    /// As [`Self::load_all_prices`], reporting each step to `on_progress`.
    pub async fn load_all_prices_with_progress(
        &self,
        on_progress: impl FnMut(LoadProgress<'_>),
    ) -> Result<Vec<PriceRecord>, DbError> {
        let tables = self.list_price_tables().await?;
        load_tables(&tables, |table| self.load_price_table(table), on_progress).await
    }
}

/// Progress of a full load, for callers that display it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadProgress<'a> {
    /// The table list is known; `tables` loads follow.
    Started { tables: usize },
    /// One table finished loading.
    TableLoaded { table: &'a str, rows: usize },
}

/// Loads `tables` one after another and concatenates their records.
/// Fails with `NoTables` for an empty list and stops at the first bad table.
async fn load_tables<'t, L, Fut>(
    tables: &'t [String],
    mut load: L,
    mut on_progress: impl FnMut(LoadProgress<'t>),
) -> Result<Vec<PriceRecord>, DbError>
where
    L: FnMut(&'t str) -> Fut,
    Fut: Future<Output = Result<Vec<PriceRecord>, DbError>>,
{
    if tables.is_empty() {
        return Err(DbError::NoTables);
    }
    on_progress(LoadProgress::Started { tables: tables.len() });

    let mut records = Vec::new();
    for table in tables {
        let mut batch = load(table.as_str()).await?;
        tracing::debug!(table = %table, rows = batch.len(), "Loaded price table.");
        on_progress(LoadProgress::TableLoaded {
            table,
            rows: batch.len(),
        });
        records.append(&mut batch);
    }

    tracing::info!(tables = tables.len(), records = records.len(), "Loaded all price tables.");
    Ok(records)
}

/// Derives the ticker symbol from a table name: trimmed and lower-cased.
pub fn ticker_from_table(table: &str) -> String {
    table.trim().to_lowercase()
}

/// Quotes a MySQL identifier, doubling any embedded backticks.
pub fn quote_identifier(name: &str) -> String {
    format!("`{}`", name.replace('`', "``"))
}

/// The per-table select. Casting on the server side gives every table the
/// same column types regardless of how it was created.
fn price_query(table: &str) -> String {
    format!(
        "SELECT CAST(`date` AS DATE) AS `date`, \
         CAST(`open` AS CHAR) AS `open`, \
         CAST(`high` AS CHAR) AS `high`, \
         CAST(`low` AS CHAR) AS `low`, \
         CAST(`close` AS CHAR) AS `close`, \
         CAST(`volume` AS SIGNED) AS `volume` \
         FROM {} ORDER BY `date`",
        quote_identifier(table)
    )
}
