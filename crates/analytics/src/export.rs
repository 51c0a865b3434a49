//! CSV downloads for the yearly and monthly return tables.

use serde::{Deserialize, Serialize};
use std::fs;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

use crate::error::AnalyticsError;
use crate::report::{MonthlySummary, TickerSummary};

pub const YEARLY_CSV_NAME: &str = "yearly_returns.csv";
pub const MONTHLY_CSV_NAME: &str = "monthly_returns.csv";

/// A row of the yearly export. Returns are decimal fractions, not percents.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct YearlyReturnRow {
    pub ticker: String,
    pub yearly_return: f64,
}

/// Writes `ticker,yearly_return`, one row per ticker in the given order.
pub fn write_yearly_csv<W: Write>(writer: W, tickers: &[TickerSummary]) -> Result<(), AnalyticsError> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    for summary in tickers {
        csv_writer.serialize(YearlyReturnRow {
            ticker: summary.ticker.clone(),
            yearly_return: summary.yearly_return,
        })?;
    }
    csv_writer.flush()?;
    Ok(())
}

/// Writes `ticker,first,last,monthly_return` for one month's table.
pub fn write_monthly_csv<W: Write>(writer: W, rows: &[MonthlySummary]) -> Result<(), AnalyticsError> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    for row in rows {
        csv_writer.serialize(row)?;
    }
    csv_writer.flush()?;
    Ok(())
}

pub fn read_yearly_csv<R: Read>(reader: R) -> Result<Vec<YearlyReturnRow>, AnalyticsError> {
    let mut csv_reader = csv::Reader::from_reader(reader);
    let rows = csv_reader.deserialize().collect::<Result<Vec<YearlyReturnRow>, _>>()?;
    Ok(rows)
}

pub fn read_monthly_csv<R: Read>(reader: R) -> Result<Vec<MonthlySummary>, AnalyticsError> {
    let mut csv_reader = csv::Reader::from_reader(reader);
    let rows = csv_reader.deserialize().collect::<Result<Vec<MonthlySummary>, _>>()?;
    Ok(rows)
}

pub fn yearly_csv_bytes(tickers: &[TickerSummary]) -> Result<Vec<u8>, AnalyticsError> {
    let mut buffer = Vec::new();
    write_yearly_csv(&mut buffer, tickers)?;
    Ok(buffer)
}

pub fn monthly_csv_bytes(rows: &[MonthlySummary]) -> Result<Vec<u8>, AnalyticsError> {
    let mut buffer = Vec::new();
    write_monthly_csv(&mut buffer, rows)?;
    Ok(buffer)
}

/// Paths of the two files written by [`export_to_dir`].
#[derive(Debug, Clone)]
pub struct ExportPaths {
    pub yearly: PathBuf,
    pub monthly: PathBuf,
}

/// Writes both exports into `dir`, creating it if needed.
pub fn export_to_dir(
    dir: &Path,
    tickers: &[TickerSummary],
    monthly: &[MonthlySummary],
) -> Result<ExportPaths, AnalyticsError> {
    fs::create_dir_all(dir)?;

    let paths = ExportPaths {
        yearly: dir.join(YEARLY_CSV_NAME),
        monthly: dir.join(MONTHLY_CSV_NAME),
    };
    write_yearly_csv(fs::File::create(&paths.yearly)?, tickers)?;
    write_monthly_csv(fs::File::create(&paths.monthly)?, monthly)?;

    tracing::info!(
        yearly = %paths.yearly.display(),
        monthly = %paths.monthly.display(),
        "CSV exports written."
    );
    Ok(paths)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn summary(ticker: &str, yearly_return: f64) -> TickerSummary {
        let date = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        TickerSummary {
            ticker: ticker.to_string(),
            sector: "Unknown".to_string(),
            observations: 2,
            first_date: date,
            last_date: date,
            first_close: 1.0,
            last_close: 1.0 + yearly_return,
            yearly_return,
            final_cumulative_return: yearly_return,
        }
    }

    #[test]
    fn yearly_export_has_the_expected_header() {
        let bytes = yearly_csv_bytes(&[summary("wipro", -0.01)]).unwrap();
        let text = String::from_utf8(bytes).unwrap();
        let mut lines = text.lines();
        assert_eq!(lines.next(), Some("ticker,yearly_return"));
        assert_eq!(lines.next(), Some("wipro,-0.01"));
    }

    #[test]
    fn monthly_export_has_the_expected_header() {
        let rows = vec![MonthlySummary {
            ticker: "ongc".to_string(),
            first: 90.0,
            last: 99.0,
            monthly_return: 0.1,
        }];
        let bytes = monthly_csv_bytes(&rows).unwrap();
        let text = String::from_utf8(bytes).unwrap();
        assert_eq!(text.lines().next(), Some("ticker,first,last,monthly_return"));
        assert_eq!(read_monthly_csv(text.as_bytes()).unwrap(), rows);
    }

    #[test]
    fn export_to_dir_writes_both_files() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("nested");
        let paths = export_to_dir(&target, &[summary("a", 0.5)], &[]).unwrap();
        assert!(paths.yearly.exists());
        assert!(paths.monthly.exists());
        let yearly = read_yearly_csv(fs::File::open(&paths.yearly).unwrap()).unwrap();
        assert_eq!(yearly, vec![YearlyReturnRow { ticker: "a".to_string(), yearly_return: 0.5 }]);
    }
}
