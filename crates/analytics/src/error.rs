use chrono::NaiveDate;
use core_types::Month;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AnalyticsError {
    #[error("Not enough data to perform calculation: {0}")]
    NotEnoughData(String),

    /// A return would divide by a zero close. Every such case is rejected
    /// rather than producing an infinite or NaN metric.
    #[error("Calculation error: close price of '{ticker}' is zero on {date}, returns against it are undefined")]
    ZeroPrice { ticker: String, date: NaiveDate },

    #[error("Close price of '{ticker}' on {date} cannot be represented as a float")]
    Conversion { ticker: String, date: NaiveDate },

    #[error("No price records fall in month {0}")]
    UnknownMonth(Month),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("I/O error while exporting: {0}")]
    Io(#[from] std::io::Error),
}
