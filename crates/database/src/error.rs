use thiserror::Error;

#[derive(Error, Debug)]
pub enum DbError {
    #[error("Failed to load environment variables for database connection: {0}")]
    ConnectionConfigError(String),

    #[error("Failed to connect to the database: {0}")]
    ConnectionError(#[from] sqlx::Error),

    /// A source table is missing a required column or holds a value that
    /// cannot be read as a price record. Aborts the whole load.
    #[error("Table '{table}' is malformed: {reason}")]
    MalformedTable { table: String, reason: String },

    #[error("The database contains no price tables.")]
    NoTables,
}
