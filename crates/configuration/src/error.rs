use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    /// The TOML file or a `DASHBOARD__*` variable could not be read or typed.
    #[error("Failed to load configuration: {0}")]
    LoadError(#[from] config::ConfigError),

    #[error("Configuration validation error: {0}")]
    ValidationError(String),

    #[error("Invalid server address '{host}:{port}': {source}")]
    InvalidAddress {
        host: String,
        port: u16,
        source: std::net::AddrParseError,
    },
}
