use serde::Deserialize;
use std::net::SocketAddr;
use std::path::PathBuf;

use crate::error::ConfigError;

/// The root configuration structure for the entire application.
///
/// Every section is optional in `config.toml`; omitted sections fall back to
/// the defaults below.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub dashboard: DashboardConfig,
    pub export: ExportConfig,
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub logging: LoggingConfig,
}

/// Sizes of the ranked views on the dashboard.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    /// Rows in the gainer, loser and volatility rankings.
    pub top_n: usize,
    /// Tickers drawn on the cumulative-return line chart.
    pub cumulative_top_n: usize,
    /// Bars in each of the monthly gainer and loser charts.
    pub monthly_top_n: usize,
}

/// Where the `export` command writes its CSV files.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ExportConfig {
    pub output_dir: PathBuf,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

/// Connection pool settings. The URL itself always comes from `DATABASE_URL`.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    pub max_connections: u32,
    pub acquire_timeout_secs: u64,
}

/// Optional file logging. Console logging is always on.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// When set, logs are also written to a daily rolling file in this directory.
    pub directory: Option<PathBuf>,
    pub file_prefix: String,
}

// --- Default Implementations ---

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            top_n: 10,
            cumulative_top_n: 5,
            monthly_top_n: 5,
        }
    }
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("exports"),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
        }
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            max_connections: 5,
            acquire_timeout_secs: 5,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            directory: None,
            file_prefix: "dashboard.log".to_string(),
        }
    }
}

impl ServerConfig {
    /// The socket address the HTTP API binds to.
    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .map_err(|source| ConfigError::InvalidAddress {
                host: self.host.clone(),
                port: self.port,
                source,
            })
    }
}

impl Config {
    /// Rejects settings that would make the dashboard render nothing.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let checks = [
            ("dashboard.top_n", self.dashboard.top_n),
            ("dashboard.cumulative_top_n", self.dashboard.cumulative_top_n),
            ("dashboard.monthly_top_n", self.dashboard.monthly_top_n),
            ("database.max_connections", self.database.max_connections as usize),
        ];
        for (name, value) in checks {
            if value == 0 {
                return Err(ConfigError::ValidationError(format!("{name} must be greater than zero")));
            }
        }
        self.server.socket_addr()?;
        Ok(())
    }
}
