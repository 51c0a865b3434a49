use crate::error::ConfigError;
use std::path::Path;

// Declare the modules that make up this crate.
pub mod error;
pub mod settings;

// Re-export the core types to provide a clean public API.
pub use settings::{Config, DashboardConfig, DatabaseConfig, ExportConfig, LoggingConfig, ServerConfig};

/// Loads the application configuration.
///
/// Sources, lowest precedence first:
/// 1. built-in defaults,
/// 2. the given file, or `config.toml` in the working directory if it exists,
/// 3. environment variables prefixed `DASHBOARD__` (e.g. `DASHBOARD__SERVER__PORT=8080`).
///
/// An explicitly passed file must exist.
pub fn load_config(path: Option<&Path>) -> Result<Config, ConfigError> {
    let file = match path {
        Some(path) => config::File::from(path).required(true),
        None => config::File::with_name("config.toml").required(false),
    };

    let builder = config::Config::builder()
        .add_source(file)
        .add_source(
            config::Environment::with_prefix("DASHBOARD")
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true),
        )
        .build()?;

    let config = builder.try_deserialize::<Config>()?;
    config.validate()?;

    tracing::debug!(?config, "Configuration loaded.");
    Ok(config)
}
