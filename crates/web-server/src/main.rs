use tracing_subscriber::{EnvFilter, FmtSubscriber};

// Entry point for `cargo run -p web-server`: serve the API with the default
// configuration sources and console logging only.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let config = configuration::load_config(None)?;
    web_server::run_server(config).await
}
