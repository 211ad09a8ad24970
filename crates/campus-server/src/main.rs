use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{EnvFilter, fmt};

use campus_server::{config::Config, start_server};

#[tokio::main]
async fn main() -> Result<()> {
    fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    start_server(Config::parse()).await
}
