use anyhow::Context;
use clap::Parser;
use pmp_rag_engine::cli::{self, Cli};
use pmp_rag_engine::config::AppConfig;
use pmp_rag_engine::infrastructure::logging::init_logging;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    let config = AppConfig::load().context("Failed to load configuration")?;
    init_logging(&config.logging);

    cli::run(cli, &config).await
}
