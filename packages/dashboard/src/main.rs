#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! CLI entry point for the crash impact dashboard.

use std::path::PathBuf;

use clap::Parser;
use crash_impact_dashboard::config::{DashboardConfig, SourceConfig};
use crash_impact_dashboard::run_server;

#[derive(Parser)]
#[command(
    name = "crash_impact_dashboard",
    about = "Interactive map and table of pre/post completion crash statistics"
)]
struct Cli {
    /// TOML configuration file
    #[arg(long)]
    config: Option<PathBuf>,
    /// Load statistics from this CSV file
    #[arg(long, conflicts_with = "url")]
    file: Option<PathBuf>,
    /// Load statistics from this published CSV URL
    #[arg(long)]
    url: Option<String>,
    /// Address to bind to (overrides `BIND_ADDR`)
    #[arg(long)]
    bind: Option<String>,
    /// Port to listen on (overrides `PORT`)
    #[arg(long)]
    port: Option<u16>,
}

#[actix_web::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    pretty_env_logger::init_custom_env("RUST_LOG");
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => DashboardConfig::load(path)?,
        None => DashboardConfig::default(),
    }
    .with_env()
    .with_overrides(cli.bind, cli.port);

    if let Some(path) = cli.file {
        config.source = SourceConfig::File { path };
    } else if let Some(url) = cli.url {
        config.source = SourceConfig::Remote { url };
    }

    run_server(config).await?;
    Ok(())
}
