#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! CLI entry point for the crash statistics pipeline.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use clap::{Parser, Subcommand};
use crash_impact_cli_utils::{JoinProgress, init_logger};
use crash_impact_database::db::ConnectionSettings;
use crash_impact_database::source::PostgresSource;
use crash_impact_spatial::DEFAULT_BUFFER_METERS;
use crash_impact_spatial::progress::ProgressCallback;
use crash_impact_statistics::output::{
    DEFAULT_OUTPUT_PATH, write_matches_file, write_statistics_file,
};
use crash_impact_statistics::{PipelineOptions, run};

#[derive(Parser)]
#[command(
    name = "crash_impact_statistics",
    about = "Pre/post completion crash statistics for project components"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Join crashes to project components and write annualized statistics.
    /// Reads `CRASH_DATABASE_URL` and `PROJECT_DATABASE_URL`.
    Run {
        /// Where to write the statistics CSV
        #[arg(long, default_value = DEFAULT_OUTPUT_PATH)]
        output: PathBuf,
        /// Also write every crash/component match to this CSV
        #[arg(long)]
        matches: Option<PathBuf>,
        /// Buffer radius around component lines, in meters
        #[arg(long, default_value_t = DEFAULT_BUFFER_METERS)]
        buffer_meters: f64,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let multi = init_logger();
    let cli = Cli::parse();

    match cli.command {
        Commands::Run {
            output,
            matches,
            buffer_meters,
        } => {
            let start = Instant::now();
            let source = PostgresSource::new(ConnectionSettings::from_env());
            let options = PipelineOptions { buffer_meters };
            let progress: Arc<dyn ProgressCallback> = JoinProgress::new(&multi);

            let result = run(&source, &options, &progress).await?;

            write_statistics_file(&output, &result.statistics)?;
            if let Some(path) = matches {
                write_matches_file(&path, &result.matches)?;
            }

            log::info!("Done in {:.1}s", start.elapsed().as_secs_f64());
        }
    }

    Ok(())
}
