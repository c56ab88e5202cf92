#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Actix-Web dashboard for crash impact statistics.
//!
//! Loads the statistics table once at startup from a local file or a
//! published URL, then serves an interactive map and table. Every request
//! filters the shared read-only dataset from scratch.

pub mod config;
pub mod dataset;
pub mod filter;
mod handlers;
pub mod map;
pub mod source;

use actix_cors::Cors;
use actix_web::{App, HttpServer, middleware, web};
use crash_impact_statistics::StatisticsError;

use crate::config::DashboardConfig;
use crate::dataset::Dataset;
use crate::source::StatisticsSource;

/// Errors raised while configuring or loading the dashboard.
#[derive(Debug, thiserror::Error)]
pub enum DashboardError {
    /// The configuration is invalid.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Filesystem I/O failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The statistics table could not be read.
    #[error("Statistics error: {0}")]
    Statistics(#[from] StatisticsError),

    /// An HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The remote source answered with a non-success status.
    #[error("Fetching {url} returned HTTP {status}")]
    Fetch {
        /// Requested URL.
        url: String,
        /// HTTP status code.
        status: u16,
    },
}

/// Shared application state.
pub struct AppState {
    /// Effective configuration.
    pub config: DashboardConfig,
    /// The loaded statistics table.
    pub dataset: Dataset,
}

/// Registers the dashboard routes.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/", web::get().to(handlers::index)).service(
        web::scope("/api")
            .route("/health", web::get().to(handlers::health))
            .route("/columns", web::get().to(handlers::columns))
            .route("/facets", web::get().to(handlers::facets))
            .route("/components", web::get().to(handlers::components))
            .route("/map", web::get().to(handlers::map)),
    );
}

/// Loads the dataset from `source`.
///
/// # Errors
///
/// Returns [`DashboardError`] if the source cannot be loaded.
pub async fn load_dataset(source: &dyn StatisticsSource) -> Result<Dataset, DashboardError> {
    log::info!("Loading statistics from {}...", source.describe());
    let statistics = source.load().await?;
    let dataset = Dataset::from_statistics(statistics);
    log::info!("Loaded {} components", dataset.len());
    Ok(dataset)
}

/// Loads the dataset and serves the dashboard until shutdown.
///
/// # Errors
///
/// Returns [`DashboardError`] if loading fails or the server cannot bind.
pub async fn run_server(config: DashboardConfig) -> Result<(), DashboardError> {
    let source = source::from_config(&config.source);
    let dataset = load_dataset(source.as_ref()).await?;

    let bind_addr = config.bind.clone();
    let port = config.port;
    let state = web::Data::new(AppState { config, dataset });

    log::info!("Starting dashboard on {bind_addr}:{port}");

    HttpServer::new(move || {
        let cors = Cors::permissive();

        App::new()
            .wrap(cors)
            .wrap(middleware::Logger::default())
            .app_data(state.clone())
            .configure(configure)
    })
    .bind((bind_addr, port))?
    .run()
    .await?;

    Ok(())
}
