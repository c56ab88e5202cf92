#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Annualized pre/post completion crash statistics.
//!
//! The pipeline reads crashes and project components from a
//! [`RecordSource`](crash_impact_database::source::RecordSource), joins
//! crashes to buffered component lines, splits each component's matches
//! at its completion date, and annualizes the totals over the years of
//! crash data available on each side. The result is one
//! [`ComponentStatistics`] row per matched component, written out as CSV
//! by [`output`].

pub mod aggregate;
pub mod output;
pub mod pipeline;
pub mod rates;
mod record;
pub mod statistics;
pub mod window;

pub use aggregate::{ComponentWindows, WindowTotals, aggregate_matches};
pub use pipeline::{PipelineOptions, StatisticsRun, compute_statistics, run};
pub use rates::AnnualizedRates;
pub use statistics::ComponentStatistics;
pub use window::{DatasetWindow, classify_match};

use crash_impact_database::DbError;
use crash_impact_geometry::GeometryError;

/// Errors raised while computing or writing statistics.
#[derive(Debug, thiserror::Error)]
pub enum StatisticsError {
    /// Reading source records failed.
    #[error("Database error: {0}")]
    Database(#[from] DbError),

    /// A geometry could not be parsed, projected, or buffered.
    #[error("Geometry error: {0}")]
    Geometry(#[from] GeometryError),

    /// CSV reading or writing failed.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Filesystem I/O failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A statistics file is missing a required column.
    #[error("Missing column: {0}")]
    MissingColumn(String),

    /// A statistics file has a value that cannot be parsed.
    #[error("Invalid value on line {line}: {message}")]
    Parse {
        /// 1-based line in the file.
        line: u64,
        /// What went wrong, naming the field when known.
        message: String,
    },
}
