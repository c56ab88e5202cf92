//! End-to-end statistics computation.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use crash_impact_database::source::RecordSource;
use crash_impact_geometry::normalize_components;
use crash_impact_models::{ComponentRow, Crash, CrashComponentMatch, CrashRow};
use crash_impact_spatial::progress::ProgressCallback;
use crash_impact_spatial::{BufferIndex, DEFAULT_BUFFER_METERS, spatial_join};

use crate::StatisticsError;
use crate::aggregate::aggregate_matches;
use crate::statistics::ComponentStatistics;
use crate::window::{DatasetWindow, classify_match};

/// Tunables for a statistics run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PipelineOptions {
    /// Buffer radius around component lines, in meters.
    pub buffer_meters: f64,
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Self {
            buffer_meters: DEFAULT_BUFFER_METERS,
        }
    }
}

/// Everything a run produces.
#[derive(Debug, Clone, Default)]
pub struct StatisticsRun {
    /// One row per component with at least one pre or post match, sorted
    /// by component id.
    pub statistics: Vec<ComponentStatistics>,
    /// Every crash/component match from the spatial join.
    pub matches: Vec<CrashComponentMatch>,
    /// Dataset-wide crash date bounds, if there were any crashes.
    pub window: Option<DatasetWindow>,
}

/// Computes statistics from already-fetched source rows.
///
/// # Errors
///
/// Returns [`StatisticsError::Geometry`] if a component geometry has an
/// unsupported type or cannot be buffered.
pub fn compute_statistics(
    crash_rows: &[CrashRow],
    component_rows: &[ComponentRow],
    options: &PipelineOptions,
    progress: &Arc<dyn ProgressCallback>,
) -> Result<StatisticsRun, StatisticsError> {
    let crashes: Vec<Crash> = crash_rows.iter().filter_map(Crash::from_row).collect();
    log::info!(
        "{} of {} crashes have a location and date",
        crashes.len(),
        crash_rows.len()
    );

    let components = normalize_components(component_rows)?;

    let Some(window) = DatasetWindow::from_crashes(&crashes) else {
        log::warn!("No crashes with a location; nothing to compute");
        return Ok(StatisticsRun::default());
    };
    log::info!(
        "Crash data spans {} to {}",
        window.earliest.format("%Y-%m-%d"),
        window.latest.format("%Y-%m-%d")
    );

    let index = BufferIndex::build(&components, options.buffer_meters)?;
    let pairs = spatial_join(&crashes, &index, progress);

    let matches: Vec<CrashComponentMatch> = pairs
        .iter()
        .map(|pair| classify_match(&crashes[pair.crash], &components[pair.component]))
        .collect();

    let unique_crashes: BTreeSet<i64> = matches.iter().map(|m| m.crash_id).collect();
    let unique_components: BTreeSet<i64> = matches.iter().map(|m| m.moped_component_id).collect();
    log::info!(
        "Unique crashes near projects: {}, unique components with crashes: {}",
        unique_crashes.len(),
        unique_components.len()
    );

    // First joined component per id supplies metadata and the completion date.
    let mut first_component: BTreeMap<i64, usize> = BTreeMap::new();
    for pair in &pairs {
        first_component
            .entry(components[pair.component].component_id)
            .or_insert(pair.component);
    }

    let statistics: Vec<ComponentStatistics> = aggregate_matches(&matches)
        .into_iter()
        .filter_map(|(component_id, windows)| {
            first_component
                .get(&component_id)
                .map(|&i| ComponentStatistics::new(&components[i], windows, &window))
        })
        .collect();

    log::info!("Computed statistics for {} components", statistics.len());

    Ok(StatisticsRun {
        statistics,
        matches,
        window: Some(window),
    })
}

/// Fetches source rows and computes statistics.
///
/// Each fetch opens and closes its own connection, so no connection is
/// held while the join runs.
///
/// # Errors
///
/// Returns [`StatisticsError`] if fetching or computing fails.
pub async fn run(
    source: &dyn RecordSource,
    options: &PipelineOptions,
    progress: &Arc<dyn ProgressCallback>,
) -> Result<StatisticsRun, StatisticsError> {
    let crash_rows = source.crashes().await?;
    let component_rows = source.components().await?;

    compute_statistics(&crash_rows, &component_rows, options, progress)
}
