//! The per-component statistics row.

use chrono::{DateTime, Utc};
use crash_impact_models::{ComponentMetadata, ProjectComponent};
use geo::Geometry;

use crate::aggregate::ComponentWindows;
use crate::rates::AnnualizedRates;
use crate::window::DatasetWindow;

/// One row of the annualized statistics table.
#[derive(Debug, Clone, PartialEq)]
pub struct ComponentStatistics {
    /// Component identifier the row is grouped by.
    pub moped_component_id: i64,
    /// Project identifier.
    pub project_id: i64,
    /// Component identifier as stored on the project.
    pub project_component_id: i64,
    /// Descriptive component fields.
    pub metadata: ComponentMetadata,
    /// Substantial completion date.
    pub substantial_completion_date: DateTime<Utc>,
    /// Years of crash data before completion.
    pub years_before_completion: f64,
    /// Years of crash data after completion.
    pub years_after_completion: f64,
    /// Raw totals before and after completion.
    pub windows: ComponentWindows,
    /// Annualized rates before completion.
    pub pre_rates: AnnualizedRates,
    /// Annualized rates after completion.
    pub post_rates: AnnualizedRates,
    /// `post_rates - pre_rates`.
    pub delta: AnnualizedRates,
    /// Component line geometry in EPSG:4326.
    pub line_geometry: Option<Geometry<f64>>,
}

impl ComponentStatistics {
    /// Annualizes a component's window totals against the dataset window.
    ///
    /// `component` supplies the identifiers, completion date, metadata,
    /// and geometry.
    #[must_use]
    pub fn new(
        component: &ProjectComponent,
        windows: ComponentWindows,
        window: &DatasetWindow,
    ) -> Self {
        let completion = component.completion_date;
        let years_before = window.years_before(completion);
        let years_after = window.years_after(completion);

        let pre_rates = AnnualizedRates::annualize(&windows.pre, years_before);
        let post_rates = AnnualizedRates::annualize(&windows.post, years_after);

        Self {
            moped_component_id: component.component_id,
            project_id: component.project_id,
            project_component_id: component.component_id,
            metadata: component.metadata.clone(),
            substantial_completion_date: completion,
            years_before_completion: years_before,
            years_after_completion: years_after,
            windows,
            pre_rates,
            post_rates,
            delta: AnnualizedRates::delta(&pre_rates, &post_rates),
            line_geometry: Some(component.line_geometry.clone()),
        }
    }
}
