//! The in-memory table the dashboard serves, with display-only fields.

use std::collections::BTreeSet;

use chrono::Datelike as _;
use crash_impact_dashboard_models::{ApiComponentRow, ApiFacets};
use crash_impact_models::FatalFlag;
use crash_impact_statistics::ComponentStatistics;

/// Fill value for missing categorical fields.
pub const NOT_AVAILABLE: &str = "N/A";

/// A statistics row plus the fields derived for filtering and display.
#[derive(Debug, Clone)]
pub struct DashboardRow {
    /// The underlying statistics.
    pub statistics: ComponentStatistics,
    /// Year of the substantial completion date.
    pub completion_year: i32,
    /// `Yes` when either fatal crash rate is positive.
    pub had_fatal_crash: FatalFlag,
    /// Project lead, `N/A` when missing.
    pub lead: String,
    /// Component name, `N/A` when missing.
    pub component_name: String,
    /// Component subtype, `N/A` when missing.
    pub subtype: String,
    /// Component work types, `N/A` when missing.
    pub work_types: String,
}

impl DashboardRow {
    /// Derives the display fields for one statistics row.
    #[must_use]
    pub fn new(statistics: ComponentStatistics) -> Self {
        let meta = &statistics.metadata;
        let fill = |value: Option<&String>| {
            value.map_or_else(|| NOT_AVAILABLE.to_string(), Clone::clone)
        };

        Self {
            completion_year: statistics.substantial_completion_date.year(),
            had_fatal_crash: FatalFlag::from_rates(
                statistics.pre_rates.fatal_crash_rate,
                statistics.post_rates.fatal_crash_rate,
            ),
            lead: fill(meta.project_lead.as_ref()),
            component_name: fill(meta.component_name.as_ref()),
            subtype: fill(meta.component_subtype.as_ref()),
            work_types: fill(meta.component_work_types.as_ref()),
            statistics,
        }
    }

    /// The table representation of this row.
    #[must_use]
    pub fn to_api(&self) -> ApiComponentRow {
        let s = &self.statistics;
        ApiComponentRow {
            moped_component_id: s.moped_component_id,
            project_id: s.project_id,
            project_name: s.metadata.project_name.clone(),
            project_lead: self.lead.clone(),
            component_name: self.component_name.clone(),
            component_name_full: s.metadata.component_name_full.clone(),
            component_subtype: self.subtype.clone(),
            component_work_types: self.work_types.clone(),
            type_name: s.metadata.type_name.clone(),
            substantial_completion_date: s.substantial_completion_date.format("%Y-%m-%d").to_string(),
            completion_year: self.completion_year,
            pre_crash_count: s.windows.pre.crash_count,
            post_crash_count: s.windows.post.crash_count,
            pre_annualized_crash_rate: s.pre_rates.crash_rate,
            post_annualized_crash_rate: s.post_rates.crash_rate,
            delta_crash_rate: s.delta.crash_rate,
            pre_annualized_fatal_crash_rate: s.pre_rates.fatal_crash_rate,
            post_annualized_fatal_crash_rate: s.post_rates.fatal_crash_rate,
            delta_fatal_crash_rate: s.delta.fatal_crash_rate,
            pre_annualized_injury_rate: s.pre_rates.injury_rate,
            post_annualized_injury_rate: s.post_rates.injury_rate,
            delta_injury_rate: s.delta.injury_rate,
            pre_annualized_death_rate: s.pre_rates.death_rate,
            post_annualized_death_rate: s.post_rates.death_rate,
            delta_death_rate: s.delta.death_rate,
            pre_annualized_cost: s.pre_rates.cost,
            post_annualized_cost: s.post_rates.cost,
            delta_comp_cost: s.delta.cost,
            component_had_fatal_crash: self.had_fatal_crash,
        }
    }
}

/// The full dashboard table, read-only once loaded.
#[derive(Debug, Clone, Default)]
pub struct Dataset {
    rows: Vec<DashboardRow>,
}

impl Dataset {
    /// Derives display fields for every statistics row.
    #[must_use]
    pub fn from_statistics(statistics: Vec<ComponentStatistics>) -> Self {
        Self {
            rows: statistics.into_iter().map(DashboardRow::new).collect(),
        }
    }

    /// All rows, in load order.
    #[must_use]
    pub fn rows(&self) -> &[DashboardRow] {
        &self.rows
    }

    /// Number of rows.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether the dataset has no rows.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Sorted distinct values for each filterable facet.
    #[must_use]
    pub fn facets(&self) -> ApiFacets {
        fn distinct<T: Ord + Clone>(values: impl Iterator<Item = T>) -> Vec<T> {
            values.collect::<BTreeSet<T>>().into_iter().collect()
        }

        ApiFacets {
            project_ids: distinct(self.rows.iter().map(|r| r.statistics.project_id)),
            leads: distinct(self.rows.iter().map(|r| r.lead.clone())),
            years: distinct(self.rows.iter().map(|r| r.completion_year)),
            component_names: distinct(self.rows.iter().map(|r| r.component_name.clone())),
            subtypes: distinct(self.rows.iter().map(|r| r.subtype.clone())),
            work_types: distinct(self.rows.iter().map(|r| r.work_types.clone())),
            fatal_crash: distinct(self.rows.iter().map(|r| r.had_fatal_crash)),
        }
    }
}
