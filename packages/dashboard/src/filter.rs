//! Facet filtering.
//!
//! Facets combine with AND. Values within one facet combine with OR. An
//! empty facet matches everything.
//!
//! Parameters are comma-separated lists. Values that themselves contain
//! commas (work types such as `New, Modified`) are sent percent-encoded
//! and decoded here after splitting.

use crash_impact_dashboard_models::ComponentQueryParams;
use crash_impact_models::FatalFlag;

use crate::dataset::DashboardRow;

/// Parsed facet selections.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ComponentFilter {
    /// Project identifiers.
    pub project_ids: Vec<i64>,
    /// Project leads.
    pub leads: Vec<String>,
    /// Completion years.
    pub years: Vec<i32>,
    /// Component names.
    pub component_names: Vec<String>,
    /// Component subtypes.
    pub subtypes: Vec<String>,
    /// Component work types.
    pub work_types: Vec<String>,
    /// Fatal crash flags.
    pub fatal_crash: Vec<FatalFlag>,
}

/// Splits a comma-separated parameter into decoded, trimmed, non-empty
/// values. A piece that is not valid percent-encoding is kept as is.
fn split(param: Option<&str>) -> impl Iterator<Item = String> {
    param
        .unwrap_or_default()
        .split(',')
        .map(|piece| {
            urlencoding::decode(piece)
                .map_or_else(|_| piece.to_string(), |decoded| decoded.into_owned())
        })
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn strings(param: Option<&str>) -> Vec<String> {
    split(param).collect()
}

impl ComponentFilter {
    /// Parses query parameters. Values that do not parse for a typed
    /// facet (a non-numeric year, say) are ignored.
    #[must_use]
    pub fn from_params(params: &ComponentQueryParams) -> Self {
        Self {
            project_ids: split(params.project_id.as_deref())
                .filter_map(|v| v.parse().ok())
                .collect(),
            leads: strings(params.lead.as_deref()),
            years: split(params.year.as_deref())
                .filter_map(|v| v.parse().ok())
                .collect(),
            component_names: strings(params.component_name.as_deref()),
            subtypes: strings(params.subtype.as_deref()),
            work_types: strings(params.work_type.as_deref()),
            fatal_crash: split(params.fatal_crash.as_deref())
                .filter_map(|v| v.parse().ok())
                .collect(),
        }
    }

    /// Whether a row satisfies every facet.
    #[must_use]
    pub fn matches(&self, row: &DashboardRow) -> bool {
        fn allows<T: PartialEq + ?Sized, U: AsRef<T>>(selected: &[U], value: &T) -> bool {
            selected.is_empty() || selected.iter().any(|s| s.as_ref() == value)
        }

        (self.project_ids.is_empty() || self.project_ids.contains(&row.statistics.project_id))
            && allows(&self.leads, row.lead.as_str())
            && (self.years.is_empty() || self.years.contains(&row.completion_year))
            && allows(&self.component_names, row.component_name.as_str())
            && allows(&self.subtypes, row.subtype.as_str())
            && allows(&self.work_types, row.work_types.as_str())
            && (self.fatal_crash.is_empty() || self.fatal_crash.contains(&row.had_fatal_crash))
    }

    /// The rows that satisfy every facet, in dataset order.
    pub fn apply<'a>(&'a self, rows: &'a [DashboardRow]) -> impl Iterator<Item = &'a DashboardRow> {
        rows.iter().filter(move |row| self.matches(row))
    }
}
