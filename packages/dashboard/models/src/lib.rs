#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! API request and response types for the crash impact dashboard.
//!
//! Envelope types use camelCase like the rest of the API. Table rows are
//! the exception: their keys are the statistics column names, so they line
//! up with the labels served by `/api/columns`.

use crash_impact_models::FatalFlag;
use serde::{Deserialize, Serialize};

/// Health check response.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiHealth {
    /// Whether the service is healthy.
    pub healthy: bool,
    /// Server version.
    pub version: String,
    /// Number of components loaded.
    pub component_count: usize,
}

/// Facet filters for the component and map endpoints.
///
/// Every field is a comma-separated list. A missing or empty field means
/// "no filter"; values within a field are alternatives.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComponentQueryParams {
    /// Project identifiers.
    pub project_id: Option<String>,
    /// Project leads.
    pub lead: Option<String>,
    /// Completion years.
    pub year: Option<String>,
    /// Component names.
    pub component_name: Option<String>,
    /// Component subtypes (`N/A` for none).
    pub subtype: Option<String>,
    /// Component work types (`N/A` for none).
    pub work_type: Option<String>,
    /// `Yes` or `No`.
    pub fatal_crash: Option<String>,
}

/// A column of the components table.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ApiColumn {
    /// Key of the value in [`ApiComponentRow`].
    pub name: String,
    /// Human-readable header.
    pub label: String,
}

/// Distinct values available for each facet, sorted.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ApiFacets {
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
    /// Fatal crash flag values present in the data.
    pub fatal_crash: Vec<FatalFlag>,
}

/// Keys of [`ApiComponentRow`], in table display order.
pub const TABLE_COLUMNS: [&str; 29] = [
    "moped_component_id",
    "project_id",
    "project_name",
    "project_lead",
    "component_name",
    "component_name_full",
    "component_subtype",
    "component_work_types",
    "type_name",
    "substantial_completion_date",
    "completion_year",
    "pre_crash_count",
    "post_crash_count",
    "pre_annualized_crash_rate",
    "post_annualized_crash_rate",
    "delta_crash_rate",
    "pre_annualized_fatal_crash_rate",
    "post_annualized_fatal_crash_rate",
    "delta_fatal_crash_rate",
    "pre_annualized_injury_rate",
    "post_annualized_injury_rate",
    "delta_injury_rate",
    "pre_annualized_death_rate",
    "post_annualized_death_rate",
    "delta_death_rate",
    "pre_annualized_cost",
    "post_annualized_cost",
    "delta_comp_cost",
    "component_had_fatal_crash",
];

/// One row of the components table.
///
/// Non-finite rates serialize as `null`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ApiComponentRow {
    /// Component identifier.
    pub moped_component_id: i64,
    /// Project identifier.
    pub project_id: i64,
    /// Project name.
    pub project_name: Option<String>,
    /// Project lead.
    pub project_lead: String,
    /// Component name.
    pub component_name: String,
    /// Full component name.
    pub component_name_full: Option<String>,
    /// Component subtype.
    pub component_subtype: String,
    /// Component work types.
    pub component_work_types: String,
    /// Component type name.
    pub type_name: Option<String>,
    /// Completion date as `YYYY-MM-DD`.
    pub substantial_completion_date: String,
    /// Completion year.
    pub completion_year: i32,
    /// Matched crashes before completion.
    pub pre_crash_count: u64,
    /// Matched crashes after completion.
    pub post_crash_count: u64,
    /// Crashes per year before completion.
    pub pre_annualized_crash_rate: f64,
    /// Crashes per year after completion.
    pub post_annualized_crash_rate: f64,
    /// Change in crashes per year.
    pub delta_crash_rate: f64,
    /// Fatal crashes per year before completion.
    pub pre_annualized_fatal_crash_rate: f64,
    /// Fatal crashes per year after completion.
    pub post_annualized_fatal_crash_rate: f64,
    /// Change in fatal crashes per year.
    pub delta_fatal_crash_rate: f64,
    /// Injuries per year before completion.
    pub pre_annualized_injury_rate: f64,
    /// Injuries per year after completion.
    pub post_annualized_injury_rate: f64,
    /// Change in injuries per year.
    pub delta_injury_rate: f64,
    /// Deaths per year before completion.
    pub pre_annualized_death_rate: f64,
    /// Deaths per year after completion.
    pub post_annualized_death_rate: f64,
    /// Change in deaths per year.
    pub delta_death_rate: f64,
    /// Comprehensive cost per year before completion.
    pub pre_annualized_cost: f64,
    /// Comprehensive cost per year after completion.
    pub post_annualized_cost: f64,
    /// Change in comprehensive cost per year.
    pub delta_comp_cost: f64,
    /// Whether either window saw a fatal crash.
    pub component_had_fatal_crash: FatalFlag,
}
