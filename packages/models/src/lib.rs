#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Source record types for crash impact analysis.
//!
//! Raw rows come straight from the crash and project databases
//! ([`CrashRow`], [`ComponentRow`]). They are normalized into [`Crash`] and
//! [`ProjectComponent`] values that carry real geometries and are
//! guaranteed to have everything the spatial join needs. A
//! [`CrashComponentMatch`] is one pairing produced by that join.

pub mod labels;

use chrono::{DateTime, Utc};
use geo::{Geometry, Point};
use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

/// Value of `crash_fatal_fl` that marks a fatal crash.
pub const FATAL_FLAG_VALUE: &str = "Y";

/// A crash record as read from the crash database.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CrashRow {
    /// Crash identifier.
    pub crash_id: i64,
    /// Fatality flag (`"Y"` / `"N"`).
    pub crash_fatal_fl: Option<String>,
    /// When the crash happened.
    pub crash_date: Option<DateTime<Utc>>,
    /// Construction zone flag.
    pub road_constr_zone_fl: Option<String>,
    /// Latitude (WGS84).
    pub latitude: Option<f64>,
    /// Longitude (WGS84).
    pub longitude: Option<f64>,
    /// Total injury count.
    pub tot_injry_cnt: Option<i64>,
    /// Death count.
    pub death_cnt: Option<i64>,
    /// Estimated comprehensive cost.
    pub est_comp_cost: Option<f64>,
}

/// A crash that has a location and a date, ready to be joined.
#[derive(Debug, Clone, PartialEq)]
pub struct Crash {
    /// Crash identifier.
    pub id: i64,
    /// When the crash happened.
    pub date: DateTime<Utc>,
    /// Whether the crash was flagged fatal.
    pub fatal: bool,
    /// Construction zone flag, passed through untouched.
    pub construction_zone: Option<String>,
    /// Total injuries (missing counts as zero).
    pub injury_count: i64,
    /// Total deaths (missing counts as zero).
    pub death_count: i64,
    /// Estimated comprehensive cost (missing counts as zero).
    pub estimated_cost: f64,
    /// Crash location as `(longitude, latitude)`.
    pub location: Point<f64>,
}

impl Crash {
    /// Builds a [`Crash`] from a raw row.
    ///
    /// Returns `None` when the row has no latitude, no longitude, or no
    /// date: such crashes can never be placed or windowed.
    #[must_use]
    pub fn from_row(row: &CrashRow) -> Option<Self> {
        let latitude = row.latitude?;
        let longitude = row.longitude?;
        let date = row.crash_date?;

        Some(Self {
            id: row.crash_id,
            date,
            fatal: row.crash_fatal_fl.as_deref() == Some(FATAL_FLAG_VALUE),
            construction_zone: row.road_constr_zone_fl.clone(),
            injury_count: row.tot_injry_cnt.unwrap_or(0),
            death_count: row.death_cnt.unwrap_or(0),
            estimated_cost: row.est_comp_cost.unwrap_or(0.0),
            location: Point::new(longitude, latitude),
        })
    }

    /// `1` for a fatal crash, `0` otherwise.
    #[must_use]
    pub const fn fatal_binary(&self) -> u32 {
        if self.fatal { 1 } else { 0 }
    }
}

/// A project component row as read from the project database.
///
/// `line_geometry` is the raw `GeoJSON` text of the column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComponentRow {
    /// Project identifier.
    pub project_id: i64,
    /// Component identifier.
    pub project_component_id: i64,
    /// Raw `GeoJSON` line geometry.
    pub line_geometry: Option<String>,
    /// Substantial completion date.
    pub substantial_completion_date: Option<DateTime<Utc>>,
    /// Project name.
    pub project_name: Option<String>,
    /// Short component name (e.g. "Bike Lane").
    pub component_name: Option<String>,
    /// Full component name including subtype.
    pub component_name_full: Option<String>,
    /// Component subtype.
    pub component_subtype: Option<String>,
    /// Lead agency for the project.
    pub project_lead: Option<String>,
    /// Comma separated work types.
    pub component_work_types: Option<String>,
    /// Component type name.
    pub type_name: Option<String>,
}

/// Descriptive component fields carried through to the statistics output.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComponentMetadata {
    /// Project name.
    pub project_name: Option<String>,
    /// Lead agency for the project.
    pub project_lead: Option<String>,
    /// Component type name.
    pub type_name: Option<String>,
    /// Short component name.
    pub component_name: Option<String>,
    /// Full component name.
    pub component_name_full: Option<String>,
    /// Component subtype.
    pub component_subtype: Option<String>,
    /// Comma separated work types.
    pub component_work_types: Option<String>,
}

impl From<&ComponentRow> for ComponentMetadata {
    fn from(row: &ComponentRow) -> Self {
        Self {
            project_name: row.project_name.clone(),
            project_lead: row.project_lead.clone(),
            type_name: row.type_name.clone(),
            component_name: row.component_name.clone(),
            component_name_full: row.component_name_full.clone(),
            component_subtype: row.component_subtype.clone(),
            component_work_types: row.component_work_types.clone(),
        }
    }
}

/// A project component with a completion date and a parsed line geometry.
#[derive(Debug, Clone, PartialEq)]
pub struct ProjectComponent {
    /// Project identifier.
    pub project_id: i64,
    /// Component identifier. Doubles as the `moped_component_id` that
    /// statistics are grouped by.
    pub component_id: i64,
    /// Substantial completion date.
    pub completion_date: DateTime<Utc>,
    /// Line geometry in EPSG:4326.
    pub line_geometry: Geometry<f64>,
    /// Descriptive fields.
    pub metadata: ComponentMetadata,
}

/// One crash falling inside one component's buffer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CrashComponentMatch {
    /// `"{crash_id}-{project_id}-{project_component_id}"`.
    pub crash_project_component_id: String,
    /// Crash identifier.
    pub crash_id: i64,
    /// Project identifier.
    pub project_id: i64,
    /// Component identifier (`moped_component_id`).
    pub moped_component_id: i64,
    /// When the crash happened.
    pub crash_date: DateTime<Utc>,
    /// Component completion date.
    pub substantial_completion_date: DateTime<Utc>,
    /// `1` when the crash was fatal.
    pub crash_fatal_binary: u32,
    /// Crash happened strictly before completion.
    pub crash_pre_completion: bool,
    /// Crash happened strictly after completion.
    pub crash_post_completion: bool,
    /// Completion date minus crash date, in whole days.
    pub crash_project_date_diff: i64,
    /// Injuries in the crash.
    pub tot_injry_cnt: i64,
    /// Deaths in the crash.
    pub death_cnt: i64,
    /// Estimated comprehensive cost of the crash.
    pub est_comp_cost: f64,
    /// Construction zone flag of the crash.
    pub road_constr_zone_fl: Option<String>,
}

impl CrashComponentMatch {
    /// Builds the composite key for a crash/component pairing.
    #[must_use]
    pub fn composite_key(crash_id: i64, project_id: i64, component_id: i64) -> String {
        format!("{crash_id}-{project_id}-{component_id}")
    }
}

/// Display flag for whether a component saw any fatal crash.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
pub enum FatalFlag {
    /// At least one fatal crash in either window.
    Yes,
    /// No fatal crash in either window.
    No,
}

impl FatalFlag {
    /// Derives the flag from the pre/post annualized fatal crash rates.
    ///
    /// `NaN` rates compare false and therefore count as "no".
    #[must_use]
    pub fn from_rates(pre_rate: f64, post_rate: f64) -> Self {
        if pre_rate > 0.0 || post_rate > 0.0 {
            Self::Yes
        } else {
            Self::No
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone as _;

    use super::*;

    fn crash_row() -> CrashRow {
        CrashRow {
            crash_id: 17,
            crash_fatal_fl: Some("Y".to_string()),
            crash_date: Some(Utc.with_ymd_and_hms(2020, 1, 1, 0, 0, 0).unwrap()),
            road_constr_zone_fl: Some("N".to_string()),
            latitude: Some(30.2672),
            longitude: Some(-97.7431),
            tot_injry_cnt: None,
            death_cnt: Some(1),
            est_comp_cost: None,
        }
    }

    #[test]
    fn crash_from_row_builds_lng_lat_point() {
        let crash = Crash::from_row(&crash_row()).unwrap();
        assert!((crash.location.x() - -97.7431).abs() < f64::EPSILON);
        assert!((crash.location.y() - 30.2672).abs() < f64::EPSILON);
        assert_eq!(crash.fatal_binary(), 1);
        assert_eq!(crash.injury_count, 0);
        assert_eq!(crash.death_count, 1);
        assert!(crash.estimated_cost.abs() < f64::EPSILON);
    }

    #[test]
    fn crash_without_coordinates_is_dropped() {
        let mut row = crash_row();
        row.latitude = None;
        assert!(Crash::from_row(&row).is_none());

        let mut row = crash_row();
        row.longitude = None;
        assert!(Crash::from_row(&row).is_none());
    }

    #[test]
    fn non_y_fatal_flag_is_not_fatal() {
        let mut row = crash_row();
        row.crash_fatal_fl = Some("N".to_string());
        assert_eq!(Crash::from_row(&row).unwrap().fatal_binary(), 0);

        row.crash_fatal_fl = None;
        assert_eq!(Crash::from_row(&row).unwrap().fatal_binary(), 0);
    }

    #[test]
    fn composite_key_joins_ids_with_dashes() {
        assert_eq!(CrashComponentMatch::composite_key(1, 22, 333), "1-22-333");
    }

    #[test]
    fn fatal_flag_from_rates() {
        assert_eq!(FatalFlag::from_rates(0.0, 0.5), FatalFlag::Yes);
        assert_eq!(FatalFlag::from_rates(0.2, 0.0), FatalFlag::Yes);
        assert_eq!(FatalFlag::from_rates(0.0, 0.0), FatalFlag::No);
        assert_eq!(FatalFlag::from_rates(f64::NAN, -1.0), FatalFlag::No);
        assert_eq!("Yes".parse::<FatalFlag>().unwrap(), FatalFlag::Yes);
        assert_eq!(FatalFlag::No.to_string(), "No");
    }
}
