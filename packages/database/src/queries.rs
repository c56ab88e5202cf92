//! The two fixed source queries and their row conversions.
//!
//! Columns are cast in SQL so each one arrives as a single, stable type
//! regardless of how the upstream schema declares it.

use chrono::NaiveDateTime;
use crash_impact_models::{ComponentRow, CrashRow};
use moosicbox_json_utils::database::ToValue as _;
use switchy_database::{Database, Row};

use crate::DbError;

/// Crash records from the Vision Zero database.
pub const CRASH_QUERY: &str = "SELECT crash_id::bigint AS crash_id,
        crash_fatal_fl,
        crash_date::timestamp AS crash_date,
        road_constr_zone_fl,
        latitude::float8 AS latitude,
        longitude::float8 AS longitude,
        tot_injry_cnt::bigint AS tot_injry_cnt,
        death_cnt::bigint AS death_cnt,
        est_comp_cost::float8 AS est_comp_cost
    FROM atd_txdot_crashes";

/// Project components from the project tracking database.
pub const COMPONENT_QUERY: &str = "SELECT project_id::bigint AS project_id,
        project_component_id::bigint AS project_component_id,
        line_geometry::text AS line_geometry,
        substantial_completion_date::timestamp AS substantial_completion_date,
        project_name,
        component_name,
        component_name_full,
        component_subtype,
        project_lead,
        component_work_types::text AS component_work_types,
        type_name
    FROM component_arcgis_online_view";

/// Fetches every crash record.
///
/// # Errors
///
/// Returns [`DbError`] if the query fails or a column has an unexpected
/// type.
pub async fn fetch_crashes(db: &dyn Database) -> Result<Vec<CrashRow>, DbError> {
    let rows = db.query_raw_params(CRASH_QUERY, &[]).await?;
    log::info!("Fetched {} crash records", rows.len());
    rows.iter().map(row_to_crash).collect()
}

/// Fetches every project component.
///
/// # Errors
///
/// Returns [`DbError`] if the query fails or a column has an unexpected
/// type.
pub async fn fetch_components(db: &dyn Database) -> Result<Vec<ComponentRow>, DbError> {
    let rows = db.query_raw_params(COMPONENT_QUERY, &[]).await?;
    log::info!("Fetched {} project components", rows.len());
    rows.iter().map(row_to_component).collect()
}

fn conversion_error(column: &str, e: impl std::fmt::Display) -> DbError {
    DbError::Conversion {
        message: format!("Failed to read column {column}: {e}"),
    }
}

/// Converts a crash query row into a [`CrashRow`].
fn row_to_crash(row: &Row) -> Result<CrashRow, DbError> {
    let crash_date: Option<NaiveDateTime> = row
        .to_value("crash_date")
        .map_err(|e| conversion_error("crash_date", e))?;

    Ok(CrashRow {
        crash_id: row
            .to_value("crash_id")
            .map_err(|e| conversion_error("crash_id", e))?,
        crash_fatal_fl: row
            .to_value("crash_fatal_fl")
            .map_err(|e| conversion_error("crash_fatal_fl", e))?,
        crash_date: crash_date.map(|d| d.and_utc()),
        road_constr_zone_fl: row
            .to_value("road_constr_zone_fl")
            .map_err(|e| conversion_error("road_constr_zone_fl", e))?,
        latitude: row
            .to_value("latitude")
            .map_err(|e| conversion_error("latitude", e))?,
        longitude: row
            .to_value("longitude")
            .map_err(|e| conversion_error("longitude", e))?,
        tot_injry_cnt: row
            .to_value("tot_injry_cnt")
            .map_err(|e| conversion_error("tot_injry_cnt", e))?,
        death_cnt: row
            .to_value("death_cnt")
            .map_err(|e| conversion_error("death_cnt", e))?,
        est_comp_cost: row
            .to_value("est_comp_cost")
            .map_err(|e| conversion_error("est_comp_cost", e))?,
    })
}

/// Converts a component query row into a [`ComponentRow`].
fn row_to_component(row: &Row) -> Result<ComponentRow, DbError> {
    let completion: Option<NaiveDateTime> = row
        .to_value("substantial_completion_date")
        .map_err(|e| conversion_error("substantial_completion_date", e))?;

    Ok(ComponentRow {
        project_id: row
            .to_value("project_id")
            .map_err(|e| conversion_error("project_id", e))?,
        project_component_id: row
            .to_value("project_component_id")
            .map_err(|e| conversion_error("project_component_id", e))?,
        line_geometry: row
            .to_value("line_geometry")
            .map_err(|e| conversion_error("line_geometry", e))?,
        substantial_completion_date: completion.map(|d| d.and_utc()),
        project_name: row
            .to_value("project_name")
            .map_err(|e| conversion_error("project_name", e))?,
        component_name: row
            .to_value("component_name")
            .map_err(|e| conversion_error("component_name", e))?,
        component_name_full: row
            .to_value("component_name_full")
            .map_err(|e| conversion_error("component_name_full", e))?,
        component_subtype: row
            .to_value("component_subtype")
            .map_err(|e| conversion_error("component_subtype", e))?,
        project_lead: row
            .to_value("project_lead")
            .map_err(|e| conversion_error("project_lead", e))?,
        component_work_types: row
            .to_value("component_work_types")
            .map_err(|e| conversion_error("component_work_types", e))?,
        type_name: row
            .to_value("type_name")
            .map_err(|e| conversion_error("type_name", e))?,
    })
}
