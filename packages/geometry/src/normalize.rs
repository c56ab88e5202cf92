//! Parsing raw geometry payloads into [`geo::Geometry`] values.

use crash_impact_models::{ComponentMetadata, ComponentRow, ProjectComponent};
use geo::Geometry;
use serde_json::Value;
use wkt::{ToWkt as _, TryFromWkt as _};

use crate::GeometryError;

/// `GeoJSON` geometry types that convert cleanly into [`geo::Geometry`].
const SUPPORTED_TYPES: &[&str] = &[
    "Point",
    "MultiPoint",
    "LineString",
    "MultiLineString",
    "Polygon",
    "MultiPolygon",
    "GeometryCollection",
];

/// Parses `GeoJSON` text (a geometry object or a feature) into a geometry.
///
/// # Errors
///
/// Returns [`GeometryError::GeoJson`] if the text is not valid `GeoJSON`, or
/// [`GeometryError::UnsupportedGeometryType`] for unknown geometry types.
pub fn parse_geojson(text: &str) -> Result<Geometry<f64>, GeometryError> {
    let value: Value =
        serde_json::from_str(text).map_err(|e| GeometryError::GeoJson(e.to_string()))?;
    parse_geojson_value(value)
}

/// Parses an already-decoded `GeoJSON` value into a geometry.
///
/// Features are unwrapped to their geometry member.
///
/// # Errors
///
/// Same as [`parse_geojson`].
pub fn parse_geojson_value(value: Value) -> Result<Geometry<f64>, GeometryError> {
    let type_name = value
        .get("type")
        .and_then(Value::as_str)
        .ok_or_else(|| GeometryError::GeoJson("missing \"type\" member".to_string()))?;

    if type_name == "Feature" {
        let inner = value.get("geometry").cloned().unwrap_or(Value::Null);
        if inner.is_null() {
            return Err(GeometryError::GeoJson(
                "feature has no geometry".to_string(),
            ));
        }
        return parse_geojson_value(inner);
    }

    if !SUPPORTED_TYPES.contains(&type_name) {
        return Err(GeometryError::UnsupportedGeometryType(type_name.to_string()));
    }

    let geometry = geojson::Geometry::from_json_value(value)
        .map_err(|e| GeometryError::GeoJson(e.to_string()))?;

    Geometry::<f64>::try_from(geometry).map_err(|e| GeometryError::GeoJson(e.to_string()))
}

/// Parses a WKT string into a geometry.
///
/// # Errors
///
/// Returns [`GeometryError::Wkt`] if the string is not valid WKT.
pub fn parse_wkt(text: &str) -> Result<Geometry<f64>, GeometryError> {
    Geometry::<f64>::try_from_wkt_str(text.trim()).map_err(|e| GeometryError::Wkt(e.to_string()))
}

/// Serializes a geometry as WKT.
#[must_use]
pub fn to_wkt(geometry: &Geometry<f64>) -> String {
    geometry.wkt_string()
}

/// Turns a raw component row into a [`ProjectComponent`].
///
/// Returns `Ok(None)` when the row has no completion date or no line
/// geometry. Those components never take part in the join.
///
/// # Errors
///
/// Returns [`GeometryError`] if the line geometry is present but cannot be
/// parsed.
pub fn normalize_component(row: &ComponentRow) -> Result<Option<ProjectComponent>, GeometryError> {
    let Some(completion_date) = row.substantial_completion_date else {
        return Ok(None);
    };
    let Some(raw) = row
        .line_geometry
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty() && *s != "null")
    else {
        return Ok(None);
    };

    let line_geometry = parse_geojson(raw)?;

    Ok(Some(ProjectComponent {
        project_id: row.project_id,
        component_id: row.project_component_id,
        completion_date,
        line_geometry,
        metadata: ComponentMetadata::from(row),
    }))
}

/// Normalizes every row, dropping components without a completion date or
/// line geometry.
///
/// # Errors
///
/// Fails on the first row whose geometry cannot be parsed.
pub fn normalize_components(rows: &[ComponentRow]) -> Result<Vec<ProjectComponent>, GeometryError> {
    let mut components = Vec::with_capacity(rows.len());

    for row in rows {
        match normalize_component(row) {
            Ok(Some(component)) => components.push(component),
            Ok(None) => {
                log::debug!(
                    "Dropping component {} (project {}): missing completion date or line geometry",
                    row.project_component_id,
                    row.project_id
                );
            }
            Err(e) => {
                log::error!(
                    "Component {} (project {}) has an unusable line geometry: {e}",
                    row.project_component_id,
                    row.project_id
                );
                return Err(e);
            }
        }
    }

    log::info!(
        "{} of {} components have a completion date and line geometry",
        components.len(),
        rows.len()
    );

    Ok(components)
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone as _, Utc};

    use super::*;

    const LINE: &str = r#"{"type":"LineString","coordinates":[[-97.74,30.27],[-97.73,30.27]]}"#;

    fn row() -> ComponentRow {
        ComponentRow {
            project_id: 10,
            project_component_id: 100,
            line_geometry: Some(LINE.to_string()),
            substantial_completion_date: Some(Utc.with_ymd_and_hms(2021, 6, 1, 0, 0, 0).unwrap()),
            project_name: Some("Shoal Creek".to_string()),
            component_name: Some("Bike Lane".to_string()),
            component_name_full: Some("Bike Lane - Protected".to_string()),
            component_subtype: Some("Protected".to_string()),
            project_lead: Some("Transportation".to_string()),
            component_work_types: Some("New".to_string()),
            type_name: Some("Line".to_string()),
        }
    }

    #[test]
    fn parses_linestring() {
        let geometry = parse_geojson(LINE).unwrap();
        assert!(matches!(geometry, Geometry::LineString(ref ls) if ls.0.len() == 2));
    }

    #[test]
    fn parses_multilinestring_inside_feature() {
        let text = r#"{"type":"Feature","properties":{},"geometry":{"type":"MultiLineString","coordinates":[[[0,0],[1,1]],[[2,2],[3,3]]]}}"#;
        let geometry = parse_geojson(text).unwrap();
        assert!(matches!(geometry, Geometry::MultiLineString(ref mls) if mls.0.len() == 2));
    }

    #[test]
    fn rejects_unsupported_type() {
        let err = parse_geojson(r#"{"type":"Circle","coordinates":[0,0]}"#).unwrap_err();
        assert!(matches!(err, GeometryError::UnsupportedGeometryType(ref t) if t == "Circle"));
    }

    #[test]
    fn rejects_malformed_json() {
        assert!(matches!(
            parse_geojson("{not json").unwrap_err(),
            GeometryError::GeoJson(_)
        ));
    }

    #[test]
    fn wkt_round_trips_through_text() {
        let geometry = parse_geojson(LINE).unwrap();
        let text = to_wkt(&geometry);
        assert!(text.starts_with("LINESTRING"));
        assert_eq!(parse_wkt(&text).unwrap(), geometry);
    }

    #[test]
    fn rejects_bad_wkt() {
        assert!(matches!(
            parse_wkt("LINESTRING(oops)").unwrap_err(),
            GeometryError::Wkt(_)
        ));
    }

    #[test]
    fn component_without_completion_date_is_dropped() {
        let mut r = row();
        r.substantial_completion_date = None;
        assert!(normalize_component(&r).unwrap().is_none());
    }

    #[test]
    fn component_without_line_geometry_is_dropped() {
        let mut r = row();
        r.line_geometry = None;
        assert!(normalize_component(&r).unwrap().is_none());

        r.line_geometry = Some("null".to_string());
        assert!(normalize_component(&r).unwrap().is_none());
    }

    #[test]
    fn complete_component_is_kept_with_metadata() {
        let component = normalize_component(&row()).unwrap().unwrap();
        assert_eq!(component.component_id, 100);
        assert_eq!(component.project_id, 10);
        assert_eq!(
            component.metadata.component_subtype.as_deref(),
            Some("Protected")
        );
    }

    #[test]
    fn normalize_components_filters_incomplete_rows() {
        let mut missing_date = row();
        missing_date.project_component_id = 101;
        missing_date.substantial_completion_date = None;
        let mut missing_geometry = row();
        missing_geometry.project_component_id = 102;
        missing_geometry.line_geometry = None;

        let components = normalize_components(&[row(), missing_date, missing_geometry]).unwrap();
        let ids: Vec<i64> = components.iter().map(|c| c.component_id).collect();
        assert_eq!(ids, vec![100]);
    }
}
