//! `GeoJSON` rendering of filtered components for the map.

use geo::{Geometry, Simplify as _};
use geojson::{Feature, FeatureCollection, JsonObject};

use crate::dataset::DashboardRow;

/// Builds a feature collection from filtered rows.
///
/// Rows without a geometry are skipped. At most `max_features` features
/// are emitted. Each feature carries the table row as properties plus a
/// pre-rendered `tooltip`.
#[must_use]
pub fn feature_collection<'a>(
    rows: impl Iterator<Item = &'a DashboardRow>,
    simplify_tolerance: f64,
    max_features: usize,
) -> FeatureCollection {
    let features = rows
        .filter_map(|row| {
            let geometry = row.statistics.line_geometry.as_ref()?;
            Some(to_feature(row, &simplify(geometry, simplify_tolerance)))
        })
        .take(max_features)
        .collect();

    FeatureCollection {
        bbox: None,
        features,
        foreign_members: None,
    }
}

/// Douglas-Peucker simplification for the line and area variants; other
/// geometries pass through unchanged.
#[must_use]
pub fn simplify(geometry: &Geometry<f64>, tolerance: f64) -> Geometry<f64> {
    if tolerance <= 0.0 {
        return geometry.clone();
    }

    match geometry {
        Geometry::LineString(g) => Geometry::LineString(g.simplify(tolerance)),
        Geometry::MultiLineString(g) => Geometry::MultiLineString(g.simplify(tolerance)),
        Geometry::Polygon(g) => Geometry::Polygon(g.simplify(tolerance)),
        Geometry::MultiPolygon(g) => Geometry::MultiPolygon(g.simplify(tolerance)),
        Geometry::GeometryCollection(g) => Geometry::GeometryCollection(
            g.iter().map(|inner| simplify(inner, tolerance)).collect(),
        ),
        other => other.clone(),
    }
}

fn to_feature(row: &DashboardRow, geometry: &Geometry<f64>) -> Feature {
    let mut properties = match serde_json::to_value(row.to_api()) {
        Ok(serde_json::Value::Object(map)) => map,
        _ => JsonObject::new(),
    };
    properties.insert("tooltip".to_string(), tooltip(row).into());

    Feature {
        bbox: None,
        geometry: Some(geojson::Geometry::new(geojson::Value::from(geometry))),
        id: Some(geojson::feature::Id::Number(
            row.statistics.moped_component_id.into(),
        )),
        properties: Some(properties),
        foreign_members: None,
    }
}

/// HTML tooltip text for a component.
#[must_use]
pub fn tooltip(row: &DashboardRow) -> String {
    let s = &row.statistics;
    let name = s
        .metadata
        .component_name_full
        .as_deref()
        .unwrap_or(&row.component_name);

    format!(
        "<b>{}</b><br>Component {} ({})<br>Completed {}<br>\
         Crashes/yr: {} pre, {} post<br>Fatal crashes/yr: {} pre, {} post<br>\
         Had fatal crash: {}",
        escape_html(name),
        s.moped_component_id,
        escape_html(&row.work_types),
        s.substantial_completion_date.format("%Y-%m-%d"),
        format_rate(s.pre_rates.crash_rate),
        format_rate(s.post_rates.crash_rate),
        format_rate(s.pre_rates.fatal_crash_rate),
        format_rate(s.post_rates.fatal_crash_rate),
        row.had_fatal_crash,
    )
}

fn format_rate(rate: f64) -> String {
    if rate.is_nan() {
        "NA".to_string()
    } else {
        format!("{rate:.2}")
    }
}

/// Escapes text for use in HTML content or a quoted attribute.
pub(crate) fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            c => escaped.push(c),
        }
    }
    escaped
}

#[cfg(test)]
mod tests {
    use geo::{CoordsIter as _, LineString};

    use super::*;
    use crate::dataset::tests::statistics_row;

    fn rows() -> Vec<DashboardRow> {
        (1..=5)
            .map(|i| DashboardRow::new(statistics_row(i, 2020, "Bike Lane", None, 0.0)))
            .collect()
    }

    #[test]
    fn features_are_capped() {
        let rows = rows();
        let collection = feature_collection(rows.iter(), 0.0001, 3);
        assert_eq!(collection.features.len(), 3);
    }

    #[test]
    fn rows_without_geometry_are_skipped() {
        let mut rows = rows();
        rows[0].statistics.line_geometry = None;
        let collection = feature_collection(rows.iter(), 0.0, 10);
        assert_eq!(collection.features.len(), 4);
    }

    #[test]
    fn features_carry_tooltip_and_row_properties() {
        let rows = rows();
        let collection = feature_collection(rows.iter().take(1), 0.0, 10);
        let feature = &collection.features[0];
        let properties = feature.properties.as_ref().unwrap();

        assert_eq!(properties["moped_component_id"], serde_json::json!(1));
        assert_eq!(properties["component_had_fatal_crash"], serde_json::json!("No"));
        let tooltip = properties["tooltip"].as_str().unwrap();
        assert!(tooltip.contains("Bike Lane"));
        assert!(tooltip.contains("Completed 2020-06-01"));
        assert!(feature.geometry.is_some());
    }

    #[test]
    fn simplify_drops_near_collinear_vertices() {
        let line: Geometry<f64> = LineString::from(vec![
            (0.0, 0.0),
            (1.0, 0.000_01),
            (2.0, 0.0),
        ])
        .into();
        assert_eq!(simplify(&line, 0.001).coords_count(), 2);
        assert_eq!(simplify(&line, 0.0).coords_count(), 3);
    }

    #[test]
    fn tooltip_escapes_markup() {
        let mut row = DashboardRow::new(statistics_row(1, 2020, "Bike Lane", None, 0.0));
        row.statistics.metadata.component_name_full = Some("<script>".to_string());
        assert!(tooltip(&row).contains("&lt;script&gt;"));
    }

    #[test]
    fn escape_html_covers_attribute_quotes() {
        assert_eq!(
            escape_html(r#"Tom's "Lane" <A&B>"#),
            "Tom&#39;s &quot;Lane&quot; &lt;A&amp;B&gt;"
        );
    }
}
