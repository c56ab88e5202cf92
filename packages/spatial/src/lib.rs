#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Buffering and spatial join of crashes against project components.
//!
//! Each component's line geometry is projected into UTM zone 14N, buffered
//! by a fixed radius in meters, and projected back to EPSG:4326. The
//! resulting polygons go into an R-tree. Every crash point is then tested
//! against the buffers whose envelopes contain it, and every hit becomes a
//! [`JoinPair`]. Overlapping buffers yield one pair per component; nothing
//! is deduplicated.

pub mod progress;

use std::sync::Arc;

use crash_impact_geometry::{Crs, GeometryError, reproject};
use crash_impact_models::{Crash, ProjectComponent};
use geo::{Buffer as _, Geometry, Intersects as _, MultiPolygon, Point};
use rstar::{AABB, RTree, RTreeObject};

use crate::progress::ProgressCallback;

/// Default buffer radius around component lines, in meters.
pub const DEFAULT_BUFFER_METERS: f64 = 20.0;

/// A buffered component stored in the R-tree.
struct BufferEntry {
    component: usize,
    envelope: AABB<[f64; 2]>,
    polygon: MultiPolygon<f64>,
}

impl RTreeObject for BufferEntry {
    type Envelope = AABB<[f64; 2]>;

    fn envelope(&self) -> Self::Envelope {
        self.envelope
    }
}

/// One crash inside one component buffer, as indexes into the inputs
/// given to [`spatial_join`] and [`BufferIndex::build`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct JoinPair {
    /// Index into the crash slice.
    pub crash: usize,
    /// Index into the component slice.
    pub component: usize,
}

/// R-tree of buffered component polygons in EPSG:4326.
pub struct BufferIndex {
    buffers: RTree<BufferEntry>,
}

impl BufferIndex {
    /// Buffers every component's line geometry and indexes the polygons.
    ///
    /// # Errors
    ///
    /// Returns [`GeometryError`] if a geometry cannot be reprojected.
    pub fn build(components: &[ProjectComponent], buffer_meters: f64) -> Result<Self, GeometryError> {
        let mut entries = Vec::with_capacity(components.len());

        for (component, record) in components.iter().enumerate() {
            let polygon = buffer_geometry(&record.line_geometry, buffer_meters)?;

            let Some(envelope) = compute_envelope(&polygon) else {
                log::warn!(
                    "Component {} produced an empty buffer, skipping",
                    record.component_id
                );
                continue;
            };

            entries.push(BufferEntry {
                component,
                envelope,
                polygon,
            });
        }

        log::info!(
            "Buffered {} components by {buffer_meters} m",
            entries.len()
        );

        Ok(Self {
            buffers: RTree::bulk_load(entries),
        })
    }

    /// Number of indexed buffers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.buffers.size()
    }

    /// Whether no buffers were indexed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.buffers.size() == 0
    }

    /// Indexes of every component whose buffer contains the point, in
    /// ascending order. Points on the buffer boundary count as inside.
    #[must_use]
    pub fn components_containing(&self, point: Point<f64>) -> Vec<usize> {
        let query_env = AABB::from_point([point.x(), point.y()]);

        let mut hits: Vec<usize> = self
            .buffers
            .locate_in_envelope_intersecting(&query_env)
            .filter(|entry| entry.polygon.intersects(&point))
            .map(|entry| entry.component)
            .collect();
        hits.sort_unstable();
        hits
    }
}

/// Buffers a geographic geometry by `meters`, returning the tolerance
/// polygon in EPSG:4326.
///
/// The buffer is computed in UTM zone 14N. Lines always come back as
/// polygons.
///
/// # Errors
///
/// Returns [`GeometryError`] if reprojection fails.
pub fn buffer_geometry(
    geometry: &Geometry<f64>,
    meters: f64,
) -> Result<MultiPolygon<f64>, GeometryError> {
    let projected = reproject(geometry, Crs::Wgs84, Crs::Utm14N)?;
    let buffered = Geometry::MultiPolygon(projected.buffer(meters));

    match reproject(&buffered, Crs::Utm14N, Crs::Wgs84)? {
        Geometry::MultiPolygon(polygon) => Ok(polygon),
        other => Err(GeometryError::UnsupportedGeometryType(format!(
            "{other:?}"
        ))),
    }
}

/// Inner spatial join: every `(crash, component)` pair where the crash
/// lies inside the component's buffer.
///
/// Pairs are ordered by crash index, then component index.
#[must_use]
pub fn spatial_join(
    crashes: &[Crash],
    index: &BufferIndex,
    progress: &Arc<dyn ProgressCallback>,
) -> Vec<JoinPair> {
    progress.set_total(crashes.len() as u64);

    let mut pairs = Vec::new();
    for (crash, record) in crashes.iter().enumerate() {
        pairs.extend(
            index
                .components_containing(record.location)
                .into_iter()
                .map(|component| JoinPair { crash, component }),
        );
        progress.inc(1);
    }

    progress.finish(format!("Spatial join complete -- {} matches", pairs.len()));
    log::info!(
        "Spatial join matched {} crash/component pairs from {} crashes",
        pairs.len(),
        crashes.len()
    );

    pairs
}

/// Compute the bounding box envelope for a [`MultiPolygon`].
fn compute_envelope(mp: &MultiPolygon<f64>) -> Option<AABB<[f64; 2]>> {
    use geo::BoundingRect;

    mp.bounding_rect()
        .map(|rect| AABB::from_corners([rect.min().x, rect.min().y], [rect.max().x, rect.max().y]))
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone as _, Utc};
    use crash_impact_geometry::TransverseMercator;
    use crash_impact_models::ComponentMetadata;
    use geo::LineString;

    use super::*;
    use crate::progress::null_progress;

    fn component(component_id: i64, coords: Vec<(f64, f64)>) -> ProjectComponent {
        ProjectComponent {
            project_id: 1,
            component_id,
            completion_date: Utc.with_ymd_and_hms(2021, 6, 1, 0, 0, 0).unwrap(),
            line_geometry: LineString::from(coords).into(),
            metadata: ComponentMetadata::default(),
        }
    }

    fn crash(id: i64, lon: f64, lat: f64) -> Crash {
        Crash {
            id,
            date: Utc.with_ymd_and_hms(2020, 1, 1, 0, 0, 0).unwrap(),
            fatal: false,
            construction_zone: None,
            injury_count: 0,
            death_count: 0,
            estimated_cost: 0.0,
            location: Point::new(lon, lat),
        }
    }

    /// A point `meters` away from the midpoint of a west-east segment,
    /// measured perpendicular to the segment in UTM space.
    fn offset_from_midpoint(start: (f64, f64), end: (f64, f64), meters: f64) -> (f64, f64) {
        let utm = TransverseMercator::utm_north(14);
        let (x1, y1) = utm.forward(start.0, start.1);
        let (x2, y2) = utm.forward(end.0, end.1);
        let (dx, dy) = (x2 - x1, y2 - y1);
        let len = dx.hypot(dy);
        let (nx, ny) = (-dy / len, dx / len);
        let (mx, my) = ((x1 + x2) / 2.0, (y1 + y2) / 2.0);
        utm.inverse(mx + nx * meters, my + ny * meters)
    }

    const START: (f64, f64) = (-97.7500, 30.2700);
    const END: (f64, f64) = (-97.7480, 30.2700);

    #[test]
    fn crash_19m_from_line_matches() {
        let components = vec![component(1, vec![START, END])];
        let index = BufferIndex::build(&components, DEFAULT_BUFFER_METERS).unwrap();
        let (lon, lat) = offset_from_midpoint(START, END, 19.0);

        let pairs = spatial_join(&[crash(1, lon, lat)], &index, &null_progress());
        assert_eq!(pairs, vec![JoinPair { crash: 0, component: 0 }]);
    }

    #[test]
    fn crash_21m_from_line_does_not_match() {
        let components = vec![component(1, vec![START, END])];
        let index = BufferIndex::build(&components, DEFAULT_BUFFER_METERS).unwrap();
        let (lon, lat) = offset_from_midpoint(START, END, 21.0);
        let (lon_below, lat_below) = offset_from_midpoint(START, END, -21.0);

        let pairs = spatial_join(
            &[crash(1, lon, lat), crash(2, lon_below, lat_below)],
            &index,
            &null_progress(),
        );
        assert!(pairs.is_empty());
    }

    #[test]
    fn overlapping_buffers_produce_one_pair_each() {
        let components = vec![
            component(1, vec![START, END]),
            component(2, vec![START, END]),
            component(3, vec![(-97.70, 30.30), (-97.69, 30.30)]),
        ];
        let index = BufferIndex::build(&components, DEFAULT_BUFFER_METERS).unwrap();
        let (lon, lat) = offset_from_midpoint(START, END, 5.0);

        let pairs = spatial_join(&[crash(1, lon, lat)], &index, &null_progress());
        assert_eq!(
            pairs,
            vec![
                JoinPair { crash: 0, component: 0 },
                JoinPair { crash: 0, component: 1 },
            ]
        );
    }

    #[test]
    fn buffering_a_line_yields_a_polygon() {
        let line: Geometry<f64> = LineString::from(vec![START, END]).into();
        let polygon = buffer_geometry(&line, DEFAULT_BUFFER_METERS).unwrap();
        assert_eq!(polygon.0.len(), 1);
        assert!(polygon.intersects(&Point::new(START.0, START.1)));
    }

    #[test]
    fn no_components_means_no_matches() {
        let index = BufferIndex::build(&[], DEFAULT_BUFFER_METERS).unwrap();
        assert!(index.is_empty());
        let pairs = spatial_join(&[crash(1, START.0, START.1)], &index, &null_progress());
        assert!(pairs.is_empty());
    }
}
