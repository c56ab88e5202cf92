#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Geometry normalization and coordinate projection.
//!
//! Project geometries arrive as `GeoJSON` objects from the project database
//! and as WKT from the published statistics file. Both are parsed into
//! [`geo::Geometry`] values here. Buffering needs a metric coordinate
//! system, so [`projection`] converts between EPSG:4326 and UTM zone 14N.

pub mod normalize;
pub mod projection;

pub use normalize::{
    normalize_component, normalize_components, parse_geojson, parse_geojson_value, parse_wkt,
    to_wkt,
};
pub use projection::{Crs, TransverseMercator, reproject};

/// Errors raised while parsing or transforming geometries.
#[derive(Debug, thiserror::Error)]
pub enum GeometryError {
    /// The geometry's `type` is not one we know how to handle.
    #[error("Unsupported geometry type: {0}")]
    UnsupportedGeometryType(String),

    /// The `GeoJSON` payload could not be parsed.
    #[error("Invalid GeoJSON: {0}")]
    GeoJson(String),

    /// The WKT payload could not be parsed.
    #[error("Invalid WKT: {0}")]
    Wkt(String),

    /// Coordinate transformation failed.
    #[error("Projection from EPSG:{from} to EPSG:{to} failed: {message}")]
    Projection {
        /// Source EPSG code.
        from: u32,
        /// Target EPSG code.
        to: u32,
        /// Description of what went wrong.
        message: String,
    },
}
