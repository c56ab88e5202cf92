//! Coordinate reference system transforms.
//!
//! Buffers are computed in meters, so project geometries are moved from
//! geographic coordinates (EPSG:4326) into UTM zone 14N (EPSG:32614) and
//! back again. The default implementation is a transverse Mercator using
//! the Krüger series on the WGS84 ellipsoid, which is accurate to well
//! under a millimeter inside the zone. Enabling the `proj` feature routes
//! the same transforms through PROJ instead.

use geo::Geometry;

use crate::GeometryError;

/// WGS84 semi-major axis in meters.
const WGS84_A: f64 = 6_378_137.0;
/// WGS84 flattening.
const WGS84_F: f64 = 1.0 / 298.257_223_563;
/// UTM scale factor on the central meridian.
const UTM_SCALE: f64 = 0.9996;
/// UTM false easting in meters.
const UTM_FALSE_EASTING: f64 = 500_000.0;

/// Coordinate reference systems used by the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Crs {
    /// Geographic longitude/latitude (EPSG:4326).
    Wgs84,
    /// UTM zone 14N in meters (EPSG:32614).
    Utm14N,
}

impl Crs {
    /// EPSG code of this system.
    #[must_use]
    pub const fn epsg(self) -> u32 {
        match self {
            Self::Wgs84 => 4326,
            Self::Utm14N => 32614,
        }
    }
}

/// Transverse Mercator projection on the WGS84 ellipsoid.
#[derive(Debug, Clone, PartialEq)]
pub struct TransverseMercator {
    central_meridian: f64,
    false_easting: f64,
    false_northing: f64,
    /// `k0 * A`, the scaled rectifying radius.
    radius: f64,
    /// `2 * sqrt(n) / (1 + n)`, used for the conformal latitude.
    conformal: f64,
    alpha: [f64; 3],
    beta: [f64; 3],
    delta: [f64; 3],
}

impl TransverseMercator {
    /// UTM projection for a northern-hemisphere zone.
    #[must_use]
    pub fn utm_north(zone: u8) -> Self {
        let central_meridian = f64::from(zone).mul_add(6.0, -183.0);
        Self::new(central_meridian, UTM_SCALE, UTM_FALSE_EASTING, 0.0)
    }

    /// Builds a projection with the given central meridian (degrees), scale
    /// factor, and false origin (meters).
    #[must_use]
    pub fn new(central_meridian: f64, scale: f64, false_easting: f64, false_northing: f64) -> Self {
        let n = WGS84_F / (2.0 - WGS84_F);
        let n2 = n * n;
        let n3 = n2 * n;
        let a = WGS84_A / (1.0 + n) * (1.0 + n2 / 4.0 + n2 * n2 / 64.0);

        Self {
            central_meridian,
            false_easting,
            false_northing,
            radius: scale * a,
            conformal: 2.0 * n.sqrt() / (1.0 + n),
            alpha: [
                n / 2.0 - 2.0 * n2 / 3.0 + 5.0 * n3 / 16.0,
                13.0 * n2 / 48.0 - 3.0 * n3 / 5.0,
                61.0 * n3 / 240.0,
            ],
            beta: [
                n / 2.0 - 2.0 * n2 / 3.0 + 37.0 * n3 / 96.0,
                n2 / 48.0 + n3 / 15.0,
                17.0 * n3 / 480.0,
            ],
            delta: [
                2.0 * n - 2.0 * n2 / 3.0 - 2.0 * n3,
                7.0 * n2 / 3.0 - 8.0 * n3 / 5.0,
                56.0 * n3 / 15.0,
            ],
        }
    }

    /// Projects longitude/latitude degrees to easting/northing meters.
    #[must_use]
    pub fn forward(&self, lon: f64, lat: f64) -> (f64, f64) {
        let phi = lat.to_radians();
        let dl = (lon - self.central_meridian).to_radians();

        let sin_phi = phi.sin();
        let t = self
            .conformal
            .mul_add(-(self.conformal * sin_phi).atanh(), sin_phi.atanh())
            .sinh();
        let xi_p = (t / dl.cos()).atan();
        let eta_p = (dl.sin() / t.mul_add(t, 1.0).sqrt()).atanh();

        let mut xi = xi_p;
        let mut eta = eta_p;
        for (j, alpha) in self.alpha.iter().enumerate() {
            let k = series_order(j);
            xi += alpha * (k * xi_p).sin() * (k * eta_p).cosh();
            eta += alpha * (k * xi_p).cos() * (k * eta_p).sinh();
        }

        (
            self.radius.mul_add(eta, self.false_easting),
            self.radius.mul_add(xi, self.false_northing),
        )
    }

    /// Converts easting/northing meters back to longitude/latitude degrees.
    #[must_use]
    pub fn inverse(&self, easting: f64, northing: f64) -> (f64, f64) {
        let xi = (northing - self.false_northing) / self.radius;
        let eta = (easting - self.false_easting) / self.radius;

        let mut xi_p = xi;
        let mut eta_p = eta;
        for (j, beta) in self.beta.iter().enumerate() {
            let k = series_order(j);
            xi_p -= beta * (k * xi).sin() * (k * eta).cosh();
            eta_p -= beta * (k * xi).cos() * (k * eta).sinh();
        }

        let chi = (xi_p.sin() / eta_p.cosh()).asin();
        let mut phi = chi;
        for (j, delta) in self.delta.iter().enumerate() {
            phi += delta * (series_order(j) * chi).sin();
        }

        let lon = self.central_meridian + (eta_p.sinh() / xi_p.cos()).atan().to_degrees();
        (lon, phi.to_degrees())
    }
}

/// `2 * (j + 1)` as a float, the multiplier for the j-th series term.
#[allow(clippy::cast_precision_loss)]
const fn series_order(j: usize) -> f64 {
    (2 * (j + 1)) as f64
}

/// Reprojects a geometry between two coordinate systems.
///
/// # Errors
///
/// Returns [`GeometryError::Projection`] if the transform fails (only
/// possible with the `proj` feature).
#[cfg(not(feature = "proj"))]
pub fn reproject(
    geometry: &Geometry<f64>,
    from: Crs,
    to: Crs,
) -> Result<Geometry<f64>, GeometryError> {
    use geo::MapCoords as _;

    let utm = TransverseMercator::utm_north(14);
    let projected = match (from, to) {
        (Crs::Wgs84, Crs::Utm14N) => geometry.map_coords(|c| {
            let (x, y) = utm.forward(c.x, c.y);
            geo::coord! { x: x, y: y }
        }),
        (Crs::Utm14N, Crs::Wgs84) => geometry.map_coords(|c| {
            let (x, y) = utm.inverse(c.x, c.y);
            geo::coord! { x: x, y: y }
        }),
        (Crs::Wgs84, Crs::Wgs84) | (Crs::Utm14N, Crs::Utm14N) => geometry.clone(),
    };

    Ok(projected)
}

/// Reprojects a geometry between two coordinate systems using PROJ.
///
/// # Errors
///
/// Returns [`GeometryError::Projection`] if PROJ cannot build the
/// transform or a coordinate fails to convert.
#[cfg(feature = "proj")]
pub fn reproject(
    geometry: &Geometry<f64>,
    from: Crs,
    to: Crs,
) -> Result<Geometry<f64>, GeometryError> {
    use geo::MapCoords as _;

    if from == to {
        return Ok(geometry.clone());
    }

    let error = |message: String| GeometryError::Projection {
        from: from.epsg(),
        to: to.epsg(),
        message,
    };

    let transformer = proj::Proj::new_known_crs(
        &format!("EPSG:{}", from.epsg()),
        &format!("EPSG:{}", to.epsg()),
        None,
    )
    .map_err(|e| error(e.to_string()))?;

    geometry.try_map_coords(|c| {
        transformer
            .convert((c.x, c.y))
            .map(|(x, y)| geo::coord! { x: x, y: y })
            .map_err(|e| error(e.to_string()))
    })
}
