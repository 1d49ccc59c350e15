//! Closed-form geostationary inverse projection.
//!
//! Each pixel's viewing ray is intersected with the reference ellipsoid by
//! solving a quadratic for the distance `r_s` from the satellite to the
//! surface. Rays that miss Earth have a negative discriminant; the square
//! root then yields NaN and the NaN flows through to latitude and
//! longitude. Nothing here fails or warns on those pixels.
//!
//! Reference: GOES-R PUG Volume 5, Section 4.2.8.

use ndarray::{Array2, Zip};

use crate::parameters::ProjectionParameters;

/// The three radii the transform needs (meters).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EllipsoidGeometry {
    /// Satellite distance from Earth's center
    pub r_orb: f64,
    /// Equatorial radius
    pub r_eq: f64,
    /// Polar radius
    pub r_pol: f64,
}

impl EllipsoidGeometry {
    pub fn new(r_orb: f64, r_eq: f64, r_pol: f64) -> Self {
        Self { r_orb, r_eq, r_pol }
    }

    pub fn from_parameters(params: &ProjectionParameters) -> Self {
        Self {
            r_orb: params.orbital_radius(),
            r_eq: params.semi_major_axis(),
            r_pol: params.semi_minor_axis(),
        }
    }

    /// (r_eq / r_pol)²
    #[inline]
    fn axis_ratio_sq(&self) -> f64 {
        (self.r_eq * self.r_eq) / (self.r_pol * self.r_pol)
    }
}

/// Sines and cosines of the scan angles, expanded to the 2-D grid shape.
#[derive(Debug, Clone)]
pub struct TrigMesh {
    pub sin_x: Array2<f64>,
    pub cos_x: Array2<f64>,
    pub sin_y: Array2<f64>,
    pub cos_y: Array2<f64>,
}

impl TrigMesh {
    /// Evaluate the trig functions once per 1-D angle and broadcast them
    /// as an outer product: x varies along columns, y along rows.
    pub fn from_axes(x: &[f64], y: &[f64]) -> Self {
        let shape = (y.len(), x.len());
        let sin_x: Vec<f64> = x.iter().map(|v| v.sin()).collect();
        let cos_x: Vec<f64> = x.iter().map(|v| v.cos()).collect();
        let sin_y: Vec<f64> = y.iter().map(|v| v.sin()).collect();
        let cos_y: Vec<f64> = y.iter().map(|v| v.cos()).collect();

        Self {
            sin_x: Array2::from_shape_fn(shape, |(_, j)| sin_x[j]),
            cos_x: Array2::from_shape_fn(shape, |(_, j)| cos_x[j]),
            sin_y: Array2::from_shape_fn(shape, |(i, _)| sin_y[i]),
            cos_y: Array2::from_shape_fn(shape, |(i, _)| cos_y[i]),
        }
    }

    pub fn dim(&self) -> (usize, usize) {
        self.sin_x.dim()
    }
}

/// Latitude and longitude (degrees) for one viewing ray.
///
/// Longitude is relative to the sub-satellite meridian; the caller adds
/// `longitude_of_projection_origin`.
#[inline]
pub fn intersect(
    geometry: &EllipsoidGeometry,
    sin_x: f64,
    cos_x: f64,
    sin_y: f64,
    cos_y: f64,
) -> (f64, f64) {
    let r_orb = geometry.r_orb;
    let ratio = geometry.axis_ratio_sq();

    // Quadratic coefficients for the distance to the ellipsoid surface
    let a = sin_x * sin_x + cos_x * cos_x * (cos_y * cos_y + ratio * sin_y * sin_y);
    let b = -2.0 * r_orb * cos_x * cos_y;
    let c = r_orb * r_orb - geometry.r_eq * geometry.r_eq;

    // Negative for rays past the limb: sqrt gives NaN
    let discriminant = b * b - 4.0 * a * c;
    let r_s = (-b - discriminant.sqrt()) / (2.0 * a);

    // Satellite-centered coordinates of the surface point
    let s_x = r_s * cos_x * cos_y;
    let s_y = -r_s * sin_x;
    let s_z = r_s * cos_x * sin_y;

    let lat = (ratio * (s_z / ((r_orb - s_x) * (r_orb - s_x) + s_y * s_y).sqrt())).atan();
    let lon = (s_y / (s_x - r_orb)).atan();

    (lat.to_degrees(), lon.to_degrees())
}

/// Apply [`intersect`] to every cell of the mesh.
///
/// Returns `(latitude, longitude)` in degrees, longitude relative to the
/// sub-satellite meridian.
pub fn core_transform(geometry: &EllipsoidGeometry, mesh: &TrigMesh) -> (Array2<f64>, Array2<f64>) {
    let shape = mesh.dim();
    let mut lat = Array2::<f64>::zeros(shape);
    let mut lon = Array2::<f64>::zeros(shape);

    Zip::from(&mut lat)
        .and(&mut lon)
        .and(&mesh.sin_x)
        .and(&mesh.cos_x)
        .and(&mesh.sin_y)
        .and(&mesh.cos_y)
        .for_each(|lat, lon, &sx, &cx, &sy, &cy| {
            let (phi, lambda) = intersect(geometry, sx, cx, sy, cy);
            *lat = phi;
            *lon = lambda;
        });

    (lat, lon)
}

/// Single-pixel inverse projection: scan angles (radians) to
/// `(latitude, longitude)` degrees. NaN for off-disk angles.
pub fn scan_to_geodetic(params: &ProjectionParameters, x_rad: f64, y_rad: f64) -> (f64, f64) {
    let geometry = EllipsoidGeometry::from_parameters(params);
    let (lat, lon) = intersect(&geometry, x_rad.sin(), x_rad.cos(), y_rad.sin(), y_rad.cos());
    (lat, lon + params.longitude_of_projection_origin())
}

/// Forward projection: geodetic `(latitude, longitude)` degrees to scan
/// angles `(x, y)` in radians.
///
/// Returns `None` if the point is behind the limb as seen from the satellite.
pub fn geodetic_to_scan(params: &ProjectionParameters, lat_deg: f64, lon_deg: f64) -> Option<(f64, f64)> {
    let geometry = EllipsoidGeometry::from_parameters(params);
    let r_orb = geometry.r_orb;
    let lat = lat_deg.to_radians();
    let dlon = (lon_deg - params.longitude_of_projection_origin()).to_radians();

    // Geocentric latitude
    let phi_c = ((geometry.r_pol * geometry.r_pol) / (geometry.r_eq * geometry.r_eq) * lat.tan()).atan();

    // Distance from Earth's center to the surface point
    let e2 = 1.0 - (geometry.r_pol / geometry.r_eq).powi(2);
    let r_c = geometry.r_pol / (1.0 - e2 * phi_c.cos().powi(2)).sqrt();

    let s_x = r_orb - r_c * phi_c.cos() * dlon.cos();
    let s_y = -r_c * phi_c.cos() * dlon.sin();
    let s_z = r_c * phi_c.sin();

    // Hidden by the Earth itself
    if r_orb * (r_orb - s_x) < s_y * s_y + geometry.axis_ratio_sq() * s_z * s_z {
        return None;
    }

    let range = (s_x * s_x + s_y * s_y + s_z * s_z).sqrt();
    let x = (-s_y / range).asin();
    let y = (s_z / s_x).atan();

    Some((x, y))
}
