//! GOES ABI fixed grid projection parameters.
//!
//! The satellite views Earth from a fixed position above the equator and
//! the imager reports every pixel as a pair of scan angles (x, y) in
//! radians from nadir. Turning those angles into ground coordinates needs
//! three groups of numbers, kept here as named fields of one immutable
//! value:
//!
//! - the orbit geometry (sub-satellite longitude, altitude, sweep axis),
//! - the reference ellipsoid (GRS80 for GOES-R),
//! - the 1-D fixed grid scan-angle vectors.
//!
//! Reference: GOES-R Product Definition and Users' Guide (PUG) Volume 5,
//! Section 4.2.8.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{GridError, GridResult};

/// GOES-R perspective point height above the ellipsoid (meters).
pub const GOES_PERSPECTIVE_POINT_HEIGHT: f64 = 35_786_023.0;
/// GRS80 semi-major axis (meters).
pub const GRS80_SEMI_MAJOR_AXIS: f64 = 6_378_137.0;
/// GRS80 semi-minor axis (meters).
pub const GRS80_SEMI_MINOR_AXIS: f64 = 6_356_752.31414;
/// GRS80 inverse flattening.
pub const GRS80_INVERSE_FLATTENING: f64 = 298.2572221;
/// GOES-East nominal sub-satellite longitude (degrees East).
pub const GOES_EAST_LONGITUDE: f64 = -75.0;
/// GOES-West nominal sub-satellite longitude (degrees East).
pub const GOES_WEST_LONGITUDE: f64 = -137.0;

/// Axis the imager sweeps around.
///
/// GOES-R sweeps around x; Meteosat and Himawari sweep around y.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SweepAxis {
    X,
    Y,
}

impl SweepAxis {
    /// The value used in `goes_imager_projection:sweep_angle_axis` and PROJ's `+sweep=`.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::X => "x",
            Self::Y => "y",
        }
    }
}

impl FromStr for SweepAxis {
    type Err = GridError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "x" | "X" => Ok(Self::X),
            "y" | "Y" => Ok(Self::Y),
            other => Err(GridError::configuration(other, "one of: x, y")),
        }
    }
}

impl fmt::Display for SweepAxis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Orbit geometry and satellite attitude.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OrbitGeometry {
    /// Longitude of the ideal sub-satellite point (degrees East)
    pub longitude_of_projection_origin: f64,
    /// Height of the perspective point above the ellipsoid (meters)
    pub perspective_point_height: f64,
    /// Sweep angle axis
    pub sweep_angle_axis: SweepAxis,
}

/// Reference ellipsoid.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Globe {
    /// Equatorial radius (meters)
    pub semi_major_axis: f64,
    /// Polar radius (meters)
    pub semi_minor_axis: f64,
    /// Informational only; the transform works from the two axes.
    pub inverse_flattening: f64,
}

impl Globe {
    /// The GRS80 ellipsoid used by GOES-R.
    pub fn grs80() -> Self {
        Self {
            semi_major_axis: GRS80_SEMI_MAJOR_AXIS,
            semi_minor_axis: GRS80_SEMI_MINOR_AXIS,
            inverse_flattening: GRS80_INVERSE_FLATTENING,
        }
    }
}

/// 1-D fixed grid scan angles (radians).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FixedGrid {
    /// East-West scan angles, one per column
    pub x: Vec<f64>,
    /// North-South elevation angles, one per row
    pub y: Vec<f64>,
}

impl FixedGrid {
    pub fn new(x: Vec<f64>, y: Vec<f64>) -> Self {
        Self { x, y }
    }

    /// Up-cast scan angles stored as 32-bit floats.
    pub fn from_f32(x: &[f32], y: &[f32]) -> Self {
        Self {
            x: x.iter().map(|&v| f64::from(v)).collect(),
            y: y.iter().map(|&v| f64::from(v)).collect(),
        }
    }
}

/// Immutable projection parameters for one dataset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectionParameters {
    orbit: OrbitGeometry,
    globe: Globe,
    fixed_grid: FixedGrid,
}

impl ProjectionParameters {
    /// Validate and assemble the three parameter groups.
    pub fn new(orbit: OrbitGeometry, globe: Globe, fixed_grid: FixedGrid) -> GridResult<Self> {
        check_finite("longitude_of_projection_origin", orbit.longitude_of_projection_origin)?;
        check_finite("perspective_point_height", orbit.perspective_point_height)?;
        check_finite("semi_major_axis", globe.semi_major_axis)?;
        check_finite("semi_minor_axis", globe.semi_minor_axis)?;

        if orbit.perspective_point_height <= 0.0 {
            return Err(GridError::invalid_parameters(format!(
                "perspective_point_height must be > 0, got {}",
                orbit.perspective_point_height
            )));
        }
        if globe.semi_minor_axis <= 0.0 {
            return Err(GridError::invalid_parameters(format!(
                "semi_minor_axis must be > 0, got {}",
                globe.semi_minor_axis
            )));
        }
        if globe.semi_major_axis < globe.semi_minor_axis {
            return Err(GridError::invalid_parameters(format!(
                "semi_major_axis ({}) must be >= semi_minor_axis ({})",
                globe.semi_major_axis, globe.semi_minor_axis
            )));
        }

        check_axis("x", &fixed_grid.x)?;
        check_axis("y", &fixed_grid.y)?;

        Ok(Self {
            orbit,
            globe,
            fixed_grid,
        })
    }

    /// GOES-East (75°W) geometry on the GRS80 ellipsoid.
    pub fn goes_east(x: Vec<f64>, y: Vec<f64>) -> GridResult<Self> {
        Self::goes_at(GOES_EAST_LONGITUDE, x, y)
    }

    /// GOES-West (137°W) geometry on the GRS80 ellipsoid.
    pub fn goes_west(x: Vec<f64>, y: Vec<f64>) -> GridResult<Self> {
        Self::goes_at(GOES_WEST_LONGITUDE, x, y)
    }

    fn goes_at(longitude: f64, x: Vec<f64>, y: Vec<f64>) -> GridResult<Self> {
        Self::new(
            OrbitGeometry {
                longitude_of_projection_origin: longitude,
                perspective_point_height: GOES_PERSPECTIVE_POINT_HEIGHT,
                sweep_angle_axis: SweepAxis::X,
            },
            Globe::grs80(),
            FixedGrid::new(x, y),
        )
    }

    /// Same orbit and globe over different scan angles.
    pub fn with_fixed_grid(&self, fixed_grid: FixedGrid) -> GridResult<Self> {
        Self::new(self.orbit, self.globe, fixed_grid)
    }

    pub fn orbit(&self) -> &OrbitGeometry {
        &self.orbit
    }

    pub fn globe(&self) -> &Globe {
        &self.globe
    }

    pub fn fixed_grid(&self) -> &FixedGrid {
        &self.fixed_grid
    }

    pub fn longitude_of_projection_origin(&self) -> f64 {
        self.orbit.longitude_of_projection_origin
    }

    pub fn perspective_point_height(&self) -> f64 {
        self.orbit.perspective_point_height
    }

    pub fn sweep_angle_axis(&self) -> SweepAxis {
        self.orbit.sweep_angle_axis
    }

    pub fn semi_major_axis(&self) -> f64 {
        self.globe.semi_major_axis
    }

    pub fn semi_minor_axis(&self) -> f64 {
        self.globe.semi_minor_axis
    }

    pub fn inverse_flattening(&self) -> f64 {
        self.globe.inverse_flattening
    }

    /// Scan angles along x (radians).
    pub fn x(&self) -> &[f64] {
        &self.fixed_grid.x
    }

    /// Scan angles along y (radians).
    pub fn y(&self) -> &[f64] {
        &self.fixed_grid.y
    }

    /// Distance from Earth's center to the satellite (meters).
    pub fn orbital_radius(&self) -> f64 {
        self.orbit.perspective_point_height + self.globe.semi_major_axis
    }

    /// x scan angles scaled to meters on the perspective plane.
    pub fn x_m(&self) -> Vec<f64> {
        scale_to_meters(&self.fixed_grid.x, self.orbit.perspective_point_height)
    }

    /// y scan angles scaled to meters on the perspective plane.
    pub fn y_m(&self) -> Vec<f64> {
        scale_to_meters(&self.fixed_grid.y, self.orbit.perspective_point_height)
    }

    /// Grid dimensions as (rows, columns).
    pub fn dimensions(&self) -> (usize, usize) {
        (self.fixed_grid.y.len(), self.fixed_grid.x.len())
    }
}

fn scale_to_meters(angles: &[f64], height: f64) -> Vec<f64> {
    angles.iter().map(|a| a * height).collect()
}

fn check_finite(name: &str, value: f64) -> GridResult<()> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(GridError::invalid_parameters(format!(
            "{} must be finite, got {}",
            name, value
        )))
    }
}

fn check_axis(name: &str, values: &[f64]) -> GridResult<()> {
    if values.is_empty() {
        return Err(GridError::invalid_parameters(format!(
            "scan angle vector '{}' is empty",
            name
        )));
    }
    if let Some(bad) = values.iter().find(|v| !v.is_finite()) {
        return Err(GridError::invalid_parameters(format!(
            "scan angle vector '{}' contains non-finite value {}",
            name, bad
        )));
    }
    let increasing = values.windows(2).all(|w| w[1] > w[0]);
    let decreasing = values.windows(2).all(|w| w[1] < w[0]);
    if !(increasing || decreasing) {
        return Err(GridError::invalid_parameters(format!(
            "scan angle vector '{}' is not strictly monotonic",
            name
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn axis() -> Vec<f64> {
        vec![-0.01, 0.0, 0.01]
    }

    #[test]
    fn test_orbital_radius() {
        let params = ProjectionParameters::goes_east(axis(), axis()).unwrap();
        assert_eq!(params.orbital_radius(), 42_164_160.0);
        assert_eq!(params.dimensions(), (3, 3));
    }

    #[test]
    fn test_scan_angles_in_meters() {
        let params = ProjectionParameters::goes_east(axis(), axis()).unwrap();
        let x_m = params.x_m();
        assert_eq!(x_m[1], 0.0);
        assert!((x_m[2] - 357_860.23).abs() < 1e-6);
    }

    #[test]
    fn test_sweep_axis_parse() {
        assert_eq!("x".parse::<SweepAxis>().unwrap(), SweepAxis::X);
        assert_eq!("y".parse::<SweepAxis>().unwrap(), SweepAxis::Y);
        match "z".parse::<SweepAxis>() {
            Err(GridError::Configuration { token, .. }) => assert_eq!(token, "z"),
            other => panic!("expected configuration error, got {:?}", other),
        }
    }

    #[test]
    fn test_rejects_non_positive_height() {
        let result = ProjectionParameters::new(
            OrbitGeometry {
                longitude_of_projection_origin: -75.0,
                perspective_point_height: 0.0,
                sweep_angle_axis: SweepAxis::X,
            },
            Globe::grs80(),
            FixedGrid::new(axis(), axis()),
        );
        assert!(matches!(result, Err(GridError::InvalidParameters(_))));
    }

    #[test]
    fn test_rejects_inverted_axes() {
        let globe = Globe {
            semi_major_axis: 6_356_752.0,
            semi_minor_axis: 6_378_137.0,
            inverse_flattening: 298.0,
        };
        let orbit = OrbitGeometry {
            longitude_of_projection_origin: -75.0,
            perspective_point_height: GOES_PERSPECTIVE_POINT_HEIGHT,
            sweep_angle_axis: SweepAxis::X,
        };
        let result = ProjectionParameters::new(orbit, globe, FixedGrid::new(axis(), axis()));
        assert!(matches!(result, Err(GridError::InvalidParameters(_))));
    }

    #[test]
    fn test_rejects_non_monotonic_axis() {
        let result = ProjectionParameters::goes_east(vec![0.0, 0.01, 0.005], axis());
        let err = result.unwrap_err();
        assert!(err.to_string().contains("'x'"), "got {}", err);
    }

    #[test]
    fn test_accepts_descending_axis() {
        let params = ProjectionParameters::goes_east(axis(), vec![0.01, 0.0, -0.01]);
        assert!(params.is_ok());
    }

    #[test]
    fn test_from_f32_upcasts() {
        let grid = FixedGrid::from_f32(&[0.5_f32, 0.25], &[0.125_f32]);
        assert_eq!(grid.x, vec![0.5, 0.25]);
        assert_eq!(grid.y, vec![0.125]);
    }
}
