//! Quadrant-symmetry accelerated transform.
//!
//! A full-disk ABI fixed grid is symmetric about nadir: `x` runs from -α to
//! α and `y` is `x` reversed. Latitude is then even in x and odd in y,
//! longitude (relative to the sub-satellite meridian) odd in x and even in
//! y. Only the north-east quadrant goes through the transform; the other
//! three are filled by index mirroring with sign flips. For odd lengths the
//! center row and column belong to the quadrant and are not duplicated.

use ndarray::Array2;
use tracing::warn;

use crate::assembler::{assemble_direct, require_x_sweep, LatLon, ScanAxes};
use crate::error::GridResult;
use crate::mask::make_common_mask;
use crate::parameters::ProjectionParameters;
use crate::transform::{core_transform, EllipsoidGeometry, TrigMesh};

/// Allowed asymmetry in units of f64 epsilon times the largest |x|.
///
/// Mirrored cells reuse the transform of the opposite scan angle, so any
/// asymmetry shows up directly in the output. A few ULPs only absorbs
/// rounding in how the axis was generated; axes unpacked from 32-bit
/// scale/offset land well outside it and take the direct path.
const SYMMETRY_ULPS: f64 = 4.0;

/// True when the quadrant shortcut reproduces the full transform.
///
/// Requires a square grid with `x` symmetric about zero and `y` equal to
/// `x` reversed, up to a few ULPs of the axis magnitude.
pub fn is_quadrant_symmetric(axes: &ScanAxes) -> bool {
    let x = &axes.x;
    let y = &axes.y;
    let n = x.len();
    if n == 0 || y.len() != n {
        return false;
    }

    let magnitude = x.iter().fold(0.0_f64, |acc, v| acc.max(v.abs()));
    let tolerance = SYMMETRY_ULPS * f64::EPSILON * magnitude;

    (0..n).all(|i| {
        let mirrored = n - 1 - i;
        (x[i] + x[mirrored]).abs() <= tolerance && (y[i] - x[mirrored]).abs() <= tolerance
    })
}

/// Accelerated transform; falls back to the full grid when the axes are
/// not quadrant-symmetric.
pub fn assemble_fast(params: &ProjectionParameters, axes: &ScanAxes) -> GridResult<LatLon> {
    require_x_sweep(params)?;

    if !is_quadrant_symmetric(axes) {
        warn!(
            rows = axes.y.len(),
            cols = axes.x.len(),
            "Scan angles are not symmetric about nadir, using the direct transform"
        );
        return assemble_direct(params, axes);
    }

    let n = axes.x.len();
    let center = n / 2;

    // North-east quadrant: non-negative x, y running north to nadir
    let quadrant_x = &axes.x[center..];
    let quadrant_y: Vec<f64> = quadrant_x.iter().rev().copied().collect();

    let geometry = EllipsoidGeometry::from_parameters(params);
    let mesh = TrigMesh::from_axes(quadrant_x, &quadrant_y);
    let (lat_ne, lon_ne) = core_transform(&geometry, &mesh);

    let (mut latitude, mut longitude) = mirror_quadrant(&lat_ne, &lon_ne, n);

    let origin = params.longitude_of_projection_origin();
    longitude.mapv_inplace(|lon| lon + origin);

    make_common_mask(&mut latitude, &mut longitude);

    Ok(LatLon { latitude, longitude })
}

/// Rebuild the n×n grids from the north-east quadrant.
///
/// Longitude is returned relative to the sub-satellite meridian.
fn mirror_quadrant(lat_ne: &Array2<f64>, lon_ne: &Array2<f64>, n: usize) -> (Array2<f64>, Array2<f64>) {
    let center = n / 2;
    let width = n - center;

    let quadrant_row = |r: usize| if r < width { r } else { n - 1 - r };
    let quadrant_col = |j: usize| j.max(n - 1 - j) - center;

    let latitude = Array2::from_shape_fn((n, n), |(r, j)| {
        let value = lat_ne[[quadrant_row(r), quadrant_col(j)]];
        if r >= width {
            -value
        } else {
            value
        }
    });

    let longitude = Array2::from_shape_fn((n, n), |(r, j)| {
        let value = lon_ne[[quadrant_row(r), quadrant_col(j)]];
        if j < center {
            -value
        } else {
            value
        }
    });

    (latitude, longitude)
}
