//! Pixel edge and corner coordinates.
//!
//! Scan-angle vectors describe pixel centers. Corner grids need the n+1
//! pixel edges instead, which are derived here before the transform runs.
//!
//! Precomputed latitude/longitude files only carry centers, and there is no
//! scan-angle vector to work from, so [`pixel_corners`] approximates the
//! corners directly in geographic space. The approximation is rough (the
//! error is not negligible near the limb); computing with the `corner`
//! option through the grid assembler is always more accurate.

use ndarray::{Array2, ArrayView1, ArrayViewMut1, Axis, Zip};

use crate::error::{GridError, GridResult};

/// Sentinel written into invalid cells before corner averaging.
pub const CORNER_FILL_VALUE: f64 = -999.99;

/// Anything below this after averaging is treated as invalid.
pub const CORNER_DECISION_THRESHOLD: f64 = -400.0;

/// Edges of the pixels whose centers are given.
///
/// Interior edges are midpoints of adjacent centers. The outer edges are
/// midpoints between the first/last center and a phantom center
/// extrapolated linearly beyond it.
pub fn pixel_edges(centers: &[f64]) -> GridResult<Vec<f64>> {
    let n = centers.len();
    if n < 2 {
        return Err(GridError::configuration(
            format!("{} pixel center(s)", n),
            "at least 2 pixel centers to derive edges",
        ));
    }

    let left_offset = 2.0 * centers[0] - centers[1];
    let right_offset = 2.0 * centers[n - 1] - centers[n - 2];

    let left = std::iter::once(left_offset).chain(centers.iter().copied());
    let right = centers.iter().copied().chain(std::iter::once(right_offset));

    Ok(left.zip(right).map(|(l, r)| 0.5 * (l + r)).collect())
}

/// Approximate the corner coordinates of a precomputed center grid.
///
/// Returns `(latitude, longitude)` grids one row and one column larger than
/// the input. Invalid cells (NaN) come out as NaN. The two passes run in a
/// different order for each array, so their NaN cells need not coincide.
pub fn pixel_corners(lat: &Array2<f64>, lon: &Array2<f64>) -> (Array2<f64>, Array2<f64>) {
    let lat_grid = fill_invalid(lat);
    let lat_grid = midpoint_along(&lat_grid, Axis(0));
    let lat_grid = midpoint_along(&lat_grid, Axis(1));

    let lon_grid = fill_invalid(lon);
    let lon_grid = midpoint_along(&lon_grid, Axis(1));
    let lon_grid = midpoint_along(&lon_grid, Axis(0));

    (remask(&lat_grid), remask(&lon_grid))
}

fn fill_invalid(grid: &Array2<f64>) -> Array2<f64> {
    grid.mapv(|v| {
        if v.is_finite() {
            v
        } else {
            CORNER_FILL_VALUE
        }
    })
}

fn remask(grid: &Array2<f64>) -> Array2<f64> {
    grid.mapv(|v| if v < CORNER_DECISION_THRESHOLD { f64::NAN } else { v })
}

/// One midpoint pass along `axis`; the output is one longer on that axis.
fn midpoint_along(grid: &Array2<f64>, axis: Axis) -> Array2<f64> {
    let mut shape = grid.raw_dim();
    shape[axis.index()] += 1;
    let mut out = Array2::from_elem(shape, CORNER_FILL_VALUE);

    Zip::from(grid.lanes(axis))
        .and(out.lanes_mut(axis))
        .for_each(midpoint_lane);

    out
}

fn midpoint_lane(src: ArrayView1<f64>, mut dst: ArrayViewMut1<f64>) {
    let n = src.len();
    let at = |k: Option<usize>| match k {
        Some(k) if k < n => src[k],
        _ => CORNER_FILL_VALUE,
    };
    let valid = |v: f64| v > CORNER_DECISION_THRESHOLD;
    let invalid = |v: f64| v < CORNER_DECISION_THRESHOLD;

    for k in 0..=n {
        let cell = at(Some(k));
        let next = at(k.checked_add(1));
        let prev = at(k.checked_sub(1));
        let prev2 = at(k.checked_sub(2));

        let mut value = CORNER_FILL_VALUE;
        if valid(cell) && invalid(prev) {
            value = 0.5 * (3.0 * cell - next);
        }
        if valid(cell) && valid(prev) {
            value = 0.5 * (cell + prev);
        }
        if invalid(cell) && valid(prev) {
            value = 0.5 * (3.0 * prev - prev2);
        }
        dst[k] = value;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_edges_of_uniform_centers() {
        let edges = pixel_edges(&[1.0, 2.0, 3.0, 4.0]).unwrap();
        assert_eq!(edges, vec![0.5, 1.5, 2.5, 3.5, 4.5]);
    }

    #[test]
    fn test_edges_of_descending_centers() {
        let edges = pixel_edges(&[0.3, 0.1, -0.1]).unwrap();
        let expected = [0.4, 0.2, 0.0, -0.2];
        assert_eq!(edges.len(), 4);
        for (e, x) in edges.iter().zip(expected.iter()) {
            assert!((e - x).abs() < 1e-15, "{} vs {}", e, x);
        }
    }

    #[test]
    fn test_edges_need_two_centers() {
        assert!(matches!(
            pixel_edges(&[1.0]),
            Err(GridError::Configuration { .. })
        ));
        assert!(pixel_edges(&[]).is_err());
    }

    #[test]
    fn test_midpoint_lane_all_valid() {
        let src = array![10.0, 20.0, 30.0];
        let mut dst = ndarray::Array1::zeros(4);
        midpoint_lane(src.view(), dst.view_mut());
        // first: 0.5 * (3*10 - 20), then midpoints, last: 0.5 * (3*30 - 20)
        assert_eq!(dst, array![5.0, 15.0, 25.0, 35.0]);
    }

    #[test]
    fn test_midpoint_lane_around_invalid_cell() {
        let src = array![10.0, 20.0, CORNER_FILL_VALUE, 40.0, 50.0];
        let mut dst = ndarray::Array1::zeros(6);
        midpoint_lane(src.view(), dst.view_mut());
        assert_eq!(dst[0], 5.0);
        assert_eq!(dst[1], 15.0);
        // after the last valid cell: 0.5 * (3*20 - 10)
        assert_eq!(dst[2], 25.0);
        // first valid cell after the gap: 0.5 * (3*40 - 50)
        assert_eq!(dst[3], 35.0);
        assert_eq!(dst[4], 45.0);
        assert_eq!(dst[5], 0.5 * (3.0 * 50.0 - 40.0));
    }

    #[test]
    fn test_corners_shape_and_interior() {
        let lat = array![[10.0, 10.0, 10.0], [20.0, 20.0, 20.0]];
        let lon = array![[-80.0, -70.0, -60.0], [-80.0, -70.0, -60.0]];
        let (clat, clon) = pixel_corners(&lat, &lon);
        assert_eq!(clat.dim(), (3, 4));
        assert_eq!(clon.dim(), (3, 4));
        assert_eq!(clat[[1, 1]], 15.0);
        assert_eq!(clat[[0, 2]], 5.0);
        assert_eq!(clat[[2, 2]], 25.0);
        assert_eq!(clon[[1, 1]], -75.0);
        assert_eq!(clon[[1, 0]], -85.0);
        assert_eq!(clon[[1, 3]], -55.0);
    }

    #[test]
    fn test_corners_fully_invalid_stay_invalid() {
        let lat = Array2::from_elem((2, 2), f64::NAN);
        let lon = Array2::from_elem((2, 2), f64::NAN);
        let (clat, clon) = pixel_corners(&lat, &lon);
        assert!(clat.iter().all(|v| v.is_nan()));
        assert!(clon.iter().all(|v| v.is_nan()));
    }
}
