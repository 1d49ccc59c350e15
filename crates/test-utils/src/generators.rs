//! Generators for synthetic scan-angle vectors and latitude/longitude grids.
//!
//! These produce predictable inputs whose expected outputs can be checked
//! by hand or against each other.

use ndarray::Array2;

/// Evenly spaced values from `first` to `last` inclusive.
///
/// # Example
///
/// ```
/// use test_utils::linear_axis;
///
/// let axis = linear_axis(5, -0.02, 0.02);
/// assert_eq!(axis.len(), 5);
/// assert_eq!(axis[2], 0.0);
/// ```
pub fn linear_axis(count: usize, first: f64, last: f64) -> Vec<f64> {
    if count == 1 {
        return vec![first];
    }
    let spacing = (last - first) / (count - 1) as f64;
    (0..count)
        .map(|i| {
            // Pin the last element so the endpoints are exact
            if i + 1 == count {
                last
            } else {
                first + spacing * i as f64
            }
        })
        .collect()
}

/// `count` scan angles centered on nadir with the given spacing.
///
/// Mirrored elements are exact negatives of each other, so the quadrant
/// shortcut applies. Odd counts include 0.
pub fn symmetric_axis(count: usize, spacing: f64) -> Vec<f64> {
    let half = (count as f64 - 1.0) / 2.0;
    (0..count).map(|i| (i as f64 - half) * spacing).collect()
}

/// Square full-disk style axes: `x` west to east, `y` north to south.
///
/// The extent reaches `half_extent` radians from nadir in every direction.
pub fn full_disk_axes(count: usize, half_extent: f64) -> (Vec<f64>, Vec<f64>) {
    let spacing = if count > 1 {
        2.0 * half_extent / (count - 1) as f64
    } else {
        0.0
    };
    let x = symmetric_axis(count, spacing);
    let y = x.iter().rev().copied().collect();
    (x, y)
}

/// A smooth latitude/longitude pair with NaN in every cell listed in `nan_cells`.
///
/// Latitude falls by 1 degree per row from `north`; longitude rises by 1
/// degree per column from `west`. Positions are `(row, col)`.
pub fn latlon_ramp(
    rows: usize,
    cols: usize,
    north: f32,
    west: f32,
    nan_cells: &[(usize, usize)],
) -> (Array2<f32>, Array2<f32>) {
    let mut lat = Array2::from_shape_fn((rows, cols), |(r, _)| north - r as f32);
    let mut lon = Array2::from_shape_fn((rows, cols), |(_, c)| west + c as f32);
    for &(r, c) in nan_cells {
        if r < rows && c < cols {
            lat[[r, c]] = f32::NAN;
            lon[[r, c]] = f32::NAN;
        }
    }
    (lat, lon)
}

/// Pack scan angles into 16-bit integers with the given scale and offset,
/// the way ABI files store `x` and `y`.
pub fn pack_axis(values: &[f64], scale: f64, offset: f64) -> Vec<i16> {
    values
        .iter()
        .map(|v| ((v - offset) / scale).round() as i16)
        .collect()
}
