//! Comparison helpers for latitude/longitude grids containing NaN.

use ndarray::Array2;

/// Largest absolute difference between two grids of the same shape.
///
/// Cells must be NaN in both or in neither; a disagreement is reported as
/// an error naming the first offending `(row, col)`.
pub fn max_grid_difference(left: &Array2<f32>, right: &Array2<f32>) -> Result<f64, String> {
    if left.dim() != right.dim() {
        return Err(format!("shape {:?} != {:?}", left.dim(), right.dim()));
    }

    let mut max_diff = 0.0_f64;
    for ((idx, a), b) in left.indexed_iter().zip(right.iter()) {
        match (a.is_nan(), b.is_nan()) {
            (true, true) => {}
            (false, false) => max_diff = max_diff.max((f64::from(*a) - f64::from(*b)).abs()),
            _ => return Err(format!("NaN mismatch at {:?}: {} vs {}", idx, a, b)),
        }
    }
    Ok(max_diff)
}

/// Bit-level equality, treating NaN as equal to NaN.
pub fn grids_identical(left: &Array2<f32>, right: &Array2<f32>) -> bool {
    left.dim() == right.dim()
        && left
            .iter()
            .zip(right.iter())
            .all(|(a, b)| a.to_bits() == b.to_bits())
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_difference_ignores_shared_nan() {
        let a = array![[1.0_f32, f32::NAN], [3.0, 4.0]];
        let b = array![[1.5_f32, f32::NAN], [3.0, 4.25]];
        assert_eq!(max_grid_difference(&a, &b).unwrap(), 0.5);
    }

    #[test]
    fn test_difference_reports_nan_mismatch() {
        let a = array![[1.0_f32, f32::NAN]];
        let b = array![[1.0_f32, 2.0]];
        let err = max_grid_difference(&a, &b).unwrap_err();
        assert!(err.contains("(0, 1)"), "{}", err);
    }

    #[test]
    fn test_identical() {
        let a = array![[1.0_f32, f32::NAN]];
        assert!(grids_identical(&a, &a.clone()));
        assert!(!grids_identical(&a, &array![[1.0_f32, 0.0]]));
    }
}
