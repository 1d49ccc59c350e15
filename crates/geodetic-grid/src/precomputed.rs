//! Latitude/longitude arrays that ship precomputed with a dataset.
//!
//! No transform runs here: the arrays are masked, optionally subsampled and
//! optionally turned into approximate corners.

use ndarray::{Array2, Zip};
use tracing::debug;

use crate::assembler::Step;
use crate::edges::pixel_corners;
use crate::error::{GridError, GridResult};
use crate::mask::make_common_mask;

/// Precomputed grids as read from a dataset.
///
/// Masks are true where a cell is invalid. Cells equal to `fill_value` are
/// invalid whether or not a mask is present.
#[derive(Debug, Clone, PartialEq)]
pub struct PrecomputedLatLon {
    pub latitude: Array2<f32>,
    pub longitude: Array2<f32>,
    pub latitude_mask: Option<Array2<bool>>,
    pub longitude_mask: Option<Array2<bool>>,
    pub fill_value: Option<f32>,
}

impl PrecomputedLatLon {
    pub fn new(latitude: Array2<f32>, longitude: Array2<f32>) -> Self {
        Self {
            latitude,
            longitude,
            latitude_mask: None,
            longitude_mask: None,
            fill_value: None,
        }
    }

    pub fn with_masks(mut self, latitude_mask: Array2<bool>, longitude_mask: Array2<bool>) -> Self {
        self.latitude_mask = Some(latitude_mask);
        self.longitude_mask = Some(longitude_mask);
        self
    }

    pub fn with_fill_value(mut self, fill_value: f32) -> Self {
        self.fill_value = Some(fill_value);
        self
    }

    fn validate(&self) -> GridResult<()> {
        if self.latitude.dim() != self.longitude.dim() {
            return Err(GridError::ShapeMismatch {
                latitude: self.latitude.dim(),
                longitude: self.longitude.dim(),
            });
        }
        let masks = [
            ("latitude", &self.latitude_mask),
            ("longitude", &self.longitude_mask),
        ];
        for (name, mask) in masks {
            if let Some(mask) = mask {
                if mask.dim() != self.latitude.dim() {
                    return Err(GridError::source_error(format!(
                        "{} mask shape {:?} does not match data shape {:?}",
                        name,
                        mask.dim(),
                        self.latitude.dim()
                    )));
                }
            }
        }
        Ok(())
    }
}

/// Apply mask and fill value to one array, widening to f64.
fn masked(data: &Array2<f32>, mask: Option<&Array2<bool>>, fill_value: Option<f32>) -> Array2<f64> {
    let mut out = data.mapv(|v| match fill_value {
        Some(fill) if v == fill => f64::NAN,
        _ => f64::from(v),
    });
    if let Some(mask) = mask {
        Zip::from(&mut out).and(mask).for_each(|v, &invalid| {
            if invalid {
                *v = f64::NAN;
            }
        });
    }
    out
}

/// Mask, subsample and optionally approximate corners.
///
/// Returns `(latitude, longitude)` with invalid cells NaN in both.
pub fn load_precomputed(
    input: &PrecomputedLatLon,
    step: Step,
    corners: bool,
) -> GridResult<(Array2<f32>, Array2<f32>)> {
    input.validate()?;

    let mut latitude = masked(&input.latitude, input.latitude_mask.as_ref(), input.fill_value);
    let mut longitude = masked(&input.longitude, input.longitude_mask.as_ref(), input.fill_value);
    make_common_mask(&mut latitude, &mut longitude);

    let latitude = step.subsample_grid(&latitude);
    let longitude = step.subsample_grid(&longitude);

    debug!(
        rows = latitude.nrows(),
        cols = latitude.ncols(),
        step = %step,
        corners,
        "Loaded precomputed grid"
    );

    let (mut latitude, mut longitude) = if corners {
        pixel_corners(&latitude, &longitude)
    } else {
        (latitude, longitude)
    };
    make_common_mask(&mut latitude, &mut longitude);

    Ok((latitude.mapv(|v| v as f32), longitude.mapv(|v| v as f32)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_masks_become_common_nan() {
        let input = PrecomputedLatLon::new(
            array![[1.0_f32, 2.0], [3.0, 4.0]],
            array![[10.0_f32, 20.0], [30.0, 40.0]],
        )
        .with_masks(array![[false, true], [false, false]], array![[false, false], [true, false]]);

        let (lat, lon) = load_precomputed(&input, Step::FULL, false).unwrap();
        assert!(lat[[0, 1]].is_nan() && lon[[0, 1]].is_nan());
        assert!(lat[[1, 0]].is_nan() && lon[[1, 0]].is_nan());
        assert_eq!(lat[[1, 1]], 4.0);
        assert_eq!(lon[[0, 0]], 10.0);
    }

    #[test]
    fn test_fill_value_is_invalid() {
        let input = PrecomputedLatLon::new(array![[-999.0_f32, 5.0]], array![[1.0_f32, 2.0]]).with_fill_value(-999.0);
        let (lat, lon) = load_precomputed(&input, Step::FULL, false).unwrap();
        assert!(lat[[0, 0]].is_nan() && lon[[0, 0]].is_nan());
        assert_eq!(lat[[0, 1]], 5.0);
    }

    #[test]
    fn test_shape_mismatch() {
        let input = PrecomputedLatLon::new(Array2::zeros((2, 3)), Array2::zeros((3, 2)));
        assert_eq!(
            load_precomputed(&input, Step::FULL, false),
            Err(GridError::ShapeMismatch {
                latitude: (2, 3),
                longitude: (3, 2),
            })
        );
    }

    #[test]
    fn test_step_and_corners() {
        let lat = Array2::from_shape_fn((6, 6), |(r, _)| 30.0 - r as f32);
        let lon = Array2::from_shape_fn((6, 6), |(_, c)| -80.0 + c as f32);
        let input = PrecomputedLatLon::new(lat, lon);

        let (lat, lon) = load_precomputed(&input, Step::uniform(2).unwrap(), false).unwrap();
        assert_eq!(lat.dim(), (3, 3));
        assert_eq!(lat[[1, 0]], 28.0);
        assert_eq!(lon[[0, 2]], -76.0);

        let (clat, clon) = load_precomputed(&input, Step::uniform(2).unwrap(), true).unwrap();
        assert_eq!(clat.dim(), (4, 4));
        assert_eq!(clat[[1, 1]], 29.0);
        assert_eq!(clon[[1, 1]], -79.0);
    }
}
