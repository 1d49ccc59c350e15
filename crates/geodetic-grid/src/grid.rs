//! The geodetic grid value and its entry points.

use ndarray::{Array2, Zip};
use tracing::debug;

use crate::assembler::{ScanAxes, Step};
use crate::backend::{computed_backend, Algorithm, AlgorithmSpec, PixelAnchor};
use crate::error::GridResult;
use crate::mask::validity_mask;
use crate::parameters::ProjectionParameters;
use crate::precomputed::{load_precomputed, PrecomputedLatLon};

/// Value written into masked cells by the `filled_*` accessors, unless a
/// precomputed source brings its own.
pub const FILL_VALUE: f32 = -999.99;

/// Anything that can supply grid inputs, usually an opened dataset.
pub trait GridSource {
    /// Projection parameters and scan-angle vectors.
    fn projection_parameters(&self) -> GridResult<ProjectionParameters>;

    /// Latitude/longitude arrays stored alongside the data.
    fn precomputed_latlon(&self) -> GridResult<PrecomputedLatLon>;
}

/// Per-pixel latitude and longitude (degrees) with a validity mask.
///
/// A cell is NaN in latitude exactly when it is NaN in longitude, and the
/// mask is true on exactly those cells.
#[derive(Debug, Clone, PartialEq)]
pub struct GeodeticGrid {
    latitude: Array2<f32>,
    longitude: Array2<f32>,
    mask: Array2<bool>,
    fill_value: f32,
    algorithm: AlgorithmSpec,
}

impl GeodeticGrid {
    /// Compute a grid from projection parameters.
    ///
    /// `algorithm` follows the `name[option]` grammar. `precomputed` is
    /// rejected since there is nothing to read it from; use
    /// [`GeodeticGrid::from_source`].
    pub fn calculate(params: &ProjectionParameters, algorithm: &str, step: Step) -> GridResult<Self> {
        let spec: AlgorithmSpec = algorithm.parse()?;
        Self::calculate_with(params, spec, step)
    }

    /// [`GeodeticGrid::calculate`] with an already parsed algorithm.
    pub fn calculate_with(params: &ProjectionParameters, spec: AlgorithmSpec, step: Step) -> GridResult<Self> {
        let backend = computed_backend(spec.algorithm)?;
        let axes = ScanAxes::prepare(params, step, spec.corners())?;

        debug!(
            algorithm = %spec,
            rows = axes.y.len(),
            cols = axes.x.len(),
            step = %step,
            "Computing geodetic grid"
        );

        let latlon = backend.compute(params, &axes)?;
        let (latitude, longitude) = latlon.to_f32();
        Ok(Self::from_arrays(latitude, longitude, spec, FILL_VALUE))
    }

    /// Build a grid from whatever a source offers, including `precomputed`.
    pub fn from_source<S: GridSource + ?Sized>(source: &S, algorithm: &str, step: Step) -> GridResult<Self> {
        let spec: AlgorithmSpec = algorithm.parse()?;
        match spec.algorithm {
            Algorithm::Precomputed => {
                let input = source.precomputed_latlon()?;
                Self::from_precomputed(&input, step, spec.corners())
            }
            _ => {
                let params = source.projection_parameters()?;
                Self::calculate_with(&params, spec, step)
            }
        }
    }

    /// Pass precomputed arrays through masking, subsampling and optional
    /// corner approximation.
    ///
    /// The input's fill value, when set, becomes the grid's fill value.
    pub fn from_precomputed(input: &PrecomputedLatLon, step: Step, corners: bool) -> GridResult<Self> {
        let (latitude, longitude) = load_precomputed(input, step, corners)?;
        let anchor = if corners {
            PixelAnchor::Corner
        } else {
            PixelAnchor::Center
        };
        Ok(Self::from_arrays(
            latitude,
            longitude,
            AlgorithmSpec::new(Algorithm::Precomputed, anchor),
            input.fill_value.unwrap_or(FILL_VALUE),
        ))
    }

    fn from_arrays(
        latitude: Array2<f32>,
        longitude: Array2<f32>,
        algorithm: AlgorithmSpec,
        fill_value: f32,
    ) -> Self {
        let mask = validity_mask(&latitude, &longitude);
        Self {
            latitude,
            longitude,
            mask,
            fill_value,
            algorithm,
        }
    }

    /// Latitude in degrees North, NaN where invalid.
    pub fn latitude(&self) -> &Array2<f32> {
        &self.latitude
    }

    /// Longitude in degrees East, NaN where invalid.
    pub fn longitude(&self) -> &Array2<f32> {
        &self.longitude
    }

    /// True where a cell is invalid.
    pub fn mask(&self) -> &Array2<bool> {
        &self.mask
    }

    pub fn fill_value(&self) -> f32 {
        self.fill_value
    }

    pub fn algorithm(&self) -> AlgorithmSpec {
        self.algorithm
    }

    /// (rows, columns)
    pub fn shape(&self) -> (usize, usize) {
        self.latitude.dim()
    }

    /// Number of cells with a valid coordinate.
    pub fn valid_count(&self) -> usize {
        self.mask.iter().filter(|invalid| !**invalid).count()
    }

    /// Latitude with masked cells set to the fill value.
    pub fn filled_latitude(&self) -> Array2<f32> {
        self.filled(&self.latitude)
    }

    /// Longitude with masked cells set to the fill value.
    pub fn filled_longitude(&self) -> Array2<f32> {
        self.filled(&self.longitude)
    }

    fn filled(&self, data: &Array2<f32>) -> Array2<f32> {
        let mut out = data.clone();
        Zip::from(&mut out).and(&self.mask).for_each(|v, &invalid| {
            if invalid {
                *v = self.fill_value;
            }
        });
        out
    }

    /// Take ownership of `(latitude, longitude, mask)`.
    pub fn into_parts(self) -> (Array2<f32>, Array2<f32>, Array2<bool>) {
        (self.latitude, self.longitude, self.mask)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::GridError;
    use ndarray::array;

    struct Fixture {
        params: ProjectionParameters,
        latlon: PrecomputedLatLon,
    }

    impl GridSource for Fixture {
        fn projection_parameters(&self) -> GridResult<ProjectionParameters> {
            Ok(self.params.clone())
        }

        fn precomputed_latlon(&self) -> GridResult<PrecomputedLatLon> {
            Ok(self.latlon.clone())
        }
    }

    fn fixture() -> Fixture {
        let x = vec![-0.2, -0.01, 0.01, 0.2];
        let y = x.iter().rev().copied().collect();
        Fixture {
            params: ProjectionParameters::goes_east(x, y).unwrap(),
            latlon: PrecomputedLatLon::new(array![[1.0_f32, f32::NAN]], array![[2.0_f32, 3.0]]),
        }
    }

    #[test]
    fn test_mask_matches_nan() {
        let grid = GeodeticGrid::calculate(&fixture().params, "direct", Step::FULL).unwrap();
        assert_eq!(grid.shape(), (4, 4));
        for ((lat, lon), invalid) in grid.latitude().iter().zip(grid.longitude().iter()).zip(grid.mask().iter()) {
            assert_eq!(lat.is_nan(), *invalid);
            assert_eq!(lon.is_nan(), *invalid);
        }
        // the four corners look past the limb
        assert!(grid.mask()[[0, 0]]);
        assert!(!grid.mask()[[1, 1]]);
        assert!(grid.valid_count() < 16);
    }

    #[test]
    fn test_filled_arrays() {
        let grid = GeodeticGrid::calculate(&fixture().params, "fast", Step::FULL).unwrap();
        let filled = grid.filled_latitude();
        assert_eq!(filled[[0, 0]], FILL_VALUE);
        assert_eq!(filled[[1, 1]], grid.latitude()[[1, 1]]);
        assert!(grid.filled_longitude().iter().all(|v| v.is_finite()));
    }

    #[test]
    fn test_calculate_rejects_precomputed() {
        let err = GeodeticGrid::calculate(&fixture().params, "precomputed", Step::FULL).unwrap_err();
        assert!(matches!(err, GridError::Configuration { .. }));
    }

    #[test]
    fn test_from_source_dispatches() {
        let source = fixture();
        let grid = GeodeticGrid::from_source(&source, "precomputed", Step::FULL).unwrap();
        assert_eq!(grid.algorithm().algorithm, Algorithm::Precomputed);
        assert_eq!(grid.shape(), (1, 2));
        assert!(grid.mask()[[0, 1]]);
        assert!(grid.longitude()[[0, 1]].is_nan());

        let grid = GeodeticGrid::from_source(&source, "fast[corner]", Step::FULL).unwrap();
        assert_eq!(grid.shape(), (5, 5));
        assert_eq!(grid.algorithm().to_string(), "fast[corner]");
        assert_eq!(grid.fill_value(), FILL_VALUE);
    }

    #[test]
    fn test_precomputed_keeps_source_fill_value() {
        let input = fixture().latlon.with_fill_value(-999.0);
        let grid = GeodeticGrid::from_precomputed(&input, Step::FULL, false).unwrap();
        assert_eq!(grid.fill_value(), -999.0);
        assert_eq!(grid.filled_latitude()[[0, 1]], -999.0);

        let grid = GeodeticGrid::from_precomputed(&fixture().latlon, Step::FULL, false).unwrap();
        assert_eq!(grid.fill_value(), FILL_VALUE);
    }
}
