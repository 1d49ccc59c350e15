//! Expand 1-D scan-angle vectors into a 2-D latitude/longitude grid.
//!
//! Corners and subsampling are both applied to the 1-D vectors, so a
//! stepped grid never pays for the cells it skips.

use std::fmt;
use std::str::FromStr;

use ndarray::{s, Array2};
use serde::{Deserialize, Serialize};

use crate::edges::pixel_edges;
use crate::error::{GridError, GridResult};
use crate::mask::make_common_mask;
use crate::parameters::{ProjectionParameters, SweepAxis};
use crate::transform::{core_transform, EllipsoidGeometry, TrigMesh};

/// Subsampling stride for rows and columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "StepRepr", into = "StepRepr")]
pub struct Step {
    rows: usize,
    cols: usize,
}

impl Step {
    /// Every row and every column.
    pub const FULL: Step = Step { rows: 1, cols: 1 };

    /// Build a step; both strides must be positive.
    pub fn new(rows: i64, cols: i64) -> GridResult<Self> {
        Ok(Self {
            rows: positive_stride(rows)?,
            cols: positive_stride(cols)?,
        })
    }

    /// Same stride on both axes.
    pub fn uniform(step: i64) -> GridResult<Self> {
        Self::new(step, step)
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn is_full(&self) -> bool {
        *self == Self::FULL
    }

    /// Keep every `rows`-th element of a row-axis vector.
    pub fn subsample_rows(&self, values: &[f64]) -> Vec<f64> {
        values.iter().step_by(self.rows).copied().collect()
    }

    /// Keep every `cols`-th element of a column-axis vector.
    pub fn subsample_cols(&self, values: &[f64]) -> Vec<f64> {
        values.iter().step_by(self.cols).copied().collect()
    }

    /// Strided view of a 2-D grid, copied out.
    pub fn subsample_grid<T: Clone>(&self, grid: &Array2<T>) -> Array2<T> {
        if self.is_full() {
            return grid.clone();
        }
        grid.slice(s![..;self.rows, ..;self.cols]).to_owned()
    }
}

impl Default for Step {
    fn default() -> Self {
        Self::FULL
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.rows == self.cols {
            write!(f, "{}", self.rows)
        } else {
            write!(f, "{},{}", self.rows, self.cols)
        }
    }
}

impl FromStr for Step {
    type Err = GridError;

    /// Parse `"n"` or `"rows,cols"`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parse = |token: &str| {
            token
                .trim()
                .parse::<i64>()
                .map_err(|_| GridError::configuration(token.trim(), "a positive integer step"))
        };

        match s.split_once(',') {
            Some((rows, cols)) => Self::new(parse(rows)?, parse(cols)?),
            None => Self::uniform(parse(s)?),
        }
    }
}

#[derive(Serialize, Deserialize)]
#[serde(untagged)]
enum StepRepr {
    Uniform(i64),
    Pair(i64, i64),
}

impl TryFrom<StepRepr> for Step {
    type Error = GridError;

    fn try_from(repr: StepRepr) -> Result<Self, Self::Error> {
        match repr {
            StepRepr::Uniform(n) => Step::uniform(n),
            StepRepr::Pair(rows, cols) => Step::new(rows, cols),
        }
    }
}

impl From<Step> for StepRepr {
    fn from(step: Step) -> Self {
        if step.rows == step.cols {
            StepRepr::Uniform(step.rows as i64)
        } else {
            StepRepr::Pair(step.rows as i64, step.cols as i64)
        }
    }
}

fn positive_stride(value: i64) -> GridResult<usize> {
    if value <= 0 {
        return Err(GridError::configuration(
            value.to_string(),
            "a step greater than 0",
        ));
    }
    usize::try_from(value).map_err(|_| GridError::configuration(value.to_string(), "a step that fits in usize"))
}

/// The scan angles actually fed to a backend, after corners and step.
#[derive(Debug, Clone, PartialEq)]
pub struct ScanAxes {
    /// Column angles (radians)
    pub x: Vec<f64>,
    /// Row angles (radians)
    pub y: Vec<f64>,
}

impl ScanAxes {
    /// Derive edges if `corners`, then subsample.
    pub fn prepare(params: &ProjectionParameters, step: Step, corners: bool) -> GridResult<Self> {
        let (x, y) = if corners {
            (pixel_edges(params.x())?, pixel_edges(params.y())?)
        } else {
            (params.x().to_vec(), params.y().to_vec())
        };

        Ok(Self {
            x: step.subsample_cols(&x),
            y: step.subsample_rows(&y),
        })
    }

    /// (rows, columns) of the grid these axes produce.
    pub fn shape(&self) -> (usize, usize) {
        (self.y.len(), self.x.len())
    }

    /// Scale to meters on the perspective plane.
    pub fn to_meters(&self, perspective_point_height: f64) -> (Vec<f64>, Vec<f64>) {
        let scale = |v: &[f64]| v.iter().map(|a| a * perspective_point_height).collect();
        (scale(&self.x), scale(&self.y))
    }
}

/// Double-precision latitude/longitude pair before the final cast.
#[derive(Debug, Clone, PartialEq)]
pub struct LatLon {
    pub latitude: Array2<f64>,
    pub longitude: Array2<f64>,
}

impl LatLon {
    pub fn dim(&self) -> (usize, usize) {
        self.latitude.dim()
    }

    pub fn to_f32(&self) -> (Array2<f32>, Array2<f32>) {
        (
            self.latitude.mapv(|v| v as f32),
            self.longitude.mapv(|v| v as f32),
        )
    }
}

/// The closed-form transform only covers GOES-style sweep-x geometry.
pub fn require_x_sweep(params: &ProjectionParameters) -> GridResult<()> {
    match params.sweep_angle_axis() {
        SweepAxis::X => Ok(()),
        other => Err(GridError::configuration(other.as_str(), "sweep angle axis in {x}")),
    }
}

/// Full-grid transform: every cell through the closed-form intersection.
pub fn assemble_direct(params: &ProjectionParameters, axes: &ScanAxes) -> GridResult<LatLon> {
    require_x_sweep(params)?;

    let geometry = EllipsoidGeometry::from_parameters(params);
    let mesh = TrigMesh::from_axes(&axes.x, &axes.y);
    let (mut latitude, mut longitude) = core_transform(&geometry, &mesh);

    let origin = params.longitude_of_projection_origin();
    longitude.mapv_inplace(|lon| lon + origin);

    make_common_mask(&mut latitude, &mut longitude);

    Ok(LatLon { latitude, longitude })
}
