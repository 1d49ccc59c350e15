//! GOES-R ABI records.
//!
//! ABI Level 2 files carry the fixed grid as packed `x`/`y` scan-angle
//! variables next to a `goes_imager_projection` variable whose attributes
//! hold the orbit and ellipsoid. Separately distributed lat/lon files carry
//! precomputed `latitude`/`longitude` arrays on `rows` x `columns`.

use std::str::FromStr;

use geodetic_grid::{
    FixedGrid, Globe, GridResult, GridSource, OrbitGeometry, PrecomputedLatLon, ProjectionParameters, SweepAxis,
};
use ndarray::{Array2, Ix2};
use tracing::debug;

use crate::dataset::{Dataset, MaskedArray};
use crate::error::{NetCdfError, NetCdfResult};
use crate::schema::{narrow_to_f32, widen_to_f64, FieldKind, FieldSource, FieldSpec, Schema};

/// Variable holding the projection attributes.
pub const IMAGER_PROJECTION: &str = "goes_imager_projection";

const PROJECTION_FIELDS: &[FieldSpec] = &[
    FieldSpec::attribute(IMAGER_PROJECTION, "longitude_of_projection_origin", FieldKind::Float),
    FieldSpec::attribute(IMAGER_PROJECTION, "perspective_point_height", FieldKind::Float),
    FieldSpec::attribute(IMAGER_PROJECTION, "sweep_angle_axis", FieldKind::Text),
    FieldSpec::attribute(IMAGER_PROJECTION, "semi_major_axis", FieldKind::Float),
    FieldSpec::attribute(IMAGER_PROJECTION, "semi_minor_axis", FieldKind::Float),
    FieldSpec::attribute(IMAGER_PROJECTION, "inverse_flattening", FieldKind::Float),
    FieldSpec::new("x", FieldSource::Variable("x"), FieldKind::Float64Array).converted(widen_to_f64),
    FieldSpec::new("y", FieldSource::Variable("y"), FieldKind::Float64Array).converted(widen_to_f64),
];

pub const PROJECTION_SCHEMA: Schema = Schema::new("goes_imager_projection", PROJECTION_FIELDS);

const LATLON_FIELDS: &[FieldSpec] = &[
    FieldSpec::new("latitude", FieldSource::Variable("latitude"), FieldKind::Float32Array).converted(narrow_to_f32),
    FieldSpec::new("longitude", FieldSource::Variable("longitude"), FieldKind::Float32Array).converted(narrow_to_f32),
];

pub const LATLON_SCHEMA: Schema = Schema::new("goes_latlon_grid", LATLON_FIELDS);

const LATLON_INFO_FIELDS: &[FieldSpec] = &[
    FieldSpec::new("title", FieldSource::GlobalAttribute("title"), FieldKind::Text),
    FieldSpec::new("comment", FieldSource::GlobalAttribute("comment"), FieldKind::Text),
    FieldSpec::new("created", FieldSource::GlobalAttribute("created"), FieldKind::Text),
    FieldSpec::new("rows", FieldSource::Dimension("rows"), FieldKind::Size),
    FieldSpec::new("columns", FieldSource::Dimension("columns"), FieldKind::Size),
];

pub const LATLON_INFO_SCHEMA: Schema = Schema::new("goes_latlon_info", LATLON_INFO_FIELDS);

/// Scan angles as stored, with every cell required to be valid.
fn scan_angles(field: &str, values: MaskedArray<f64>) -> NetCdfResult<Vec<f64>> {
    if values.shape().len() != 1 {
        return Err(NetCdfError::invalid(format!(
            "{} must be 1-D, got shape {:?}",
            field,
            values.shape()
        )));
    }
    if values.masked_count() > 0 {
        return Err(NetCdfError::invalid(format!(
            "{} has {} fill values",
            field,
            values.masked_count()
        )));
    }
    Ok(values.data.into_iter().collect())
}

/// Projection information from an ABI Level 2 file.
#[derive(Debug, Clone, PartialEq)]
pub struct GoesImagerProjection {
    pub orbit: OrbitGeometry,
    pub globe: Globe,
    pub fixed_grid: FixedGrid,
}

impl GoesImagerProjection {
    pub fn from_dataset<D: Dataset + ?Sized>(dataset: &D) -> NetCdfResult<Self> {
        let mut fields = PROJECTION_SCHEMA.resolve(dataset)?;

        let orbit = OrbitGeometry {
            longitude_of_projection_origin: fields.take_float("longitude_of_projection_origin")?,
            perspective_point_height: fields.take_float("perspective_point_height")?,
            sweep_angle_axis: SweepAxis::from_str(&fields.take_text("sweep_angle_axis")?)?,
        };
        let globe = Globe {
            semi_major_axis: fields.take_float("semi_major_axis")?,
            semi_minor_axis: fields.take_float("semi_minor_axis")?,
            inverse_flattening: fields.take_float("inverse_flattening")?,
        };
        let fixed_grid = FixedGrid::new(
            scan_angles("x", fields.take_f64_array("x")?)?,
            scan_angles("y", fields.take_f64_array("y")?)?,
        );

        debug!(
            origin = orbit.longitude_of_projection_origin,
            sweep = %orbit.sweep_angle_axis,
            columns = fixed_grid.x.len(),
            rows = fixed_grid.y.len(),
            "Read imager projection"
        );

        Ok(Self {
            orbit,
            globe,
            fixed_grid,
        })
    }

    pub fn into_parameters(self) -> NetCdfResult<ProjectionParameters> {
        Ok(ProjectionParameters::new(self.orbit, self.globe, self.fixed_grid)?)
    }
}

fn into_grid(field: &str, values: MaskedArray<f32>) -> NetCdfResult<(Array2<f32>, Array2<bool>)> {
    let shape = values.shape().to_vec();
    let reshape_error = || NetCdfError::invalid(format!("{} must be 2-D, got shape {:?}", field, shape));
    let data = values.data.into_dimensionality::<Ix2>().map_err(|_| reshape_error())?;
    let mask = values.mask.into_dimensionality::<Ix2>().map_err(|_| reshape_error())?;
    Ok((data, mask))
}

/// Precomputed latitude/longitude grids.
#[derive(Debug, Clone, PartialEq)]
pub struct GoesLatLonGrid {
    pub latitude: Array2<f32>,
    pub longitude: Array2<f32>,
    pub latitude_mask: Array2<bool>,
    pub longitude_mask: Array2<bool>,
    /// `_FillValue` of the latitude (or else longitude) variable
    pub fill_value: Option<f32>,
}

impl GoesLatLonGrid {
    pub fn from_dataset<D: Dataset + ?Sized>(dataset: &D) -> NetCdfResult<Self> {
        let mut fields = LATLON_SCHEMA.resolve(dataset)?;
        let (latitude, latitude_mask) = into_grid("latitude", fields.take_f32_array("latitude")?)?;
        let (longitude, longitude_mask) = into_grid("longitude", fields.take_f32_array("longitude")?)?;
        let fill_value = match dataset.variable_attribute("latitude", "_FillValue")? {
            Some(value) => Some(value),
            None => dataset.variable_attribute("longitude", "_FillValue")?,
        }
        .and_then(|value| value.as_f64())
        .map(|fill| fill as f32);
        Ok(Self {
            latitude,
            longitude,
            latitude_mask,
            longitude_mask,
            fill_value,
        })
    }

    pub fn into_precomputed(self) -> PrecomputedLatLon {
        let latlon =
            PrecomputedLatLon::new(self.latitude, self.longitude).with_masks(self.latitude_mask, self.longitude_mask);
        match self.fill_value {
            Some(fill) => latlon.with_fill_value(fill),
            None => latlon,
        }
    }
}

/// Descriptive metadata of a precomputed lat/lon file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GoesLatLonGridInfo {
    pub title: String,
    pub comment: String,
    pub created: String,
    pub rows: usize,
    pub columns: usize,
}

impl GoesLatLonGridInfo {
    pub fn from_dataset<D: Dataset + ?Sized>(dataset: &D) -> NetCdfResult<Self> {
        let mut fields = LATLON_INFO_SCHEMA.resolve(dataset)?;
        Ok(Self {
            title: fields.take_text("title")?,
            comment: fields.take_text("comment")?,
            created: fields.take_text("created")?,
            rows: fields.take_size("rows")?,
            columns: fields.take_size("columns")?,
        })
    }
}

/// A dataset that can feed the grid engine.
///
/// Projection attributes and precomputed arrays are read on demand, so an
/// ABI file without lat/lon arrays still serves the computed backends.
#[derive(Debug, Clone)]
pub struct GoesRecord<D: Dataset> {
    dataset: D,
}

impl<D: Dataset> GoesRecord<D> {
    pub fn new(dataset: D) -> Self {
        Self { dataset }
    }

    pub fn dataset(&self) -> &D {
        &self.dataset
    }

    pub fn into_inner(self) -> D {
        self.dataset
    }
}

impl<D: Dataset> GridSource for GoesRecord<D> {
    fn projection_parameters(&self) -> GridResult<ProjectionParameters> {
        let projection = GoesImagerProjection::from_dataset(&self.dataset)?;
        Ok(projection.into_parameters()?)
    }

    fn precomputed_latlon(&self) -> GridResult<PrecomputedLatLon> {
        Ok(GoesLatLonGrid::from_dataset(&self.dataset)?.into_precomputed())
    }
}
