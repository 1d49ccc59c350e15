//! PROJ-backed backends.
//!
//! Both feed fixed-grid coordinates in meters (scan angle times perspective
//! point height) to PROJ. `proj_inverse` runs the `geos` projection
//! backwards; `proj_crs` builds a CRS-to-CRS pipeline from the
//! geostationary CRS to GRS80 longitude/latitude. Points PROJ cannot
//! transform come back as NaN, and the result goes through the range
//! checks of [`make_consistent`].

use ndarray::Array2;
use proj::Proj;
use tracing::debug;

use crate::assembler::{LatLon, ScanAxes};
use crate::backend::{Algorithm, GridBackend};
use crate::error::{GridError, GridResult};
use crate::mask::make_consistent;
use crate::parameters::ProjectionParameters;

const GRS80_LONGLAT: &str = "+proj=longlat +ellps=GRS80 +no_defs +type=crs";

/// PROJ definition of the geostationary view described by `params`.
pub fn geos_definition(params: &ProjectionParameters) -> String {
    format!(
        "+proj=geos +lon_0={} +h={} +a={} +b={} +sweep={} +units=m +no_defs",
        params.longitude_of_projection_origin(),
        params.perspective_point_height(),
        params.semi_major_axis(),
        params.semi_minor_axis(),
        params.sweep_angle_axis().as_str(),
    )
}

/// Run `point_fn` over the meter mesh, mapping per-point failures to NaN.
///
/// `point_fn` returns `(lon, lat)` in degrees.
fn transform_mesh<F>(params: &ProjectionParameters, axes: &ScanAxes, point_fn: F) -> LatLon
where
    F: Fn(f64, f64) -> Option<(f64, f64)>,
{
    let (x_m, y_m) = axes.to_meters(params.perspective_point_height());
    let shape = axes.shape();

    let mut latitude = Array2::from_elem(shape, f64::NAN);
    let mut longitude = Array2::from_elem(shape, f64::NAN);

    for (i, &y) in y_m.iter().enumerate() {
        for (j, &x) in x_m.iter().enumerate() {
            if let Some((lon, lat)) = point_fn(x, y) {
                latitude[[i, j]] = lat;
                longitude[[i, j]] = lon;
            }
        }
    }

    make_consistent(&mut latitude, &mut longitude);
    LatLon { latitude, longitude }
}

fn backend_error(algorithm: Algorithm, err: impl std::fmt::Display) -> GridError {
    GridError::Backend {
        backend: algorithm.as_str().to_string(),
        message: err.to_string(),
    }
}

/// Inverse `geos` projection.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProjInverseBackend;

impl GridBackend for ProjInverseBackend {
    fn algorithm(&self) -> Algorithm {
        Algorithm::ProjInverse
    }

    fn compute(&self, params: &ProjectionParameters, axes: &ScanAxes) -> GridResult<LatLon> {
        let definition = geos_definition(params);
        debug!(definition = %definition, "Creating PROJ geostationary projection");

        let projection = Proj::new(&definition).map_err(|e| backend_error(self.algorithm(), e))?;

        Ok(transform_mesh(params, axes, |x, y| {
            // Inverse output is radians
            projection
                .project((x, y), true)
                .ok()
                .map(|(lon, lat)| (lon.to_degrees(), lat.to_degrees()))
        }))
    }
}

/// CRS-to-CRS transform from the geostationary CRS to GRS80 lon/lat.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProjCrsBackend;

impl GridBackend for ProjCrsBackend {
    fn algorithm(&self) -> Algorithm {
        Algorithm::ProjCrs
    }

    fn compute(&self, params: &ProjectionParameters, axes: &ScanAxes) -> GridResult<LatLon> {
        let source = format!("{} +type=crs", geos_definition(params));
        debug!(source = %source, target = GRS80_LONGLAT, "Creating PROJ transformation");

        let transformer =
            Proj::new_known_crs(&source, GRS80_LONGLAT, None).map_err(|e| backend_error(self.algorithm(), e))?;

        Ok(transform_mesh(params, axes, |x, y| {
            transformer.convert((x, y)).ok()
        }))
    }
}
