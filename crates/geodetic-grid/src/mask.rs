//! Validity masking for latitude/longitude pairs.
//!
//! A cell is either valid in both arrays or NaN in both. Library-backed
//! backends can also hand back finite garbage for off-disk rays (PROJ uses
//! HUGE_VAL), so their results go through the stricter range check.

use ndarray::{Array2, Zip};

/// Make NaN cells common to both arrays.
pub fn make_common_mask(lat: &mut Array2<f64>, lon: &mut Array2<f64>) {
    Zip::from(lat).and(lon).for_each(|lat, lon| {
        if !(lat.is_finite() && lon.is_finite()) {
            *lat = f64::NAN;
            *lon = f64::NAN;
        }
    });
}

/// Range-check and normalize results from an external library.
///
/// Valid cells need `lon ∈ [-360, 360]` and `lat ∈ [-90, 90]`; valid
/// longitudes are then wrapped into `(-180, 180]`.
pub fn make_consistent(lat: &mut Array2<f64>, lon: &mut Array2<f64>) {
    Zip::from(lat).and(lon).for_each(|lat, lon| {
        let valid = (-360.0..=360.0).contains(&*lon) && (-90.0..=90.0).contains(&*lat);
        if valid {
            *lon = normalize_longitude(*lon);
        } else {
            *lat = f64::NAN;
            *lon = f64::NAN;
        }
    });
}

/// Wrap a longitude in `[-360, 360]` into `(-180, 180]`.
///
/// The interval is closed at +180 and open at -180, so the antimeridian
/// reads as 180 rather than -180. Wrapping on `lon >= 180` instead would
/// give `[-180, 180)`.
#[inline]
pub fn normalize_longitude(lon: f64) -> f64 {
    if lon > 180.0 {
        lon - 360.0
    } else if lon <= -180.0 {
        lon + 360.0
    } else {
        lon
    }
}

/// True where a cell is invalid in either array.
pub fn validity_mask(lat: &Array2<f32>, lon: &Array2<f32>) -> Array2<bool> {
    let mut mask = Array2::from_elem(lat.dim(), false);
    Zip::from(&mut mask)
        .and(lat)
        .and(lon)
        .for_each(|m, lat, lon| *m = !(lat.is_finite() && lon.is_finite()));
    mask
}
