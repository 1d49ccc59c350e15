//! Algorithm strings, dispatch and the library-backed backends.

use geodetic_grid::{
    Algorithm, GeodeticGrid, GridConfig, GridError, GridResult, GridSource, PrecomputedLatLon,
    ProjectionParameters, Step,
};
use test_utils::fixtures::sector;
use test_utils::latlon_ramp;

fn nadir_window() -> ProjectionParameters {
    let window = sector::NADIR_10X10;
    ProjectionParameters::goes_east(window.x(), window.y()).unwrap()
}

struct SyntheticRecord {
    params: ProjectionParameters,
}

impl GridSource for SyntheticRecord {
    fn projection_parameters(&self) -> GridResult<ProjectionParameters> {
        Ok(self.params.clone())
    }

    fn precomputed_latlon(&self) -> GridResult<PrecomputedLatLon> {
        let (lat, lon) = latlon_ramp(10, 10, 5.0, -80.0, &[(0, 0)]);
        Ok(PrecomputedLatLon::new(lat, lon))
    }
}

// =============================================================================
// Parsing errors
// =============================================================================

#[test]
fn test_unknown_algorithm_named_in_error() {
    match GeodeticGrid::calculate(&nadir_window(), "bogus[option]", Step::FULL) {
        Err(GridError::Configuration { token, .. }) => assert_eq!(token, "bogus"),
        other => panic!("expected configuration error, got {:?}", other),
    }
}

#[test]
fn test_unknown_option_named_in_error() {
    match GeodeticGrid::calculate(&nadir_window(), "direct[edges]", Step::FULL) {
        Err(GridError::Configuration { token, accepted }) => {
            assert_eq!(token, "edges");
            assert!(accepted.contains("corner"));
        }
        other => panic!("expected configuration error, got {:?}", other),
    }
}

#[test]
fn test_error_message_is_readable() {
    let err = GeodeticGrid::calculate(&nadir_window(), "bogus", Step::FULL).unwrap_err();
    let msg = err.to_string();
    assert!(msg.contains("'bogus'"), "{}", msg);
    assert!(msg.contains("fast"), "{}", msg);
}

// =============================================================================
// Dispatch
// =============================================================================

#[test]
fn test_algorithm_recorded_on_grid() {
    let grid = GeodeticGrid::calculate(&nadir_window(), "fast[corner]", Step::FULL).unwrap();
    assert_eq!(grid.algorithm().algorithm, Algorithm::Fast);
    assert!(grid.algorithm().corners());
}

#[test]
fn test_source_routes_precomputed() {
    let record = SyntheticRecord {
        params: nadir_window(),
    };

    let grid = GeodeticGrid::from_source(&record, "precomputed", Step::FULL).unwrap();
    assert_eq!(grid.shape(), (10, 10));
    assert!(grid.mask()[[0, 0]]);
    assert_eq!(grid.valid_count(), 99);

    let grid = GeodeticGrid::from_source(&record, "precomputed[corner]", Step::uniform(2).unwrap()).unwrap();
    assert_eq!(grid.shape(), (6, 6));

    let grid = GeodeticGrid::from_source(&record, "direct", Step::FULL).unwrap();
    assert_eq!(grid.algorithm().algorithm, Algorithm::Direct);
    assert_eq!(grid.valid_count(), 100);
}

#[test]
fn test_config_drives_calculation() {
    let config = GridConfig {
        algorithm: "fast".to_string(),
        step: Step::uniform(5).unwrap(),
    };
    config.validate().unwrap();
    let grid = config.calculate(&nadir_window()).unwrap();
    assert_eq!(grid.shape(), (2, 2));
}

// =============================================================================
// Library-backed backends
// =============================================================================

#[cfg(not(feature = "proj"))]
#[test]
fn test_library_backends_need_feature() {
    for name in ["proj_inverse", "proj_crs[corner]"] {
        match GeodeticGrid::calculate(&nadir_window(), name, Step::FULL) {
            Err(err @ GridError::MissingDependency { .. }) => {
                assert!(err.is_missing_dependency());
                assert!(err.to_string().contains("proj"));
            }
            other => panic!("{}: expected missing dependency, got {:?}", name, other),
        }
    }
}

#[cfg(feature = "proj")]
#[test]
fn test_library_longitudes_half_open() {
    // GOES-West full disk crosses the antimeridian on its western side
    let (x, y) = test_utils::full_disk_axes(41, 0.16);
    let params = ProjectionParameters::goes_west(x, y).unwrap();

    for name in ["proj_inverse", "proj_crs"] {
        let grid = GeodeticGrid::calculate(&params, name, Step::FULL).unwrap();
        assert!(grid.valid_count() > 0, "{}", name);
        for (lon, invalid) in grid.longitude().iter().zip(grid.mask().iter()) {
            assert_eq!(lon.is_nan(), *invalid);
            if !invalid {
                assert!(*lon > -180.0 && *lon <= 180.0, "{}: longitude {}", name, lon);
            }
        }
    }
}

#[cfg(feature = "proj")]
#[test]
fn test_library_matches_closed_form_on_disk() {
    // Entirely on the disk, away from the limb
    let (x, y) = test_utils::full_disk_axes(31, 0.09);
    let params = ProjectionParameters::goes_east(x, y).unwrap();
    let direct = GeodeticGrid::calculate(&params, "direct", Step::FULL).unwrap();
    assert_eq!(direct.valid_count(), 31 * 31);

    for name in ["proj_inverse", "proj_crs"] {
        let grid = GeodeticGrid::calculate(&params, name, Step::FULL).unwrap();
        assert_eq!(grid.mask(), direct.mask(), "{}", name);
        test_utils::assert_grids_approx_eq!(
            grid.latitude(),
            direct.latitude(),
            test_utils::fixtures::tolerance::LIBRARY
        );
        test_utils::assert_grids_approx_eq!(
            grid.longitude(),
            direct.longitude(),
            test_utils::fixtures::tolerance::LIBRARY
        );
    }
}
