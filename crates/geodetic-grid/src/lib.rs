//! Geodetic latitude/longitude grids for the GOES ABI fixed grid.
//!
//! Scan angles and orbit/ellipsoid parameters go in; per-pixel latitude,
//! longitude and a validity mask come out. Pixels whose viewing ray misses
//! Earth are NaN in both arrays and masked.
//!
//! ```no_run
//! use geodetic_grid::{GeodeticGrid, ProjectionParameters, Step};
//!
//! let x: Vec<f64> = (0..100).map(|i| -0.1 + 0.002 * i as f64).collect();
//! let y: Vec<f64> = x.iter().rev().copied().collect();
//! let params = ProjectionParameters::goes_east(x, y)?;
//! let grid = GeodeticGrid::calculate(&params, "fast", Step::FULL)?;
//! assert_eq!(grid.shape(), (100, 100));
//! # Ok::<(), geodetic_grid::GridError>(())
//! ```

pub mod assembler;
pub mod backend;
pub mod config;
pub mod edges;
pub mod error;
#[cfg(feature = "proj")]
pub mod external;
pub mod grid;
pub mod mask;
pub mod parameters;
pub mod precomputed;
pub mod symmetry;
pub mod transform;

pub use assembler::{LatLon, ScanAxes, Step};
pub use backend::{Algorithm, AlgorithmSpec, GridBackend, PixelAnchor};
pub use config::GridConfig;
pub use error::{GridError, GridResult};
pub use grid::{GeodeticGrid, GridSource, FILL_VALUE};
pub use parameters::{FixedGrid, Globe, OrbitGeometry, ProjectionParameters, SweepAxis};
pub use precomputed::PrecomputedLatLon;
