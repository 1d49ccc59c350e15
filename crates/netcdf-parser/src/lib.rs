//! NetCDF field extraction for GOES-R ABI datasets.
//!
//! Records are described by an explicit [`Schema`] of fields, each naming
//! where it lives (variable attribute, global attribute, variable or
//! dimension) and what kind of value it must be. [`GoesRecord`] plugs a
//! dataset into the grid engine as a [`geodetic_grid::GridSource`].
//!
//! Real files are read through [`native::NetCdfDataset`] when the `native`
//! feature is enabled (requires libnetcdf and libhdf5). [`MemoryDataset`]
//! serves synthetic data everywhere else.

pub mod dataset;
pub mod error;
pub mod goes;
#[cfg(feature = "native")]
pub mod native;
pub mod schema;

pub use dataset::{ArrayData, AttributeValue, Dataset, MaskedArray, MemoryDataset, RawVariable, VariableValues};
pub use error::{NetCdfError, NetCdfResult};
pub use goes::{GoesImagerProjection, GoesLatLonGrid, GoesLatLonGridInfo, GoesRecord};
pub use schema::{FieldKind, FieldSource, FieldSpec, FieldValue, ResolvedFields, Schema};
