//! Native NetCDF reading using the netcdf library.
//!
//! [`NetCdfDataset`] implements [`Dataset`] over libnetcdf (which wraps
//! HDF5). Variable storage is read as f64; the C library converts packed
//! shorts and floats on the way out, and the shared unpacking in
//! [`crate::dataset`] applies fill values and scaling afterwards.
//!
//! The netcdf library requires a file path. When reading from bytes, we
//! write to a temp file first, on `/dev/shm` when Linux provides it.

use std::collections::BTreeMap;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Once;

use tracing::{debug, warn};

use crate::dataset::{array_from_shape, ArrayData, AttributeValue, Dataset, RawVariable};
use crate::error::{NetCdfError, NetCdfResult};

/// Silence HDF5's automatic error printing to stderr.
///
/// The HDF5 C library prints verbose error messages to stderr even when errors
/// are handled gracefully by the Rust code (e.g., when checking for optional
/// attributes that don't exist). This creates confusing log spam like:
///
/// ```text
/// HDF5-DIAG: Error detected in HDF5 (1.10.8) thread 3:
///   #003: ../../../src/H5Adense.c line 397 in H5A__dense_open(): can't locate attribute in name index
/// ```
///
/// Only needs to run once per process; [`NetCdfDataset::open`] calls it.
pub fn silence_hdf5_errors() {
    static INIT: Once = Once::new();

    INIT.call_once(|| {
        // SAFETY: H5Eset_auto2 is thread-safe and we're passing null pointers
        // to disable error output, which is a documented valid use.
        unsafe {
            hdf5_metno_sys::h5e::H5Eset_auto2(
                hdf5_metno_sys::h5e::H5E_DEFAULT,
                None,
                std::ptr::null_mut(),
            );
        }
    });
}

/// Temp file removed when dropped.
#[derive(Debug)]
struct TempFile(PathBuf);

impl Drop for TempFile {
    fn drop(&mut self) {
        let _ = std::fs::remove_file(&self.0);
    }
}

/// An open NetCDF file.
pub struct NetCdfDataset {
    file: netcdf::File,
    // Declared after `file` so the handle closes before the file is removed
    _temp: Option<TempFile>,
}

impl std::fmt::Debug for NetCdfDataset {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NetCdfDataset").field("temp", &self._temp).finish()
    }
}

impl NetCdfDataset {
    pub fn open<P: AsRef<Path>>(path: P) -> NetCdfResult<Self> {
        silence_hdf5_errors();
        let path = path.as_ref();
        let file = netcdf::open(path)
            .map_err(|e| NetCdfError::invalid(format!("Failed to open NetCDF {}: {}", path.display(), e)))?;
        debug!(path = %path.display(), "Opened NetCDF file");
        Ok(Self { file, _temp: None })
    }

    /// Open a file held in memory.
    pub fn from_bytes(data: &[u8]) -> NetCdfResult<Self> {
        let temp = TempFile(get_optimal_temp_dir().join(generate_temp_filename()));

        let mut file = std::fs::File::create(&temp.0)?;
        file.write_all(data)?;
        drop(file);

        let mut dataset = Self::open(&temp.0)?;
        dataset._temp = Some(temp);
        Ok(dataset)
    }

    fn find_variable(&self, name: &str) -> Option<netcdf::Variable<'_>> {
        self.file.variable(name)
    }
}

impl Dataset for NetCdfDataset {
    fn global_attribute(&self, name: &str) -> NetCdfResult<Option<AttributeValue>> {
        match self.file.attribute(name) {
            None => Ok(None),
            Some(attr) => read_attribute(name, &attr),
        }
    }

    fn variable_attribute(&self, variable: &str, name: &str) -> NetCdfResult<Option<AttributeValue>> {
        let Some(var) = self.find_variable(variable) else {
            return Ok(None);
        };
        if !has_attr(&var, name) {
            return Ok(None);
        }
        match var.attribute(name) {
            None => Ok(None),
            Some(attr) => read_attribute(name, &attr),
        }
    }

    fn raw_variable(&self, name: &str) -> NetCdfResult<Option<RawVariable>> {
        let Some(var) = self.find_variable(name) else {
            return Ok(None);
        };

        let shape: Vec<usize> = var.dimensions().iter().map(|d| d.len()).collect();
        let values: Vec<f64> = var
            .get_values(..)
            .map_err(|e| NetCdfError::invalid(format!("Failed to read {}: {}", name, e)))?;
        let data = ArrayData::Float64(array_from_shape(&shape, values)?);

        let mut attributes = BTreeMap::new();
        for attr in var.attributes() {
            let attr_name = attr.name().to_string();
            if let Some(value) = read_attribute(&attr_name, &attr)? {
                attributes.insert(attr_name, value);
            }
        }

        Ok(Some(RawVariable { data, attributes }))
    }

    fn dimension_len(&self, name: &str) -> NetCdfResult<Option<usize>> {
        Ok(self.file.dimension(name).map(|d| d.len()))
    }
}

/// Convert an attribute, skipping value types the records never use.
fn read_attribute(name: &str, attr: &netcdf::Attribute<'_>) -> NetCdfResult<Option<AttributeValue>> {
    use netcdf::AttributeValue as Nc;

    let value = attr
        .value()
        .map_err(|e| NetCdfError::invalid(format!("Failed to read attribute {}: {}", name, e)))?;
    Ok(match value {
        Nc::Str(s) => Some(AttributeValue::Text(s)),
        Nc::Short(v) => Some(AttributeValue::Int16(vec![v])),
        Nc::Shorts(v) => Some(AttributeValue::Int16(v)),
        Nc::Float(v) => Some(AttributeValue::Float32(vec![v])),
        Nc::Floats(v) => Some(AttributeValue::Float32(v)),
        Nc::Double(v) => Some(AttributeValue::Float64(vec![v])),
        Nc::Doubles(v) => Some(AttributeValue::Float64(v)),
        Nc::Int(v) => Some(AttributeValue::Float64(vec![f64::from(v)])),
        Nc::Ints(v) => Some(AttributeValue::Float64(v.into_iter().map(f64::from).collect())),
        Nc::Schar(v) => Some(AttributeValue::Int16(vec![i16::from(v)])),
        Nc::Uchar(v) => Some(AttributeValue::Int16(vec![i16::from(v)])),
        _ => {
            warn!(attribute = name, "Skipping attribute of unsupported type");
            None
        }
    })
}

// =============================================================================
// Internal helpers
// =============================================================================

/// Get the optimal temp directory for NetCDF file operations.
///
/// On Linux, uses /dev/shm (memory-backed tmpfs) if available for faster I/O.
/// Falls back to the system temp directory on other platforms or if /dev/shm is unavailable.
fn get_optimal_temp_dir() -> PathBuf {
    #[cfg(target_os = "linux")]
    {
        let shm_path = Path::new("/dev/shm");
        if shm_path.is_dir() {
            let test_path = shm_path.join(format!(".netcdf_test_{}", std::process::id()));
            if std::fs::write(&test_path, b"test").is_ok() {
                let _ = std::fs::remove_file(&test_path);
                return shm_path.to_path_buf();
            }
        }
    }

    std::env::temp_dir()
}

/// Unique per process, thread and call.
fn generate_temp_filename() -> String {
    static COUNTER: AtomicU64 = AtomicU64::new(0);

    let pid = std::process::id();
    let tid = std::thread::current().id();
    let count = COUNTER.fetch_add(1, Ordering::Relaxed);

    format!("geodetic_{}_{:?}_{}.nc", pid, tid, count)
}

/// Check if a variable has an attribute with the given name.
/// This avoids HDF5 error spam when checking for optional attributes.
fn has_attr(var: &netcdf::Variable<'_>, name: &str) -> bool {
    var.attributes().any(|attr| attr.name() == name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_optimal_temp_dir() {
        let dir = get_optimal_temp_dir();
        assert!(dir.exists(), "Temp dir should exist");
    }

    #[test]
    fn test_temp_filename_uniqueness() {
        let name1 = generate_temp_filename();
        let name2 = generate_temp_filename();
        assert_ne!(name1, name2, "Temp filenames should be unique");
    }

    #[test]
    fn test_from_bytes_rejects_garbage() {
        assert!(matches!(
            NetCdfDataset::from_bytes(b"not a netcdf file"),
            Err(NetCdfError::InvalidFormat(_))
        ));
    }
}
