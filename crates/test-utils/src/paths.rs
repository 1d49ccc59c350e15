//! Path utilities for locating test data files.
//!
//! ABI products and precomputed lat/lon grids are large and not checked in,
//! so tests look for them in several places and skip when absent.

use std::path::PathBuf;

/// Returns the workspace root directory.
///
/// This is determined by walking up from the current crate's manifest directory
/// until we find the workspace Cargo.toml.
pub fn workspace_root() -> PathBuf {
    // Start from the test-utils crate manifest dir
    let manifest_dir = env!("CARGO_MANIFEST_DIR");
    PathBuf::from(manifest_dir)
        .parent() // crates/
        .and_then(|p| p.parent()) // workspace root
        .map(|p| p.to_path_buf())
        .unwrap_or_else(|| PathBuf::from(manifest_dir))
}

/// Returns `crates/{crate_name}/testdata/`.
pub fn crate_testdata_dir(crate_name: &str) -> PathBuf {
    workspace_root()
        .join("crates")
        .join(crate_name)
        .join("testdata")
}

/// Searches for a test file in multiple locations.
///
/// This function checks the following locations in order:
/// 1. Environment variable `TEST_DATA_DIR` (if set)
/// 2. `crates/netcdf-parser/testdata/`
/// 3. `crates/geodetic-grid/testdata/`
/// 4. `testdata/` at the workspace root
///
/// # Returns
///
/// `Some(PathBuf)` if the file is found, `None` otherwise.
pub fn find_test_file(name: &str) -> Option<PathBuf> {
    let mut candidates = Vec::new();

    // Check environment variable first
    if let Ok(test_data_dir) = std::env::var("TEST_DATA_DIR") {
        candidates.push(PathBuf::from(test_data_dir).join(name));
    }

    let root = workspace_root();
    candidates.extend([
        crate_testdata_dir("netcdf-parser").join(name),
        crate_testdata_dir("geodetic-grid").join(name),
        root.join("testdata").join(name),
    ]);

    candidates.into_iter().find(|path| path.exists())
}

/// Searches for a test file in a specific crate's testdata directory.
pub fn find_crate_test_file(crate_name: &str, name: &str) -> Option<PathBuf> {
    let path = crate_testdata_dir(crate_name).join(name);
    if path.exists() {
        Some(path)
    } else {
        None
    }
}
