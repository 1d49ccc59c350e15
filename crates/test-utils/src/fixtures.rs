//! Common test fixtures for GOES ABI fixed grid tests.
//!
//! Sector definitions follow the packing used in ABI L1b/L2 files: the
//! stored integer index `i` maps to a scan angle `offset + scale * i`.

/// GOES-R orbit and GRS80 ellipsoid constants.
pub mod goes {
    /// Perspective point height above the ellipsoid (m)
    pub const PERSPECTIVE_POINT_HEIGHT: f64 = 35_786_023.0;

    /// GRS80 semi-major axis (m)
    pub const SEMI_MAJOR_AXIS: f64 = 6_378_137.0;

    /// GRS80 semi-minor axis (m)
    pub const SEMI_MINOR_AXIS: f64 = 6_356_752.31414;

    /// GRS80 inverse flattening
    pub const INVERSE_FLATTENING: f64 = 298.2572221;

    /// perspective_point_height + semi_major_axis
    pub const ORBITAL_RADIUS: f64 = 42_164_160.0;

    /// GOES-East sub-satellite longitude
    pub const EAST_LONGITUDE: f64 = -75.0;

    /// GOES-West sub-satellite longitude
    pub const WEST_LONGITUDE: f64 = -137.0;

    /// Approximate scan angle of the Earth's limb along the equator (rad)
    pub const LIMB_SCAN_ANGLE: f64 = 0.1518;
}

/// ABI sector layouts.
pub mod sector {
    /// Packed scan-angle layout of one ABI sector.
    #[derive(Debug, Clone, Copy)]
    pub struct SectorSpec {
        pub columns: usize,
        pub rows: usize,
        pub x_scale: f64,
        pub x_offset: f64,
        pub y_scale: f64,
        pub y_offset: f64,
    }

    impl SectorSpec {
        /// Column scan angles (rad).
        pub fn x(&self) -> Vec<f64> {
            unpack(self.columns, self.x_scale, self.x_offset)
        }

        /// Row scan angles (rad), north to south.
        pub fn y(&self) -> Vec<f64> {
            unpack(self.rows, self.y_scale, self.y_offset)
        }

        /// Column scan angles as stored after unpacking to 32-bit floats.
        pub fn x_f32(&self) -> Vec<f32> {
            self.x().into_iter().map(|v| v as f32).collect()
        }

        /// Row scan angles as stored after unpacking to 32-bit floats.
        pub fn y_f32(&self) -> Vec<f32> {
            self.y().into_iter().map(|v| v as f32).collect()
        }

        pub fn size(&self) -> usize {
            self.columns * self.rows
        }
    }

    fn unpack(count: usize, scale: f64, offset: f64) -> Vec<f64> {
        (0..count).map(|i| offset + scale * i as f64).collect()
    }

    /// GOES-16 full disk, 2 km bands
    pub const FULL_DISK_2KM: SectorSpec = SectorSpec {
        columns: 5424,
        rows: 5424,
        x_scale: 5.6e-5,
        x_offset: -0.151844,
        y_scale: -5.6e-5,
        y_offset: 0.151844,
    };

    /// GOES-16 CONUS, 2 km bands
    pub const CONUS_2KM: SectorSpec = SectorSpec {
        columns: 2500,
        rows: 1500,
        x_scale: 5.6e-5,
        x_offset: -0.101332,
        y_scale: -5.6e-5,
        y_offset: 0.128212,
    };

    /// Small 10x10 window around nadir
    pub const NADIR_10X10: SectorSpec = SectorSpec {
        columns: 10,
        rows: 10,
        x_scale: 0.002,
        x_offset: -0.009,
        y_scale: -0.002,
        y_offset: 0.009,
    };
}

/// Tolerances shared across grid tests (degrees).
pub mod tolerance {
    /// Accelerated vs full transform
    pub const FAST_VS_DIRECT: f64 = 1e-5;

    /// Nadir pixel against the sub-satellite point
    pub const NADIR: f64 = 1e-6;

    /// Library-backed transform vs closed form
    pub const LIBRARY: f64 = 1e-4;
}

/// File names looked up with `require_test_file!`.
pub mod sample_files {
    /// An ABI L2 product carrying `goes_imager_projection` and x/y
    pub const ABI_L2_CONUS: &str = "OR_ABI-L2-ACMC-M6_G16_s20240151801174.nc";

    /// NOAA's precomputed latitude/longitude grid for the GOES-East full disk
    pub const LATLON_FULL_DISK: &str = "goes16_abi_full_disk_lat_lon.nc";
}
