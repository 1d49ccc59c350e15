//! Algorithm selection and dispatch.
//!
//! Algorithms are named with a small grammar, `name` or `name[option]`,
//! where the option picks pixel centers (default) or pixel corners:
//!
//! ```text
//! direct            closed-form transform over the full grid (default)
//! fast[corner]      quadrant-symmetry accelerated transform, corner grid
//! proj_inverse      PROJ geostationary inverse projection
//! proj_crs          PROJ CRS-to-CRS transform to GRS80 lon/lat
//! precomputed       latitude/longitude arrays shipped with the data
//! ```
//!
//! Every computed backend implements [`GridBackend`] and returns the same
//! double-precision contract; the caller casts and masks once.

use std::fmt;
use std::str::FromStr;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::assembler::{assemble_direct, LatLon, ScanAxes};
use crate::error::{GridError, GridResult};
use crate::parameters::ProjectionParameters;
use crate::symmetry::assemble_fast;

static ALGORITHM_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\w+)(?:\[(\w+)\])?$").expect("algorithm pattern compiles"));

const ACCEPTED_FORMS: &str = "'<name>' or '<name>[<option>]'";
const ACCEPTED_OPTIONS: &str = "one of: center, corner";

/// Name of the cargo feature and library behind the external backends.
pub const PROJ_DEPENDENCY: &str = "proj";

/// Backend families.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Algorithm {
    #[default]
    Direct,
    Fast,
    ProjInverse,
    ProjCrs,
    Precomputed,
}

impl Algorithm {
    pub const ALL: [Algorithm; 5] = [
        Algorithm::Direct,
        Algorithm::Fast,
        Algorithm::ProjInverse,
        Algorithm::ProjCrs,
        Algorithm::Precomputed,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Direct => "direct",
            Self::Fast => "fast",
            Self::ProjInverse => "proj_inverse",
            Self::ProjCrs => "proj_crs",
            Self::Precomputed => "precomputed",
        }
    }

    /// Backed by an optional external library.
    pub fn is_external(&self) -> bool {
        matches!(self, Self::ProjInverse | Self::ProjCrs)
    }

    /// Whether this build can run the algorithm.
    pub fn is_available(&self) -> bool {
        !self.is_external() || cfg!(feature = "proj")
    }

    fn accepted_names() -> String {
        let names: Vec<&str> = Self::ALL.iter().map(|a| a.as_str()).collect();
        format!("one of: {}", names.join(", "))
    }
}

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Algorithm {
    type Err = GridError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|a| a.as_str() == s)
            .ok_or_else(|| GridError::configuration(s, Self::accepted_names()))
    }
}

/// Which point of each pixel the grid describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PixelAnchor {
    #[default]
    Center,
    Corner,
}

impl PixelAnchor {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Center => "center",
            Self::Corner => "corner",
        }
    }

    pub fn is_corner(&self) -> bool {
        *self == Self::Corner
    }
}

impl FromStr for PixelAnchor {
    type Err = GridError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "center" => Ok(Self::Center),
            "corner" => Ok(Self::Corner),
            other => Err(GridError::configuration(other, ACCEPTED_OPTIONS)),
        }
    }
}

/// A parsed `name[option]` algorithm string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct AlgorithmSpec {
    pub algorithm: Algorithm,
    pub anchor: PixelAnchor,
}

impl AlgorithmSpec {
    pub fn new(algorithm: Algorithm, anchor: PixelAnchor) -> Self {
        Self { algorithm, anchor }
    }

    pub fn corners(&self) -> bool {
        self.anchor.is_corner()
    }
}

impl FromStr for AlgorithmSpec {
    type Err = GridError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let caps = ALGORITHM_PATTERN
            .captures(s)
            .ok_or_else(|| GridError::configuration(s, ACCEPTED_FORMS))?;

        // Both groups are \w+, so a name always exists when the pattern matched
        let name = caps.get(1).map_or("", |m| m.as_str());
        let algorithm: Algorithm = name.parse()?;
        let anchor = match caps.get(2) {
            Some(option) => option.as_str().parse()?,
            None => PixelAnchor::Center,
        };

        Ok(Self { algorithm, anchor })
    }
}

impl TryFrom<String> for AlgorithmSpec {
    type Error = GridError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<AlgorithmSpec> for String {
    fn from(spec: AlgorithmSpec) -> Self {
        spec.to_string()
    }
}

impl fmt::Display for AlgorithmSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.anchor {
            PixelAnchor::Center => write!(f, "{}", self.algorithm),
            PixelAnchor::Corner => write!(f, "{}[{}]", self.algorithm, self.anchor.as_str()),
        }
    }
}

/// A backend that computes latitude/longitude from scan angles.
pub trait GridBackend {
    fn algorithm(&self) -> Algorithm;

    /// Latitude/longitude in degrees over `axes`, invalid cells NaN in both.
    fn compute(&self, params: &ProjectionParameters, axes: &ScanAxes) -> GridResult<LatLon>;
}

/// Closed-form transform over every cell.
#[derive(Debug, Clone, Copy, Default)]
pub struct DirectBackend;

impl GridBackend for DirectBackend {
    fn algorithm(&self) -> Algorithm {
        Algorithm::Direct
    }

    fn compute(&self, params: &ProjectionParameters, axes: &ScanAxes) -> GridResult<LatLon> {
        assemble_direct(params, axes)
    }
}

/// Quadrant-symmetry accelerated transform.
#[derive(Debug, Clone, Copy, Default)]
pub struct FastBackend;

impl GridBackend for FastBackend {
    fn algorithm(&self) -> Algorithm {
        Algorithm::Fast
    }

    fn compute(&self, params: &ProjectionParameters, axes: &ScanAxes) -> GridResult<LatLon> {
        assemble_fast(params, axes)
    }
}

/// Backend for a computed algorithm.
///
/// `precomputed` has no computed backend and is rejected here; it needs a
/// grid source. External algorithms fail with `MissingDependency` when the
/// `proj` feature is off.
pub fn computed_backend(algorithm: Algorithm) -> GridResult<Box<dyn GridBackend>> {
    match algorithm {
        Algorithm::Direct => Ok(Box::new(DirectBackend)),
        Algorithm::Fast => Ok(Box::new(FastBackend)),
        Algorithm::ProjInverse | Algorithm::ProjCrs => external_backend(algorithm),
        Algorithm::Precomputed => Err(GridError::configuration(
            algorithm.as_str(),
            "a computed algorithm (precomputed grids are read from a grid source)",
        )),
    }
}

#[cfg(feature = "proj")]
fn external_backend(algorithm: Algorithm) -> GridResult<Box<dyn GridBackend>> {
    use crate::external::{ProjCrsBackend, ProjInverseBackend};

    match algorithm {
        Algorithm::ProjCrs => Ok(Box::new(ProjCrsBackend)),
        _ => Ok(Box::new(ProjInverseBackend)),
    }
}

#[cfg(not(feature = "proj"))]
fn external_backend(algorithm: Algorithm) -> GridResult<Box<dyn GridBackend>> {
    Err(GridError::missing_dependency(algorithm.as_str(), PROJ_DEPENDENCY))
}
