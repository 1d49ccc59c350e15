//! Configuration for grid computation.

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::assembler::Step;
use crate::backend::AlgorithmSpec;
use crate::error::GridResult;
use crate::grid::{GeodeticGrid, GridSource};
use crate::parameters::ProjectionParameters;

/// Environment variable naming the algorithm, e.g. `fast[corner]`.
pub const ALGORITHM_ENV: &str = "GEODETIC_ALGORITHM";
/// Environment variable holding the step, `n` or `rows,cols`.
pub const STEP_ENV: &str = "GEODETIC_STEP";

/// Which algorithm to run and how densely to sample.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GridConfig {
    /// Algorithm string in `name[option]` form.
    pub algorithm: String,

    /// Row/column subsampling.
    pub step: Step,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            algorithm: AlgorithmSpec::default().to_string(),
            step: Step::FULL,
        }
    }
}

impl GridConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(val) = lookup(ALGORITHM_ENV) {
            config.algorithm = val.trim().to_string();
        }

        if let Some(val) = lookup(STEP_ENV) {
            match val.parse() {
                Ok(step) => config.step = step,
                Err(e) => warn!(value = %val, error = %e, "Ignoring invalid {}", STEP_ENV),
            }
        }

        config
    }

    /// Check that the algorithm string parses.
    pub fn validate(&self) -> GridResult<()> {
        self.algorithm_spec().map(|_| ())
    }

    pub fn algorithm_spec(&self) -> GridResult<AlgorithmSpec> {
        self.algorithm.parse()
    }

    /// Compute a grid with this configuration.
    pub fn calculate(&self, params: &ProjectionParameters) -> GridResult<GeodeticGrid> {
        GeodeticGrid::calculate(params, &self.algorithm, self.step)
    }

    /// Build a grid from a source with this configuration.
    pub fn from_source<S: GridSource + ?Sized>(&self, source: &S) -> GridResult<GeodeticGrid> {
        GeodeticGrid::from_source(source, &self.algorithm, self.step)
    }
}
