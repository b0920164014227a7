/// Scorer settings loadable from JSON.
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::noise::NoiseModel;
use crate::score::{Execution, Scorer};

pub const DEFAULT_ALPHA: f64 = 0.15;
pub const DEFAULT_BETA: f64 = 0.00001;

/// Either one alpha for every site or a list with one alpha per site.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AlphaSpec {
    Uniform(f64),
    PerSite(Vec<f64>),
}

/// Error rates and execution mode for a [`Scorer`].
///
/// ```json
/// { "alpha": [0.1, 0.2, 0.15], "beta": 0.001, "parallel": true }
/// ```
///
/// Missing fields take their defaults.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ScorerConfig {
    pub alpha: AlphaSpec,
    pub beta: f64,
    pub parallel: bool,
}

impl Default for ScorerConfig {
    fn default() -> Self {
        ScorerConfig {
            alpha: AlphaSpec::Uniform(DEFAULT_ALPHA),
            beta: DEFAULT_BETA,
            parallel: false,
        }
    }
}

impl ScorerConfig {
    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_path(path: &Path) -> Result<Self> {
        let json = fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Validate the rates and build the noise model.
    pub fn noise_model(&self) -> Result<NoiseModel> {
        match &self.alpha {
            AlphaSpec::Uniform(alpha) => NoiseModel::uniform(*alpha, self.beta),
            AlphaSpec::PerSite(alpha) => NoiseModel::per_site(alpha, self.beta),
        }
    }

    pub fn execution(&self) -> Execution {
        if self.parallel {
            Execution::Parallel
        } else {
            Execution::Sequential
        }
    }

    /// Build a scorer for `observed` with these settings.
    pub fn scorer<'a>(
        &self,
        observed: &'a [i32],
        cells: usize,
        mutation_number: usize,
    ) -> Result<Scorer<'a>> {
        let noise = self.noise_model()?;
        Ok(Scorer::new(observed, cells, mutation_number, &noise)?.with_execution(self.execution()))
    }
}
