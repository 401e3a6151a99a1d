//! Reproducible description of a simulation run.
//!
//! A [`RunSpec`] captures everything needed to replay a run headlessly:
//! engine name, grid dimensions, construction parameters, PRNG seed and the
//! number of ticks to advance. Runs replay exactly when agents are stepped
//! sequentially (`"parallel": false` in `params`); with parallel stepping the
//! shared jitter sequence may be interleaved differently.

use crate::error::EngineError;
use serde::{Deserialize, Serialize};
use std::path::Path;

fn empty_params() -> serde_json::Value {
    serde_json::Value::Object(serde_json::Map::new())
}

/// Reproducible specification of a simulation run.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RunSpec {
    pub engine: String,
    pub width: usize,
    pub height: usize,
    #[serde(default = "empty_params")]
    pub params: serde_json::Value,
    pub seed: u64,
    #[serde(default)]
    pub ticks: u64,
}

impl RunSpec {
    /// Creates a spec with empty params and zero ticks.
    pub fn new(engine: &str, width: usize, height: usize, seed: u64) -> Self {
        Self {
            engine: engine.to_string(),
            width,
            height,
            params: empty_params(),
            seed,
            ticks: 0,
        }
    }

    /// Builder-style setter for the tick count.
    pub fn with_ticks(mut self, ticks: u64) -> Self {
        self.ticks = ticks;
        self
    }

    /// Builder-style setter for the construction parameters.
    pub fn with_params(mut self, params: serde_json::Value) -> Self {
        self.params = params;
        self
    }

    /// Checks for non-zero, non-overflowing dimensions and an object-valued
    /// `params`.
    pub fn validate(&self) -> Result<(), EngineError> {
        crate::grid::checked_len(self.width, self.height)?;
        if !self.params.is_object() {
            return Err(EngineError::InvalidRunSpec(format!(
                "params must be a JSON object, got {}",
                self.params
            )));
        }
        Ok(())
    }

    /// Reads and validates a spec from a JSON file.
    pub fn load(path: &Path) -> Result<Self, EngineError> {
        let text = std::fs::read_to_string(path)
            .map_err(|e| EngineError::Io(format!("{}: {e}", path.display())))?;
        let spec: RunSpec = serde_json::from_str(&text).map_err(|e| {
            EngineError::InvalidRunSpec(format!("{}: {e}", path.display()))
        })?;
        spec.validate()?;
        Ok(spec)
    }
}
