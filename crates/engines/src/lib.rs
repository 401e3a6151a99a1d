#![deny(unsafe_code)]
//! Engine registry: maps engine names to implementations and provides
//! CPU-side frame export.
//!
//! This crate sits between `physarum-core` (which defines the `Engine` trait)
//! and the simulation crates. The CLI depends on it so that name-based
//! construction and PNG output live in one place.

pub mod pixel;

#[cfg(feature = "png")]
pub mod snapshot;

use physarum_core::{Engine, EngineError, Grid, RunSpec};
use serde_json::Value;

/// All available engine names.
const ENGINE_NAMES: &[&str] = &["physarum"];

/// Enumeration of all available engines.
///
/// Wraps each implementation and delegates `Engine` trait methods.
/// Use [`EngineKind::from_name`] for string-based construction.
pub enum EngineKind {
    /// Physarum trail-following agents.
    Physarum(physarum::Simulation),
}

impl EngineKind {
    /// Constructs an engine by name.
    ///
    /// Returns `EngineError::UnknownEngine` if the name is not recognized.
    pub fn from_name(
        name: &str,
        width: usize,
        height: usize,
        seed: u64,
        params: &Value,
    ) -> Result<Self, EngineError> {
        match name {
            "physarum" => Ok(EngineKind::Physarum(physarum::Simulation::from_json(
                width, height, seed, params,
            )?)),
            _ => Err(EngineError::UnknownEngine(name.to_string())),
        }
    }

    /// Constructs the engine a validated [`RunSpec`] describes.
    pub fn from_spec(spec: &RunSpec) -> Result<Self, EngineError> {
        spec.validate()?;
        Self::from_name(&spec.engine, spec.width, spec.height, spec.seed, &spec.params)
    }

    /// Returns a slice of all recognized engine names.
    pub fn list_engines() -> &'static [&'static str] {
        ENGINE_NAMES
    }
}

impl Engine for EngineKind {
    fn step(&mut self) -> Result<(), EngineError> {
        match self {
            EngineKind::Physarum(e) => e.step(),
        }
    }

    fn tick(&self) -> u64 {
        match self {
            EngineKind::Physarum(e) => e.tick(),
        }
    }

    fn field(&self) -> &Grid {
        match self {
            EngineKind::Physarum(e) => e.field(),
        }
    }

    fn params(&self) -> Value {
        match self {
            EngineKind::Physarum(e) => e.params(),
        }
    }

    fn param_schema(&self) -> Value {
        match self {
            EngineKind::Physarum(e) => e.param_schema(),
        }
    }
}
