//! The `Engine` trait every tick-driven simulation implements.
//!
//! The trait is object-safe so front ends can hold a `Box<dyn Engine>` and
//! stay agnostic of the concrete simulation behind it.

use crate::error::EngineError;
use crate::grid::Grid;
use serde_json::Value;

/// A tick-driven simulation that exposes its state as a byte [`Grid`].
///
/// Rendering and export collaborators call [`Engine::field`] once per tick
/// and treat the returned grid as read-only.
pub trait Engine {
    /// Advance the simulation by one tick.
    fn step(&mut self) -> Result<(), EngineError>;

    /// Number of ticks completed so far.
    fn tick(&self) -> u64;

    /// The intensity grid produced by the most recent tick.
    fn field(&self) -> &Grid;

    /// Current parameter values as a JSON object.
    fn params(&self) -> Value;

    /// Schema describing all available parameters, their types, ranges, and defaults.
    fn param_schema(&self) -> Value;
}
