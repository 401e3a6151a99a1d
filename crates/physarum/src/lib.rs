#![deny(unsafe_code)]
//! Physarum trail-following simulation.
//!
//! A large population of agents wanders a byte-valued trail field. Each
//! agent deposits trail where it stands, probes the field ahead of it and
//! steers toward the strongest reading. Periodic diffusion passes blur and
//! decay the field, and sensor settings are re-read from a `key=value`
//! source while the simulation runs.
//!
//! [`Simulation`] ties the pieces together and implements
//! [`physarum_core::Engine`].

pub mod agent;
pub mod config;
pub mod jitter;
pub mod simulation;
pub mod trail;

pub use agent::{Agent, SpawnArea, Steer};
pub use config::{ConfigSource, ConfigStore, FileSource, ReloadReport, SensorConfig, StaticSource};
pub use jitter::Jitter;
pub use simulation::{Simulation, SimulationParams};
pub use trail::TrailField;
