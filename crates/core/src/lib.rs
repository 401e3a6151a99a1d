#![deny(unsafe_code)]
//! Core types and traits for the physarum workspace.
//!
//! Provides the `Engine` trait, the byte `Grid` exposed to rendering,
//! the `Xorshift64` PRNG, `RunSpec` for reproducible runs, the
//! `ParamReader` parameter helper and the shared `EngineError`.

pub mod engine;
pub mod error;
pub mod grid;
pub mod params;
pub mod prng;
pub mod run_spec;

pub use engine::Engine;
pub use error::EngineError;
pub use grid::Grid;
pub use params::ParamReader;
pub use prng::Xorshift64;
pub use run_spec::RunSpec;
