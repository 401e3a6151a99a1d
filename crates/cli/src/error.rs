//! CLI errors and the exit codes they map to.
//!
//! - 0:  success
//! - 2:  argument parse error (reported by clap before `run`)
//! - 10: engine error (unknown engine, bad dimensions, malformed config)
//! - 11: I/O error (frame export, reading or saving a run spec)
//! - 12: input error (bad `--params` JSON, zero `--every`, invalid run spec)
//! - 13: serialization error

use physarum_core::EngineError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Engine(EngineError),

    #[error("{0}")]
    Io(String),

    #[error("{0}")]
    Input(String),

    #[error("serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl CliError {
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::Engine(_) => 10,
            CliError::Io(_) => 11,
            CliError::Input(_) => 12,
            CliError::Serialization(_) => 13,
        }
    }
}

/// Engine-side I/O failures keep the I/O exit code; a bad run spec is an
/// input error.
impl From<EngineError> for CliError {
    fn from(e: EngineError) -> Self {
        match e {
            EngineError::Io(msg) => CliError::Io(msg),
            invalid @ EngineError::InvalidRunSpec(_) => CliError::Input(invalid.to_string()),
            other => CliError::Engine(other),
        }
    }
}
