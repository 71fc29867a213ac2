//! Error types for thermo-guard.
//!
//! Configuration problems (bad solver parameters, fields missing when a
//! pipeline stage needs them) are fatal for the run that hit them. A failed
//! guardrail is not an error: it comes back as `Decision::Retry`.

use thiserror::Error;

use crate::sim_state::Decision;

/// Errors raised while configuring or running the rod solver.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum SolverError {
    #[error("Grid needs at least 3 points, got {nx}")]
    GridTooSmall { nx: usize },

    #[error("Parameter '{name}' must be positive, got {value}")]
    NonPositive { name: &'static str, value: f64 },

    #[error("Parameter '{name}' must be finite")]
    NonFinite { name: &'static str },

    #[error("Explicit scheme is unstable: r = {r} exceeds 0.5")]
    Unstable { r: f64 },
}

/// Errors raised by a simulation result provider.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ProviderError {
    #[error("Provider parameter '{name}' is missing")]
    MissingParameter { name: &'static str },

    #[error("Simulation backend failed: {message}")]
    Backend { message: String },
}

/// Errors raised while running the validation pipeline.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum PipelineError {
    #[error("Stage '{stage}' requires '{field}', which is missing")]
    MissingField {
        stage: &'static str,
        field: &'static str,
    },

    #[error("Decision was already set to '{decision}'")]
    DecisionAlreadySet { decision: Decision },

    #[error("Pipeline finished without producing a decision")]
    Undecided,

    #[error("Stages must run as retrieve, analyze, guard, decide; got {found:?}")]
    InvalidStageOrder { found: Vec<String> },

    #[error("Note key '{key}' is reserved for a computed analysis field")]
    ReservedNoteKey { key: String },

    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),
}

/// A decision label that is not `accept`, `reject` or `retry`.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("Unknown decision '{0}'")]
pub struct ParseDecisionError(pub String);

/// Errors raised while loading JSON configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to parse configuration: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Top-level error type.
#[derive(Debug, Error)]
pub enum ThermoError {
    #[error("Solver error: {0}")]
    Solver(#[from] SolverError),

    #[error("Pipeline error: {0}")]
    Pipeline(#[from] PipelineError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}

impl ThermoError {
    /// Everything except a solver instability is a configuration problem.
    #[must_use]
    pub const fn is_configuration(&self) -> bool {
        !matches!(self, Self::Solver(SolverError::Unstable { .. }))
    }

    #[must_use]
    pub const fn is_stability(&self) -> bool {
        matches!(self, Self::Solver(SolverError::Unstable { .. }))
    }
}

pub type ThermoResult<T> = Result<T, ThermoError>;
