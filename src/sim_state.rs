//! Shared record threaded through the validation pipeline.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::constants::{DEFAULT_RESIDUAL_TOLERANCE, KEY_SUMMARY, KEY_TOL, RESERVED_ANALYSIS_KEYS};
use crate::error::{ConfigError, ParseDecisionError, PipelineError};
use crate::sim_provider::SimResult;

/// Named simulation parameters (`Q_in`, `m`, `cp`, `dt`, `tol`, ...).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SimInputs(BTreeMap<String, f64>);

impl SimInputs {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn with(mut self, key: &str, value: f64) -> Self {
        self.insert(key, value);
        self
    }

    pub fn insert(&mut self, key: &str, value: f64) {
        self.0.insert(key.to_string(), value);
    }

    pub fn get(&self, key: &str) -> Option<f64> {
        self.0.get(key).copied()
    }

    /// Looks up a field a stage cannot run without.
    pub fn require(&self, stage: &'static str, key: &'static str) -> Result<f64, PipelineError> {
        self.get(key)
            .ok_or(PipelineError::MissingField { stage, field: key })
    }

    /// Residual tolerance, `1e-2` when not given.
    pub fn tolerance(&self) -> f64 {
        self.get(KEY_TOL).unwrap_or(DEFAULT_RESIDUAL_TOLERANCE)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<const N: usize> From<[(&str, f64); N]> for SimInputs {
    fn from(pairs: [(&str, f64); N]) -> Self {
        pairs
            .into_iter()
            .fold(Self::new(), |inputs, (key, value)| inputs.with(key, value))
    }
}

/// Derived quantities written by the analyze and guard stages.
///
/// The typed fields are the ones read downstream. They can only be written
/// from inside the crate, so `constraint_ok` is always computed by the guard
/// and never supplied by a caller. Anything uninterpreted goes in `notes`.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Analysis {
    #[serde(skip_serializing_if = "Option::is_none")]
    net: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    energy_residual: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    constraint_ok: Option<bool>,
    #[serde(flatten)]
    notes: Map<String, Value>,
}

impl Analysis {
    /// `Q_in - Q_out`.
    pub fn net(&self) -> Option<f64> {
        self.net
    }

    /// Observed minus flow-predicted energy change.
    pub fn energy_residual(&self) -> Option<f64> {
        self.energy_residual
    }

    pub fn constraint_ok(&self) -> Option<bool> {
        self.constraint_ok
    }

    /// Free-form summary text, if the analyze stage produced one.
    pub fn summary(&self) -> Option<&str> {
        self.notes.get(KEY_SUMMARY).and_then(Value::as_str)
    }

    /// Opaque extension fields.
    pub fn notes(&self) -> &Map<String, Value> {
        &self.notes
    }

    /// Adds an opaque note. Keys of the computed fields (`net`,
    /// `energy_residual`, `constraint_ok`) are refused since notes are
    /// flattened next to them when serialized.
    pub fn insert_note(&mut self, key: &str, value: Value) -> Result<(), PipelineError> {
        if RESERVED_ANALYSIS_KEYS.contains(&key) {
            return Err(PipelineError::ReservedNoteKey {
                key: key.to_string(),
            });
        }
        self.notes.insert(key.to_string(), value);
        Ok(())
    }

    pub(crate) fn set_net(&mut self, net: f64) {
        self.net = Some(net);
    }

    pub(crate) fn set_guard_result(&mut self, energy_residual: f64, constraint_ok: bool) {
        self.energy_residual = Some(energy_residual);
        self.constraint_ok = Some(constraint_ok);
    }
}

/// Terminal outcome of a pipeline run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Decision {
    Accept,
    /// Reserved; the guardrail policy never produces it.
    Reject,
    Retry,
}

impl Decision {
    pub fn as_str(&self) -> &'static str {
        match self {
            Decision::Accept => "accept",
            Decision::Reject => "reject",
            Decision::Retry => "retry",
        }
    }
}

impl FromStr for Decision {
    type Err = ParseDecisionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "accept" => Ok(Decision::Accept),
            "reject" => Ok(Decision::Reject),
            "retry" => Ok(Decision::Retry),
            _ => Err(ParseDecisionError(s.to_string())),
        }
    }
}

impl fmt::Display for Decision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The record every stage reads from and writes to.
///
/// Created with inputs only; outputs, analysis and decision fill in as the
/// stages run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SimulationState {
    pub sim_inputs: SimInputs,
    sim_outputs: Option<SimResult>,
    analysis: Analysis,
    decision: Option<Decision>,
}

impl SimulationState {
    pub fn new(sim_inputs: SimInputs) -> Self {
        Self {
            sim_inputs,
            sim_outputs: None,
            analysis: Analysis::default(),
            decision: None,
        }
    }

    /// `None` until the retrieve stage has run.
    pub fn sim_outputs(&self) -> Option<&SimResult> {
        self.sim_outputs.as_ref()
    }

    pub fn require_outputs(&self, stage: &'static str) -> Result<&SimResult, PipelineError> {
        self.sim_outputs
            .as_ref()
            .ok_or(PipelineError::MissingField {
                stage,
                field: "sim_outputs",
            })
    }

    pub fn analysis(&self) -> &Analysis {
        &self.analysis
    }

    pub fn analysis_mut(&mut self) -> &mut Analysis {
        &mut self.analysis
    }

    pub fn decision(&self) -> Option<Decision> {
        self.decision
    }

    pub(crate) fn set_sim_outputs(&mut self, outputs: SimResult) {
        self.sim_outputs = Some(outputs);
    }

    /// Sets the decision; a second call is an error.
    pub(crate) fn set_decision(&mut self, decision: Decision) -> Result<(), PipelineError> {
        if let Some(existing) = self.decision {
            return Err(PipelineError::DecisionAlreadySet { decision: existing });
        }
        self.decision = Some(decision);
        Ok(())
    }
}
