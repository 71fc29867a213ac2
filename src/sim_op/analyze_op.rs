//! Analyze stage: net flow plus an opaque summary note.
//!
//! `dT_measured` is fetched by retrieve but not read here.

use serde_json::Value;

use crate::constants::{DEFAULT_ANALYSIS_SUMMARY, KEY_Q_IN, KEY_SUMMARY};
use crate::error::PipelineError;
use crate::sim_op::{SimOp, SimOpHandle};
use crate::sim_state::SimulationState;

pub const ANALYZE_STAGE: &str = "analyze";

#[derive(Debug, Clone)]
pub struct AnalyzeOp {
    pub summary: String,
}

impl AnalyzeOp {
    pub fn new() -> Self {
        Self {
            summary: DEFAULT_ANALYSIS_SUMMARY.to_string(),
        }
    }

    pub fn with_summary(summary: impl Into<String>) -> Self {
        Self {
            summary: summary.into(),
        }
    }

    pub fn handle() -> SimOpHandle {
        SimOpHandle::new(Box::new(Self::new()))
    }
}

impl Default for AnalyzeOp {
    fn default() -> Self {
        Self::new()
    }
}

impl SimOp for AnalyzeOp {
    fn name(&self) -> &str {
        ANALYZE_STAGE
    }

    fn update_sim(&mut self, state: &mut SimulationState) -> Result<(), PipelineError> {
        let q_in = state.sim_inputs.require(ANALYZE_STAGE, KEY_Q_IN)?;
        let q_out = state.require_outputs(ANALYZE_STAGE)?.q_out;

        let analysis = state.analysis_mut();
        analysis.set_net(q_in - q_out);
        analysis.insert_note(KEY_SUMMARY, Value::String(self.summary.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim_provider::SimResult;
    use crate::sim_state::SimInputs;

    fn retrieved_state(q_in: f64, q_out: f64) -> SimulationState {
        let mut state = SimulationState::new(SimInputs::from([("Q_in", q_in)]));
        state.set_sim_outputs(SimResult {
            q_out,
            dt_measured: 0.02,
        });
        state
    }

    #[test]
    fn computes_net_and_summary() {
        let mut state = retrieved_state(100.0, 98.0);
        AnalyzeOp::new().update_sim(&mut state).unwrap();

        assert_eq!(state.analysis().net(), Some(2.0));
        assert_eq!(state.analysis().summary(), Some(DEFAULT_ANALYSIS_SUMMARY));
        assert_eq!(state.analysis().constraint_ok(), None);
    }

    #[test]
    fn custom_summary() {
        let mut state = retrieved_state(10.0, 12.0);
        AnalyzeOp::with_summary("net outflow")
            .update_sim(&mut state)
            .unwrap();

        assert_eq!(state.analysis().net(), Some(-2.0));
        assert_eq!(state.analysis().summary(), Some("net outflow"));
    }

    #[test]
    fn requires_retrieve_first() {
        let mut state = SimulationState::new(SimInputs::from([("Q_in", 100.0)]));
        assert_eq!(
            AnalyzeOp::new().update_sim(&mut state),
            Err(PipelineError::MissingField {
                stage: "analyze",
                field: "sim_outputs"
            })
        );
        assert_eq!(state.analysis().net(), None);
    }
}
