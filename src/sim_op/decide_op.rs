//! Terminal stage: turns the guardrail verdict into a decision

use crate::constants::KEY_CONSTRAINT_OK;
use crate::decision_policy::{DecisionPolicy, GuardrailPolicy};
use crate::error::PipelineError;
use crate::sim_op::{SimOp, SimOpHandle};
use crate::sim_state::SimulationState;

pub const DECIDE_STAGE: &str = "decide";

pub struct DecideOp<P = GuardrailPolicy> {
    policy: P,
}

impl DecideOp<GuardrailPolicy> {
    pub fn new() -> Self {
        Self {
            policy: GuardrailPolicy,
        }
    }
}

impl Default for DecideOp<GuardrailPolicy> {
    fn default() -> Self {
        Self::new()
    }
}

impl<P: DecisionPolicy> DecideOp<P> {
    pub fn with_policy(policy: P) -> Self {
        Self { policy }
    }
}

impl<P: DecisionPolicy + 'static> DecideOp<P> {
    pub fn handle(policy: P) -> SimOpHandle {
        SimOpHandle::new(Box::new(Self::with_policy(policy)))
    }
}

impl<P: DecisionPolicy> SimOp for DecideOp<P> {
    fn name(&self) -> &str {
        DECIDE_STAGE
    }

    fn update_sim(&mut self, state: &mut SimulationState) -> Result<(), PipelineError> {
        let constraint_ok = state.analysis().constraint_ok().ok_or(PipelineError::MissingField {
            stage: DECIDE_STAGE,
            field: KEY_CONSTRAINT_OK,
        })?;

        let decision = self.policy.decide(constraint_ok);
        state.set_decision(decision)?;

        tracing::info!(%decision, constraint_ok, "validation decision");
        Ok(())
    }
}
