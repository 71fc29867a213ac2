//! Retrieve stage: asks the provider for `Q_out` and `dT_measured`

use crate::constants::KEY_Q_IN;
use crate::error::PipelineError;
use crate::sim_op::{SimOp, SimOpHandle};
use crate::sim_provider::{LossyStubProvider, SimParams, SimResultProvider};
use crate::sim_state::SimulationState;

pub const RETRIEVE_STAGE: &str = "retrieve";

pub struct RetrieveOp<P> {
    provider: P,
}

impl<P: SimResultProvider> RetrieveOp<P> {
    pub fn new(provider: P) -> Self {
        Self { provider }
    }
}

impl<P: SimResultProvider + 'static> RetrieveOp<P> {
    pub fn handle(provider: P) -> SimOpHandle {
        SimOpHandle::new(Box::new(Self::new(provider)))
    }
}

impl Default for RetrieveOp<LossyStubProvider> {
    fn default() -> Self {
        Self::new(LossyStubProvider::default())
    }
}

impl<P: SimResultProvider> SimOp for RetrieveOp<P> {
    fn name(&self) -> &str {
        RETRIEVE_STAGE
    }

    fn update_sim(&mut self, state: &mut SimulationState) -> Result<(), PipelineError> {
        state.sim_inputs.require(RETRIEVE_STAGE, KEY_Q_IN)?;
        let params = SimParams::from_inputs(&state.sim_inputs)?;
        let result = self.provider.query(&params)?;

        tracing::debug!(
            provider = self.provider.name(),
            q_out = result.q_out,
            dt_measured = result.dt_measured,
            "retrieved simulation results"
        );

        state.set_sim_outputs(result);
        Ok(())
    }
}
