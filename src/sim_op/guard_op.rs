//! Physics guardrail: checks the simplified energy balance
//!
//! ```text
//! observed  = m * cp * dT_measured
//! predicted = (Q_in - Q_out) * dt
//! residual  = observed - predicted
//! ok        = |residual| < tol
//! ```

use crate::constants::{KEY_DT, KEY_MASS, KEY_Q_IN, KEY_SPECIFIC_HEAT};
use crate::error::PipelineError;
use crate::sim_op::{SimOp, SimOpHandle};
use crate::sim_state::SimulationState;

pub const GUARD_STAGE: &str = "guard";

/// Energy terms of one guardrail evaluation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EnergyBalance {
    pub observed_j: f64,
    pub predicted_j: f64,
    pub tolerance: f64,
}

impl EnergyBalance {
    pub fn residual(&self) -> f64 {
        self.observed_j - self.predicted_j
    }

    /// NaN residuals never pass.
    pub fn holds(&self) -> bool {
        self.residual().abs() < self.tolerance
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct GuardOp;

impl GuardOp {
    pub fn new() -> Self {
        Self
    }

    pub fn handle() -> SimOpHandle {
        SimOpHandle::new(Box::new(Self::new()))
    }

    pub fn energy_balance(state: &SimulationState) -> Result<EnergyBalance, PipelineError> {
        let inputs = &state.sim_inputs;
        let m = inputs.require(GUARD_STAGE, KEY_MASS)?;
        let cp = inputs.require(GUARD_STAGE, KEY_SPECIFIC_HEAT)?;
        let dt = inputs.require(GUARD_STAGE, KEY_DT)?;
        let q_in = inputs.require(GUARD_STAGE, KEY_Q_IN)?;
        let outputs = state.require_outputs(GUARD_STAGE)?;

        Ok(EnergyBalance {
            observed_j: m * cp * outputs.dt_measured,
            predicted_j: (q_in - outputs.q_out) * dt,
            tolerance: inputs.tolerance(),
        })
    }
}

impl SimOp for GuardOp {
    fn name(&self) -> &str {
        GUARD_STAGE
    }

    fn update_sim(&mut self, state: &mut SimulationState) -> Result<(), PipelineError> {
        let balance = Self::energy_balance(state)?;
        let residual = balance.residual();
        let ok = balance.holds();

        if ok {
            tracing::debug!(residual, tolerance = balance.tolerance, "energy balance holds");
        } else {
            tracing::warn!(
                residual,
                tolerance = balance.tolerance,
                observed_j = balance.observed_j,
                predicted_j = balance.predicted_j,
                "energy residual outside tolerance"
            );
        }

        state.analysis_mut().set_guard_result(residual, ok);
        Ok(())
    }
}
