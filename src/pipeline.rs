//! Fixed-order validation pipeline with per-stage timing.

use std::time::{Duration, Instant};

use crate::decision_policy::GuardrailPolicy;
use crate::error::{PipelineError, ThermoResult};
use crate::sim_op::analyze_op::ANALYZE_STAGE;
use crate::sim_op::decide_op::DECIDE_STAGE;
use crate::sim_op::guard_op::GUARD_STAGE;
use crate::sim_op::retrieve_op::RETRIEVE_STAGE;
use crate::sim_op::{AnalyzeOp, DecideOp, GuardOp, RetrieveOp, SimOp, SimOpHandle};
use crate::sim_provider::{LossyStubProvider, SimResultProvider};
use crate::sim_state::{SimInputs, SimulationState};

/// The only stage order a pipeline accepts.
pub const STAGE_ORDER: [&str; 4] = [RETRIEVE_STAGE, ANALYZE_STAGE, GUARD_STAGE, DECIDE_STAGE];

#[derive(Debug, Clone, PartialEq)]
pub struct StageTiming {
    pub stage_name: String,
    pub total_time: Duration,
    pub call_count: u32,
}

impl StageTiming {
    pub fn new(stage_name: String) -> Self {
        Self {
            stage_name,
            total_time: Duration::ZERO,
            call_count: 0,
        }
    }

    pub fn avg_time(&self) -> Duration {
        if self.call_count > 0 {
            self.total_time / self.call_count
        } else {
            Duration::ZERO
        }
    }
}

/// Runs every stage once, in order, over one [`SimulationState`].
///
/// The standard pipeline is retrieve → analyze → guard → decide. Stages that
/// find their inputs missing abort the run; nothing is retried here, a
/// `Decision::Retry` is for the caller to act on.
pub struct ValidationPipeline {
    ops: Vec<Box<dyn SimOp>>,
    stage_timings: Vec<StageTiming>,
}

impl ValidationPipeline {
    /// Standard four-stage pipeline around `provider`.
    pub fn new<P: SimResultProvider + 'static>(provider: P) -> Self {
        Self::from_ops(vec![
            RetrieveOp::handle(provider),
            AnalyzeOp::handle(),
            GuardOp::handle(),
            DecideOp::handle(GuardrailPolicy),
        ])
    }

    /// Custom stage implementations. Their names must match [`STAGE_ORDER`]
    /// exactly: reordered, skipped or repeated stages are refused here
    /// rather than discovered mid-run.
    pub fn with_ops(ops: Vec<SimOpHandle>) -> Result<Self, PipelineError> {
        let names: Vec<&str> = ops.iter().map(|handle| handle.op.name()).collect();
        if names != STAGE_ORDER {
            return Err(PipelineError::InvalidStageOrder {
                found: names.into_iter().map(str::to_string).collect(),
            });
        }
        Ok(Self::from_ops(ops))
    }

    fn from_ops(ops: Vec<SimOpHandle>) -> Self {
        let ops: Vec<Box<dyn SimOp>> = ops.into_iter().map(|handle| handle.op).collect();
        let stage_timings = ops
            .iter()
            .map(|op| StageTiming::new(op.name().to_string()))
            .collect();
        Self { ops, stage_timings }
    }

    pub fn stage_names(&self) -> Vec<&str> {
        self.ops.iter().map(|op| op.name()).collect()
    }

    pub fn timings(&self) -> &[StageTiming] {
        &self.stage_timings
    }

    /// Runs the stages and hands back the state with its decision set.
    pub fn run(&mut self, mut state: SimulationState) -> Result<SimulationState, PipelineError> {
        for (i, op) in self.ops.iter_mut().enumerate() {
            tracing::debug!(stage = op.name(), "stage starting");

            let start = Instant::now();
            let result = op.update_sim(&mut state);
            let timing = &mut self.stage_timings[i];
            timing.total_time += start.elapsed();
            timing.call_count += 1;

            if let Err(err) = result {
                tracing::debug!(stage = op.name(), error = %err, "stage failed");
                return Err(err);
            }
        }

        self.log_timing_report();

        if state.decision().is_none() {
            return Err(PipelineError::Undecided);
        }
        Ok(state)
    }

    fn log_timing_report(&self) {
        for timing in &self.stage_timings {
            tracing::debug!(
                stage = %timing.stage_name,
                calls = timing.call_count,
                avg_us = timing.avg_time().as_micros() as u64,
                "stage timing"
            );
        }
    }
}

impl Default for ValidationPipeline {
    fn default() -> Self {
        Self::new(LossyStubProvider::default())
    }
}

/// Runs the standard pipeline with the stand-in provider.
pub fn run_validation(state: SimulationState) -> Result<SimulationState, PipelineError> {
    ValidationPipeline::default().run(state)
}

/// Parses a JSON object of inputs and runs the standard pipeline over it.
pub fn run_from_json(json: &str) -> ThermoResult<SimulationState> {
    let inputs = SimInputs::from_json_str(json)?;
    Ok(run_validation(SimulationState::new(inputs))?)
}
