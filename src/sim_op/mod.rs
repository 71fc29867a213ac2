// Validation pipeline stages, in the order the standard pipeline runs them
pub mod retrieve_op;
pub mod analyze_op;
pub mod guard_op;
pub mod decide_op;

// Re-export the stages for easier access
pub use retrieve_op::RetrieveOp;
pub use analyze_op::AnalyzeOp;
pub use guard_op::GuardOp;
pub use decide_op::DecideOp;

use crate::error::PipelineError;
use crate::sim_state::SimulationState;

pub trait SimOp {
    /// The name of this stage (for logging and timing)
    fn name(&self) -> &str;

    /// Reads what earlier stages wrote and writes this stage's fields.
    ///
    /// Must fail with `PipelineError::MissingField` rather than fall back to a
    /// default when something it needs is absent.
    fn update_sim(&mut self, state: &mut SimulationState) -> Result<(), PipelineError>;
}

pub struct SimOpHandle {
    pub op: Box<dyn SimOp>,
}

impl SimOpHandle {
    /// Create a new SimOpHandle with the given stage
    pub fn new(op: Box<dyn SimOp>) -> Self {
        SimOpHandle { op }
    }
}
