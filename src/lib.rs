pub mod constants;
pub mod error;
pub mod rod_diffusion;
pub mod sim_provider;
pub mod sim_state;
pub mod decision_policy;
pub mod pipeline;

pub mod sim_op;

pub use error::{ThermoError, ThermoResult};
pub use pipeline::{ValidationPipeline, run_from_json, run_validation};
pub use rod_diffusion::{
    RodParams, RodSolution, RodSolver, StabilityPolicy, solve_from_json, solve_heat_explicit,
};
pub use sim_state::{Decision, SimInputs, SimulationState};
