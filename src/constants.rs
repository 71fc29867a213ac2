// Default rod solver settings: a 1 m rod on a 51 point grid, 2000 steps of 0.01 s
pub const DEFAULT_GRID_POINTS: usize = 51;
pub const DEFAULT_TIME_STEPS: usize = 2000;
pub const DEFAULT_ROD_LENGTH_M: f64 = 1.0;
pub const DEFAULT_DIFFUSIVITY_M2_PER_S: f64 = 1e-4;
pub const DEFAULT_TIME_STEP_S: f64 = 0.01;
pub const DEFAULT_LEFT_TEMP_K: f64 = 400.0;
pub const DEFAULT_RIGHT_TEMP_K: f64 = 300.0;
pub const DEFAULT_INITIAL_TEMP_K: f64 = 300.0;

/// Smallest grid with one interior point.
pub const MIN_GRID_POINTS: usize = 3;

/// Explicit FTCS diffusion is stable while alpha * dt / dx² stays at or below this.
pub const STABILITY_LIMIT: f64 = 0.5;

// Energy balance guardrail
pub const DEFAULT_RESIDUAL_TOLERANCE: f64 = 1e-2;

// Stand-in provider: 2% of the inflow is lost, fixed observed rise
pub const STUB_OUTFLOW_FRACTION: f64 = 0.98;
pub const STUB_MEASURED_TEMP_DELTA_K: f64 = 0.02;

pub const DEFAULT_ANALYSIS_SUMMARY: &str = "System appears energy-positive; proceed.";

// sim_inputs keys
pub const KEY_Q_IN: &str = "Q_in";
pub const KEY_MASS: &str = "m";
pub const KEY_SPECIFIC_HEAT: &str = "cp";
pub const KEY_DT: &str = "dt";
pub const KEY_TOL: &str = "tol";

// analysis keys
pub const KEY_NET: &str = "net";
pub const KEY_ENERGY_RESIDUAL: &str = "energy_residual";
pub const KEY_SUMMARY: &str = "summary";
pub const KEY_CONSTRAINT_OK: &str = "constraint_ok";

/// Analysis keys backed by computed fields; notes may not shadow them.
pub const RESERVED_ANALYSIS_KEYS: [&str; 3] = [KEY_NET, KEY_ENERGY_RESIDUAL, KEY_CONSTRAINT_OK];
