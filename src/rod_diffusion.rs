//! Explicit finite-difference integrator for heat diffusion along a 1-D rod.
//!
//! Solves `u_t = alpha * u_xx` on `[0, L]` with fixed (Dirichlet) end
//! temperatures using forward Euler in time and a centred second difference
//! in space:
//!
//! ```text
//! next[i] = u[i] + r * (u[i-1] - 2 * u[i] + u[i+1]),   r = alpha * dt / dx²
//! ```
//!
//! The scheme is only stable for `r <= 0.5`. What happens above that bound is
//! governed by [`StabilityPolicy`].

use serde::{Deserialize, Serialize};

use crate::constants::{
    DEFAULT_DIFFUSIVITY_M2_PER_S, DEFAULT_GRID_POINTS, DEFAULT_INITIAL_TEMP_K,
    DEFAULT_LEFT_TEMP_K, DEFAULT_RIGHT_TEMP_K, DEFAULT_ROD_LENGTH_M, DEFAULT_TIME_STEP_S,
    DEFAULT_TIME_STEPS, MIN_GRID_POINTS, STABILITY_LIMIT,
};
use crate::error::{ConfigError, SolverError, ThermoResult};

/// Rod geometry, material and boundary settings.
///
/// Deserializes from a partial JSON object; absent fields keep their defaults.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RodParams {
    /// Number of grid points, boundaries included
    pub nx: usize,
    /// Number of explicit time steps
    pub nt: usize,
    #[serde(alias = "L")]
    pub length_m: f64,
    pub alpha: f64,
    pub dt: f64,
    #[serde(alias = "T_left")]
    pub t_left: f64,
    #[serde(alias = "T_right")]
    pub t_right: f64,
    #[serde(alias = "T_init")]
    pub t_init: f64,
}

impl Default for RodParams {
    fn default() -> Self {
        Self {
            nx: DEFAULT_GRID_POINTS,
            nt: DEFAULT_TIME_STEPS,
            length_m: DEFAULT_ROD_LENGTH_M,
            alpha: DEFAULT_DIFFUSIVITY_M2_PER_S,
            dt: DEFAULT_TIME_STEP_S,
            t_left: DEFAULT_LEFT_TEMP_K,
            t_right: DEFAULT_RIGHT_TEMP_K,
            t_init: DEFAULT_INITIAL_TEMP_K,
        }
    }
}

impl RodParams {
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Grid spacing `L / (nx - 1)`.
    pub fn dx(&self) -> f64 {
        self.length_m / (self.nx.saturating_sub(1)) as f64
    }

    /// Dimensionless stability number `alpha * dt / dx²`.
    pub fn stability_number(&self) -> f64 {
        let dx = self.dx();
        self.alpha * self.dt / (dx * dx)
    }

    /// Checks the domain constraints. Does not look at stability.
    pub fn validate(&self) -> Result<(), SolverError> {
        if self.nx < MIN_GRID_POINTS {
            return Err(SolverError::GridTooSmall { nx: self.nx });
        }

        for (name, value) in [
            ("L", self.length_m),
            ("alpha", self.alpha),
            ("dt", self.dt),
        ] {
            if value.is_infinite() {
                return Err(SolverError::NonFinite { name });
            }
            // written negated so NaN is rejected too
            if !(value > 0.0) {
                return Err(SolverError::NonPositive { name, value });
            }
        }

        for (name, value) in [
            ("T_left", self.t_left),
            ("T_right", self.t_right),
            ("T_init", self.t_init),
        ] {
            if !value.is_finite() {
                return Err(SolverError::NonFinite { name });
            }
        }

        Ok(())
    }
}

/// What to do when the parameters give `r > 0.5`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StabilityPolicy {
    /// Refuse to build the solver.
    #[default]
    Reject,
    /// Log a warning, run anyway and flag the solution as unstable.
    Warn,
}

/// Temperatures over the grid, with the end points pinned.
///
/// Holds a second buffer for the next step so stepping never allocates.
#[derive(Debug, Clone, PartialEq)]
pub struct TemperatureField {
    values: Vec<f64>,
    next: Vec<f64>,
    t_left: f64,
    t_right: f64,
}

impl TemperatureField {
    /// Uniform `t_init` everywhere, then the ends overwritten with the boundary values.
    pub fn new(nx: usize, t_init: f64, t_left: f64, t_right: f64) -> Self {
        let mut field = Self {
            values: vec![t_init; nx],
            next: vec![t_init; nx],
            t_left,
            t_right,
        };
        field.apply_boundaries();
        field
    }

    fn apply_boundaries(&mut self) {
        if let Some(first) = self.values.first_mut() {
            *first = self.t_left;
        }
        if let Some(last) = self.values.last_mut() {
            *last = self.t_right;
        }
    }

    /// Advances one explicit Euler step with stability number `r`.
    pub fn step(&mut self, r: f64) {
        let n = self.values.len();
        if n < MIN_GRID_POINTS {
            return;
        }

        for (i, w) in self.values.windows(3).enumerate() {
            self.next[i + 1] = w[1] + r * (w[0] - 2.0 * w[1] + w[2]);
        }
        // clamped, never derived from the stencil
        self.next[0] = self.t_left;
        self.next[n - 1] = self.t_right;

        std::mem::swap(&mut self.values, &mut self.next);
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn into_values(self) -> Vec<f64> {
        self.values
    }
}

/// Final state of a solver run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RodSolution {
    pub temperatures: Vec<f64>,
    pub stability_number: f64,
    pub dx: f64,
    pub steps: usize,
    /// False only when the run was allowed through under [`StabilityPolicy::Warn`].
    pub stable: bool,
}

/// Validated solver for one parameter set.
#[derive(Debug, Clone)]
pub struct RodSolver {
    params: RodParams,
    dx: f64,
    r: f64,
}

impl RodSolver {
    pub fn new(params: RodParams) -> Result<Self, SolverError> {
        Self::with_policy(params, StabilityPolicy::default())
    }

    pub fn with_policy(params: RodParams, policy: StabilityPolicy) -> Result<Self, SolverError> {
        params.validate()?;

        let dx = params.dx();
        let r = params.stability_number();

        if r > STABILITY_LIMIT {
            match policy {
                StabilityPolicy::Reject => return Err(SolverError::Unstable { r }),
                StabilityPolicy::Warn => tracing::warn!(
                    r,
                    limit = STABILITY_LIMIT,
                    "explicit diffusion step is unstable, results may oscillate"
                ),
            }
        }

        Ok(Self { params, dx, r })
    }

    pub fn stability_number(&self) -> f64 {
        self.r
    }

    pub fn is_stable(&self) -> bool {
        self.r <= STABILITY_LIMIT
    }

    pub fn initial_field(&self) -> TemperatureField {
        TemperatureField::new(
            self.params.nx,
            self.params.t_init,
            self.params.t_left,
            self.params.t_right,
        )
    }

    pub fn solve(&self) -> RodSolution {
        self.solve_with(|_, _| {})
    }

    /// Runs all `nt` steps, calling `observe` with the initial field (step 0)
    /// and again after every step.
    pub fn solve_with<F>(&self, mut observe: F) -> RodSolution
    where
        F: FnMut(usize, &TemperatureField),
    {
        let mut field = self.initial_field();
        observe(0, &field);

        for step in 1..=self.params.nt {
            field.step(self.r);
            observe(step, &field);
        }

        tracing::debug!(
            nx = self.params.nx,
            nt = self.params.nt,
            r = self.r,
            "rod diffusion solve complete"
        );

        RodSolution {
            temperatures: field.into_values(),
            stability_number: self.r,
            dx: self.dx,
            steps: self.params.nt,
            stable: self.is_stable(),
        }
    }
}

/// Solves with the default (rejecting) stability policy and returns the final temperatures.
pub fn solve_heat_explicit(params: &RodParams) -> Result<Vec<f64>, SolverError> {
    Ok(RodSolver::new(*params)?.solve().temperatures)
}

/// Parses rod parameters from JSON and runs them to completion.
///
/// Bad JSON and out-of-domain parameters surface as configuration errors;
/// `r > 0.5` under [`StabilityPolicy::Reject`] surfaces as a stability error.
pub fn solve_from_json(json: &str, policy: StabilityPolicy) -> ThermoResult<RodSolution> {
    let params = RodParams::from_json_str(json)?;
    Ok(RodSolver::with_policy(params, policy)?.solve())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn params(nx: usize, nt: usize) -> RodParams {
        RodParams {
            nx,
            nt,
            ..RodParams::default()
        }
    }

    #[test]
    fn default_params_are_stable() {
        let p = RodParams::default();
        assert_abs_diff_eq!(p.dx(), 0.02, epsilon = 1e-15);
        assert_abs_diff_eq!(p.stability_number(), 0.0025, epsilon = 1e-12);

        let solution = RodSolver::new(p).unwrap().solve();
        assert_eq!(solution.temperatures.len(), 51);
        assert_eq!(solution.steps, 2000);
        assert!(solution.stable);
        assert_eq!(solution.temperatures[0], 400.0);
        assert_eq!(solution.temperatures[50], 300.0);
        // heat has started moving in from the hot end
        assert!(solution.temperatures[1] > 300.0);
        assert!(solution.temperatures[1] < 400.0);
    }

    #[test]
    fn zero_steps_returns_initial_field() {
        let out = solve_heat_explicit(&params(6, 0)).unwrap();
        assert_eq!(out, vec![400.0, 300.0, 300.0, 300.0, 300.0, 300.0]);
    }

    #[test]
    fn minimum_grid_single_step() {
        let p = params(3, 1);
        let r = p.stability_number();
        let out = solve_heat_explicit(&p).unwrap();
        assert_eq!(out.len(), 3);
        assert_eq!(out[0], 400.0);
        assert_eq!(out[2], 300.0);
        assert_abs_diff_eq!(out[1], 300.0 + r * 100.0, epsilon = 1e-12);
    }

    #[test]
    fn grid_too_small_is_rejected() {
        assert_eq!(
            RodSolver::new(params(2, 10)).unwrap_err(),
            SolverError::GridTooSmall { nx: 2 }
        );
    }

    #[test]
    fn non_positive_parameters_are_rejected() {
        let bad_alpha = RodParams {
            alpha: 0.0,
            ..RodParams::default()
        };
        assert!(matches!(
            RodSolver::new(bad_alpha),
            Err(SolverError::NonPositive { name: "alpha", .. })
        ));

        let bad_length = RodParams {
            length_m: -1.0,
            ..RodParams::default()
        };
        assert!(matches!(
            RodSolver::new(bad_length),
            Err(SolverError::NonPositive { name: "L", .. })
        ));

        let nan_dt = RodParams {
            dt: f64::NAN,
            ..RodParams::default()
        };
        assert!(matches!(
            RodSolver::new(nan_dt),
            Err(SolverError::NonPositive { name: "dt", .. })
        ));
    }

    #[test]
    fn non_finite_temperatures_are_rejected() {
        let p = RodParams {
            t_right: f64::INFINITY,
            ..RodParams::default()
        };
        assert_eq!(
            RodSolver::new(p).unwrap_err(),
            SolverError::NonFinite { name: "T_right" }
        );
    }

    #[test]
    fn unstable_parameters_rejected_by_default() {
        // dx = 0.1, r = 1.0
        let p = RodParams {
            nx: 11,
            alpha: 1.0,
            dt: 0.01,
            ..RodParams::default()
        };
        match RodSolver::new(p) {
            Err(SolverError::Unstable { r }) => assert_abs_diff_eq!(r, 1.0, epsilon = 1e-9),
            other => panic!("expected instability, got {other:?}"),
        }
    }

    #[test]
    fn unstable_parameters_flagged_under_warn_policy() {
        let p = RodParams {
            nx: 11,
            nt: 5,
            alpha: 1.0,
            dt: 0.01,
            ..RodParams::default()
        };
        let solver = RodSolver::with_policy(p, StabilityPolicy::Warn).unwrap();
        assert!(!solver.is_stable());

        let solution = solver.solve();
        assert!(!solution.stable);
        assert_eq!(solution.temperatures[0], 400.0);
        assert_eq!(solution.temperatures[10], 300.0);
    }

    #[test]
    fn stability_limit_itself_is_accepted() {
        // dx = 0.5, r = 0.5 exactly
        let p = RodParams {
            nx: 3,
            alpha: 1.0,
            dt: 0.125,
            ..RodParams::default()
        };
        let solver = RodSolver::new(p).unwrap();
        assert_eq!(solver.stability_number(), 0.5);
        assert!(solver.is_stable());
    }

    #[test]
    fn converges_to_linear_steady_state() {
        // r = 0.4, simulated time 8 s against a diffusion time of 1 s
        let p = RodParams {
            nx: 11,
            nt: 2000,
            length_m: 1.0,
            alpha: 1.0,
            dt: 0.004,
            ..RodParams::default()
        };
        let out = solve_heat_explicit(&p).unwrap();
        for (i, t) in out.iter().enumerate() {
            let expected = 400.0 - 100.0 * i as f64 / 10.0;
            assert_abs_diff_eq!(*t, expected, epsilon = 1e-6);
        }
    }

    #[test]
    fn observer_sees_every_step() {
        let solver = RodSolver::new(params(5, 7)).unwrap();
        let mut seen = Vec::new();
        let solution = solver.solve_with(|step, field| {
            assert_eq!(field.len(), 5);
            seen.push(step);
        });
        assert_eq!(seen, (0..=7).collect::<Vec<_>>());
        assert_eq!(solution.steps, 7);
    }

    #[test]
    fn params_from_partial_json() {
        let p = RodParams::from_json_str(r#"{"nx": 21, "L": 2.0, "T_left": 350.0}"#).unwrap();
        assert_eq!(p.nx, 21);
        assert_eq!(p.length_m, 2.0);
        assert_eq!(p.t_left, 350.0);
        assert_eq!(p.nt, DEFAULT_TIME_STEPS);
        assert_eq!(p.t_right, DEFAULT_RIGHT_TEMP_K);

        assert!(RodParams::from_json_str(r#"{"nx": "many"}"#).is_err());
    }

    #[test]
    fn stability_policy_serializes_lowercase() {
        assert_eq!(
            serde_json::to_string(&StabilityPolicy::Warn).unwrap(),
            "\"warn\""
        );
        let policy: StabilityPolicy = serde_json::from_str("\"reject\"").unwrap();
        assert_eq!(policy, StabilityPolicy::Reject);
    }
}
