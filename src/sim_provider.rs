//! Boundary to whatever produces simulation results.
//!
//! A provider maps a parameter set to `{Q_out, dT_measured}`. Implementations
//! must be pure: the same parameters always give the same result, so the
//! guardrail stays reproducible. Any `Fn(&SimParams) -> Result<SimResult, ProviderError>`
//! is a provider, which makes swapping in a test double a one-liner.

use serde::{Deserialize, Serialize};

use crate::constants::{
    KEY_DT, KEY_MASS, KEY_Q_IN, KEY_SPECIFIC_HEAT, KEY_TOL, STUB_MEASURED_TEMP_DELTA_K,
    STUB_OUTFLOW_FRACTION,
};
use crate::error::ProviderError;
use crate::sim_state::SimInputs;

/// Parameters handed to a provider. Only the inflow rate is mandatory.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SimParams {
    #[serde(rename = "Q_in")]
    pub q_in: f64,
    pub m: Option<f64>,
    pub cp: Option<f64>,
    pub dt: Option<f64>,
    pub tol: Option<f64>,
}

impl SimParams {
    pub fn from_inputs(inputs: &SimInputs) -> Result<Self, ProviderError> {
        let q_in = inputs
            .get(KEY_Q_IN)
            .ok_or(ProviderError::MissingParameter { name: KEY_Q_IN })?;

        Ok(Self {
            q_in,
            m: inputs.get(KEY_MASS),
            cp: inputs.get(KEY_SPECIFIC_HEAT),
            dt: inputs.get(KEY_DT),
            tol: inputs.get(KEY_TOL),
        })
    }
}

/// Outflow rate and observed temperature rise.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SimResult {
    #[serde(rename = "Q_out")]
    pub q_out: f64,
    #[serde(rename = "dT_measured")]
    pub dt_measured: f64,
}

pub trait SimResultProvider {
    fn name(&self) -> &str {
        "SimResultProvider"
    }

    fn query(&self, params: &SimParams) -> Result<SimResult, ProviderError>;
}

impl<F> SimResultProvider for F
where
    F: Fn(&SimParams) -> Result<SimResult, ProviderError>,
{
    fn query(&self, params: &SimParams) -> Result<SimResult, ProviderError> {
        self(params)
    }
}

/// Stand-in for a real backend: a fixed fraction of the inflow comes out and
/// the observed temperature rise is a constant.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LossyStubProvider {
    pub outflow_fraction: f64,
    pub measured_delta_k: f64,
}

impl Default for LossyStubProvider {
    fn default() -> Self {
        Self {
            outflow_fraction: STUB_OUTFLOW_FRACTION,
            measured_delta_k: STUB_MEASURED_TEMP_DELTA_K,
        }
    }
}

impl LossyStubProvider {
    pub fn new(outflow_fraction: f64, measured_delta_k: f64) -> Self {
        Self {
            outflow_fraction,
            measured_delta_k,
        }
    }
}

impl SimResultProvider for LossyStubProvider {
    fn name(&self) -> &str {
        "LossyStubProvider"
    }

    fn query(&self, params: &SimParams) -> Result<SimResult, ProviderError> {
        Ok(SimResult {
            q_out: params.q_in * self.outflow_fraction,
            dt_measured: self.measured_delta_k,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stub_loses_two_percent() {
        let params = SimParams::from_inputs(&SimInputs::from([("Q_in", 100.0)])).unwrap();
        let result = LossyStubProvider::default().query(&params).unwrap();
        assert_eq!(result.q_out, 98.0);
        assert_eq!(result.dt_measured, 0.02);
    }

    #[test]
    fn stub_is_pure() {
        let provider = LossyStubProvider::default();
        let params = SimParams::from_inputs(&SimInputs::from([("Q_in", 37.5), ("m", 2.0)])).unwrap();
        let a = provider.query(&params).unwrap();
        let b = provider.query(&params).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn params_pick_up_optional_fields() {
        let inputs = SimInputs::from([("Q_in", 1.0), ("cp", 4.0), ("tol", 0.5)]);
        let params = SimParams::from_inputs(&inputs).unwrap();
        assert_eq!(params.cp, Some(4.0));
        assert_eq!(params.tol, Some(0.5));
        assert_eq!(params.m, None);
        assert_eq!(params.dt, None);
    }

    #[test]
    fn params_require_inflow() {
        let inputs = SimInputs::from([("m", 10.0)]);
        assert_eq!(
            SimParams::from_inputs(&inputs),
            Err(ProviderError::MissingParameter { name: "Q_in" })
        );
    }

    #[test]
    fn closures_are_providers() {
        let provider = |p: &SimParams| -> Result<SimResult, ProviderError> {
            Ok(SimResult {
                q_out: p.q_in - 1.0,
                dt_measured: 0.0,
            })
        };
        let params = SimParams::from_inputs(&SimInputs::from([("Q_in", 5.0)])).unwrap();
        assert_eq!(provider.query(&params).unwrap().q_out, 4.0);
    }

    #[test]
    fn result_uses_data_model_keys() {
        let json = serde_json::to_value(SimResult {
            q_out: 98.0,
            dt_measured: 0.02,
        })
        .unwrap();
        assert_eq!(json["Q_out"], 98.0);
        assert_eq!(json["dT_measured"], 0.02);
    }
}
