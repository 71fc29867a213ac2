use crate::sim_state::Decision;

/// Maps the guardrail verdict to a terminal outcome.
///
/// Kept apart from the guard so a richer policy can replace it without
/// touching the energy balance.
pub trait DecisionPolicy {
    fn decide(&self, constraint_ok: bool) -> Decision;
}

/// Accept when the energy balance holds, otherwise ask the caller to retry.
/// Never yields `Decision::Reject`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GuardrailPolicy;

impl DecisionPolicy for GuardrailPolicy {
    fn decide(&self, constraint_ok: bool) -> Decision {
        if constraint_ok {
            Decision::Accept
        } else {
            Decision::Retry
        }
    }
}

impl<F> DecisionPolicy for F
where
    F: Fn(bool) -> Decision,
{
    fn decide(&self, constraint_ok: bool) -> Decision {
        self(constraint_ok)
    }
}
