//! Errors returned by `Capsule::run`.

use crate::core::SideEffectError;
use thiserror::Error;

/// Errors that can occur while dispatching an action.
///
/// Side-effect failures never roll back the state that was already
/// published for the action.
#[derive(Debug, Error)]
pub enum CapsuleError {
    #[error("No transition found for action {action} in state {state}")]
    NoTransitionFound { action: String, state: String },

    #[error("Side effect fan-out aborted: {0}")]
    SideEffectFailure(#[source] SideEffectError),

    #[error("{} side effect(s) failed during fan-out", .0.len())]
    SideEffectFailures(Vec<SideEffectError>),

    /// Side effects were requested outside a Tokio runtime. The state was
    /// left untouched.
    #[error("Action {action} requested side effects outside a Tokio runtime")]
    NoRuntime { action: String },
}

impl CapsuleError {
    pub(crate) fn no_transition<A, S>(action: &A, state: &S) -> Self
    where
        A: std::fmt::Debug,
        S: std::fmt::Debug,
    {
        CapsuleError::NoTransitionFound {
            action: format!("{action:?}"),
            state: format!("{state:?}"),
        }
    }

    /// Side-effect errors carried by this error, if any.
    pub fn side_effect_errors(&self) -> &[SideEffectError] {
        match self {
            CapsuleError::NoTransitionFound { .. } | CapsuleError::NoRuntime { .. } => &[],
            CapsuleError::SideEffectFailure(error) => std::slice::from_ref(error),
            CapsuleError::SideEffectFailures(errors) => errors,
        }
    }
}
