//! Builder for constructing capsules.

use crate::builder::error::BuildError;
use crate::config::CapsuleConfig;
use crate::core::{Action, Effect, State, Transition, TransitionTable};
use crate::effects::{Capsule, FanOutPolicy};
use std::sync::Arc;

/// Builder for constructing capsules with a fluent API.
///
/// Transitions are registered in order; registering the same action twice
/// keeps the later transition.
pub struct CapsuleBuilder<S, A> {
    initial: Option<S>,
    transitions: Vec<(A, Transition<S, A>)>,
    config: CapsuleConfig,
}

impl<S: State, A: Action> CapsuleBuilder<S, A> {
    /// Create a new builder.
    pub fn new() -> Self {
        Self {
            initial: None,
            transitions: Vec::new(),
            config: CapsuleConfig::default(),
        }
    }

    /// Set the initial state (required).
    pub fn initial(mut self, state: S) -> Self {
        self.initial = Some(state);
        self
    }

    /// Register the transition run when `action` is dispatched.
    pub fn on<F>(mut self, action: A, transition: F) -> Self
    where
        F: Fn(&S, &A) -> Effect<S, A> + Send + Sync + 'static,
    {
        let transition: Transition<S, A> = Arc::new(transition);
        self.transitions.push((action, transition));
        self
    }

    /// Register a pre-built transition.
    pub fn add_transition(mut self, action: A, transition: Transition<S, A>) -> Self {
        self.transitions.push((action, transition));
        self
    }

    /// Register several transitions at once.
    pub fn transitions<I>(mut self, transitions: I) -> Self
    where
        I: IntoIterator<Item = (A, Transition<S, A>)>,
    {
        self.transitions.extend(transitions);
        self
    }

    /// Replace the whole configuration.
    pub fn config(mut self, config: CapsuleConfig) -> Self {
        self.config = config;
        self
    }

    /// Set the side-effect failure policy.
    pub fn fan_out(mut self, policy: FanOutPolicy) -> Self {
        self.config.fan_out = policy;
        self
    }

    /// Build the capsule.
    /// Returns an error if required fields are missing.
    pub fn build(self) -> Result<Capsule<S, A>, BuildError> {
        let initial = self.initial.ok_or(BuildError::MissingInitialState)?;

        if self.transitions.is_empty() {
            return Err(BuildError::NoTransitions);
        }

        let table = TransitionTable::from_pairs(self.transitions);
        Ok(Capsule::with_config(initial, table, self.config))
    }
}

impl<S: State, A: Action> Default for CapsuleBuilder<S, A> {
    fn default() -> Self {
        Self::new()
    }
}
