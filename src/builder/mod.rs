//! Builder API for ergonomic capsule construction.
//!
//! This module provides a fluent builder, a macro, and small transition
//! helpers for assembling transition tables with minimal boilerplate.

pub mod capsule;
pub mod error;
pub mod macros;

pub use capsule::CapsuleBuilder;
pub use error::BuildError;

use crate::core::{transition, Action, Effect, State, Transition};

/// Create a transition that always moves to `target`.
///
/// # Example
///
/// ```
/// use capsule::builder::constant;
///
/// let reset = constant::<u32, &'static str>(0);
/// assert_eq!(*reset(&42, &"reset").state(), 0);
/// ```
pub fn constant<S, A>(target: S) -> Transition<S, A>
where
    S: State,
    A: Action,
{
    transition(move |_: &S, _: &A| Effect::pure(target.clone()))
}

/// Create a transition that only applies when `guard` holds.
///
/// When the guard rejects the current state, the transition returns the
/// state unchanged as a pure effect.
///
/// # Example
///
/// ```
/// use capsule::builder::guarded;
/// use capsule::core::Effect;
///
/// let withdraw = guarded::<u32, &'static str, _, _>(
///     |balance| *balance >= 10,
///     |balance, _| Effect::pure(balance - 10),
/// );
///
/// assert_eq!(*withdraw(&25, &"withdraw").state(), 15);
/// assert_eq!(*withdraw(&5, &"withdraw").state(), 5);
/// ```
pub fn guarded<S, A, G, F>(guard: G, apply: F) -> Transition<S, A>
where
    S: State,
    A: Action,
    G: Fn(&S) -> bool + Send + Sync + 'static,
    F: Fn(&S, &A) -> Effect<S, A> + Send + Sync + 'static,
{
    transition(move |state: &S, action: &A| {
        if guard(state) {
            apply(state, action)
        } else {
            Effect::pure(state.clone())
        }
    })
}
