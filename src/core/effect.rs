//! Effect values returned by transitions.
//!
//! A transition never performs work itself. It describes the next state and,
//! optionally, the side effects the capsule should launch once that state is
//! published.

use super::state::{Action, State};
use futures::future::BoxFuture;
use futures::FutureExt;
use std::fmt;
use std::future::Future;
use std::sync::Arc;

/// Boxed error returned by failing side effects.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Future produced by invoking a side effect.
pub type SideEffectFuture = BoxFuture<'static, Result<(), BoxError>>;

type SideEffectFn<S, A> = Arc<dyn Fn(S, A) -> SideEffectFuture + Send + Sync>;

/// Errors reported by a single side effect of a fan-out.
#[derive(Debug, thiserror::Error)]
pub enum SideEffectError {
    #[error("Side effect failed: {0}")]
    Failed(#[source] BoxError),

    #[error("Side effect panicked: {0}")]
    Panicked(String),

    /// The task was cancelled from outside the fan-out, e.g. by the tokio
    /// runtime shutting down while it was still running.
    #[error("Side effect was cancelled before completing")]
    Cancelled,
}

/// Fire-and-forget work requested by an impure transition.
///
/// Side effects receive the state as it was *before* the transition ran,
/// together with the dispatched action. They cannot return a new state; the
/// only way back into the capsule is dispatching another action.
///
/// # Example
///
/// ```rust
/// use capsule::core::SideEffect;
///
/// let notify: SideEffect<u32, &'static str> = SideEffect::new(|count, action| async move {
///     println!("{action} dispatched at count {count}");
///     Ok(())
/// });
/// ```
pub struct SideEffect<S, A> {
    run: SideEffectFn<S, A>,
}

impl<S: State, A: Action> SideEffect<S, A> {
    /// Create a side effect from an async closure.
    pub fn new<F, Fut>(effect: F) -> Self
    where
        F: Fn(S, A) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<(), BoxError>> + Send + 'static,
    {
        Self {
            run: Arc::new(move |state, action| effect(state, action).boxed()),
        }
    }

    /// Create a side effect from a synchronous closure.
    ///
    /// The closure runs on the side-effect task, not on the dispatching
    /// caller.
    pub fn from_fn<F>(effect: F) -> Self
    where
        F: Fn(S, A) -> Result<(), BoxError> + Send + Sync + 'static,
    {
        let effect = Arc::new(effect);
        Self::new(move |state, action| {
            let effect = Arc::clone(&effect);
            async move { (*effect)(state, action) }
        })
    }

    /// Start the side effect with its own copy of state and action.
    pub fn invoke(&self, state: S, action: A) -> SideEffectFuture {
        (self.run)(state, action)
    }
}

impl<S, A> Clone for SideEffect<S, A> {
    fn clone(&self) -> Self {
        Self {
            run: Arc::clone(&self.run),
        }
    }
}

impl<S, A> fmt::Debug for SideEffect<S, A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SideEffect")
    }
}

/// Result of evaluating one transition.
///
/// # Example
///
/// ```rust
/// use capsule::core::{Effect, SideEffect};
///
/// let log: SideEffect<u32, &'static str> = SideEffect::from_fn(|_, _| Ok(()));
///
/// let pure: Effect<u32, &'static str> = Effect::pure(1);
/// assert!(pure.is_pure());
///
/// let impure = Effect::pure(2).also(log.clone()).and(log);
/// assert_eq!(impure.side_effects().len(), 2);
/// assert_eq!(*impure.state(), 2);
/// ```
pub enum Effect<S, A> {
    /// State changes, no side effects.
    Pure(S),

    /// State changes and side effects are requested, in declaration order.
    Impure {
        state: S,
        side_effects: Vec<SideEffect<S, A>>,
    },
}

impl<S: State, A: Action> Effect<S, A> {
    /// Move to `state` without side effects.
    pub fn pure(state: S) -> Self {
        Effect::Pure(state)
    }

    /// Move to `state` and request `side_effects`.
    pub fn impure(state: S, side_effects: Vec<SideEffect<S, A>>) -> Self {
        Effect::Impure {
            state,
            side_effects,
        }
    }

    /// Attach a side effect, turning a pure effect into an impure one.
    pub fn also(self, side_effect: SideEffect<S, A>) -> Self {
        match self {
            Effect::Pure(state) => Effect::Impure {
                state,
                side_effects: vec![side_effect],
            },
            Effect::Impure {
                state,
                mut side_effects,
            } => {
                side_effects.push(side_effect);
                Effect::Impure {
                    state,
                    side_effects,
                }
            }
        }
    }

    /// Append another side effect. Reads naturally after [`Effect::also`].
    pub fn and(self, side_effect: SideEffect<S, A>) -> Self {
        self.also(side_effect)
    }

    /// Append several side effects at once.
    pub fn with_effects<I>(self, effects: I) -> Self
    where
        I: IntoIterator<Item = SideEffect<S, A>>,
    {
        effects.into_iter().fold(self, Effect::also)
    }

    /// The state this effect moves the capsule to.
    pub fn state(&self) -> &S {
        match self {
            Effect::Pure(state) => state,
            Effect::Impure { state, .. } => state,
        }
    }

    /// Requested side effects; empty for pure effects.
    pub fn side_effects(&self) -> &[SideEffect<S, A>] {
        match self {
            Effect::Pure(_) => &[],
            Effect::Impure { side_effects, .. } => side_effects,
        }
    }

    pub fn is_pure(&self) -> bool {
        matches!(self, Effect::Pure(_))
    }

    /// Split into next state and side effects.
    pub fn into_parts(self) -> (S, Vec<SideEffect<S, A>>) {
        match self {
            Effect::Pure(state) => (state, Vec::new()),
            Effect::Impure {
                state,
                side_effects,
            } => (state, side_effects),
        }
    }
}

impl<S: Clone, A> Clone for Effect<S, A> {
    fn clone(&self) -> Self {
        match self {
            Effect::Pure(state) => Effect::Pure(state.clone()),
            Effect::Impure {
                state,
                side_effects,
            } => Effect::Impure {
                state: state.clone(),
                side_effects: side_effects.clone(),
            },
        }
    }
}

impl<S: fmt::Debug, A> fmt::Debug for Effect<S, A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Effect::Pure(state) => f.debug_tuple("Pure").field(state).finish(),
            Effect::Impure {
                state,
                side_effects,
            } => f
                .debug_struct("Impure")
                .field("state", state)
                .field("side_effects", &side_effects.len())
                .finish(),
        }
    }
}
