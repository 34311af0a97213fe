//! Immutable action-keyed transition table.

use super::effect::Effect;
use super::state::{Action, State};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// Pure function computing the next effect from the current state and the
/// dispatched action.
pub type Transition<S, A> = Arc<dyn Fn(&S, &A) -> Effect<S, A> + Send + Sync>;

/// Wrap a closure as a [`Transition`].
///
/// # Example
///
/// ```rust
/// use capsule::core::{transition, Effect, Transition};
///
/// let increment: Transition<u32, &'static str> =
///     transition(|count: &u32, _: &&str| Effect::pure(count + 1));
/// assert_eq!(*increment(&1, &"inc").state(), 2);
/// ```
pub fn transition<S, A, F>(f: F) -> Transition<S, A>
where
    S: State,
    A: Action,
    F: Fn(&S, &A) -> Effect<S, A> + Send + Sync + 'static,
{
    Arc::new(f)
}

/// Finite mapping from action to transition, fixed at construction.
///
/// There is no fallback entry: looking up an unregistered action yields
/// `None`. When an action is registered more than once, the last
/// registration wins.
pub struct TransitionTable<S, A> {
    transitions: HashMap<A, Transition<S, A>>,
}

impl<S: State, A: Action> TransitionTable<S, A> {
    /// Build a table from `(action, transition)` pairs in registration order.
    pub fn from_pairs<I>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (A, Transition<S, A>)>,
    {
        Self {
            transitions: pairs.into_iter().collect(),
        }
    }

    /// Look up the transition registered for `action`.
    pub fn get(&self, action: &A) -> Option<&Transition<S, A>> {
        self.transitions.get(action)
    }

    pub fn contains(&self, action: &A) -> bool {
        self.transitions.contains_key(action)
    }

    pub fn len(&self) -> usize {
        self.transitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.transitions.is_empty()
    }

    /// Registered actions, in no particular order.
    pub fn actions(&self) -> impl Iterator<Item = &A> {
        self.transitions.keys()
    }
}

impl<S: State, A: Action> FromIterator<(A, Transition<S, A>)> for TransitionTable<S, A> {
    fn from_iter<I: IntoIterator<Item = (A, Transition<S, A>)>>(iter: I) -> Self {
        Self::from_pairs(iter)
    }
}

impl<S, A: Clone> Clone for TransitionTable<S, A> {
    fn clone(&self) -> Self {
        Self {
            transitions: self.transitions.clone(),
        }
    }
}

impl<S, A: fmt::Debug> fmt::Debug for TransitionTable<S, A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TransitionTable")
            .field("actions", &self.transitions.keys().collect::<Vec<_>>())
            .finish()
    }
}
