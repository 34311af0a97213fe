//! Bounds for the values a capsule owns and dispatches on.
//!
//! Both traits are blanket-implemented, so client domains never implement
//! them by hand: any type with the listed capabilities qualifies.

use std::fmt::Debug;
use std::hash::Hash;

/// Trait for capsule state values.
///
/// States are opaque to the capsule. It only needs to clone them (side
/// effects receive their own copy), render them for errors, and move them
/// across tasks.
///
/// # Example
///
/// ```rust
/// use capsule::core::State;
///
/// #[derive(Clone, Debug)]
/// struct Counter {
///     value: u32,
/// }
///
/// fn assert_state<S: State>() {}
/// assert_state::<Counter>();
/// ```
pub trait State: Clone + Debug + Send + Sync + 'static {}

impl<T> State for T where T: Clone + Debug + Send + Sync + 'static {}

/// Trait for actions dispatched into a capsule.
///
/// Actions key the transition table, so they must hash and compare for
/// equality. Distinct logical actions must compare unequal.
///
/// # Example
///
/// ```rust
/// use capsule::core::Action;
///
/// #[derive(Clone, Debug, PartialEq, Eq, Hash)]
/// enum Command {
///     Increment,
///     Reset,
/// }
///
/// fn assert_action<A: Action>() {}
/// assert_action::<Command>();
/// ```
pub trait Action: Clone + Debug + Eq + Hash + Send + Sync + 'static {}

impl<T> Action for T where T: Clone + Debug + Eq + Hash + Send + Sync + 'static {}
