//! Core capsule types.
//!
//! This module contains the pure data model of a capsule:
//! - State and action bounds via the `State` and `Action` traits
//! - Effects and side effects returned by transitions
//! - The immutable action-keyed transition table
//!
//! Nothing in this module performs work. Executing side effects and
//! publishing state belongs to the engine in [`crate::effects`].

mod effect;
mod state;
mod table;

pub use effect::{BoxError, Effect, SideEffect, SideEffectError, SideEffectFuture};
pub use state::{Action, State};
pub use table::{transition, Transition, TransitionTable};
