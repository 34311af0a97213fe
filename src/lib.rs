//! Capsule: a minimal action-driven state container
//!
//! A capsule owns a single piece of state that changes only through
//! registered transitions. Each transition is a pure function from the
//! current state and an incoming action to an [`Effect`]: the next state,
//! optionally accompanied by side effects the capsule runs concurrently once
//! the new state is published.
//!
//! # Core Concepts
//!
//! - **State / Action**: opaque client types, bounded by the `State` and
//!   `Action` traits
//! - **Effect**: `Pure(state)` or `Impure { state, side_effects }`
//! - **Transition table**: immutable action-keyed mapping fixed at construction
//! - **Capsule**: dispatches actions, publishes state, fans out side effects
//!
//! # Example
//!
//! ```rust
//! use capsule::builder::CapsuleBuilder;
//! use capsule::core::{Effect, SideEffect};
//! use futures::StreamExt;
//!
//! #[derive(Clone, Debug, PartialEq, Eq, Hash)]
//! enum Action {
//!     Increment,
//! }
//!
//! # tokio_test::block_on(async {
//! let log: SideEffect<u32, Action> = SideEffect::from_fn(|previous, _| {
//!     println!("leaving {previous}");
//!     Ok(())
//! });
//!
//! let counter = CapsuleBuilder::new()
//!     .initial(0u32)
//!     .on(Action::Increment, move |count: &u32, _: &Action| {
//!         Effect::pure(count + 1).also(log.clone())
//!     })
//!     .build()
//!     .unwrap();
//!
//! let mut states = counter.subscribe();
//! assert_eq!(states.next().await, Some(0));
//!
//! counter.run(Action::Increment).await.unwrap();
//! assert_eq!(states.next().await, Some(1));
//! # });
//! ```

pub mod builder;
pub mod config;
pub mod core;
pub mod effects;

// Re-export commonly used types
pub use crate::builder::{BuildError, CapsuleBuilder};
pub use crate::config::CapsuleConfig;
pub use crate::core::{Action, Effect, SideEffect, State, Transition, TransitionTable};
pub use crate::effects::{Capsule, CapsuleError, FanOutPolicy};
