//! Capsule engine: the imperative shell around the pure core.
//!
//! This module executes what transitions describe:
//!
//! - **Capsule**: dispatches actions and owns the single state cell
//! - **Publisher**: replay-latest broadcast of the current state
//! - **Fan-out**: concurrent side-effect execution under a named policy
//!
//! # Ordering
//!
//! Lookup, invocation and publish of one action happen under a lock, so
//! state updates are totally ordered even with concurrent callers. Side
//! effects start only after the new state is visible to subscribers.

mod capsule;
mod error;
mod fanout;
mod publisher;

pub use capsule::Capsule;
pub use error::CapsuleError;
pub use fanout::FanOutPolicy;
pub use publisher::{StatePublisher, StateStream};
