//! Build errors for the capsule builder.

use thiserror::Error;

/// Errors that can occur when building a capsule.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum BuildError {
    #[error("Initial state not specified. Call .initial(state) before .build()")]
    MissingInitialState,

    #[error("No transitions defined. Register at least one with .on(action, transition)")]
    NoTransitions,
}
