//! Concurrent execution of the side effects requested by one transition.

use crate::core::{Action, BoxError, SideEffect, SideEffectError, State};
use crate::effects::error::CapsuleError;
use serde::{Deserialize, Serialize};
use tokio::task::{JoinError, JoinSet};
use tracing::{debug, trace};

/// How a fan-out reacts when one of its side effects fails.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FanOutPolicy {
    /// The first failure aborts every sibling still running and is returned
    /// as [`CapsuleError::SideEffectFailure`].
    #[default]
    FailFast,

    /// Every side effect runs to completion. All failures are collected into
    /// [`CapsuleError::SideEffectFailures`].
    BestEffort,
}

impl FanOutPolicy {
    /// Spawn each side effect as its own task and wait for the set to
    /// resolve under this policy.
    ///
    /// Every task receives its own copy of `state` and `action`. Under
    /// `FailFast` the error is returned only after every aborted sibling has
    /// stopped. Dropping the returned future aborts all tasks that are still
    /// running without waiting for them.
    pub(crate) async fn execute<S: State, A: Action>(
        self,
        side_effects: Vec<SideEffect<S, A>>,
        state: S,
        action: A,
    ) -> Result<(), CapsuleError> {
        if side_effects.is_empty() {
            return Ok(());
        }

        debug!(count = side_effects.len(), policy = ?self, "Launching side effects");

        let mut tasks = JoinSet::new();
        for side_effect in side_effects {
            let state = state.clone();
            let action = action.clone();
            tasks.spawn(async move { side_effect.invoke(state, action).await });
        }

        match self {
            FanOutPolicy::FailFast => fail_fast(tasks).await,
            FanOutPolicy::BestEffort => best_effort(tasks).await,
        }
    }
}

async fn fail_fast(mut tasks: JoinSet<Result<(), BoxError>>) -> Result<(), CapsuleError> {
    while let Some(joined) = tasks.join_next().await {
        if let Err(error) = outcome(joined) {
            trace!(remaining = tasks.len(), "Aborting sibling side effects");
            tasks.abort_all();
            // A sibling mid-poll only stops at its next yield; wait for it.
            while tasks.join_next().await.is_some() {}
            return Err(CapsuleError::SideEffectFailure(error));
        }
    }
    Ok(())
}

async fn best_effort(mut tasks: JoinSet<Result<(), BoxError>>) -> Result<(), CapsuleError> {
    let mut failures = Vec::new();
    while let Some(joined) = tasks.join_next().await {
        if let Err(error) = outcome(joined) {
            failures.push(error);
        }
    }

    if failures.is_empty() {
        Ok(())
    } else {
        Err(CapsuleError::SideEffectFailures(failures))
    }
}

fn outcome(joined: Result<Result<(), BoxError>, JoinError>) -> Result<(), SideEffectError> {
    match joined {
        Ok(Ok(())) => Ok(()),
        Ok(Err(source)) => Err(SideEffectError::Failed(source)),
        Err(error) if error.is_panic() => Err(SideEffectError::Panicked(panic_message(error))),
        Err(_) => Err(SideEffectError::Cancelled),
    }
}

fn panic_message(error: JoinError) -> String {
    let payload = error.into_panic();
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic payload".to_string()
    }
}
