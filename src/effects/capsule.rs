//! Capsule engine: dispatches actions, publishes state, runs side effects.

use crate::config::CapsuleConfig;
use crate::core::{Action, SideEffect, State, TransitionTable};
use crate::effects::error::CapsuleError;
use crate::effects::publisher::{StatePublisher, StateStream};
use std::fmt;
use std::sync::{Arc, Mutex, PoisonError};
use tokio::runtime::Handle;
use tracing::{debug, instrument, trace};

/// Action-driven state container.
///
/// A capsule owns one current state and one immutable transition table.
/// The state changes only through [`Capsule::run`]. Handles are cheap to
/// clone and all clones share the same state.
pub struct Capsule<S, A> {
    inner: Arc<Inner<S, A>>,
}

struct Inner<S, A> {
    publisher: StatePublisher<S>,
    table: TransitionTable<S, A>,
    config: CapsuleConfig,
    // Serializes lookup, invocation and publish across concurrent callers.
    dispatch: Mutex<()>,
}

impl<S: State, A: Action> Capsule<S, A> {
    /// Create a capsule with the default configuration.
    pub fn new(initial: S, table: TransitionTable<S, A>) -> Self {
        Self::with_config(initial, table, CapsuleConfig::default())
    }

    pub fn with_config(initial: S, table: TransitionTable<S, A>, config: CapsuleConfig) -> Self {
        Self {
            inner: Arc::new(Inner {
                publisher: StatePublisher::new(initial),
                table,
                config,
                dispatch: Mutex::new(()),
            }),
        }
    }

    /// Latest published state.
    pub fn current(&self) -> S {
        self.inner.publisher.current()
    }

    /// Observe the state, starting with the current value.
    pub fn subscribe(&self) -> StateStream<S> {
        self.inner.publisher.subscribe()
    }

    pub fn config(&self) -> &CapsuleConfig {
        &self.inner.config
    }

    pub fn transitions(&self) -> &TransitionTable<S, A> {
        &self.inner.table
    }

    /// Dispatch `action`.
    ///
    /// The transition's state is published before any side effect starts and
    /// stays published even if a side effect fails. Side effects receive the
    /// state that was current before the transition ran. Returns once every
    /// side effect has resolved under the configured fan-out policy; dropping
    /// the returned future aborts the side effects still running.
    ///
    /// Every successful dispatch emits to subscribers, even when the new state
    /// equals the old one.
    ///
    /// Pure transitions run on any executor. Side effects are spawned on the
    /// current Tokio runtime; without one the call fails with
    /// [`CapsuleError::NoRuntime`] before anything is published.
    #[instrument(level = "debug", skip(self), fields(policy = ?self.inner.config.fan_out))]
    pub async fn run(&self, action: A) -> Result<(), CapsuleError> {
        let (previous, side_effects) = self.dispatch(&action)?;
        self.inner
            .config
            .fan_out
            .execute(side_effects, previous, action)
            .await
    }

    fn dispatch(&self, action: &A) -> Result<(S, Vec<SideEffect<S, A>>), CapsuleError> {
        let _guard = self
            .inner
            .dispatch
            .lock()
            .unwrap_or_else(PoisonError::into_inner);

        let previous = self.inner.publisher.current();
        let Some(transition) = self.inner.table.get(action) else {
            return Err(CapsuleError::no_transition(action, &previous));
        };

        let (next, side_effects) = transition(&previous, action).into_parts();
        if !side_effects.is_empty() && Handle::try_current().is_err() {
            return Err(CapsuleError::NoRuntime {
                action: format!("{action:?}"),
            });
        }

        trace!(state = ?next, "Publishing state");
        self.inner.publisher.publish(next);
        debug!(side_effects = side_effects.len(), "Transition applied");

        Ok((previous, side_effects))
    }
}

impl<S, A> Clone for Capsule<S, A> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<S: fmt::Debug, A: fmt::Debug> fmt::Debug for Capsule<S, A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Capsule")
            .field("publisher", &self.inner.publisher)
            .field("table", &self.inner.table)
            .field("config", &self.inner.config)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{transition, BoxError, Effect, SideEffectError};
    use crate::effects::FanOutPolicy;
    use futures::StreamExt;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
    use std::sync::OnceLock;
    use std::time::Duration;
    use tokio::time::timeout;

    #[derive(Clone, Debug, PartialEq, Eq, Hash)]
    enum Command {
        Increment,
        Notify,
        Fail,
        Slow,
        Unknown,
    }

    async fn assert_silent(stream: &mut StateStream<u32>) {
        let next = timeout(Duration::from_millis(25), stream.next()).await;
        assert!(next.is_err(), "expected no emission, got {next:?}");
    }

    fn counter() -> Capsule<u32, Command> {
        Capsule::new(
            0,
            TransitionTable::from_pairs([(
                Command::Increment,
                transition(|count: &u32, _: &Command| Effect::pure(count + 1)),
            )]),
        )
    }

    #[tokio::test]
    async fn subscribe_starts_with_initial_state() {
        let capsule = counter();
        let mut states = capsule.subscribe();

        assert_eq!(states.next().await, Some(0));
        assert_eq!(capsule.current(), 0);
    }

    #[tokio::test]
    async fn pure_transition_publishes_once() {
        let capsule = counter();
        let mut states = capsule.subscribe();
        states.next().await;

        capsule.run(Command::Increment).await.unwrap();

        assert_eq!(states.next().await, Some(1));
        assert_silent(&mut states).await;
    }

    #[tokio::test]
    async fn unknown_action_fails_without_publishing() {
        let capsule = counter();
        let mut states = capsule.subscribe();
        states.next().await;

        let result = capsule.run(Command::Unknown).await;

        match result {
            Err(CapsuleError::NoTransitionFound { action, state }) => {
                assert_eq!(action, "Unknown");
                assert_eq!(state, "0");
            }
            other => panic!("Expected NoTransitionFound, got {other:?}"),
        }
        assert_silent(&mut states).await;
        assert_eq!(capsule.current(), 0);
    }

    #[tokio::test]
    async fn capsule_stays_usable_after_unknown_action() {
        let capsule = counter();

        assert!(capsule.run(Command::Unknown).await.is_err());
        capsule.run(Command::Increment).await.unwrap();

        assert_eq!(capsule.current(), 1);
    }

    #[tokio::test]
    async fn side_effects_see_pre_transition_state() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let recorder = Arc::clone(&seen);
        let record: SideEffect<u32, Command> = SideEffect::from_fn(move |state, action| {
            recorder
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .push((state, action));
            Ok(())
        });

        let capsule = Capsule::new(
            10,
            TransitionTable::from_pairs([(
                Command::Notify,
                transition(move |count: &u32, _: &Command| {
                    Effect::pure(count + 5).also(record.clone())
                }),
            )]),
        );

        capsule.run(Command::Notify).await.unwrap();

        assert_eq!(capsule.current(), 15);
        assert_eq!(*seen.lock().unwrap(), vec![(10, Command::Notify)]);
    }

    #[tokio::test]
    async fn state_is_published_before_side_effects_start() {
        let slot: Arc<OnceLock<Capsule<u32, Command>>> = Arc::new(OnceLock::new());
        let observed = Arc::new(AtomicUsize::new(usize::MAX));

        let handle = Arc::clone(&slot);
        let sink = Arc::clone(&observed);
        let peek: SideEffect<u32, Command> = SideEffect::from_fn(move |_, _| {
            if let Some(capsule) = handle.get() {
                sink.store(capsule.current() as usize, Ordering::SeqCst);
            }
            Ok(())
        });

        let capsule = Capsule::new(
            1,
            TransitionTable::from_pairs([(
                Command::Notify,
                transition(move |count: &u32, _: &Command| {
                    Effect::pure(count * 10).also(peek.clone())
                }),
            )]),
        );
        slot.set(capsule.clone()).unwrap();

        capsule.run(Command::Notify).await.unwrap();

        assert_eq!(observed.load(Ordering::SeqCst), 10);
    }

    #[tokio::test]
    async fn run_waits_for_side_effects() {
        let finished = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&finished);
        let slow: SideEffect<u32, Command> = SideEffect::new(move |_, _| {
            let flag = Arc::clone(&flag);
            async move {
                tokio::time::sleep(Duration::from_millis(30)).await;
                flag.store(true, Ordering::SeqCst);
                Ok(())
            }
        });

        let capsule = Capsule::new(
            0,
            TransitionTable::from_pairs([(
                Command::Slow,
                transition(move |count: &u32, _: &Command| {
                    Effect::pure(*count).also(slow.clone())
                }),
            )]),
        );

        capsule.run(Command::Slow).await.unwrap();

        assert!(finished.load(Ordering::SeqCst));
    }

    fn failing_capsule(
        config: CapsuleConfig,
        finished: &Arc<AtomicBool>,
    ) -> Capsule<u32, Command> {
        let flag = Arc::clone(finished);
        let slow: SideEffect<u32, Command> = SideEffect::new(move |_, _| {
            let flag = Arc::clone(&flag);
            async move {
                tokio::time::sleep(Duration::from_millis(50)).await;
                flag.store(true, Ordering::SeqCst);
                Ok(())
            }
        });
        let broken: SideEffect<u32, Command> =
            SideEffect::from_fn(|_, _| Err("sensor offline".into()));

        Capsule::with_config(
            0,
            TransitionTable::from_pairs([(
                Command::Fail,
                transition(move |count: &u32, _: &Command| {
                    Effect::pure(count + 1)
                        .also(broken.clone())
                        .and(slow.clone())
                }),
            )]),
            config,
        )
    }

    #[tokio::test]
    async fn failing_side_effect_cancels_siblings_and_keeps_state() {
        let finished = Arc::new(AtomicBool::new(false));
        let capsule = failing_capsule(CapsuleConfig::default(), &finished);

        let result = capsule.run(Command::Fail).await;

        assert!(matches!(
            result,
            Err(CapsuleError::SideEffectFailure(SideEffectError::Failed(_)))
        ));
        assert_eq!(capsule.current(), 1);

        tokio::time::sleep(Duration::from_millis(100)).await;
        assert!(!finished.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn best_effort_policy_lets_siblings_finish() {
        let finished = Arc::new(AtomicBool::new(false));
        let config = CapsuleConfig::default().with_fan_out(FanOutPolicy::BestEffort);
        let capsule = failing_capsule(config, &finished);

        let result = capsule.run(Command::Fail).await;

        match result {
            Err(CapsuleError::SideEffectFailures(failures)) => assert_eq!(failures.len(), 1),
            other => panic!("Expected SideEffectFailures, got {other:?}"),
        }
        assert!(finished.load(Ordering::SeqCst));
        assert_eq!(capsule.current(), 1);
    }

    #[tokio::test]
    async fn cancelling_run_aborts_side_effects() {
        let finished = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&finished);
        let slow: SideEffect<u32, Command> = SideEffect::new(move |_, _| {
            let flag = Arc::clone(&flag);
            async move {
                tokio::time::sleep(Duration::from_millis(50)).await;
                flag.store(true, Ordering::SeqCst);
                Ok(())
            }
        });
        let capsule = Capsule::new(
            0,
            TransitionTable::from_pairs([(
                Command::Slow,
                transition(move |count: &u32, _: &Command| {
                    Effect::pure(count + 1).also(slow.clone())
                }),
            )]),
        );

        let timed_out = timeout(Duration::from_millis(10), capsule.run(Command::Slow)).await;

        assert!(timed_out.is_err());
        assert_eq!(capsule.current(), 1);
        tokio::time::sleep(Duration::from_millis(100)).await;
        assert!(!finished.load(Ordering::SeqCst));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_runs_are_serialized() {
        let capsule = counter();

        let handles: Vec<_> = (0..200)
            .map(|_| {
                let capsule = capsule.clone();
                tokio::spawn(async move { capsule.run(Command::Increment).await })
            })
            .collect();

        for handle in handles {
            handle.await.unwrap().unwrap();
        }

        assert_eq!(capsule.current(), 200);
    }

    #[tokio::test]
    async fn side_effect_can_dispatch_follow_up_action() {
        let slot: Arc<OnceLock<Capsule<u32, Command>>> = Arc::new(OnceLock::new());
        let handle = Arc::clone(&slot);
        let follow_up: SideEffect<u32, Command> = SideEffect::new(move |_, _| {
            let capsule = handle.get().cloned();
            async move {
                match capsule {
                    Some(capsule) => capsule
                        .run(Command::Increment)
                        .await
                        .map_err(BoxError::from),
                    None => Ok(()),
                }
            }
        });

        let capsule = Capsule::new(
            0,
            TransitionTable::from_pairs([
                (
                    Command::Increment,
                    transition(|count: &u32, _: &Command| Effect::pure(count + 1)),
                ),
                (
                    Command::Notify,
                    transition(move |count: &u32, _: &Command| {
                        Effect::pure(count + 100).also(follow_up.clone())
                    }),
                ),
            ]),
        );
        slot.set(capsule.clone()).unwrap();

        capsule.run(Command::Notify).await.unwrap();

        assert_eq!(capsule.current(), 101);
    }

    #[test]
    fn impure_run_outside_runtime_fails_without_publishing() {
        let noop: SideEffect<u32, Command> = SideEffect::from_fn(|_, _| Ok(()));
        let capsule = Capsule::new(
            0,
            TransitionTable::from_pairs([
                (
                    Command::Increment,
                    transition(|count: &u32, _: &Command| Effect::pure(count + 1)),
                ),
                (
                    Command::Notify,
                    transition(move |count: &u32, _: &Command| {
                        Effect::pure(count + 100).also(noop.clone())
                    }),
                ),
            ]),
        );

        futures::executor::block_on(capsule.run(Command::Increment)).unwrap();
        let result = futures::executor::block_on(capsule.run(Command::Notify));

        match result {
            Err(CapsuleError::NoRuntime { action }) => assert_eq!(action, "Notify"),
            other => panic!("Expected NoRuntime, got {other:?}"),
        }
        assert_eq!(capsule.current(), 1);
    }

    #[test]
    fn exposes_configuration_and_table() {
        let capsule = counter();

        assert_eq!(capsule.config().fan_out, FanOutPolicy::FailFast);
        assert!(capsule.transitions().contains(&Command::Increment));
        assert_eq!(capsule.transitions().len(), 1);
    }
}
