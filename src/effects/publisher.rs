//! Replay-latest state publisher.

use crate::core::State;
use futures::stream::{self, BoxStream};
use futures::{Stream, StreamExt};
use std::fmt;
use std::pin::Pin;
use std::task::{Context, Poll};
use tokio::sync::watch;

/// Holds the current state and broadcasts every update.
///
/// This is a "latest state" observable, not an event log: a subscriber that
/// falls behind skips straight to the most recent value.
pub struct StatePublisher<S> {
    sender: watch::Sender<S>,
}

impl<S: State> StatePublisher<S> {
    pub fn new(initial: S) -> Self {
        let (sender, _) = watch::channel(initial);
        Self { sender }
    }

    /// Latest published state.
    pub fn current(&self) -> S {
        self.sender.borrow().clone()
    }

    /// Replace the current state and notify all live subscribers.
    ///
    /// Publishing a value equal to the current one still notifies, so every
    /// dispatch is observable even when it leaves the state unchanged.
    /// Subscribers that only care about distinct values should filter out
    /// repeats themselves.
    pub fn publish(&self, state: S) {
        self.sender.send_replace(state);
    }

    /// Subscribe to the state sequence, starting with the current value.
    pub fn subscribe(&self) -> StateStream<S> {
        StateStream::new(self.sender.subscribe())
    }

    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl<S: fmt::Debug> fmt::Debug for StatePublisher<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StatePublisher")
            .field("current", &*self.sender.borrow())
            .field("subscribers", &self.sender.receiver_count())
            .finish()
    }
}

/// Stream of published states for one subscriber.
///
/// Yields the state current at subscription time first, then every later
/// update in commit order. Ends only when dropped or when the publisher is
/// gone.
pub struct StateStream<S> {
    inner: BoxStream<'static, S>,
}

impl<S: State> StateStream<S> {
    fn new(receiver: watch::Receiver<S>) -> Self {
        let inner = stream::unfold((receiver, true), |(mut receiver, first)| async move {
            if !first && receiver.changed().await.is_err() {
                return None;
            }
            let state = receiver.borrow_and_update().clone();
            Some((state, (receiver, false)))
        })
        .boxed();

        Self { inner }
    }
}

impl<S> Stream for StateStream<S> {
    type Item = S;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<S>> {
        self.inner.poll_next_unpin(cx)
    }
}

impl<S> fmt::Debug for StateStream<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("StateStream")
    }
}
