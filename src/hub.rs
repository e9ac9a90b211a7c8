//! Broadcast Hub
//!
//! Fan-out of live verdicts to any number of subscribers.
//!
//! # Overflow policy
//!
//! Every subscriber reads from a bounded queue of `capacity` verdicts
//! (rounded up to a power of two by the channel). Publishing never waits:
//! when a subscriber falls behind, its oldest unread verdicts are dropped and
//! it resumes from the oldest one still queued. Drops are counted per
//! subscription and logged.
//!
//! Subscribers only see verdicts published after they subscribed. History is
//! served by the reading store.

use std::sync::atomic::{AtomicU64, Ordering};

use futures::Stream;
use thiserror::Error;
use tokio::sync::broadcast::{self, error::{RecvError, TryRecvError}};

use crate::models::PostureVerdict;

/// Default per-subscriber queue size
pub const DEFAULT_SUBSCRIBER_CAPACITY: usize = 64;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PublishError {
    #[error("no active subscribers")]
    NoSubscribers,
}

pub struct BroadcastHub {
    sender: broadcast::Sender<PostureVerdict>,
    next_subscriber: AtomicU64,
    published: AtomicU64,
}

impl BroadcastHub {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self {
            sender,
            next_subscriber: AtomicU64::new(1),
            published: AtomicU64::new(0),
        }
    }

    /// Open a live subscription starting at the next published verdict
    pub fn subscribe(&self) -> Subscription {
        let id = self.next_subscriber.fetch_add(1, Ordering::Relaxed);
        tracing::debug!(subscriber = id, "Subscriber attached");
        Subscription {
            id,
            receiver: self.sender.subscribe(),
            dropped: 0,
        }
    }

    /// Release a subscription. Dropping the handle has the same effect.
    pub fn unsubscribe(&self, subscription: Subscription) {
        tracing::debug!(
            subscriber = subscription.id,
            dropped = subscription.dropped,
            "Subscriber detached"
        );
        drop(subscription);
    }

    /// Hand a copy of `verdict` to every current subscriber without waiting.
    ///
    /// Returns the number of subscribers reached.
    pub fn publish(&self, verdict: PostureVerdict) -> Result<usize, PublishError> {
        match self.sender.send(verdict) {
            Ok(reached) => {
                self.published.fetch_add(1, Ordering::Relaxed);
                Ok(reached)
            }
            Err(_) => Err(PublishError::NoSubscribers),
        }
    }

    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }

    /// Verdicts delivered to at least one subscriber
    pub fn published(&self) -> u64 {
        self.published.load(Ordering::Relaxed)
    }
}

impl Default for BroadcastHub {
    fn default() -> Self {
        Self::new(DEFAULT_SUBSCRIBER_CAPACITY)
    }
}

/// Handle to a live verdict stream
pub struct Subscription {
    id: u64,
    receiver: broadcast::Receiver<PostureVerdict>,
    dropped: u64,
}

impl Subscription {
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Verdicts lost to queue overflow so far
    pub fn dropped(&self) -> u64 {
        self.dropped
    }

    /// Next verdict, waiting if none is queued. `None` once the hub is gone.
    pub async fn recv(&mut self) -> Option<PostureVerdict> {
        loop {
            match self.receiver.recv().await {
                Ok(verdict) => return Some(verdict),
                Err(RecvError::Lagged(skipped)) => self.record_lag(skipped),
                Err(RecvError::Closed) => return None,
            }
        }
    }

    /// Next queued verdict without waiting
    pub fn try_recv(&mut self) -> Option<PostureVerdict> {
        loop {
            match self.receiver.try_recv() {
                Ok(verdict) => return Some(verdict),
                Err(TryRecvError::Lagged(skipped)) => self.record_lag(skipped),
                Err(TryRecvError::Empty) | Err(TryRecvError::Closed) => return None,
            }
        }
    }

    /// Consume the handle as a lazy stream of verdicts
    pub fn into_stream(self) -> impl Stream<Item = PostureVerdict> {
        futures::stream::unfold(self, |mut sub| async move {
            sub.recv().await.map(|verdict| (verdict, sub))
        })
    }

    fn record_lag(&mut self, skipped: u64) {
        self.dropped += skipped;
        tracing::warn!(
            subscriber = self.id,
            skipped,
            total_dropped = self.dropped,
            "Slow subscriber, oldest verdicts dropped"
        );
    }
}
