//! In-process notification channel for profile changes.
//!
//! Delivery is synchronous: `publish` returns after every subscriber that was
//! registered at the time of the call has seen the event, in subscription
//! order. Nothing is buffered, so late subscribers never see earlier events.

use serde::Serialize;
use std::{
    fmt,
    sync::{
        Arc, PoisonError, RwLock, Weak,
        atomic::{AtomicU64, Ordering},
    },
};
use tracing::trace;

/// Payload published after a profile was saved.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct ProfileUpdated {
    pub username: String,
    /// Display URL of the avatar, already prefixed with the backend origin.
    pub avatar_url: Option<String>,
}

pub trait ProfileSubscriber: Send + Sync {
    fn on_profile_updated(&self, event: &ProfileUpdated);
}

impl<F> ProfileSubscriber for F
where
    F: Fn(&ProfileUpdated) + Send + Sync,
{
    fn on_profile_updated(&self, event: &ProfileUpdated) {
        self(event)
    }
}

type SubscriberList = Vec<(u64, Arc<dyn ProfileSubscriber>)>;

#[derive(Default)]
struct Channel {
    next_id: AtomicU64,
    subscribers: RwLock<SubscriberList>,
}

impl Channel {
    fn remove(&self, id: u64) {
        self.subscribers
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .retain(|(subscriber_id, _)| *subscriber_id != id);
    }
}

#[derive(Clone, Default)]
pub struct ProfileEvents {
    channel: Arc<Channel>,
}

impl fmt::Debug for ProfileEvents {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProfileEvents")
            .field("subscribers", &self.subscriber_count())
            .finish()
    }
}

impl ProfileEvents {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a subscriber until the returned guard is dropped.
    pub fn subscribe(&self, subscriber: Arc<dyn ProfileSubscriber>) -> Subscription {
        let id = self.channel.next_id.fetch_add(1, Ordering::Relaxed);
        self.channel
            .subscribers
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .push((id, subscriber));
        Subscription {
            id,
            channel: Arc::downgrade(&self.channel),
        }
    }

    /// Delivers `event` to the current subscribers and returns how many saw it.
    pub fn publish(&self, event: &ProfileUpdated) -> usize {
        // Snapshot so subscribers can (un)subscribe from inside the callback.
        let subscribers: Vec<Arc<dyn ProfileSubscriber>> = self
            .channel
            .subscribers
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .map(|(_, subscriber)| Arc::clone(subscriber))
            .collect();

        for subscriber in &subscribers {
            subscriber.on_profile_updated(event);
        }
        trace!(delivered = subscribers.len(), username = %event.username, "profile update published");
        subscribers.len()
    }

    pub fn subscriber_count(&self) -> usize {
        self.channel
            .subscribers
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}

/// Keeps a subscriber registered. Dropping it unsubscribes.
#[must_use = "dropping the subscription unsubscribes immediately"]
pub struct Subscription {
    id: u64,
    channel: Weak<Channel>,
}

impl Subscription {
    pub fn unsubscribe(self) {}
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription").field("id", &self.id).finish()
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(channel) = self.channel.upgrade() {
            channel.remove(self.id);
        }
    }
}
