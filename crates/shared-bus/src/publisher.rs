//! # State Publisher
//!
//! Producing side of a state update stream.

use crate::events::UpdateCategory;
use crate::subscriber::Subscription;
use crate::DEFAULT_CHANNEL_CAPACITY;
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::Arc;
use tokio::sync::Notify;
use tracing::{debug, trace, warn};

/// Queue state shared between a publisher and its subscription.
pub(crate) struct Shared<T> {
    pub(crate) inner: Mutex<Inner<T>>,
    pub(crate) notify: Notify,
}

pub(crate) struct Inner<T> {
    /// Undelivered updates, oldest first.
    pub(crate) queue: VecDeque<T>,
    /// Most recently published value.
    pub(crate) last: Option<T>,
    /// Id of the only subscription allowed to drain the queue.
    pub(crate) active: u64,
    /// Set once the publisher is dropped.
    pub(crate) closed: bool,
    /// Updates discarded because the buffer was full.
    pub(crate) dropped: u64,
}

/// Publishes updates of one state category.
///
/// Not `Clone`: a category has exactly one producer.
pub struct StatePublisher<T> {
    category: UpdateCategory,
    capacity: usize,
    shared: Arc<Shared<T>>,
}

impl<T: Clone + PartialEq + Send + 'static> StatePublisher<T> {
    /// Create a publisher with the default buffer capacity.
    #[must_use]
    pub fn new(category: UpdateCategory) -> Self {
        Self::with_capacity(category, DEFAULT_CHANNEL_CAPACITY)
    }

    /// Create a publisher buffering at most `capacity` undelivered updates.
    #[must_use]
    pub fn with_capacity(category: UpdateCategory, capacity: usize) -> Self {
        Self {
            category,
            capacity: capacity.max(1),
            shared: Arc::new(Shared {
                inner: Mutex::new(Inner {
                    queue: VecDeque::new(),
                    last: None,
                    active: 0,
                    closed: false,
                    dropped: 0,
                }),
                notify: Notify::new(),
            }),
        }
    }

    /// Publish `value` unconditionally.
    pub fn publish(&self, value: T) {
        let mut inner = self.shared.inner.lock();
        self.enqueue(&mut inner, value);
        drop(inner);
        self.shared.notify.notify_one();
    }

    /// Publish `value` only if it differs from the last published value.
    ///
    /// Returns `true` when the value was published.
    pub fn publish_if_changed(&self, value: T) -> bool {
        let mut inner = self.shared.inner.lock();
        if inner.last.as_ref() == Some(&value) {
            trace!(category = %self.category, "Duplicate update suppressed");
            return false;
        }
        self.enqueue(&mut inner, value);
        drop(inner);
        self.shared.notify.notify_one();
        true
    }

    /// Forget the last published value so the next
    /// [`publish_if_changed`](Self::publish_if_changed) always goes through.
    pub fn reset_last(&self) {
        self.shared.inner.lock().last = None;
    }

    fn enqueue(&self, inner: &mut Inner<T>, value: T) {
        if inner.queue.len() >= self.capacity {
            inner.queue.pop_front();
            inner.dropped += 1;
            warn!(
                category = %self.category,
                capacity = self.capacity,
                dropped = inner.dropped,
                "Update buffer full, oldest update dropped"
            );
        }
        inner.last = Some(value.clone());
        inner.queue.push_back(value);
    }

    /// Open the subscription for this category, retiring any previous one.
    ///
    /// Updates published before this call and not yet consumed are
    /// delivered to the new subscription.
    #[must_use]
    pub fn subscribe(&self) -> Subscription<T> {
        let id = {
            let mut inner = self.shared.inner.lock();
            inner.active += 1;
            inner.active
        };
        // Wake a retired subscription so it can observe that it is retired.
        self.shared.notify.notify_waiters();
        debug!(category = %self.category, subscription = id, "Subscription opened");
        Subscription::new(self.shared.clone(), id, self.category)
    }

    /// Category this publisher serves.
    pub fn category(&self) -> UpdateCategory {
        self.category
    }

    /// Buffer capacity.
    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

impl<T> Drop for StatePublisher<T> {
    fn drop(&mut self) {
        self.shared.inner.lock().closed = true;
        self.shared.notify.notify_waiters();
    }
}
