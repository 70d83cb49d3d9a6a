//! # Subscription
//!
//! Consuming side of a state update stream.

use crate::events::UpdateCategory;
use crate::publisher::Shared;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};
use thiserror::Error;
use tokio_stream::Stream;
use tracing::debug;

/// Errors from subscription operations.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SubscriptionError {
    /// The publisher was dropped and the buffer is drained.
    #[error("Update stream closed")]
    Closed,
    /// A newer subscription replaced this one.
    #[error("Subscription superseded")]
    Superseded,
}

/// Handle for receiving updates of one category.
pub struct Subscription<T> {
    shared: Arc<Shared<T>>,
    id: u64,
    category: UpdateCategory,
}

impl<T: Clone + Send + 'static> Subscription<T> {
    pub(crate) fn new(shared: Arc<Shared<T>>, id: u64, category: UpdateCategory) -> Self {
        Self {
            shared,
            id,
            category,
        }
    }

    /// Receive the next update.
    ///
    /// # Returns
    ///
    /// - `Some(value)` - The next update, in publication order
    /// - `None` - The publisher is gone, or this subscription was superseded
    pub async fn recv(&mut self) -> Option<T> {
        next_update(self.shared.clone(), self.id).await
    }

    /// Receive the next update without waiting.
    ///
    /// # Returns
    ///
    /// - `Ok(Some(value))` - An update was buffered
    /// - `Ok(None)` - Nothing buffered right now
    /// - `Err(_)` - The stream is closed or this subscription was superseded
    pub fn try_recv(&mut self) -> Result<Option<T>, SubscriptionError> {
        let mut inner = self.shared.inner.lock();
        if inner.active != self.id {
            return Err(SubscriptionError::Superseded);
        }
        match inner.queue.pop_front() {
            Some(value) => Ok(Some(value)),
            None if inner.closed => Err(SubscriptionError::Closed),
            None => Ok(None),
        }
    }

    /// True while no newer subscription has replaced this one.
    pub fn is_active(&self) -> bool {
        self.shared.inner.lock().active == self.id
    }

    /// Category this subscription receives.
    pub fn category(&self) -> UpdateCategory {
        self.category
    }

    /// Convert into a `Stream`.
    #[must_use]
    pub fn into_stream(self) -> StateStream<T> {
        StateStream::new(self)
    }
}

async fn next_update<T: Clone>(shared: Arc<Shared<T>>, id: u64) -> Option<T> {
    loop {
        // Register interest before inspecting the queue so a publish that
        // lands in between is not missed.
        let notified = shared.notify.notified();
        {
            let mut inner = shared.inner.lock();
            if inner.active != id {
                debug!(subscription = id, "Subscription superseded");
                return None;
            }
            if let Some(value) = inner.queue.pop_front() {
                let more = !inner.queue.is_empty();
                drop(inner);
                if more {
                    // Hand the remaining permit on so a concurrent waiter
                    // is not stranded.
                    shared.notify.notify_one();
                }
                return Some(value);
            }
            if inner.closed {
                return None;
            }
        }
        notified.await;
    }
}

type PendingUpdate<T> = Pin<Box<dyn Future<Output = Option<T>> + Send>>;

/// A `Stream` over a subscription.
///
/// Implements `tokio_stream::Stream` for use with stream combinators.
pub struct StateStream<T> {
    subscription: Subscription<T>,
    pending: Option<PendingUpdate<T>>,
}

impl<T: Clone + Send + 'static> StateStream<T> {
    /// Create a new stream from a subscription.
    #[must_use]
    pub fn new(subscription: Subscription<T>) -> Self {
        Self {
            subscription,
            pending: None,
        }
    }

    /// Category this stream receives.
    #[must_use]
    pub fn category(&self) -> UpdateCategory {
        self.subscription.category()
    }
}

impl<T: Clone + Send + 'static> Stream for StateStream<T> {
    type Item = T;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = &mut *self;
        let fut = this.pending.get_or_insert_with(|| {
            Box::pin(next_update(
                this.subscription.shared.clone(),
                this.subscription.id,
            ))
        });
        match fut.as_mut().poll(cx) {
            Poll::Ready(item) => {
                this.pending = None;
                Poll::Ready(item)
            }
            Poll::Pending => Poll::Pending,
        }
    }
}
