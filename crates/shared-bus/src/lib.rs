//! # Shared Bus - State Update Streams
//!
//! Carries state-change notifications from the component that owns a piece
//! of state to whoever displays or reacts to it.
//!
//! ## Delivery Model
//!
//! ```text
//! ┌──────────────┐  publish()   ┌──────────────────┐  recv()/Stream  ┌────────────┐
//! │ State owner  │ ───────────→ │ StatePublisher<T>│ ──────────────→ │ Subscriber │
//! │ (producer)   │              │  bounded buffer  │                 │ (one active)│
//! └──────────────┘              └──────────────────┘                 └────────────┘
//! ```
//!
//! - One publisher per state category (height, balance, sync state,
//!   transactions). Categories never share a queue, so ordering holds
//!   within a category and nothing is merged across categories.
//! - Values published before anyone subscribes are buffered and handed to
//!   the first subscriber.
//! - At most one subscription is active: subscribing again retires the
//!   previous handle, which then yields `None`.
//! - The buffer is bounded; when a slow consumer lets it fill, the oldest
//!   value is dropped and counted, the producer never blocks.

// Allow in tests
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

pub mod events;
pub mod publisher;
pub mod subscriber;

pub use events::UpdateCategory;
pub use publisher::StatePublisher;
pub use subscriber::{StateStream, Subscription, SubscriptionError};

/// Maximum updates buffered per category before the oldest is dropped.
pub const DEFAULT_CHANNEL_CAPACITY: usize = 1000;
