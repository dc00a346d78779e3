//! # Shared Bus - Event Bus for Workflow Choreography
//!
//! In-process publish/subscribe transport connecting the envelope engine to
//! the sealing worker and to notification consumers.
//!
//! ## Rules
//!
//! - State transitions never wait on consumers: notification publishing is
//!   fire-and-forget and a publish with zero receivers is not an error.
//! - Sealing is driven by `SealRequested` events consumed at-least-once; the
//!   `SealLeaseStore` narrows that to at-most-one concurrent seal per envelope.
//!
//! ```text
//! ┌─────────────────┐                      ┌─────────────────┐
//! │ Envelope Engine │                      │   Seal Worker   │
//! │                 │     publish()        │                 │
//! │                 │ ──────┐              │                 │
//! └─────────────────┘       │              └─────────────────┘
//!                           ▼                      ↑
//!                     ┌──────────────┐            │
//!                     │  Event Bus   │ ───────────┘
//!                     │              │  subscribe(Sealing)
//!                     └──────────────┘
//! ```

// Allow in tests
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

pub mod events;
pub mod lease;
pub mod publisher;
pub mod subscriber;

// Re-export main types
pub use events::{EventFilter, EventTopic, WorkflowEvent};
pub use lease::{LeaseError, LeaseToken, SealLeaseStore};
pub use publisher::{EventPublisher, InMemoryEventBus};
pub use subscriber::{Subscription, SubscriptionError};

/// Maximum events to buffer per subscriber before backpressure.
pub const DEFAULT_CHANNEL_CAPACITY: usize = 1000;
