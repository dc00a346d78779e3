//! # Shared Types
//!
//! Core identifiers, actor identity, timestamps, and error kinds shared by
//! every Vellum subsystem crate.
//!
//! Nothing in this crate performs I/O; it is the vocabulary the workflow
//! crates speak to each other in.

pub mod actor;
pub mod errors;
pub mod ids;
pub mod rate_limiter;
pub mod time;
pub mod token;

pub use actor::{Actor, CallerIdentity};
pub use errors::{FieldViolation, StepUpFailure, WorkflowError};
pub use ids::{AccountId, EnvelopeId, FieldId, RecipientId};
pub use rate_limiter::RateLimiter;
pub use time::{MockTimeSource, SystemTimeSource, TimeSource, Timestamp};
pub use token::AccessToken;
