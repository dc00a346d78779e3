//! Step-up verification domain.

pub mod entities;
pub mod guard;
