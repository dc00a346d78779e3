//! Envelope domain: entities, turn ordering, caller resolution.

pub mod access;
pub mod entities;
pub mod turn;
