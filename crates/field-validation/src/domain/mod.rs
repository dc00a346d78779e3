//! Pure validation domain: field kinds, metadata, and constraint rules.

pub mod checkbox;
pub mod entities;
pub mod rules;
