//! Ledger adapters.

pub mod memory;
