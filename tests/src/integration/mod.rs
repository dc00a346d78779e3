//! Cross-crate integration tests.

pub mod sealing_choreography;
pub mod signing_flows;

#[cfg(test)]
pub(crate) mod harness;
