//! # Vellum Test Suite
//!
//! Unified test crate for cross-crate choreography:
//!
//! ```text
//! tests/src/
//! └── integration/
//!     ├── signing_flows.rs        # Envelope lifecycle end to end
//!     └── sealing_choreography.rs # Engine → bus → worker → sealed artifact
//! ```
//!
//! ## Running Tests
//!
//! ```bash
//! # All tests
//! cargo test -p vellum-tests
//!
//! # By category
//! cargo test -p vellum-tests integration::signing_flows
//! cargo test -p vellum-tests integration::sealing_choreography
//! ```

pub mod integration;
