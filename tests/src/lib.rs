//! # Market Provisioner Test Suite
//!
//! Unified test crate for flows that cross component boundaries.
//!
//! ## Structure
//!
//! ```text
//! tests/src/
//! └── integration/
//!     ├── provisioning_flows.rs  # multi-pass scenarios against a JSON store
//!     ├── failure_flows.rs       # faults at every step, record visibility
//!     └── console_flows.rs       # console sessions over provisioned markets
//! ```
//!
//! ## Running Tests
//!
//! ```bash
//! cargo test -p mp-tests
//! cargo test -p mp-tests integration::failure_flows
//! ```

#![allow(dead_code)]

pub mod integration;
