//! # Domain Module
//!
//! Pass state machine, deployment and tenant profiles, the failure
//! taxonomy and the pass report.

pub mod errors;
pub mod profile;
pub mod report;
pub mod state;

pub use errors::*;
pub use profile::*;
pub use report::*;
pub use state::*;
