//! # Domain Module
//!
//! Handles, call arguments, confirmations, errors and the pure derivations
//! the simulated environment relies on.

pub mod entities;
pub mod errors;
pub mod services;

pub use entities::*;
pub use errors::*;
pub use services::*;
