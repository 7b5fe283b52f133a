//! # Domain Module
//!
//! The unit arena, the peer-reference table and the wiring plan derived
//! from them. Nothing here talks to the execution environment.

pub mod arena;
pub mod errors;
pub mod plan;
pub mod references;

pub use arena::*;
pub use errors::*;
pub use plan::*;
pub use references::*;
