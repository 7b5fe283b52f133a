//! # Domain Module
//!
//! Store errors and decoding of persisted registry documents.

pub mod document;
pub mod errors;

pub use document::*;
pub use errors::*;
