//! # Shared Types Crate
//!
//! This crate contains the registry data model and the primitive types that
//! every provisioning crate exchanges.
//!
//! ## Design Principles
//!
//! - **Single Source of Truth**: the persisted registry layout is defined here
//!   and nowhere else.
//! - **Invariants in Types**: shared infrastructure is an `Option` of a struct
//!   with every shared address, so it is either fully present or absent.
//!   A tenant descriptor cannot be built without all four unit addresses.
//! - **Amounts in Base Units**: all numeric parameters are 18-decimal `U256`.

pub mod amounts;
pub mod entities;
pub mod errors;
pub mod registry;

pub use amounts::{format_units, parse_units, DECIMALS};
pub use entities::*;
pub use errors::*;
pub use registry::*;
