//! # Adapters Layer
//!
//! Implementations of the `RegistryStore` port.
//!
//! - `JsonFileRegistryStore`: one pretty-printed JSON file per network
//! - `InMemoryRegistryStore`: process-local map, for tests

mod in_memory;
mod json_file;

pub use in_memory::InMemoryRegistryStore;
pub use json_file::JsonFileRegistryStore;
