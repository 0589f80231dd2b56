//! Storage Layer
//!
//! - [`BrickStore`] - persistence abstraction consumed by the tree engine and services
//! - [`InMemoryStore`] - map-backed implementation for tests and embedding applications
//!
//! The engine never talks to a database directly. Whatever backs the
//! application (an ORM, SQL, a key-value store) implements [`BrickStore`] and
//! must provide the (voter, brick) uniqueness constraint on votes.

mod brick_store;
mod error;
mod memory_store;

pub use brick_store::BrickStore;
pub use error::StoreError;
pub use memory_store::InMemoryStore;
