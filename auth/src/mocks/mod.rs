//! Mock provider implementations for testing.
//!
//! Scriptable, in-memory implementations of the provider traits, with
//! per-operation call counters and captured arguments so tests can assert
//! exactly which interactions happened.

pub mod pool;

pub use pool::{MockPoolUser, MockUserPool};
