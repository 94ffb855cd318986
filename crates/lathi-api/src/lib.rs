//! Lathi API — HTTP surface of the story engine.
//!
//! The binary in `main.rs` wires configuration, the `PostgreSQL` adapters and
//! the router defined here; integration tests build the same router over
//! in-memory ports.

pub mod config;
pub mod error;
pub mod extract;
pub mod routes;
pub mod state;
