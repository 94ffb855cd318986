//! Lathi Core — shared domain abstractions.
//!
//! This crate defines the read model for story content, the error type every
//! bounded context returns, and the storage ports the story engine is written
//! against. It contains no infrastructure code.

pub mod clock;
pub mod command;
pub mod content;
pub mod error;
pub mod progress;
pub mod repository;
