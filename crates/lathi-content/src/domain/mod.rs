//! Domain layer of the content import.

pub mod commands;
pub mod compile;
pub mod manifest;
pub mod validation;
