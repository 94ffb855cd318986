//! Domain layer of the Story Session context.

pub mod aggregates;
pub mod commands;
pub mod rules;
