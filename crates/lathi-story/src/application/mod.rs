//! Application layer of the Story Session context.

pub mod assets;
pub mod command_handlers;
pub mod query_handlers;
