//! Application layer of the content import.

pub mod command_handlers;
