//! Lathi — story content import.
//!
//! Responsible for YAML content packs: parsing, validating each chapter as a
//! directed acyclic slide graph, compiling chapters into the runtime read
//! model with stable identifiers, and hashing them for idempotent re-import.

pub mod application;
pub mod domain;
