//! Lathi — Story Session bounded context.
//!
//! Responsible for a player's run through a branching chapter: starting and
//! restarting sessions, resolving submitted actions, heart damage, game-over
//! and completion, and the progress side effects that follow.

pub mod application;
pub mod domain;
