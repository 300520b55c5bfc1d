//! CLI module - command-line interface
//!
//! Contains the REPL, command parsing and single-utterance mode.

pub mod commands;
pub mod repl;
pub mod single_shot;

pub use repl::{Repl, Session};
pub use single_shot::single_shot;
