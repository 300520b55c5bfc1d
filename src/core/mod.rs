//! Core module - shared infrastructure for Triage
//!
//! This module contains foundational types, configuration, and error handling
//! used throughout the application.

pub mod config;
pub mod error;
pub mod types;

pub use config::{AgentSpec, Config};
pub use error::{Result, TriageError};
pub use types::*;
