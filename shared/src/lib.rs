//! Shared types for the Scontrini receipt workflow
//!
//! Domain models, wire contracts for the backend collaborators,
//! and money-precision helpers used across crates.

pub mod contracts;
pub mod models;
pub mod money;

// Re-exports
pub use serde::{Deserialize, Serialize};
