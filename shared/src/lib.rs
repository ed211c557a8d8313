//! Shared types and models for the Happy Flower shop ledger
//!
//! This crate contains the domain types and the pure money/material rules
//! shared between the backend, the browser form preview (via WASM), and
//! other components of the system.

pub mod materials;
pub mod models;
pub mod money;
pub mod types;
pub mod validation;

pub use models::*;
pub use types::*;
pub use validation::*;
