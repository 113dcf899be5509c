//! Configuration module
//!
//! Loads and validates race configuration files: countdown length,
//! custom stages and events, and lead capture settings.

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{CONFIG_ENV, ConfigLoader, LoadResult, LoadWarning};
pub use schema::*;
pub use validation::{ValidationResult, Validator};
