//! Environment-driven configuration for Orion.
//!
//! Values come from the process environment, optionally seeded from a `.env`
//! file. Required secrets are checked before anything connects.

pub mod error;
pub mod loader;
pub mod schema;

pub use {
    error::{ConfigError, Result},
    loader::{from_lookup, load},
    schema::OrionConfig,
};
