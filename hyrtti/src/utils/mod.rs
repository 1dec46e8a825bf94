//! Crate-wide helpers: error types and configuration.
pub mod conf;
pub mod error;
