//! nextrack-common - shared foundation for the nextrack service
//!
//! Error type, key-value store abstraction and backends, track catalog
//! decoding, and configuration loading shared by the service crates.

pub mod catalog;
pub mod config;
pub mod error;
pub mod store;

pub use error::{Error, Result};
