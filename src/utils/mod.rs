//! Shared utilities

pub mod error;

pub use error::{ConfigError, ContentError, NetworkError, Result, VistaError};
