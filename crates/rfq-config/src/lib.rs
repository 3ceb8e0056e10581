//! Configuration for the RFQ engine.
//!
//! Loaded once per exchange-network pair from a TOML file, with `${VAR}`
//! environment substitution and structural validation before anything is
//! constructed from it.

mod loader;
mod types;

pub use loader::ConfigLoader;
pub use types::*;

use thiserror::Error;

/// Errors that can occur while loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
	#[error("config file not found: {0}")]
	FileNotFound(String),
	#[error("config parse error: {0}")]
	Parse(String),
	#[error("config validation error: {0}")]
	Validation(String),
	#[error("environment variable not set: {0}")]
	EnvVarNotFound(String),
	#[error("io error reading config: {0}")]
	Io(#[from] std::io::Error),
}
