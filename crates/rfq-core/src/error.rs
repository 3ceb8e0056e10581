//! Engine error taxonomy.

use rfq_client::ClientError;
use rfq_filter::FilterError;
use rfq_storage::CacheError;
use rfq_validation::ValidationError;
use thiserror::Error;

/// Errors the engine surfaces to the outer aggregation framework.
///
/// Nothing here is retried internally; the caller owns retry policy for
/// the whole pricing or trade cycle.
#[derive(Debug, Error)]
pub enum EngineError {
	/// The trade origin is blacklisted. Carries no maker identity.
	#[error("trade origin is blacklisted")]
	UserBlacklisted,
	/// The firm-quote exchange failed its status or shape checks.
	#[error("rfq failed: {0}")]
	Rfq(String),
	/// The firm quote moved against the trader beyond tolerance.
	#[error("slippage check failed: quoted {quoted} versus bound {bound}")]
	SlippageExceeded { quoted: String, bound: String },
	/// The engine was assembled from unusable configuration.
	#[error("configuration error: {0}")]
	Configuration(String),
	#[error(transparent)]
	Validation(#[from] ValidationError),
	#[error(transparent)]
	Cache(#[from] CacheError),
	#[error(transparent)]
	Client(#[from] ClientError),
	#[error(transparent)]
	Filter(#[from] FilterError),
}
