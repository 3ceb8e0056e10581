//! Validation pipeline for inbound maker payloads.
//!
//! Nothing a market maker sends is trusted until it has passed through this
//! crate. Validation is two-phase: a structural pass checks types and
//! required fields against a declarative schema, then a semantic pass
//! parses numeric strings, normalizes addresses and enforces the domain
//! invariants (uncrossed books, non-negative amounts, approved takers).
//! Errors carry the offending field path and a human-readable reason.

use thiserror::Error;

pub mod fields;
pub mod schema;
pub mod shapes;

pub use schema::{Field, FieldType, Schema};
pub use shapes::*;

/// A payload failed validation.
///
/// Never fatal to the process; the caller decides whether to drop the
/// payload, the maker, or the whole request.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("invalid field `{path}`: {reason}")]
pub struct ValidationError {
	/// Dotted path of the offending field, e.g. `levels[2].bids[0]`.
	pub path: String,
	/// What went wrong.
	pub reason: String,
}

impl ValidationError {
	pub fn new(path: impl Into<String>, reason: impl Into<String>) -> Self {
		Self {
			path: path.into(),
			reason: reason.into(),
		}
	}
}
