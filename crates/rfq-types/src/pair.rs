//! Ordered token pairs.

use crate::address::{normalize_token_address, AddressError};
use serde::{Deserialize, Serialize};
use std::fmt;

/// An ordered token pair.
///
/// `base` is the asset the trader gives, `quote` is the asset the trader
/// receives. Both addresses are lower-cased and native-sentinel normalized.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Pair {
	#[serde(rename = "baseToken")]
	pub base: String,
	#[serde(rename = "quoteToken")]
	pub quote: String,
}

impl Pair {
	/// Builds a pair from already-normalized addresses.
	pub fn new(base: impl Into<String>, quote: impl Into<String>) -> Self {
		Self {
			base: base.into(),
			quote: quote.into(),
		}
	}

	/// Normalizes both addresses and builds the ordered pair.
	pub fn normalized(base: &str, quote: &str) -> Result<Self, AddressError> {
		Ok(Self {
			base: normalize_token_address(base)?,
			quote: normalize_token_address(quote)?,
		})
	}

	/// Stable lookup key for this ordered pair.
	pub fn key(&self) -> String {
		format!("{}_{}", self.base, self.quote)
	}

	/// The same pair traded in the opposite direction.
	pub fn flipped(&self) -> Pair {
		Pair {
			base: self.quote.clone(),
			quote: self.base.clone(),
		}
	}

	/// Returns true when either side of the pair is `token`.
	pub fn contains(&self, token: &str) -> bool {
		self.base == token || self.quote == token
	}
}

impl fmt::Display for Pair {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}/{}", self.base, self.quote)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn normalizes_both_sides() {
		let pair = Pair::normalized(
			"0xA0b86991c6218b36c1d19D4a2e9Eb0cE3606eB48",
			"0xEeeeeEeeeEeEeeEeEeEeeEEEeeeeEeeeeeeeEEeE",
		)
		.unwrap();
		assert_eq!(pair.base, "0xa0b86991c6218b36c1d19d4a2e9eb0ce3606eb48");
		assert_eq!(pair.quote, crate::address::ZERO_ADDRESS);
	}

	#[test]
	fn flipped_swaps_sides() {
		let pair = Pair::new("0xaa", "0xbb");
		let flipped = pair.flipped();
		assert_eq!(flipped.base, "0xbb");
		assert_eq!(flipped.quote, "0xaa");
		assert!(pair.contains("0xaa"));
		assert!(!pair.contains("0xcc"));
	}
}
