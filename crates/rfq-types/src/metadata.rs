//! Token metadata lookup.

use std::collections::HashMap;

/// Resolves a token address to its decimal count.
///
/// Unknown tokens resolve to zero decimals. That is a documented limitation
/// of the integration, not an error: pricing then treats the token's base
/// units as whole units.
pub trait TokenMetadata: Send + Sync {
	fn decimals(&self, token: &str) -> u8;
}

/// Metadata backed by a static map, typically loaded from configuration.
#[derive(Debug, Default)]
pub struct StaticTokenMetadata {
	decimals: HashMap<String, u8>,
}

impl StaticTokenMetadata {
	/// Builds the provider, lower-casing the configured addresses so lookups
	/// match normalized tokens.
	pub fn new(decimals: HashMap<String, u8>) -> Self {
		Self {
			decimals: decimals
				.into_iter()
				.map(|(token, d)| (token.to_lowercase(), d))
				.collect(),
		}
	}
}

impl TokenMetadata for StaticTokenMetadata {
	fn decimals(&self, token: &str) -> u8 {
		self.decimals.get(token).copied().unwrap_or(0)
	}
}
