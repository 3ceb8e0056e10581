//! Cache key layout shared across components.

/// Scoped hash holding `maker id -> restriction timestamp (epoch ms)`.
pub const RESTRICTED_MAKERS: &str = "restricted_mms";

/// Scoped key holding the serialized maker level snapshot.
pub const LEVEL_SNAPSHOT: &str = "levels";

/// Sentinel value stored under blacklist keys.
pub const BLACKLIST_SENTINEL: &str = "blacklisted";

/// Global key guarding a blacklisted trade-origin address.
pub fn blacklist_key(address: &str) -> String {
	format!("blacklist_{}", address.to_lowercase())
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn blacklist_key_is_lower_cased() {
		assert_eq!(
			blacklist_key("0xA0b86991C6218b36c1d19D4a2e9Eb0cE3606eB48"),
			"blacklist_0xa0b86991c6218b36c1d19d4a2e9eb0ce3606eb48"
		);
	}
}
