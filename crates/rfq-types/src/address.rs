//! Token address normalization.
//!
//! All addresses entering the engine are validated against the standard
//! 20-byte hex format and normalized to lower case. The network's
//! native-asset sentinel is mapped to the zero address, which is how the
//! RFQ protocol distinguishes native-asset trades.

use alloy_primitives::Address;
use std::str::FromStr;
use thiserror::Error;

/// Sentinel address makers use for the chain's native asset.
pub const NATIVE_TOKEN_SENTINEL: &str = "0xeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeee";

/// Canonical representation of the native asset inside the engine.
pub const ZERO_ADDRESS: &str = "0x0000000000000000000000000000000000000000";

/// Errors produced while normalizing an address.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AddressError {
	/// The address is missing the conventional `0x` prefix.
	#[error("address is missing the 0x prefix: {0}")]
	MissingPrefix(String),
	/// The address is not 20 bytes of valid hex.
	#[error("malformed address: {0}")]
	Malformed(String),
}

/// Validates an address and returns it lower-cased.
///
/// Accepts any mix of upper and lower case hex; rejects anything that is
/// not a `0x`-prefixed 20-byte hex string.
pub fn normalize_address(raw: &str) -> Result<String, AddressError> {
	if !raw.starts_with("0x") {
		return Err(AddressError::MissingPrefix(raw.to_string()));
	}
	let parsed =
		Address::from_str(raw).map_err(|_| AddressError::Malformed(raw.to_string()))?;
	Ok(format!("0x{}", hex::encode(parsed.as_slice())))
}

/// Normalizes a token address, mapping the native-asset sentinel to the
/// zero address.
pub fn normalize_token_address(raw: &str) -> Result<String, AddressError> {
	let lower = normalize_address(raw)?;
	if lower == NATIVE_TOKEN_SENTINEL {
		Ok(ZERO_ADDRESS.to_string())
	} else {
		Ok(lower)
	}
}

/// Returns true when `raw` is a well-formed 20-byte hex address.
pub fn is_valid_address(raw: &str) -> bool {
	normalize_address(raw).is_ok()
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn rejects_malformed_address() {
		assert!(normalize_address("0xZZZ").is_err());
		assert!(normalize_address("0x1234").is_err());
		assert!(!is_valid_address("not-an-address"));
	}

	#[test]
	fn rejects_missing_prefix() {
		let err = normalize_address("a0b86991c6218b36c1d19d4a2e9eb0ce3606eb48").unwrap_err();
		assert!(matches!(err, AddressError::MissingPrefix(_)));
	}

	#[test]
	fn lower_cases_checksummed_address() {
		let normalized = normalize_address("0xA0b86991c6218b36c1d19D4a2e9Eb0cE3606eB48").unwrap();
		assert_eq!(normalized, "0xa0b86991c6218b36c1d19d4a2e9eb0ce3606eb48");
	}

	#[test]
	fn maps_native_sentinel_to_zero() {
		let normalized =
			normalize_token_address("0xEeeeeEeeeEeEeeEeEeEeeEEEeeeeEeeeeeeeEEeE").unwrap();
		assert_eq!(normalized, ZERO_ADDRESS);
	}
}
