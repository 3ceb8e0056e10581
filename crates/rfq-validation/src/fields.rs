//! Semantic field parsers.
//!
//! Phase two of validation: string-encoded numerics and addresses are
//! parsed into their typed forms. Parsing doubles as the check, so a value
//! that makes it through is usable as-is.

use crate::ValidationError;
use alloy_primitives::U256;
use bigdecimal::BigDecimal;
use rfq_types::address::{normalize_address, normalize_token_address};
use std::str::FromStr;

/// Parses a decimal string, rejecting anything that does not encode a
/// finite number.
pub fn parse_decimal(path: &str, raw: &str) -> Result<BigDecimal, ValidationError> {
	BigDecimal::from_str(raw.trim())
		.map_err(|_| ValidationError::new(path, format!("`{}` is not a decimal number", raw)))
}

/// Parses a non-negative big-integer amount.
pub fn parse_amount(path: &str, raw: &str) -> Result<U256, ValidationError> {
	U256::from_str_radix(raw.trim(), 10).map_err(|_| {
		ValidationError::new(
			path,
			format!("`{}` is not a non-negative integer amount", raw),
		)
	})
}

/// Validates a plain account/contract address and returns it lower-cased.
pub fn parse_address(path: &str, raw: &str) -> Result<String, ValidationError> {
	normalize_address(raw).map_err(|e| ValidationError::new(path, e.to_string()))
}

/// Validates a token address, additionally mapping the native-asset
/// sentinel to the zero address.
pub fn parse_token_address(path: &str, raw: &str) -> Result<String, ValidationError> {
	normalize_token_address(raw).map_err(|e| ValidationError::new(path, e.to_string()))
}

/// Requires a `0x`-prefixed hex string.
pub fn require_hex(path: &str, raw: &str) -> Result<(), ValidationError> {
	let digits = raw
		.strip_prefix("0x")
		.ok_or_else(|| ValidationError::new(path, "hex field is missing the 0x prefix"))?;
	if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_hexdigit()) {
		return Err(ValidationError::new(path, "hex field contains non-hex characters"));
	}
	Ok(())
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn decimal_parsing_rejects_nan_strings() {
		assert!(parse_decimal("p", "1.25").is_ok());
		assert!(parse_decimal("p", "NaN").is_err());
		assert!(parse_decimal("p", "1.2.3").is_err());
		assert!(parse_decimal("p", "").is_err());
	}

	#[test]
	fn amounts_must_be_non_negative_integers() {
		assert_eq!(parse_amount("p", "42").unwrap(), U256::from(42u64));
		assert!(parse_amount("p", "-1").is_err());
		assert!(parse_amount("p", "1.5").is_err());
	}

	#[test]
	fn hex_fields_need_the_prefix() {
		assert!(require_hex("p", "0xdeadbeef").is_ok());
		assert!(require_hex("p", "deadbeef").is_err());
		assert!(require_hex("p", "0xzz").is_err());
		assert!(require_hex("p", "0x").is_err());
	}
}
