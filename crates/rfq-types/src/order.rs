//! Maker-signed order payloads.

use serde::{Deserialize, Serialize};

/// An order signed by a market maker, ready for on-chain settlement.
///
/// Validated once on receipt and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignedOrder {
	pub maker: String,
	/// Must be one of the trusted router contracts; anything else is
	/// rejected even when the order is otherwise well-formed.
	pub taker: String,
	pub base_token: String,
	pub quote_token: String,
	pub base_token_amount: String,
	pub quote_token_amount: String,
	/// Unix seconds; zero means no expiry.
	pub expiry: u64,
	/// Nonce with packed routing metadata, as a decimal string.
	pub nonce_and_meta: String,
	pub signature: String,
}
