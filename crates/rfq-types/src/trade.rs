//! Trade preprocessing inputs and outputs.

use crate::side::TradeSide;
use alloy_primitives::U256;
use bigdecimal::BigDecimal;
use serde::{Deserialize, Serialize};

/// A trade the outer framework wants to execute against a chosen maker.
#[derive(Debug, Clone)]
pub struct TradeParams {
	pub src_token: String,
	pub dest_token: String,
	pub src_amount: U256,
	pub dest_amount: U256,
	pub side: TradeSide,
	/// Maker id recovered from the winning pool identifier.
	pub maker: String,
	/// Address the swap transaction originates from.
	pub tx_origin: String,
	/// Account receiving the swap when different from the origin.
	pub receiver: Option<String>,
	/// Tolerance multiplier applied to the quoted amounts; below 1 for
	/// fixed-input trades, above 1 for fixed-output trades.
	pub slippage_factor: BigDecimal,
}

/// The enriched trade data attached after a firm quote is accepted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PreparedTrade {
	pub pool: String,
	pub signature: String,
	pub base_token_amount: U256,
	pub quote_token_amount: U256,
	pub nonce: String,
	pub tx_id: String,
	/// Unix seconds the quote stays executable; `u64::MAX` for quotes
	/// without an expiry.
	pub deadline: u64,
}
