//! Firm-quote request and response types.

use serde::{Deserialize, Serialize};

/// Response status a maker reports for a successful firm quote.
pub const QUOTE_STATUS_SUCCESS: &str = "success";

/// The RFQ type this engine trades: taker-side firm quotes.
pub const TAKER_RFQ_TYPE: u8 = 0;

/// Parameters for requesting a firm quote from one maker.
///
/// Exactly one of the two amount fields is set, mirroring the curve query
/// semantics: sells fix the base amount, buys fix the quote amount.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FirmQuoteRequest {
	pub network_id: u64,
	pub market_maker: String,
	pub base_token: String,
	pub quote_token: String,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub base_token_amount: Option<String>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub quote_token_amount: Option<String>,
	/// The address the swap transaction originates from.
	pub trader: String,
	/// The account ultimately receiving the swap, when different.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub effective_trader: Option<String>,
}

/// The signed commitment inside a successful firm-quote response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuoteData {
	pub pool: String,
	pub base_token: String,
	pub quote_token: String,
	pub base_token_amount: String,
	pub quote_token_amount: String,
	/// Unix seconds; zero means the quote never expires.
	pub quote_expiry: u64,
	pub nonce: String,
	pub tx_id: String,
}

/// A maker's answer to a firm-quote request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FirmQuoteResponse {
	pub status: String,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub rfq_type: Option<u8>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub quote_data: Option<QuoteData>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub signature: Option<String>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub gas_estimate: Option<String>,
	/// Failure reason reported by the maker, if any.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub error: Option<String>,
}

impl FirmQuoteResponse {
	pub fn is_success(&self) -> bool {
		self.status == QUOTE_STATUS_SUCCESS
	}
}
