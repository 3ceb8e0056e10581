//! Transaction preprocessing and slippage guard.
//!
//! Runs one trade attempt through its checks: blacklist gate, firm-quote
//! request, response validation, slippage bounds. Failures reject the
//! trade; RFQ and validation failures additionally restrict the maker,
//! unless the maker signals that the *user* is the problem, in which case
//! the trade origin is blacklisted instead.

use crate::error::EngineError;
use alloy_primitives::U256;
use bigdecimal::{BigDecimal, RoundingMode};
use rfq_client::MakerApi;
use rfq_filter::MakerFilter;
use rfq_types::{
	FirmQuoteRequest, FirmQuoteResponse, Pair, PreparedTrade, QuoteData, SignedOrder,
	TradeParams, TradeSide, TAKER_RFQ_TYPE,
};
use rfq_validation::{validate_firm_quote, validate_signed_order, ValidationError};
use std::str::FromStr;
use std::sync::Arc;
use tracing::{debug, warn};

/// Marker a maker embeds in a failure message when the trade origin, not
/// the maker, caused the rejection.
const USER_RESTRICTED_MARKER: &str = "user is restricted";

/// Prepares trades for execution against a chosen maker.
pub struct PreprocessService {
	client: Arc<dyn MakerApi>,
	filter: Arc<MakerFilter>,
	network_id: u64,
	approved_takers: Vec<String>,
}

impl PreprocessService {
	pub fn new(
		client: Arc<dyn MakerApi>,
		filter: Arc<MakerFilter>,
		network_id: u64,
		approved_takers: Vec<String>,
	) -> Self {
		Self {
			client,
			filter,
			network_id,
			approved_takers,
		}
	}

	/// Requests and validates a firm quote for the trade, enforcing the
	/// slippage bounds, and returns the enriched trade data.
	pub async fn preprocess(&self, trade: &TradeParams) -> Result<PreparedTrade, EngineError> {
		if self.filter.is_blacklisted(&trade.tx_origin).await? {
			return Err(EngineError::UserBlacklisted);
		}

		let pair = Pair::normalized(&trade.src_token, &trade.dest_token)
			.map_err(|e| ValidationError::new("srcToken/destToken", e.to_string()))?;

		let request = self.firm_quote_request(trade, &pair);
		let payload = match self.client.request_firm_quote(&request).await {
			Ok(payload) => payload,
			Err(err) => {
				// timeouts and transport failures count against the maker
				self.restrict_maker(&trade.maker).await;
				return Err(EngineError::Rfq(err.to_string()));
			}
		};

		let response = match validate_firm_quote(&payload) {
			Ok(response) => response,
			Err(err) => {
				self.restrict_maker(&trade.maker).await;
				return Err(EngineError::Validation(err));
			}
		};

		let (quote, signature) = match self.check_response(&response, &pair) {
			Ok(accepted) => accepted,
			Err(err) => {
				if user_restricted(&response) {
					if let Err(err) = self.filter.blacklist(&trade.tx_origin).await {
						warn!(%err, "failed to blacklist trade origin");
					}
				} else {
					self.restrict_maker(&trade.maker).await;
				}
				return Err(err);
			}
		};

		let base_amount = U256::from_str_radix(&quote.base_token_amount, 10).unwrap_or_default();
		let quote_amount =
			U256::from_str_radix(&quote.quote_token_amount, 10).unwrap_or_default();

		if let Err(err) = check_slippage(trade, base_amount, quote_amount) {
			self.restrict_maker(&trade.maker).await;
			return Err(err);
		}

		debug!(maker = %trade.maker, pool = %quote.pool, "firm quote accepted");
		Ok(PreparedTrade {
			pool: quote.pool,
			signature,
			base_token_amount: base_amount,
			quote_token_amount: quote_amount,
			nonce: quote.nonce,
			tx_id: quote.tx_id,
			deadline: quote_deadline(quote.quote_expiry),
		})
	}

	/// Validates a maker-signed order against the approved-taker list.
	///
	/// Separate from the firm-quote path: the outer framework calls this
	/// before trusting any standalone order payload for on-chain execution.
	pub fn validate_order(
		&self,
		payload: &serde_json::Value,
	) -> Result<SignedOrder, EngineError> {
		Ok(validate_signed_order(payload, &self.approved_takers)?)
	}

	fn firm_quote_request(&self, trade: &TradeParams, pair: &Pair) -> FirmQuoteRequest {
		let (base_token_amount, quote_token_amount) = match trade.side {
			TradeSide::Sell => (Some(trade.src_amount.to_string()), None),
			TradeSide::Buy => (None, Some(trade.dest_amount.to_string())),
		};
		FirmQuoteRequest {
			network_id: self.network_id,
			market_maker: trade.maker.clone(),
			base_token: pair.base.clone(),
			quote_token: pair.quote.clone(),
			base_token_amount,
			quote_token_amount,
			trader: trade.tx_origin.to_lowercase(),
			effective_trader: trade.receiver.as_ref().map(|r| r.to_lowercase()),
		}
	}

	/// Shape and cross-field checks on a validated firm-quote response.
	fn check_response(
		&self,
		response: &FirmQuoteResponse,
		pair: &Pair,
	) -> Result<(QuoteData, String), EngineError> {
		if !response.is_success() {
			let reason = response.error.as_deref().unwrap_or("no reason given");
			return Err(EngineError::Rfq(format!("maker declined: {}", reason)));
		}
		if response.rfq_type != Some(TAKER_RFQ_TYPE) {
			return Err(EngineError::Rfq("unexpected rfq type".to_string()));
		}
		let (quote, signature) = match (&response.quote_data, &response.signature) {
			(Some(quote), Some(signature)) if response.gas_estimate.is_some() => {
				(quote, signature)
			}
			_ => {
				return Err(EngineError::Rfq(
					"firm quote is missing quote data, signature or gas estimate".to_string(),
				));
			}
		};
		if quote.base_token != pair.base || quote.quote_token != pair.quote {
			return Err(EngineError::Rfq(
				"firm quote tokens do not match the request".to_string(),
			));
		}
		Ok((quote.clone(), signature.clone()))
	}

	async fn restrict_maker(&self, maker: &str) {
		// best-effort: the trade is already failing for its own reason
		if let Err(err) = self.filter.restrict(maker).await {
			warn!(maker, %err, "failed to restrict maker");
		}
	}
}

fn user_restricted(response: &FirmQuoteResponse) -> bool {
	response
		.error
		.as_deref()
		.map(|message| message.to_lowercase().contains(USER_RESTRICTED_MARKER))
		.unwrap_or(false)
}

/// Direction-dependent slippage bounds.
///
/// Fixed input: the quoted output must reach `dest_amount * factor`.
/// Fixed output: the quoted output must cover `dest_amount` in full and the
/// quoted input must not exceed `src_amount * factor`.
fn check_slippage(
	trade: &TradeParams,
	base_amount: U256,
	quote_amount: U256,
) -> Result<(), EngineError> {
	let quoted_out = to_decimal(quote_amount);
	match trade.side {
		TradeSide::Sell => {
			let required = to_decimal(trade.dest_amount) * &trade.slippage_factor;
			if quoted_out < required {
				return Err(slippage_error(quote_amount, &required));
			}
		}
		TradeSide::Buy => {
			let dest = to_decimal(trade.dest_amount);
			if quoted_out < dest {
				return Err(slippage_error(quote_amount, &dest));
			}
			let limit = to_decimal(trade.src_amount) * &trade.slippage_factor;
			if to_decimal(base_amount) > limit {
				return Err(slippage_error(base_amount, &limit));
			}
		}
	}
	Ok(())
}

fn slippage_error(quoted: U256, bound: &BigDecimal) -> EngineError {
	EngineError::SlippageExceeded {
		quoted: quoted.to_string(),
		bound: bound.with_scale_round(0, RoundingMode::Down).to_string(),
	}
}

fn to_decimal(amount: U256) -> BigDecimal {
	BigDecimal::from_str(&amount.to_string()).unwrap_or_default()
}

fn quote_deadline(expiry: u64) -> u64 {
	// zero or absent expiry means the quote never expires
	if expiry == 0 {
		u64::MAX
	} else {
		expiry
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn sell_trade(dest_amount: u64, factor: &str) -> TradeParams {
		TradeParams {
			src_token: "0xaa00000000000000000000000000000000000001".to_string(),
			dest_token: "0xaa00000000000000000000000000000000000002".to_string(),
			src_amount: U256::from(100u64),
			dest_amount: U256::from(dest_amount),
			side: TradeSide::Sell,
			maker: "mm1".to_string(),
			tx_origin: "0xaa00000000000000000000000000000000000003".to_string(),
			receiver: None,
			slippage_factor: BigDecimal::from_str(factor).unwrap(),
		}
	}

	#[test]
	fn sell_rejects_below_the_slippage_bound() {
		let trade = sell_trade(100, "0.99");
		let err = check_slippage(&trade, U256::from(100u64), U256::from(98u64)).unwrap_err();
		assert!(matches!(err, EngineError::SlippageExceeded { .. }));
	}

	#[test]
	fn sell_accepts_at_the_slippage_bound() {
		let trade = sell_trade(100, "0.99");
		assert!(check_slippage(&trade, U256::from(100u64), U256::from(99u64)).is_ok());
	}

	#[test]
	fn buy_requires_full_output_and_bounded_input() {
		let mut trade = sell_trade(100, "1.01");
		trade.side = TradeSide::Buy;

		// short output
		assert!(check_slippage(&trade, U256::from(100u64), U256::from(99u64)).is_err());
		// input above src * factor
		assert!(check_slippage(&trade, U256::from(102u64), U256::from(100u64)).is_err());
		// both bounds satisfied
		assert!(check_slippage(&trade, U256::from(101u64), U256::from(100u64)).is_ok());
	}

	#[test]
	fn zero_expiry_means_unbounded_deadline() {
		assert_eq!(quote_deadline(0), u64::MAX);
		assert_eq!(quote_deadline(1700000000), 1700000000);
	}

	#[test]
	fn user_restriction_marker_is_detected() {
		let response = FirmQuoteResponse {
			status: "fail".to_string(),
			rfq_type: None,
			quote_data: None,
			signature: None,
			gas_estimate: None,
			error: Some("User is restricted from trading".to_string()),
		};
		assert!(user_restricted(&response));

		let response = FirmQuoteResponse {
			error: Some("no liquidity".to_string()),
			..response
		};
		assert!(!user_restricted(&response));
	}
}
