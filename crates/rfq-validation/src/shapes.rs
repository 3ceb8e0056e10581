//! Validators for the five maker payload shapes.
//!
//! Each validator runs the structural schema first, then the semantic
//! rules, and hands back fully typed, normalized data. The engine never
//! looks at a raw payload directly.

use crate::fields::{
	parse_address, parse_amount, parse_decimal, parse_token_address, require_hex,
};
use crate::schema::{Field, FieldType, Schema};
use crate::ValidationError;
use bigdecimal::{BigDecimal, One, Zero};
use rfq_types::{FirmQuoteResponse, Pair, PairLevels, PriceLevel, QuoteData, SignedOrder};
use serde_json::Value;
use std::collections::HashMap;

fn str_field<'a>(value: &'a Value, name: &str) -> &'a str {
	value.get(name).and_then(Value::as_str).unwrap_or_default()
}

fn opt_str_field<'a>(value: &'a Value, name: &str) -> Option<&'a str> {
	value.get(name).and_then(Value::as_str)
}

fn u64_field(value: &Value, name: &str) -> u64 {
	value.get(name).and_then(Value::as_u64).unwrap_or_default()
}

fn array_field<'a>(value: &'a Value, name: &str) -> &'a [Value] {
	value
		.get(name)
		.and_then(Value::as_array)
		.map(Vec::as_slice)
		.unwrap_or_default()
}

fn pair_schema() -> Schema {
	Schema::new(vec![
		Field::required("baseToken", FieldType::String),
		Field::required("quoteToken", FieldType::String),
	])
}

fn normalized_pair(value: &Value, path: &str) -> Result<Pair, ValidationError> {
	let base = parse_token_address(
		&format!("{}.baseToken", path),
		str_field(value, "baseToken"),
	)?;
	let quote = parse_token_address(
		&format!("{}.quoteToken", path),
		str_field(value, "quoteToken"),
	)?;
	if base == quote {
		return Err(ValidationError::new(path, "pair has identical tokens"));
	}
	Ok(Pair::new(base, quote))
}

/// Validates the token directory and returns decimals keyed by normalized
/// address.
pub fn validate_tokens(payload: &Value) -> Result<HashMap<String, u8>, ValidationError> {
	let schema = Schema::new(vec![Field::required(
		"tokens",
		FieldType::Array(Box::new(FieldType::Object(Schema::new(vec![
			Field::required("address", FieldType::String),
			Field::required("decimals", FieldType::Integer),
			Field::optional("symbol", FieldType::String),
		])))),
	)]);
	schema.validate(payload, "")?;

	let mut decimals_by_token = HashMap::new();
	for (i, token) in array_field(payload, "tokens").iter().enumerate() {
		let path = format!("tokens[{}]", i);
		let address = parse_token_address(
			&format!("{}.address", path),
			str_field(token, "address"),
		)?;
		let decimals = u64_field(token, "decimals");
		if decimals > u64::from(u8::MAX) {
			return Err(ValidationError::new(
				format!("{}.decimals", path),
				"decimals out of range",
			));
		}
		decimals_by_token.insert(address, decimals as u8);
	}
	Ok(decimals_by_token)
}

/// Validates the pair directory.
pub fn validate_pairs(payload: &Value) -> Result<Vec<Pair>, ValidationError> {
	let schema = Schema::new(vec![Field::required(
		"pairs",
		FieldType::Array(Box::new(FieldType::Object(pair_schema()))),
	)]);
	schema.validate(payload, "")?;

	array_field(payload, "pairs")
		.iter()
		.enumerate()
		.map(|(i, pair)| normalized_pair(pair, &format!("pairs[{}]", i)))
		.collect()
}

/// Validates a maker-published blacklist of trade-origin addresses.
pub fn validate_blacklist(payload: &Value) -> Result<Vec<String>, ValidationError> {
	let schema = Schema::new(vec![Field::required(
		"blacklist",
		FieldType::Array(Box::new(FieldType::String)),
	)]);
	schema.validate(payload, "")?;

	array_field(payload, "blacklist")
		.iter()
		.enumerate()
		.map(|(i, address)| {
			parse_address(
				&format!("blacklist[{}]", i),
				address.as_str().unwrap_or_default(),
			)
		})
		.collect()
}

/// Validates a maker's price-level response and expands it into ordered
/// pair ladders.
///
/// Each book entry yields up to two ladders: the bid side prices the pair
/// in its published orientation, the ask side is flipped so that the
/// trader's input asset is always the ladder's base coordinate. A crossed
/// book (max bid not strictly below min ask) fails the response.
pub fn validate_price_levels(payload: &Value) -> Result<Vec<PairLevels>, ValidationError> {
	fn book_side() -> FieldType {
		FieldType::Array(Box::new(FieldType::Array(Box::new(FieldType::String))))
	}
	let schema = Schema::new(vec![Field::required(
		"levels",
		FieldType::Array(Box::new(FieldType::Object(Schema::new(vec![
			Field::required("pair", FieldType::Object(pair_schema())),
			Field::optional("bids", book_side()),
			Field::optional("asks", book_side()),
		])))),
	)]);
	schema.validate(payload, "")?;

	let mut ladders = Vec::new();
	for (i, entry) in array_field(payload, "levels").iter().enumerate() {
		let path = format!("levels[{}]", i);
		let pair = normalized_pair(
			entry.get("pair").unwrap_or(&Value::Null),
			&format!("{}.pair", path),
		)?;

		let bids = parse_book_side(&format!("{}.bids", path), entry.get("bids"))?;
		let asks = parse_book_side(&format!("{}.asks", path), entry.get("asks"))?;

		let max_bid = bids.iter().map(|(price, _)| price).max();
		let min_ask = asks.iter().map(|(price, _)| price).min();
		if let (Some(max_bid), Some(min_ask)) = (max_bid, min_ask) {
			if max_bid >= min_ask {
				return Err(ValidationError::new(
					path,
					format!("crossed book: bid {} >= ask {}", max_bid, min_ask),
				));
			}
		}

		if !bids.is_empty() {
			ladders.push(PairLevels {
				pair: pair.clone(),
				levels: cumulative_ladder(&bids),
			});
		}
		if !asks.is_empty() {
			ladders.push(PairLevels {
				pair: pair.flipped(),
				levels: inverted_ladder(&asks),
			});
		}
	}
	Ok(ladders)
}

fn parse_book_side(
	path: &str,
	value: Option<&Value>,
) -> Result<Vec<(BigDecimal, BigDecimal)>, ValidationError> {
	let entries = match value.and_then(Value::as_array) {
		Some(entries) => entries,
		None => return Ok(Vec::new()),
	};

	let mut side = Vec::with_capacity(entries.len());
	for (i, entry) in entries.iter().enumerate() {
		let entry_path = format!("{}[{}]", path, i);
		let fields = entry.as_array().map(Vec::as_slice).unwrap_or_default();
		if fields.len() != 2 {
			return Err(ValidationError::new(entry_path, "expected [price, size]"));
		}
		let price = parse_decimal(
			&format!("{}[0]", entry_path),
			fields[0].as_str().unwrap_or_default(),
		)?;
		let size = parse_decimal(
			&format!("{}[1]", entry_path),
			fields[1].as_str().unwrap_or_default(),
		)?;
		if price <= BigDecimal::zero() {
			return Err(ValidationError::new(
				format!("{}[0]", entry_path),
				"price must be positive",
			));
		}
		if size <= BigDecimal::zero() {
			return Err(ValidationError::new(
				format!("{}[1]", entry_path),
				"size must be positive",
			));
		}
		side.push((price, size));
	}
	Ok(side)
}

/// Marginal `(price, size)` entries to a cumulative-size ladder.
fn cumulative_ladder(side: &[(BigDecimal, BigDecimal)]) -> Vec<PriceLevel> {
	let mut cumulative = BigDecimal::zero();
	let mut levels = Vec::with_capacity(side.len());
	for (price, size) in side {
		cumulative += size;
		levels.push(PriceLevel::new(cumulative.to_string(), price.to_string()));
	}
	levels
}

/// Ask entries to a ladder for the flipped pair: the cumulative coordinate
/// becomes the quote amount spent and the marginal price its reciprocal.
fn inverted_ladder(side: &[(BigDecimal, BigDecimal)]) -> Vec<PriceLevel> {
	let one = BigDecimal::one();
	let mut cumulative = BigDecimal::zero();
	let mut levels = Vec::with_capacity(side.len());
	for (price, size) in side {
		cumulative += price * size;
		levels.push(PriceLevel::new(
			cumulative.to_string(),
			(&one / price).to_string(),
		));
	}
	levels
}

/// Validates a firm-quote response.
///
/// Presence of the quote payload, signature and gas estimate is enforced by
/// the preprocessing step; here each field is checked only when present, so
/// failure responses with absent optional fields validate cleanly.
pub fn validate_firm_quote(payload: &Value) -> Result<FirmQuoteResponse, ValidationError> {
	let schema = Schema::new(vec![
		Field::required("status", FieldType::String),
		Field::optional("rfqType", FieldType::Integer),
		Field::optional(
			"quoteData",
			FieldType::Object(Schema::new(vec![
				Field::required("pool", FieldType::String),
				Field::required("baseToken", FieldType::String),
				Field::required("quoteToken", FieldType::String),
				Field::required("baseTokenAmount", FieldType::String),
				Field::required("quoteTokenAmount", FieldType::String),
				Field::optional("quoteExpiry", FieldType::Integer),
				Field::required("nonce", FieldType::String),
				Field::required("txId", FieldType::String),
			])),
		),
		Field::optional("signature", FieldType::String),
		Field::optional("gasEstimate", FieldType::String),
		Field::optional("error", FieldType::String),
	]);
	schema.validate(payload, "")?;

	let rfq_type = match payload.get("rfqType").and_then(Value::as_u64) {
		Some(value) if value > u64::from(u8::MAX) => {
			return Err(ValidationError::new("rfqType", "rfq type out of range"));
		}
		Some(value) => Some(value as u8),
		None => None,
	};

	let quote_data = match payload.get("quoteData").filter(|v| !v.is_null()) {
		Some(data) => {
			parse_amount(
				"quoteData.baseTokenAmount",
				str_field(data, "baseTokenAmount"),
			)?;
			parse_amount(
				"quoteData.quoteTokenAmount",
				str_field(data, "quoteTokenAmount"),
			)?;
			parse_amount("quoteData.nonce", str_field(data, "nonce"))?;
			require_hex("quoteData.txId", str_field(data, "txId"))?;
			Some(QuoteData {
				pool: parse_address("quoteData.pool", str_field(data, "pool"))?,
				base_token: parse_token_address(
					"quoteData.baseToken",
					str_field(data, "baseToken"),
				)?,
				quote_token: parse_token_address(
					"quoteData.quoteToken",
					str_field(data, "quoteToken"),
				)?,
				base_token_amount: str_field(data, "baseTokenAmount").to_string(),
				quote_token_amount: str_field(data, "quoteTokenAmount").to_string(),
				quote_expiry: u64_field(data, "quoteExpiry"),
				nonce: str_field(data, "nonce").to_string(),
				tx_id: str_field(data, "txId").to_string(),
			})
		}
		None => None,
	};

	if let Some(signature) = opt_str_field(payload, "signature") {
		require_hex("signature", signature)?;
	}
	if let Some(gas) = opt_str_field(payload, "gasEstimate") {
		parse_amount("gasEstimate", gas)?;
	}

	Ok(FirmQuoteResponse {
		status: str_field(payload, "status").to_string(),
		rfq_type,
		quote_data,
		signature: opt_str_field(payload, "signature").map(str::to_string),
		gas_estimate: opt_str_field(payload, "gasEstimate").map(str::to_string),
		error: opt_str_field(payload, "error").map(str::to_string),
	})
}

/// Validates a maker-signed order.
///
/// The taker must be one of the approved router contracts; an otherwise
/// well-formed order with a foreign taker is rejected.
pub fn validate_signed_order(
	payload: &Value,
	approved_takers: &[String],
) -> Result<SignedOrder, ValidationError> {
	let schema = Schema::new(vec![
		Field::required("maker", FieldType::String),
		Field::required("taker", FieldType::String),
		Field::required("baseToken", FieldType::String),
		Field::required("quoteToken", FieldType::String),
		Field::required("baseTokenAmount", FieldType::String),
		Field::required("quoteTokenAmount", FieldType::String),
		Field::required("expiry", FieldType::Integer),
		Field::required("nonceAndMeta", FieldType::String),
		Field::required("signature", FieldType::String),
	]);
	schema.validate(payload, "")?;

	let taker = parse_address("taker", str_field(payload, "taker"))?;
	if !approved_takers
		.iter()
		.any(|approved| approved.eq_ignore_ascii_case(&taker))
	{
		return Err(ValidationError::new("taker", "taker is not an approved router"));
	}

	parse_amount("baseTokenAmount", str_field(payload, "baseTokenAmount"))?;
	parse_amount("quoteTokenAmount", str_field(payload, "quoteTokenAmount"))?;
	parse_amount("nonceAndMeta", str_field(payload, "nonceAndMeta"))?;
	require_hex("signature", str_field(payload, "signature"))?;

	Ok(SignedOrder {
		maker: parse_address("maker", str_field(payload, "maker"))?,
		taker,
		base_token: parse_token_address("baseToken", str_field(payload, "baseToken"))?,
		quote_token: parse_token_address("quoteToken", str_field(payload, "quoteToken"))?,
		base_token_amount: str_field(payload, "baseTokenAmount").to_string(),
		quote_token_amount: str_field(payload, "quoteTokenAmount").to_string(),
		expiry: u64_field(payload, "expiry"),
		nonce_and_meta: str_field(payload, "nonceAndMeta").to_string(),
		signature: str_field(payload, "signature").to_string(),
	})
}
