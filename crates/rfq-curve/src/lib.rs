//! Price-level curve model.
//!
//! Turns a maker's ladder of `(cumulative size, marginal price)` tiers into
//! executable amounts for arbitrary trade sizes by walking the ladder and
//! interpolating linearly inside the tier that covers the request. Pure
//! computation, no I/O.
//!
//! All arithmetic runs in arbitrary-precision decimals; integer base-unit
//! conversion truncates toward zero as the very last step.

use alloy_primitives::U256;
use bigdecimal::{BigDecimal, RoundingMode, Zero};
use num_bigint::{BigInt, Sign};
use rfq_types::{PriceLevel, TradeSide};
use std::str::FromStr;

/// A ladder tier with parsed numerics.
struct ParsedLevel {
	size: BigDecimal,
	price: BigDecimal,
}

/// Parses a ladder, anchoring it at the origin.
///
/// When the first published tier has nonzero size, a synthetic zero-size
/// level carrying that tier's price is inserted so curve walking starts
/// at `(0, 0)`. Unparseable numerics make the whole ladder unquotable.
fn parse_levels(levels: &[PriceLevel]) -> Option<Vec<ParsedLevel>> {
	let mut parsed = Vec::with_capacity(levels.len() + 1);
	for level in levels {
		let size = BigDecimal::from_str(&level.level).ok()?;
		let price = BigDecimal::from_str(&level.price).ok()?;
		parsed.push(ParsedLevel { size, price });
	}
	if let Some(first) = parsed.first() {
		if !first.size.is_zero() {
			let origin = ParsedLevel {
				size: BigDecimal::zero(),
				price: first.price.clone(),
			};
			parsed.insert(0, origin);
		}
	}
	Some(parsed)
}

/// Which of the two curve coordinates a request fixes.
enum Request {
	Base,
	Quote,
}

/// Evaluates the ladder for a single request.
///
/// Exactly one of `base_amount` / `quote_amount` must be set; anything else
/// is answered with `None`, which callers treat as "no quote", not as a
/// failure. Requests beyond the deepest tier are unfillable: the curve is
/// never extrapolated past published depth.
pub fn quote_for_amount(
	levels: &[PriceLevel],
	base_amount: Option<&BigDecimal>,
	quote_amount: Option<&BigDecimal>,
) -> Option<BigDecimal> {
	match (base_amount, quote_amount) {
		(Some(base), None) => walk(levels, base, Request::Base),
		(None, Some(quote)) => walk(levels, quote, Request::Quote),
		_ => None,
	}
}

fn walk(levels: &[PriceLevel], requested: &BigDecimal, request: Request) -> Option<BigDecimal> {
	if requested.sign() == Sign::Minus {
		return None;
	}
	let ladder = parse_levels(levels)?;
	if ladder.is_empty() {
		return None;
	}
	if requested.is_zero() {
		return Some(BigDecimal::zero());
	}

	let mut filled_quote = BigDecimal::zero();
	for window in ladder.windows(2) {
		let (prev, tier) = (&window[0], &window[1]);
		let tier_base = &tier.size - &prev.size;
		// sizes must strictly increase and prices stay positive; a
		// malformed ladder is unquotable
		if tier_base.sign() != Sign::Plus || tier.price.sign() != Sign::Plus {
			return None;
		}
		let tier_quote = &tier_base * &tier.price;
		match request {
			Request::Base => {
				if requested <= &tier.size {
					return Some(&filled_quote + (requested - &prev.size) * &tier.price);
				}
			}
			Request::Quote => {
				let reach = &filled_quote + &tier_quote;
				if requested <= &reach {
					return Some(&prev.size + (requested - &filled_quote) / &tier.price);
				}
			}
		}
		filled_quote += tier_quote;
	}
	None
}

/// Evaluates the ladder for an ascending sequence of base-unit amounts.
///
/// Precondition: `amounts` is non-decreasing. Once one amount is
/// unfillable, every larger amount is marked unfillable (zero) without
/// walking the ladder again.
///
/// Sells fix the input (base) amount and price results in quote-token base
/// units; buys fix the output (quote) amount and price results in
/// base-token base units.
pub fn prices_for_amounts(
	amounts: &[U256],
	levels: &[PriceLevel],
	side: TradeSide,
	base_decimals: u8,
	quote_decimals: u8,
) -> Vec<U256> {
	let (input_decimals, output_decimals) = match side {
		TradeSide::Sell => (base_decimals, quote_decimals),
		TradeSide::Buy => (quote_decimals, base_decimals),
	};

	let mut outputs = Vec::with_capacity(amounts.len());
	let mut exhausted = false;
	for amount in amounts {
		if exhausted {
			outputs.push(U256::ZERO);
			continue;
		}
		let requested = from_base_units(*amount, input_decimals);
		let filled = match side {
			TradeSide::Sell => quote_for_amount(levels, Some(&requested), None),
			TradeSide::Buy => quote_for_amount(levels, None, Some(&requested)),
		};
		match filled {
			Some(filled) => outputs.push(to_base_units(&filled, output_decimals)),
			None => {
				exhausted = true;
				outputs.push(U256::ZERO);
			}
		}
	}
	outputs
}

/// Prices one whole input token through the ladder.
pub fn unit_price(
	levels: &[PriceLevel],
	side: TradeSide,
	base_decimals: u8,
	quote_decimals: u8,
) -> U256 {
	let input_decimals = match side {
		TradeSide::Sell => base_decimals,
		TradeSide::Buy => quote_decimals,
	};
	let one = U256::from(10u64).pow(U256::from(input_decimals));
	prices_for_amounts(&[one], levels, side, base_decimals, quote_decimals)
		.into_iter()
		.next()
		.unwrap_or(U256::ZERO)
}

/// Total published depth as `(base size, quote value)` in human units.
pub fn total_depth(levels: &[PriceLevel]) -> Option<(BigDecimal, BigDecimal)> {
	let ladder = parse_levels(levels)?;
	let deepest = ladder.last()?.size.clone();
	let quote = walk(levels, &deepest, Request::Base)?;
	Some((deepest, quote))
}

/// Scales a human-unit amount by the token's decimal power and truncates
/// toward zero.
pub fn to_base_units(amount: &BigDecimal, decimals: u8) -> U256 {
	let scaled = (amount * pow10(decimals)).with_scale_round(0, RoundingMode::Down);
	let (digits, _) = scaled.into_bigint_and_exponent();
	U256::from_str_radix(&digits.to_str_radix(10), 10).unwrap_or(U256::ZERO)
}

/// Converts integer base units into human units.
pub fn from_base_units(amount: U256, decimals: u8) -> BigDecimal {
	let digits = BigInt::from_str(&amount.to_string()).unwrap_or_default();
	BigDecimal::new(digits, i64::from(decimals))
}

fn pow10(decimals: u8) -> BigDecimal {
	BigDecimal::new(BigInt::from(1), -i64::from(decimals))
}
