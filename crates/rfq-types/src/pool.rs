//! Synthetic pool identifiers.
//!
//! The engine exposes one virtual pool per (maker, ordered pair). The
//! identifier is a deterministic string that round-trips back to the maker
//! id, so a winning pool can be resolved to the maker to request a firm
//! quote from.

use crate::pair::Pair;
use bigdecimal::BigDecimal;
use serde::{Deserialize, Serialize};

/// Builds the pool identifier for a maker quoting an ordered pair.
pub fn pool_identifier(exchange: &str, network_id: u64, pair: &Pair, maker: &str) -> String {
	format!(
		"{}_{}_{}_{}_{}",
		exchange, network_id, pair.base, pair.quote, maker
	)
}

/// Recovers the maker id from a pool identifier.
///
/// The prefix is fully determined by `(exchange, network, pair)`, so the
/// maker id may contain arbitrary characters, including the separator.
pub fn maker_from_identifier(
	exchange: &str,
	network_id: u64,
	pair: &Pair,
	identifier: &str,
) -> Option<String> {
	let prefix = format!(
		"{}_{}_{}_{}_",
		exchange, network_id, pair.base, pair.quote
	);
	identifier
		.strip_prefix(&prefix)
		.filter(|maker| !maker.is_empty())
		.map(str::to_string)
}

/// A pool ranked by the depth a maker publishes for it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PoolLiquidity {
	pub identifier: String,
	pub maker: String,
	pub pair: Pair,
	/// Published depth expressed in units of the queried token.
	pub depth: BigDecimal,
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn identifier_round_trips_maker_id() {
		let pair = Pair::new("0xaa", "0xbb");
		let id = pool_identifier("rfqx", 43114, &pair, "mm_with_underscores");
		assert_eq!(
			maker_from_identifier("rfqx", 43114, &pair, &id).as_deref(),
			Some("mm_with_underscores")
		);
	}

	#[test]
	fn rejects_foreign_identifier() {
		let pair = Pair::new("0xaa", "0xbb");
		let id = pool_identifier("rfqx", 1, &pair, "mm1");
		assert_eq!(maker_from_identifier("rfqx", 43114, &pair, &id), None);
		assert_eq!(maker_from_identifier("other", 1, &pair, &id), None);
	}
}
