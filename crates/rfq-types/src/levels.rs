//! Price-level ladders published by market makers.

use crate::pair::Pair;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// One tier of a maker's depth of book.
///
/// `level` is the cumulative base-asset size reachable at this tier and
/// `price` the marginal quote-per-base rate for the quantity between the
/// previous tier and this one. Both are decimal strings; interpolation
/// happens in arbitrary-precision arithmetic downstream.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceLevel {
	pub level: String,
	pub price: String,
}

impl PriceLevel {
	pub fn new(level: impl Into<String>, price: impl Into<String>) -> Self {
		Self {
			level: level.into(),
			price: price.into(),
		}
	}
}

/// A ladder of price levels for one ordered pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PairLevels {
	pub pair: Pair,
	pub levels: Vec<PriceLevel>,
}

/// Everything the engine knows about maker depth, keyed by maker id.
///
/// Rebuilt periodically and cached with a short TTL; price levels go stale
/// quickly.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MakerQuoteSet {
	entries: HashMap<String, Vec<PairLevels>>,
}

impl MakerQuoteSet {
	pub fn new() -> Self {
		Self::default()
	}

	/// Replaces the entries for one maker.
	pub fn insert(&mut self, maker: impl Into<String>, pairs: Vec<PairLevels>) {
		self.entries.insert(maker.into(), pairs);
	}

	/// All makers present in the set.
	pub fn makers(&self) -> impl Iterator<Item = &String> {
		self.entries.keys()
	}

	/// The level ladder one maker publishes for an exact ordered pair.
	pub fn levels_for(&self, maker: &str, pair: &Pair) -> Option<&[PriceLevel]> {
		self.entries
			.get(maker)?
			.iter()
			.find(|entry| &entry.pair == pair)
			.map(|entry| entry.levels.as_slice())
	}

	/// Iterates over every `(maker, pair ladder)` entry.
	pub fn iter(&self) -> impl Iterator<Item = (&String, &PairLevels)> {
		self.entries
			.iter()
			.flat_map(|(maker, pairs)| pairs.iter().map(move |entry| (maker, entry)))
	}

	pub fn is_empty(&self) -> bool {
		self.entries.is_empty()
	}
}
