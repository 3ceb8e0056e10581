//! Quote computation across makers.
//!
//! Orchestrates the cached level snapshot, normalizes token identities and
//! walks each maker's ladder through `rfq-curve` to answer pricing queries
//! from the outer framework.

use crate::error::EngineError;
use alloy_primitives::U256;
use rfq_client::MakerApi;
use rfq_curve::{prices_for_amounts, total_depth, unit_price};
use rfq_filter::MakerFilter;
use rfq_storage::{keys, CacheService};
use rfq_types::{
	maker_from_identifier, normalize_token_address, pool_identifier, MakerQuoteSet, Pair,
	PairLevels, PoolLiquidity, TokenMetadata, TradeSide,
};
use rfq_validation::{validate_pairs, validate_price_levels, ValidationError};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

/// Prices one maker answers for a pricing query.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MakerPrices {
	pub pool_identifier: String,
	pub maker: String,
	/// Price of one whole input token, in output base units.
	pub unit: U256,
	/// Curve outputs for the requested amounts; zero marks unfillable.
	pub prices: Vec<U256>,
}

/// Computes pool listings and price arrays.
pub struct PricingService {
	cache: CacheService,
	client: Arc<dyn MakerApi>,
	filter: Arc<MakerFilter>,
	metadata: Arc<dyn TokenMetadata>,
	exchange: String,
	network_id: u64,
	levels_ttl: Duration,
}

impl PricingService {
	#[allow(clippy::too_many_arguments)]
	pub fn new(
		cache: CacheService,
		client: Arc<dyn MakerApi>,
		filter: Arc<MakerFilter>,
		metadata: Arc<dyn TokenMetadata>,
		exchange: String,
		network_id: u64,
		levels_ttl: Duration,
	) -> Self {
		Self {
			cache,
			client,
			filter,
			metadata,
			exchange,
			network_id,
			levels_ttl,
		}
	}

	/// One synthetic pool per maker quoting the exact ordered pair.
	///
	/// Same-token pairs yield no pools.
	pub async fn pool_identifiers(
		&self,
		src_token: &str,
		dest_token: &str,
	) -> Result<Vec<String>, EngineError> {
		let pair = match self.ordered_pair(src_token, dest_token)? {
			Some(pair) => pair,
			None => return Ok(Vec::new()),
		};
		let snapshot = self.quote_set().await?;

		let mut identifiers: Vec<String> = snapshot
			.makers()
			.filter(|maker| snapshot.levels_for(maker.as_str(), &pair).is_some())
			.map(|maker| pool_identifier(&self.exchange, self.network_id, &pair, maker))
			.collect();
		identifiers.sort();
		Ok(identifiers)
	}

	/// Evaluates every candidate maker's ladder for the requested amounts.
	///
	/// `amounts` must be non-decreasing. Makers without the exact ordered
	/// pair contribute nothing.
	pub async fn prices_for(
		&self,
		src_token: &str,
		dest_token: &str,
		amounts: &[U256],
		side: TradeSide,
		candidate_pools: Option<&[String]>,
	) -> Result<Vec<MakerPrices>, EngineError> {
		let pair = match self.ordered_pair(src_token, dest_token)? {
			Some(pair) => pair,
			None => return Ok(Vec::new()),
		};
		let snapshot = self.quote_set().await?;

		let makers: Vec<String> = match candidate_pools {
			Some(pools) => pools
				.iter()
				.filter_map(|id| {
					maker_from_identifier(&self.exchange, self.network_id, &pair, id)
				})
				.collect(),
			None => {
				let mut makers: Vec<String> = snapshot.makers().cloned().collect();
				makers.sort();
				makers
			}
		};

		let base_decimals = self.metadata.decimals(&pair.base);
		let quote_decimals = self.metadata.decimals(&pair.quote);

		let mut results = Vec::with_capacity(makers.len());
		for maker in makers {
			let levels = match snapshot.levels_for(&maker, &pair) {
				Some(levels) => levels,
				None => continue,
			};
			let prices = prices_for_amounts(amounts, levels, side, base_decimals, quote_decimals);
			let unit = unit_price(levels, side, base_decimals, quote_decimals);
			results.push(MakerPrices {
				pool_identifier: pool_identifier(&self.exchange, self.network_id, &pair, &maker),
				maker,
				unit,
				prices,
			});
		}
		Ok(results)
	}

	/// Ranks pools touching `token` by their published depth in that token.
	pub async fn top_pools_for_token(
		&self,
		token: &str,
		limit: usize,
	) -> Result<Vec<PoolLiquidity>, EngineError> {
		let token = normalize_token_address(token)
			.map_err(|e| ValidationError::new("token", e.to_string()))?;
		let snapshot = self.quote_set().await?;

		let mut pools = Vec::new();
		for (maker, entry) in snapshot.iter() {
			if !entry.pair.contains(&token) {
				continue;
			}
			let (base_depth, quote_depth) = match total_depth(&entry.levels) {
				Some(depth) => depth,
				None => continue,
			};
			let depth = if entry.pair.base == token {
				base_depth
			} else {
				quote_depth
			};
			pools.push(PoolLiquidity {
				identifier: pool_identifier(&self.exchange, self.network_id, &entry.pair, maker),
				maker: maker.clone(),
				pair: entry.pair.clone(),
				depth,
			});
		}
		pools.sort_by(|a, b| b.depth.cmp(&a.depth));
		pools.truncate(limit);
		Ok(pools)
	}

	/// The current maker quote set, served from cache while fresh.
	pub async fn quote_set(&self) -> Result<MakerQuoteSet, EngineError> {
		if let Some(cached) = self
			.cache
			.get_json::<MakerQuoteSet>(keys::LEVEL_SNAPSHOT)
			.await?
		{
			return Ok(cached);
		}

		let snapshot = self.fetch_quote_set().await?;
		if let Err(err) = self
			.cache
			.set_json_ex(keys::LEVEL_SNAPSHOT, &snapshot, self.levels_ttl)
			.await
		{
			warn!(%err, "failed to cache level snapshot");
		}
		Ok(snapshot)
	}

	/// Rebuilds the snapshot from the maker directory and quote source.
	///
	/// Ladders are only trusted for pairs the directory advertises; a maker
	/// whose level response fails validation is dropped from this snapshot,
	/// not errored.
	async fn fetch_quote_set(&self) -> Result<MakerQuoteSet, EngineError> {
		let makers = self.filter.eligible_makers().await?;
		if makers.is_empty() {
			return Ok(MakerQuoteSet::new());
		}

		let pairs_payload = self.client.get_pairs(self.network_id).await?;
		let advertised: HashSet<String> = validate_pairs(&pairs_payload)?
			.iter()
			.flat_map(|pair| [pair.key(), pair.flipped().key()])
			.collect();

		let raw_levels = self.client.get_price_levels(self.network_id, &makers).await?;
		let mut snapshot = MakerQuoteSet::new();
		for (maker, payload) in raw_levels {
			match validate_price_levels(&payload) {
				Ok(ladders) => {
					let trusted: Vec<PairLevels> = ladders
						.into_iter()
						.filter(|ladder| advertised.contains(&ladder.pair.key()))
						.collect();
					if !trusted.is_empty() {
						snapshot.insert(maker, trusted);
					}
				}
				Err(err) => {
					warn!(maker, %err, "dropping maker with invalid level response");
				}
			}
		}
		debug!(makers = snapshot.makers().count(), "level snapshot rebuilt");
		Ok(snapshot)
	}

	fn ordered_pair(
		&self,
		src_token: &str,
		dest_token: &str,
	) -> Result<Option<Pair>, EngineError> {
		let pair = Pair::normalized(src_token, dest_token)
			.map_err(|e| ValidationError::new("srcToken/destToken", e.to_string()))?;
		if pair.base == pair.quote {
			debug!(token = %pair.base, "same-token pair rejected");
			return Ok(None);
		}
		Ok(Some(pair))
	}
}
