//! Market maker filter and restriction cache.
//!
//! Makers that recently failed a firm quote are restricted for a time
//! window; trade origins a maker flags are blacklisted outright. Both sets
//! live in the shared cache so every engine instance sees them. This crate
//! decides who is allowed to quote before pricing starts.

use rfq_client::{ClientError, MakerApi};
use rfq_storage::{keys, CacheError, CacheService};
use rfq_validation::{validate_blacklist, ValidationError};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use thiserror::Error;
use tracing::{debug, warn};

/// Errors surfaced by the maker filter.
#[derive(Debug, Error)]
pub enum FilterError {
	#[error(transparent)]
	Cache(#[from] CacheError),
	#[error(transparent)]
	Client(#[from] ClientError),
	#[error(transparent)]
	Validation(#[from] ValidationError),
}

/// Filters the maker directory down to counterparties we trust right now.
pub struct MakerFilter {
	cache: CacheService,
	client: Arc<dyn MakerApi>,
	network_id: u64,
	disabled: HashSet<String>,
	restriction_window: Duration,
	blacklist_ttl: Duration,
}

impl MakerFilter {
	pub fn new(
		cache: CacheService,
		client: Arc<dyn MakerApi>,
		network_id: u64,
		disabled: impl IntoIterator<Item = String>,
		restriction_window: Duration,
		blacklist_ttl: Duration,
	) -> Self {
		Self {
			cache,
			client,
			network_id,
			disabled: disabled.into_iter().collect(),
			restriction_window,
			blacklist_ttl,
		}
	}

	/// The full maker directory minus statically disabled makers and
	/// currently-restricted ones.
	pub async fn eligible_makers(&self) -> Result<Vec<String>, FilterError> {
		let directory = self.client.list_market_makers(self.network_id).await?;
		let restricted = self.restricted_makers().await?;
		let eligible: Vec<String> = directory
			.into_iter()
			.filter(|maker| !self.disabled.contains(maker) && !restricted.contains(maker))
			.collect();
		debug!(count = eligible.len(), "eligible makers resolved");
		Ok(eligible)
	}

	/// Reads the restriction hash, lazily pruning expired entries.
	///
	/// Pruning runs detached and best-effort; a failed delete only means
	/// the entry is re-examined on the next read.
	pub async fn restricted_makers(&self) -> Result<HashSet<String>, FilterError> {
		let raw = self.cache.hget_all_scoped(keys::RESTRICTED_MAKERS).await?;
		let (active, expired) =
			partition_restrictions(raw, now_millis(), self.restriction_window);

		if !expired.is_empty() {
			let cache = self.cache.clone();
			tokio::spawn(async move {
				if let Err(err) = cache.hdel_scoped(keys::RESTRICTED_MAKERS, &expired).await {
					warn!(%err, "failed to prune expired maker restrictions");
				}
			});
		}
		Ok(active)
	}

	/// Restricts a maker and invalidates the level snapshot, which may
	/// still carry the now-untrusted maker's prices.
	pub async fn restrict(&self, maker: &str) -> Result<(), FilterError> {
		warn!(maker, "restricting market maker");
		self.cache
			.hset_scoped(keys::RESTRICTED_MAKERS, maker, &now_millis().to_string())
			.await?;

		let cache = self.cache.clone();
		tokio::spawn(async move {
			if let Err(err) = cache.del_scoped(keys::LEVEL_SNAPSHOT).await {
				warn!(%err, "failed to invalidate level snapshot");
			}
		});
		Ok(())
	}

	/// Returns true when a trade origin is currently blacklisted.
	pub async fn is_blacklisted(&self, address: &str) -> Result<bool, FilterError> {
		Ok(self
			.cache
			.get_global(&keys::blacklist_key(address))
			.await?
			.is_some())
	}

	/// Blacklists a trade origin; the entry expires through the cache's
	/// own TTL, no manual pruning needed.
	pub async fn blacklist(&self, address: &str) -> Result<(), FilterError> {
		warn!(address, "blacklisting trade origin");
		self.cache
			.set_global_ex(
				&keys::blacklist_key(address),
				keys::BLACKLIST_SENTINEL,
				self.blacklist_ttl,
			)
			.await?;
		Ok(())
	}

	/// Pulls the maker-published blacklist and mirrors it into the cache.
	pub async fn sync_blacklist(&self) -> Result<usize, FilterError> {
		let payload = self.client.get_blacklist(self.network_id).await?;
		let addresses = validate_blacklist(&payload)?;
		for address in &addresses {
			self.blacklist(address).await?;
		}
		Ok(addresses.len())
	}
}

/// Splits raw restriction entries into the active set and the expired
/// fields to delete.
///
/// An entry is active while `created_at >= now - window`. Entries with
/// unparseable timestamps are treated as expired.
fn partition_restrictions(
	raw: HashMap<String, String>,
	now_ms: u64,
	window: Duration,
) -> (HashSet<String>, Vec<String>) {
	let cutoff = now_ms.saturating_sub(window.as_millis() as u64);
	let mut active = HashSet::new();
	let mut expired = Vec::new();
	for (maker, created_at) in raw {
		match created_at.parse::<u64>() {
			Ok(created_at) if created_at >= cutoff => {
				active.insert(maker);
			}
			_ => expired.push(maker),
		}
	}
	(active, expired)
}

fn now_millis() -> u64 {
	SystemTime::now()
		.duration_since(UNIX_EPOCH)
		.map(|d| d.as_millis() as u64)
		.unwrap_or_default()
}

#[cfg(test)]
mod tests {
	use super::*;
	use async_trait::async_trait;
	use rfq_storage::implementations::memory::MemoryCache;
	use rfq_types::FirmQuoteRequest;
	use serde_json::{json, Value};

	struct MockApi {
		makers: Vec<String>,
		blacklist: Value,
	}

	#[async_trait]
	impl MakerApi for MockApi {
		async fn list_market_makers(&self, _network_id: u64) -> Result<Vec<String>, ClientError> {
			Ok(self.makers.clone())
		}

		async fn get_pairs(&self, _network_id: u64) -> Result<Value, ClientError> {
			Ok(json!({"pairs": []}))
		}

		async fn get_price_levels(
			&self,
			_network_id: u64,
			_makers: &[String],
		) -> Result<HashMap<String, Value>, ClientError> {
			Ok(HashMap::new())
		}

		async fn get_token_directory(&self, _network_id: u64) -> Result<Value, ClientError> {
			Ok(json!({"tokens": []}))
		}

		async fn get_blacklist(&self, _network_id: u64) -> Result<Value, ClientError> {
			Ok(self.blacklist.clone())
		}

		async fn request_firm_quote(
			&self,
			_request: &FirmQuoteRequest,
		) -> Result<Value, ClientError> {
			Ok(json!({"status": "fail"}))
		}
	}

	fn filter_with(makers: Vec<&str>, blacklist: Value) -> MakerFilter {
		let cache = CacheService::new(Arc::new(MemoryCache::new()), "rfq", "rfqx", 1);
		MakerFilter::new(
			cache,
			Arc::new(MockApi {
				makers: makers.into_iter().map(String::from).collect(),
				blacklist,
			}),
			1,
			vec!["mm_disabled".to_string()],
			Duration::from_secs(1800),
			Duration::from_secs(3600),
		)
	}

	#[test]
	fn partition_respects_the_window_boundary() {
		let window = Duration::from_secs(1800);
		let now = 10_000_000u64;
		let raw = HashMap::from([
			("fresh".to_string(), (now - window.as_millis() as u64 + 1).to_string()),
			("stale".to_string(), (now - window.as_millis() as u64 - 1).to_string()),
			("garbage".to_string(), "not-a-timestamp".to_string()),
		]);
		let (active, expired) = partition_restrictions(raw, now, window);
		assert!(active.contains("fresh"));
		assert!(!active.contains("stale"));
		let mut expired = expired;
		expired.sort();
		assert_eq!(expired, vec!["garbage".to_string(), "stale".to_string()]);
	}

	#[tokio::test]
	async fn eligible_makers_drop_disabled_and_restricted() {
		let filter = filter_with(vec!["mm1", "mm2", "mm_disabled"], json!({"blacklist": []}));
		filter.restrict("mm2").await.unwrap();

		let eligible = filter.eligible_makers().await.unwrap();
		assert_eq!(eligible, vec!["mm1".to_string()]);
	}

	#[tokio::test]
	async fn expired_restrictions_are_pruned_lazily() {
		let filter = filter_with(vec!["mm1"], json!({"blacklist": []}));
		filter
			.cache
			.hset_scoped(keys::RESTRICTED_MAKERS, "mm_old", "1")
			.await
			.unwrap();

		let restricted = filter.restricted_makers().await.unwrap();
		assert!(!restricted.contains("mm_old"));

		// detached prune; give it a moment to land
		tokio::time::sleep(Duration::from_millis(50)).await;
		let raw = filter
			.cache
			.hget_all_scoped(keys::RESTRICTED_MAKERS)
			.await
			.unwrap();
		assert!(!raw.contains_key("mm_old"));
	}

	#[tokio::test]
	async fn blacklist_round_trip() {
		let filter = filter_with(vec![], json!({"blacklist": []}));
		let origin = "0xA0b86991c6218b36c1d19D4a2e9Eb0cE3606eB48";
		assert!(!filter.is_blacklisted(origin).await.unwrap());

		filter.blacklist(origin).await.unwrap();
		assert!(filter.is_blacklisted(origin).await.unwrap());
		// lookups are case-insensitive through key normalization
		assert!(filter
			.is_blacklisted(&origin.to_lowercase())
			.await
			.unwrap());
	}

	#[tokio::test]
	async fn sync_blacklist_mirrors_published_entries() {
		let origin = "0xc02aaa39b223fe8d0a0e5c4f27ead9083c756cc2";
		let filter = filter_with(vec![], json!({"blacklist": [origin]}));

		let inserted = filter.sync_blacklist().await.unwrap();
		assert_eq!(inserted, 1);
		assert!(filter.is_blacklisted(origin).await.unwrap());
	}
}
