//! RFQ engine core.
//!
//! Wires the filter, pricing and preprocessing services behind one facade
//! the outer aggregation framework talks to. Constructed once per
//! exchange-network pair via [`RfqEngineBuilder`]; every external
//! dependency (cache backend, maker API) is injected and can be replaced.

pub mod error;
pub mod gas;
pub mod preprocess;
pub mod pricing;

pub use error::EngineError;
pub use pricing::MakerPrices;

use alloy_primitives::U256;
use preprocess::PreprocessService;
use pricing::PricingService;
use rfq_client::{HttpMakerApi, MakerApi};
use rfq_config::{CacheBackendKind, RfqConfig};
use rfq_filter::MakerFilter;
use rfq_storage::implementations::memory::MemoryCache;
use rfq_storage::implementations::redis::RedisCache;
use rfq_storage::{CacheBackend, CacheService};
use rfq_types::{
	PoolLiquidity, PreparedTrade, SignedOrder, StaticTokenMetadata, TokenMetadata, TradeParams,
	TradeSide,
};
use rfq_validation::validate_tokens;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::warn;

/// The RFQ engine facade.
pub struct RfqEngine {
	config: Arc<RfqConfig>,
	filter: Arc<MakerFilter>,
	pricing: PricingService,
	preprocess: PreprocessService,
}

impl RfqEngine {
	/// Pool identifiers for the makers quoting this ordered pair.
	pub async fn pool_identifiers(
		&self,
		src_token: &str,
		dest_token: &str,
	) -> Result<Vec<String>, EngineError> {
		self.pricing.pool_identifiers(src_token, dest_token).await
	}

	/// Per-maker unit prices and price arrays for the given amounts.
	pub async fn prices_for(
		&self,
		src_token: &str,
		dest_token: &str,
		amounts: &[U256],
		side: TradeSide,
		candidate_pools: Option<&[String]>,
	) -> Result<Vec<MakerPrices>, EngineError> {
		self.pricing
			.prices_for(src_token, dest_token, amounts, side, candidate_pools)
			.await
	}

	/// Pools touching `token`, ranked by published depth.
	pub async fn top_pools_for_token(
		&self,
		token: &str,
		limit: usize,
	) -> Result<Vec<PoolLiquidity>, EngineError> {
		self.pricing.top_pools_for_token(token, limit).await
	}

	/// Runs the firm-quote and slippage pipeline for a chosen maker.
	pub async fn preprocess_transaction(
		&self,
		trade: &TradeParams,
	) -> Result<PreparedTrade, EngineError> {
		self.preprocess.preprocess(trade).await
	}

	/// Validates a standalone maker-signed order payload.
	pub fn validate_order(
		&self,
		payload: &serde_json::Value,
	) -> Result<SignedOrder, EngineError> {
		self.preprocess.validate_order(payload)
	}

	/// Best-effort calldata gas overhead of an RFQ fill.
	pub fn gas_estimate_overhead(&self) -> u64 {
		gas::gas_estimate_overhead()
	}

	/// Mirrors the maker-published blacklist into the cache; returns the
	/// number of entries.
	pub async fn refresh_blacklist(&self) -> Result<usize, EngineError> {
		Ok(self.filter.sync_blacklist().await?)
	}

	pub fn config(&self) -> &RfqConfig {
		&self.config
	}
}

/// Assembles an [`RfqEngine`] from configuration plus injectable backends.
pub struct RfqEngineBuilder {
	config: Option<RfqConfig>,
	cache_backend: Option<Arc<dyn CacheBackend>>,
	maker_api: Option<Arc<dyn MakerApi>>,
}

impl RfqEngineBuilder {
	pub fn new() -> Self {
		Self {
			config: None,
			cache_backend: None,
			maker_api: None,
		}
	}

	pub fn with_config(mut self, config: RfqConfig) -> Self {
		self.config = Some(config);
		self
	}

	/// Overrides the cache backend configured in the file.
	pub fn with_cache_backend(mut self, backend: Arc<dyn CacheBackend>) -> Self {
		self.cache_backend = Some(backend);
		self
	}

	/// Overrides the HTTP maker client, e.g. for tests.
	pub fn with_maker_api(mut self, maker_api: Arc<dyn MakerApi>) -> Self {
		self.maker_api = Some(maker_api);
		self
	}

	pub async fn build(self) -> Result<RfqEngine, EngineError> {
		let config = self
			.config
			.ok_or_else(|| EngineError::Configuration("no configuration provided".into()))?;
		config
			.validate()
			.map_err(|e| EngineError::Configuration(e.to_string()))?;

		let cache_backend: Arc<dyn CacheBackend> = match self.cache_backend {
			Some(backend) => backend,
			None => match config.cache.backend {
				CacheBackendKind::Memory => Arc::new(MemoryCache::new()),
				CacheBackendKind::Redis => {
					let url = config.cache.redis_url.as_deref().ok_or_else(|| {
						EngineError::Configuration("redis backend without redis_url".into())
					})?;
					Arc::new(RedisCache::new(url)?)
				}
			},
		};

		let client: Arc<dyn MakerApi> = match self.maker_api {
			Some(client) => client,
			None => Arc::new(HttpMakerApi::new(
				config.maker_api.base_url.clone(),
				config.maker_api_timeout(),
				config.maker_api.api_key.clone(),
			)),
		};

		let network_id = config.exchange.network_id;
		let cache = CacheService::new(
			cache_backend,
			&config.cache.namespace,
			&config.exchange.name,
			network_id,
		);
		let filter = Arc::new(MakerFilter::new(
			cache.clone(),
			client.clone(),
			network_id,
			config.exchange.disabled_makers.clone(),
			config.restriction_window(),
			config.blacklist_ttl(),
		));

		let metadata = Arc::new(StaticTokenMetadata::new(
			resolve_token_decimals(&config, client.as_ref()).await,
		)) as Arc<dyn TokenMetadata>;

		let pricing = PricingService::new(
			cache,
			client.clone(),
			filter.clone(),
			metadata,
			config.exchange.name.clone(),
			network_id,
			config.levels_ttl(),
		);
		let approved_takers: Vec<String> = config
			.exchange
			.approved_takers
			.iter()
			.map(|taker| taker.to_lowercase())
			.collect();
		let preprocess =
			PreprocessService::new(client, filter.clone(), network_id, approved_takers);

		Ok(RfqEngine {
			config: Arc::new(config),
			filter,
			pricing,
			preprocess,
		})
	}
}

impl Default for RfqEngineBuilder {
	fn default() -> Self {
		Self::new()
	}
}

/// Decimals from the maker token directory, overridden by configuration.
///
/// A missing or invalid directory degrades to the configured map; unknown
/// tokens then resolve to zero decimals downstream.
async fn resolve_token_decimals(
	config: &RfqConfig,
	client: &dyn MakerApi,
) -> HashMap<String, u8> {
	let mut decimals = match client.get_token_directory(config.exchange.network_id).await {
		Ok(payload) => match validate_tokens(&payload) {
			Ok(decimals) => decimals,
			Err(err) => {
				warn!(%err, "invalid token directory; using configured decimals only");
				HashMap::new()
			}
		},
		Err(err) => {
			warn!(%err, "token directory unavailable; using configured decimals only");
			HashMap::new()
		}
	};
	for (token, d) in &config.tokens {
		decimals.insert(token.to_lowercase(), *d);
	}
	decimals
}

#[cfg(test)]
mod tests {
	use super::*;
	use async_trait::async_trait;
	use bigdecimal::BigDecimal;
	use rfq_client::ClientError;
	use rfq_config::{ExchangeSettings, MakerApiSettings};
	use rfq_types::{maker_from_identifier, FirmQuoteRequest, Pair};
	use serde_json::{json, Value};
	use std::str::FromStr;
	use std::time::Duration;

	const WETH: &str = "0xc02aaa39b223fe8d0a0e5c4f27ead9083c756cc2";
	const USDC: &str = "0xa0b86991c6218b36c1d19d4a2e9eb0ce3606eb48";
	const ROUTER: &str = "0xdef171fe48cf0115b1d80b88dc8eab59176fee57";
	const ORIGIN: &str = "0x7a250d5630b4cf539739df2c5dacb4c659f2488d";
	const POOL: &str = "0x36c72892fcc72b52fa3b82ed3bb2a467d9079b9a";

	const ONE_WETH: u64 = 1_000_000_000_000_000_000;
	const USDC_3000: u64 = 3_000_000_000;

	struct MockApi {
		makers: Vec<String>,
		levels: HashMap<String, Value>,
		firm: Option<Value>,
		firm_fails: bool,
	}

	impl MockApi {
		fn with_book() -> Self {
			let book = json!({
				"levels": [{
					"pair": {"baseToken": WETH, "quoteToken": USDC},
					"bids": [["3000", "5"], ["2990", "5"]],
					"asks": [["3010", "5"]],
				}]
			});
			Self {
				makers: vec!["mm1".to_string(), "mm2".to_string()],
				levels: HashMap::from([
					("mm1".to_string(), book.clone()),
					("mm2".to_string(), book),
				]),
				firm: None,
				firm_fails: false,
			}
		}

		fn with_firm(mut self, firm: Value) -> Self {
			self.firm = Some(firm);
			self
		}

		fn failing_firm(mut self) -> Self {
			self.firm_fails = true;
			self
		}
	}

	#[async_trait]
	impl MakerApi for MockApi {
		async fn list_market_makers(&self, _network_id: u64) -> Result<Vec<String>, ClientError> {
			Ok(self.makers.clone())
		}

		async fn get_pairs(&self, _network_id: u64) -> Result<Value, ClientError> {
			Ok(json!({"pairs": [{"baseToken": WETH, "quoteToken": USDC}]}))
		}

		async fn get_price_levels(
			&self,
			_network_id: u64,
			makers: &[String],
		) -> Result<HashMap<String, Value>, ClientError> {
			Ok(self
				.levels
				.iter()
				.filter(|(maker, _)| makers.contains(maker))
				.map(|(maker, payload)| (maker.clone(), payload.clone()))
				.collect())
		}

		async fn get_token_directory(&self, _network_id: u64) -> Result<Value, ClientError> {
			Ok(json!({"tokens": [
				{"address": WETH, "symbol": "WETH", "decimals": 18},
				{"address": USDC, "symbol": "USDC", "decimals": 6},
			]}))
		}

		async fn get_blacklist(&self, _network_id: u64) -> Result<Value, ClientError> {
			Ok(json!({"blacklist": []}))
		}

		async fn request_firm_quote(
			&self,
			_request: &FirmQuoteRequest,
		) -> Result<Value, ClientError> {
			if self.firm_fails {
				return Err(ClientError::Timeout(Duration::from_millis(150)));
			}
			Ok(self
				.firm
				.clone()
				.unwrap_or_else(|| json!({"status": "fail", "error": "no liquidity"})))
		}
	}

	fn test_config() -> RfqConfig {
		RfqConfig {
			exchange: ExchangeSettings {
				name: "rfqx".to_string(),
				network_id: 1,
				approved_takers: vec![ROUTER.to_string()],
				disabled_makers: vec![],
			},
			maker_api: MakerApiSettings {
				base_url: "https://rfq.example.com/api".to_string(),
				api_key: None,
				timeout_ms: 150,
			},
			cache: Default::default(),
			pricing: Default::default(),
			tokens: HashMap::new(),
			service: Default::default(),
		}
	}

	async fn engine_with(api: MockApi) -> RfqEngine {
		RfqEngineBuilder::new()
			.with_config(test_config())
			.with_maker_api(Arc::new(api))
			.build()
			.await
			.unwrap()
	}

	fn good_firm_quote() -> Value {
		json!({
			"status": "success",
			"rfqType": 0,
			"quoteData": {
				"pool": POOL,
				"baseToken": WETH,
				"quoteToken": USDC,
				"baseTokenAmount": ONE_WETH.to_string(),
				"quoteTokenAmount": USDC_3000.to_string(),
				"quoteExpiry": 1700000000u64,
				"nonce": "7",
				"txId": "0xabc123"
			},
			"signature": "0xdeadbeef",
			"gasEstimate": "120000"
		})
	}

	fn sell_trade() -> TradeParams {
		TradeParams {
			src_token: WETH.to_string(),
			dest_token: USDC.to_string(),
			src_amount: U256::from(ONE_WETH),
			dest_amount: U256::from(USDC_3000),
			side: TradeSide::Sell,
			maker: "mm1".to_string(),
			tx_origin: ORIGIN.to_string(),
			receiver: None,
			slippage_factor: BigDecimal::from_str("0.99").unwrap(),
		}
	}

	#[tokio::test]
	async fn pool_identifiers_round_trip_to_makers() {
		let engine = engine_with(MockApi::with_book()).await;
		let pools = engine.pool_identifiers(WETH, USDC).await.unwrap();
		assert_eq!(pools.len(), 2);

		let pair = Pair::new(WETH, USDC);
		for pool in &pools {
			let maker = maker_from_identifier("rfqx", 1, &pair, pool).unwrap();
			assert!(maker == "mm1" || maker == "mm2");
		}
	}

	#[tokio::test]
	async fn same_token_pair_yields_no_pools() {
		let engine = engine_with(MockApi::with_book()).await;
		assert!(engine.pool_identifiers(WETH, WETH).await.unwrap().is_empty());
		// the native sentinel normalizes to the zero address on both sides
		let pools = engine
			.pool_identifiers(
				"0xeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeee",
				"0xEeeeeEeeeEeEeeEeEeEeeEEEeeeeEeeeeeeeEEeE",
			)
			.await
			.unwrap();
		assert!(pools.is_empty());
	}

	#[tokio::test]
	async fn sell_prices_convert_to_dest_decimals() {
		let engine = engine_with(MockApi::with_book()).await;
		let amounts = [U256::from(ONE_WETH), U256::from(2 * ONE_WETH)];
		let prices = engine
			.prices_for(WETH, USDC, &amounts, TradeSide::Sell, None)
			.await
			.unwrap();
		assert_eq!(prices.len(), 2);
		for maker_prices in &prices {
			// 1 WETH at 3000, the second WETH still inside the first tier
			assert_eq!(maker_prices.prices[0], U256::from(USDC_3000));
			assert_eq!(maker_prices.prices[1], U256::from(2 * USDC_3000));
			assert_eq!(maker_prices.unit, U256::from(USDC_3000));
		}
	}

	#[tokio::test]
	async fn buy_prices_convert_to_src_decimals() {
		let engine = engine_with(MockApi::with_book()).await;
		let amounts = [U256::from(USDC_3000)];
		let prices = engine
			.prices_for(WETH, USDC, &amounts, TradeSide::Buy, None)
			.await
			.unwrap();
		// 3000 USDC of output costs exactly 1 WETH
		assert_eq!(prices[0].prices[0], U256::from(ONE_WETH));
	}

	#[tokio::test]
	async fn candidate_pools_restrict_the_maker_set() {
		let engine = engine_with(MockApi::with_book()).await;
		let pair = Pair::new(WETH, USDC);
		let only_mm2 = vec![rfq_types::pool_identifier("rfqx", 1, &pair, "mm2")];
		let prices = engine
			.prices_for(
				WETH,
				USDC,
				&[U256::from(ONE_WETH)],
				TradeSide::Sell,
				Some(only_mm2.as_slice()),
			)
			.await
			.unwrap();
		assert_eq!(prices.len(), 1);
		assert_eq!(prices[0].maker, "mm2");
	}

	#[tokio::test]
	async fn top_pools_rank_by_depth() {
		let engine = engine_with(MockApi::with_book()).await;
		let pools = engine.top_pools_for_token(WETH, 10).await.unwrap();
		// two makers quoting WETH on both sides of the book
		assert_eq!(pools.len(), 4);
		assert!(pools[0].depth >= pools[1].depth);

		let pools = engine.top_pools_for_token(WETH, 1).await.unwrap();
		assert_eq!(pools.len(), 1);
	}

	#[tokio::test]
	async fn preprocess_accepts_a_clean_firm_quote() {
		let engine = engine_with(MockApi::with_book().with_firm(good_firm_quote())).await;
		let prepared = engine.preprocess_transaction(&sell_trade()).await.unwrap();
		assert_eq!(prepared.pool, POOL);
		assert_eq!(prepared.quote_token_amount, U256::from(USDC_3000));
		assert_eq!(prepared.deadline, 1700000000);
		assert_eq!(prepared.nonce, "7");
	}

	#[tokio::test]
	async fn preprocess_treats_zero_expiry_as_unbounded() {
		let mut firm = good_firm_quote();
		firm["quoteData"]["quoteExpiry"] = json!(0);
		let engine = engine_with(MockApi::with_book().with_firm(firm)).await;
		let prepared = engine.preprocess_transaction(&sell_trade()).await.unwrap();
		assert_eq!(prepared.deadline, u64::MAX);
	}

	#[tokio::test]
	async fn slippage_failure_restricts_the_maker() {
		let mut firm = good_firm_quote();
		firm["quoteData"]["quoteTokenAmount"] = json!("2900000000");
		let engine = engine_with(MockApi::with_book().with_firm(firm)).await;

		let err = engine.preprocess_transaction(&sell_trade()).await.unwrap_err();
		assert!(matches!(err, EngineError::SlippageExceeded { .. }));

		// mm1 is out of the eligible set for the restriction window
		let pools = engine.pool_identifiers(WETH, USDC).await.unwrap();
		let pair = Pair::new(WETH, USDC);
		assert!(pools
			.iter()
			.all(|p| maker_from_identifier("rfqx", 1, &pair, p).as_deref() != Some("mm1")));
	}

	#[tokio::test]
	async fn rfq_transport_failure_restricts_the_maker() {
		let engine = engine_with(MockApi::with_book().failing_firm()).await;
		let err = engine.preprocess_transaction(&sell_trade()).await.unwrap_err();
		assert!(matches!(err, EngineError::Rfq(_)));

		let restricted = engine.filter.restricted_makers().await.unwrap();
		assert!(restricted.contains("mm1"));
	}

	#[tokio::test]
	async fn token_mismatch_is_rejected() {
		let mut firm = good_firm_quote();
		firm["quoteData"]["baseToken"] = json!(USDC);
		firm["quoteData"]["quoteToken"] = json!(WETH);
		let engine = engine_with(MockApi::with_book().with_firm(firm)).await;
		let err = engine.preprocess_transaction(&sell_trade()).await.unwrap_err();
		assert!(matches!(err, EngineError::Rfq(_)));
	}

	#[tokio::test]
	async fn user_restriction_signal_blacklists_the_origin() {
		let firm = json!({"status": "fail", "error": "User is restricted"});
		let engine = engine_with(MockApi::with_book().with_firm(firm)).await;

		let err = engine.preprocess_transaction(&sell_trade()).await.unwrap_err();
		assert!(matches!(err, EngineError::Rfq(_)));

		// the origin is blacklisted, the maker is not restricted
		let restricted = engine.filter.restricted_makers().await.unwrap();
		assert!(!restricted.contains("mm1"));
		let err = engine.preprocess_transaction(&sell_trade()).await.unwrap_err();
		assert!(matches!(err, EngineError::UserBlacklisted));
	}

	#[tokio::test]
	async fn validate_order_enforces_the_taker_allowlist() {
		let engine = engine_with(MockApi::with_book()).await;
		let payload = json!({
			"maker": POOL,
			"taker": ROUTER,
			"baseToken": WETH,
			"quoteToken": USDC,
			"baseTokenAmount": "1000",
			"quoteTokenAmount": "3000",
			"expiry": 1700000000u64,
			"nonceAndMeta": "99",
			"signature": "0xbeef"
		});
		assert!(engine.validate_order(&payload).is_ok());

		let mut foreign = payload.clone();
		foreign["taker"] = json!(ORIGIN);
		assert!(engine.validate_order(&foreign).is_err());
	}

	#[tokio::test]
	async fn gas_overhead_is_exposed() {
		let engine = engine_with(MockApi::with_book()).await;
		assert!(engine.gas_estimate_overhead() > 0);
	}
}
