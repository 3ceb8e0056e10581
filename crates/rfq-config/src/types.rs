//! Configuration types.

use crate::ConfigError;
use bigdecimal::BigDecimal;
use rfq_types::address::is_valid_address;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::str::FromStr;
use std::time::Duration;

/// Complete engine configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RfqConfig {
	pub exchange: ExchangeSettings,
	pub maker_api: MakerApiSettings,
	#[serde(default)]
	pub cache: CacheSettings,
	#[serde(default)]
	pub pricing: PricingSettings,
	/// Token decimals keyed by address; tokens absent here fall back to
	/// the maker token directory, then to zero decimals.
	#[serde(default)]
	pub tokens: HashMap<String, u8>,
	#[serde(default)]
	pub service: ServiceSettings,
}

/// Exchange identity and maker policy.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ExchangeSettings {
	/// Exchange key used in pool identifiers and cache keys.
	pub name: String,
	pub network_id: u64,
	/// Router contracts approved as order takers.
	pub approved_takers: Vec<String>,
	/// Makers excluded from quoting regardless of cache state.
	#[serde(default)]
	pub disabled_makers: Vec<String>,
}

/// Maker API endpoint settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct MakerApiSettings {
	pub base_url: String,
	#[serde(default)]
	pub api_key: Option<String>,
	/// Budget for every maker API call.
	#[serde(default = "default_timeout_ms")]
	pub timeout_ms: u64,
}

/// Cache backend selection and lifetimes.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CacheSettings {
	#[serde(default)]
	pub backend: CacheBackendKind,
	#[serde(default)]
	pub redis_url: Option<String>,
	#[serde(default = "default_namespace")]
	pub namespace: String,
	/// Level snapshots go stale quickly; keep this short.
	#[serde(default = "default_levels_ttl_secs")]
	pub levels_ttl_secs: u64,
	#[serde(default = "default_restriction_window_secs")]
	pub restriction_window_secs: u64,
	#[serde(default = "default_blacklist_ttl_secs")]
	pub blacklist_ttl_secs: u64,
}

/// Which cache backend to construct.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CacheBackendKind {
	#[default]
	Memory,
	Redis,
}

/// Pricing defaults.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PricingSettings {
	/// Slippage tolerance applied when a caller does not supply one.
	#[serde(default = "default_slippage_factor")]
	pub default_slippage_factor: String,
}

/// HTTP service settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServiceSettings {
	#[serde(default = "default_http_port")]
	pub http_port: u16,
	#[serde(default = "default_log_level")]
	pub log_level: String,
}

fn default_timeout_ms() -> u64 {
	150
}

fn default_namespace() -> String {
	"rfq".to_string()
}

fn default_levels_ttl_secs() -> u64 {
	30
}

fn default_restriction_window_secs() -> u64 {
	30 * 60
}

fn default_blacklist_ttl_secs() -> u64 {
	60 * 60
}

fn default_slippage_factor() -> String {
	"0.99".to_string()
}

fn default_http_port() -> u16 {
	8080
}

fn default_log_level() -> String {
	"info".to_string()
}

impl Default for CacheSettings {
	fn default() -> Self {
		Self {
			backend: CacheBackendKind::Memory,
			redis_url: None,
			namespace: default_namespace(),
			levels_ttl_secs: default_levels_ttl_secs(),
			restriction_window_secs: default_restriction_window_secs(),
			blacklist_ttl_secs: default_blacklist_ttl_secs(),
		}
	}
}

impl Default for PricingSettings {
	fn default() -> Self {
		Self {
			default_slippage_factor: default_slippage_factor(),
		}
	}
}

impl Default for ServiceSettings {
	fn default() -> Self {
		Self {
			http_port: default_http_port(),
			log_level: default_log_level(),
		}
	}
}

impl RfqConfig {
	/// Checks the invariants the engine relies on before construction.
	pub fn validate(&self) -> Result<(), ConfigError> {
		if self.exchange.name.is_empty() {
			return Err(ConfigError::Validation("exchange.name is empty".into()));
		}
		if self.exchange.approved_takers.is_empty() {
			return Err(ConfigError::Validation(
				"exchange.approved_takers must list at least one router".into(),
			));
		}
		for taker in &self.exchange.approved_takers {
			if !is_valid_address(taker) {
				return Err(ConfigError::Validation(format!(
					"exchange.approved_takers contains an invalid address: {}",
					taker
				)));
			}
		}
		if self.maker_api.base_url.is_empty() {
			return Err(ConfigError::Validation("maker_api.base_url is empty".into()));
		}
		if self.maker_api.timeout_ms == 0 {
			return Err(ConfigError::Validation("maker_api.timeout_ms must be positive".into()));
		}
		if self.cache.levels_ttl_secs == 0 || self.cache.restriction_window_secs == 0 {
			return Err(ConfigError::Validation("cache lifetimes must be positive".into()));
		}
		if self.cache.backend == CacheBackendKind::Redis && self.cache.redis_url.is_none() {
			return Err(ConfigError::Validation(
				"cache.redis_url is required for the redis backend".into(),
			));
		}
		match BigDecimal::from_str(&self.pricing.default_slippage_factor) {
			Ok(factor) if factor > BigDecimal::from(0) => {}
			_ => {
				return Err(ConfigError::Validation(
					"pricing.default_slippage_factor must be a positive decimal".into(),
				));
			}
		}
		Ok(())
	}

	pub fn maker_api_timeout(&self) -> Duration {
		Duration::from_millis(self.maker_api.timeout_ms)
	}

	pub fn levels_ttl(&self) -> Duration {
		Duration::from_secs(self.cache.levels_ttl_secs)
	}

	pub fn restriction_window(&self) -> Duration {
		Duration::from_secs(self.cache.restriction_window_secs)
	}

	pub fn blacklist_ttl(&self) -> Duration {
		Duration::from_secs(self.cache.blacklist_ttl_secs)
	}
}
