//! Cache service for the RFQ engine.
//!
//! The engine keeps two kinds of shared state in a key-value cache: the
//! short-lived maker level snapshot and the restriction/blacklist entries.
//! This crate defines the backend abstraction plus an in-memory and a Redis
//! implementation. Per-key operations are assumed atomic by the backend;
//! the engine never needs compare-and-swap because every value it writes is
//! a timestamp, a flag or a full snapshot overwrite.

use async_trait::async_trait;
use serde::{de::DeserializeOwned, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

pub mod implementations {
	pub mod memory;
	pub mod redis;
}

pub mod keys;

/// Errors that can occur during cache operations.
#[derive(Debug, Error)]
pub enum CacheError {
	/// Error raised by the backing store.
	#[error("cache backend error: {0}")]
	Backend(String),
	/// Error that occurs when (de)serializing cached values.
	#[error("cache serialization error: {0}")]
	Serialization(String),
}

/// Low-level interface a cache backend must provide.
///
/// Mirrors the handful of string and hash operations the engine relies on.
/// All operations are per-key atomic; concurrent writers to different hash
/// fields must not corrupt each other.
#[async_trait]
pub trait CacheBackend: Send + Sync {
	/// Reads a plain value.
	async fn get(&self, key: &str) -> Result<Option<String>, CacheError>;

	/// Writes a plain value with a time-to-live.
	async fn set_ex(&self, key: &str, value: &str, ttl: Duration) -> Result<(), CacheError>;

	/// Deletes a plain value.
	async fn del(&self, key: &str) -> Result<(), CacheError>;

	/// Reads all fields of a hash.
	async fn hget_all(&self, key: &str) -> Result<HashMap<String, String>, CacheError>;

	/// Writes one field of a hash.
	async fn hset(&self, key: &str, field: &str, value: &str) -> Result<(), CacheError>;

	/// Deletes fields of a hash.
	async fn hdel(&self, key: &str, fields: &[String]) -> Result<(), CacheError>;
}

/// Cache handle scoped to one exchange on one network.
///
/// Constructed once per exchange-network pair and shared by the components
/// that need it. Scoped keys are prefixed `<namespace>_<exchange>_<network>`
/// so several deployments can share one physical store.
#[derive(Clone)]
pub struct CacheService {
	backend: Arc<dyn CacheBackend>,
	prefix: String,
}

impl CacheService {
	pub fn new(
		backend: Arc<dyn CacheBackend>,
		namespace: &str,
		exchange: &str,
		network_id: u64,
	) -> Self {
		Self {
			backend,
			prefix: format!("{}_{}_{}", namespace, exchange, network_id),
		}
	}

	/// Builds a key inside this service's exchange-network scope.
	pub fn scoped_key(&self, suffix: &str) -> String {
		format!("{}_{}", self.prefix, suffix)
	}

	/// Reads and deserializes a JSON value stored under a scoped key.
	pub async fn get_json<T: DeserializeOwned>(
		&self,
		suffix: &str,
	) -> Result<Option<T>, CacheError> {
		let raw = self.backend.get(&self.scoped_key(suffix)).await?;
		match raw {
			Some(raw) => serde_json::from_str(&raw)
				.map(Some)
				.map_err(|e| CacheError::Serialization(e.to_string())),
			None => Ok(None),
		}
	}

	/// Serializes and stores a JSON value under a scoped key with a TTL.
	pub async fn set_json_ex<T: Serialize>(
		&self,
		suffix: &str,
		value: &T,
		ttl: Duration,
	) -> Result<(), CacheError> {
		let raw =
			serde_json::to_string(value).map_err(|e| CacheError::Serialization(e.to_string()))?;
		self.backend.set_ex(&self.scoped_key(suffix), &raw, ttl).await
	}

	/// Deletes a scoped key.
	pub async fn del_scoped(&self, suffix: &str) -> Result<(), CacheError> {
		self.backend.del(&self.scoped_key(suffix)).await
	}

	/// Reads all fields of a scoped hash.
	pub async fn hget_all_scoped(
		&self,
		suffix: &str,
	) -> Result<HashMap<String, String>, CacheError> {
		self.backend.hget_all(&self.scoped_key(suffix)).await
	}

	/// Writes one field of a scoped hash.
	pub async fn hset_scoped(
		&self,
		suffix: &str,
		field: &str,
		value: &str,
	) -> Result<(), CacheError> {
		self.backend.hset(&self.scoped_key(suffix), field, value).await
	}

	/// Deletes fields of a scoped hash.
	pub async fn hdel_scoped(&self, suffix: &str, fields: &[String]) -> Result<(), CacheError> {
		self.backend.hdel(&self.scoped_key(suffix), fields).await
	}

	/// Reads a global (unscoped) value.
	pub async fn get_global(&self, key: &str) -> Result<Option<String>, CacheError> {
		self.backend.get(key).await
	}

	/// Writes a global (unscoped) value with a TTL.
	pub async fn set_global_ex(
		&self,
		key: &str,
		value: &str,
		ttl: Duration,
	) -> Result<(), CacheError> {
		self.backend.set_ex(key, value, ttl).await
	}
}

#[cfg(test)]
mod tests {
	use super::implementations::memory::MemoryCache;
	use super::*;

	#[tokio::test]
	async fn scoped_keys_carry_the_full_prefix() {
		let service = CacheService::new(Arc::new(MemoryCache::new()), "rfq", "rfqx", 43114);
		assert_eq!(service.scoped_key("restricted_mms"), "rfq_rfqx_43114_restricted_mms");
	}

	#[tokio::test]
	async fn json_round_trip() {
		let service = CacheService::new(Arc::new(MemoryCache::new()), "rfq", "rfqx", 1);
		service
			.set_json_ex("levels", &vec![1u64, 2, 3], Duration::from_secs(30))
			.await
			.unwrap();
		let cached: Option<Vec<u64>> = service.get_json("levels").await.unwrap();
		assert_eq!(cached, Some(vec![1, 2, 3]));
	}
}
