//! Redis cache backend.
//!
//! The shared backend for multi-instance deployments: restriction and
//! blacklist state written by one instance is visible to all others.
//! Connections come from a deadpool pool; TTL handling is left entirely to
//! Redis.

use crate::{CacheBackend, CacheError};
use async_trait::async_trait;
use deadpool_redis::{Config, Pool, Runtime};
use redis::AsyncCommands;
use std::collections::HashMap;
use std::time::Duration;

/// Redis-backed implementation of [`CacheBackend`].
pub struct RedisCache {
	pool: Pool,
}

impl RedisCache {
	/// Creates the backend from a `redis://` connection URL.
	pub fn new(redis_url: &str) -> Result<Self, CacheError> {
		let cfg = Config::from_url(redis_url);
		let pool = cfg
			.create_pool(Some(Runtime::Tokio1))
			.map_err(|e| CacheError::Backend(e.to_string()))?;
		Ok(Self { pool })
	}

	async fn conn(&self) -> Result<deadpool_redis::Connection, CacheError> {
		self.pool
			.get()
			.await
			.map_err(|e| CacheError::Backend(e.to_string()))
	}
}

#[async_trait]
impl CacheBackend for RedisCache {
	async fn get(&self, key: &str) -> Result<Option<String>, CacheError> {
		let mut conn = self.conn().await?;
		let value: Option<String> = conn
			.get(key)
			.await
			.map_err(|e| CacheError::Backend(e.to_string()))?;
		Ok(value)
	}

	async fn set_ex(&self, key: &str, value: &str, ttl: Duration) -> Result<(), CacheError> {
		let mut conn = self.conn().await?;
		let seconds = ttl.as_secs().max(1);
		let _: () = conn
			.set_ex(key, value, seconds)
			.await
			.map_err(|e| CacheError::Backend(e.to_string()))?;
		Ok(())
	}

	async fn del(&self, key: &str) -> Result<(), CacheError> {
		let mut conn = self.conn().await?;
		let _: () = conn
			.del(key)
			.await
			.map_err(|e| CacheError::Backend(e.to_string()))?;
		Ok(())
	}

	async fn hget_all(&self, key: &str) -> Result<HashMap<String, String>, CacheError> {
		let mut conn = self.conn().await?;
		let all: HashMap<String, String> = conn
			.hgetall(key)
			.await
			.map_err(|e| CacheError::Backend(e.to_string()))?;
		Ok(all)
	}

	async fn hset(&self, key: &str, field: &str, value: &str) -> Result<(), CacheError> {
		let mut conn = self.conn().await?;
		let _: () = conn
			.hset(key, field, value)
			.await
			.map_err(|e| CacheError::Backend(e.to_string()))?;
		Ok(())
	}

	async fn hdel(&self, key: &str, fields: &[String]) -> Result<(), CacheError> {
		if fields.is_empty() {
			return Ok(());
		}
		let mut conn = self.conn().await?;
		let _: () = conn
			.hdel(key, fields.to_vec())
			.await
			.map_err(|e| CacheError::Backend(e.to_string()))?;
		Ok(())
	}
}
