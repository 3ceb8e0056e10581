//! In-memory cache backend.
//!
//! Keeps everything in process. Used by tests and single-node deployments
//! that do not share restriction state across instances.

use crate::{CacheBackend, CacheError};
use async_trait::async_trait;
use dashmap::DashMap;
use std::collections::HashMap;
use std::time::{Duration, Instant};

struct Entry {
	value: String,
	expires_at: Instant,
}

/// Process-local implementation of [`CacheBackend`].
#[derive(Default)]
pub struct MemoryCache {
	values: DashMap<String, Entry>,
	hashes: DashMap<String, HashMap<String, String>>,
}

impl MemoryCache {
	pub fn new() -> Self {
		Self::default()
	}
}

#[async_trait]
impl CacheBackend for MemoryCache {
	async fn get(&self, key: &str) -> Result<Option<String>, CacheError> {
		// expired entries are pruned lazily on read
		if let Some(entry) = self.values.get(key) {
			if entry.expires_at > Instant::now() {
				return Ok(Some(entry.value.clone()));
			}
		}
		self.values.remove_if(key, |_, entry| entry.expires_at <= Instant::now());
		Ok(None)
	}

	async fn set_ex(&self, key: &str, value: &str, ttl: Duration) -> Result<(), CacheError> {
		self.values.insert(
			key.to_string(),
			Entry {
				value: value.to_string(),
				expires_at: Instant::now() + ttl,
			},
		);
		Ok(())
	}

	async fn del(&self, key: &str) -> Result<(), CacheError> {
		self.values.remove(key);
		Ok(())
	}

	async fn hget_all(&self, key: &str) -> Result<HashMap<String, String>, CacheError> {
		Ok(self
			.hashes
			.get(key)
			.map(|hash| hash.clone())
			.unwrap_or_default())
	}

	async fn hset(&self, key: &str, field: &str, value: &str) -> Result<(), CacheError> {
		self.hashes
			.entry(key.to_string())
			.or_default()
			.insert(field.to_string(), value.to_string());
		Ok(())
	}

	async fn hdel(&self, key: &str, fields: &[String]) -> Result<(), CacheError> {
		if let Some(mut hash) = self.hashes.get_mut(key) {
			for field in fields {
				hash.remove(field);
			}
		}
		Ok(())
	}
}
