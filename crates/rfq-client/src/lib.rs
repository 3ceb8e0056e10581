//! Maker directory and quote source client.
//!
//! Everything the engine asks a market-making network for goes through the
//! [`MakerApi`] trait: the maker directory, price levels, token and pair
//! directories, the maker-published blacklist and firm quotes. The HTTP
//! implementation bounds every call with a fixed timeout; a timeout is a
//! hard failure of that call and is never retried here, since retry policy
//! belongs to the outer framework.
//!
//! Payloads that feed the validation pipeline are returned as raw JSON so
//! that nothing is trusted before it has been validated.

use async_trait::async_trait;
use rfq_types::FirmQuoteRequest;
use serde::Deserialize;
use serde_json::Value;
use std::collections::HashMap;
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

/// Errors that can occur while talking to the maker network.
#[derive(Debug, Error)]
pub enum ClientError {
	/// The call exceeded its fixed budget.
	#[error("maker api call timed out after {0:?}")]
	Timeout(Duration),
	/// The transport failed below the HTTP layer.
	#[error("transport error: {0}")]
	Transport(String),
	/// The maker API answered with a non-success status.
	#[error("maker api error: {0}")]
	Api(String),
	/// The response body could not be decoded.
	#[error("malformed response: {0}")]
	Decode(String),
}

/// Interface to the maker directory and quote source.
#[async_trait]
pub trait MakerApi: Send + Sync {
	/// Lists the makers currently quoting on a network.
	async fn list_market_makers(&self, network_id: u64) -> Result<Vec<String>, ClientError>;

	/// Fetches the pair directory. Raw; validated downstream.
	async fn get_pairs(&self, network_id: u64) -> Result<Value, ClientError>;

	/// Fetches price levels for the given makers, keyed by maker id.
	/// Raw; validated downstream.
	async fn get_price_levels(
		&self,
		network_id: u64,
		makers: &[String],
	) -> Result<HashMap<String, Value>, ClientError>;

	/// Fetches the token directory. Raw; validated downstream.
	async fn get_token_directory(&self, network_id: u64) -> Result<Value, ClientError>;

	/// Fetches the maker-published blacklist. Raw; validated downstream.
	async fn get_blacklist(&self, network_id: u64) -> Result<Value, ClientError>;

	/// Requests a firm quote from one maker. Raw; validated downstream.
	async fn request_firm_quote(&self, request: &FirmQuoteRequest) -> Result<Value, ClientError>;
}

#[derive(Deserialize)]
struct MarketMakersResponse {
	#[serde(rename = "marketMakers")]
	market_makers: Vec<String>,
}

/// HTTP implementation of [`MakerApi`].
pub struct HttpMakerApi {
	http: reqwest::Client,
	base_url: String,
	api_key: Option<String>,
	timeout: Duration,
}

impl HttpMakerApi {
	pub fn new(base_url: impl Into<String>, timeout: Duration, api_key: Option<String>) -> Self {
		Self {
			http: reqwest::Client::new(),
			base_url: base_url.into(),
			api_key,
			timeout,
		}
	}

	fn url(&self, path: &str) -> String {
		format!("{}/{}", self.base_url.trim_end_matches('/'), path)
	}

	async fn get_json(
		&self,
		path: &str,
		query: &[(&str, String)],
	) -> Result<Value, ClientError> {
		let mut request = self.http.get(self.url(path)).query(query);
		if let Some(key) = &self.api_key {
			request = request.header("x-api-key", key);
		}
		self.dispatch(path, request).await
	}

	async fn post_json(&self, path: &str, body: &Value) -> Result<Value, ClientError> {
		let mut request = self.http.post(self.url(path)).json(body);
		if let Some(key) = &self.api_key {
			request = request.header("x-api-key", key);
		}
		self.dispatch(path, request).await
	}

	async fn dispatch(
		&self,
		path: &str,
		request: reqwest::RequestBuilder,
	) -> Result<Value, ClientError> {
		debug!(path, timeout_ms = self.timeout.as_millis() as u64, "maker api call");
		let response = tokio::time::timeout(self.timeout, request.send())
			.await
			.map_err(|_| ClientError::Timeout(self.timeout))?
			.map_err(|e| ClientError::Transport(e.to_string()))?;

		if !response.status().is_success() {
			return Err(ClientError::Api(format!(
				"{} answered {}",
				path,
				response.status()
			)));
		}

		tokio::time::timeout(self.timeout, response.json::<Value>())
			.await
			.map_err(|_| ClientError::Timeout(self.timeout))?
			.map_err(|e| ClientError::Decode(e.to_string()))
	}
}

#[async_trait]
impl MakerApi for HttpMakerApi {
	async fn list_market_makers(&self, network_id: u64) -> Result<Vec<String>, ClientError> {
		let payload = self
			.get_json("market-makers", &[("networkId", network_id.to_string())])
			.await?;
		let response: MarketMakersResponse =
			serde_json::from_value(payload).map_err(|e| ClientError::Decode(e.to_string()))?;
		Ok(response.market_makers)
	}

	async fn get_pairs(&self, network_id: u64) -> Result<Value, ClientError> {
		self.get_json("pairs", &[("networkId", network_id.to_string())])
			.await
	}

	async fn get_price_levels(
		&self,
		network_id: u64,
		makers: &[String],
	) -> Result<HashMap<String, Value>, ClientError> {
		let payload = self
			.get_json(
				"price-levels",
				&[
					("networkId", network_id.to_string()),
					("marketMakers", makers.join(",")),
				],
			)
			.await?;
		let levels = payload
			.get("levels")
			.and_then(Value::as_object)
			.ok_or_else(|| ClientError::Decode("missing levels object".to_string()))?;
		Ok(levels
			.iter()
			.map(|(maker, entry)| (maker.clone(), entry.clone()))
			.collect())
	}

	async fn get_token_directory(&self, network_id: u64) -> Result<Value, ClientError> {
		self.get_json("tokens", &[("networkId", network_id.to_string())])
			.await
	}

	async fn get_blacklist(&self, network_id: u64) -> Result<Value, ClientError> {
		self.get_json("blacklist", &[("networkId", network_id.to_string())])
			.await
	}

	async fn request_firm_quote(&self, request: &FirmQuoteRequest) -> Result<Value, ClientError> {
		let body =
			serde_json::to_value(request).map_err(|e| ClientError::Decode(e.to_string()))?;
		self.post_json("firm-quote", &body).await
	}
}
