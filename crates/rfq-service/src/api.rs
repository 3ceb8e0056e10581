//! HTTP surface for the RFQ engine.
//!
//! Thin translation layer: amounts cross the wire as decimal strings and
//! every engine error maps onto a status code plus a JSON error body.

use alloy_primitives::U256;
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use axum::routing::{get, post};
use axum::Router;
use bigdecimal::BigDecimal;
use rfq_core::{EngineError, RfqEngine};
use rfq_types::{TradeParams, TradeSide};
use rfq_validation::ValidationError;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::str::FromStr;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;

#[derive(Clone)]
struct AppState {
	engine: Arc<RfqEngine>,
}

/// Binds the listener and serves the API until the task is aborted.
pub async fn serve(engine: Arc<RfqEngine>, port: u16) -> anyhow::Result<()> {
	let app = router(engine);
	let listener = tokio::net::TcpListener::bind(("0.0.0.0", port)).await?;
	info!(port, "rfq service listening");
	axum::serve(listener, app).await?;
	Ok(())
}

fn router(engine: Arc<RfqEngine>) -> Router {
	Router::new()
		.route("/health", get(health))
		.route("/pools", get(get_pools))
		.route("/pools/top", get(get_top_pools))
		.route("/prices", post(post_prices))
		.route("/preprocess", post(post_preprocess))
		.route("/orders/validate", post(post_validate_order))
		.route("/gas-overhead", get(get_gas_overhead))
		.with_state(AppState { engine })
		.layer(TraceLayer::new_for_http())
		.layer(CorsLayer::permissive())
}

struct ApiError(EngineError);

impl From<EngineError> for ApiError {
	fn from(err: EngineError) -> Self {
		Self(err)
	}
}

impl From<ValidationError> for ApiError {
	fn from(err: ValidationError) -> Self {
		Self(EngineError::Validation(err))
	}
}

impl IntoResponse for ApiError {
	fn into_response(self) -> Response {
		let status = match &self.0 {
			EngineError::UserBlacklisted
			| EngineError::Rfq(_)
			| EngineError::SlippageExceeded { .. }
			| EngineError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
			EngineError::Configuration(_) => StatusCode::BAD_REQUEST,
			_ => StatusCode::BAD_GATEWAY,
		};
		(status, Json(json!({"error": self.0.to_string()}))).into_response()
	}
}

async fn health() -> Json<Value> {
	Json(json!({"status": "ok"}))
}

#[derive(Deserialize)]
struct PoolsQuery {
	src: String,
	dest: String,
}

async fn get_pools(
	State(state): State<AppState>,
	Query(query): Query<PoolsQuery>,
) -> Result<Json<Value>, ApiError> {
	let pools = state.engine.pool_identifiers(&query.src, &query.dest).await?;
	Ok(Json(json!({"pools": pools})))
}

#[derive(Deserialize)]
struct TopPoolsQuery {
	token: String,
	#[serde(default = "default_top_pools_limit")]
	limit: usize,
}

fn default_top_pools_limit() -> usize {
	10
}

async fn get_top_pools(
	State(state): State<AppState>,
	Query(query): Query<TopPoolsQuery>,
) -> Result<Json<Value>, ApiError> {
	let pools = state
		.engine
		.top_pools_for_token(&query.token, query.limit)
		.await?;
	Ok(Json(json!({"pools": pools})))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct PricesRequest {
	src_token: String,
	dest_token: String,
	/// Non-decreasing base-unit amounts as decimal strings.
	amounts: Vec<String>,
	side: TradeSide,
	#[serde(default)]
	pools: Option<Vec<String>>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct MakerPricesBody {
	pool_identifier: String,
	maker: String,
	unit: String,
	prices: Vec<String>,
}

async fn post_prices(
	State(state): State<AppState>,
	Json(request): Json<PricesRequest>,
) -> Result<Json<Value>, ApiError> {
	let amounts = parse_amounts(&request.amounts)?;
	let prices = state
		.engine
		.prices_for(
			&request.src_token,
			&request.dest_token,
			&amounts,
			request.side,
			request.pools.as_deref(),
		)
		.await?;

	let prices: Vec<MakerPricesBody> = prices
		.into_iter()
		.map(|entry| MakerPricesBody {
			pool_identifier: entry.pool_identifier,
			maker: entry.maker,
			unit: entry.unit.to_string(),
			prices: entry.prices.iter().map(|price| price.to_string()).collect(),
		})
		.collect();
	Ok(Json(json!({"prices": prices})))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct PreprocessRequest {
	src_token: String,
	dest_token: String,
	src_amount: String,
	dest_amount: String,
	side: TradeSide,
	maker: String,
	tx_origin: String,
	#[serde(default)]
	receiver: Option<String>,
	#[serde(default)]
	slippage_factor: Option<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct PreparedTradeBody {
	pool: String,
	signature: String,
	base_token_amount: String,
	quote_token_amount: String,
	nonce: String,
	tx_id: String,
	deadline: u64,
}

async fn post_preprocess(
	State(state): State<AppState>,
	Json(request): Json<PreprocessRequest>,
) -> Result<Json<Value>, ApiError> {
	let slippage_factor = request
		.slippage_factor
		.as_deref()
		.unwrap_or(state.engine.config().pricing.default_slippage_factor.as_str());
	let slippage_factor = BigDecimal::from_str(slippage_factor).map_err(|_| {
		ValidationError::new("slippageFactor", "not a decimal number")
	})?;

	let trade = TradeParams {
		src_token: request.src_token,
		dest_token: request.dest_token,
		src_amount: parse_amount("srcAmount", &request.src_amount)?,
		dest_amount: parse_amount("destAmount", &request.dest_amount)?,
		side: request.side,
		maker: request.maker,
		tx_origin: request.tx_origin,
		receiver: request.receiver,
		slippage_factor,
	};

	let prepared = state.engine.preprocess_transaction(&trade).await?;
	Ok(Json(json!({
		"trade": PreparedTradeBody {
			pool: prepared.pool,
			signature: prepared.signature,
			base_token_amount: prepared.base_token_amount.to_string(),
			quote_token_amount: prepared.quote_token_amount.to_string(),
			nonce: prepared.nonce,
			tx_id: prepared.tx_id,
			deadline: prepared.deadline,
		}
	})))
}

async fn post_validate_order(
	State(state): State<AppState>,
	Json(payload): Json<Value>,
) -> Result<Json<Value>, ApiError> {
	let order = state.engine.validate_order(&payload)?;
	Ok(Json(json!({"order": order})))
}

async fn get_gas_overhead(State(state): State<AppState>) -> Json<Value> {
	Json(json!({"gasOverhead": state.engine.gas_estimate_overhead()}))
}

fn parse_amounts(raw: &[String]) -> Result<Vec<U256>, ApiError> {
	raw.iter()
		.enumerate()
		.map(|(i, amount)| parse_amount(&format!("amounts[{}]", i), amount))
		.collect()
}

fn parse_amount(path: &str, raw: &str) -> Result<U256, ApiError> {
	U256::from_str_radix(raw, 10).map_err(|_| {
		ApiError::from(ValidationError::new(
			path,
			"not a non-negative integer amount",
		))
	})
}
