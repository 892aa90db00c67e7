use std::collections::BTreeMap;

use axum::extract::State;
use axum::routing::{get, post};
use axum::Router;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::currency::CurrencyInfo;
use crate::error::ApiError;
use crate::extractors::{CurrentUser, Json};

use super::AppState;

// ── Request / Response types ──

#[derive(Debug, Serialize, ToSchema)]
pub struct CurrencyListResponse {
    pub currencies: Vec<CurrencyInfo>,
}

fn default_amount() -> f64 {
    1.0
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct ConvertRequest {
    /// Currency symbol to convert from, e.g. "ETH"
    pub from_symbol: String,
    /// Amount to convert (must be positive)
    #[serde(default = "default_amount")]
    #[validate(range(exclusive_min = 0.0))]
    pub amount: f64,
    /// Currency symbols to convert to
    #[validate(length(min = 1))]
    pub to_symbols: Vec<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ConvertRatesResponse {
    pub from_symbol: String,
    pub amount: f64,
    pub rates: BTreeMap<String, f64>,
}

// ── Routes ──

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/list", get(list))
        .route("/convert", post(convert))
}

// ── Handlers ──

/// List the currencies the rate provider can quote.
#[utoipa::path(
    get,
    path = "/api/currency/list",
    responses(
        (status = 200, description = "Available currencies", body = CurrencyListResponse),
        (status = 401, description = "Invalid token")
    ),
    tag = "currency",
    security(("bearer_auth" = []))
)]
pub async fn list(
    State(state): State<AppState>,
    _user: CurrentUser,
) -> Result<Json<CurrencyListResponse>, ApiError> {
    let currencies = state.rates.available_currencies().await?;
    Ok(Json(CurrencyListResponse { currencies }))
}

/// Convert an amount of one currency into several others.
#[utoipa::path(
    post,
    path = "/api/currency/convert",
    request_body = ConvertRequest,
    responses(
        (status = 200, description = "Conversion rates", body = ConvertRatesResponse),
        (status = 400, description = "Unknown currency symbol"),
        (status = 401, description = "Invalid token")
    ),
    tag = "currency",
    security(("bearer_auth" = []))
)]
pub async fn convert(
    State(state): State<AppState>,
    _user: CurrentUser,
    Json(payload): Json<ConvertRequest>,
) -> Result<Json<ConvertRatesResponse>, ApiError> {
    let available = state.rates.available_currencies().await?;
    let symbols: Vec<&str> = available.iter().map(|c| c.symbol.as_str()).collect();

    if !symbols.contains(&payload.from_symbol.as_str()) {
        return Err(ApiError::InvalidSymbol(format!(
            "Invalid 'from' symbol: '{}'",
            payload.from_symbol
        )));
    }

    let invalid: Vec<&str> = payload
        .to_symbols
        .iter()
        .map(String::as_str)
        .filter(|s| !symbols.contains(s))
        .collect();
    if !invalid.is_empty() {
        return Err(ApiError::InvalidSymbol(format!(
            "Invalid 'to' currencies: {:?}, check the available symbols",
            invalid
        )));
    }

    let rates = state
        .rates
        .convert(&payload.from_symbol, &payload.to_symbols, payload.amount)
        .await?;

    Ok(Json(ConvertRatesResponse {
        from_symbol: payload.from_symbol,
        amount: payload.amount,
        rates,
    }))
}
