use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::config::Config;
use crate::error::ApiError;

/// A currency the rate provider can quote.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CurrencyInfo {
    /// Currency symbol, e.g. "BTC"
    pub symbol: String,
    /// Currency name, e.g. "Bitcoin"
    pub name: String,
}

#[derive(Debug, Deserialize)]
struct TickersPayload {
    data: Vec<TickerEntry>,
}

#[derive(Debug, Deserialize)]
struct TickerEntry {
    id: String,
    symbol: String,
    name: String,
}

#[derive(Debug, Deserialize)]
struct RateEntry {
    symbol: String,
    price_usd: String,
}

/// Thin client for the currency-rate provider. The auth core has no
/// dependency on this; it is request/response glue only.
#[derive(Clone)]
pub struct RateClient {
    http: reqwest::Client,
    base_url: String,
}

impl RateClient {
    pub fn new(config: &Config) -> Self {
        RateClient {
            http: reqwest::Client::new(),
            base_url: config.currency_api_url.trim_end_matches('/').to_string(),
        }
    }

    /// List the symbols and names the provider can quote.
    pub async fn available_currencies(&self) -> Result<Vec<CurrencyInfo>, ApiError> {
        let payload: TickersPayload = self
            .http
            .get(format!("{}/tickers/", self.base_url))
            .send()
            .await?
            .json()
            .await?;

        Ok(payload
            .data
            .into_iter()
            .map(|t| CurrencyInfo {
                symbol: t.symbol,
                name: t.name,
            })
            .collect())
    }

    /// Convert `amount` of `from_symbol` into each of `to_symbols`, going
    /// through the provider's per-symbol USD price.
    pub async fn convert(
        &self,
        from_symbol: &str,
        to_symbols: &[String],
        amount: f64,
    ) -> Result<BTreeMap<String, f64>, ApiError> {
        let tickers: TickersPayload = self
            .http
            .get(format!("{}/tickers/", self.base_url))
            .send()
            .await?
            .json()
            .await?;

        let wanted: Vec<&str> = to_symbols
            .iter()
            .map(String::as_str)
            .chain(std::iter::once(from_symbol))
            .collect();

        let ids: Vec<String> = tickers
            .data
            .into_iter()
            .filter(|t| wanted.contains(&t.symbol.as_str()))
            .map(|t| t.id)
            .collect();

        let rates: Vec<RateEntry> = self
            .http
            .get(format!("{}/ticker/", self.base_url))
            .query(&[("id", ids.join(","))])
            .send()
            .await?
            .json()
            .await?;

        let base_rate = rates
            .iter()
            .find(|r| r.symbol == from_symbol)
            .map(|r| parse_price(&r.price_usd))
            .transpose()?
            .ok_or_else(|| {
                ApiError::Internal(format!("Rate feed is missing '{}'", from_symbol))
            })?;

        let mut conversions = BTreeMap::new();
        for rate in rates.iter().filter(|r| r.symbol != from_symbol) {
            let price = parse_price(&rate.price_usd)?;
            conversions.insert(rate.symbol.clone(), round8(base_rate * amount / price));
        }

        Ok(conversions)
    }
}

fn parse_price(raw: &str) -> Result<f64, ApiError> {
    raw.parse::<f64>()
        .map_err(|_| ApiError::Internal(format!("Unparseable price in rate feed: '{}'", raw)))
}

fn round8(value: f64) -> f64 {
    (value * 1e8).round() / 1e8
}
