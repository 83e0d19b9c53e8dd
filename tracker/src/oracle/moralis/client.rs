use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use rust_decimal::Decimal;
use rust_decimal::prelude::FromPrimitive;
use tracing::{debug, instrument};

use crate::oracle::moralis::types::TokenPrice;
use crate::oracle::{OracleError, PriceOracle};

#[derive(Clone)]
pub struct MoralisClient {
    http: Client,
    url: String,
    api_key: String,
}

impl MoralisClient {
    pub fn new(url: String, api_key: String, timeout: Duration) -> Result<Self, OracleError> {
        let http = Client::builder()
            .timeout(timeout)
            .pool_idle_timeout(Duration::from_secs(30))
            .tcp_keepalive(Duration::from_secs(30))
            .build()?;

        Ok(Self { http, url, api_key })
    }

    #[instrument(
        skip(self),
        fields(token_address = %token_address),
        level = "debug"
    )]
    pub async fn fetch_token_price(&self, token_address: &str) -> Result<TokenPrice, OracleError> {
        if self.api_key.trim().is_empty() {
            return Err(OracleError::MissingApiKey);
        }

        let url = format!("{}/erc20/{}/price", self.url, token_address);

        let resp = self
            .http
            .get(&url)
            .query(&[("chain", "eth")])
            .header("X-API-Key", &self.api_key)
            .header("accept", "application/json")
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(OracleError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let price: TokenPrice = resp.json().await?;

        debug!(
            usd_price = price.usd_price,
            symbol = ?price.token_symbol,
            "moralis token price fetched"
        );

        Ok(price)
    }
}

#[async_trait]
impl PriceOracle for MoralisClient {
    async fn usd_price(&self, token_address: &str) -> Result<Decimal, OracleError> {
        let price = self.fetch_token_price(token_address).await?;
        to_usd_decimal(&price)
    }
}

/// Converts the float quote into a decimal, rejecting values that cannot be a
/// real spot price.
fn to_usd_decimal(price: &TokenPrice) -> Result<Decimal, OracleError> {
    let v = price.usd_price;
    if !v.is_finite() || v <= 0.0 {
        return Err(OracleError::InvalidResponse(format!(
            "non-positive usd price: {v}"
        )));
    }

    Decimal::from_f64(v)
        .ok_or_else(|| OracleError::InvalidResponse(format!("unrepresentable usd price: {v}")))
}
