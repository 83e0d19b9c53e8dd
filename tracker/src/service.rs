//! Operations exposed to the request boundary (HTTP layer or CLI).
//!
//! Input shape is validated here before any core logic or network call runs.

use std::str::FromStr;
use std::sync::Arc;

use rust_decimal::Decimal;
use tracing::instrument;

use crate::alerts::model::PriceAlert;
use crate::alerts::registry::AlertRegistry;
use crate::error::AppError;
use crate::prices::model::Asset;
use crate::prices::resampler::{HourlyResampler, PriceHistory};
use crate::prices::store::TimeSeriesStore;
use crate::swap::{SwapCalculator, SwapQuote, parse_amount};

pub struct PriceService {
    resampler: HourlyResampler,
    alerts: Arc<AlertRegistry>,
    swap: SwapCalculator,
}

impl PriceService {
    pub fn new(
        store: Arc<TimeSeriesStore>,
        alerts: Arc<AlertRegistry>,
        swap: SwapCalculator,
    ) -> Self {
        Self {
            resampler: HourlyResampler::new(store),
            alerts,
            swap,
        }
    }

    /// Hourly prices for the 24h ending at `now_ms`, or `NoData`.
    #[instrument(skip(self), target = "service")]
    pub async fn get_history(&self, asset: &str, now_ms: u64) -> Result<PriceHistory, AppError> {
        let asset = parse_asset(asset)?;
        Ok(self.resampler.history(asset, now_ms).await?)
    }

    #[instrument(skip(self, email), target = "service")]
    pub async fn create_alert(
        &self,
        asset: &str,
        target_price: Decimal,
        email: &str,
        now_ms: u64,
    ) -> Result<PriceAlert, AppError> {
        let asset = parse_asset(asset)?;
        let email = validate_email(email)?;

        Ok(self
            .alerts
            .create(asset, target_price, email, now_ms)
            .await?)
    }

    /// Quotes a swap for a raw amount string; bad input never reaches the oracle.
    #[instrument(skip(self), target = "service")]
    pub async fn quote_swap(&self, amount: &str) -> Result<SwapQuote, AppError> {
        let amount = parse_amount(amount)?;
        self.swap.quote(amount).await
    }
}

fn parse_asset(raw: &str) -> Result<Asset, AppError> {
    Asset::from_str(raw).map_err(|e| AppError::invalid(e.to_string()))
}

/// Shape check only: non-empty local part, dotted domain, no whitespace.
fn validate_email(raw: &str) -> Result<String, AppError> {
    let email = raw.trim();
    let invalid = || AppError::invalid(format!("invalid email address: {raw:?}"));

    if email.chars().any(char::is_whitespace) {
        return Err(invalid());
    }
    let (local, domain) = email.split_once('@').ok_or_else(invalid)?;
    let dotted = domain.contains('.') && domain.split('.').all(|label| !label.is_empty());

    if local.is_empty() || domain.contains('@') || !dotted {
        return Err(invalid());
    }
    Ok(email.to_string())
}
