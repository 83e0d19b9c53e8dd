//! Hourly surge rule: the latest price is more than 3% above the price one
//! hour earlier.

use std::sync::Arc;

use anyhow::Result;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use tracing::{debug, instrument};

use crate::prices::model::Asset;
use crate::prices::store::TimeSeriesStore;
use crate::time::HOUR_MS;

/// Strict lower bound on the hourly increase, in percent.
pub const SURGE_THRESHOLD_PCT: Decimal = dec!(3);

/// How far back the reference sample is taken from.
pub const SURGE_LOOKBACK_MS: u64 = HOUR_MS;

/// Percentage change from `old` to `new`.
///
/// `None` when `old` is zero or negative, or the arithmetic overflows.
pub fn increase_pct(old: Decimal, new: Decimal) -> Option<Decimal> {
    if old <= Decimal::ZERO {
        return None;
    }
    new.checked_sub(old)?
        .checked_div(old)?
        .checked_mul(Decimal::ONE_HUNDRED)
}

/// Fails closed: an unusable reference price never counts as a surge.
pub fn is_surge(old: Decimal, new: Decimal) -> bool {
    increase_pct(old, new).is_some_and(|pct| pct > SURGE_THRESHOLD_PCT)
}

/// Stateless per call; a sustained rise qualifies on every evaluation.
pub struct SurgeDetector {
    store: Arc<TimeSeriesStore>,
}

impl SurgeDetector {
    pub fn new(store: Arc<TimeSeriesStore>) -> Self {
        Self { store }
    }

    #[instrument(skip(self), target = "surge", fields(asset = %asset))]
    pub async fn detect(&self, asset: Asset, now_ms: u64) -> Result<bool> {
        let Some(latest) = self.store.latest(asset).await? else {
            debug!("no samples yet");
            return Ok(false);
        };

        let Some(old) = self
            .store
            .at_or_before(asset, now_ms.saturating_sub(SURGE_LOOKBACK_MS))
            .await?
        else {
            debug!("insufficient history for surge check");
            return Ok(false);
        };

        let surge = is_surge(old.price, latest.price);
        debug!(
            old = %old.price,
            new = %latest.price,
            pct = ?increase_pct(old.price, latest.price),
            surge,
            "surge evaluated"
        );
        Ok(surge)
    }
}
