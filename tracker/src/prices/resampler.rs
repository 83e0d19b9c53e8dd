//! Hourly resampling of the raw sample series.
//!
//! The window is `[end - 24h, end]`. For each of the 24 hour marks starting at
//! `end - 24h`, the observed sample closest in time is selected. Prices are
//! never interpolated or averaged.
//!
//! Tie rule: samples are scanned in ascending timestamp order and the first
//! sample reaching the minimal distance wins, so on an exact tie the earlier
//! sample is chosen.

use std::sync::Arc;

use anyhow::Result;
use rust_decimal::Decimal;
use serde::Serialize;
use tracing::{debug, instrument};

use crate::prices::model::{Asset, PriceSample};
use crate::prices::store::TimeSeriesStore;
use crate::time::{DAY_MS, HOUR_MS};

/// Number of hourly points in a history.
pub const HOURLY_POINTS: usize = 24;

/// Message shown to callers before any sample has been collected.
pub const NO_DATA_MESSAGE: &str = "No data found, please wait for data to be collected";

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct HourlyPrice {
    pub ts_ms: u64,
    pub price: Decimal,
}

/// Result of a history query. `NoData` is distinct from any series so callers
/// never confuse "nothing collected yet" with real prices.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PriceHistory {
    NoData,
    Hourly(Vec<HourlyPrice>),
}

impl PriceHistory {
    pub fn points(&self) -> Option<&[HourlyPrice]> {
        match self {
            PriceHistory::NoData => None,
            PriceHistory::Hourly(points) => Some(points),
        }
    }

    pub fn is_no_data(&self) -> bool {
        matches!(self, PriceHistory::NoData)
    }

    /// Text shown to a caller in place of an empty series.
    pub fn message(&self) -> Option<&'static str> {
        self.is_no_data().then_some(NO_DATA_MESSAGE)
    }
}

/// Nearest-neighbour resampling of `samples` onto hour marks starting at `start_ms`.
pub fn resample_hourly(samples: &[PriceSample], start_ms: u64) -> PriceHistory {
    if samples.is_empty() {
        return PriceHistory::NoData;
    }

    // Fix the scan order regardless of how the caller collected the samples.
    let mut ordered: Vec<&PriceSample> = samples.iter().collect();
    ordered.sort_by_key(|s| s.ts_ms);

    let points = (0..HOURLY_POINTS as u64)
        .map(|i| {
            let hour_mark = start_ms + i * HOUR_MS;
            let closest = nearest(&ordered, hour_mark);
            HourlyPrice {
                ts_ms: hour_mark,
                price: closest.price,
            }
        })
        .collect();

    PriceHistory::Hourly(points)
}

fn nearest<'a>(ordered: &[&'a PriceSample], mark: u64) -> &'a PriceSample {
    let mut best = ordered[0];
    for s in &ordered[1..] {
        // strict `<` keeps the earlier sample on ties
        if s.ts_ms.abs_diff(mark) < best.ts_ms.abs_diff(mark) {
            best = s;
        }
    }
    best
}

/// Read path for the hourly view: store range query followed by resampling.
pub struct HourlyResampler {
    store: Arc<TimeSeriesStore>,
}

impl HourlyResampler {
    pub fn new(store: Arc<TimeSeriesStore>) -> Self {
        Self { store }
    }

    #[instrument(skip(self), target = "history", fields(asset = %asset))]
    pub async fn history(&self, asset: Asset, end_ms: u64) -> Result<PriceHistory> {
        let start_ms = end_ms.saturating_sub(DAY_MS);
        let samples = self.store.in_range(asset, start_ms, end_ms).await?;

        let history = resample_hourly(&samples, start_ms);
        debug!(
            samples = samples.len(),
            no_data = history.is_no_data(),
            "history resampled"
        );
        Ok(history)
    }
}
