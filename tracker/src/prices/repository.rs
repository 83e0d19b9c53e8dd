use anyhow::Result;
use async_trait::async_trait;

use crate::prices::model::{Asset, PriceSample};

/// Append-only sample storage: no update, no delete.
#[async_trait]
pub trait PriceRepository: Send + Sync {
    async fn insert(&self, sample: &PriceSample) -> Result<()>;

    async fn latest(&self, asset: Asset) -> Result<Option<PriceSample>>;

    /// Sample with the greatest timestamp `<= ts_ms`.
    async fn at_or_before(&self, asset: Asset, ts_ms: u64) -> Result<Option<PriceSample>>;

    /// Samples in `[start_ms, end_ms]`, ascending by timestamp.
    async fn in_range(&self, asset: Asset, start_ms: u64, end_ms: u64)
    -> Result<Vec<PriceSample>>;
}
