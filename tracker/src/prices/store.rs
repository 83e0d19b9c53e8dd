use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use common::logger::warn_if_slow;
use rust_decimal::Decimal;
use tracing::{debug, instrument};

use crate::prices::model::{Asset, PriceSample};
use crate::prices::repository::PriceRepository;

/// Write-once, read-many view over the sample repository.
///
/// Used by the scheduler (writes), the surge detector and the resampler (reads).
pub struct TimeSeriesStore {
    repo: Arc<dyn PriceRepository>,
}

impl TimeSeriesStore {
    pub fn new(repo: Arc<dyn PriceRepository>) -> Self {
        Self { repo }
    }

    #[instrument(skip(self), target = "store", fields(asset = %asset, price = %price))]
    pub async fn append(&self, asset: Asset, price: Decimal, ts_ms: u64) -> Result<PriceSample> {
        let sample = PriceSample {
            asset,
            price,
            ts_ms,
        };

        warn_if_slow("db_insert_sample", Duration::from_millis(50), async {
            self.repo.insert(&sample).await
        })
        .await
        .context("failed to append price sample")?;

        debug!("price sample appended");
        Ok(sample)
    }

    #[instrument(skip(self), target = "store", fields(asset = %asset))]
    pub async fn latest(&self, asset: Asset) -> Result<Option<PriceSample>> {
        warn_if_slow("db_latest_sample", Duration::from_millis(50), async {
            self.repo.latest(asset).await
        })
        .await
        .context("failed to read latest sample")
    }

    #[instrument(skip(self), target = "store", fields(asset = %asset))]
    pub async fn at_or_before(&self, asset: Asset, ts_ms: u64) -> Result<Option<PriceSample>> {
        warn_if_slow("db_sample_at_or_before", Duration::from_millis(50), async {
            self.repo.at_or_before(asset, ts_ms).await
        })
        .await
        .context("failed to read sample at or before instant")
    }

    #[instrument(skip(self), target = "store", fields(asset = %asset))]
    pub async fn in_range(
        &self,
        asset: Asset,
        start_ms: u64,
        end_ms: u64,
    ) -> Result<Vec<PriceSample>> {
        let rows = warn_if_slow("db_samples_in_range", Duration::from_millis(200), async {
            self.repo.in_range(asset, start_ms, end_ms).await
        })
        .await
        .context("failed to read samples in range")?;

        debug!(count = rows.len(), "range query complete");
        Ok(rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;
    use rust_decimal_macros::dec;

    #[derive(Default)]
    struct VecRepo {
        rows: Mutex<Vec<PriceSample>>,
    }

    #[async_trait::async_trait]
    impl PriceRepository for VecRepo {
        async fn insert(&self, sample: &PriceSample) -> Result<()> {
            self.rows.lock().push(sample.clone());
            Ok(())
        }

        async fn latest(&self, asset: Asset) -> Result<Option<PriceSample>> {
            Ok(self
                .rows
                .lock()
                .iter()
                .filter(|s| s.asset == asset)
                .max_by_key(|s| s.ts_ms)
                .cloned())
        }

        async fn at_or_before(&self, asset: Asset, ts_ms: u64) -> Result<Option<PriceSample>> {
            Ok(self
                .rows
                .lock()
                .iter()
                .filter(|s| s.asset == asset && s.ts_ms <= ts_ms)
                .max_by_key(|s| s.ts_ms)
                .cloned())
        }

        async fn in_range(&self, asset: Asset, start: u64, end: u64) -> Result<Vec<PriceSample>> {
            let mut v: Vec<_> = self
                .rows
                .lock()
                .iter()
                .filter(|s| s.asset == asset && s.ts_ms >= start && s.ts_ms <= end)
                .cloned()
                .collect();
            v.sort_by_key(|s| s.ts_ms);
            Ok(v)
        }
    }

    struct OfflineRepo;

    #[async_trait::async_trait]
    impl PriceRepository for OfflineRepo {
        async fn insert(&self, _: &PriceSample) -> Result<()> {
            Err(anyhow::anyhow!("Database Offline"))
        }
        async fn latest(&self, _: Asset) -> Result<Option<PriceSample>> {
            Err(anyhow::anyhow!("Database Offline"))
        }
        async fn at_or_before(&self, _: Asset, _: u64) -> Result<Option<PriceSample>> {
            Err(anyhow::anyhow!("Database Offline"))
        }
        async fn in_range(&self, _: Asset, _: u64, _: u64) -> Result<Vec<PriceSample>> {
            Err(anyhow::anyhow!("Database Offline"))
        }
    }

    #[tokio::test]
    async fn append_returns_the_written_sample() {
        let repo = Arc::new(VecRepo::default());
        let store = TimeSeriesStore::new(repo.clone());

        let s = store.append(Asset::Ethereum, dec!(2000.5), 10).await.unwrap();

        assert_eq!(s.price, dec!(2000.5));
        assert_eq!(repo.rows.lock().len(), 1);
    }

    #[tokio::test]
    async fn reads_tolerate_out_of_order_appends() {
        let store = TimeSeriesStore::new(Arc::new(VecRepo::default()));

        store.append(Asset::Polygon, dec!(3), 300).await.unwrap();
        store.append(Asset::Polygon, dec!(1), 100).await.unwrap();
        store.append(Asset::Polygon, dec!(2), 200).await.unwrap();

        let latest = store.latest(Asset::Polygon).await.unwrap().unwrap();
        assert_eq!(latest.ts_ms, 300);

        let before = store.at_or_before(Asset::Polygon, 250).await.unwrap().unwrap();
        assert_eq!(before.price, dec!(2));

        let range = store.in_range(Asset::Polygon, 100, 300).await.unwrap();
        let ts: Vec<_> = range.iter().map(|s| s.ts_ms).collect();
        assert_eq!(ts, vec![100, 200, 300]);
    }

    #[tokio::test]
    async fn storage_errors_propagate_with_root_cause() {
        let store = TimeSeriesStore::new(Arc::new(OfflineRepo));

        let result = store.append(Asset::Ethereum, dec!(1), 1).await;

        let err_msg = format!("{:?}", result.unwrap_err());
        assert!(err_msg.contains("Database Offline"), "got: {err_msg}");
    }
}
