use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use common::logger::warn_if_slow;
use rust_decimal::Decimal;
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

use crate::alerts::model::PriceAlert;
use crate::alerts::repository::AlertRepository;
use crate::prices::model::Asset;

/// Stores target alerts and hands each one out for notification at most once.
pub struct AlertRegistry {
    repo: Arc<dyn AlertRepository>,
}

impl AlertRegistry {
    pub fn new(repo: Arc<dyn AlertRepository>) -> Self {
        Self { repo }
    }

    /// Persists a new pending alert. Input shape is validated by the caller.
    #[instrument(skip(self, email), target = "alerts", fields(asset = %asset, target_price = %target_price))]
    pub async fn create(
        &self,
        asset: Asset,
        target_price: Decimal,
        email: String,
        now_ms: u64,
    ) -> Result<PriceAlert> {
        let alert = PriceAlert::new(asset, target_price, email, now_ms);

        warn_if_slow("db_insert_alert", Duration::from_millis(50), async {
            self.repo.insert(&alert).await
        })
        .await
        .context("failed to persist price alert")?;

        info!(alert_id = %alert.id, "price alert created");
        Ok(alert)
    }

    pub async fn get(&self, alert_id: &Uuid) -> Result<Option<PriceAlert>> {
        self.repo
            .fetch_by_id(alert_id)
            .await
            .context("failed to load price alert")
    }

    /// Fires every pending alert for `asset` whose target is at or below
    /// `current_price` and returns exactly the alerts newly fired by this call.
    ///
    /// An alert another caller already claimed is left out. A failed update is
    /// logged and the alert stays pending for the next evaluation.
    #[instrument(skip(self), target = "alerts", fields(asset = %asset, price = %current_price))]
    pub async fn evaluate_and_trigger(
        &self,
        asset: Asset,
        current_price: Decimal,
        now_ms: u64,
    ) -> Result<Vec<PriceAlert>> {
        let pending = warn_if_slow("db_fetch_pending_alerts", Duration::from_millis(100), async {
            self.repo.fetch_pending(asset).await
        })
        .await
        .context("failed to load pending alerts")?;

        let mut fired = Vec::new();
        for mut alert in pending.into_iter().filter(|a| a.is_hit_by(current_price)) {
            match self.repo.mark_triggered(&alert.id, now_ms).await {
                Ok(true) => {
                    alert.trigger(now_ms);
                    fired.push(alert);
                }
                Ok(false) => {
                    debug!(alert_id = %alert.id, "alert already claimed by another evaluation");
                }
                Err(e) => {
                    warn!(alert_id = %alert.id, error = ?e, "failed to mark alert triggered");
                }
            }
        }

        if !fired.is_empty() {
            info!(count = fired.len(), "price alerts triggered");
        }
        Ok(fired)
    }
}
