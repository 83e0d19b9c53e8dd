//! Ingestion scheduler.
//!
//! Responsibilities:
//! - On every tick, sample each tracked asset from the oracle and append it.
//! - Fire target alerts whose threshold the new price reached.
//! - Detect hourly surges and dispatch surge notifications.
//!
//! Failure containment:
//! - Each asset runs its own pipeline; an oracle or storage failure ends that
//!   asset's work for the tick and the remaining assets still run.
//! - Notification failures are logged and counted, never retried here.
//! - Nothing is surfaced to a caller; the next tick starts from scratch.
//!
//! Ticks never overlap: the loop awaits each tick before waiting for the next
//! one and skips missed ticks.

use std::sync::Arc;
use std::time::Duration;

use common::logger::{TraceId, annotate_asset, child_span, root_span, warn_if_slow};
use rust_decimal::Decimal;
use tokio::time::{MissedTickBehavior, interval};
use tracing::{Instrument, debug, error, info, warn};

use crate::alerts::registry::AlertRegistry;
use crate::alerts::surge::{SURGE_LOOKBACK_MS, SurgeDetector};
use crate::error::AppError;
use crate::metrics::counters::Counters;
use crate::notify::Notifier;
use crate::oracle::PriceOracle;
use crate::prices::model::Asset;
use crate::prices::store::TimeSeriesStore;
use crate::time::{format_ms, now_ms};

/// Outcome of one tick, for logging and tests. Never an error.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TickReport {
    pub sampled: Vec<Asset>,
    pub failed: Vec<Asset>,
    pub alerts_fired: usize,
    pub surges_notified: usize,
}

#[derive(Debug, Default)]
struct AssetOutcome {
    alerts_fired: usize,
    surge_notified: bool,
}

pub struct IngestionScheduler {
    oracle: Arc<dyn PriceOracle>,
    store: Arc<TimeSeriesStore>,
    alerts: Arc<AlertRegistry>,
    surge: SurgeDetector,
    notifier: Arc<dyn Notifier>,
    assets: Vec<Asset>,

    /// Observability counters (does not affect behavior).
    counters: Counters,
}

impl IngestionScheduler {
    pub fn new(
        oracle: Arc<dyn PriceOracle>,
        store: Arc<TimeSeriesStore>,
        alerts: Arc<AlertRegistry>,
        notifier: Arc<dyn Notifier>,
        counters: Counters,
    ) -> Self {
        Self {
            oracle,
            surge: SurgeDetector::new(store.clone()),
            store,
            alerts,
            notifier,
            assets: Asset::ALL.to_vec(),
            counters,
        }
    }

    /// Restricts the tick to a subset of assets.
    pub fn with_assets(mut self, assets: Vec<Asset>) -> Self {
        self.assets = assets;
        self
    }

    /// Runs forever, one tick per `every`. The first tick fires immediately.
    pub async fn run(self, every: Duration) {
        let mut ticker = interval(every);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        info!(
            every_secs = every.as_secs(),
            assets = ?self.assets,
            "ingestion scheduler started"
        );

        loop {
            ticker.tick().await;

            let trace_id = TraceId::new();
            let now = now_ms();
            let report = self
                .on_tick(now)
                .instrument(root_span("ingestion_tick", &trace_id))
                .await;

            info!(
                trace_id = %trace_id,
                at = %format_ms(now),
                sampled = report.sampled.len(),
                failed = report.failed.len(),
                alerts_fired = report.alerts_fired,
                surges_notified = report.surges_notified,
                "ingestion tick finished"
            );
        }
    }

    /// Executes one tick at `now_ms`.
    pub async fn on_tick(&self, now_ms: u64) -> TickReport {
        Counters::incr(&self.counters.ticks);
        debug!(assets = self.assets.len(), "starting ingestion tick");

        let mut report = TickReport::default();

        for &asset in &self.assets {
            let mut outcome = AssetOutcome::default();
            let result = self
                .process_asset(asset, now_ms, &mut outcome)
                .instrument(child_span("asset_pipeline"))
                .await;

            // Work done before a failure still counts.
            report.alerts_fired += outcome.alerts_fired;
            report.surges_notified += usize::from(outcome.surge_notified);

            match result {
                Ok(()) => report.sampled.push(asset),
                Err(e) => {
                    match &e {
                        AppError::ServiceUnavailable(_) => {
                            Counters::incr(&self.counters.oracle_failures)
                        }
                        AppError::Storage(_) => Counters::incr(&self.counters.storage_failures),
                        AppError::InvalidInput(_) => {}
                    }
                    error!(asset = %asset, error = %e, "asset pipeline failed; continuing with next asset");
                    report.failed.push(asset);
                }
            }
        }

        report
    }

    /// Runs the asset pipeline, recording progress in `outcome` as each step
    /// completes so a later failure does not hide notifications already sent.
    async fn process_asset(
        &self,
        asset: Asset,
        now_ms: u64,
        outcome: &mut AssetOutcome,
    ) -> Result<(), AppError> {
        annotate_asset(asset.name());

        // 1) Sample.
        let price = warn_if_slow("oracle_usd_price", Duration::from_secs(2), async {
            self.oracle.usd_price(asset.token_address()).await
        })
        .await?;

        // 2) Persist. A failed write ends this asset's tick.
        self.store.append(asset, price, now_ms).await?;
        Counters::incr(&self.counters.samples_written);

        // 3) Target alerts.
        let fired = self
            .alerts
            .evaluate_and_trigger(asset, price, now_ms)
            .await?;
        outcome.alerts_fired = fired.len();
        for alert in &fired {
            Counters::incr(&self.counters.alerts_fired);
            if let Err(e) = self
                .notifier
                .notify_target_alert(&alert.email, asset, alert.target_price)
                .await
            {
                Counters::incr(&self.counters.notify_failures);
                warn!(alert_id = %alert.id, error = ?e, "target alert notification failed");
            }
        }

        // 4) Surge.
        outcome.surge_notified = self.check_surge(asset, price, now_ms).await?;

        Ok(())
    }

    async fn check_surge(
        &self,
        asset: Asset,
        current_price: Decimal,
        now_ms: u64,
    ) -> Result<bool, AppError> {
        if !self.surge.detect(asset, now_ms).await? {
            return Ok(false);
        }

        let Some(old) = self
            .store
            .at_or_before(asset, now_ms.saturating_sub(SURGE_LOOKBACK_MS))
            .await?
        else {
            warn!("surge detected but hour-ago sample is missing; skipping notification");
            return Ok(false);
        };

        info!(old = %old.price, new = %current_price, "significant hourly increase");

        match self
            .notifier
            .notify_surge(asset, old.price, current_price)
            .await
        {
            Ok(()) => {
                Counters::incr(&self.counters.surges_notified);
                Ok(true)
            }
            Err(e) => {
                Counters::incr(&self.counters.notify_failures);
                warn!(error = ?e, "surge notification failed");
                Ok(false)
            }
        }
    }
}
