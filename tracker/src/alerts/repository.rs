use anyhow::Result;
use async_trait::async_trait;
use uuid::Uuid;

use crate::alerts::model::PriceAlert;
use crate::prices::model::Asset;

#[async_trait]
pub trait AlertRepository: Send + Sync {
    async fn insert(&self, alert: &PriceAlert) -> Result<()>;

    async fn fetch_by_id(&self, alert_id: &Uuid) -> Result<Option<PriceAlert>>;

    /// All alerts for `asset` still in the pending state.
    async fn fetch_pending(&self, asset: Asset) -> Result<Vec<PriceAlert>>;

    /// Conditionally moves a pending alert to triggered.
    ///
    /// Returns true only for the caller whose update flipped the state, so two
    /// racing evaluations can never both claim the same alert.
    async fn mark_triggered(&self, alert_id: &Uuid, at_ms: u64) -> Result<bool>;
}
