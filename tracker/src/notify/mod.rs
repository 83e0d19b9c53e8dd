pub mod email;
pub mod http;
pub mod log;

use async_trait::async_trait;
use rust_decimal::Decimal;

use crate::prices::model::Asset;

pub use email::{EmailMessage, MailSettings};
pub use http::HttpMailNotifier;
pub use log::LogNotifier;

/// Outbound notifications. Callers treat both methods as fire-and-forget:
/// failures are logged and never retried by the core.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify_target_alert(
        &self,
        email: &str,
        asset: Asset,
        target_price: Decimal,
    ) -> anyhow::Result<()>;

    async fn notify_surge(
        &self,
        asset: Asset,
        old_price: Decimal,
        new_price: Decimal,
    ) -> anyhow::Result<()>;
}
