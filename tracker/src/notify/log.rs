use async_trait::async_trait;
use rust_decimal::Decimal;
use tracing::info;

use crate::notify::{EmailMessage, MailSettings, Notifier};
use crate::prices::model::Asset;

/// Renders emails and writes them to the log instead of sending them.
/// Used when no mail relay is configured.
pub struct LogNotifier {
    settings: MailSettings,
}

impl LogNotifier {
    pub fn new(settings: MailSettings) -> Self {
        Self { settings }
    }

    fn emit(&self, msg: &EmailMessage) {
        info!(
            target: "mail",
            to = %msg.to,
            subject = %msg.subject,
            text = %msg.text,
            "email rendered (no relay configured)"
        );
    }
}

#[async_trait]
impl Notifier for LogNotifier {
    async fn notify_target_alert(
        &self,
        email: &str,
        asset: Asset,
        target_price: Decimal,
    ) -> anyhow::Result<()> {
        self.emit(&self.settings.target_alert(email, asset, target_price));
        Ok(())
    }

    async fn notify_surge(
        &self,
        asset: Asset,
        old_price: Decimal,
        new_price: Decimal,
    ) -> anyhow::Result<()> {
        self.emit(&self.settings.surge(asset, old_price, new_price));
        Ok(())
    }
}
