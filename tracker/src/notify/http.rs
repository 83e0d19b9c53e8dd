use std::time::Duration;

use anyhow::Context;
use async_trait::async_trait;
use reqwest::Client;
use rust_decimal::Decimal;
use tracing::{debug, instrument};

use crate::notify::{EmailMessage, MailSettings, Notifier};
use crate::prices::model::Asset;

/// Posts rendered emails as JSON to a mail relay which owns delivery and retries.
#[derive(Clone)]
pub struct HttpMailNotifier {
    http: Client,
    url: String,
    settings: MailSettings,
}

impl HttpMailNotifier {
    pub fn new(url: String, settings: MailSettings, timeout: Duration) -> anyhow::Result<Self> {
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .context("failed to build mail relay client")?;

        Ok(Self {
            http,
            url,
            settings,
        })
    }

    #[instrument(skip(self, msg), fields(subject = %msg.subject), level = "debug")]
    async fn send(&self, msg: &EmailMessage) -> anyhow::Result<()> {
        self.http
            .post(&self.url)
            .json(msg)
            .send()
            .await
            .context("mail relay unreachable")?
            .error_for_status()
            .context("mail relay rejected message")?;

        debug!("email handed to relay");
        Ok(())
    }
}

#[async_trait]
impl Notifier for HttpMailNotifier {
    async fn notify_target_alert(
        &self,
        email: &str,
        asset: Asset,
        target_price: Decimal,
    ) -> anyhow::Result<()> {
        self.send(&self.settings.target_alert(email, asset, target_price))
            .await
    }

    async fn notify_surge(
        &self,
        asset: Asset,
        old_price: Decimal,
        new_price: Decimal,
    ) -> anyhow::Result<()> {
        self.send(&self.settings.surge(asset, old_price, new_price))
            .await
    }
}
