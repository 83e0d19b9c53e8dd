use rust_decimal::Decimal;
use serde::Serialize;

use crate::prices::model::Asset;

/// Sender and fixed recipients shared by every transport.
#[derive(Clone, Debug)]
pub struct MailSettings {
    pub from: String,
    pub surge_recipient: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct EmailMessage {
    pub from: String,
    pub to: String,
    pub subject: String,
    pub text: String,
}

impl MailSettings {
    pub fn target_alert(&self, to: &str, asset: Asset, target_price: Decimal) -> EmailMessage {
        EmailMessage {
            from: self.from.clone(),
            to: to.to_string(),
            subject: format!("Price Alert for {asset}"),
            text: format!("The price of {asset} has reached ${target_price}"),
        }
    }

    pub fn surge(&self, asset: Asset, old_price: Decimal, new_price: Decimal) -> EmailMessage {
        EmailMessage {
            from: self.from.clone(),
            to: self.surge_recipient.clone(),
            subject: format!("Significant Price Increase for {asset}"),
            text: format!(
                "The price of {asset} has increased by more than 3% in the last hour. \
                 Old price: ${old_price}, New price: ${new_price}"
            ),
        }
    }
}
