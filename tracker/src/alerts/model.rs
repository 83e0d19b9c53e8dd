use rust_decimal::Decimal;
use serde::Serialize;
use uuid::Uuid;

use crate::prices::model::Asset;

/// Lifecycle of a target alert. The only transition is `Pending -> Triggered`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum AlertStatus {
    Pending,
    Triggered { at_ms: u64 },
}

impl AlertStatus {
    /// Column value persisted in `price_alerts.status`.
    pub fn as_str(&self) -> &'static str {
        match self {
            AlertStatus::Pending => "pending",
            AlertStatus::Triggered { .. } => "triggered",
        }
    }

    pub fn is_pending(&self) -> bool {
        matches!(self, AlertStatus::Pending)
    }
}

/// A user-registered one-shot notification that fires once the price of
/// `asset` reaches `target_price`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct PriceAlert {
    pub id: Uuid,
    pub asset: Asset,
    pub target_price: Decimal,
    pub email: String,
    pub created_ms: u64,
    #[serde(flatten)]
    pub status: AlertStatus,
}

impl PriceAlert {
    pub fn new(asset: Asset, target_price: Decimal, email: String, now_ms: u64) -> Self {
        Self {
            id: Uuid::new_v4(),
            asset,
            target_price,
            email,
            created_ms: now_ms,
            status: AlertStatus::Pending,
        }
    }

    /// True if a pending alert should fire at `price`.
    pub fn is_hit_by(&self, price: Decimal) -> bool {
        self.status.is_pending() && self.target_price <= price
    }

    /// Moves the alert to `Triggered`. Returns false if it already was.
    pub fn trigger(&mut self, at_ms: u64) -> bool {
        if !self.status.is_pending() {
            return false;
        }
        self.status = AlertStatus::Triggered { at_ms };
        true
    }
}
