use std::str::FromStr;

use anyhow::{Context, anyhow};
use async_trait::async_trait;
use rust_decimal::Decimal;
use sqlx::{AnyPool, Row};
use uuid::Uuid;

use crate::alerts::model::{AlertStatus, PriceAlert};
use crate::alerts::repository::AlertRepository;
use crate::prices::model::Asset;
use crate::prices::repository_sqlx::{i64_to_u64, u64_to_i64};

/// SQLx-backed implementation of AlertRepository.
pub struct SqlxAlertRepository {
    pool: AnyPool,
}

impl SqlxAlertRepository {
    pub fn new(pool: AnyPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AlertRepository for SqlxAlertRepository {
    async fn insert(&self, alert: &PriceAlert) -> anyhow::Result<()> {
        let triggered_ms = match alert.status {
            AlertStatus::Pending => None,
            AlertStatus::Triggered { at_ms } => Some(u64_to_i64(at_ms)?),
        };

        sqlx::query(
            r#"
INSERT INTO price_alerts
  (alert_id, asset, target_price, email, status, created_ms, triggered_ms)
VALUES (?, ?, ?, ?, ?, ?, ?);
"#,
        )
        .bind(alert.id.to_string())
        .bind(alert.asset.name())
        .bind(alert.target_price.to_string())
        .bind(alert.email.clone())
        .bind(alert.status.as_str())
        .bind(u64_to_i64(alert.created_ms)?)
        .bind(triggered_ms)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn fetch_by_id(&self, alert_id: &Uuid) -> anyhow::Result<Option<PriceAlert>> {
        let row = sqlx::query(
            r#"
SELECT alert_id, asset, target_price, email, status, created_ms, triggered_ms
FROM price_alerts
WHERE alert_id = ?;
"#,
        )
        .bind(alert_id.to_string())
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(row_to_alert).transpose()
    }

    async fn fetch_pending(&self, asset: Asset) -> anyhow::Result<Vec<PriceAlert>> {
        let rows = sqlx::query(
            r#"
SELECT alert_id, asset, target_price, email, status, created_ms, triggered_ms
FROM price_alerts
WHERE asset = ? AND status = 'pending'
ORDER BY created_ms ASC;
"#,
        )
        .bind(asset.name())
        .fetch_all(&self.pool)
        .await?;

        let mut out = Vec::with_capacity(rows.len());
        for r in rows {
            match row_to_alert(&r) {
                Ok(a) => out.push(a),
                Err(e) => {
                    tracing::warn!(error = %e, asset = %asset, "skipping malformed alert row");
                }
            }
        }

        Ok(out)
    }

    async fn mark_triggered(&self, alert_id: &Uuid, at_ms: u64) -> anyhow::Result<bool> {
        let res = sqlx::query(
            r#"
UPDATE price_alerts
SET status = 'triggered', triggered_ms = ?
WHERE alert_id = ? AND status = 'pending';
"#,
        )
        .bind(u64_to_i64(at_ms)?)
        .bind(alert_id.to_string())
        .execute(&self.pool)
        .await?;

        Ok(res.rows_affected() == 1)
    }
}

/* =========================
Row mapping
========================= */

fn row_to_alert(r: &sqlx::any::AnyRow) -> anyhow::Result<PriceAlert> {
    let id_str: String = r.try_get("alert_id")?;
    let asset_str: String = r.try_get("asset")?;
    let target_str: String = r.try_get("target_price")?;
    let status_str: String = r.try_get("status")?;
    let triggered_ms: Option<i64> = r.try_get("triggered_ms")?;

    let status = match (status_str.as_str(), triggered_ms) {
        ("pending", _) => AlertStatus::Pending,
        ("triggered", Some(ms)) => AlertStatus::Triggered {
            at_ms: i64_to_u64(ms)?,
        },
        (other, ms) => return Err(anyhow!("inconsistent alert status {other:?} / {ms:?}")),
    };

    Ok(PriceAlert {
        id: Uuid::parse_str(&id_str).context("invalid alert_id")?,
        asset: Asset::from_str(&asset_str)?,
        target_price: Decimal::from_str(&target_str)
            .with_context(|| format!("invalid target_price column: {target_str:?}"))?,
        email: r.try_get("email")?,
        created_ms: i64_to_u64(r.try_get("created_ms")?)?,
        status,
    })
}
