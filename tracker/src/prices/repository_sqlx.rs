use std::str::FromStr;

use anyhow::{Context, anyhow};
use async_trait::async_trait;
use rust_decimal::Decimal;
use sqlx::{AnyPool, Row};

use crate::prices::model::{Asset, PriceSample};
use crate::prices::repository::PriceRepository;

/// SQLx-backed implementation of PriceRepository.
/// Responsible only for persistence and row mapping.
pub struct SqlxPriceRepository {
    pool: AnyPool,
}

impl SqlxPriceRepository {
    pub fn new(pool: AnyPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl PriceRepository for SqlxPriceRepository {
    async fn insert(&self, sample: &PriceSample) -> anyhow::Result<()> {
        sqlx::query(r#"INSERT INTO price_samples (asset, price, ts_ms) VALUES (?, ?, ?);"#)
            .bind(sample.asset.name())
            .bind(sample.price.to_string())
            .bind(u64_to_i64(sample.ts_ms)?)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    async fn latest(&self, asset: Asset) -> anyhow::Result<Option<PriceSample>> {
        let row = sqlx::query(
            r#"
SELECT asset, price, ts_ms
FROM price_samples
WHERE asset = ?
ORDER BY ts_ms DESC
LIMIT 1;
"#,
        )
        .bind(asset.name())
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(row_to_sample).transpose()
    }

    async fn at_or_before(&self, asset: Asset, ts_ms: u64) -> anyhow::Result<Option<PriceSample>> {
        let row = sqlx::query(
            r#"
SELECT asset, price, ts_ms
FROM price_samples
WHERE asset = ? AND ts_ms <= ?
ORDER BY ts_ms DESC
LIMIT 1;
"#,
        )
        .bind(asset.name())
        .bind(u64_to_i64(ts_ms)?)
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(row_to_sample).transpose()
    }

    async fn in_range(
        &self,
        asset: Asset,
        start_ms: u64,
        end_ms: u64,
    ) -> anyhow::Result<Vec<PriceSample>> {
        let rows = sqlx::query(
            r#"
SELECT asset, price, ts_ms
FROM price_samples
WHERE asset = ? AND ts_ms >= ? AND ts_ms <= ?
ORDER BY ts_ms ASC;
"#,
        )
        .bind(asset.name())
        .bind(u64_to_i64(start_ms)?)
        .bind(u64_to_i64(end_ms)?)
        .fetch_all(&self.pool)
        .await?;

        let mut out = Vec::with_capacity(rows.len());
        for r in rows {
            match row_to_sample(&r) {
                Ok(s) => out.push(s),
                Err(e) => {
                    // poison-row resilience: skip but don't fail the query
                    tracing::warn!(error = %e, asset = %asset, "skipping malformed price row");
                }
            }
        }

        Ok(out)
    }
}

/* =========================
Row mapping + conversions
========================= */

fn row_to_sample(r: &sqlx::any::AnyRow) -> anyhow::Result<PriceSample> {
    let asset_str: String = r.try_get("asset")?;
    let price_str: String = r.try_get("price")?;

    Ok(PriceSample {
        asset: Asset::from_str(&asset_str)?,
        price: Decimal::from_str(&price_str)
            .with_context(|| format!("invalid price column: {price_str:?}"))?,
        ts_ms: i64_to_u64(r.try_get("ts_ms")?)?,
    })
}

pub(crate) fn i64_to_u64(v: i64) -> anyhow::Result<u64> {
    if v < 0 {
        return Err(anyhow!("negative i64 where u64 expected: {v}"));
    }
    Ok(v as u64)
}

pub(crate) fn u64_to_i64(v: u64) -> anyhow::Result<i64> {
    if v > i64::MAX as u64 {
        return Err(anyhow!("u64 too large for i64: {v}"));
    }
    Ok(v as i64)
}
