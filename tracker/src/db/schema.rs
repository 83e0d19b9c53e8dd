use sqlx::AnyPool;

/// Creates the two persisted tables. Idempotent.
pub async fn migrate(pool: &AnyPool) -> anyhow::Result<()> {
    // Append-only samples. Prices are canonical decimal strings.
    sqlx::query(
        r#"
CREATE TABLE IF NOT EXISTS price_samples (
  asset TEXT NOT NULL,
  price TEXT NOT NULL,
  ts_ms BIGINT NOT NULL,
  PRIMARY KEY (asset, ts_ms)
);
"#,
    )
    .execute(pool)
    .await?;

    // Alerts are never deleted; `status` only moves pending -> triggered.
    sqlx::query(
        r#"
CREATE TABLE IF NOT EXISTS price_alerts (
  alert_id TEXT PRIMARY KEY,
  asset TEXT NOT NULL,
  target_price TEXT NOT NULL,
  email TEXT NOT NULL,
  status TEXT NOT NULL CHECK (status IN ('pending','triggered')),
  created_ms BIGINT NOT NULL,
  triggered_ms BIGINT
);
"#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"CREATE INDEX IF NOT EXISTS idx_price_alerts_asset_status ON price_alerts(asset, status);"#,
    )
    .execute(pool)
    .await?;

    Ok(())
}
