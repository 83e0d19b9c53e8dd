use std::sync::Arc;

use common::logger::init_logger;
use tracker::{
    alerts::{AlertRegistry, repository_sqlx::SqlxAlertRepository},
    config::AppConfig,
    db::Db,
    metrics::counters::Counters,
    notify::{HttpMailNotifier, LogNotifier, MailSettings, Notifier},
    oracle::{MoralisClient, PriceOracle},
    prices::{TimeSeriesStore, repository_sqlx::SqlxPriceRepository},
    scheduler::IngestionScheduler,
};

/// Connects the DB, runs migrations and builds the store + registry.
async fn init_storage(cfg: &AppConfig) -> anyhow::Result<(Arc<TimeSeriesStore>, Arc<AlertRegistry>)> {
    let db = Db::connect(&cfg.database_url).await?;
    db.migrate().await?;

    let store = Arc::new(TimeSeriesStore::new(Arc::new(SqlxPriceRepository::new(
        db.pool.clone(),
    ))));
    let alerts = Arc::new(AlertRegistry::new(Arc::new(SqlxAlertRepository::new(
        db.pool.clone(),
    ))));

    Ok((store, alerts))
}

fn build_notifier(cfg: &AppConfig) -> anyhow::Result<Arc<dyn Notifier>> {
    let settings = MailSettings {
        from: cfg.mail_from.clone(),
        surge_recipient: cfg.surge_recipient.clone(),
    };

    let notifier: Arc<dyn Notifier> = match &cfg.mail_relay_url {
        Some(url) => Arc::new(HttpMailNotifier::new(
            url.clone(),
            settings,
            cfg.mail_timeout,
        )?),
        None => {
            tracing::warn!("MAIL_RELAY_URL not set; notifications will only be logged");
            Arc::new(LogNotifier::new(settings))
        }
    };

    Ok(notifier)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cfg = AppConfig::from_env();
    init_logger("price-tracker", cfg.json_logs);

    tracing::info!("Starting price tracker...");

    if cfg.moralis_api_key.is_empty() {
        tracing::warn!("MORALIS_API_KEY not set; every oracle read will fail");
    }

    let (store, alerts) = init_storage(&cfg).await?;

    let oracle: Arc<dyn PriceOracle> = Arc::new(MoralisClient::new(
        cfg.moralis_api_url.clone(),
        cfg.moralis_api_key.clone(),
        cfg.oracle_timeout,
    )?);

    let scheduler = IngestionScheduler::new(
        oracle,
        store,
        alerts,
        build_notifier(&cfg)?,
        Counters::default(),
    );

    tokio::spawn(scheduler.run(cfg.poll_interval));

    tokio::signal::ctrl_c().await?;
    tracing::info!("Shutdown signal received");

    Ok(())
}
