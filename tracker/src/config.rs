use std::time::Duration;

#[derive(Clone, Debug)]
pub struct AppConfig {
    /// Database connection string.
    pub database_url: String,

    // =========================
    // Oracle configuration
    // =========================
    /// Base URL of the Moralis EVM API (without trailing slash).
    pub moralis_api_url: String,

    /// API key sent as `X-API-Key`. Requests fail fast when empty.
    pub moralis_api_key: String,

    /// Per-request timeout for oracle calls.
    ///
    /// A timed out read is a transient failure: the asset is skipped for the
    /// current tick and retried on the next one.
    pub oracle_timeout: Duration,

    // =========================
    // Scheduler configuration
    // =========================
    /// Period between ingestion ticks.
    pub poll_interval: Duration,

    // =========================
    // Notification configuration
    // =========================
    /// Recipient of surge notifications (target alerts go to the alert's own email).
    pub surge_recipient: String,

    /// Sender used in rendered emails.
    pub mail_from: String,

    /// Mail relay endpoint. When unset, notifications are rendered and logged only.
    pub mail_relay_url: Option<String>,

    /// Per-request timeout for mail relay calls.
    pub mail_timeout: Duration,

    /// Emit JSON logs (production) instead of pretty logs.
    pub json_logs: bool,
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from an arbitrary key lookup, applying defaults for
    /// missing or unparsable values.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str, default: &str| {
            lookup(key)
                .filter(|v| !v.trim().is_empty())
                .unwrap_or_else(|| default.to_string())
        };
        let get_u64 = |key: &str, default: u64| {
            lookup(key)
                .and_then(|v| v.trim().parse::<u64>().ok())
                .unwrap_or(default)
        };

        Self {
            database_url: get("DATABASE_URL", "sqlite://price_tracker.db?mode=rwc"),

            moralis_api_url: get("MORALIS_API_URL", "https://deep-index.moralis.io/api/v2.2")
                .trim_end_matches('/')
                .to_string(),
            moralis_api_key: lookup("MORALIS_API_KEY").unwrap_or_default(),
            // A zero timeout would fail every request.
            oracle_timeout: Duration::from_millis(get_u64("ORACLE_TIMEOUT_MS", 5_000).max(1)),

            // Every 5 minutes.
            poll_interval: Duration::from_secs(get_u64("POLL_INTERVAL_SECS", 300).max(1)),

            surge_recipient: get("SURGE_RECIPIENT", "hyperhire_assignment@hyperhire.in"),
            mail_from: get(
                "MAIL_FROM",
                "\"Blockchain Price Tracker\" <noreply@example.com>",
            ),
            mail_relay_url: lookup("MAIL_RELAY_URL").filter(|v| !v.trim().is_empty()),
            mail_timeout: Duration::from_millis(get_u64("MAIL_TIMEOUT_MS", 10_000).max(1)),

            json_logs: lookup("APP_ENV").as_deref() == Some("production"),
        }
    }
}
