use std::sync::Arc;

use rust_decimal_macros::dec;

use tracker::alerts::model::AlertStatus;
use tracker::error::AppError;
use tracker::prices::model::{Asset, WBTC_ADDRESS, WETH_ADDRESS};
use tracker::prices::resampler::{HOURLY_POINTS, NO_DATA_MESSAGE, PriceHistory};
use tracker::service::PriceService;
use tracker::swap::SwapCalculator;
use tracker::time::{HOUR_MS, MINUTE_MS};

use mocks::{FakeOracle, Quote, setup_db, sqlx_registry, sqlx_store};

const NOW: u64 = 1_700_000_000_000;

struct Fixture {
    service: PriceService,
    oracle: Arc<FakeOracle>,
    store: Arc<tracker::prices::TimeSeriesStore>,
    registry: Arc<tracker::alerts::AlertRegistry>,
}

async fn fixture() -> Fixture {
    let pool = setup_db().await;
    let store = sqlx_store(&pool);
    let registry = sqlx_registry(&pool);
    let oracle = Arc::new(FakeOracle::new());

    let service = PriceService::new(
        store.clone(),
        registry.clone(),
        SwapCalculator::new(oracle.clone()),
    );

    Fixture {
        service,
        oracle,
        store,
        registry,
    }
}

// -----------------------
// History
// -----------------------

#[tokio::test]
async fn history_reports_no_data_before_first_sample() {
    let f = fixture().await;

    let history = f.service.get_history("ethereum", NOW).await.unwrap();

    assert_eq!(history, PriceHistory::NoData);
    assert_eq!(history.message(), Some(NO_DATA_MESSAGE));
}

#[tokio::test]
async fn history_has_one_point_per_hour() {
    let f = fixture().await;

    // One sample every 10 minutes across the whole day.
    let start = NOW - 24 * HOUR_MS;
    for i in 0..=(24 * 6) {
        let ts = start + i * 10 * MINUTE_MS;
        f.store
            .append(Asset::Polygon, rust_decimal::Decimal::from(i), ts)
            .await
            .unwrap();
    }

    let history = f.service.get_history("Polygon", NOW).await.unwrap();
    let points = history.points().expect("history has data");

    assert_eq!(points.len(), HOURLY_POINTS);
    assert!(history.message().is_none());
    for (h, p) in points.iter().enumerate() {
        let h = h as u64;
        assert_eq!(p.ts_ms, start + h * HOUR_MS);
        assert_eq!(p.price, rust_decimal::Decimal::from(h * 6));
    }
}

#[tokio::test]
async fn history_ignores_samples_outside_the_window() {
    let f = fixture().await;
    f.store
        .append(Asset::Ethereum, dec!(1), NOW - 25 * HOUR_MS)
        .await
        .unwrap();

    let history = f.service.get_history("ethereum", NOW).await.unwrap();

    assert!(history.is_no_data());
}

#[tokio::test]
async fn history_rejects_unknown_asset() {
    let f = fixture().await;

    let err = f.service.get_history("dogecoin", NOW).await.unwrap_err();

    assert!(matches!(err, AppError::InvalidInput(_)));
}

// -----------------------
// Alerts
// -----------------------

#[tokio::test]
async fn create_alert_persists_pending_alert() {
    let f = fixture().await;

    let alert = f
        .service
        .create_alert("ethereum", dec!(2500.5), "trader@example.com", NOW)
        .await
        .unwrap();

    let stored = f.registry.get(&alert.id).await.unwrap().unwrap();
    assert_eq!(stored.asset, Asset::Ethereum);
    assert_eq!(stored.target_price, dec!(2500.5));
    assert_eq!(stored.email, "trader@example.com");
    assert_eq!(stored.created_ms, NOW);
    assert_eq!(stored.status, AlertStatus::Pending);
}

#[tokio::test]
async fn create_alert_rejects_bad_input() {
    let f = fixture().await;

    let bad_email = f
        .service
        .create_alert("ethereum", dec!(1), "not-an-email", NOW)
        .await
        .unwrap_err();
    let bad_asset = f
        .service
        .create_alert("solana", dec!(1), "a@example.com", NOW)
        .await
        .unwrap_err();

    assert!(matches!(bad_email, AppError::InvalidInput(_)));
    assert!(matches!(bad_asset, AppError::InvalidInput(_)));
}

// -----------------------
// Swap
// -----------------------

#[tokio::test]
async fn invalid_amounts_never_reach_the_oracle() {
    let f = fixture().await;

    for raw in [
        "0",
        "-5",
        "abc",
        "",
        "1000000000.1",
        "79228162514264337593543950335",
    ] {
        let err = f.service.quote_swap(raw).await.unwrap_err();
        assert!(matches!(err, AppError::InvalidInput(_)), "accepted {raw:?}");
    }

    assert_eq!(f.oracle.calls(), 0);
}

#[tokio::test]
async fn oversized_amount_is_rejected_before_pricing() {
    let oracle = Arc::new(FakeOracle::new());
    oracle.script(WETH_ADDRESS, vec![Quote::Price(dec!(2000))]);
    oracle.script(WBTC_ADDRESS, vec![Quote::Price(dec!(40000))]);
    let calculator = SwapCalculator::new(oracle.clone());

    let err = calculator.quote(rust_decimal::Decimal::MAX).await.unwrap_err();

    assert!(matches!(err, AppError::InvalidInput(_)));
    assert_eq!(oracle.calls(), 0);
}

#[tokio::test]
async fn quote_uses_both_oracle_prices() {
    let f = fixture().await;
    f.oracle.script(WETH_ADDRESS, vec![Quote::Price(dec!(2000))]);
    f.oracle.script(WBTC_ADDRESS, vec![Quote::Price(dec!(40000))]);

    let quote = f.service.quote_swap("1").await.unwrap();

    assert_eq!(quote.target_amount.to_string(), "0.05000000");
    assert_eq!(quote.fee_source.to_string(), "0.00030000");
    assert_eq!(quote.fee_usd.to_string(), "0.60");
    assert_eq!(f.oracle.calls(), 2);
}

#[tokio::test]
async fn quote_fails_when_a_price_is_unavailable() {
    let f = fixture().await;
    f.oracle.script(WETH_ADDRESS, vec![Quote::Price(dec!(2000))]);
    f.oracle.script(WBTC_ADDRESS, vec![Quote::Down]);

    let err = f.service.quote_swap("1").await.unwrap_err();

    assert!(matches!(err, AppError::ServiceUnavailable(_)));
}
