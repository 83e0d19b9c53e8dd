pub mod errors;
pub mod moralis;

use async_trait::async_trait;
use rust_decimal::Decimal;

pub use errors::OracleError;
pub use moralis::MoralisClient;

/// Source of current USD prices, queried by token address.
#[async_trait]
pub trait PriceOracle: Send + Sync {
    async fn usd_price(&self, token_address: &str) -> Result<Decimal, OracleError>;
}
