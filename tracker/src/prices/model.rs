use std::fmt;
use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Wrapped Ether (mainnet).
pub const WETH_ADDRESS: &str = "0xc02aaa39b223fe8d0a0e5c4f27ead9083c756cc2";
/// MATIC ERC-20 (mainnet).
pub const MATIC_ADDRESS: &str = "0x7d1afa7b718fb893db30a3abc0cfc608aacfebb0";
/// Wrapped Bitcoin (mainnet).
pub const WBTC_ADDRESS: &str = "0x2260fac5e5542a773aa44fbcfedf7c193bc2c599";

/// Tracked assets. Each maps to a fixed oracle-queryable token address;
/// adding an asset means adding a variant here.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Asset {
    Ethereum,
    Polygon,
}

impl Asset {
    pub const ALL: [Asset; 2] = [Asset::Ethereum, Asset::Polygon];

    pub fn name(&self) -> &'static str {
        match self {
            Asset::Ethereum => "ethereum",
            Asset::Polygon => "polygon",
        }
    }

    pub fn token_address(&self) -> &'static str {
        match self {
            Asset::Ethereum => WETH_ADDRESS,
            Asset::Polygon => MATIC_ADDRESS,
        }
    }
}

impl fmt::Display for Asset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Error, Debug, PartialEq, Eq)]
#[error("unknown asset: {0:?}")]
pub struct UnknownAsset(pub String);

impl FromStr for Asset {
    type Err = UnknownAsset;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Asset::ALL
            .into_iter()
            .find(|a| a.name().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| UnknownAsset(s.to_string()))
    }
}

/// One observed USD price. Immutable once written.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct PriceSample {
    pub asset: Asset,
    pub price: Decimal,
    pub ts_ms: u64,
}
