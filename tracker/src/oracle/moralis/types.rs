use serde::Deserialize;

/// Subset of the Moralis `erc20/{address}/price` payload.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenPrice {
    pub usd_price: f64,

    #[serde(default)]
    pub token_address: Option<String>,

    #[serde(default)]
    pub token_symbol: Option<String>,
}
