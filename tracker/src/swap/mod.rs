//! ETH -> BTC swap quotes derived from two independent USD prices.
//!
//! Rounding: target and fee amounts to 8 decimal places, the USD fee to 2,
//! all half-away-from-zero.

use std::str::FromStr;
use std::sync::Arc;

use rust_decimal::{Decimal, RoundingStrategy};
use rust_decimal_macros::dec;
use serde::Serialize;
use tracing::{info, instrument};

use crate::error::AppError;
use crate::oracle::{OracleError, PriceOracle};
use crate::prices::model::{WBTC_ADDRESS, WETH_ADDRESS};

/// Fixed 3 bps fee charged in the source asset.
pub const FEE_RATE: Decimal = dec!(0.0003);

/// Largest accepted source amount. Above total ETH supply, and small enough that
/// `amount * usd_price` stays far inside `Decimal`'s range.
pub const MAX_SOURCE_AMOUNT: Decimal = dec!(1000000000);

const AMOUNT_DP: u32 = 8;
const USD_DP: u32 = 2;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SwapRoute {
    pub source: &'static str,
    pub target: &'static str,
}

impl SwapRoute {
    pub const ETH_TO_BTC: SwapRoute = SwapRoute {
        source: WETH_ADDRESS,
        target: WBTC_ADDRESS,
    };
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct SwapQuote {
    /// Amount of the target asset received.
    pub target_amount: Decimal,
    /// Fee in units of the source asset.
    pub fee_source: Decimal,
    /// USD value of the fee.
    pub fee_usd: Decimal,
}

/// Parses a boundary-supplied amount. Rejects non-numeric, non-positive and
/// out-of-range input.
pub fn parse_amount(raw: &str) -> Result<Decimal, AppError> {
    let amount = Decimal::from_str(raw.trim())
        .or_else(|_| Decimal::from_scientific(raw.trim()))
        .map_err(|_| AppError::invalid(format!("amount is not a number: {raw:?}")))?;
    ensure_valid_amount(amount)?;
    Ok(amount)
}

fn ensure_valid_amount(amount: Decimal) -> Result<(), AppError> {
    if amount <= Decimal::ZERO {
        return Err(AppError::invalid(format!(
            "amount must be positive, got {amount}"
        )));
    }
    if amount > MAX_SOURCE_AMOUNT {
        return Err(AppError::invalid(format!(
            "amount must not exceed {MAX_SOURCE_AMOUNT}, got {amount}"
        )));
    }
    Ok(())
}

/// Pure quote math over already fetched prices.
pub fn compute_quote(
    source_amount: Decimal,
    source_usd: Decimal,
    target_usd: Decimal,
) -> Result<SwapQuote, AppError> {
    ensure_valid_amount(source_amount)?;
    if source_usd <= Decimal::ZERO || target_usd <= Decimal::ZERO {
        return Err(OracleError::InvalidResponse(format!(
            "unusable prices: source={source_usd} target={target_usd}"
        ))
        .into());
    }

    // The amount is already bounded, so only an absurd oracle price overflows.
    let overflow = || -> AppError {
        OracleError::InvalidResponse(format!(
            "prices out of range: source={source_usd} target={target_usd}"
        ))
        .into()
    };

    let target_amount = source_amount
        .checked_mul(source_usd)
        .and_then(|v| v.checked_div(target_usd))
        .ok_or_else(overflow)?;
    let fee_source = source_amount.checked_mul(FEE_RATE).ok_or_else(overflow)?;
    let fee_usd = fee_source.checked_mul(source_usd).ok_or_else(overflow)?;

    Ok(SwapQuote {
        target_amount: round(target_amount, AMOUNT_DP),
        fee_source: round(fee_source, AMOUNT_DP),
        fee_usd: round(fee_usd, USD_DP),
    })
}

fn round(v: Decimal, dp: u32) -> Decimal {
    let mut r = v.round_dp_with_strategy(dp, RoundingStrategy::MidpointAwayFromZero);
    // fixed scale so 0.6 renders as 0.60
    r.rescale(dp);
    r
}

pub struct SwapCalculator {
    oracle: Arc<dyn PriceOracle>,
    route: SwapRoute,
}

impl SwapCalculator {
    pub fn new(oracle: Arc<dyn PriceOracle>) -> Self {
        Self {
            oracle,
            route: SwapRoute::ETH_TO_BTC,
        }
    }

    /// Quotes `source_amount` along the route. Input is validated before any
    /// oracle call; either price failing fails the whole quote.
    #[instrument(skip(self), target = "swap")]
    pub async fn quote(&self, source_amount: Decimal) -> Result<SwapQuote, AppError> {
        ensure_valid_amount(source_amount)?;

        let (source_usd, target_usd) = tokio::try_join!(
            self.oracle.usd_price(self.route.source),
            self.oracle.usd_price(self.route.target),
        )?;

        let quote = compute_quote(source_amount, source_usd, target_usd)?;
        info!(
            %source_usd,
            %target_usd,
            target_amount = %quote.target_amount,
            fee_usd = %quote.fee_usd,
            "swap quoted"
        );
        Ok(quote)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reference_quote() {
        let q = compute_quote(dec!(1), dec!(2000), dec!(40000)).unwrap();

        assert_eq!(q.target_amount.to_string(), "0.05000000");
        assert_eq!(q.fee_source.to_string(), "0.00030000");
        assert_eq!(q.fee_usd.to_string(), "0.60");
    }

    #[test]
    fn rounds_half_away_from_zero() {
        // 0.000000005 exactly at the midpoint of the 8th decimal
        assert_eq!(round(dec!(0.000000005), 8), dec!(0.00000001));
        assert_eq!(round(dec!(0.125), 2), dec!(0.13));
        assert_eq!(round(dec!(0.124999), 2), dec!(0.12));
    }

    #[test]
    fn parse_rejects_bad_amounts() {
        for raw in ["0", "-5", "abc", "", "  "] {
            assert!(
                matches!(parse_amount(raw), Err(AppError::InvalidInput(_))),
                "accepted {raw:?}"
            );
        }
        assert_eq!(parse_amount(" 1.5 ").unwrap(), dec!(1.5));
        assert_eq!(parse_amount("1e-3").unwrap(), dec!(0.001));
    }

    #[test]
    fn amounts_above_the_limit_are_invalid_input() {
        assert_eq!(parse_amount("1000000000").unwrap(), MAX_SOURCE_AMOUNT);

        for raw in ["1000000000.00000001", "79228162514264337593543950335"] {
            assert!(
                matches!(parse_amount(raw), Err(AppError::InvalidInput(_))),
                "accepted {raw:?}"
            );
        }
        assert!(matches!(
            compute_quote(Decimal::MAX, dec!(2000), dec!(40000)),
            Err(AppError::InvalidInput(_))
        ));
    }

    #[test]
    fn largest_amount_quotes_without_overflow() {
        let q = compute_quote(MAX_SOURCE_AMOUNT, dec!(1000000), dec!(0.0001)).unwrap();
        assert_eq!(q.fee_source.to_string(), "300000.00000000");
    }

    #[test]
    fn zero_target_price_is_unavailable_not_a_panic() {
        let err = compute_quote(dec!(1), dec!(2000), Decimal::ZERO).unwrap_err();
        assert!(matches!(err, AppError::ServiceUnavailable(_)));
    }
}
