use std::str::FromStr;

use alloy::primitives::U256;
use gogobid_core::Wei;
use rust_decimal::{Decimal, prelude::ToPrimitive};
use thiserror::Error;

const ETHER_DECIMALS: u32 = 18;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum AmountError {
    #[error("invalid amount {0:?}")]
    Invalid(String),
    #[error("amount must not be negative")]
    Negative,
    #[error("amount has more than {ETHER_DECIMALS} decimal places")]
    TooPrecise,
    #[error("amount is too large")]
    Overflow,
}

/// Parses a decimal ETH amount such as `"1.25"` into exact wei.
pub fn parse_ether(input: &str) -> Result<Wei, AmountError> {
    let value = Decimal::from_str(input.trim())
        .map_err(|_| AmountError::Invalid(input.to_string()))?
        .normalize();

    if value.is_sign_negative() && !value.is_zero() {
        return Err(AmountError::Negative);
    }

    if value.scale() > ETHER_DECIMALS {
        return Err(AmountError::TooPrecise);
    }

    let scale = Decimal::from(10u64.pow(ETHER_DECIMALS));
    let wei = value
        .checked_mul(scale)
        .and_then(|wei| wei.trunc().to_u128())
        .ok_or(AmountError::Overflow)?;

    Ok(Wei::new(U256::from(wei)))
}
