use std::{fmt, str::FromStr};

use alloy::primitives::{B256, U256, utils::format_ether};
use chrono::{DateTime, Utc};
use serde::Serialize;

/// Identifier of a tokenized domain; the join key across chain state, logs and subgraph data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(into = "String")]
pub struct TokenId(U256);

impl TokenId {
    pub fn new(value: U256) -> Self {
        Self(value)
    }

    pub fn as_u256(&self) -> U256 {
        self.0
    }

    /// Indexed-topic encoding used by log filters.
    pub fn as_topic(&self) -> B256 {
        B256::from(self.0)
    }

    /// Short placeholder for names the subgraph cannot resolve.
    pub fn placeholder_name(&self) -> String {
        let digits = self.0.to_string();
        let prefix: String = digits.chars().take(5).collect();
        format!("Unknown #{prefix}")
    }
}

impl fmt::Display for TokenId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<TokenId> for String {
    fn from(value: TokenId) -> Self {
        value.to_string()
    }
}

impl From<u64> for TokenId {
    fn from(value: u64) -> Self {
        Self(U256::from(value))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid token id `{0}`")]
pub struct ParseTokenIdError(pub String);

impl FromStr for TokenId {
    type Err = ParseTokenIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let parsed = if let Some(hex) = trimmed
            .strip_prefix("0x")
            .or_else(|| trimmed.strip_prefix("0X"))
        {
            U256::from_str_radix(hex, 16)
        } else {
            U256::from_str_radix(trimmed, 10)
        };
        parsed
            .map(Self)
            .map_err(|_| ParseTokenIdError(s.to_string()))
    }
}

/// Exact native-currency amount. Display conversions never feed back into transactions.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(into = "String")]
pub struct Wei(U256);

impl Wei {
    pub const ZERO: Self = Self(U256::ZERO);

    pub fn new(value: U256) -> Self {
        Self(value)
    }

    pub fn as_u256(&self) -> U256 {
        self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    /// Decimal ETH string, e.g. `"1.500000000000000000"`.
    pub fn to_ether_string(&self) -> String {
        format_ether(self.0)
    }

    /// Lossy ETH value for sorting and filtering only.
    pub fn to_ether_f64(&self) -> f64 {
        self.to_ether_string().parse().unwrap_or(f64::MAX)
    }

    pub fn saturating_add(self, other: Self) -> Self {
        Self(self.0.saturating_add(other.0))
    }
}

impl fmt::Display for Wei {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let ether = self.to_ether_string();
        let trimmed = match ether.split_once('.') {
            Some((whole, frac)) => {
                let frac = frac.trim_end_matches('0');
                if frac.is_empty() {
                    whole.to_string()
                } else {
                    format!("{whole}.{frac}")
                }
            }
            None => ether,
        };
        write!(f, "{trimmed} ETH")
    }
}

impl From<Wei> for String {
    fn from(value: Wei) -> Self {
        value.0.to_string()
    }
}

/// Inclusive block range for one-shot log queries; `to == None` means latest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BlockRange {
    pub from: u64,
    pub to: Option<u64>,
}

impl BlockRange {
    pub fn from_block(from: u64) -> Self {
        Self { from, to: None }
    }
}

/// Converts an on-chain unix timestamp in seconds, rejecting values that do not fit.
pub fn timestamp_from_secs(secs: U256) -> Option<DateTime<Utc>> {
    let secs = u64::try_from(secs).ok()?;
    DateTime::from_timestamp(i64::try_from(secs).ok()?, 0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_decimal_and_hex_token_ids() {
        let dec: TokenId = "255".parse().unwrap();
        let hex: TokenId = "0xff".parse().unwrap();
        assert_eq!(dec, hex);
        assert!("not-a-number".parse::<TokenId>().is_err());
    }

    #[test]
    fn placeholder_uses_first_five_digits() {
        let id: TokenId = "123456789".parse().unwrap();
        assert_eq!(id.placeholder_name(), "Unknown #12345");
    }

    #[test]
    fn wei_display_trims_trailing_zeros() {
        let one_and_half = Wei::new(U256::from(1_500_000_000_000_000_000u128));
        assert_eq!(one_and_half.to_string(), "1.5 ETH");
        assert_eq!(Wei::ZERO.to_string(), "0 ETH");
        assert!((one_and_half.to_ether_f64() - 1.5).abs() < f64::EPSILON);
    }

    #[test]
    fn oversized_timestamps_are_rejected() {
        assert!(timestamp_from_secs(U256::MAX).is_none());
        let ts = timestamp_from_secs(U256::from(1_700_000_000u64)).unwrap();
        assert_eq!(ts.timestamp(), 1_700_000_000);
    }
}
