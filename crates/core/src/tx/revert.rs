use std::fmt;

use alloy::{
    contract,
    primitives::Bytes,
    providers::PendingTransactionError,
    rpc::json_rpc::ErrorPayload,
    sol_types::{Revert, SolError, SolInterface},
    transports::TransportError,
};
use gogobid_abi::IAuctionPool::IAuctionPoolErrors;

use crate::{
    error::{Error, PreflightError, TransactionError},
    types::Wei,
};

/// EIP-1193 "user rejected request".
pub const USER_REJECTED_CODE: i64 = 4001;
/// EIP-3085 "unrecognized chain id", answered with `wallet_addEthereumChain`.
pub const UNRECOGNIZED_CHAIN_CODE: i64 = 4902;

/// What a failed write means to the person who sent it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TxFailure {
    UserRejected,
    Reverted { reason: String },
    WrongNetwork(String),
    Preflight(PreflightError),
    Other(String),
}

impl TxFailure {
    pub fn classify(error: &Error) -> Self {
        match error {
            Error::Preflight(err) => TxFailure::Preflight(err.clone()),
            Error::Network(err) => TxFailure::WrongNetwork(err.to_string()),
            Error::Transaction(err) => classify_transaction(err),
            other => TxFailure::Other(other.to_string()),
        }
    }

    /// Prefers the decoded revert reason over the raw provider message.
    pub fn user_message(&self) -> String {
        match self {
            TxFailure::UserRejected => "Transaction cancelled in your wallet.".to_string(),
            TxFailure::Reverted { reason } => format!("Reverted: {reason}"),
            TxFailure::WrongNetwork(detail) => format!("Wrong network: {detail}"),
            TxFailure::Preflight(err) => err.to_string(),
            TxFailure::Other(message) => message.clone(),
        }
    }
}

impl fmt::Display for TxFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.user_message())
    }
}

fn classify_transaction(error: &TransactionError) -> TxFailure {
    match error {
        TransactionError::Contract(err)
        | TransactionError::Simulation(err)
        | TransactionError::GasEstimation(err) => classify_contract(err),
        TransactionError::Pending(err) => match err {
            PendingTransactionError::TransportError(err) => classify_transport(err),
            other => TxFailure::Other(other.to_string()),
        },
        TransactionError::Reverted { tx_hash } => TxFailure::Reverted {
            reason: format!("transaction {tx_hash} failed on-chain"),
        },
        TransactionError::MissingReceipt => TxFailure::Other(error.to_string()),
    }
}

fn classify_contract(error: &contract::Error) -> TxFailure {
    match error {
        contract::Error::TransportError(err) => classify_transport(err),
        contract::Error::PendingTransactionError(PendingTransactionError::TransportError(err)) => {
            classify_transport(err)
        }
        other => TxFailure::Other(other.to_string()),
    }
}

fn classify_transport(error: &TransportError) -> TxFailure {
    match error.as_error_resp() {
        Some(payload) => classify_payload(payload),
        None => TxFailure::Other(error.to_string()),
    }
}

pub fn classify_payload(payload: &ErrorPayload) -> TxFailure {
    if payload.code == USER_REJECTED_CODE || is_rejection_message(&payload.message) {
        return TxFailure::UserRejected;
    }

    if let Some(reason) = payload
        .as_revert_data()
        .and_then(|data: Bytes| decode_revert(data.as_ref()))
    {
        return TxFailure::Reverted { reason };
    }

    match payload.message.strip_prefix("execution reverted") {
        Some(rest) => {
            let reason = rest.trim_start_matches(':').trim();
            TxFailure::Reverted {
                reason: if reason.is_empty() {
                    "execution reverted".to_string()
                } else {
                    reason.to_string()
                },
            }
        }
        None => TxFailure::Other(payload.message.to_string()),
    }
}

fn is_rejection_message(message: &str) -> bool {
    let message = message.to_lowercase();
    message.contains("user rejected") || message.contains("user denied")
}

/// Pool custom errors as `Name(args)`, then `Error(string)`. Anything else is
/// `None` so the caller can fall back to the provider message.
pub fn decode_revert(data: &[u8]) -> Option<String> {
    if let Ok(error) = IAuctionPoolErrors::abi_decode(data) {
        return Some(describe(&error));
    }
    Revert::abi_decode(data).ok().map(|revert| revert.reason)
}

fn describe(error: &IAuctionPoolErrors) -> String {
    use IAuctionPoolErrors as E;

    match error {
        E::OwnableUnauthorizedAccount(e) => format!("OwnableUnauthorizedAccount({})", e.account),
        E::ItemDoesNotExist(e) => format!("ItemDoesNotExist({})", e.tokenId),
        E::ItemAlreadySubmitted(e) => format!("ItemAlreadySubmitted({})", e.tokenId),
        E::AuctionAlreadyActive(e) => format!("AuctionAlreadyActive({})", e.tokenId),
        E::AuctionNotActive(e) => format!("AuctionNotActive({})", e.tokenId),
        E::AuctionExpired(e) => format!("AuctionExpired({}, {})", e.tokenId, e.endTime),
        E::AuctionStillRunning(e) => format!("AuctionStillRunning({}, {})", e.tokenId, e.endTime),
        E::BidTooLow(e) => format!(
            "BidTooLow({}, {})",
            Wei::new(e.highestBid),
            Wei::new(e.offered)
        ),
        E::NothingToWithdraw(e) => format!("NothingToWithdraw({})", e.account),
        E::TransferFailed(_) => "TransferFailed()".to_string(),
        E::ERC721InsufficientApproval(e) => {
            format!("ERC721InsufficientApproval({}, {})", e.operator, e.tokenId)
        }
        E::ERC721IncorrectOwner(e) => {
            format!("ERC721IncorrectOwner({}, {}, {})", e.sender, e.tokenId, e.owner)
        }
        E::ERC721NonexistentToken(e) => format!("ERC721NonexistentToken({})", e.tokenId),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy::primitives::U256;
    use gogobid_abi::IAuctionPool;

    fn payload(code: i64, message: &str) -> ErrorPayload {
        ErrorPayload {
            code,
            message: message.to_string().into(),
            data: None,
        }
    }

    #[test]
    fn decodes_pool_custom_errors() {
        let data = IAuctionPool::AuctionNotActive {
            tokenId: U256::from(77),
        }
        .abi_encode();
        assert_eq!(decode_revert(&data).as_deref(), Some("AuctionNotActive(77)"));

        let data = IAuctionPool::BidTooLow {
            highestBid: U256::from(2_000_000_000_000_000_000u128),
            offered: U256::from(1_500_000_000_000_000_000u128),
        }
        .abi_encode();
        assert_eq!(
            decode_revert(&data).as_deref(),
            Some("BidTooLow(2 ETH, 1.5 ETH)")
        );
    }

    #[test]
    fn falls_back_to_revert_string() {
        let data = Revert {
            reason: "not owner".into(),
        }
        .abi_encode();
        assert_eq!(decode_revert(&data).as_deref(), Some("not owner"));
        assert_eq!(decode_revert(&[0xde, 0xad]), None);
        assert_eq!(decode_revert(&[0x08, 0xc3, 0x79, 0xa0, 0xff]), None);
    }

    #[test]
    fn undecodable_revert_data_keeps_provider_message() {
        let failure = classify_payload(&ErrorPayload {
            code: 3,
            message: "execution reverted".to_string().into(),
            data: Some(
                serde_json::value::to_raw_value(&serde_json::json!("0xdead")).unwrap(),
            ),
        });

        assert_eq!(
            failure,
            TxFailure::Reverted {
                reason: "execution reverted".into()
            }
        );
    }

    #[test]
    fn wallet_rejection_is_distinct() {
        assert_eq!(
            classify_payload(&payload(USER_REJECTED_CODE, "User rejected the request.")),
            TxFailure::UserRejected
        );
        assert_eq!(
            classify_payload(&payload(-32000, "MetaMask Tx Signature: User denied transaction signature.")),
            TxFailure::UserRejected
        );
        assert_eq!(
            TxFailure::UserRejected.user_message(),
            "Transaction cancelled in your wallet."
        );
    }

    #[test]
    fn execution_reverted_message_is_a_revert() {
        assert_eq!(
            classify_payload(&payload(3, "execution reverted: paused")),
            TxFailure::Reverted {
                reason: "paused".into()
            }
        );
        assert_eq!(
            classify_payload(&payload(-32603, "nonce too low")),
            TxFailure::Other("nonce too low".into())
        );
    }

    #[test]
    fn preflight_errors_keep_their_message() {
        let error = Error::Preflight(PreflightError::BidTooLow);
        let failure = TxFailure::classify(&error);
        assert_eq!(failure, TxFailure::Preflight(PreflightError::BidTooLow));
        assert_eq!(
            failure.user_message(),
            "bid must be greater than the current highest bid"
        );
    }
}
