use std::time::Duration;

use alloy::{
    contract,
    primitives::B256,
    providers::PendingTransactionError,
    transports::TransportError,
};
use thiserror::Error;

use crate::types::TokenId;

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Chain(#[from] ChainError),

    #[error(transparent)]
    Subgraph(#[from] SubgraphError),

    #[error(transparent)]
    Preflight(#[from] PreflightError),

    #[error(transparent)]
    Network(#[from] NetworkError),

    #[error(transparent)]
    Transaction(#[from] TransactionError),

    #[error("{operation} timed out after {after:?}")]
    Timeout {
        operation: &'static str,
        after: Duration,
    },
}

#[derive(Debug, Error)]
pub enum ChainError {
    #[error("rpc request failed: {0}")]
    Transport(#[from] TransportError),

    #[error("contract call failed: {0}")]
    Contract(#[from] contract::Error),

    #[error("failed to decode {event} log: {reason}")]
    UndecodableLog { event: &'static str, reason: String },

    #[error("malformed {field} for token {token_id}")]
    Malformed {
        token_id: TokenId,
        field: &'static str,
    },
}

#[derive(Debug, Error)]
pub enum SubgraphError {
    #[error("subgraph request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("subgraph returned errors: {0}")]
    Query(String),

    #[error("unexpected subgraph payload: {0}")]
    Decode(#[from] serde_json::Error),
}

/// Best-effort read-only checks that failed with a definite answer.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum PreflightError {
    #[error("only the pool owner can start auctions")]
    NotPoolOwner,

    #[error("domain {0} was never submitted")]
    NotSubmitted(TokenId),

    #[error("auction for {0} is already active")]
    AlreadyActive(TokenId),

    #[error("auction for {0} is not active")]
    NotActive(TokenId),

    #[error("auction for {0} has already ended")]
    Expired(TokenId),

    #[error("auction for {0} is still running")]
    StillRunning(TokenId),

    #[error("bid must be greater than the current highest bid")]
    BidTooLow,

    #[error("bid amount must be greater than zero")]
    ZeroAmount,

    #[error("wallet does not own domain {0}")]
    NotTokenOwner(TokenId),

    #[error("nothing to withdraw")]
    NothingToWithdraw,
}

#[derive(Debug, Error)]
pub enum NetworkError {
    #[error("failed to read chain id: {0}")]
    Transport(#[from] TransportError),

    #[error("wallet is on chain {actual}, expected {expected}")]
    SwitchFailed { expected: u64, actual: u64 },

    #[error("wallet refused to switch to chain {expected}: {reason}")]
    SwitchRejected { expected: u64, reason: String },
}

#[derive(Debug, Error)]
pub enum TransactionError {
    #[error("transaction failed: {0}")]
    Contract(#[from] contract::Error),

    #[error("pending transaction error: {0}")]
    Pending(#[from] PendingTransactionError),

    #[error("simulation reverted: {0}")]
    Simulation(contract::Error),

    #[error("gas estimation failed: {0}")]
    GasEstimation(contract::Error),

    #[error("transaction receipt missing body")]
    MissingReceipt,

    #[error("transaction reverted: {tx_hash:?}")]
    Reverted { tx_hash: B256 },
}
