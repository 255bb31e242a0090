use alloy::primitives::{Address, B256};
use chrono::{DateTime, Utc};
use serde::Serialize;

use super::primitives::{TokenId, Wei};

/// `DomainSubmitted` log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SubmissionEvent {
    pub seller: Address,
    pub token_id: TokenId,
    pub block_number: u64,
    pub tx_hash: B256,
}

/// `AuctionStarted` log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AuctionStartedEvent {
    pub token_id: TokenId,
    pub end_time: DateTime<Utc>,
    pub block_number: u64,
    pub tx_hash: B256,
}

/// `AuctionEnded` log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AuctionEndedEvent {
    pub token_id: TokenId,
    pub winner: Option<Address>,
    pub amount: Wei,
    pub block_number: u64,
    pub tx_hash: B256,
}

/// A submitted domain whose auction has not started yet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PendingSubmission {
    pub seller: Address,
    pub token_id: TokenId,
    pub display_name: String,
    pub name_resolved: bool,
    pub tx_hash: B256,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CollectionStatus {
    Owned,
    Listed,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CollectionItem {
    pub token_id: TokenId,
    pub domain: String,
    pub status: CollectionStatus,
}

/// A submission whose auction has started, plus its `AuctionEnded` log once there is one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SubmissionLifecycle {
    pub submission: SubmissionEvent,
    pub started: AuctionStartedEvent,
    pub ended: Option<AuctionEndedEvent>,
}
