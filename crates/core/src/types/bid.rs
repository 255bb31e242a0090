use std::{collections::HashSet, fmt};

use alloy::primitives::{Address, B256};
use chrono::{DateTime, Utc};
use serde::Serialize;

use super::primitives::{TokenId, Wei};

/// One `BidPlaced` log. Histories are kept in chain order (block, then log index).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BidEvent {
    pub bidder: Address,
    pub token_id: TokenId,
    pub amount: Wei,
    pub block_number: u64,
    pub log_index: u64,
    pub timestamp: Option<DateTime<Utc>>,
    pub tx_hash: B256,
}

/// A user's relationship to an auction they bid on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BidStatus {
    Winning,
    Outbid,
    Won,
    Lost,
}

impl BidStatus {
    /// Canonical mapping; recomputed on every read since the highest bidder can change between reads.
    pub fn resolve(highest_bidder: Option<Address>, expired: bool, user: Address) -> Self {
        let leading = highest_bidder == Some(user);
        match (expired, leading) {
            (false, true) => BidStatus::Winning,
            (false, false) => BidStatus::Outbid,
            (true, true) => BidStatus::Won,
            (true, false) => BidStatus::Lost,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            BidStatus::Winning => "winning",
            BidStatus::Outbid => "outbid",
            BidStatus::Won => "won",
            BidStatus::Lost => "lost",
        }
    }

    /// Won auctions still need `endAuction` to transfer the domain.
    /// A won auction is claimable until `endAuction` clears its active flag.
    pub fn can_claim(&self, active: bool) -> bool {
        matches!(self, BidStatus::Won) && active
    }
}

impl fmt::Display for BidStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Number of distinct bidder addresses in a history.
pub fn distinct_bidders(events: &[BidEvent]) -> usize {
    events
        .iter()
        .map(|event| event.bidder)
        .collect::<HashSet<_>>()
        .len()
}

/// Highest amount `user` bid in `events`; `None` if they never bid there.
pub fn max_bid_of(events: &[BidEvent], user: Address) -> Option<Wei> {
    events
        .iter()
        .filter(|event| event.bidder == user)
        .map(|event| event.amount)
        .max()
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UserBidPosition {
    pub token_id: TokenId,
    pub domain: String,
    pub current_bid: Wei,
    pub current_bid_eth: f64,
    pub my_bid: Wei,
    pub my_bid_eth: f64,
    pub status: BidStatus,
    pub claimable: bool,
    pub end_time: DateTime<Utc>,
    pub time_left: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PositionSummary {
    pub auctions: usize,
    pub winning: usize,
    pub outbid: usize,
    pub won: usize,
    pub lost: usize,
    pub total_committed: Wei,
}

impl PositionSummary {
    pub fn from_positions(positions: &[UserBidPosition]) -> Self {
        positions
            .iter()
            .fold(Self::default(), |mut summary, position| {
                summary.auctions += 1;
                match position.status {
                    BidStatus::Winning => summary.winning += 1,
                    BidStatus::Outbid => summary.outbid += 1,
                    BidStatus::Won => summary.won += 1,
                    BidStatus::Lost => summary.lost += 1,
                }
                summary.total_committed = summary.total_committed.saturating_add(position.my_bid);
                summary
            })
    }
}
