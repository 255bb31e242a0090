use alloy::primitives::Address;
use chrono::{DateTime, Utc};
use serde::Serialize;

use super::primitives::{TokenId, Wei};

/// Per-token auction record as read from `auctionItems`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AuctionState {
    pub token_id: TokenId,
    pub seller: Address,
    pub highest_bid: Wei,
    /// `None` when the contract reports the zero address, i.e. no bids yet.
    pub highest_bidder: Option<Address>,
    pub end_time: DateTime<Utc>,
    pub active: bool,
    pub exists: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum AuctionPhase {
    Live,
    Ended,
}

impl AuctionState {
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.end_time <= now
    }

    /// The single predicate deciding listing eligibility. Auctions that are past their end
    /// time but still flagged active (nobody has called `endAuction` yet) are not live.
    pub fn is_live(&self, now: DateTime<Utc>) -> bool {
        self.active && !self.is_expired(now)
    }

    pub fn phase(&self, now: DateTime<Utc>) -> AuctionPhase {
        if self.is_live(now) {
            AuctionPhase::Live
        } else {
            AuctionPhase::Ended
        }
    }
}
