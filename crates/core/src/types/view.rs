use std::cmp::Ordering;

use alloy::primitives::Address;
use chrono::{DateTime, Utc};
use serde::Serialize;

use super::{
    bid::{BidEvent, distinct_bidders},
    metadata::{DomainMetadata, Listing},
    primitives::{TokenId, Wei},
    state::{AuctionPhase, AuctionState},
};

/// UI-facing join of chain state, subgraph metadata and bid history for one token.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AuctionView {
    pub token_id: TokenId,
    pub domain: String,
    pub registrar: Option<String>,
    pub verified: bool,
    pub explorer_url: Option<String>,
    pub listings: Vec<Listing>,
    pub highest_bid: Wei,
    pub highest_bid_eth: f64,
    pub highest_bidder: Option<Address>,
    pub end_time: DateTime<Utc>,
    pub active: bool,
    pub phase: AuctionPhase,
    pub bidders: usize,
    pub total_bids: usize,
    /// Only populated for detail views.
    pub bid_history: Option<Vec<BidEvent>>,
}

impl AuctionView {
    pub fn assemble(
        state: &AuctionState,
        metadata: DomainMetadata,
        history: Vec<BidEvent>,
        keep_history: bool,
        now: DateTime<Utc>,
    ) -> Self {
        let bidders = distinct_bidders(&history);
        let total_bids = history.len();
        let verified = metadata.is_verified();

        Self {
            token_id: state.token_id,
            domain: metadata.name,
            registrar: metadata.registrar,
            verified,
            explorer_url: metadata.explorer_url,
            listings: metadata.listings,
            highest_bid: state.highest_bid,
            highest_bid_eth: state.highest_bid.to_ether_f64(),
            highest_bidder: state.highest_bidder,
            end_time: state.end_time,
            active: state.active,
            phase: state.phase(now),
            bidders,
            total_bids,
            bid_history: keep_history.then_some(history),
        }
    }

    pub fn matches_query(&self, query: &str) -> bool {
        let query = query.trim().to_lowercase();
        query.is_empty() || self.domain.to_lowercase().contains(&query)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ListingOrder {
    #[default]
    EndingSoon,
    HighestBid,
    LowestBid,
    MostBidders,
    Newest,
}

pub fn sort_views(views: &mut [AuctionView], order: ListingOrder) {
    let by_bid = |a: &AuctionView, b: &AuctionView| {
        a.highest_bid_eth
            .partial_cmp(&b.highest_bid_eth)
            .unwrap_or(Ordering::Equal)
    };

    match order {
        ListingOrder::EndingSoon => views.sort_by_key(|view| view.end_time),
        ListingOrder::Newest => views.sort_by(|a, b| b.end_time.cmp(&a.end_time)),
        ListingOrder::HighestBid => views.sort_by(|a, b| by_bid(b, a)),
        ListingOrder::LowestBid => views.sort_by(by_bid),
        ListingOrder::MostBidders => views.sort_by(|a, b| b.bidders.cmp(&a.bidders)),
    }
}
