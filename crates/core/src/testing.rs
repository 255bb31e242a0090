//! Scripted reader doubles for reconciliation tests.

use std::{
    collections::{HashMap, HashSet},
    sync::atomic::{AtomicUsize, Ordering},
    time::Duration,
};

use alloy::primitives::{Address, B256, U256};
use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::{
    chain::{BidFilter, ChainReader},
    error::{ChainError, SubgraphError},
    subgraph::SubgraphReader,
    types::{
        AuctionEndedEvent, AuctionStartedEvent, AuctionState, BidEvent, DomainMetadata,
        SubmissionEvent, TokenId, Wei,
    },
};

pub const HANG: Duration = Duration::from_secs(60);

pub fn wei(amount: u64) -> Wei {
    Wei::new(U256::from(amount))
}

pub fn state(
    token: u64,
    active: bool,
    end_time: DateTime<Utc>,
    highest_bidder: Option<Address>,
    highest_bid: u64,
) -> AuctionState {
    AuctionState {
        token_id: TokenId::from(token),
        seller: Address::repeat_byte(0x5e),
        highest_bid: wei(highest_bid),
        highest_bidder,
        end_time,
        active,
        exists: true,
    }
}

pub fn bid(bidder: Address, token: u64, amount: u64, block: u64) -> BidEvent {
    BidEvent {
        bidder,
        token_id: TokenId::from(token),
        amount: wei(amount),
        block_number: block,
        log_index: 0,
        timestamp: None,
        tx_hash: B256::with_last_byte(block as u8),
    }
}

pub fn metadata(token: u64, name: &str) -> DomainMetadata {
    DomainMetadata {
        token_id: TokenId::from(token),
        name: name.to_string(),
        registrar: Some("D3 Registrar".to_string()),
        explorer_url: None,
        expires_at: None,
        listings: Vec::new(),
    }
}

pub fn submitted(seller: Address, token: u64) -> SubmissionEvent {
    SubmissionEvent {
        seller,
        token_id: TokenId::from(token),
        block_number: token,
        tx_hash: B256::with_last_byte(token as u8),
    }
}

pub fn started(token: u64, end_time: DateTime<Utc>) -> AuctionStartedEvent {
    AuctionStartedEvent {
        token_id: TokenId::from(token),
        end_time,
        block_number: token,
        tx_hash: B256::with_last_byte(token as u8),
    }
}

#[derive(Default)]
pub struct MockChain {
    pub states: HashMap<TokenId, AuctionState>,
    pub bids: Vec<BidEvent>,
    pub submitted: Vec<SubmissionEvent>,
    pub started: Vec<AuctionStartedEvent>,
    pub ended: Vec<AuctionEndedEvent>,
    pub returns: HashMap<Address, Wei>,
    pub failing: HashSet<TokenId>,
    pub hanging: HashSet<TokenId>,
    /// Every event-log query fails.
    pub logs_failing: bool,
    pub state_calls: AtomicUsize,
    pub bid_calls: AtomicUsize,
}

impl MockChain {
    pub fn with_states(states: impl IntoIterator<Item = AuctionState>) -> Self {
        Self {
            states: states
                .into_iter()
                .map(|state| (state.token_id, state))
                .collect(),
            ..Default::default()
        }
    }

    pub fn state_calls(&self) -> usize {
        self.state_calls.load(Ordering::SeqCst)
    }

    pub fn bid_calls(&self) -> usize {
        self.bid_calls.load(Ordering::SeqCst)
    }

    fn logs(&self, event: &'static str) -> Result<(), ChainError> {
        if self.logs_failing {
            return Err(ChainError::UndecodableLog {
                event,
                reason: "rpc down".into(),
            });
        }
        Ok(())
    }
}

#[async_trait]
impl ChainReader for MockChain {
    async fn auction_state(&self, token_id: TokenId) -> Result<AuctionState, ChainError> {
        self.state_calls.fetch_add(1, Ordering::SeqCst);
        if self.hanging.contains(&token_id) {
            tokio::time::sleep(HANG).await;
        }
        if self.failing.contains(&token_id) {
            return Err(ChainError::Malformed {
                token_id,
                field: "auctionItems",
            });
        }
        self.states
            .get(&token_id)
            .cloned()
            .ok_or(ChainError::Malformed {
                token_id,
                field: "auctionItems",
            })
    }

    async fn bid_events(&self, filter: BidFilter) -> Result<Vec<BidEvent>, ChainError> {
        self.bid_calls.fetch_add(1, Ordering::SeqCst);
        self.logs("BidPlaced")?;
        Ok(self
            .bids
            .iter()
            .filter(|event| filter.bidder.is_none_or(|bidder| event.bidder == bidder))
            .filter(|event| filter.token_id.is_none_or(|token| event.token_id == token))
            .cloned()
            .collect())
    }

    async fn submitted_events(
        &self,
        seller: Option<Address>,
    ) -> Result<Vec<SubmissionEvent>, ChainError> {
        self.logs("DomainSubmitted")?;
        Ok(self
            .submitted
            .iter()
            .filter(|event| seller.is_none_or(|seller| event.seller == seller))
            .cloned()
            .collect())
    }

    async fn started_events(&self) -> Result<Vec<AuctionStartedEvent>, ChainError> {
        self.logs("AuctionStarted")?;
        Ok(self.started.clone())
    }

    async fn ended_events(&self) -> Result<Vec<AuctionEndedEvent>, ChainError> {
        self.logs("AuctionEnded")?;
        Ok(self.ended.clone())
    }

    async fn pending_returns(&self, account: Address) -> Result<Wei, ChainError> {
        Ok(self.returns.get(&account).copied().unwrap_or_default())
    }
}

#[derive(Default)]
pub struct MockSubgraph {
    pub metadata: HashMap<TokenId, DomainMetadata>,
    pub owned: HashMap<Address, Vec<DomainMetadata>>,
    pub names: HashMap<TokenId, String>,
    pub failing: HashSet<TokenId>,
    /// Name lookups for these tokens never answer in time.
    pub hanging: HashSet<TokenId>,
    pub metadata_calls: AtomicUsize,
}

impl MockSubgraph {
    pub fn with_metadata(records: impl IntoIterator<Item = DomainMetadata>) -> Self {
        Self {
            metadata: records
                .into_iter()
                .map(|meta| (meta.token_id, meta))
                .collect(),
            ..Default::default()
        }
    }
}

#[async_trait]
impl SubgraphReader for MockSubgraph {
    async fn names_owned_by(&self, owner: Address) -> Result<Vec<DomainMetadata>, SubgraphError> {
        Ok(self.owned.get(&owner).cloned().unwrap_or_default())
    }

    async fn name_by_token(&self, token_id: TokenId) -> Result<Option<String>, SubgraphError> {
        if self.hanging.contains(&token_id) {
            tokio::time::sleep(HANG).await;
        }
        if self.failing.contains(&token_id) {
            return Err(SubgraphError::Query("mock failure".into()));
        }
        Ok(self.names.get(&token_id).cloned())
    }

    async fn domain_metadata(
        &self,
        token_id: TokenId,
    ) -> Result<Option<DomainMetadata>, SubgraphError> {
        self.metadata_calls.fetch_add(1, Ordering::SeqCst);
        if self.failing.contains(&token_id) {
            return Err(SubgraphError::Query("mock failure".into()));
        }
        Ok(self.metadata.get(&token_id).cloned())
    }
}
