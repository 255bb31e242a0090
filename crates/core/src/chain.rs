use std::collections::HashMap;

use alloy::{
    consensus::BlockHeader,
    eips::BlockNumberOrTag,
    primitives::{Address, B256},
    providers::Provider,
    rpc::types::{Filter, Log},
    sol_types::SolEvent,
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use gogobid_abi::IAuctionPool;

use crate::{
    error::ChainError,
    types::{
        bid::BidEvent,
        primitives::{BlockRange, TokenId, Wei, timestamp_from_secs},
        state::AuctionState,
        submission::{AuctionEndedEvent, AuctionStartedEvent, SubmissionEvent},
    },
};

/// Indexed-argument filter for `BidPlaced` queries.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BidFilter {
    pub bidder: Option<Address>,
    pub token_id: Option<TokenId>,
}

impl BidFilter {
    pub fn by_bidder(bidder: Address) -> Self {
        Self {
            bidder: Some(bidder),
            token_id: None,
        }
    }

    pub fn for_token(token_id: TokenId) -> Self {
        Self {
            bidder: None,
            token_id: Some(token_id),
        }
    }
}

/// Read-only access to the auction pool. Every call is a fresh one-shot query;
/// callers re-query for fresh data and own any retry policy.
#[async_trait]
pub trait ChainReader: Send + Sync {
    async fn auction_state(&self, token_id: TokenId) -> Result<AuctionState, ChainError>;

    /// `BidPlaced` logs in chain order.
    async fn bid_events(&self, filter: BidFilter) -> Result<Vec<BidEvent>, ChainError>;

    async fn submitted_events(
        &self,
        seller: Option<Address>,
    ) -> Result<Vec<SubmissionEvent>, ChainError>;

    async fn started_events(&self) -> Result<Vec<AuctionStartedEvent>, ChainError>;

    async fn ended_events(&self) -> Result<Vec<AuctionEndedEvent>, ChainError>;

    async fn pending_returns(&self, account: Address) -> Result<Wei, ChainError>;
}

pub struct RpcChainReader<P>
where
    P: Provider + Clone,
{
    provider: P,
    auction: Address,
    range: BlockRange,
}

impl<P> RpcChainReader<P>
where
    P: Provider + Clone,
{
    pub fn new(provider: P, auction: Address, range: BlockRange) -> Self {
        Self {
            provider,
            auction,
            range,
        }
    }

    pub fn address(&self) -> Address {
        self.auction
    }

    fn event_filter<E: SolEvent>(&self) -> Filter {
        let to = self
            .range
            .to
            .map_or(BlockNumberOrTag::Latest, BlockNumberOrTag::Number);

        Filter::new()
            .address(self.auction)
            .event_signature(E::SIGNATURE_HASH)
            .from_block(self.range.from)
            .to_block(to)
    }

    async fn fetch_logs(&self, filter: &Filter) -> Result<Vec<Log>, ChainError> {
        let mut logs = self.provider.get_logs(filter).await?;
        logs.sort_by_key(|log| (log.block_number, log.log_index));
        Ok(logs)
    }

    async fn block_timestamp(
        &self,
        block_number: u64,
        cache: &mut HashMap<u64, Option<DateTime<Utc>>>,
    ) -> Result<Option<DateTime<Utc>>, ChainError> {
        if let Some(cached) = cache.get(&block_number) {
            return Ok(*cached);
        }

        let timestamp = self
            .provider
            .get_block_by_number(BlockNumberOrTag::Number(block_number))
            .await?
            .and_then(|block| DateTime::from_timestamp(block.header.timestamp() as i64, 0));

        cache.insert(block_number, timestamp);
        Ok(timestamp)
    }
}

fn decode<E: SolEvent>(log: &Log, event: &'static str) -> Result<E, ChainError> {
    log.log_decode::<E>()
        .map(|decoded| decoded.inner.data)
        .map_err(|err| ChainError::UndecodableLog {
            event,
            reason: err.to_string(),
        })
}

fn non_zero(address: Address) -> Option<Address> {
    (!address.is_zero()).then_some(address)
}

#[async_trait]
impl<P> ChainReader for RpcChainReader<P>
where
    P: Provider + Clone + Send + Sync + 'static,
{
    async fn auction_state(&self, token_id: TokenId) -> Result<AuctionState, ChainError> {
        let pool = IAuctionPool::new(self.auction, &self.provider);
        let item = pool.auctionItems(token_id.as_u256()).call().await?;

        let end_time = timestamp_from_secs(item.endTime).ok_or(ChainError::Malformed {
            token_id,
            field: "endTime",
        })?;

        Ok(AuctionState {
            token_id,
            seller: item.seller,
            highest_bid: Wei::new(item.highestBid),
            highest_bidder: non_zero(item.highestBidder),
            end_time,
            active: item.active,
            exists: item.exists,
        })
    }

    async fn bid_events(&self, filter: BidFilter) -> Result<Vec<BidEvent>, ChainError> {
        let mut query = self.event_filter::<IAuctionPool::BidPlaced>();
        if let Some(bidder) = filter.bidder {
            query = query.topic1(bidder.into_word());
        }
        if let Some(token_id) = filter.token_id {
            query = query.topic2(token_id.as_topic());
        }

        let logs = self.fetch_logs(&query).await?;
        let mut timestamps = HashMap::new();
        let mut events = Vec::with_capacity(logs.len());

        for log in &logs {
            let data = decode::<IAuctionPool::BidPlaced>(log, "BidPlaced")?;
            let block_number = log.block_number.unwrap_or_default();
            let timestamp = match log.block_timestamp {
                Some(secs) => DateTime::from_timestamp(secs as i64, 0),
                None => self.block_timestamp(block_number, &mut timestamps).await?,
            };

            events.push(BidEvent {
                bidder: data.bidder,
                token_id: TokenId::new(data.tokenId),
                amount: Wei::new(data.amount),
                block_number,
                log_index: log.log_index.unwrap_or_default(),
                timestamp,
                tx_hash: log.transaction_hash.unwrap_or(B256::ZERO),
            });
        }

        Ok(events)
    }

    async fn submitted_events(
        &self,
        seller: Option<Address>,
    ) -> Result<Vec<SubmissionEvent>, ChainError> {
        let mut query = self.event_filter::<IAuctionPool::DomainSubmitted>();
        if let Some(seller) = seller {
            query = query.topic1(seller.into_word());
        }

        self.fetch_logs(&query)
            .await?
            .iter()
            .map(|log| {
                let data = decode::<IAuctionPool::DomainSubmitted>(log, "DomainSubmitted")?;
                Ok(SubmissionEvent {
                    seller: data.seller,
                    token_id: TokenId::new(data.tokenId),
                    block_number: log.block_number.unwrap_or_default(),
                    tx_hash: log.transaction_hash.unwrap_or(B256::ZERO),
                })
            })
            .collect()
    }

    async fn started_events(&self) -> Result<Vec<AuctionStartedEvent>, ChainError> {
        let query = self.event_filter::<IAuctionPool::AuctionStarted>();

        self.fetch_logs(&query)
            .await?
            .iter()
            .map(|log| {
                let data = decode::<IAuctionPool::AuctionStarted>(log, "AuctionStarted")?;
                let token_id = TokenId::new(data.tokenId);
                let end_time = timestamp_from_secs(data.endTime).ok_or(ChainError::Malformed {
                    token_id,
                    field: "endTime",
                })?;
                Ok(AuctionStartedEvent {
                    token_id,
                    end_time,
                    block_number: log.block_number.unwrap_or_default(),
                    tx_hash: log.transaction_hash.unwrap_or(B256::ZERO),
                })
            })
            .collect()
    }

    async fn ended_events(&self) -> Result<Vec<AuctionEndedEvent>, ChainError> {
        let query = self.event_filter::<IAuctionPool::AuctionEnded>();

        self.fetch_logs(&query)
            .await?
            .iter()
            .map(|log| {
                let data = decode::<IAuctionPool::AuctionEnded>(log, "AuctionEnded")?;
                Ok(AuctionEndedEvent {
                    token_id: TokenId::new(data.tokenId),
                    winner: non_zero(data.winner),
                    amount: Wei::new(data.amount),
                    block_number: log.block_number.unwrap_or_default(),
                    tx_hash: log.transaction_hash.unwrap_or(B256::ZERO),
                })
            })
            .collect()
    }

    async fn pending_returns(&self, account: Address) -> Result<Wei, ChainError> {
        let pool = IAuctionPool::new(self.auction, &self.provider);
        let amount = pool.pendingReturns(account).call().await?;
        Ok(Wei::new(amount))
    }
}
