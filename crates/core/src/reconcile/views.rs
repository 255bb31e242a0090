use std::{sync::Arc, time::Duration};

use alloy::primitives::Address;
use chrono::{DateTime, Utc};
use tracing::{info, warn};

use crate::{
    batch::{DEFAULT_CALL_TIMEOUT, settle_all, with_timeout},
    chain::{BidFilter, ChainReader},
    error::Error,
    subgraph::SubgraphReader,
    types::{AuctionState, AuctionView, BidEvent, DomainMetadata, TokenId},
};

/// Joins pool state, indexer metadata and bid history into per-token views.
pub struct AuctionViewBuilder {
    chain: Arc<dyn ChainReader>,
    subgraph: Arc<dyn SubgraphReader>,
    escrow: Address,
    call_timeout: Duration,
}

impl AuctionViewBuilder {
    pub fn new(
        chain: Arc<dyn ChainReader>,
        subgraph: Arc<dyn SubgraphReader>,
        escrow: Address,
    ) -> Self {
        Self {
            chain,
            subgraph,
            escrow,
            call_timeout: DEFAULT_CALL_TIMEOUT,
        }
    }

    pub fn with_call_timeout(mut self, call_timeout: Duration) -> Self {
        self.call_timeout = call_timeout;
        self
    }

    pub async fn live_auctions(&self) -> Vec<AuctionView> {
        self.live_auctions_at(Utc::now()).await
    }

    /// Live listings sourced from the names the pool currently holds in escrow.
    /// An unreachable indexer yields an empty listing.
    pub async fn live_auctions_at(&self, now: DateTime<Utc>) -> Vec<AuctionView> {
        let candidates = match with_timeout(
            "escrow names",
            self.call_timeout,
            self.subgraph.names_owned_by(self.escrow),
        )
        .await
        {
            Ok(candidates) => candidates,
            Err(error) => {
                warn!(%error, escrow = %self.escrow, "could not list auction candidates");
                return Vec::new();
            }
        };

        let jobs = candidates
            .into_iter()
            .map(|metadata| {
                let token_id = metadata.token_id;
                (token_id, self.reconcile_listed(metadata, now))
            })
            .collect();

        let views = settle_all("live auctions", self.call_timeout * 2, jobs).await;
        info!(count = views.len(), "built live auction views");
        views
    }

    /// List views for arbitrary candidate ids, metadata looked up per token.
    pub async fn build_many(&self, token_ids: &[TokenId], now: DateTime<Utc>) -> Vec<AuctionView> {
        let jobs = token_ids
            .iter()
            .map(|&token_id| (token_id, self.reconcile(token_id, now)))
            .collect();

        settle_all("auction views", self.call_timeout * 2, jobs).await
    }

    pub async fn detail(&self, token_id: TokenId) -> Result<Option<AuctionView>, Error> {
        self.detail_at(token_id, Utc::now()).await
    }

    /// Eager view with full bid history. Ended auctions are returned too so the
    /// page can show the outcome; `phase` tells them apart.
    pub async fn detail_at(
        &self,
        token_id: TokenId,
        now: DateTime<Utc>,
    ) -> Result<Option<AuctionView>, Error> {
        let (chain, metadata) = tokio::join!(
            async {
                tokio::try_join!(
                    with_timeout("auctionItems", self.call_timeout, self.chain.auction_state(token_id)),
                    with_timeout(
                        "bid history",
                        self.call_timeout,
                        self.chain.bid_events(BidFilter::for_token(token_id))
                    ),
                )
            },
            with_timeout(
                "domain metadata",
                self.call_timeout,
                self.subgraph.domain_metadata(token_id)
            ),
        );
        let (state, history) = chain?;

        if !state.exists {
            return Ok(None);
        }

        let metadata = metadata
            .unwrap_or_else(|error| {
                warn!(%token_id, %error, "metadata unavailable, showing chain data only");
                None
            })
            .unwrap_or_else(|| placeholder_metadata(token_id));
        Ok(Some(AuctionView::assemble(&state, metadata, history, true, now)))
    }

    async fn reconcile(
        &self,
        token_id: TokenId,
        now: DateTime<Utc>,
    ) -> Result<Option<AuctionView>, Error> {
        let (state, metadata) = tokio::try_join!(
            with_timeout("auctionItems", self.call_timeout, self.chain.auction_state(token_id)),
            with_timeout(
                "domain metadata",
                self.call_timeout,
                self.subgraph.domain_metadata(token_id)
            ),
        )?;

        if !state.is_live(now) {
            return Ok(None);
        }
        let Some(metadata) = metadata else {
            warn!(%token_id, "no indexer metadata for live auction, skipping");
            return Ok(None);
        };

        self.finish(state, metadata, now).await.map(Some)
    }

    async fn reconcile_listed(
        &self,
        metadata: DomainMetadata,
        now: DateTime<Utc>,
    ) -> Result<Option<AuctionView>, Error> {
        let state = with_timeout(
            "auctionItems",
            self.call_timeout,
            self.chain.auction_state(metadata.token_id),
        )
        .await?;

        if !state.is_live(now) {
            return Ok(None);
        }

        self.finish(state, metadata, now).await.map(Some)
    }

    async fn finish(
        &self,
        state: AuctionState,
        metadata: DomainMetadata,
        now: DateTime<Utc>,
    ) -> Result<AuctionView, Error> {
        let history: Vec<BidEvent> = with_timeout(
            "bid history",
            self.call_timeout,
            self.chain.bid_events(BidFilter::for_token(state.token_id)),
        )
        .await?;

        Ok(AuctionView::assemble(&state, metadata, history, false, now))
    }
}

fn placeholder_metadata(token_id: TokenId) -> DomainMetadata {
    DomainMetadata {
        token_id,
        name: token_id.placeholder_name(),
        registrar: None,
        explorer_url: None,
        expires_at: None,
        listings: Vec::new(),
    }
}
