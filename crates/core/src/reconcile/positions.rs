use std::{collections::BTreeSet, sync::Arc, time::Duration};

use alloy::primitives::Address;
use chrono::{DateTime, Utc};
use tracing::{info, warn};

use crate::{
    batch::{DEFAULT_CALL_TIMEOUT, settle_all, with_timeout},
    chain::{BidFilter, ChainReader},
    error::Error,
    subgraph::SubgraphReader,
    time::format_time_left,
    types::{BidStatus, TokenId, UserBidPosition, Wei, max_bid_of},
};

/// Classifies a user's standing in every auction they have bid on.
pub struct UserPositionResolver {
    chain: Arc<dyn ChainReader>,
    subgraph: Arc<dyn SubgraphReader>,
    call_timeout: Duration,
}

impl UserPositionResolver {
    pub fn new(chain: Arc<dyn ChainReader>, subgraph: Arc<dyn SubgraphReader>) -> Self {
        Self {
            chain,
            subgraph,
            call_timeout: DEFAULT_CALL_TIMEOUT,
        }
    }

    pub fn with_call_timeout(mut self, call_timeout: Duration) -> Self {
        self.call_timeout = call_timeout;
        self
    }

    pub async fn positions(&self, user: Address) -> Vec<UserBidPosition> {
        self.positions_at(user, Utc::now()).await
    }

    pub async fn positions_at(&self, user: Address, now: DateTime<Utc>) -> Vec<UserBidPosition> {
        let own_bids = match with_timeout(
            "bids by bidder",
            self.call_timeout,
            self.chain.bid_events(BidFilter::by_bidder(user)),
        )
        .await
        {
            Ok(events) => events,
            Err(error) => {
                warn!(%user, %error, "could not load bid events for user");
                return Vec::new();
            }
        };

        let token_ids: BTreeSet<TokenId> = own_bids.iter().map(|event| event.token_id).collect();

        let jobs = token_ids
            .into_iter()
            .map(|token_id| (token_id, self.resolve(user, token_id, now)))
            .collect();

        let positions = settle_all("user positions", self.call_timeout * 2, jobs).await;
        info!(%user, count = positions.len(), "resolved bid positions");
        positions
    }

    /// Withdrawable refunds. Always a fresh read; re-query after any write.
    pub async fn pending_returns(&self, user: Address) -> Result<Wei, Error> {
        with_timeout(
            "pendingReturns",
            self.call_timeout,
            self.chain.pending_returns(user),
        )
        .await
    }

    async fn resolve(
        &self,
        user: Address,
        token_id: TokenId,
        now: DateTime<Utc>,
    ) -> Result<Option<UserBidPosition>, Error> {
        let (state, metadata, history) = tokio::try_join!(
            with_timeout("auctionItems", self.call_timeout, self.chain.auction_state(token_id)),
            with_timeout(
                "domain metadata",
                self.call_timeout,
                self.subgraph.domain_metadata(token_id)
            ),
            with_timeout(
                "bid history",
                self.call_timeout,
                self.chain.bid_events(BidFilter::for_token(token_id))
            ),
        )?;

        let Some(metadata) = metadata else {
            warn!(%token_id, %user, "no indexer metadata for bid row, skipping");
            return Ok(None);
        };

        let my_bid = max_bid_of(&history, user).unwrap_or(Wei::ZERO);
        let status = BidStatus::resolve(state.highest_bidder, state.is_expired(now), user);

        Ok(Some(UserBidPosition {
            token_id,
            domain: metadata.name,
            current_bid: state.highest_bid,
            current_bid_eth: state.highest_bid.to_ether_f64(),
            my_bid,
            my_bid_eth: my_bid.to_ether_f64(),
            status,
            claimable: status.can_claim(state.active),
            end_time: state.end_time,
            time_left: format_time_left(state.end_time, now),
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::*;
    use alloy::primitives::U256;
    use chrono::Duration as ChronoDuration;

    const ETH: u64 = 1_000_000_000_000_000_000;

    fn resolver(chain: MockChain, subgraph: MockSubgraph) -> UserPositionResolver {
        UserPositionResolver::new(Arc::new(chain), Arc::new(subgraph))
            .with_call_timeout(Duration::from_millis(50))
    }

    #[tokio::test]
    async fn my_bid_is_own_max_not_global_max() {
        let now = Utc::now();
        let user = Address::repeat_byte(0x01);
        let other = Address::repeat_byte(0x02);

        let mut chain = MockChain::with_states([state(
            5,
            true,
            now + ChronoDuration::hours(3),
            Some(other),
            10 * ETH,
        )]);
        chain.bids = vec![
            bid(user, 5, ETH, 1),
            bid(user, 5, 5 * ETH / 2, 2),
            bid(other, 5, 10 * ETH, 3),
        ];
        let subgraph = MockSubgraph::with_metadata([metadata(5, "five.doma")]);

        let positions = resolver(chain, subgraph).positions_at(user, now).await;

        assert_eq!(positions.len(), 1);
        let position = &positions[0];
        assert_eq!(position.my_bid, Wei::new(U256::from(5 * ETH / 2)));
        assert_eq!(position.my_bid_eth, 2.5);
        assert_eq!(position.current_bid_eth, 10.0);
        assert_eq!(position.status, BidStatus::Outbid);
        assert_eq!(position.time_left, "0d 3h");
    }

    #[tokio::test]
    async fn statuses_follow_expiry_and_leader() {
        let now = Utc::now();
        let user = Address::repeat_byte(0x01);
        let other = Address::repeat_byte(0x02);
        let future = now + ChronoDuration::days(1);
        let past = now - ChronoDuration::days(1);

        let mut chain = MockChain::with_states([
            state(1, true, future, Some(user), 1),
            state(2, true, future, Some(other), 2),
            state(3, false, past, Some(user), 1),
            state(4, true, past, Some(other), 2),
        ]);
        chain.bids = (1..=4).map(|id| bid(user, id, 1, id)).collect();
        let subgraph = MockSubgraph::with_metadata((1..=4).map(|id| metadata(id, "d.doma")));

        let positions = resolver(chain, subgraph).positions_at(user, now).await;
        let statuses: Vec<_> = positions.iter().map(|p| (p.token_id, p.status)).collect();

        assert_eq!(
            statuses,
            vec![
                (TokenId::from(1), BidStatus::Winning),
                (TokenId::from(2), BidStatus::Outbid),
                (TokenId::from(3), BidStatus::Won),
                (TokenId::from(4), BidStatus::Lost),
            ]
        );
        assert_eq!(crate::types::PositionSummary::from_positions(&positions).won, 1);

        let claimable: Vec<_> = positions.iter().map(|p| p.claimable).collect();
        assert_eq!(claimable, vec![false, false, false, false]);
    }

    #[tokio::test]
    async fn won_stays_claimable_until_settled() {
        let now = Utc::now();
        let user = Address::repeat_byte(0x01);
        let past = now - ChronoDuration::hours(1);

        let mut chain = MockChain::with_states([
            state(7, true, past, Some(user), 3),
            state(8, false, past, Some(user), 3),
        ]);
        chain.bids = vec![bid(user, 7, 3, 1), bid(user, 8, 3, 2)];
        let subgraph = MockSubgraph::with_metadata([metadata(7, "a.doma"), metadata(8, "b.doma")]);

        let positions = resolver(chain, subgraph).positions_at(user, now).await;
        let rows: Vec<_> = positions
            .iter()
            .map(|p| (p.token_id, p.status, p.claimable))
            .collect();

        assert_eq!(
            rows,
            vec![
                (TokenId::from(7), BidStatus::Won, true),
                (TokenId::from(8), BidStatus::Won, false),
            ]
        );
    }

    #[tokio::test]
    async fn rows_without_state_or_metadata_are_excluded() {
        let now = Utc::now();
        let user = Address::repeat_byte(0x01);
        let end = now + ChronoDuration::hours(1);

        let mut chain = MockChain::with_states([
            state(1, true, end, Some(user), 1),
            state(3, true, end, Some(user), 1),
        ]);
        chain.failing.insert(TokenId::from(3));
        chain.bids = vec![bid(user, 1, 1, 1), bid(user, 2, 1, 2), bid(user, 3, 1, 3), bid(user, 1, 2, 4)];
        let subgraph = MockSubgraph::with_metadata([metadata(1, "one.doma"), metadata(3, "three.doma")]);

        let positions = resolver(chain, subgraph).positions_at(user, now).await;

        assert_eq!(positions.len(), 1);
        assert_eq!(positions[0].token_id, TokenId::from(1));
        assert_eq!(positions[0].my_bid, wei(2));
    }

    #[tokio::test]
    async fn pending_returns_are_read_fresh() {
        let user = Address::repeat_byte(0x01);
        let mut chain = MockChain::default();
        chain.returns.insert(user, wei(42));

        let resolver = resolver(chain, MockSubgraph::default());
        assert_eq!(resolver.pending_returns(user).await.unwrap(), wei(42));
        assert!(resolver.pending_returns(Address::ZERO).await.unwrap().is_zero());
    }
}
