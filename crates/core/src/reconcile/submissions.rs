use std::{
    collections::{HashMap, HashSet},
    sync::Arc,
    time::Duration,
};

use alloy::primitives::Address;
use futures::future::join_all;
use tracing::{debug, warn};

use crate::{
    batch::{DEFAULT_CALL_TIMEOUT, with_timeout},
    chain::ChainReader,
    subgraph::SubgraphReader,
    types::{
        AuctionEndedEvent, AuctionStartedEvent, PendingSubmission, SubmissionEvent,
        SubmissionLifecycle, TokenId,
    },
};

/// Matches `DomainSubmitted` logs against `AuctionStarted`. Recomputed from
/// scratch on every call; membership can change between polls.
pub struct SubmissionResolver {
    chain: Arc<dyn ChainReader>,
    subgraph: Arc<dyn SubgraphReader>,
    call_timeout: Duration,
}

impl SubmissionResolver {
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

    /// Pending submissions, optionally scoped to one seller. A failed log read
    /// is logged and yields an empty list.
    pub async fn pending(&self, seller: Option<Address>) -> Vec<PendingSubmission> {
        let logs = tokio::try_join!(
            with_timeout(
                "DomainSubmitted logs",
                self.call_timeout,
                self.chain.submitted_events(seller)
            ),
            with_timeout(
                "AuctionStarted logs",
                self.call_timeout,
                self.chain.started_events()
            ),
        );
        let (submitted, started) = match logs {
            Ok(logs) => logs,
            Err(error) => {
                warn!(?seller, %error, "could not load submissions");
                return Vec::new();
            }
        };

        let pending = pending_from(submitted, &started);
        debug!(count = pending.len(), "pending submissions before name lookup");

        join_all(pending.into_iter().map(|event| self.enrich(event))).await
    }

    /// Submissions that made it to auction, in start order. Empty when the logs
    /// cannot be read.
    pub async fn history(&self, seller: Option<Address>) -> Vec<SubmissionLifecycle> {
        let logs = tokio::try_join!(
            with_timeout(
                "DomainSubmitted logs",
                self.call_timeout,
                self.chain.submitted_events(seller)
            ),
            with_timeout(
                "AuctionStarted logs",
                self.call_timeout,
                self.chain.started_events()
            ),
            with_timeout(
                "AuctionEnded logs",
                self.call_timeout,
                self.chain.ended_events()
            ),
        );

        match logs {
            Ok((submitted, started, ended)) => lifecycle_from(&submitted, started, &ended),
            Err(error) => {
                warn!(?seller, %error, "could not load submission history");
                Vec::new()
            }
        }
    }

    /// Resolved name, or `None` when the subgraph has none or the lookup fails.
    pub async fn display_name(&self, token_id: TokenId) -> Option<String> {
        match with_timeout(
            "nameStatistics",
            self.call_timeout,
            self.subgraph.name_by_token(token_id),
        )
        .await
        {
            Ok(name) => name,
            Err(error) => {
                warn!(%token_id, %error, "name lookup failed, using placeholder");
                None
            }
        }
    }

    async fn enrich(&self, event: SubmissionEvent) -> PendingSubmission {
        let name = self.display_name(event.token_id).await;

        PendingSubmission {
            seller: event.seller,
            token_id: event.token_id,
            name_resolved: name.is_some(),
            display_name: name.unwrap_or_else(|| event.token_id.placeholder_name()),
            tx_hash: event.tx_hash,
        }
    }
}

/// `submitted − started` keyed by token id, one entry per token (latest
/// submission wins), in submission order.
pub fn pending_from(
    submitted: Vec<SubmissionEvent>,
    started: &[AuctionStartedEvent],
) -> Vec<SubmissionEvent> {
    let started: HashSet<TokenId> = started.iter().map(|event| event.token_id).collect();

    let mut latest: HashMap<TokenId, usize> = HashMap::new();
    for (index, event) in submitted.iter().enumerate() {
        latest.insert(event.token_id, index);
    }

    submitted
        .into_iter()
        .enumerate()
        .filter(|(index, event)| {
            !started.contains(&event.token_id) && latest.get(&event.token_id) == Some(index)
        })
        .map(|(_, event)| event)
        .collect()
}

/// Pairs each start with the latest submission of that token logged at or
/// before it, and the first `AuctionEnded` logged after it.
pub fn lifecycle_from(
    submitted: &[SubmissionEvent],
    started: Vec<AuctionStartedEvent>,
    ended: &[AuctionEndedEvent],
) -> Vec<SubmissionLifecycle> {
    started
        .into_iter()
        .filter_map(|start| {
            let submission = submitted
                .iter()
                .filter(|event| {
                    event.token_id == start.token_id && event.block_number <= start.block_number
                })
                .max_by_key(|event| event.block_number)?
                .clone();
            let ended = ended
                .iter()
                .find(|end| end.token_id == start.token_id && end.block_number >= start.block_number)
                .cloned();
            Some(SubmissionLifecycle {
                submission,
                started: start,
                ended,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::*;
    use chrono::Utc;

    fn ids(events: &[SubmissionEvent]) -> Vec<TokenId> {
        events.iter().map(|event| event.token_id).collect()
    }

    #[test]
    fn pending_is_submitted_minus_started() {
        let seller = Address::repeat_byte(0x5e);
        let submitted: Vec<_> = (1..=3).map(|id| submitted(seller, id)).collect();
        let end = Utc::now();

        let pending = pending_from(submitted.clone(), &[started(2, end)]);
        assert_eq!(ids(&pending), [1, 3].map(TokenId::from).to_vec());

        let pending = pending_from(submitted, &[started(2, end), started(1, end)]);
        assert_eq!(ids(&pending), vec![TokenId::from(3)]);
    }

    #[test]
    fn lifecycle_pairs_start_and_end() {
        let seller = Address::repeat_byte(0x5e);
        let end = Utc::now();
        let finished = AuctionEndedEvent {
            token_id: TokenId::from(2),
            winner: Some(Address::repeat_byte(0x0b)),
            amount: wei(9),
            block_number: 50,
            tx_hash: Default::default(),
        };

        let history = lifecycle_from(
            &[submitted(seller, 1), submitted(seller, 2), submitted(seller, 3)],
            vec![started(2, end), started(3, end)],
            &[finished.clone()],
        );

        assert_eq!(history.len(), 2);
        assert_eq!(history[0].ended, Some(finished));
        assert_eq!(history[1].submission.token_id, TokenId::from(3));
        assert_eq!(history[1].ended, None);
    }

    #[test]
    fn resubmitted_token_appears_once() {
        let first = Address::repeat_byte(0x01);
        let second = Address::repeat_byte(0x02);
        let pending = pending_from(vec![submitted(first, 7), submitted(second, 7)], &[]);

        assert_eq!(pending.len(), 1);
        assert_eq!(pending[0].seller, second);
    }

    #[tokio::test]
    async fn unresolved_names_fall_back_to_placeholder() {
        let seller = Address::repeat_byte(0x5e);
        let mut chain = MockChain::default();
        chain.submitted = vec![submitted(seller, 1), submitted(seller, 123_456)];

        let mut subgraph = MockSubgraph::default();
        subgraph.names.insert(TokenId::from(1), "one.doma".into());
        subgraph.failing.insert(TokenId::from(123_456));

        let pending = SubmissionResolver::new(Arc::new(chain), Arc::new(subgraph))
            .pending(None)
            .await;

        assert_eq!(pending.len(), 2);
        assert_eq!(pending[0].display_name, "one.doma");
        assert!(pending[0].name_resolved);
        assert_eq!(pending[1].display_name, "Unknown #12345");
        assert!(!pending[1].name_resolved);
    }

    #[tokio::test]
    async fn seller_scope_filters_other_sellers() {
        let me = Address::repeat_byte(0x01);
        let other = Address::repeat_byte(0x02);
        let mut chain = MockChain::default();
        chain.submitted = vec![submitted(me, 1), submitted(other, 2)];

        let pending = SubmissionResolver::new(Arc::new(chain), Arc::new(MockSubgraph::default()))
            .pending(Some(me))
            .await;

        assert_eq!(pending.len(), 1);
        assert_eq!(pending[0].token_id, TokenId::from(1));
    }

    #[test]
    fn each_start_pairs_with_the_submission_before_it() {
        let first = Address::repeat_byte(0x01);
        let second = Address::repeat_byte(0x02);
        let end = Utc::now();
        let at = |event: SubmissionEvent, block| SubmissionEvent {
            block_number: block,
            ..event
        };
        let start_at = |block| AuctionStartedEvent {
            block_number: block,
            ..started(7, end)
        };

        let history = lifecycle_from(
            &[at(submitted(first, 7), 10), at(submitted(second, 7), 30)],
            vec![start_at(20), start_at(40)],
            &[],
        );

        assert_eq!(history.len(), 2);
        assert_eq!(history[0].submission.seller, first);
        assert_eq!(history[1].submission.seller, second);
    }

    #[tokio::test]
    async fn failed_log_reads_are_empty_results() {
        let seller = Address::repeat_byte(0x5e);
        let mut chain = MockChain::default();
        chain.submitted = vec![submitted(seller, 1)];
        chain.logs_failing = true;
        let resolver = SubmissionResolver::new(Arc::new(chain), Arc::new(MockSubgraph::default()));

        assert!(resolver.pending(None).await.is_empty());
        assert!(resolver.history(Some(seller)).await.is_empty());
    }
}
