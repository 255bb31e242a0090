use std::{sync::Arc, time::Duration};

use alloy::primitives::Address;
use futures::future::join_all;
use tracing::warn;

use crate::{
    batch::{DEFAULT_CALL_TIMEOUT, with_timeout},
    chain::ChainReader,
    error::Error,
    subgraph::SubgraphReader,
    types::{CollectionItem, CollectionStatus},
};

use super::SubmissionResolver;

/// Names a user holds in their wallet plus the ones they handed to the pool.
pub struct CollectionResolver {
    chain: Arc<dyn ChainReader>,
    subgraph: Arc<dyn SubgraphReader>,
    names: SubmissionResolver,
    call_timeout: Duration,
}

impl CollectionResolver {
    pub fn new(chain: Arc<dyn ChainReader>, subgraph: Arc<dyn SubgraphReader>) -> Self {
        let names = SubmissionResolver::new(chain.clone(), subgraph.clone());
        Self {
            chain,
            subgraph,
            names,
            call_timeout: DEFAULT_CALL_TIMEOUT,
        }
    }

    /// Applies to both the owned-name and submission reads, and to name lookups.
    pub fn with_call_timeout(mut self, call_timeout: Duration) -> Self {
        self.names = self.names.with_call_timeout(call_timeout);
        self.call_timeout = call_timeout;
        self
    }

    /// Owned items first, then listed ones. Either half degrades to empty on failure.
    pub async fn collection(&self, owner: Address) -> Vec<CollectionItem> {
        let timeout = self.call_timeout;
        let (owned, submitted) = tokio::join!(
            with_timeout("owned names", timeout, self.subgraph.names_owned_by(owner)),
            with_timeout(
                "DomainSubmitted logs",
                timeout,
                self.chain.submitted_events(Some(owner))
            ),
        );

        let owned = owned.unwrap_or_else(|error: Error| {
            warn!(%owner, %error, "could not load owned names");
            Vec::new()
        });
        let submitted = submitted.unwrap_or_else(|error: Error| {
            warn!(%owner, %error, "could not load submissions");
            Vec::new()
        });

        let mut items: Vec<CollectionItem> = owned
            .into_iter()
            .map(|meta| CollectionItem {
                token_id: meta.token_id,
                domain: meta.name,
                status: CollectionStatus::Owned,
            })
            .collect();

        let listed = join_all(submitted.into_iter().map(|event| async move {
            let domain = self
                .names
                .display_name(event.token_id)
                .await
                .unwrap_or_else(|| event.token_id.placeholder_name());
            CollectionItem {
                token_id: event.token_id,
                domain,
                status: CollectionStatus::Listed,
            }
        }))
        .await;

        items.extend(listed);
        items
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{testing::*, types::TokenId};

    #[tokio::test]
    async fn owned_then_listed() {
        let owner = Address::repeat_byte(0x01);
        let mut chain = MockChain::default();
        chain.submitted = vec![submitted(owner, 2), submitted(Address::repeat_byte(0x02), 3)];

        let mut subgraph = MockSubgraph::default();
        subgraph.owned.insert(owner, vec![metadata(1, "one.doma")]);
        subgraph.names.insert(TokenId::from(2), "two.doma".into());

        let items = CollectionResolver::new(Arc::new(chain), Arc::new(subgraph))
            .collection(owner)
            .await;

        assert_eq!(
            items,
            vec![
                CollectionItem {
                    token_id: TokenId::from(1),
                    domain: "one.doma".into(),
                    status: CollectionStatus::Owned,
                },
                CollectionItem {
                    token_id: TokenId::from(2),
                    domain: "two.doma".into(),
                    status: CollectionStatus::Listed,
                },
            ]
        );
    }

    #[tokio::test]
    async fn configured_timeout_bounds_name_lookups() {
        let owner = Address::repeat_byte(0x01);
        let mut chain = MockChain::default();
        chain.submitted = vec![submitted(owner, 2)];
        let mut subgraph = MockSubgraph::default();
        subgraph.hanging.insert(TokenId::from(2));

        let resolver = CollectionResolver::new(Arc::new(chain), Arc::new(subgraph))
            .with_call_timeout(Duration::from_millis(50));
        let items = tokio::time::timeout(Duration::from_secs(2), resolver.collection(owner))
            .await
            .expect("collection should respect the configured timeout");

        assert_eq!(items.len(), 1);
        assert_eq!(items[0].domain, "Unknown #2");
        assert_eq!(items[0].status, CollectionStatus::Listed);
    }
}
