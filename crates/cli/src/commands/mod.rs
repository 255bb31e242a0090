pub mod read;
pub mod render;
pub mod vote;
pub mod watch;
pub mod write;

use std::sync::Arc;

use gogobid_core::{
    AuctionViewBuilder, ChainReader, CollectionResolver, GraphqlSubgraph, RpcChainReader,
    SubgraphReader, SubmissionResolver, UserPositionResolver,
};

use crate::{config::AppConfig, provider::connect_read};

/// Readers built once per invocation and shared by every resolver.
pub struct Services {
    pub config: AppConfig,
    pub chain: Arc<dyn ChainReader>,
    pub subgraph: Arc<dyn SubgraphReader>,
}

impl Services {
    pub async fn connect(config: AppConfig) -> eyre::Result<Self> {
        let provider = connect_read(&config.chain.rpc_url).await?;
        let chain: Arc<dyn ChainReader> = Arc::new(RpcChainReader::new(
            provider,
            config.chain.auction,
            config.block_range(),
        ));
        let subgraph: Arc<dyn SubgraphReader> =
            Arc::new(GraphqlSubgraph::new(config.subgraph_config()));

        Ok(Self {
            config,
            chain,
            subgraph,
        })
    }

    pub fn views(&self) -> AuctionViewBuilder {
        AuctionViewBuilder::new(
            self.chain.clone(),
            self.subgraph.clone(),
            self.config.chain.auction,
        )
        .with_call_timeout(self.config.refresh.call_timeout())
    }

    pub fn positions(&self) -> UserPositionResolver {
        UserPositionResolver::new(self.chain.clone(), self.subgraph.clone())
            .with_call_timeout(self.config.refresh.call_timeout())
    }

    pub fn submissions(&self) -> SubmissionResolver {
        SubmissionResolver::new(self.chain.clone(), self.subgraph.clone())
            .with_call_timeout(self.config.refresh.call_timeout())
    }

    pub fn collection(&self) -> CollectionResolver {
        CollectionResolver::new(self.chain.clone(), self.subgraph.clone())
            .with_call_timeout(self.config.refresh.call_timeout())
    }
}
