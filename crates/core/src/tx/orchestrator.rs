use std::{fmt::Display, future::IntoFuture, sync::Arc};

use alloy::{
    consensus::TxReceipt,
    network::Ethereum,
    primitives::Address,
    providers::{PendingTransactionBuilder, Provider},
};
use chrono::Utc;
use gogobid_abi::{IAuctionPool, IDomainToken};
use tracing::{debug, info, warn};

use crate::{
    chain::ChainReader,
    error::{Error, PreflightError, TransactionError},
    types::{TokenId, TxIntent, TxReceiptSummary, TxResult, Wei},
};

use super::{
    network::{ChainSpec, ensure_chain},
    preflight,
    revert::TxFailure,
};

const DEFAULT_CONFIRMATIONS: u64 = 1;

#[derive(Debug)]
pub enum TxOutcome {
    Confirmed(TxResult),
    Failed { intent: TxIntent, failure: TxFailure },
}

/// Gas limit with a 10% margin over the estimate.
pub fn with_gas_margin(estimate: u64) -> u64 {
    estimate.saturating_mul(11) / 10
}

/// Sequences signed writes against the pool and the domain token. Each step
/// waits for its receipt before the next one is sent; nothing is retried.
pub struct TransactionOrchestrator<P>
where
    P: Provider + Clone,
{
    provider: P,
    reader: Arc<dyn ChainReader>,
    pool: Address,
    token: Address,
    signer: Address,
    chain: ChainSpec,
    confirmations: u64,
}

impl<P> TransactionOrchestrator<P>
where
    P: Provider + Clone,
{
    pub fn new(
        provider: P,
        reader: Arc<dyn ChainReader>,
        pool: Address,
        token: Address,
        signer: Address,
        chain: ChainSpec,
    ) -> Self {
        Self {
            provider,
            reader,
            pool,
            token,
            signer,
            chain,
            confirmations: DEFAULT_CONFIRMATIONS,
        }
    }

    pub fn with_confirmations(mut self, confirmations: u64) -> Self {
        self.confirmations = confirmations.max(1);
        self
    }

    pub fn signer(&self) -> Address {
        self.signer
    }

    pub async fn execute(&self, intent: TxIntent) -> TxOutcome {
        match self.execute_inner(&intent).await {
            Ok(receipts) => {
                info!(
                    action = intent.label(),
                    steps = receipts.len(),
                    "transaction confirmed"
                );
                TxOutcome::Confirmed(TxResult { intent, receipts })
            }
            Err(error) => {
                let failure = TxFailure::classify(&error);
                warn!(action = intent.label(), %error, "transaction failed");
                TxOutcome::Failed { intent, failure }
            }
        }
    }

    async fn execute_inner(&self, intent: &TxIntent) -> Result<Vec<TxReceiptSummary>, Error> {
        ensure_chain(&self.provider, &self.chain).await?;

        match *intent {
            TxIntent::PlaceBid { token_id, amount } => self.place_bid(token_id, amount).await,
            TxIntent::EndAuction { token_id } => self.end_auction(token_id).await,
            TxIntent::Withdraw => self.withdraw().await,
            TxIntent::SubmitDomain { token_id } => self.submit_domain(token_id).await,
            TxIntent::StartAuction { token_id } => self.start_auction(token_id).await,
        }
    }

    async fn place_bid(
        &self,
        token_id: TokenId,
        amount: Wei,
    ) -> Result<Vec<TxReceiptSummary>, Error> {
        if amount.is_zero() {
            return Err(PreflightError::ZeroAmount.into());
        }
        if let Some(state) = best_effort("auction state", self.reader.auction_state(token_id)).await {
            preflight::check_bid(&state, amount, Utc::now())?;
        }

        let pool = IAuctionPool::new(self.pool, &self.provider);
        let pending = pool
            .placeBid(token_id.as_u256())
            .value(amount.as_u256())
            .send()
            .await
            .map_err(TransactionError::from)?;

        Ok(vec![self.confirm("placeBid", pending).await?])
    }

    async fn end_auction(&self, token_id: TokenId) -> Result<Vec<TxReceiptSummary>, Error> {
        if let Some(state) = best_effort("auction state", self.reader.auction_state(token_id)).await {
            preflight::check_end(&state, Utc::now())?;
        }

        let pool = IAuctionPool::new(self.pool, &self.provider);
        let pending = pool
            .endAuction(token_id.as_u256())
            .send()
            .await
            .map_err(TransactionError::from)?;

        Ok(vec![self.confirm("endAuction", pending).await?])
    }

    async fn withdraw(&self) -> Result<Vec<TxReceiptSummary>, Error> {
        if let Some(pending) =
            best_effort("pending returns", self.reader.pending_returns(self.signer)).await
        {
            preflight::check_withdraw(pending)?;
        }

        let pool = IAuctionPool::new(self.pool, &self.provider);
        let pending = pool
            .withdraw()
            .send()
            .await
            .map_err(TransactionError::from)?;

        Ok(vec![self.confirm("withdraw", pending).await?])
    }

    /// `approve(pool, tokenId)` then `submitDomain(tokenId)`. The approval is
    /// skipped when the pool is already the approved operator.
    async fn submit_domain(&self, token_id: TokenId) -> Result<Vec<TxReceiptSummary>, Error> {
        let id = token_id.as_u256();
        let token = IDomainToken::new(self.token, &self.provider);

        if let Some(owner) = best_effort("ownerOf", token.ownerOf(id).call()).await {
            preflight::check_token_owner(token_id, owner, self.signer)?;
        }

        let mut receipts = Vec::with_capacity(2);

        let approved = best_effort("getApproved", token.getApproved(id).call()).await;
        if approved != Some(self.pool) {
            let pending = token
                .approve(self.pool, id)
                .send()
                .await
                .map_err(TransactionError::from)?;
            receipts.push(self.confirm("approve", pending).await?);
        }

        let pool = IAuctionPool::new(self.pool, &self.provider);
        let pending = pool
            .submitDomain(id)
            .send()
            .await
            .map_err(TransactionError::from)?;
        receipts.push(self.confirm("submitDomain", pending).await?);

        Ok(receipts)
    }

    /// Owner and item checks, then a simulated call for a decodable revert, then
    /// a gas estimate with margin, and only then the real transaction.
    async fn start_auction(&self, token_id: TokenId) -> Result<Vec<TxReceiptSummary>, Error> {
        let id = token_id.as_u256();
        let pool = IAuctionPool::new(self.pool, &self.provider);

        if let Some(owner) = best_effort("owner", pool.owner().call()).await {
            preflight::check_pool_owner(owner, self.signer)?;
        }
        if let Some(state) = best_effort("auction state", self.reader.auction_state(token_id)).await {
            preflight::check_start(&state)?;
        }

        let call = pool.approveAndStartAuction(id).from(self.signer);
        call.call().await.map_err(TransactionError::Simulation)?;

        let estimate = call
            .estimate_gas()
            .await
            .map_err(TransactionError::GasEstimation)?;
        let gas_limit = with_gas_margin(estimate);
        debug!(estimate, gas_limit, "gas estimated for approveAndStartAuction");

        let pending = call
            .gas(gas_limit)
            .send()
            .await
            .map_err(TransactionError::from)?;

        Ok(vec![self.confirm("approveAndStartAuction", pending).await?])
    }

    async fn confirm(
        &self,
        step: &'static str,
        pending: PendingTransactionBuilder<Ethereum>,
    ) -> Result<TxReceiptSummary, Error> {
        info!(step, tx_hash = %pending.tx_hash(), "transaction sent, awaiting receipt");

        let receipt = pending
            .with_required_confirmations(self.confirmations)
            .get_receipt()
            .await
            .map_err(TransactionError::from)?;

        let receipt_body = receipt
            .inner
            .as_receipt()
            .ok_or(TransactionError::MissingReceipt)?;

        if !receipt_body.status() {
            return Err(TransactionError::Reverted {
                tx_hash: receipt.transaction_hash,
            }
            .into());
        }

        Ok(TxReceiptSummary {
            tx_hash: receipt.transaction_hash,
            block_number: receipt.block_number,
            gas_used: receipt.gas_used,
        })
    }
}

/// Preflight reads only sharpen error messages; a failed read skips the check.
async fn best_effort<T, E, F>(check: &'static str, read: F) -> Option<T>
where
    F: IntoFuture<Output = Result<T, E>>,
    E: Display,
{
    match read.await {
        Ok(value) => Some(value),
        Err(error) => {
            debug!(check, %error, "preflight read failed, skipping check");
            None
        }
    }
}
