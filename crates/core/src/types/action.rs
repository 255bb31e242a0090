use alloy::primitives::B256;
use serde::Serialize;

use super::primitives::{TokenId, Wei};

/// A state-changing call the user asked for. Never retried automatically.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum TxIntent {
    PlaceBid { token_id: TokenId, amount: Wei },
    EndAuction { token_id: TokenId },
    Withdraw,
    /// `approve(pool, tokenId)` on the domain token, then `submitDomain(tokenId)`.
    SubmitDomain { token_id: TokenId },
    StartAuction { token_id: TokenId },
}

impl TxIntent {
    pub fn label(&self) -> &'static str {
        match self {
            TxIntent::PlaceBid { .. } => "placeBid",
            TxIntent::EndAuction { .. } => "endAuction",
            TxIntent::Withdraw => "withdraw",
            TxIntent::SubmitDomain { .. } => "submitDomain",
            TxIntent::StartAuction { .. } => "approveAndStartAuction",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TxReceiptSummary {
    pub tx_hash: B256,
    pub block_number: Option<u64>,
    pub gas_used: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TxResult {
    pub intent: TxIntent,
    /// Every confirmed step, in submission order.
    pub receipts: Vec<TxReceiptSummary>,
}

impl TxResult {
    pub fn final_hash(&self) -> Option<B256> {
        self.receipts.last().map(|receipt| receipt.tx_hash)
    }
}
