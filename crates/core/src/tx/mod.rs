mod network;
mod orchestrator;
pub mod preflight;
mod revert;

pub use network::{ChainSpec, ensure_chain};
pub use orchestrator::{TransactionOrchestrator, TxOutcome, with_gas_margin};
pub use revert::{
    TxFailure, UNRECOGNIZED_CHAIN_CODE, USER_REJECTED_CODE, classify_payload, decode_revert,
};
