use alloy::providers::DynProvider;
use eyre::{Result, bail};
use gogobid_core::{
    TxIntent, TxResult,
    tx::{TransactionOrchestrator, TxOutcome},
};
use tracing::info;

use super::{Services, render};
use crate::provider::connect_signer;

pub async fn orchestrator(
    services: &Services,
    private_key: &str,
) -> Result<TransactionOrchestrator<DynProvider>> {
    let chain = &services.config.chain;
    let connection = connect_signer(&chain.rpc_url, private_key).await?;
    info!(signer = %connection.address, "wallet connected");

    Ok(TransactionOrchestrator::new(
        connection.provider,
        services.chain.clone(),
        chain.auction,
        chain.token,
        connection.address,
        services.config.chain_spec(),
    )
    .with_confirmations(chain.confirmations))
}

fn print_result(result: &TxResult) {
    match result.final_hash() {
        Some(hash) => println!("{} confirmed in {hash}", result.intent.label()),
        None => println!("{} confirmed", result.intent.label()),
    }
    for receipt in &result.receipts {
        let block = receipt
            .block_number
            .map(|block| block.to_string())
            .unwrap_or_else(|| "?".to_string());
        println!(
            "  {}  block {block}  gas {}",
            receipt.tx_hash, receipt.gas_used
        );
    }
}

/// Runs one write to completion. A failed write is reported and returned as an error.
pub async fn execute(services: &Services, private_key: &str, intent: TxIntent) -> Result<()> {
    let orchestrator = orchestrator(services, private_key).await?;
    let signer = orchestrator.signer();
    let withdraw = matches!(intent, TxIntent::Withdraw);

    match orchestrator.execute(intent).await {
        TxOutcome::Confirmed(result) => {
            print_result(&result);
            if withdraw {
                let left = services.positions().pending_returns(signer).await?;
                println!(
                    "Pending returns for {}: {left}",
                    render::short_address(signer)
                );
            }
            Ok(())
        }
        TxOutcome::Failed { intent, failure } => {
            bail!("{} failed: {}", intent.label(), failure.user_message())
        }
    }
}
