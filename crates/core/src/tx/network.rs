use alloy::{providers::Provider, transports::TransportError};
use serde::Serialize;
use serde_json::{Value, json};
use tracing::{info, warn};

use crate::error::NetworkError;

use super::revert::{UNRECOGNIZED_CHAIN_CODE, USER_REJECTED_CODE};

/// The chain every write must land on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChainSpec {
    pub chain_id: u64,
    pub chain_name: String,
    pub rpc_url: String,
    pub native_name: String,
    pub native_symbol: String,
}

impl ChainSpec {
    pub fn hex_id(&self) -> String {
        format!("{:#x}", self.chain_id)
    }

    fn switch_params(&self) -> Vec<Value> {
        vec![json!({ "chainId": self.hex_id() })]
    }

    fn add_params(&self) -> Vec<Value> {
        vec![json!({
            "chainId": self.hex_id(),
            "chainName": self.chain_name,
            "rpcUrls": [self.rpc_url],
            "nativeCurrency": {
                "name": self.native_name,
                "symbol": self.native_symbol,
                "decimals": 18,
            },
        })]
    }
}

/// Switches the signer to `spec` if needed, registering the chain first when the
/// wallet does not know it. Fails unless the chain id matches afterwards.
pub async fn ensure_chain<P: Provider>(provider: &P, spec: &ChainSpec) -> Result<(), NetworkError> {
    let actual = provider.get_chain_id().await?;
    if actual == spec.chain_id {
        return Ok(());
    }

    warn!(actual, expected = spec.chain_id, "signer on wrong chain, requesting switch");

    if let Err(err) = request(provider, "wallet_switchEthereumChain", spec.switch_params()).await {
        match error_code(&err) {
            Some(UNRECOGNIZED_CHAIN_CODE) => {
                info!(chain = %spec.chain_name, "chain unknown to wallet, adding it");
                request(provider, "wallet_addEthereumChain", spec.add_params())
                    .await
                    .map_err(|err| rejected(spec, &err))?;
            }
            _ => return Err(rejected(spec, &err)),
        }
    }

    let after = provider.get_chain_id().await?;
    if after != spec.chain_id {
        return Err(NetworkError::SwitchFailed {
            expected: spec.chain_id,
            actual: after,
        });
    }

    Ok(())
}

async fn request<P: Provider>(
    provider: &P,
    method: &'static str,
    params: Vec<Value>,
) -> Result<Value, TransportError> {
    provider.raw_request::<_, Value>(method.into(), params).await
}

fn error_code(err: &TransportError) -> Option<i64> {
    err.as_error_resp().map(|payload| payload.code)
}

fn rejected(spec: &ChainSpec, err: &TransportError) -> NetworkError {
    let reason = match error_code(err) {
        Some(USER_REJECTED_CODE) => "request rejected in wallet".to_string(),
        _ => err.to_string(),
    };
    NetworkError::SwitchRejected {
        expected: spec.chain_id,
        reason,
    }
}
