use alloy::{
    primitives::Address,
    providers::{DynProvider, Provider, ProviderBuilder},
    signers::local::PrivateKeySigner,
};
use eyre::WrapErr;

/// Read-only connection shared by every reader.
pub async fn connect_read(rpc_url: &str) -> eyre::Result<DynProvider> {
    let provider = ProviderBuilder::new()
        .connect(rpc_url)
        .await
        .wrap_err_with(|| format!("failed to connect to {rpc_url}"))?;
    Ok(provider.erased())
}

pub struct SignerConnection {
    pub provider: DynProvider,
    pub address: Address,
}

fn parse_signer(private_key: &str) -> eyre::Result<PrivateKeySigner> {
    private_key
        .trim()
        .parse()
        .wrap_err("PRIVATE_KEY is not a valid hex private key")
}

/// Account a private key signs for, without connecting.
pub fn signer_address(private_key: &str) -> eyre::Result<Address> {
    Ok(parse_signer(private_key)?.address())
}

/// Wallet-backed connection used for writes.
pub async fn connect_signer(rpc_url: &str, private_key: &str) -> eyre::Result<SignerConnection> {
    let signer = parse_signer(private_key)?;
    let address = signer.address();

    let provider = ProviderBuilder::new()
        .wallet(signer)
        .connect(rpc_url)
        .await
        .wrap_err_with(|| format!("failed to connect to {rpc_url}"))?;

    Ok(SignerConnection {
        provider: provider.erased(),
        address,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn derives_the_signing_account() {
        // First default anvil account.
        let key = "0xac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";
        let expected: Address = "0xf39Fd6e51aad88F6F4ce6aB8827279cffFb92266".parse().unwrap();

        assert_eq!(signer_address(key).unwrap(), expected);
        assert_eq!(signer_address(&format!("  {key}\n")).unwrap(), expected);
        assert!(signer_address("nope").is_err());
    }
}
