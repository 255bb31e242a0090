use alloy::primitives::Address;
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::warn;

use crate::{
    error::SubgraphError,
    types::{
        metadata::{DomainMetadata, Listing},
        primitives::TokenId,
    },
};

const NAMES_QUERY: &str = r#"
query Names($ownedBy: [AddressCAIP10!], $take: Int) {
  names(take: $take, ownedBy: $ownedBy, sortOrder: DESC) {
    items {
      name
      expiresAt
      registrar { name }
      tokens {
        tokenId
        explorerUrl
        listings {
          id
          price
          orderbook
          offererAddress
          expiresAt
          currency { symbol }
        }
      }
    }
  }
}
"#;

const NAME_STATISTICS_QUERY: &str = r#"
query NameFromToken($tokenId: String!) {
  nameStatistics(tokenId: $tokenId) { name }
}
"#;

/// Domain identity lookups against the indexer. Results may lag the chain.
#[async_trait]
pub trait SubgraphReader: Send + Sync {
    /// Names currently owned by `owner`, one record per token.
    async fn names_owned_by(&self, owner: Address) -> Result<Vec<DomainMetadata>, SubgraphError>;

    /// Single-name lookup via `nameStatistics`.
    async fn name_by_token(&self, token_id: TokenId) -> Result<Option<String>, SubgraphError>;

    /// Full metadata for a token held in auction escrow.
    async fn domain_metadata(
        &self,
        token_id: TokenId,
    ) -> Result<Option<DomainMetadata>, SubgraphError>;
}

#[derive(Debug, Clone)]
pub struct SubgraphConfig {
    pub url: String,
    pub api_key: Option<String>,
    /// CAIP-2 prefix used to build CAIP-10 owner ids, e.g. `eip155:8453`.
    pub caip_network: String,
    pub take: u32,
    /// Address holding auctioned names (the pool contract).
    pub escrow: Address,
}

pub struct GraphqlSubgraph {
    http: reqwest::Client,
    config: SubgraphConfig,
}

impl GraphqlSubgraph {
    pub fn new(config: SubgraphConfig) -> Self {
        Self {
            http: reqwest::Client::new(),
            config,
        }
    }

    pub fn caip10(&self, owner: Address) -> String {
        format!(
            "{}:{}",
            self.config.caip_network,
            owner.to_string().to_lowercase()
        )
    }

    async fn post(&self, query: &str, variables: Value) -> Result<String, SubgraphError> {
        let mut request = self
            .http
            .post(&self.config.url)
            .json(&json!({ "query": query, "variables": variables }));

        if let Some(key) = &self.config.api_key {
            request = request.header("Api-Key", key);
        }

        let body = request.send().await?.error_for_status()?.text().await?;
        Ok(body)
    }
}

#[async_trait]
impl SubgraphReader for GraphqlSubgraph {
    async fn names_owned_by(&self, owner: Address) -> Result<Vec<DomainMetadata>, SubgraphError> {
        let variables = json!({
            "ownedBy": [self.caip10(owner)],
            "take": self.config.take,
        });
        let body = self.post(NAMES_QUERY, variables).await?;

        match parse_names(&body) {
            Err(SubgraphError::Decode(err)) => {
                warn!(%owner, error = %err, "malformed names payload, treating as empty");
                Ok(Vec::new())
            }
            other => other,
        }
    }

    async fn name_by_token(&self, token_id: TokenId) -> Result<Option<String>, SubgraphError> {
        let variables = json!({ "tokenId": token_id.to_string() });
        let body = self.post(NAME_STATISTICS_QUERY, variables).await?;

        match parse_name_statistics(&body) {
            Err(SubgraphError::Decode(err)) => {
                warn!(%token_id, error = %err, "malformed nameStatistics payload");
                Ok(None)
            }
            other => other,
        }
    }

    async fn domain_metadata(
        &self,
        token_id: TokenId,
    ) -> Result<Option<DomainMetadata>, SubgraphError> {
        let owned = self.names_owned_by(self.config.escrow).await?;
        Ok(owned.into_iter().find(|meta| meta.token_id == token_id))
    }
}

#[derive(Debug, Deserialize)]
struct GraphqlResponse<T> {
    data: Option<T>,
    #[serde(default)]
    errors: Vec<GraphqlMessage>,
}

#[derive(Debug, Deserialize)]
struct GraphqlMessage {
    message: String,
}

impl<T> GraphqlResponse<T> {
    fn into_data(self) -> Result<Option<T>, SubgraphError> {
        if self.data.is_none() && !self.errors.is_empty() {
            let joined = self
                .errors
                .into_iter()
                .map(|err| err.message)
                .collect::<Vec<_>>()
                .join("; ");
            return Err(SubgraphError::Query(joined));
        }
        Ok(self.data)
    }
}

#[derive(Debug, Deserialize)]
struct NamesData {
    names: Option<NamePage>,
}

#[derive(Debug, Deserialize)]
struct NamePage {
    #[serde(default)]
    items: Vec<RawName>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawName {
    name: Option<String>,
    expires_at: Option<String>,
    registrar: Option<RawRegistrar>,
    #[serde(default)]
    tokens: Vec<RawToken>,
}

#[derive(Debug, Deserialize)]
struct RawRegistrar {
    name: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawToken {
    token_id: Option<String>,
    explorer_url: Option<String>,
    #[serde(default)]
    listings: Vec<RawListing>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawListing {
    id: Option<String>,
    price: Option<String>,
    orderbook: Option<String>,
    offerer_address: Option<String>,
    expires_at: Option<String>,
    currency: Option<RawCurrency>,
}

#[derive(Debug, Deserialize)]
struct RawCurrency {
    symbol: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct NameStatisticsData {
    name_statistics: Option<NameStatistics>,
}

#[derive(Debug, Deserialize)]
struct NameStatistics {
    name: Option<String>,
}

/// Flattens a `names` response into one record per token, skipping records
/// without a name or a parseable token id.
pub fn parse_names(body: &str) -> Result<Vec<DomainMetadata>, SubgraphError> {
    let response: GraphqlResponse<NamesData> = serde_json::from_str(body)?;
    let items = response
        .into_data()?
        .and_then(|data| data.names)
        .map(|page| page.items)
        .unwrap_or_default();

    let mut records = Vec::new();
    for item in items {
        let Some(name) = item.name.filter(|name| !name.is_empty()) else {
            continue;
        };
        let registrar = item.registrar.and_then(|registrar| registrar.name);

        for token in item.tokens {
            let Some(token_id) = token
                .token_id
                .as_deref()
                .and_then(|raw| raw.parse::<TokenId>().ok())
            else {
                continue;
            };

            let listings = token
                .listings
                .into_iter()
                .filter_map(|listing| {
                    Some(Listing {
                        id: listing.id?,
                        price: listing.price.unwrap_or_default(),
                        orderbook: listing.orderbook,
                        offerer: listing.offerer_address,
                        currency_symbol: listing.currency.and_then(|currency| currency.symbol),
                        expires_at: listing.expires_at,
                    })
                })
                .collect();

            records.push(DomainMetadata {
                token_id,
                name: name.clone(),
                registrar: registrar.clone(),
                explorer_url: token.explorer_url,
                expires_at: item.expires_at.clone(),
                listings,
            });
        }
    }

    Ok(records)
}

pub fn parse_name_statistics(body: &str) -> Result<Option<String>, SubgraphError> {
    let response: GraphqlResponse<NameStatisticsData> = serde_json::from_str(body)?;
    Ok(response
        .into_data()?
        .and_then(|data| data.name_statistics)
        .and_then(|stats| stats.name)
        .filter(|name| !name.is_empty()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flattens_names_into_token_records() {
        let body = json!({
            "data": {
                "names": {
                    "items": [
                        {
                            "name": "alpha.doma",
                            "expiresAt": "2026-01-01T00:00:00Z",
                            "registrar": { "name": "D3 Registrar" },
                            "tokens": [
                                {
                                    "tokenId": "42",
                                    "explorerUrl": "https://explorer/42",
                                    "listings": [
                                        { "id": "l1", "price": "1000", "currency": { "symbol": "ETH" } }
                                    ]
                                },
                                { "tokenId": "not-a-number" }
                            ]
                        },
                        { "name": null, "tokens": [{ "tokenId": "7" }] }
                    ]
                }
            }
        })
        .to_string();

        let records = parse_names(&body).unwrap();
        assert_eq!(records.len(), 1);

        let record = &records[0];
        assert_eq!(record.token_id, TokenId::from(42));
        assert_eq!(record.name, "alpha.doma");
        assert!(record.is_verified());
        assert_eq!(record.listings.len(), 1);
        assert_eq!(record.listings[0].currency_symbol.as_deref(), Some("ETH"));
    }

    #[test]
    fn empty_data_yields_no_records() {
        let body = json!({ "data": { "names": null } }).to_string();
        assert!(parse_names(&body).unwrap().is_empty());
    }

    #[test]
    fn graphql_errors_without_data_are_reported() {
        let body = json!({ "data": null, "errors": [{ "message": "bad api key" }] }).to_string();
        let err = parse_names(&body).unwrap_err();
        assert!(matches!(err, SubgraphError::Query(msg) if msg == "bad api key"));
    }

    #[test]
    fn malformed_payload_is_a_decode_error() {
        assert!(matches!(
            parse_name_statistics("<html>"),
            Err(SubgraphError::Decode(_))
        ));
    }

    #[test]
    fn missing_name_statistics_is_none() {
        let body = json!({ "data": { "nameStatistics": null } }).to_string();
        assert_eq!(parse_name_statistics(&body).unwrap(), None);

        let body = json!({ "data": { "nameStatistics": { "name": "beta.doma" } } }).to_string();
        assert_eq!(parse_name_statistics(&body).unwrap().as_deref(), Some("beta.doma"));
    }
}
