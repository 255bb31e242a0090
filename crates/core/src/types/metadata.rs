use serde::Serialize;

use super::primitives::TokenId;

/// Registrar whose names are shown as verified.
pub const VERIFIED_REGISTRAR: &str = "D3 Registrar";

/// Human-readable identity of a domain token, sourced from the subgraph.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DomainMetadata {
    pub token_id: TokenId,
    pub name: String,
    pub registrar: Option<String>,
    pub explorer_url: Option<String>,
    pub expires_at: Option<String>,
    pub listings: Vec<Listing>,
}

impl DomainMetadata {
    pub fn is_verified(&self) -> bool {
        self.registrar.as_deref() == Some(VERIFIED_REGISTRAR)
    }
}

/// Secondary-market listing attached to a token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Listing {
    pub id: String,
    pub price: String,
    pub orderbook: Option<String>,
    pub offerer: Option<String>,
    pub currency_symbol: Option<String>,
    pub expires_at: Option<String>,
}
