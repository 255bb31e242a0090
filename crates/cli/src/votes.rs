//! Per-account "already voted" bookkeeping for pending submissions.
//!
//! Stored as a local JSON file with no server-side verification: deleting the
//! file or switching accounts resets it.

use std::{
    collections::BTreeMap,
    fs, io,
    path::{Path, PathBuf},
};

use alloy::primitives::Address;
use gogobid_core::TokenId;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::warn;

const APP_DIR: &str = "gogobid";
const VOTES_FILE: &str = "votes.json";

#[derive(Debug, Error)]
pub enum VoteError {
    #[error("failed to access vote book at {path}: {source}")]
    Io { path: PathBuf, source: io::Error },
    #[error("failed to encode vote book: {0}")]
    Encode(#[from] serde_json::Error),
    #[error("no data directory available on this platform")]
    NoDataDir,
}

pub fn vote_key(account: Option<Address>) -> String {
    match account {
        Some(account) => format!("votedDomains:{}", account.to_string().to_lowercase()),
        None => "votedDomains:guest".to_string(),
    }
}

#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VoteBook {
    accounts: BTreeMap<String, BTreeMap<String, bool>>,
}

impl VoteBook {
    pub fn default_path() -> Result<PathBuf, VoteError> {
        dirs::data_dir()
            .map(|dir| dir.join(APP_DIR).join(VOTES_FILE))
            .ok_or(VoteError::NoDataDir)
    }

    /// A missing file is an empty book; an unreadable one is reset with a warning.
    pub fn load(path: &Path) -> Result<Self, VoteError> {
        let contents = match fs::read_to_string(path) {
            Ok(contents) => contents,
            Err(source) if source.kind() == io::ErrorKind::NotFound => return Ok(Self::default()),
            Err(source) => {
                return Err(VoteError::Io {
                    path: path.to_path_buf(),
                    source,
                });
            }
        };

        Ok(serde_json::from_str(&contents).unwrap_or_else(|error| {
            warn!(path = %path.display(), %error, "vote book unreadable, starting fresh");
            Self::default()
        }))
    }

    pub fn save(&self, path: &Path) -> Result<(), VoteError> {
        let io_error = |source| VoteError::Io {
            path: path.to_path_buf(),
            source,
        };

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(io_error)?;
        }
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json).map_err(io_error)
    }

    pub fn has_voted(&self, account: Option<Address>, token_id: TokenId) -> bool {
        self.accounts
            .get(&vote_key(account))
            .and_then(|votes| votes.get(&token_id.to_string()))
            .copied()
            .unwrap_or(false)
    }

    /// Records one vote; returns false if this account already voted for the item.
    pub fn record(&mut self, account: Option<Address>, token_id: TokenId) -> bool {
        if self.has_voted(account, token_id) {
            return false;
        }
        self.accounts
            .entry(vote_key(account))
            .or_default()
            .insert(token_id.to_string(), true);
        true
    }

    pub fn votes_of(&self, account: Option<Address>) -> Vec<String> {
        self.accounts
            .get(&vote_key(account))
            .map(|votes| {
                votes
                    .iter()
                    .filter(|(_, voted)| **voted)
                    .map(|(id, _)| id.clone())
                    .collect()
            })
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_path(name: &str) -> PathBuf {
        std::env::temp_dir()
            .join(format!("gogobid-votes-{}-{name}", std::process::id()))
            .join(VOTES_FILE)
    }

    #[test]
    fn keys_are_lowercased_or_guest() {
        let account: Address = "0xABCDEF0000000000000000000000000000000001".parse().unwrap();
        assert_eq!(
            vote_key(Some(account)),
            "votedDomains:0xabcdef0000000000000000000000000000000001"
        );
        assert_eq!(vote_key(None), "votedDomains:guest");
    }

    #[test]
    fn one_vote_per_item_per_account() {
        let mut book = VoteBook::default();
        let me = Some(Address::repeat_byte(1));
        let token = TokenId::from(7);

        assert!(book.record(me, token));
        assert!(!book.record(me, token));
        assert!(book.record(None, token));
        assert!(book.has_voted(me, token));
        assert!(!book.has_voted(Some(Address::repeat_byte(2)), token));
        assert_eq!(book.votes_of(me), vec!["7".to_string()]);
    }

    #[test]
    fn round_trips_through_disk() {
        let path = temp_path("roundtrip");
        let mut book = VoteBook::default();
        book.record(None, TokenId::from(3));
        book.save(&path).unwrap();

        let loaded = VoteBook::load(&path).unwrap();
        assert!(loaded.has_voted(None, TokenId::from(3)));

        let _ = fs::remove_dir_all(path.parent().unwrap());
    }

    #[test]
    fn missing_or_corrupt_file_is_empty() {
        let path = temp_path("corrupt");
        assert_eq!(VoteBook::load(&path).unwrap(), VoteBook::default());

        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, "{not json").unwrap();
        assert_eq!(VoteBook::load(&path).unwrap(), VoteBook::default());

        let _ = fs::remove_dir_all(path.parent().unwrap());
    }
}
