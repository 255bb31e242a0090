use alloy::primitives::Address;
use eyre::Result;
use gogobid_core::TokenId;

use crate::votes::VoteBook;

/// Records a local vote for a pending submission.
pub fn vote(account: Option<Address>, token_id: TokenId) -> Result<()> {
    let path = VoteBook::default_path()?;
    let mut book = VoteBook::load(&path)?;

    if !book.record(account, token_id) {
        println!("Already voted for #{token_id}.");
        return Ok(());
    }
    book.save(&path)?;
    println!("Vote recorded for #{token_id}.");
    Ok(())
}
