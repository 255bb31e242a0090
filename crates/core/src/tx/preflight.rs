//! Pure checks run against best-effort reads before a write is sent. They only
//! exist to produce a clearer message than the eventual revert would.

use alloy::primitives::Address;
use chrono::{DateTime, Utc};

use crate::{
    error::PreflightError,
    types::{AuctionState, TokenId, Wei},
};

pub fn check_bid(state: &AuctionState, amount: Wei, now: DateTime<Utc>) -> Result<(), PreflightError> {
    if amount.is_zero() {
        return Err(PreflightError::ZeroAmount);
    }

    if !state.exists {
        return Err(PreflightError::NotSubmitted(state.token_id));
    }

    if !state.active {
        return Err(PreflightError::NotActive(state.token_id));
    }

    if state.is_expired(now) {
        return Err(PreflightError::Expired(state.token_id));
    }

    if amount <= state.highest_bid {
        return Err(PreflightError::BidTooLow);
    }

    Ok(())
}

pub fn check_end(state: &AuctionState, now: DateTime<Utc>) -> Result<(), PreflightError> {
    if !state.exists {
        return Err(PreflightError::NotSubmitted(state.token_id));
    }

    if !state.active {
        return Err(PreflightError::NotActive(state.token_id));
    }

    if !state.is_expired(now) {
        return Err(PreflightError::StillRunning(state.token_id));
    }

    Ok(())
}

pub fn check_start(state: &AuctionState) -> Result<(), PreflightError> {
    if !state.exists {
        return Err(PreflightError::NotSubmitted(state.token_id));
    }

    if state.active {
        return Err(PreflightError::AlreadyActive(state.token_id));
    }

    Ok(())
}

pub fn check_pool_owner(owner: Address, signer: Address) -> Result<(), PreflightError> {
    if owner != signer {
        return Err(PreflightError::NotPoolOwner);
    }
    Ok(())
}

pub fn check_token_owner(
    token_id: TokenId,
    owner: Address,
    signer: Address,
) -> Result<(), PreflightError> {
    if owner != signer {
        return Err(PreflightError::NotTokenOwner(token_id));
    }
    Ok(())
}

pub fn check_withdraw(pending: Wei) -> Result<(), PreflightError> {
    if pending.is_zero() {
        return Err(PreflightError::NothingToWithdraw);
    }
    Ok(())
}
