//! Plain-text formatting for terminal output. Nothing here performs I/O.

use std::fmt::Write as _;

use alloy::primitives::Address;
use chrono::{DateTime, Utc};
use gogobid_core::{
    AuctionPhase, AuctionView, BidEvent, CollectionItem, CollectionStatus, PendingSubmission,
    PositionSummary, SubmissionLifecycle, UserBidPosition, time::TimeLeft,
};

const VERIFIED_MARK: &str = "[verified]";

/// `0x1234...abcd`
pub fn short_address(address: Address) -> String {
    let full = address.to_checksum(None);
    format!("{}...{}", &full[..6], &full[full.len() - 4..])
}

fn phase_label(phase: AuctionPhase) -> &'static str {
    match phase {
        AuctionPhase::Live => "Live",
        AuctionPhase::Ended => "Ended",
    }
}

pub fn view_row(view: &AuctionView, now: DateTime<Utc>) -> String {
    let mut row = format!(
        "#{:<12} {:<32} {:>16}  {:>3} bidders / {:>3} bids  {}",
        view.token_id,
        view.domain,
        view.highest_bid.to_string(),
        view.bidders,
        view.total_bids,
        TimeLeft::between(view.end_time, now),
    );
    if view.verified {
        row.push(' ');
        row.push_str(VERIFIED_MARK);
    }
    row
}

pub fn view_table(views: &[AuctionView], now: DateTime<Utc>) -> String {
    if views.is_empty() {
        return "No live auctions.".to_string();
    }
    views
        .iter()
        .map(|view| view_row(view, now))
        .collect::<Vec<_>>()
        .join("\n")
}

fn bid_row(event: &BidEvent) -> String {
    let when = event
        .timestamp
        .map(|ts| ts.format("%Y-%m-%d %H:%M:%S UTC").to_string())
        .unwrap_or_else(|| format!("block {}", event.block_number));
    format!(
        "  {}  {:>16}  {}  {}",
        short_address(event.bidder),
        event.amount.to_string(),
        when,
        event.tx_hash
    )
}

/// Full detail page; `countdown` is the live time-left string.
pub fn view_detail(view: &AuctionView, countdown: &str) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{} (#{})", view.domain, view.token_id);
    let _ = writeln!(out, "Status:       {}", phase_label(view.phase));
    let _ = writeln!(out, "Time left:    {countdown}");
    let _ = writeln!(out, "Ends at:      {}", view.end_time.format("%Y-%m-%d %H:%M:%S UTC"));
    let _ = writeln!(out, "Highest bid:  {}", view.highest_bid);
    let _ = writeln!(
        out,
        "Leader:       {}",
        view.highest_bidder
            .map(short_address)
            .unwrap_or_else(|| "none".to_string())
    );
    let _ = writeln!(out, "Bidders:      {} ({} bids)", view.bidders, view.total_bids);

    if let Some(registrar) = &view.registrar {
        let mark = if view.verified { format!(" {VERIFIED_MARK}") } else { String::new() };
        let _ = writeln!(out, "Registrar:    {registrar}{mark}");
    }
    if let Some(url) = &view.explorer_url {
        let _ = writeln!(out, "Explorer:     {url}");
    }
    for listing in &view.listings {
        let _ = writeln!(
            out,
            "Listing:      {} {} on {}",
            listing.price,
            listing.currency_symbol.as_deref().unwrap_or(""),
            listing.orderbook.as_deref().unwrap_or("unknown orderbook")
        );
    }

    if let Some(history) = &view.bid_history {
        let _ = writeln!(out, "Bid history:");
        if history.is_empty() {
            let _ = writeln!(out, "  no bids yet");
        }
        for event in history.iter().rev() {
            let _ = writeln!(out, "{}", bid_row(event));
        }
    }

    out.trim_end().to_string()
}

pub fn position_row(position: &UserBidPosition) -> String {
    let claim = if position.claimable { "  (claimable)" } else { "" };
    format!(
        "#{:<12} {:<32} mine {:>14}  top {:>14}  {:<7} {}{claim}",
        position.token_id,
        position.domain,
        position.my_bid.to_string(),
        position.current_bid.to_string(),
        position.status,
        position.time_left,
    )
}

pub fn summary_line(summary: &PositionSummary) -> String {
    format!(
        "{} auctions: {} winning, {} outbid, {} won, {} lost. Committed {}",
        summary.auctions,
        summary.winning,
        summary.outbid,
        summary.won,
        summary.lost,
        summary.total_committed
    )
}

pub fn pending_row(pending: &PendingSubmission, voted: bool) -> String {
    let vote = if voted { "  voted" } else { "" };
    format!(
        "#{:<12} {:<32} seller {}{vote}",
        pending.token_id,
        pending.display_name,
        short_address(pending.seller)
    )
}

pub fn lifecycle_row(lifecycle: &SubmissionLifecycle, name: &str) -> String {
    let outcome = match &lifecycle.ended {
        Some(ended) => match ended.winner {
            Some(winner) => format!("sold to {} for {}", short_address(winner), ended.amount),
            None => "ended without bids".to_string(),
        },
        None => format!(
            "running until {}",
            lifecycle.started.end_time.format("%Y-%m-%d %H:%M UTC")
        ),
    };
    format!("#{:<12} {:<32} {outcome}", lifecycle.submission.token_id, name)
}

pub fn collection_row(item: &CollectionItem) -> String {
    let status = match item.status {
        CollectionStatus::Owned => "owned",
        CollectionStatus::Listed => "listed",
    };
    format!("#{:<12} {:<32} {status}", item.token_id, item.domain)
}
