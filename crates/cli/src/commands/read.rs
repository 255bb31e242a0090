use alloy::primitives::Address;
use chrono::Utc;
use clap::ValueEnum;
use eyre::{Result, eyre};
use futures::future::join_all;
use gogobid_core::{
    AuctionView, ListingOrder, PositionSummary, TokenId, sort_views, time::TimeLeft,
};
use serde::Serialize;

use super::{Services, render};
use crate::votes::VoteBook;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum SortArg {
    #[default]
    EndingSoon,
    HighestBid,
    LowestBid,
    MostBidders,
    Newest,
}

impl From<SortArg> for ListingOrder {
    fn from(value: SortArg) -> Self {
        match value {
            SortArg::EndingSoon => ListingOrder::EndingSoon,
            SortArg::HighestBid => ListingOrder::HighestBid,
            SortArg::LowestBid => ListingOrder::LowestBid,
            SortArg::MostBidders => ListingOrder::MostBidders,
            SortArg::Newest => ListingOrder::Newest,
        }
    }
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Search, then sort. Filtering never reorders.
pub fn select_views(
    mut views: Vec<AuctionView>,
    order: ListingOrder,
    query: Option<&str>,
) -> Vec<AuctionView> {
    if let Some(query) = query {
        views.retain(|view| view.matches_query(query));
    }
    sort_views(&mut views, order);
    views
}

pub async fn auctions(
    services: &Services,
    order: ListingOrder,
    query: Option<&str>,
    json: bool,
) -> Result<()> {
    let views = select_views(services.views().live_auctions().await, order, query);

    if json {
        return print_json(&views);
    }
    println!("{}", render::view_table(&views, Utc::now()));
    Ok(())
}

pub async fn auction(services: &Services, token_id: TokenId, json: bool) -> Result<()> {
    let view = services
        .views()
        .detail(token_id)
        .await?
        .ok_or_else(|| eyre!("no auction exists for token #{token_id}"))?;

    if json {
        return print_json(&view);
    }
    let countdown = TimeLeft::between(view.end_time, Utc::now()).countdown();
    println!("{}", render::view_detail(&view, &countdown));
    Ok(())
}

#[derive(Serialize)]
struct BidsReport {
    summary: PositionSummary,
    positions: Vec<gogobid_core::UserBidPosition>,
}

pub async fn bids(services: &Services, user: Address, json: bool) -> Result<()> {
    let positions = services.positions().positions(user).await;
    let summary = PositionSummary::from_positions(&positions);

    if json {
        return print_json(&BidsReport { summary, positions });
    }
    if positions.is_empty() {
        println!("No bids from {}.", render::short_address(user));
        return Ok(());
    }
    for position in &positions {
        println!("{}", render::position_row(position));
    }
    println!("{}", render::summary_line(&summary));
    Ok(())
}

/// Pending submissions, or with `started` the ones that already went to auction.
pub async fn pending(
    services: &Services,
    seller: Option<Address>,
    account: Option<Address>,
    started: bool,
    json: bool,
) -> Result<()> {
    let resolver = services.submissions();

    if started {
        let history = resolver.history(seller).await;
        if json {
            return print_json(&history);
        }
        if history.is_empty() {
            println!("No submissions have been auctioned yet.");
        }
        let names = join_all(
            history
                .iter()
                .map(|item| resolver.display_name(item.submission.token_id)),
        )
        .await;
        for (item, name) in history.iter().zip(names) {
            let name = name.unwrap_or_else(|| item.submission.token_id.placeholder_name());
            println!("{}", render::lifecycle_row(item, &name));
        }
        return Ok(());
    }

    let pending = resolver.pending(seller).await;
    if json {
        return print_json(&pending);
    }
    if pending.is_empty() {
        println!("No pending submissions.");
        return Ok(());
    }

    let book = VoteBook::load(&VoteBook::default_path()?)?;
    for item in &pending {
        let voted = book.has_voted(account, item.token_id);
        println!("{}", render::pending_row(item, voted));
    }
    Ok(())
}

pub async fn collection(services: &Services, owner: Address, json: bool) -> Result<()> {
    let items = services.collection().collection(owner).await;

    if json {
        return print_json(&items);
    }
    if items.is_empty() {
        println!("Nothing owned or listed by {}.", render::short_address(owner));
    }
    for item in &items {
        println!("{}", render::collection_row(item));
    }
    Ok(())
}

pub async fn returns(services: &Services, user: Address) -> Result<()> {
    let pending = services.positions().pending_returns(user).await?;
    println!("Pending returns for {}: {pending}", render::short_address(user));
    Ok(())
}
