use std::{
    io::{self, Write},
    pin::pin,
};

use chrono::Utc;
use eyre::{Result, eyre};
use futures::StreamExt;
use gogobid_core::{
    AuctionView, ListingOrder, Refresher, TokenId,
    time::{TimeLeft, countdown},
};
use tokio::sync::watch;
use tracing::{info, warn};

use super::{Services, read::select_views, render};

/// Flips to `true` on Ctrl-C. The sender stays alive if the handler cannot be installed.
pub fn stop_on_ctrl_c() -> watch::Receiver<bool> {
    let (tx, rx) = watch::channel(false);
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                let _ = tx.send(true);
            }
            Err(error) => {
                warn!(%error, "could not listen for ctrl-c");
                std::future::pending::<()>().await;
            }
        }
    });
    rx
}

/// Re-reads the live listing every list interval until stopped.
pub async fn watch_list(
    services: &Services,
    order: ListingOrder,
    query: Option<&str>,
    stop: watch::Receiver<bool>,
) -> Result<()> {
    let refresher = Refresher::new(services.config.refresh.list_interval());
    let views = services.views();

    info!(
        every_secs = services.config.refresh.list_interval_secs,
        "watching live auctions"
    );
    refresher
        .run(
            || views.live_auctions(),
            |fetched| {
                let now = Utc::now();
                let selected = select_views(fetched, order, query);
                println!("== {} ==", now.format("%H:%M:%S"));
                println!("{}", render::view_table(&selected, now));
            },
            stop,
        )
        .await;
    Ok(())
}

/// Ticks the countdown for one auction and re-reads it once the clock runs out.
pub async fn watch_detail(
    services: &Services,
    token_id: TokenId,
    mut stop: watch::Receiver<bool>,
) -> Result<()> {
    let builder = services.views();
    let view = builder
        .detail(token_id)
        .await?
        .ok_or_else(|| eyre!("no auction exists for token #{token_id}"))?;

    let mut ticks = pin!(countdown(
        view.end_time,
        services.config.refresh.detail_interval()
    ));
    let mut expired = false;
    let mut stdout = io::stdout();

    loop {
        tokio::select! {
            next = ticks.next() => match next {
                Some(left) => {
                    write_tick(&mut stdout, &view.domain, &left)?;
                    if left.is_expired() {
                        expired = true;
                        break;
                    }
                }
                None => break,
            },
            _ = stop.wait_for(|stopped| *stopped) => break,
        }
    }
    println!();

    if expired {
        if let Some(view) = builder.detail(token_id).await? {
            println!("{}", render::view_detail(&view, &left_label(&view)));
        }
    }
    Ok(())
}

/// Redraws the countdown line in place.
fn write_tick(out: &mut impl Write, domain: &str, left: &TimeLeft) -> io::Result<()> {
    write!(out, "\r{domain}  {}   ", left.countdown())?;
    out.flush()
}

fn left_label(view: &AuctionView) -> String {
    TimeLeft::between(view.end_time, Utc::now()).countdown()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    struct BrokenPipe;

    impl Write for BrokenPipe {
        fn write(&mut self, _: &[u8]) -> io::Result<usize> {
            Err(io::Error::from(io::ErrorKind::BrokenPipe))
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn tick_redraws_the_same_line() {
        let now = Utc::now();
        let left = TimeLeft::between(now + Duration::seconds(61), now);
        let mut out = Vec::new();

        write_tick(&mut out, "alpha.doma", &left).unwrap();

        let line = String::from_utf8(out).unwrap();
        assert!(line.starts_with("\ralpha.doma  "));
        assert!(line.contains(&left.countdown()));
    }

    #[test]
    fn tick_surfaces_write_errors() {
        let now = Utc::now();
        let left = TimeLeft::between(now, now);

        let error = write_tick(&mut BrokenPipe, "alpha.doma", &left).unwrap_err();
        assert_eq!(error.kind(), io::ErrorKind::BrokenPipe);
    }
}
