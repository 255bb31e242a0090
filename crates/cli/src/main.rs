use std::path::PathBuf;

use alloy::primitives::Address;
use clap::{Args, Parser, Subcommand};
use eyre::eyre;
use gogobid_core::{TokenId, TxIntent};
use tracing::Level;

use gogobid_cli::{
    amount::parse_ether,
    commands::{
        Services,
        read::{self, SortArg},
        vote, watch, write,
    },
    config::{DEFAULT_CONFIG_PATH, Overrides, PRIVATE_KEY_ENV, load_config},
    provider::signer_address,
};

#[derive(Debug, Parser)]
#[command(name = "gogobid", about = "Domain auctions on the GogoBid pool", version)]
struct Cli {
    /// Path to the configuration file
    #[arg(short, long, default_value = DEFAULT_CONFIG_PATH, value_name = "FILE")]
    config: PathBuf,

    /// RPC URL, overrides `chain.rpc_url`
    #[arg(long, env = "GOGOBID_RPC_URL", value_name = "URL")]
    rpc_url: Option<String>,

    /// Subgraph endpoint, overrides `subgraph.url`
    #[arg(long, env = "GOGOBID_SUBGRAPH_URL", value_name = "URL")]
    subgraph_url: Option<String>,

    /// Subgraph API key
    #[arg(long, env = "GOGOBID_API_KEY", value_name = "KEY", hide_env_values = true)]
    api_key: Option<String>,

    /// Hex private key; required for writes, also identifies "me" for reads
    #[arg(long, env = PRIVATE_KEY_ENV, value_name = "KEY", hide_env_values = true)]
    private_key: Option<String>,

    /// Log level written to stderr
    #[arg(long, env = "GOGOBID_LOG", default_value = "info", value_name = "LEVEL")]
    log_level: Level,

    /// Print JSON instead of text where supported
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// List live auctions
    Auctions(ListArgs),
    /// Show one auction with its bid history
    Auction(TokenArg),
    /// Show an account's bid positions
    Bids(AccountArg),
    /// List submissions waiting for an auction
    Pending(PendingArgs),
    /// Names an account owns or has listed
    Collection(AccountArg),
    /// Show withdrawable outbid funds
    Returns(AccountArg),
    /// Keep refreshing the listing, or count down one auction
    Watch(WatchArgs),
    /// Place a bid, in ETH
    Bid(BidArgs),
    /// End an expired auction
    End(TokenArg),
    /// Withdraw pending returns
    Withdraw,
    /// Hand a domain token to the pool for review
    Submit(TokenArg),
    /// Start the auction for a submitted domain (pool owner only)
    Start(TokenArg),
    /// Vote for a pending submission (stored locally)
    Vote(TokenArg),
}

#[derive(Debug, Args)]
struct ListArgs {
    #[arg(long, value_enum, default_value_t)]
    sort: SortArg,
    /// Case-insensitive substring of the domain name
    #[arg(long, short)]
    search: Option<String>,
}

#[derive(Debug, Args)]
struct TokenArg {
    /// Token id, decimal or 0x-prefixed hex
    token_id: TokenId,
}

#[derive(Debug, Args)]
struct AccountArg {
    /// Defaults to the account behind --private-key
    #[arg(long)]
    account: Option<Address>,
}

#[derive(Debug, Args)]
struct PendingArgs {
    /// Only this seller's submissions
    #[arg(long)]
    seller: Option<Address>,
    /// Show submissions that already went to auction
    #[arg(long)]
    started: bool,
}

#[derive(Debug, Args)]
struct WatchArgs {
    /// Count down this auction instead of refreshing the listing
    token_id: Option<TokenId>,
    #[command(flatten)]
    list: ListArgs,
}

#[derive(Debug, Args)]
struct BidArgs {
    token_id: TokenId,
    /// Amount in ETH, e.g. 0.25
    amount: String,
}

#[tokio::main]
async fn main() -> eyre::Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_max_level(cli.log_level)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    if let Commands::Vote(args) = &cli.command {
        let me = cli.private_key.as_deref().map(signer_address).transpose()?;
        return vote::vote(me, args.token_id);
    }

    let config = load_config(&cli.config)?.with_overrides(Overrides {
        rpc_url: cli.rpc_url.clone(),
        subgraph_url: cli.subgraph_url.clone(),
        api_key: cli.api_key.clone(),
    });
    let services = Services::connect(config).await?;
    let me = cli.private_key.as_deref().map(signer_address).transpose()?;
    let account = |explicit: Option<Address>| {
        explicit
            .or(me)
            .ok_or_else(|| eyre!("pass --account or set PRIVATE_KEY"))
    };
    let key = || {
        cli.private_key
            .as_deref()
            .ok_or_else(|| eyre!("--private-key or PRIVATE_KEY is required for writes"))
    };

    match &cli.command {
        Commands::Auctions(args) => {
            read::auctions(&services, args.sort.into(), args.search.as_deref(), cli.json).await
        }
        Commands::Auction(args) => read::auction(&services, args.token_id, cli.json).await,
        Commands::Bids(args) => read::bids(&services, account(args.account)?, cli.json).await,
        Commands::Pending(args) => {
            read::pending(&services, args.seller, me, args.started, cli.json).await
        }
        Commands::Collection(args) => {
            read::collection(&services, account(args.account)?, cli.json).await
        }
        Commands::Returns(args) => read::returns(&services, account(args.account)?).await,
        Commands::Watch(args) => {
            let stop = watch::stop_on_ctrl_c();
            match args.token_id {
                Some(token_id) => watch::watch_detail(&services, token_id, stop).await,
                None => {
                    watch::watch_list(
                        &services,
                        args.list.sort.into(),
                        args.list.search.as_deref(),
                        stop,
                    )
                    .await
                }
            }
        }
        Commands::Bid(args) => {
            let amount = parse_ether(&args.amount)?;
            let intent = TxIntent::PlaceBid {
                token_id: args.token_id,
                amount,
            };
            write::execute(&services, key()?, intent).await
        }
        Commands::End(args) => {
            let intent = TxIntent::EndAuction {
                token_id: args.token_id,
            };
            write::execute(&services, key()?, intent).await
        }
        Commands::Withdraw => write::execute(&services, key()?, TxIntent::Withdraw).await,
        Commands::Submit(args) => {
            let intent = TxIntent::SubmitDomain {
                token_id: args.token_id,
            };
            write::execute(&services, key()?, intent).await
        }
        Commands::Start(args) => {
            let intent = TxIntent::StartAuction {
                token_id: args.token_id,
            };
            write::execute(&services, key()?, intent).await
        }
        // Handled before connecting.
        Commands::Vote(_) => Ok(()),
    }
}
