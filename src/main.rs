use alloy::primitives::Address;
use clap::{
    ArgGroup,
    Parser,
    Subcommand,
};
use color_eyre::eyre::{
    Report,
    Result,
    WrapErr,
    eyre,
};
use deployments::{
    DeploymentEnv,
    DeploymentRecord,
    DeploymentStore,
    compute_abi_hash,
    record_deployment,
};
use etherball::{
    ContractInterface,
    chain::LotteryChain,
    config::{
        self,
        HistoryConfig,
    },
    game::{
        GameContext,
        GameContextSource,
        TicketNumbers,
        TicketPrice,
    },
    history::{
        HistoryEngine,
        decoder::Ticket,
        fetcher::LogFetcher,
    },
    purchase::{
        PurchaseAttempt,
        PurchaseOrchestrator,
        TicketSheet,
        TransactionState,
    },
    wallets::{
        find_wallet,
        resolve_wallet_dir,
        unlock_wallet,
    },
};
use generated_abi::LOTTERY_ABI_JSON;
use serde::Serialize;
use std::{
    fs,
    path::PathBuf,
};
use tracing::{
    info,
    warn,
};
use tracing_appender::{
    non_blocking::WorkerGuard,
    rolling,
};
use tracing_subscriber::{
    EnvFilter,
    fmt,
    prelude::*,
};
use url::Url;

#[derive(Parser, Debug)]
#[command(
    name = "etherball",
    about = "Buy Etherball lottery tickets and browse recent purchases",
    version,
    group(
        ArgGroup::new("network")
            .args(["dev", "test", "local"])
            .required(true)
    )
)]
struct Args {
    /// Use the development network
    #[arg(long)]
    dev: bool,

    /// Use the test network
    #[arg(long)]
    test: bool,

    /// Use a local node
    #[arg(long)]
    local: bool,

    /// Override RPC URL
    #[arg(long)]
    rpc_url: Option<Url>,

    /// Lottery contract address (defaults to the stored deployment)
    #[arg(long)]
    contract_address: Option<Address>,

    /// Contract ABI JSON to use instead of the bundled one
    #[arg(long)]
    abi: Option<PathBuf>,

    /// Also write logs to stderr
    #[arg(long)]
    tracing: bool,

    /// Print results as JSON
    #[arg(long)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Show the current game
    Game,

    /// Buy tickets for the current game and wait for confirmation
    Buy {
        /// Number of tickets to auto-generate
        #[arg(long, default_value_t = config::MIN_TICKETS_PER_PURCHASE)]
        count: u32,

        /// Hand-picked ticket as `a,b,c,etherball`; repeat for more tickets
        #[arg(long = "ticket")]
        tickets: Vec<TicketNumbers>,

        /// Keystore name in the wallet directory
        #[arg(long)]
        wallet: String,

        /// Override wallet directory (defaults to ~/.etherball/wallets)
        #[arg(long)]
        wallet_dir: Option<String>,
    },

    /// List tickets bought in the most recent blocks
    History {
        #[arg(long)]
        batch_size: Option<u64>,

        #[arg(long)]
        max_tickets: Option<usize>,

        /// Only this player's tickets for the current game
        #[arg(long)]
        owner: Option<Address>,
    },

    /// Store the contract address for the selected network
    Register {
        #[arg(long)]
        deployment_block: Option<u64>,
    },
}

struct Target {
    env: DeploymentEnv,
    rpc_url: Url,
    contract: Option<Address>,
    abi_json: String,
    interface: ContractInterface,
}

impl Target {
    fn contract(&self) -> Result<Address> {
        self.contract.ok_or_else(|| {
            eyre!(
                "No contract address for {}; pass --contract-address or run `register`",
                self.env
            )
        })
    }
}

fn report(err: anyhow::Error) -> Report {
    eyre!("{err:#}")
}

fn init_tracing(to_stderr: bool) -> Result<WorkerGuard> {
    let (writer, guard) = tracing_appender::non_blocking(rolling::daily("logs", "etherball.log"));
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let file_layer = fmt::layer().with_writer(writer).with_ansi(false);
    let stderr_layer = to_stderr.then(|| fmt::layer().with_writer(std::io::stderr));
    tracing_subscriber::registry()
        .with(filter)
        .with(file_layer)
        .with(stderr_layer)
        .try_init()
        .wrap_err("failed to install tracing subscriber")?;
    Ok(guard)
}

fn resolve_target(args: &Args) -> Result<Target> {
    let (env, default_url) = if args.dev {
        (DeploymentEnv::Dev, config::DEFAULT_DEVNET_RPC_URL)
    } else if args.test {
        (DeploymentEnv::Test, config::DEFAULT_TESTNET_RPC_URL)
    } else {
        (DeploymentEnv::Local, config::DEFAULT_LOCAL_RPC_URL)
    };

    let abi_json = match &args.abi {
        Some(path) => fs::read_to_string(path)
            .wrap_err_with(|| format!("failed to read ABI file {}", path.display()))?,
        None => LOTTERY_ABI_JSON.to_owned(),
    };
    let interface = ContractInterface::from_json(&abi_json).map_err(report)?;

    let record = DeploymentStore::new(env)
        .and_then(|store| store.load())
        .map_err(report)?;
    let abi_hash = compute_abi_hash(&abi_json);
    if record
        .as_ref()
        .is_some_and(|record| !record.is_compatible_with_abi(&abi_hash))
    {
        warn!("stored {env} deployment was registered with a different ABI");
    }

    let rpc_url = match (&args.rpc_url, &record) {
        (Some(url), _) => url.clone(),
        (None, Some(record)) => Url::parse(&record.network_url)
            .wrap_err_with(|| format!("stored RPC URL `{}` is invalid", record.network_url))?,
        (None, None) => Url::parse(default_url).wrap_err("invalid default RPC URL")?,
    };
    let contract = match (args.contract_address, &record) {
        (Some(address), _) => Some(address),
        (None, Some(record)) => Some(parse_stored_address(record)?),
        (None, None) => None,
    };

    Ok(Target {
        env,
        rpc_url,
        contract,
        abi_json,
        interface,
    })
}

fn parse_stored_address(record: &DeploymentRecord) -> Result<Address> {
    record
        .contract_address
        .parse()
        .wrap_err_with(|| format!("stored contract address `{}` is invalid", record.contract_address))
}

fn print_json(value: &impl Serialize) -> Result<()> {
    let json = serde_json::to_string_pretty(value).wrap_err("failed to serialize output")?;
    println!("{json}");
    Ok(())
}

fn print_game(game: &GameContext, json: bool) -> Result<()> {
    if json {
        return print_json(game);
    }
    println!("Game #{}", game.game_number);
    println!("Difficulty: {}", game.difficulty);
    let range = game.range();
    println!(
        "Numbers: {}-{} (etherball {}-{})",
        range.min, range.max, range.min, range.etherball_max
    );
    println!("Ticket price: {}", game.ticket_price);
    if let Some(seconds) = game.seconds_until_draw {
        println!("Draw in: {}m {}s", seconds / 60, seconds % 60);
    }
    Ok(())
}

fn print_tickets(tickets: &[&Ticket], json: bool) -> Result<()> {
    if json {
        return print_json(&tickets);
    }
    if tickets.is_empty() {
        println!("No tickets found");
    }
    for ticket in tickets {
        println!(
            "game {:>4}  {}  block {:>9}  {}",
            ticket.game_number, ticket.numbers, ticket.block_number, ticket.owner
        );
    }
    Ok(())
}

fn build_sheet(count: u32, tickets: &[TicketNumbers]) -> Result<TicketSheet> {
    let mut sheet = TicketSheet::new();
    if tickets.is_empty() {
        if !sheet.set_ticket_count(count) {
            return Err(eyre!(
                "Ticket count must be between {} and {}",
                config::MIN_TICKETS_PER_PURCHASE,
                config::MAX_TICKETS_PER_PURCHASE
            ));
        }
        return Ok(sheet);
    }
    let manual_count = u32::try_from(tickets.len()).unwrap_or(u32::MAX);
    if !sheet.set_ticket_count(manual_count) {
        return Err(eyre!(
            "At most {} tickets per purchase",
            config::MAX_TICKETS_PER_PURCHASE
        ));
    }
    sheet.set_auto_generate(false);
    for (index, numbers) in tickets.iter().enumerate() {
        sheet.set_ticket(index, *numbers);
    }
    Ok(sheet)
}

async fn show_game(target: &Target, json: bool) -> Result<()> {
    let chain = LotteryChain::connect(target.rpc_url.clone(), target.contract()?, None);
    let game = chain.game_context().await.map_err(report)?;
    print_game(&game, json)
}

async fn buy(
    target: &Target,
    count: u32,
    tickets: &[TicketNumbers],
    wallet: &str,
    wallet_dir: Option<&str>,
) -> Result<()> {
    let sheet = build_sheet(count, tickets)?;
    let dir = resolve_wallet_dir(wallet_dir).map_err(report)?;
    let descriptor = find_wallet(&dir, wallet).map_err(report)?;
    let signer = unlock_wallet(&descriptor).map_err(report)?;
    let payer = signer.address();

    let chain = LotteryChain::connect(target.rpc_url.clone(), target.contract()?, Some(signer));
    let game = match chain.game_context().await {
        Ok(game) => {
            let total = sheet.total_cost(&game.ticket_price)?;
            println!(
                "Buying {} tickets for game #{} ({})",
                sheet.ticket_count(),
                game.game_number,
                TicketPrice::from_wei(total)
            );
            Some(game)
        }
        Err(err) => {
            warn!("game context unavailable: {err:#}");
            None
        }
    };

    let status = chain.clone();
    let mut orchestrator = PurchaseOrchestrator::new(chain);
    let attempt = orchestrator
        .purchase_and_confirm(&status, game.as_ref(), Some(payer), &sheet.selection())
        .await?;

    match attempt {
        PurchaseAttempt::WalletRequired => return Err(eyre!("Connect a wallet first")),
        PurchaseAttempt::GameUnavailable => {
            return Err(eyre!("The current game could not be loaded"));
        }
        PurchaseAttempt::Busy => return Err(eyre!("A purchase is already in progress")),
        PurchaseAttempt::Rejected(_)
        | PurchaseAttempt::Submitted(_)
        | PurchaseAttempt::SubmissionFailed(_) => {}
    }

    match orchestrator.state() {
        TransactionState::Success(handle) => {
            match handle {
                Some(handle) => println!("Tickets purchased in transaction {handle}"),
                None => println!("Tickets purchased"),
            }
            Ok(())
        }
        TransactionState::Failed(failure) => Err(eyre!("{}", failure.user_message())),
        other => Err(eyre!("Purchase ended in unexpected state {other:?}")),
    }
}

async fn history(
    target: &Target,
    config: HistoryConfig,
    owner: Option<Address>,
    json: bool,
) -> Result<()> {
    let contract = target.contract()?;
    let chain = LotteryChain::connect(target.rpc_url.clone(), contract, None);
    let fetcher = LogFetcher::new(chain, contract, target.interface.clone());
    let mut engine = HistoryEngine::new(fetcher, config);
    engine.load_latest().await;
    if let Some(window) = engine.last_window() {
        info!(
            "scanned blocks {}..={}",
            window.from_block, window.to_block
        );
    }

    let tickets = match owner {
        Some(owner) => {
            let game = engine
                .fetcher()
                .source()
                .game_context()
                .await
                .map_err(report)?;
            engine.tickets_for(owner, game.game_number)
        }
        None => engine.tickets().iter().collect(),
    };
    print_tickets(&tickets, json)
}

fn register(target: &Target, deployment_block: Option<u64>) -> Result<()> {
    let contract = target.contract()?;
    let record = record_deployment(
        target.env,
        contract.to_string(),
        target.rpc_url.as_str(),
        deployment_block,
        Some(&target.abi_json),
    )
    .map_err(report)?;
    println!(
        "Registered {} deployment {} at {}",
        target.env, record.contract_address, record.network_url
    );
    Ok(())
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    color_eyre::install()?;
    let args = Args::parse();
    let _guard = init_tracing(args.tracing)?;
    info!("starting etherball client");
    deployments::ensure_structure().map_err(report)?;

    let target = resolve_target(&args)?;
    match args.command {
        Command::Game => show_game(&target, args.json).await,
        Command::Buy {
            count,
            tickets,
            wallet,
            wallet_dir,
        } => buy(&target, count, &tickets, &wallet, wallet_dir.as_deref()).await,
        Command::History {
            batch_size,
            max_tickets,
            owner,
        } => {
            let defaults = HistoryConfig::default();
            let config = HistoryConfig {
                batch_size: batch_size.unwrap_or(defaults.batch_size),
                max_tickets: max_tickets.unwrap_or(defaults.max_tickets),
            };
            history(&target, config, owner, args.json).await
        }
        Command::Register { deployment_block } => register(&target, deployment_block),
    }
}
