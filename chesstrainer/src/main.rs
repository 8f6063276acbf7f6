//! chesstrainer - solve chess puzzles in the terminal.
//!
//! Puzzles come from the puzzle API (random, daily or by id) or from a local
//! JSON file. Attempts of a signed-in account (`CHESSTRAINER_ACCESS_TOKEN`)
//! are sent to the API; without a token a local guest is created and its
//! attempts and statistics stay in the data directory.

mod output;
mod play;

use std::path::PathBuf;

use anyhow::Context;
use clap::{ArgGroup, Args, Parser, Subcommand};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};
use trainer::api::{ApiClient, PuzzleFilter};
use trainer::{
    AttemptRouter, GuestIdentityStore, Identity, LocalAttemptStore, Puzzle, SessionManager,
    TrainerConfig,
};

#[derive(Parser)]
#[command(name = "chesstrainer", version, about = "Solve chess puzzles in the terminal")]
struct Cli {
    /// Directory for the local guest and its attempts.
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Base URL of the puzzle API.
    #[arg(long, global = true)]
    api_url: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Solve a puzzle (a random one unless told otherwise).
    Solve(SolveArgs),
    /// Show solving statistics.
    Stats,
    /// List past attempts, newest first.
    History {
        #[arg(long, default_value_t = 1)]
        page: usize,
        #[arg(long, default_value_t = 20)]
        limit: usize,
    },
    /// Show the active identity, creating a local guest if needed.
    Guest,
    /// Delete the local guest and all of its attempts.
    ClearGuest,
}

#[derive(Args)]
#[command(group(ArgGroup::new("source").args(["id", "daily", "random", "file"])))]
struct SolveArgs {
    /// Puzzle id.
    #[arg(long)]
    id: Option<String>,
    /// Puzzle of the day.
    #[arg(long)]
    daily: bool,
    /// Random puzzle (the default).
    #[arg(long)]
    random: bool,
    /// Puzzle JSON file in the API's format.
    #[arg(long)]
    file: Option<PathBuf>,
    /// Theme filter for random puzzles; repeatable.
    #[arg(long = "theme")]
    themes: Vec<String>,
    #[arg(long)]
    min_rating: Option<i32>,
    #[arg(long)]
    max_rating: Option<i32>,
}

impl SolveArgs {
    fn filter(&self) -> PuzzleFilter {
        PuzzleFilter {
            min_rating: self.min_rating,
            max_rating: self.max_rating,
            themes: self.themes.clone(),
        }
    }
}

fn init_tracing() -> Option<tracing_appender::non_blocking::WorkerGuard> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let stderr_layer = fmt::layer().with_writer(std::io::stderr).with_target(false);

    match std::env::var("CHESSTRAINER_LOG_DIR") {
        Ok(log_dir) => {
            std::fs::create_dir_all(&log_dir).ok();
            let file_appender = tracing_appender::rolling::daily(log_dir, "chesstrainer");
            let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);
            tracing_subscriber::registry()
                .with(filter)
                .with(stderr_layer)
                .with(
                    fmt::layer()
                        .with_writer(non_blocking)
                        .with_ansi(false)
                        .with_line_number(true),
                )
                .init();
            Some(guard)
        }
        Err(_) => {
            tracing_subscriber::registry()
                .with(filter)
                .with(stderr_layer)
                .init();
            None
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _guard = init_tracing();
    let cli = Cli::parse();

    let mut config = TrainerConfig::from_env().context("invalid configuration")?;
    if let Some(dir) = cli.data_dir {
        config.data_dir = dir;
    }
    if let Some(url) = cli.api_url {
        config.api_url = url.trim_end_matches('/').to_string();
    }
    tracing::debug!("Using data directory: {}", config.data_dir.display());

    let api = ApiClient::new(&config)?;

    match cli.command {
        Commands::Solve(args) => {
            let puzzle = load_puzzle(&api, &args).await?;
            let identity = resolve_identity(&api, &config).await?;
            let router = AttemptRouter::for_identity(&identity, &config)?;
            let manager = SessionManager::new(config.timing);
            play::run(&manager, &puzzle, &router).await?;
        }
        Commands::Stats => {
            let identity = resolve_identity(&api, &config).await?;
            let router = AttemptRouter::for_identity(&identity, &config)?;
            let stats = router.statistics().await.context("cannot load statistics")?;
            println!("{}", output::identity(&identity));
            println!("{}", output::statistics(&stats));
        }
        Commands::History { page, limit } => {
            let identity = resolve_identity(&api, &config).await?;
            let router = AttemptRouter::for_identity(&identity, &config)?;
            let history = router
                .history(page, limit)
                .await
                .context("cannot load history")?;
            println!("{}", output::history(&history));
        }
        Commands::Guest => {
            let identity = resolve_identity(&api, &config).await?;
            println!("{}", output::identity(&identity));
        }
        Commands::ClearGuest => clear_guest(&config)?,
    }

    Ok(())
}

async fn load_puzzle(api: &ApiClient, args: &SolveArgs) -> anyhow::Result<Puzzle> {
    let puzzle: Puzzle = if let Some(path) = &args.file {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("cannot read {}", path.display()))?;
        serde_json::from_str(&contents)
            .with_context(|| format!("{} is not a puzzle", path.display()))?
    } else if let Some(id) = &args.id {
        api.puzzle(id)
            .await
            .with_context(|| format!("cannot fetch puzzle {}", id))?
    } else if args.daily {
        api.daily_puzzle()
            .await
            .context("cannot fetch the daily puzzle")?
    } else {
        api.random_puzzle(&args.filter())
            .await
            .context("cannot fetch a random puzzle")?
    };
    tracing::info!(puzzle = %puzzle.label(), rating = puzzle.rating, "Loaded puzzle");
    Ok(puzzle)
}

/// The signed-in account when a token is configured, else the local guest.
async fn resolve_identity(api: &ApiClient, config: &TrainerConfig) -> anyhow::Result<Identity> {
    if config.access_token.is_some() {
        return api
            .current_user()
            .await
            .context("cannot fetch the signed-in user");
    }
    Ok(GuestIdentityStore::new(&config.data_dir).load_or_create()?)
}

fn clear_guest(config: &TrainerConfig) -> anyhow::Result<()> {
    let identities = GuestIdentityStore::new(&config.data_dir);
    match identities.load()? {
        Some(guest) => {
            let removed = LocalAttemptStore::new(&config.data_dir, &guest.id).clear()?;
            identities.clear()?;
            println!("Removed {} and {} attempts.", guest.display_name, removed);
        }
        None => println!("No local guest on this device."),
    }
    Ok(())
}
