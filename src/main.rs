use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use trivia_dedup::{
    create_pool, create_sample_env_file, run_detection, Config, GroupingConfig, PgQuestionStore,
    ResolutionDriver, ResolutionPolicy, StdinPrompt,
};

#[derive(Parser)]
#[command(name = "trivia-dedup")]
#[command(about = "Trivia Question Deduplication - Semantic duplicate detection and cleanup for question banks")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Scan the corpus and report duplicate groups without changing anything
    Scan {
        /// Write the full report as JSON to this path
        #[arg(long)]
        json: Option<PathBuf>,
        /// Scan at most this many questions
        #[arg(long)]
        limit: Option<u64>,
    },
    /// Detect duplicates and remove them under an operator-chosen policy
    Clean {
        /// Resolution policy; prompts interactively when omitted
        #[arg(long, value_enum)]
        policy: Option<PolicyArg>,
        /// Skip the final confirmation prompt
        #[arg(long)]
        yes: bool,
        /// Walk the full flow without deleting anything
        #[arg(long)]
        dry_run: bool,
        /// Scan at most this many questions
        #[arg(long)]
        limit: Option<u64>,
    },
    /// Generate sample configuration file
    InitConfig,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum PolicyArg {
    /// Remove every duplicate, keeping one canonical question per group
    RemoveAll,
    /// Remove only groups whose members share the exact same answer
    Safe,
    /// Review each group interactively
    Review,
}

impl From<PolicyArg> for ResolutionPolicy {
    fn from(arg: PolicyArg) -> Self {
        match arg {
            PolicyArg::RemoveAll => ResolutionPolicy::RemoveAll,
            PolicyArg::Safe => ResolutionPolicy::RemoveSafeSubset,
            PolicyArg::Review => ResolutionPolicy::ReviewPerGroup,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();

    let cli = Cli::parse();

    // RUST_LOG wins, then LOG_LEVEL, then info
    let default_level = std::env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string());
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&default_level)),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    match cli.command {
        Some(Commands::Scan { json, limit }) => run_scan(json, limit).await,
        Some(Commands::Clean {
            policy,
            yes,
            dry_run,
            limit,
        }) => run_clean(policy, yes, dry_run, limit).await,
        Some(Commands::InitConfig) => create_sample_env_file(),
        None => {
            // Default to a read-only scan
            run_scan(None, None).await
        }
    }
}

async fn run_scan(json: Option<PathBuf>, limit: Option<u64>) -> Result<()> {
    let config = Config::from_env()?;
    config.validate()?;
    info!(database = %config.safe_database_url(), "Starting duplicate scan");

    let pool = create_pool(&config.database_url, config.operational.max_db_connections).await?;
    let store = PgQuestionStore::new(pool);

    let mut fetch = config.fetch_config();
    fetch.max_records = limit;

    let report = run_detection(&store, fetch, GroupingConfig::default()).await?;
    println!("{}", report.render_text());

    if let Some(path) = json {
        report.write_json(&path)?;
        println!("Report written to {}", path.display());
    }

    Ok(())
}

async fn run_clean(
    policy: Option<PolicyArg>,
    yes: bool,
    dry_run: bool,
    limit: Option<u64>,
) -> Result<()> {
    let config = Config::from_env()?;
    config.validate()?;
    info!(database = %config.safe_database_url(), "Starting duplicate cleanup");

    let pool = create_pool(&config.database_url, config.operational.max_db_connections).await?;
    let store = PgQuestionStore::new(pool);

    let mut fetch = config.fetch_config();
    fetch.max_records = limit;

    let report = run_detection(&store, fetch, GroupingConfig::default()).await?;
    println!("{}", report.render_text());

    let mut prompt = StdinPrompt::new();
    let mut driver = ResolutionDriver::new(&store, &mut prompt, config.deletion_config())
        .dry_run(dry_run)
        .assume_yes(yes);
    let outcome = driver.resolve(&report.groups, policy.map(Into::into)).await?;

    if outcome.failed_batches > 0 {
        warn!(
            failed_batches = outcome.failed_batches,
            "Some delete batches failed; re-run clean to retry the remainder"
        );
    }

    Ok(())
}
