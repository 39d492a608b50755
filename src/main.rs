use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use points_ledger::config::AppConfig;
use points_ledger::ingest;
use points_ledger::leaderboard::DEFAULT_TOP;
use points_ledger::tracker::Tracker;

#[derive(Parser)]
#[command(name = "points-ledger")]
#[command(about = "Season points ledger with match uploads and undo/redo")]
#[command(version)]
struct Cli {
    /// Path to configuration file
    #[arg(long, default_value = "./config.toml")]
    config: PathBuf,

    /// Data directory path (overrides the config file)
    #[arg(long)]
    data_dir: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long)]
    log_level: Option<String>,

    /// Output logs as JSON
    #[arg(long)]
    json_logs: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create the player ledger from a roster CSV, or add players to it
    Init {
        /// Roster CSV (Jersey No, Reg No, Player Name[, Total Points])
        #[arg(long)]
        players: PathBuf,
    },

    /// Score a match CSV and merge it into the ledger
    Upload {
        /// Match stats CSV
        file: PathBuf,
    },

    /// Zero every player's points
    Reset,

    /// Restore the ledger to its state before the last change
    Undo,

    /// Re-apply the last undone change
    Redo,

    /// Show the top players
    Leaderboard {
        #[arg(long, default_value_t = DEFAULT_TOP)]
        top: usize,
    },

    /// Show ledger, upload and history status
    Status,

    /// Start the REST API server
    Serve {
        /// Host to bind to
        #[arg(long)]
        host: Option<String>,

        /// Port to listen on
        #[arg(long)]
        port: Option<u16>,
    },
}

fn load_config(cli: &Cli) -> Result<AppConfig> {
    let mut config = if cli.config.exists() {
        AppConfig::from_file(&cli.config)
            .with_context(|| format!("Failed to load config {}", cli.config.display()))?
    } else {
        AppConfig::default()
    };

    if let Some(dir) = &cli.data_dir {
        config.data_dir = dir.clone();
    }
    if let Some(level) = &cli.log_level {
        config.log_level = level.clone();
    }
    Ok(config)
}

fn print_ledger(tracker: &Tracker) -> Result<()> {
    let ledger = tracker.ledger()?;
    println!("{:>6}  {:<12}  {:<24}  {:>8}", "Jersey", "Reg No", "Player", "Points");
    for player in &ledger {
        println!(
            "{:>6}  {:<12}  {:<24}  {:>8}",
            player.jersey_no, player.reg_no, player.player_name, player.total_points
        );
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = load_config(&cli)?;

    // Initialize tracing
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.log_level));

    tracing_subscriber::registry()
        .with(filter)
        .with(cli.json_logs.then(|| tracing_subscriber::fmt::layer().json()))
        .with((!cli.json_logs).then(tracing_subscriber::fmt::layer))
        .init();

    tracing::debug!("Starting points-ledger v{}", env!("CARGO_PKG_VERSION"));

    let mut tracker = Tracker::open(&config)?;

    match cli.command {
        Commands::Init { players } => {
            let roster = ingest::parse_roster_file(&players)
                .with_context(|| format!("Failed to load roster {}", players.display()))?;
            let added = tracker.register_players(roster)?;
            println!(
                "Registered {} players in {}",
                added,
                tracker.storage().ledger_file.display()
            );
        }
        Commands::Upload { file } => {
            let upload = ingest::parse_match_file(&file)
                .with_context(|| format!("Failed to load match file {}", file.display()))?;
            let report = tracker.apply_match(&upload)?;

            println!("\n=== Match {} ===", report.match_id);
            println!("Rows:             {}", report.rows);
            println!("Points awarded:   {}", report.points_awarded);
            println!("Players credited: {}", report.credited.len());
            if !report.registered.is_empty() {
                println!("Registered:       {}", report.registered.len());
            }
            if !report.skipped.is_empty() {
                println!("\nSkipped (not in ledger):");
                for key in &report.skipped {
                    println!("  - {}", key);
                }
            }
        }
        Commands::Reset => {
            tracker.reset()?;
            println!("All points reset to 0");
        }
        Commands::Undo => {
            tracker.undo()?;
            println!("Undone. Current ledger:\n");
            print_ledger(&tracker)?;
        }
        Commands::Redo => {
            tracker.redo()?;
            println!("Redone. Current ledger:\n");
            print_ledger(&tracker)?;
        }
        Commands::Leaderboard { top } => {
            let standings = tracker.leaderboard(top)?;
            if standings.is_empty() {
                println!("No players registered.");
            }
            for standing in standings {
                println!(
                    "{:>3}. {:<24} #{:<4} {:>6}",
                    standing.rank,
                    standing.player.player_name,
                    standing.player.jersey_no,
                    standing.player.total_points
                );
            }
        }
        Commands::Status => {
            let storage = tracker.storage();
            println!("=== Ledger Status ===");
            println!("Data dir:         {}", storage.data_dir.display());
            if tracker.is_initialized() {
                let ledger = tracker.ledger()?;
                println!("Players:          {}", ledger.len());
                println!("Total points:     {}", ledger.total_points());
            } else {
                println!("Ledger:           not initialized (run `init --players`)");
            }
            println!("Matches applied:  {}", tracker.uploads().len());
            if let Some(last) = tracker.uploads().last() {
                println!(
                    "Last match:       {} ({})",
                    last.match_id,
                    last.applied_at.format("%Y-%m-%d %H:%M UTC")
                );
            }
            let history = tracker.history();
            println!(
                "Undo / redo:      {} / {} (max {})",
                history.undo_depth(),
                history.redo_depth(),
                history.max_depth()
            );
        }
        Commands::Serve { host, port } => {
            let host = host.unwrap_or_else(|| config.server.host.clone());
            let port = port.unwrap_or(config.server.port);

            let state = points_ledger::api::state::AppState::new(tracker);
            let app = points_ledger::api::build_router(state);
            let addr = format!("{}:{}", host, port);
            let listener = tokio::net::TcpListener::bind(&addr).await?;
            tracing::info!("Listening on http://{}", addr);
            axum::serve(listener, app).await?;
        }
    }

    Ok(())
}
