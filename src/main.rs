use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use replay_coach::analytics;
use replay_coach::api::state::AppState;
use replay_coach::client::ReplayClient;
use replay_coach::coach::{self, backend::CoachBackend, backend::GroqBackend, CoachError};
use replay_coach::config::AppConfig;
use replay_coach::ingest::{self, IngestOptions};
use replay_coach::store::MatchStore;

#[derive(Parser)]
#[command(name = "replay-coach")]
#[command(about = "Rocket League match-history tracker with AI-powered coaching")]
#[command(version)]
struct Cli {
    /// Path to configuration file
    #[arg(long, default_value = "./config.toml")]
    config: PathBuf,

    /// Override the database path
    #[arg(long)]
    db_path: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info")]
    log_level: String,

    /// Output logs as JSON
    #[arg(long)]
    json_logs: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch a player's recent replays into the store
    Fetch {
        /// Player name as it appears in replays
        player: String,

        /// How many recent games to request
        #[arg(long, default_value = "30")]
        games: usize,

        /// Refetch even when the player is already stored
        #[arg(long)]
        force: bool,
    },

    /// Print a player's aggregated stats as JSON
    Stats {
        player: String,

        /// Recent-form window size
        #[arg(long, default_value = "10")]
        games: usize,
    },

    /// Print coaching advice for a player
    Coach {
        player: String,

        /// Skip the model call and print rule-based tips only
        #[arg(long)]
        quick: bool,
    },

    /// Start the API server
    Serve {
        /// Bind address (default from config)
        #[arg(long)]
        host: Option<String>,

        /// Port number (default from config)
        #[arg(long)]
        port: Option<u16>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&cli.log_level));

    if cli.json_logs {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer())
            .init();
    }

    tracing::info!("Starting replay-coach v{}", env!("CARGO_PKG_VERSION"));

    let mut config = AppConfig::load_or_default(&cli.config)
        .with_context(|| format!("Failed to load config from {}", cli.config.display()))?;
    if let Some(db_path) = cli.db_path {
        config.db_path = db_path;
    }

    if let Some(parent) = config.db_path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create data dir {}", parent.display()))?;
        }
    }
    let store = MatchStore::open(&config.db_path)?;

    match cli.command {
        Commands::Fetch {
            player,
            games,
            force,
        } => {
            let client = build_client(&config)?;
            let options = IngestOptions {
                num_games: games,
                force,
            };

            match ingest::refresh_player(&client, &store, &player, options).await {
                Ok(outcome) => {
                    println!("\n=== Fetch Results ===");
                    println!("Player:       {}", player);
                    println!(
                        "Source:       {}",
                        if outcome.fetched { "replay API" } else { "stored data" }
                    );
                    println!("Games added:  {}", outcome.games_added);
                    println!("Total stored: {}", outcome.total_games);
                    if !outcome.fetched {
                        println!("\n(use --force to refetch)");
                    }
                }
                Err(ingest::IngestError::NoData(name)) => {
                    println!("No replays found for '{}'.", name);
                    println!("Check the spelling, or try the name shown in-game.");
                }
                Err(e) => return Err(e.into()),
            }
        }

        Commands::Stats { player, games } => {
            let records = store.get_player_stats(&player)?;
            if records.is_empty() {
                println!("No stored games for '{}'. Run `fetch` first.", player);
                return Ok(());
            }

            let report = serde_json::json!({
                "player": player,
                "summary": analytics::summary_stats(&records),
                "recent_form": analytics::recent_form(&records, games),
                "playlists": analytics::stats_by_playlist(&records),
                "strengths": analytics::strengths_and_weaknesses(&records),
            });
            println!("{}", serde_json::to_string_pretty(&report)?);
        }

        Commands::Coach { player, quick } => {
            let records = store.get_player_stats(&player)?;
            if records.is_empty() {
                println!("No stored games for '{}'. Run `fetch` first.", player);
                return Ok(());
            }

            let summary = match analytics::summary_stats(&records) {
                Some(s) => s,
                None => {
                    println!("No stored games for '{}'.", player);
                    return Ok(());
                }
            };

            println!("=== Quick Tips ===");
            for tip in coach::quick_tips(&summary) {
                println!("- {}", tip);
            }

            if quick {
                return Ok(());
            }

            let backend = match GroqBackend::from_config(&config.ai) {
                Ok(b) => b,
                Err(CoachError::Unavailable(msg)) => {
                    println!("\nAI coaching unavailable: {}", msg);
                    return Ok(());
                }
                Err(e) => return Err(e.into()),
            };

            let recent = analytics::recent_form(&records, 10);
            let strengths = analytics::strengths_and_weaknesses(&records);
            let playlists = analytics::stats_by_playlist(&records);
            let (Some(recent), Some(strengths)) = (recent, strengths) else {
                println!("\nNot enough data for AI coaching.");
                return Ok(());
            };

            let advice = coach::generate_coaching_tips(
                &backend,
                &summary,
                &recent,
                &strengths,
                &playlists,
            )
            .await?;

            println!("\n=== Coaching Advice ===");
            println!("{}", advice);
        }

        Commands::Serve { host, port } => {
            let client = match build_client(&config) {
                Ok(c) => Some(Arc::new(c)),
                Err(e) => {
                    tracing::warn!("Replay fetching disabled: {}", e);
                    None
                }
            };

            let coach_backend: Option<Arc<dyn CoachBackend>> =
                match GroqBackend::from_config(&config.ai) {
                    Ok(b) => Some(Arc::new(b)),
                    Err(e) => {
                        tracing::warn!("AI coaching disabled: {}", e);
                        None
                    }
                };

            let state = AppState {
                store,
                client,
                coach: coach_backend,
            };
            let app = replay_coach::api::build_router(state);

            let host = host.unwrap_or_else(|| config.server.host.clone());
            let port = port.unwrap_or(config.server.port);
            let addr = format!("{}:{}", host, port);
            let listener = tokio::net::TcpListener::bind(&addr).await?;
            tracing::info!("Dashboard API: http://{}", addr);
            axum::serve(listener, app).await?;
        }
    }

    Ok(())
}

/// Build the replay client, resolving the API key from the configured
/// environment variable.
fn build_client(config: &AppConfig) -> Result<ReplayClient> {
    let api_key = std::env::var(&config.ballchasing.api_key_env).with_context(|| {
        format!(
            "{} env var not set (get a key at https://ballchasing.com/upload)",
            config.ballchasing.api_key_env
        )
    })?;

    Ok(ReplayClient::new(&config.ballchasing, &api_key)?)
}
