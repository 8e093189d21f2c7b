use analysis::scoring::service;
use chrono::Utc;
use clap::{Parser, Subcommand};
use storage::Database;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use uuid::Uuid;

#[derive(Parser)]
#[command(name = "essay-rescore")]
#[command(about = "Recompute essay final scores from competition-wide extremes", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    #[arg(long, env = "DATABASE_URL")]
    database_url: String,

    #[arg(short, long)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Recompute the scores of a single competition
    Competition { competition_id: Uuid },
    /// Recompute the scores of every competition that has ended
    AllEnded,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let log_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                format!("essay_rescore={},analysis={},storage={}", log_level, log_level, log_level)
                    .into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let db = Database::new(&cli.database_url).await?;

    match cli.command {
        Commands::Competition { competition_id } => {
            let summary = service::recompute_competition_scores(db.pool(), competition_id).await?;
            match summary.extremes {
                Some(extremes) => tracing::info!(
                    "✓ Rescored {} essays (fastest {}s, max {} words)",
                    summary.recomputed_count,
                    extremes.fastest_time_seconds(),
                    extremes.max_words
                ),
                None => tracing::warn!("Competition {} has no completed essays", competition_id),
            }
        }
        Commands::AllEnded => {
            let count = service::recompute_ended_competitions(db.pool(), Utc::now()).await?;
            tracing::info!("✓ Rescored {} essays across ended competitions", count);
        }
    }

    Ok(())
}
