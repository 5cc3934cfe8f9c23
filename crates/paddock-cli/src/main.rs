mod plan;
mod seed;
mod trigger;
#[cfg(test)]
mod tests;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use paddock_core::TriggerKind;

#[derive(Debug, Parser)]
#[command(name = "paddock")]
#[command(about = "Paddock racing backend command line interface")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Upsert teams, drivers and the season calendar into the database.
    Seed {
        /// Calendar file to load instead of the configured one.
        #[arg(long)]
        calendar: Option<PathBuf>,
    },
    /// Show which result jobs a scheduler rescan would register right now.
    Plan,
    /// Fire one result trigger against the running server.
    Trigger {
        /// Trigger category: practices, qualifying or race.
        category: TriggerKind,
        #[arg(long)]
        year: i32,
        #[arg(long)]
        round: i32,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    let config = paddock_core::load_app_config()?;

    match cli.command {
        Commands::Seed { calendar } => {
            let pool = connect(&config).await?;
            seed::run_seed(&pool, &config, calendar.as_deref()).await
        }
        Commands::Plan => {
            let pool = connect(&config).await?;
            plan::run_plan(&pool).await
        }
        Commands::Trigger {
            category,
            year,
            round,
        } => trigger::run_trigger(&config, category, year, round).await,
    }
}

async fn connect(config: &paddock_core::AppConfig) -> anyhow::Result<sqlx::PgPool> {
    let pool_config = paddock_db::PoolConfig::from_app_config(config);
    let pool = paddock_db::connect_pool(&config.database_url, pool_config).await?;
    Ok(pool)
}
