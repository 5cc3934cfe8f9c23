//! Seed command handler.

use std::path::Path;

use paddock_core::AppConfig;

/// Load the calendar file, run migrations and upsert everything it lists.
///
/// Reseeding is idempotent; session results already ingested and runtime
/// aggregates (driver statistics, team points) are preserved.
///
/// # Errors
///
/// Returns an error if the calendar fails to load or validate, or if any
/// database operation fails.
pub(crate) async fn run_seed(
    pool: &sqlx::PgPool,
    config: &AppConfig,
    calendar_override: Option<&Path>,
) -> anyhow::Result<()> {
    let path = calendar_override.unwrap_or(&config.calendar_path);
    let calendar = paddock_core::load_calendar(path)?;

    paddock_db::run_migrations(pool).await?;

    let summary = paddock_db::seed_calendar(pool, &calendar).await?;
    println!(
        "seeded season {}: {} teams, {} drivers, {} events",
        calendar.season, summary.teams, summary.drivers, summary.events
    );
    Ok(())
}
