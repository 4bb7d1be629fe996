//! Provisioning entrypoint for budget-booth.
//!
//! Initializes logging, prepares the database schema, seeds budgets from
//! config.toml on first run, and reports what is available for voting.

use budget_booth::{
    config,
    core::{
        allocation::{VoteSettings, VotingRule},
        budget,
    },
    errors::Result,
};
use dotenvy::dotenv;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    // 1. Initialize tracing (as early as possible)
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // 2. Load .env file (as early as possible)
    dotenv().ok();
    info!("Attempted to load .env file.");

    // 3. Initialize database (the default SQLite path lives under data/)
    std::fs::create_dir_all("data")?;
    let db = config::database::create_connection()
        .await
        .inspect(|_| info!("Database connection established."))
        .inspect_err(|e| error!("Failed to connect to database: {e}"))?;
    config::database::create_tables(&db)
        .await
        .inspect_err(|e| error!("Failed to create database schema: {e}"))?;

    // 4. Seed budgets from config.toml when present
    if std::path::Path::new("config.toml").exists() {
        let seed = config::budgets::load_default_config()?;
        let created = budget::seed_budgets(&db, &seed)
            .await
            .inspect_err(|e| error!("Failed to seed budgets: {e}"))?;
        info!("Seeded {created} budgets from config.toml.");
    } else {
        info!("No config.toml found, skipping budget seeding.");
    }

    // 5. Report what is open for voting
    let budgets = budget::get_all_budgets(&db).await?;
    info!("{} budgets available.", budgets.len());
    for open_budget in &budgets {
        let settings = VoteSettings::from_budget(open_budget);
        match settings.rule {
            VotingRule::Amount { threshold_percent } => info!(
                "  '{}' (organization {}): amount voting over {:.2}, threshold {}%",
                open_budget.title,
                open_budget.organization_id,
                open_budget.total_amount,
                threshold_percent
            ),
            VotingRule::SelectionCount { minimum, maximum } => info!(
                "  '{}' (organization {}): select between {} and {} projects",
                open_budget.title, open_budget.organization_id, minimum, maximum
            ),
        }
    }

    Ok(())
}
