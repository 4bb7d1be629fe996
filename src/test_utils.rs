//! Shared test utilities for budget-booth.
//!
//! This module provides common helper functions for setting up test databases
//! and creating test entities with sensible defaults.

use crate::{
    core::{allocation::{VoteSettings, VotingRule}, budget, project},
    entities::{self, user},
    errors::Result,
};
use sea_orm::{DatabaseConnection, Set, prelude::*};

/// Creates an in-memory `SQLite` database with all tables initialized.
/// This is the standard setup for all integration tests.
pub async fn setup_test_db() -> Result<DatabaseConnection> {
    let db = sea_orm::Database::connect("sqlite::memory:").await?;
    crate::config::database::create_tables(&db).await?;
    Ok(db)
}

/// Creates a test user in the given organization.
pub async fn create_test_user(
    db: &DatabaseConnection,
    name: &str,
    organization_id: i64,
) -> Result<entities::user::Model> {
    let new_user = user::ActiveModel {
        name: Set(name.to_string()),
        organization_id: Set(organization_id),
        ..Default::default()
    };
    new_user.insert(db).await.map_err(Into::into)
}

/// Creates an amount-voting budget in organization 1.
///
/// # Arguments
/// * `total_amount` - The budget's monetary pool
/// * `threshold_percent` - Checkout minimum as a percent of the pool; 0 disables it
pub async fn create_amount_budget(
    db: &DatabaseConnection,
    title: &str,
    total_amount: f64,
    threshold_percent: f64,
) -> Result<entities::budget::Model> {
    budget::create_budget(
        db,
        title.to_string(),
        1,
        total_amount,
        &VoteSettings {
            rule: VotingRule::Amount { threshold_percent },
            minimum_projects: None,
        },
    )
    .await
}

/// Creates an amount-voting budget in organization 1 with a minimum-projects
/// floor on top of the amount threshold.
pub async fn create_amount_budget_with_floor(
    db: &DatabaseConnection,
    title: &str,
    total_amount: f64,
    threshold_percent: f64,
    minimum_projects: u32,
) -> Result<entities::budget::Model> {
    budget::create_budget(
        db,
        title.to_string(),
        1,
        total_amount,
        &VoteSettings {
            rule: VotingRule::Amount { threshold_percent },
            minimum_projects: Some(minimum_projects),
        },
    )
    .await
}

/// Creates a project-selection budget in organization 1 with the given
/// selection bounds.
pub async fn create_selection_budget(
    db: &DatabaseConnection,
    title: &str,
    total_amount: f64,
    minimum: u32,
    maximum: u32,
) -> Result<entities::budget::Model> {
    budget::create_budget(
        db,
        title.to_string(),
        1,
        total_amount,
        &VoteSettings {
            rule: VotingRule::SelectionCount { minimum, maximum },
            minimum_projects: None,
        },
    )
    .await
}

/// Creates a test project inside the given budget.
pub async fn create_test_project(
    db: &DatabaseConnection,
    budget_id: i64,
    title: &str,
    amount: f64,
) -> Result<entities::project::Model> {
    project::create_project(db, budget_id, title.to_string(), amount).await
}

/// Sets up a complete test environment with a user and an amount-voting
/// budget without a checkout minimum. Returns (db, user, budget) for common
/// test scenarios.
pub async fn setup_with_budget() -> Result<(
    DatabaseConnection,
    entities::user::Model,
    entities::budget::Model,
)> {
    let db = setup_test_db().await?;
    let voter = create_test_user(&db, "voter", 1).await?;
    let city_budget = create_amount_budget(&db, "City Budget", 1000.0, 0.0).await?;
    Ok((db, voter, city_budget))
}
