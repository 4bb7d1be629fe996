//! Budget business logic - Creating and retrieving budgets.
//!
//! Budgets are created from typed [`VoteSettings`], which are flattened into
//! the row's raw settings columns, and can be seeded in bulk from the TOML
//! configuration on first run.

use crate::{
    config::budgets::Config,
    core::allocation::{VoteSettings, VotingRule},
    entities::{Budget, budget},
    errors::{Error, Result},
};
use sea_orm::{QueryOrder, Set, prelude::*};
use tracing::info;

/// Creates a budget for an organization with the given voting settings.
///
/// The typed settings are the source of truth; the raw columns of the
/// inactive mode are zeroed. Rejects empty titles, non-finite or negative
/// totals, and selection bounds where the minimum exceeds the maximum.
pub async fn create_budget(
    db: &DatabaseConnection,
    title: String,
    organization_id: i64,
    total_amount: f64,
    settings: &VoteSettings,
) -> Result<budget::Model> {
    if title.trim().is_empty() {
        return Err(Error::Config {
            message: "Budget title cannot be empty".to_string(),
        });
    }
    if !total_amount.is_finite() || total_amount < 0.0 {
        return Err(Error::InvalidAmount {
            amount: total_amount,
        });
    }

    let (threshold_percent, selection) = match settings.rule {
        VotingRule::Amount { threshold_percent } => (threshold_percent, None),
        VotingRule::SelectionCount { minimum, maximum } => {
            if minimum > maximum {
                return Err(Error::Config {
                    message: format!(
                        "Selection minimum {minimum} cannot exceed maximum {maximum}"
                    ),
                });
            }
            (0.0, Some((minimum, maximum)))
        }
    };

    let new_budget = budget::ActiveModel {
        title: Set(title.trim().to_string()),
        organization_id: Set(organization_id),
        total_amount: Set(total_amount),
        vote_threshold_percent: Set(threshold_percent),
        vote_rule_minimum_budget_projects_enabled: Set(settings.minimum_projects.is_some()),
        vote_minimum_budget_projects_number: Set(settings
            .minimum_projects
            .map_or(0, |floor| i32::try_from(floor).unwrap_or(i32::MAX))),
        vote_rule_selected_projects_enabled: Set(selection.is_some()),
        vote_selected_projects_minimum: Set(selection
            .map_or(0, |(minimum, _)| i32::try_from(minimum).unwrap_or(i32::MAX))),
        vote_selected_projects_maximum: Set(selection
            .map_or(0, |(_, maximum)| i32::try_from(maximum).unwrap_or(i32::MAX))),
        ..Default::default()
    };

    let result = new_budget.insert(db).await?;
    Ok(result)
}

/// Finds a budget by its unique ID.
pub async fn get_budget_by_id(
    db: &DatabaseConnection,
    budget_id: i64,
) -> Result<Option<budget::Model>> {
    Budget::find_by_id(budget_id).one(db).await.map_err(Into::into)
}

/// Retrieves every budget, grouped by organization and then ordered
/// alphabetically by title.
pub async fn get_all_budgets(db: &DatabaseConnection) -> Result<Vec<budget::Model>> {
    Budget::find()
        .order_by_asc(budget::Column::OrganizationId)
        .order_by_asc(budget::Column::Title)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Retrieves an organization's budgets, ordered alphabetically by title.
pub async fn get_budgets_for_organization(
    db: &DatabaseConnection,
    organization_id: i64,
) -> Result<Vec<budget::Model>> {
    Budget::find()
        .filter(budget::Column::OrganizationId.eq(organization_id))
        .order_by_asc(budget::Column::Title)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Seeds budgets and their projects from the TOML configuration.
///
/// Runs only against an empty budgets table so restarts never duplicate
/// seed data. Returns the number of budgets created.
pub async fn seed_budgets(db: &DatabaseConnection, config: &Config) -> Result<usize> {
    let existing = Budget::find().count(db).await?;
    if existing > 0 {
        info!("Budgets already present ({existing}), skipping seed");
        return Ok(0);
    }

    let mut created = 0;
    for entry in &config.budgets {
        let seeded = create_budget(
            db,
            entry.title.clone(),
            entry.organization_id,
            entry.total_amount,
            &entry.vote_settings(),
        )
        .await?;
        for project in &entry.projects {
            crate::core::project::create_project(
                db,
                seeded.id,
                project.title.clone(),
                project.amount,
            )
            .await?;
        }
        info!(
            "Seeded budget '{}' with {} projects",
            seeded.title,
            entry.projects.len()
        );
        created += 1;
    }

    Ok(created)
}
