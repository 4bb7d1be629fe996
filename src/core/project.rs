//! Project business logic - Creating and retrieving selectable projects.

use crate::{
    entities::{Budget, Project, project},
    errors::{Error, Result},
};
use sea_orm::{QueryOrder, Set, prelude::*};

/// Creates a project inside a budget, validating its title and cost.
pub async fn create_project(
    db: &DatabaseConnection,
    budget_id: i64,
    title: String,
    budget_amount: f64,
) -> Result<project::Model> {
    if title.trim().is_empty() {
        return Err(Error::Config {
            message: "Project title cannot be empty".to_string(),
        });
    }
    if !budget_amount.is_finite() || budget_amount < 0.0 {
        return Err(Error::InvalidAmount {
            amount: budget_amount,
        });
    }

    Budget::find_by_id(budget_id)
        .one(db)
        .await?
        .ok_or(Error::BudgetNotFound { id: budget_id })?;

    let new_project = project::ActiveModel {
        budget_id: Set(budget_id),
        title: Set(title.trim().to_string()),
        budget_amount: Set(budget_amount),
        ..Default::default()
    };

    let result = new_project.insert(db).await?;
    Ok(result)
}

/// Finds a project by its unique ID.
pub async fn get_project_by_id(
    db: &DatabaseConnection,
    project_id: i64,
) -> Result<Option<project::Model>> {
    Project::find_by_id(project_id)
        .one(db)
        .await
        .map_err(Into::into)
}

/// Retrieves a budget's projects, ordered alphabetically by title.
pub async fn get_projects_for_budget(
    db: &DatabaseConnection,
    budget_id: i64,
) -> Result<Vec<project::Model>> {
    Project::find()
        .filter(project::Column::BudgetId.eq(budget_id))
        .order_by_asc(project::Column::Title)
        .all(db)
        .await
        .map_err(Into::into)
}
