//! Budget entity - Represents a fixed pool users allocate against via orders.
//!
//! Each budget belongs to an organization and carries its voting settings as
//! plain columns: the amount threshold, the minimum-projects floor, and the
//! project-selection rule bounds. `core::allocation::VoteSettings` derives a
//! typed view from these columns at evaluation time.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Budget database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "budgets")]
pub struct Model {
    /// Unique identifier for the budget
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Human-readable title of the budget (e.g., "Neighborhood improvements 2026")
    pub title: String,
    /// Organization that owns this budget; orders must come from users of the same one
    pub organization_id: i64,
    /// Total monetary pool available to allocate
    pub total_amount: f64,
    /// Percent of `total_amount` an order must reach before checkout; 0 disables the bound
    pub vote_threshold_percent: f64,
    /// Whether amount-mode orders must also include a minimum number of projects
    pub vote_rule_minimum_budget_projects_enabled: bool,
    /// The minimum number of projects when the rule above is enabled
    pub vote_minimum_budget_projects_number: i32,
    /// Switches the budget from amount voting to project-selection voting
    pub vote_rule_selected_projects_enabled: bool,
    /// Minimum selected projects under project-selection voting
    pub vote_selected_projects_minimum: i32,
    /// Maximum selected projects under project-selection voting
    pub vote_selected_projects_maximum: i32,
}

/// Defines relationships between Budget and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// One budget has many selectable projects
    #[sea_orm(has_many = "super::project::Entity")]
    Projects,
    /// One budget has many orders (at most one per user)
    #[sea_orm(has_many = "super::order::Entity")]
    Orders,
}

impl Related<super::project::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Projects.def()
    }
}

impl Related<super::order::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Orders.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
