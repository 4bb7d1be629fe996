//! Project entity - A selectable item inside a budget.
//!
//! Orders reference projects through line items. Under amount voting a
//! project contributes its `budget_amount` to the order total; under
//! project-selection voting it contributes a single selection slot.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Project database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "projects")]
pub struct Model {
    /// Unique identifier for the project
    #[sea_orm(primary_key)]
    pub id: i64,
    /// ID of the budget this project belongs to
    pub budget_id: i64,
    /// Human-readable title of the project
    pub title: String,
    /// Cost of the project, counted against the budget total in amount voting
    pub budget_amount: f64,
}

/// Defines relationships between Project and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each project belongs to one budget
    #[sea_orm(
        belongs_to = "super::budget::Entity",
        from = "Column::BudgetId",
        to = "super::budget::Column::Id"
    )]
    Budget,
    /// One project may appear in many orders (once per order)
    #[sea_orm(has_many = "super::line_item::Entity")]
    LineItems,
}

impl Related<super::budget::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Budget.def()
    }
}

impl Related<super::line_item::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::LineItems.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
