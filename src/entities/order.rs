//! Order entity - One user's allocation within a budget.
//!
//! An order is unique per (user, budget) pair and collects projects through
//! line items. While `checked_out_at` is `None` the order is editable; once
//! set, the order is final and immutable.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Order database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "orders")]
pub struct Model {
    /// Unique identifier for the order
    #[sea_orm(primary_key)]
    pub id: i64,
    /// ID of the user this order belongs to
    pub user_id: i64,
    /// ID of the budget this order allocates against
    pub budget_id: i64,
    /// Set exactly once when the order is finalized; `None` while editable
    pub checked_out_at: Option<DateTimeUtc>,
    /// When the order was created
    pub created_at: DateTimeUtc,
}

/// Defines relationships between Order and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each order belongs to one user
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::UserId",
        to = "super::user::Column::Id"
    )]
    User,
    /// Each order belongs to one budget
    #[sea_orm(
        belongs_to = "super::budget::Entity",
        from = "Column::BudgetId",
        to = "super::budget::Column::Id"
    )]
    Budget,
    /// One order has many line items; deleting the order deletes them too
    #[sea_orm(has_many = "super::line_item::Entity")]
    LineItems,
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
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

impl Model {
    /// Returns true once the order has been finalized.
    #[must_use]
    pub const fn checked_out(&self) -> bool {
        self.checked_out_at.is_some()
    }
}
