//! Database configuration module for budget-booth.
//!
//! Handles `SQLite` connection and table creation using `SeaORM`. Tables are
//! generated from the entity definitions with
//! `Schema::create_table_from_entity`, so the database schema always matches
//! the Rust structs. Two unique indexes guard the set semantics the entities
//! rely on: one order per (user, budget) and one line item per
//! (order, project).

use crate::entities::{
    Budget, LineItem, LineItemColumn, Order, OrderColumn, Project, User,
};
use crate::errors::Result;
use sea_orm::{ConnectionTrait, Database, DatabaseConnection, Schema, sea_query::Index};

/// Gets the database URL from the `DATABASE_URL` environment variable or
/// falls back to a default local `SQLite` file.
#[must_use]
pub fn database_url() -> String {
    std::env::var("DATABASE_URL")
        .unwrap_or_else(|_| "sqlite://data/budget_booth.sqlite?mode=rwc".to_string())
}

/// Establishes a connection to the database named by [`database_url`].
pub async fn create_connection() -> Result<DatabaseConnection> {
    Database::connect(database_url()).await.map_err(Into::into)
}

/// Creates all tables and unique indexes from the entity definitions.
/// Safe to run on every start: existing tables and indexes are left alone.
pub async fn create_tables(db: &DatabaseConnection) -> Result<()> {
    let builder = db.get_database_backend();
    let schema = Schema::new(builder);

    let mut user_table = schema.create_table_from_entity(User);
    let mut budget_table = schema.create_table_from_entity(Budget);
    let mut project_table = schema.create_table_from_entity(Project);
    let mut order_table = schema.create_table_from_entity(Order);
    let mut line_item_table = schema.create_table_from_entity(LineItem);

    db.execute(builder.build(user_table.if_not_exists())).await?;
    db.execute(builder.build(budget_table.if_not_exists())).await?;
    db.execute(builder.build(project_table.if_not_exists())).await?;
    db.execute(builder.build(order_table.if_not_exists())).await?;
    db.execute(builder.build(line_item_table.if_not_exists())).await?;

    // One order per user and budget
    let order_unique = Index::create()
        .name("idx_orders_user_budget")
        .table(Order)
        .col(OrderColumn::UserId)
        .col(OrderColumn::BudgetId)
        .unique()
        .if_not_exists()
        .to_owned();
    db.execute(builder.build(&order_unique)).await?;

    // A project appears at most once per order
    let line_item_unique = Index::create()
        .name("idx_line_items_order_project")
        .table(LineItem)
        .col(LineItemColumn::OrderId)
        .col(LineItemColumn::ProjectId)
        .unique()
        .if_not_exists()
        .to_owned();
    db.execute(builder.build(&line_item_unique)).await?;

    Ok(())
}
