//! Order business logic - The lifecycle of a user's allocation in a budget.
//!
//! Orders are created empty, mutated by adding and removing line items, and
//! finalized exactly once by checkout. Every mutation re-reads the order's
//! state inside a database transaction and runs the voting-rule engine from
//! [`crate::core::allocation`] before committing, so the capacity maximum
//! holds at the point of addition and not only at checkout. Checkout itself
//! is a single conditional UPDATE guarded on `checked_out_at IS NULL`, which
//! serializes concurrent attempts at the storage boundary.

use crate::{
    core::allocation::{self, OrderTotals, ValidationContext, ValidationError, VoteSettings},
    entities::{Budget, LineItem, Order, Project, User, line_item, order, project},
    errors::{Error, Result},
};
use chrono::Utc;
use sea_orm::{
    DbErr, QueryOrder, Set, SqlErr, TransactionTrait, prelude::*, sea_query::Expr,
};
use std::collections::BTreeSet;

/// Finds an order by its unique ID.
pub async fn get_order_by_id(
    db: &DatabaseConnection,
    order_id: i64,
) -> Result<Option<order::Model>> {
    Order::find_by_id(order_id).one(db).await.map_err(Into::into)
}

/// Finds a user's order in the given budget, if any. There is never more
/// than one.
pub async fn get_order_for_user(
    db: &DatabaseConnection,
    user_id: i64,
    budget_id: i64,
) -> Result<Option<order::Model>> {
    Order::find()
        .filter(order::Column::UserId.eq(user_id))
        .filter(order::Column::BudgetId.eq(budget_id))
        .one(db)
        .await
        .map_err(Into::into)
}

/// Creates an empty order for a user in a budget.
///
/// Rejects users from a different organization than the budget's and users
/// who already hold an order for it. The (user, budget) uniqueness is also
/// enforced by an index, and a violation racing past the pre-check is
/// translated into the same [`ValidationError::DuplicateOrder`] shape.
pub async fn create_order(
    db: &DatabaseConnection,
    user_id: i64,
    budget_id: i64,
) -> Result<order::Model> {
    let user = User::find_by_id(user_id)
        .one(db)
        .await?
        .ok_or(Error::UserNotFound { id: user_id })?;
    let budget = Budget::find_by_id(budget_id)
        .one(db)
        .await?
        .ok_or(Error::BudgetNotFound { id: budget_id })?;

    if user.organization_id != budget.organization_id {
        return Err(Error::validation(ValidationError::InvalidUser));
    }

    if get_order_for_user(db, user_id, budget_id).await?.is_some() {
        return Err(Error::validation(ValidationError::DuplicateOrder));
    }

    let new_order = order::ActiveModel {
        user_id: Set(user_id),
        budget_id: Set(budget_id),
        checked_out_at: Set(None),
        created_at: Set(Utc::now()),
        ..Default::default()
    };

    match new_order.insert(db).await {
        Ok(model) => Ok(model),
        Err(err) if is_unique_violation(&err) => {
            Err(Error::validation(ValidationError::DuplicateOrder))
        }
        Err(err) => Err(err.into()),
    }
}

/// Resolves the projects currently selected in an order.
pub async fn order_projects<C>(db: &C, order_id: i64) -> Result<Vec<project::Model>>
where
    C: ConnectionTrait,
{
    let project_ids: Vec<i64> = LineItem::find()
        .filter(line_item::Column::OrderId.eq(order_id))
        .all(db)
        .await?
        .into_iter()
        .map(|item| item.project_id)
        .collect();

    Project::find()
        .filter(project::Column::Id.is_in(project_ids))
        .order_by_asc(project::Column::Title)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Derives an order's running totals from its selected projects.
pub async fn order_totals<C>(db: &C, order_id: i64) -> Result<OrderTotals>
where
    C: ConnectionTrait,
{
    let projects = order_projects(db, order_id).await?;
    Ok(OrderTotals::from_projects(&projects))
}

/// Adds a project to an order, enforcing the capacity maximum at the point
/// of addition.
///
/// The project must belong to the order's budget, and the order must still
/// be editable. Re-adding an already selected project is a no-op returning
/// the existing line item, keeping set semantics.
pub async fn add_line_item(
    db: &DatabaseConnection,
    order_id: i64,
    project_id: i64,
) -> Result<line_item::Model> {
    let txn = db.begin().await?;

    let target = Order::find_by_id(order_id)
        .one(&txn)
        .await?
        .ok_or(Error::OrderNotFound { id: order_id })?;
    if target.checked_out() {
        return Err(Error::AlreadyCheckedOut { id: order_id });
    }

    // Projects are only addressable within the order's own budget
    let project = Project::find_by_id(project_id)
        .one(&txn)
        .await?
        .filter(|p| p.budget_id == target.budget_id)
        .ok_or(Error::ProjectNotFound { id: project_id })?;

    if let Some(existing) = LineItem::find()
        .filter(line_item::Column::OrderId.eq(order_id))
        .filter(line_item::Column::ProjectId.eq(project_id))
        .one(&txn)
        .await?
    {
        return Ok(existing);
    }

    // Evaluate the totals as they would be after the addition
    let ctx = validation_context(&txn, &target).await?;
    let projected = ValidationContext {
        totals: ctx.totals.plus(ctx.settings.allocation_for(&project)),
        ..ctx
    };
    let errors = allocation::validate(&projected, false);
    if !errors.is_empty() {
        return Err(Error::Validation { errors });
    }

    let new_item = line_item::ActiveModel {
        order_id: Set(order_id),
        project_id: Set(project_id),
        ..Default::default()
    };
    let model = new_item.insert(&txn).await?;

    txn.commit().await?;
    Ok(model)
}

/// Removes a project from an order. Removing a project that is not selected
/// is a no-op; removing from a checked-out order is rejected.
pub async fn remove_line_item(
    db: &DatabaseConnection,
    order_id: i64,
    project_id: i64,
) -> Result<()> {
    let target = Order::find_by_id(order_id)
        .one(db)
        .await?
        .ok_or(Error::OrderNotFound { id: order_id })?;
    if target.checked_out() {
        return Err(Error::AlreadyCheckedOut { id: order_id });
    }

    LineItem::delete_many()
        .filter(line_item::Column::OrderId.eq(order_id))
        .filter(line_item::Column::ProjectId.eq(project_id))
        .exec(db)
        .await?;

    Ok(())
}

/// Runs the voting-rule validation pass over an order's current state.
///
/// Returns the complete list of violations; empty means valid. Pass
/// `at_checkout` to include the bounds that only gate finalization.
pub async fn validate_order(
    db: &DatabaseConnection,
    order_id: i64,
    at_checkout: bool,
) -> Result<Vec<ValidationError>> {
    let target = Order::find_by_id(order_id)
        .one(db)
        .await?
        .ok_or(Error::OrderNotFound { id: order_id })?;
    let ctx = validation_context(db, &target).await?;
    Ok(allocation::validate(&ctx, at_checkout))
}

/// Returns true when the order has reached its checkout minimum.
pub async fn can_checkout(db: &DatabaseConnection, order_id: i64) -> Result<bool> {
    let target = Order::find_by_id(order_id)
        .one(db)
        .await?
        .ok_or(Error::OrderNotFound { id: order_id })?;
    let ctx = validation_context(db, &target).await?;
    Ok(ctx.settings.can_checkout(ctx.totals, ctx.budget_total))
}

/// Returns the order's progress against its available allocation, in percent.
pub async fn progress_percent(db: &DatabaseConnection, order_id: i64) -> Result<f64> {
    let target = Order::find_by_id(order_id)
        .one(db)
        .await?
        .ok_or(Error::OrderNotFound { id: order_id })?;
    let ctx = validation_context(db, &target).await?;
    Ok(ctx.settings.progress_percent(ctx.totals, ctx.budget_total))
}

/// Finalizes an order exactly once.
///
/// Validates the full checkout rule set, then stamps `checked_out_at`
/// through a single conditional UPDATE filtered on `checked_out_at IS NULL`.
/// A concurrent attempt that loses the race affects zero rows and fails with
/// [`Error::AlreadyCheckedOut`] without touching the winner's timestamp.
pub async fn checkout(db: &DatabaseConnection, order_id: i64) -> Result<order::Model> {
    let txn = db.begin().await?;

    let target = Order::find_by_id(order_id)
        .one(&txn)
        .await?
        .ok_or(Error::OrderNotFound { id: order_id })?;
    if target.checked_out() {
        return Err(Error::AlreadyCheckedOut { id: order_id });
    }

    let ctx = validation_context(&txn, &target).await?;
    let errors = allocation::validate(&ctx, true);
    if !errors.is_empty() {
        return Err(Error::Validation { errors });
    }

    let updated = Order::update_many()
        .col_expr(order::Column::CheckedOutAt, Expr::value(Utc::now()))
        .filter(order::Column::Id.eq(order_id))
        .filter(order::Column::CheckedOutAt.is_null())
        .exec(&txn)
        .await?;
    if updated.rows_affected == 0 {
        return Err(Error::AlreadyCheckedOut { id: order_id });
    }

    let finished = Order::find_by_id(order_id)
        .one(&txn)
        .await?
        .ok_or(Error::OrderNotFound { id: order_id })?;

    txn.commit().await?;
    Ok(finished)
}

/// Deletes an order together with its line items.
pub async fn delete_order(db: &DatabaseConnection, order_id: i64) -> Result<()> {
    let txn = db.begin().await?;

    let target = Order::find_by_id(order_id)
        .one(&txn)
        .await?
        .ok_or(Error::OrderNotFound { id: order_id })?;

    LineItem::delete_many()
        .filter(line_item::Column::OrderId.eq(order_id))
        .exec(&txn)
        .await?;
    target.delete(&txn).await?;

    txn.commit().await?;
    Ok(())
}

/// Returns the budget's orders that are still editable.
pub async fn pending_orders(db: &DatabaseConnection, budget_id: i64) -> Result<Vec<order::Model>> {
    Order::find()
        .filter(order::Column::BudgetId.eq(budget_id))
        .filter(order::Column::CheckedOutAt.is_null())
        .order_by_asc(order::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Returns the budget's finalized orders.
pub async fn finished_orders(db: &DatabaseConnection, budget_id: i64) -> Result<Vec<order::Model>> {
    Order::find()
        .filter(order::Column::BudgetId.eq(budget_id))
        .filter(order::Column::CheckedOutAt.is_not_null())
        .order_by_asc(order::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Returns the distinct users who finalized an order in any of the given
/// budgets, sorted by user ID.
pub async fn finished_participant_ids(
    db: &DatabaseConnection,
    budget_ids: &[i64],
) -> Result<Vec<i64>> {
    let orders = Order::find()
        .filter(order::Column::BudgetId.is_in(budget_ids.iter().copied()))
        .filter(order::Column::CheckedOutAt.is_not_null())
        .all(db)
        .await?;

    let ids: BTreeSet<i64> = orders.into_iter().map(|o| o.user_id).collect();
    Ok(ids.into_iter().collect())
}

/// Resolves everything the voting-rule engine needs for one order: settings
/// and total from the budget row, totals from the line items, organizations
/// from the user and budget. Always read fresh, never memoized.
async fn validation_context<C>(db: &C, target: &order::Model) -> Result<ValidationContext>
where
    C: ConnectionTrait,
{
    let budget = Budget::find_by_id(target.budget_id)
        .one(db)
        .await?
        .ok_or(Error::BudgetNotFound {
            id: target.budget_id,
        })?;
    let user = User::find_by_id(target.user_id)
        .one(db)
        .await?
        .ok_or(Error::UserNotFound { id: target.user_id })?;
    let totals = order_totals(db, target.id).await?;

    Ok(ValidationContext {
        settings: VoteSettings::from_budget(&budget),
        budget_total: budget.total_amount,
        totals,
        user_organization_id: user.organization_id,
        budget_organization_id: budget.organization_id,
    })
}

fn is_unique_violation(err: &DbErr) -> bool {
    matches!(err.sql_err(), Some(SqlErr::UniqueConstraintViolation(_)))
}
