//! Vote workflow - How many budgets one user may vote in.
//!
//! Organizations publish several budgets at once and choose a policy for how
//! their participants vote across them: either each budget is voted
//! independently, or casting a vote in one budget spends the user's only
//! vote. The workflow decides whether voting in a given budget is still
//! allowed, whether the user has hit the limit, and which pending orders
//! would have to be discarded to vote elsewhere.

use crate::{
    entities::{Order, order},
    errors::Result,
};
use sea_orm::prelude::*;

/// Policy for voting across an organization's budgets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BudgetsWorkflow {
    /// A user may finalize an order in only one of the budgets
    One,
    /// Every budget is voted independently
    All,
}

/// One user's voting activity across a set of budgets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VoteStatus {
    /// The budgets under consideration
    pub budget_ids: Vec<i64>,
    /// Budgets where the user has a finalized order
    pub voted: Vec<i64>,
    /// Budgets where the user has a pending order
    pub in_progress: Vec<i64>,
}

impl VoteStatus {
    /// Returns true when the user has finalized an order in the budget.
    #[must_use]
    pub fn has_voted(&self, budget_id: i64) -> bool {
        self.voted.contains(&budget_id)
    }
}

/// Loads a user's voting activity across the given budgets.
pub async fn vote_status(
    db: &DatabaseConnection,
    user_id: i64,
    budget_ids: &[i64],
) -> Result<VoteStatus> {
    let orders = Order::find()
        .filter(order::Column::UserId.eq(user_id))
        .filter(order::Column::BudgetId.is_in(budget_ids.iter().copied()))
        .all(db)
        .await?;

    let mut voted = Vec::new();
    let mut in_progress = Vec::new();
    for placed in orders {
        if placed.checked_out() {
            voted.push(placed.budget_id);
        } else {
            in_progress.push(placed.budget_id);
        }
    }

    Ok(VoteStatus {
        budget_ids: budget_ids.to_vec(),
        voted,
        in_progress,
    })
}

impl BudgetsWorkflow {
    /// Decides whether the user may still vote in the given budget.
    ///
    /// Under [`BudgetsWorkflow::One`], activity in any other budget blocks
    /// the vote; with `consider_progress` false, only finalized orders
    /// block, so a pending order elsewhere can still be discarded.
    #[must_use]
    pub fn vote_allowed(
        &self,
        status: &VoteStatus,
        budget_id: i64,
        consider_progress: bool,
    ) -> bool {
        match self {
            Self::All => true,
            Self::One => {
                let progress: &[i64] = if consider_progress {
                    &status.in_progress
                } else {
                    &[]
                };
                status
                    .voted
                    .iter()
                    .chain(progress.iter())
                    .all(|id| *id == budget_id)
            }
        }
    }

    /// Returns true once the user cannot vote in any further budget.
    #[must_use]
    pub fn limit_reached(&self, status: &VoteStatus) -> bool {
        match self {
            Self::One => !status.voted.is_empty(),
            Self::All => {
                !status.budget_ids.is_empty() && status.voted.len() == status.budget_ids.len()
            }
        }
    }

    /// Pending orders the user would have to discard to vote elsewhere.
    #[must_use]
    pub fn discardable<'a>(&self, status: &'a VoteStatus) -> &'a [i64] {
        match self {
            Self::One => &status.in_progress,
            Self::All => &[],
        }
    }
}
