//! Voting-rule engine - Decides what an order may contain and when it may be
//! finalized.
//!
//! Budgets are voted on in one of two modes: orders either accumulate a
//! monetary amount bounded by the budget total, or they accumulate a count of
//! selected projects bounded by configured limits. Amount voting can carry an
//! extra floor on the number of projects. All the rules live here as pure
//! functions over explicitly passed state; resolving that state from the
//! database is the job of [`crate::core::order`].

use crate::entities::{budget, project};
use std::fmt;
use thiserror::Error;

/// The voting rule configured on a budget.
///
/// The two modes are mutually exclusive; a budget row with the
/// project-selection flag set is always read as [`VotingRule::SelectionCount`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum VotingRule {
    /// Orders accumulate project costs, bounded above by the budget total.
    Amount {
        /// Percent of the budget total an order must reach before checkout.
        /// Zero disables the lower bound.
        threshold_percent: f64,
    },
    /// Orders accumulate selected projects within the configured bounds.
    /// Every project costs one selection slot regardless of its price.
    SelectionCount {
        /// Fewest projects an order may be checked out with
        minimum: u32,
        /// Most projects an order may ever contain
        maximum: u32,
    },
}

/// Typed view of a budget row's voting-settings columns.
///
/// Derived fresh from the row on every evaluation; never cached between
/// calls, so settings edits take effect immediately.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VoteSettings {
    /// The active voting rule
    pub rule: VotingRule,
    /// Floor on the number of projects an amount-mode order must include
    /// before checkout. `None` means no floor is configured, which is a
    /// distinct state from a floor of zero. Never set under
    /// [`VotingRule::SelectionCount`], which carries its own minimum.
    pub minimum_projects: Option<u32>,
}

/// Running totals of an order, derived from its projects and never stored.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct OrderTotals {
    /// Sum of the selected projects' costs
    pub amount: f64,
    /// Number of selected projects
    pub count: u32,
}

impl OrderTotals {
    /// Derives totals from an order's resolved project list.
    #[must_use]
    pub fn from_projects(projects: &[project::Model]) -> Self {
        Self {
            amount: projects.iter().map(|p| p.budget_amount).sum(),
            count: u32::try_from(projects.len()).unwrap_or(u32::MAX),
        }
    }

    /// Totals after adding one more project with the given allocation.
    #[must_use]
    pub fn plus(self, allocation: Allocation) -> Self {
        match allocation {
            Allocation::Amount(amount) => Self {
                amount: self.amount + amount,
                count: self.count.saturating_add(1),
            },
            Allocation::Projects(count) => Self {
                amount: self.amount,
                count: self.count.saturating_add(count),
            },
        }
    }
}

/// A capacity or total expressed in the unit of the active voting rule:
/// money under amount voting, selection slots under project selection.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Allocation {
    /// A monetary amount
    Amount(f64),
    /// A number of project selections
    Projects(u32),
}

impl fmt::Display for Allocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Amount(amount) => write!(f, "{amount:.2}"),
            Self::Projects(count) => write!(f, "{count} projects"),
        }
    }
}

/// A single voting-rule violation, reported at field level.
///
/// Validation collects every applicable violation instead of stopping at the
/// first; the caller decides whether to re-render input or abort.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    /// The order's user belongs to a different organization than the budget
    #[error("user does not belong to the budget's organization")]
    InvalidUser,

    /// The order total is under the checkout minimum
    #[error("order total {total} is below the required minimum {minimum}")]
    BelowMinimum {
        total: Allocation,
        minimum: Allocation,
    },

    /// The order total exceeds the capacity; applies even before checkout
    #[error("order total {total} exceeds the allowed maximum {maximum}")]
    AboveMaximum {
        total: Allocation,
        maximum: Allocation,
    },

    /// The order does not include enough projects to be checked out
    #[error("order includes {selected} projects but at least {minimum} are required")]
    InsufficientProjects { selected: u32, minimum: u32 },

    /// The user already has an order for this budget
    #[error("user already has an order for this budget")]
    DuplicateOrder,
}

/// Everything the validation pass needs, resolved fresh by the caller.
#[derive(Debug, Clone, Copy)]
pub struct ValidationContext {
    /// Voting settings of the order's budget
    pub settings: VoteSettings,
    /// The budget's total monetary pool
    pub budget_total: f64,
    /// Derived totals of the order under validation
    pub totals: OrderTotals,
    /// Organization of the order's user
    pub user_organization_id: i64,
    /// Organization owning the order's budget
    pub budget_organization_id: i64,
}

impl VoteSettings {
    /// Reads the typed settings out of a budget row.
    ///
    /// Negative counts in the raw columns are clamped to zero; the
    /// minimum-projects floor only applies to amount voting.
    #[must_use]
    pub fn from_budget(budget: &budget::Model) -> Self {
        if budget.vote_rule_selected_projects_enabled {
            Self {
                rule: VotingRule::SelectionCount {
                    minimum: count_from(budget.vote_selected_projects_minimum),
                    maximum: count_from(budget.vote_selected_projects_maximum),
                },
                minimum_projects: None,
            }
        } else {
            Self {
                rule: VotingRule::Amount {
                    threshold_percent: budget.vote_threshold_percent,
                },
                minimum_projects: budget
                    .vote_rule_minimum_budget_projects_enabled
                    .then(|| count_from(budget.vote_minimum_budget_projects_number)),
            }
        }
    }

    /// Returns the capacity the user allocates against: the maximum project
    /// count under project selection, otherwise the budget's total amount.
    #[must_use]
    pub fn available_allocation(&self, budget_total: f64) -> Allocation {
        match self.rule {
            VotingRule::SelectionCount { maximum, .. } => Allocation::Projects(maximum),
            VotingRule::Amount { .. } => Allocation::Amount(budget_total),
        }
    }

    /// Returns what adding the given project costs against the available
    /// allocation: one selection slot under project selection, otherwise the
    /// project's own amount.
    #[must_use]
    pub fn allocation_for(&self, project: &project::Model) -> Allocation {
        match self.rule {
            VotingRule::SelectionCount { .. } => Allocation::Projects(1),
            VotingRule::Amount { .. } => Allocation::Amount(project.budget_amount),
        }
    }

    /// Returns the order total in the unit of the active rule.
    #[must_use]
    pub fn total(&self, totals: OrderTotals) -> Allocation {
        match self.rule {
            VotingRule::SelectionCount { .. } => Allocation::Projects(totals.count),
            VotingRule::Amount { .. } => Allocation::Amount(totals.amount),
        }
    }

    /// Returns the monetary amount an order must reach before checkout.
    /// Zero whenever a count-based rule applies instead.
    #[must_use]
    pub fn minimum_amount(&self, budget_total: f64) -> f64 {
        match (self.rule, self.minimum_projects) {
            (VotingRule::Amount { threshold_percent }, None) => {
                budget_total * threshold_percent / 100.0
            }
            _ => 0.0,
        }
    }

    /// Returns the monetary amount an order may never exceed.
    #[must_use]
    pub const fn maximum_amount(&self, budget_total: f64) -> f64 {
        budget_total
    }

    /// Returns the fewest projects an order needs at checkout, resolved from
    /// whichever count rule is active. Zero when neither applies.
    #[must_use]
    pub fn minimum_count(&self) -> u32 {
        match (self.rule, self.minimum_projects) {
            (VotingRule::SelectionCount { minimum, .. }, _) => minimum,
            (VotingRule::Amount { .. }, Some(minimum)) => minimum,
            (VotingRule::Amount { .. }, None) => 0,
        }
    }

    /// Returns the most projects an order may contain, or `None` when no
    /// count-based ceiling applies.
    #[must_use]
    pub fn maximum_count(&self) -> Option<u32> {
        match self.rule {
            VotingRule::SelectionCount { maximum, .. } => Some(maximum),
            VotingRule::Amount { .. } => None,
        }
    }

    /// Returns true when a minimum project count gates checkout, either via
    /// project-selection voting or the amount-mode floor.
    #[must_use]
    pub fn project_floor_applies(&self) -> bool {
        match (self.rule, self.minimum_projects) {
            (VotingRule::SelectionCount { .. }, _) | (VotingRule::Amount { .. }, Some(_)) => true,
            (VotingRule::Amount { .. }, None) => false,
        }
    }

    /// Decides whether the order has reached its checkout minimum.
    ///
    /// Count rules take precedence: when the minimum-projects floor or
    /// project-selection voting applies, only the project count matters;
    /// otherwise the monetary minimum does.
    #[must_use]
    pub fn can_checkout(&self, totals: OrderTotals, budget_total: f64) -> bool {
        if self.project_floor_applies() {
            totals.count >= self.minimum_count()
        } else {
            totals.amount >= self.minimum_amount(budget_total)
        }
    }

    /// Order progress against the available allocation, in percent.
    #[must_use]
    pub fn progress_percent(&self, totals: OrderTotals, budget_total: f64) -> f64 {
        match self.rule {
            VotingRule::SelectionCount { maximum, .. } => {
                if maximum == 0 {
                    0.0
                } else {
                    f64::from(totals.count) / f64::from(maximum) * 100.0
                }
            }
            VotingRule::Amount { .. } => {
                if budget_total == 0.0 {
                    0.0
                } else {
                    totals.amount / budget_total * 100.0
                }
            }
        }
    }
}

/// Runs the full validation pass over an order snapshot.
///
/// Returns every violation found, in a fixed evaluation order: organization
/// membership, then the active rule's bounds, then the project floor. The
/// maximum bound always applies; minimums and the floor only gate checkout
/// (`at_checkout`). Deterministic for a given context; no I/O.
#[must_use]
pub fn validate(ctx: &ValidationContext, at_checkout: bool) -> Vec<ValidationError> {
    let mut errors = Vec::new();
    let settings = ctx.settings;

    if ctx.user_organization_id != ctx.budget_organization_id {
        errors.push(ValidationError::InvalidUser);
    }

    match settings.rule {
        VotingRule::Amount { .. } => {
            let maximum = settings.maximum_amount(ctx.budget_total);
            if ctx.totals.amount > maximum {
                errors.push(ValidationError::AboveMaximum {
                    total: Allocation::Amount(ctx.totals.amount),
                    maximum: Allocation::Amount(maximum),
                });
            }
            if at_checkout {
                let minimum = settings.minimum_amount(ctx.budget_total);
                if ctx.totals.amount < minimum {
                    errors.push(ValidationError::BelowMinimum {
                        total: Allocation::Amount(ctx.totals.amount),
                        minimum: Allocation::Amount(minimum),
                    });
                }
            }
        }
        VotingRule::SelectionCount { minimum, maximum } => {
            if ctx.totals.count > maximum {
                errors.push(ValidationError::AboveMaximum {
                    total: Allocation::Projects(ctx.totals.count),
                    maximum: Allocation::Projects(maximum),
                });
            }
            if at_checkout && ctx.totals.count < minimum {
                errors.push(ValidationError::BelowMinimum {
                    total: Allocation::Projects(ctx.totals.count),
                    minimum: Allocation::Projects(minimum),
                });
            }
        }
    }

    if at_checkout && settings.project_floor_applies() {
        let minimum = settings.minimum_count();
        if ctx.totals.count < minimum {
            errors.push(ValidationError::InsufficientProjects {
                selected: ctx.totals.count,
                minimum,
            });
        }
    }

    errors
}

fn count_from(raw: i32) -> u32 {
    u32::try_from(raw).unwrap_or(0)
}
