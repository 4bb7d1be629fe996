//! Budget seed configuration loading from config.toml
//!
//! The budgets defined in config.toml are used to seed an empty database on
//! first run: each entry creates one budget with its voting settings and
//! nested projects. Exactly one voting mode applies per entry; configuring a
//! `selected_projects` table switches the budget to project-selection voting
//! and the amount-mode fields are ignored.

use crate::core::allocation::{VoteSettings, VotingRule};
use crate::errors::{Error, Result};
use serde::Deserialize;
use std::path::Path;

/// Configuration structure representing the entire config.toml file
#[derive(Debug, Deserialize)]
pub struct Config {
    /// List of budgets to seed
    pub budgets: Vec<BudgetConfig>,
}

/// Configuration for a single budget
#[derive(Debug, Deserialize, Clone)]
pub struct BudgetConfig {
    /// Title of the budget
    pub title: String,
    /// Organization the budget belongs to
    pub organization_id: i64,
    /// Total monetary pool
    pub total_amount: f64,
    /// Percent of the total an order must reach before checkout (amount voting)
    #[serde(default)]
    pub vote_threshold_percent: f64,
    /// Minimum number of projects per order (amount voting, optional floor)
    #[serde(default)]
    pub minimum_projects: Option<u32>,
    /// Switches the budget to project-selection voting with these bounds
    #[serde(default)]
    pub selected_projects: Option<SelectedProjectsConfig>,
    /// Projects selectable within this budget
    #[serde(default)]
    pub projects: Vec<ProjectConfig>,
}

/// Bounds for project-selection voting
#[derive(Debug, Deserialize, Clone, Copy)]
pub struct SelectedProjectsConfig {
    /// Fewest projects an order may be checked out with
    pub minimum: u32,
    /// Most projects an order may contain
    pub maximum: u32,
}

/// Configuration for a single seeded project
#[derive(Debug, Deserialize, Clone)]
pub struct ProjectConfig {
    /// Title of the project
    pub title: String,
    /// Cost of the project
    pub amount: f64,
}

impl BudgetConfig {
    /// Resolves the typed voting settings this entry describes.
    #[must_use]
    pub fn vote_settings(&self) -> VoteSettings {
        match self.selected_projects {
            Some(bounds) => VoteSettings {
                rule: VotingRule::SelectionCount {
                    minimum: bounds.minimum,
                    maximum: bounds.maximum,
                },
                minimum_projects: None,
            },
            None => VoteSettings {
                rule: VotingRule::Amount {
                    threshold_percent: self.vote_threshold_percent,
                },
                minimum_projects: self.minimum_projects,
            },
        }
    }
}

/// Loads budget seed configuration from a TOML file.
///
/// # Errors
/// Returns an error if the file cannot be read, the TOML syntax is invalid,
/// or required fields are missing.
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<Config> {
    let contents = std::fs::read_to_string(path.as_ref()).map_err(|e| Error::Config {
        message: format!("Failed to read config file: {e}"),
    })?;

    toml::from_str(&contents).map_err(|e| Error::Config {
        message: format!("Failed to parse config.toml: {e}"),
    })
}

/// Loads budget seed configuration from the default location (./config.toml)
pub fn load_default_config() -> Result<Config> {
    load_config("config.toml")
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    #![allow(clippy::float_cmp)]
    use super::*;

    #[test]
    fn test_parse_budget_config() {
        let toml_str = r#"
            [[budgets]]
            title = "Neighborhood 2026"
            organization_id = 1
            total_amount = 1000.0
            vote_threshold_percent = 10.0

            [[budgets.projects]]
            title = "Park benches"
            amount = 300.0

            [[budgets]]
            title = "Youth projects"
            organization_id = 1
            total_amount = 50000.0

            [budgets.selected_projects]
            minimum = 2
            maximum = 5
        "#;

        let config: Config = toml::from_str(toml_str).unwrap();
        assert_eq!(config.budgets.len(), 2);

        let amount = &config.budgets[0];
        assert_eq!(amount.title, "Neighborhood 2026");
        assert_eq!(amount.total_amount, 1000.0);
        assert_eq!(amount.projects.len(), 1);
        assert_eq!(
            amount.vote_settings().rule,
            VotingRule::Amount {
                threshold_percent: 10.0
            }
        );

        let selection = &config.budgets[1];
        assert!(selection.projects.is_empty());
        assert_eq!(
            selection.vote_settings().rule,
            VotingRule::SelectionCount {
                minimum: 2,
                maximum: 5
            }
        );
    }

    #[test]
    fn test_minimum_projects_floor_parsed() {
        let toml_str = r#"
            [[budgets]]
            title = "Floor Budget"
            organization_id = 1
            total_amount = 1000.0
            vote_threshold_percent = 10.0
            minimum_projects = 3
        "#;

        let config: Config = toml::from_str(toml_str).unwrap();
        let settings = config.budgets[0].vote_settings();
        assert_eq!(settings.minimum_projects, Some(3));
    }

    #[test]
    fn test_load_config_missing_file() {
        let result = load_config("does-not-exist.toml");
        assert!(matches!(result.unwrap_err(), Error::Config { .. }));
    }
}
