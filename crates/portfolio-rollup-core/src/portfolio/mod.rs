pub mod entity;

pub use entity::FinancialEntity;

use serde::{Deserialize, Serialize};

use crate::allocation::{rollup_with_policy, ProrationPolicy, Rollup};
use crate::calendar::Granularity;
use crate::error::DateRangeError;
use crate::types::WeeklyRate;

/// Immutable snapshot of a portfolio: the selected year, the bucket size and
/// the projects. Edits produce a new snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Portfolio {
    pub year: i32,
    #[serde(default)]
    pub granularity: Granularity,
    #[serde(default)]
    pub projects: Vec<FinancialEntity>,
}

impl Portfolio {
    pub fn new(year: i32, granularity: Granularity, projects: Vec<FinancialEntity>) -> Self {
        Self {
            year,
            granularity,
            projects,
        }
    }

    /// A one-project portfolio spanning the whole year with the given seed rate.
    pub fn seeded(year: i32, granularity: Granularity, seed: WeeklyRate) -> Self {
        Self::new(
            year,
            granularity,
            vec![FinancialEntity::for_year("project-1", "Project 1", year, seed)],
        )
    }

    /// Switch to another year, re-clamping every project range into it.
    pub fn with_year(&self, year: i32) -> Self {
        Self {
            year,
            granularity: self.granularity,
            projects: self.projects.iter().map(|p| p.reclamped(year)).collect(),
        }
    }

    pub fn with_granularity(&self, granularity: Granularity) -> Self {
        Self {
            granularity,
            ..self.clone()
        }
    }

    /// Diagnostics for every project whose range cannot be allocated.
    pub fn date_errors(&self) -> Vec<(&FinancialEntity, DateRangeError)> {
        self.projects
            .iter()
            .filter_map(|p| p.date_error().map(|e| (p, e)))
            .collect()
    }

    pub fn rollup<P: ProrationPolicy + ?Sized>(&self, policy: &P) -> Rollup {
        rollup_with_policy(&self.projects, self.year, self.granularity, policy)
    }
}
