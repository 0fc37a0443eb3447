//! The statistics snapshot.
//!
//! There is exactly one "current" snapshot. Each recomputation replaces all of
//! its derived fields at once; no history is kept.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Fixed identity of the single snapshot row.
pub const SNAPSHOT_ID: i64 = 1;

/// Category value → number of citizens. Categories with no citizens are
/// absent, never zero.
pub type Distribution = BTreeMap<String, u64>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatisticsSnapshot {
  pub id:                          i64,
  /// Mean age in full years of citizens whose gender is `male`.
  pub avg_age_male:                Option<f64>,
  /// Mean age in full years of citizens whose gender is `female`.
  pub avg_age_female:              Option<f64>,
  pub gender_distribution:         Distribution,
  pub education_distribution:      Distribution,
  pub marital_status_distribution: Distribution,
  /// Mean over citizens with a recorded salary.
  pub avg_salary:                  Option<f64>,
  pub avg_children_count:          Option<f64>,
  pub citizenship_distribution:    Distribution,
  pub last_updated:                DateTime<Utc>,
}

impl StatisticsSnapshot {
  /// Every distribution, labelled by its field name.
  pub fn distributions(&self) -> [(&'static str, &Distribution); 4] {
    [
      ("gender_distribution", &self.gender_distribution),
      ("education_distribution", &self.education_distribution),
      ("marital_status_distribution", &self.marital_status_distribution),
      ("citizenship_distribution", &self.citizenship_distribution),
    ]
  }
}
