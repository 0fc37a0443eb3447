//! Citizen records as exchanged with API callers.
//!
//! A record is a wide, mostly-nullable row. Rather than a 150-field struct the
//! record keeps its columns as a JSON object keyed by catalog name; the
//! catalog in [`crate::columns`] is the single description of its shape.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Server-assigned sequential identifier.
pub type CitizenId = i64;

/// A full citizen row.
///
/// Serialises flat: `{"id": 1, "first_name": "...", ...}`. Every catalogued
/// column is present; unset columns are `null`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Citizen {
  pub id:     CitizenId,
  #[serde(flatten)]
  pub fields: Map<String, Value>,
}

impl Citizen {
  /// The value of `column`, treating `null` as absent.
  pub fn get(&self, column: &str) -> Option<&Value> {
    self.fields.get(column).filter(|v| !v.is_null())
  }
}

/// The projection returned by slice listings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CitizenSummary {
  pub id:         CitizenId,
  pub first_name: String,
  pub last_name:  String,
  pub birth_date: String,
  pub address:    String,
}

/// A page of citizens plus a count.
///
/// For slices `total_count` is the size of the whole table; for searches it
/// is the number of matches.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CitizenPage<T> {
  pub citizens:    Vec<T>,
  pub total_count: u64,
}

impl<T> CitizenPage<T> {
  pub fn empty() -> Self { Self { citizens: Vec::new(), total_count: 0 } }

  /// A page whose count is the number of citizens it holds.
  pub fn counted(citizens: Vec<T>) -> Self {
    let total_count = citizens.len() as u64;
    Self { citizens, total_count }
  }
}
