//! Search filters.
//!
//! A search body maps column names to fragments. Every fragment becomes a
//! case-insensitive partial-match condition; all conditions must hold.

use serde_json::{Map, Value};

use crate::{
  Error, Result,
  columns::{self, Column, ID_COLUMN},
};

/// A single `column contains needle` condition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Condition {
  pub column: &'static Column,
  /// The raw fragment to look for. Stores escape it before wrapping it in
  /// wildcards.
  pub needle: String,
}

/// A conjunction of [`Condition`]s.
///
/// An empty filter is valid and means "nothing to search for"; callers must
/// short-circuit it rather than run an unfiltered query.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchFilter {
  conditions: Vec<Condition>,
}

impl SearchFilter {
  /// Build a filter from a JSON object.
  ///
  /// `null` and empty-string values are skipped. Numbers and booleans are
  /// matched by their textual form. Keys outside the catalog and structured
  /// values are rejected.
  pub fn from_json(map: Map<String, Value>) -> Result<Self> {
    let mut conditions = Vec::with_capacity(map.len());

    for (name, value) in map {
      let column = match columns::lookup(&name) {
        Some(column) => column,
        None if name == ID_COLUMN => return Err(Error::ReadOnlyField(name)),
        None => return Err(Error::UnknownField(name)),
      };

      let needle = match value {
        Value::Null => continue,
        Value::String(s) if s.is_empty() => continue,
        Value::String(s) => s,
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        other @ (Value::Array(_) | Value::Object(_)) => {
          return Err(Error::InvalidValue {
            field:    name,
            expected: "a string, number or boolean",
            found:    other.to_string(),
          });
        }
      };

      conditions.push(Condition { column, needle });
    }

    Ok(Self { conditions })
  }

  pub fn conditions(&self) -> &[Condition] { &self.conditions }

  pub fn is_empty(&self) -> bool { self.conditions.is_empty() }
}
