//! Validated field maps for insert and update.
//!
//! Request bodies arrive as arbitrary JSON objects. [`CitizenFields`] resolves
//! every key against the column catalog and converts every value to the
//! column's kind, so a store only ever sees catalogued identifiers and typed
//! values that it binds as parameters.

use chrono::NaiveDate;
use serde_json::{Map, Value};

use crate::{
  Error, Result,
  columns::{self, Column, ColumnKind, ID_COLUMN},
};

/// Date format accepted for [`ColumnKind::Date`] columns.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

// ─── FieldValue ──────────────────────────────────────────────────────────────

/// A value converted to the kind of the column it is assigned to.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
  Null,
  Text(String),
  Integer(i64),
  Float(f64),
  Boolean(bool),
  /// Normalised to [`DATE_FORMAT`].
  Date(NaiveDate),
  TextList(Vec<String>),
  IdList(Vec<i64>),
}

impl FieldValue {
  /// Convert `value` for `column`, or explain why it does not fit.
  pub fn convert(column: &Column, value: Value) -> Result<Self> {
    if value.is_null() {
      return Ok(Self::Null);
    }

    let converted = match column.kind {
      ColumnKind::Text => match &value {
        Value::String(s) => Some(Self::Text(s.clone())),
        _ => None,
      },
      ColumnKind::Integer | ColumnKind::CitizenRef => {
        as_integer(&value).map(Self::Integer)
      }
      ColumnKind::Float => as_float(&value).map(Self::Float),
      ColumnKind::Boolean => as_boolean(&value).map(Self::Boolean),
      ColumnKind::Date => value
        .as_str()
        .and_then(|s| NaiveDate::parse_from_str(s, DATE_FORMAT).ok())
        .map(Self::Date),
      ColumnKind::TextList => as_list(&value, |v| v.as_str().map(str::to_owned))
        .map(Self::TextList),
      ColumnKind::CitizenRefList => as_list(&value, as_integer).map(Self::IdList),
    };

    converted.ok_or_else(|| Error::InvalidValue {
      field:    column.name.to_owned(),
      expected: column.kind.describe(),
      found:    value.to_string(),
    })
  }
}

fn as_integer(value: &Value) -> Option<i64> {
  match value {
    Value::Number(n) => n.as_i64().or_else(|| {
      n.as_f64().filter(|f| f.fract() == 0.0 && f.abs() < 9.0e15).map(|f| f as i64)
    }),
    Value::String(s) => s.trim().parse().ok(),
    _ => None,
  }
}

fn as_float(value: &Value) -> Option<f64> {
  match value {
    Value::Number(n) => n.as_f64(),
    Value::String(s) => s.trim().parse().ok(),
    _ => None,
  }
}

fn as_boolean(value: &Value) -> Option<bool> {
  match value {
    Value::Bool(b) => Some(*b),
    Value::String(s) => s.trim().parse().ok(),
    _ => None,
  }
}

fn as_list<T>(value: &Value, item: impl Fn(&Value) -> Option<T>) -> Option<Vec<T>> {
  value.as_array()?.iter().map(item).collect()
}

// ─── CitizenFields ───────────────────────────────────────────────────────────

/// One `column = value` pair of a validated field map.
#[derive(Debug, Clone, PartialEq)]
pub struct Assignment {
  pub column: &'static Column,
  pub value:  FieldValue,
}

/// A non-empty, whitelisted, typed field map, in the key order of the
/// [`Map`] it was built from.
#[derive(Debug, Clone, PartialEq)]
pub struct CitizenFields {
  assignments: Vec<Assignment>,
}

impl CitizenFields {
  /// Validate a JSON object from a request body.
  ///
  /// Fails with [`Error::EmptyFields`] for an empty map, with
  /// [`Error::UnknownField`] for any key outside the catalog, and with
  /// [`Error::InvalidValue`] for any value that does not fit its column.
  pub fn from_json(map: Map<String, Value>) -> Result<Self> {
    if map.is_empty() {
      return Err(Error::EmptyFields);
    }

    let assignments = map
      .into_iter()
      .map(|(name, value)| {
        if name == ID_COLUMN {
          return Err(Error::ReadOnlyField(name));
        }
        let column = columns::lookup(&name).ok_or(Error::UnknownField(name))?;
        Ok(Assignment { column, value: FieldValue::convert(column, value)? })
      })
      .collect::<Result<Vec<_>>>()?;

    Ok(Self { assignments })
  }

  pub fn iter(&self) -> impl Iterator<Item = &Assignment> { self.assignments.iter() }

  pub fn len(&self) -> usize { self.assignments.len() }

  /// Always `false` for a value built by [`CitizenFields::from_json`].
  pub fn is_empty(&self) -> bool { self.assignments.is_empty() }

  /// The value assigned to `name`, if the map contains it.
  pub fn get(&self, name: &str) -> Option<&FieldValue> {
    self
      .assignments
      .iter()
      .find(|a| a.column.name == name)
      .map(|a| &a.value)
  }
}
