//! Encoding and decoding helpers between domain values and the storage
//! classes used in SQLite columns.
//!
//! Timestamps are stored as RFC 3339 strings, dates as `YYYY-MM-DD`, booleans
//! as 0/1, and list columns (including id lists) as compact JSON arrays.

use census_core::{
  citizen::Citizen,
  columns::{CITIZEN_COLUMNS, Column, ColumnKind},
  fields::{DATE_FORMAT, FieldValue},
  statistics::{Distribution, StatisticsSnapshot},
};
use chrono::{DateTime, Utc};
use rusqlite::types::Value as SqlValue;
use serde_json::{Map, Number, Value};

use crate::{Error, Result};

// ─── DateTime<Utc> ───────────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String { dt.to_rfc3339() }

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

// ─── Field values ────────────────────────────────────────────────────────────

/// The bound parameter for a validated field value.
pub fn encode_field(value: &FieldValue) -> Result<SqlValue> {
  Ok(match value {
    FieldValue::Null => SqlValue::Null,
    FieldValue::Text(s) => SqlValue::Text(s.clone()),
    FieldValue::Integer(i) => SqlValue::Integer(*i),
    FieldValue::Float(f) => SqlValue::Real(*f),
    FieldValue::Boolean(b) => SqlValue::Integer(i64::from(*b)),
    FieldValue::Date(d) => SqlValue::Text(d.format(DATE_FORMAT).to_string()),
    FieldValue::TextList(items) => SqlValue::Text(serde_json::to_string(items)?),
    FieldValue::IdList(ids) => SqlValue::Text(serde_json::to_string(ids)?),
  })
}

/// The JSON value of a stored column.
pub fn decode_column(column: &Column, raw: SqlValue) -> Result<Value> {
  match (column.kind, raw) {
    (_, SqlValue::Null) => Ok(Value::Null),
    (ColumnKind::Boolean, SqlValue::Integer(i)) => Ok(Value::Bool(i != 0)),
    (ColumnKind::TextList | ColumnKind::CitizenRefList, SqlValue::Text(s)) => {
      Ok(serde_json::from_str(&s)?)
    }
    (_, SqlValue::Integer(i)) => Ok(Value::from(i)),
    (_, SqlValue::Real(f)) => Number::from_f64(f)
      .map(Value::Number)
      .ok_or_else(|| Error::Decode(format!("{} holds a non-finite number", column.name))),
    (_, SqlValue::Text(s)) => Ok(Value::String(s)),
    (_, SqlValue::Blob(_)) => {
      Err(Error::Decode(format!("{} holds an unexpected blob", column.name)))
    }
  }
}

// ─── Row types ───────────────────────────────────────────────────────────────

/// Raw values read from a `citizens` row selected with
/// [`crate::query::CITIZEN_SELECT`]: the id followed by every catalogued column.
pub struct RawCitizen {
  pub id:     i64,
  pub values: Vec<SqlValue>,
}

impl RawCitizen {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    let id = row.get(0)?;
    let values = (1..=CITIZEN_COLUMNS.len())
      .map(|idx| row.get(idx))
      .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(Self { id, values })
  }

  pub fn into_citizen(self) -> Result<Citizen> {
    let fields = CITIZEN_COLUMNS
      .iter()
      .zip(self.values)
      .map(|(column, raw)| -> Result<(String, Value)> {
        Ok((column.name.to_owned(), decode_column(column, raw)?))
      })
      .collect::<Result<Map<_, _>>>()?;
    Ok(Citizen { id: self.id, fields })
  }
}

/// Raw values read directly from the `statistics` row.
pub struct RawSnapshot {
  pub id:                          i64,
  pub avg_age_male:                Option<f64>,
  pub avg_age_female:              Option<f64>,
  pub gender_distribution:         String,
  pub education_distribution:      String,
  pub marital_status_distribution: String,
  pub avg_salary:                  Option<f64>,
  pub avg_children_count:          Option<f64>,
  pub citizenship_distribution:    String,
  pub last_updated:                String,
}

impl RawSnapshot {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      id:                          row.get(0)?,
      avg_age_male:                row.get(1)?,
      avg_age_female:              row.get(2)?,
      gender_distribution:         row.get(3)?,
      education_distribution:      row.get(4)?,
      marital_status_distribution: row.get(5)?,
      avg_salary:                  row.get(6)?,
      avg_children_count:          row.get(7)?,
      citizenship_distribution:    row.get(8)?,
      last_updated:                row.get(9)?,
    })
  }

  pub fn into_snapshot(self) -> Result<StatisticsSnapshot> {
    Ok(StatisticsSnapshot {
      id:                          self.id,
      avg_age_male:                self.avg_age_male,
      avg_age_female:              self.avg_age_female,
      gender_distribution:         decode_distribution(&self.gender_distribution)?,
      education_distribution:      decode_distribution(&self.education_distribution)?,
      marital_status_distribution: decode_distribution(
        &self.marital_status_distribution,
      )?,
      avg_salary:                  self.avg_salary,
      avg_children_count:          self.avg_children_count,
      citizenship_distribution:    decode_distribution(&self.citizenship_distribution)?,
      last_updated:                decode_dt(&self.last_updated)?,
    })
  }
}

fn decode_distribution(s: &str) -> Result<Distribution> {
  Ok(serde_json::from_str(s)?)
}
