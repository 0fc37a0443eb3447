//! Statement builders.
//!
//! Column identifiers always come from the catalog, never from callers;
//! values are always bound as positional `?N` parameters.

use std::sync::LazyLock;

use census_core::{
  citizen::CitizenId,
  columns::{CITIZEN_COLUMNS, Column, ColumnKind, ID_COLUMN, SUMMARY_COLUMNS},
  fields::CitizenFields,
  filter::SearchFilter,
};
use rusqlite::types::Value as SqlValue;

use crate::{
  Result,
  encode::encode_field,
  functions::FOLD_CASE,
  schema::CITIZENS_TABLE,
};

/// `id` followed by every catalogued column, in catalog order. Rows selected
/// with this list decode with [`crate::encode::RawCitizen`].
pub static CITIZEN_SELECT: LazyLock<String> = LazyLock::new(|| {
  std::iter::once(ID_COLUMN)
    .chain(CITIZEN_COLUMNS.iter().map(|c| c.name))
    .map(quote_ident)
    .collect::<Vec<_>>()
    .join(", ")
});

/// SQL text plus its positional parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct Statement {
  pub sql:    String,
  pub params: Vec<SqlValue>,
}

pub fn quote_ident(name: &str) -> String {
  format!("\"{}\"", name.replace('"', "\"\""))
}

// ─── Fixed reads ─────────────────────────────────────────────────────────────

pub fn select_by_id() -> String {
  format!(
    "SELECT {} FROM {CITIZENS_TABLE} WHERE {} = ?1",
    *CITIZEN_SELECT,
    quote_ident(ID_COLUMN)
  )
}

pub fn count_all() -> String { format!("SELECT COUNT(*) FROM {CITIZENS_TABLE}") }

/// Summary projection; binds `?1` = limit, `?2` = offset.
pub fn select_slice() -> String {
  let columns = std::iter::once(ID_COLUMN)
    .chain(SUMMARY_COLUMNS)
    .map(quote_ident)
    .collect::<Vec<_>>()
    .join(", ");
  format!(
    "SELECT {columns} FROM {CITIZENS_TABLE} ORDER BY {} ASC LIMIT ?1 OFFSET ?2",
    quote_ident(ID_COLUMN)
  )
}

// ─── Dynamic writes ──────────────────────────────────────────────────────────

/// `INSERT` of exactly the supplied columns, returning the full row.
pub fn insert(fields: &CitizenFields) -> Result<Statement> {
  if fields.is_empty() {
    return Err(census_core::Error::EmptyFields.into());
  }

  let mut columns = Vec::with_capacity(fields.len());
  let mut placeholders = Vec::with_capacity(fields.len());
  let mut params = Vec::with_capacity(fields.len());

  for (idx, assignment) in fields.iter().enumerate() {
    columns.push(quote_ident(assignment.column.name));
    placeholders.push(format!("?{}", idx + 1));
    params.push(encode_field(&assignment.value)?);
  }

  let sql = format!(
    "INSERT INTO {CITIZENS_TABLE} ({}) VALUES ({}) RETURNING {}",
    columns.join(", "),
    placeholders.join(", "),
    *CITIZEN_SELECT
  );
  Ok(Statement { sql, params })
}

/// `UPDATE` of the supplied columns of one citizen, returning the full row.
/// The id is bound last.
pub fn update(id: CitizenId, fields: &CitizenFields) -> Result<Statement> {
  if fields.is_empty() {
    return Err(census_core::Error::EmptyFields.into());
  }

  let mut assignments = Vec::with_capacity(fields.len());
  let mut params = Vec::with_capacity(fields.len() + 1);

  for (idx, assignment) in fields.iter().enumerate() {
    assignments.push(format!("{} = ?{}", quote_ident(assignment.column.name), idx + 1));
    params.push(encode_field(&assignment.value)?);
  }
  params.push(SqlValue::Integer(id));

  let sql = format!(
    "UPDATE {CITIZENS_TABLE} SET {} WHERE {} = ?{} RETURNING {}",
    assignments.join(", "),
    quote_ident(ID_COLUMN),
    params.len(),
    *CITIZEN_SELECT
  );
  Ok(Statement { sql, params })
}

// ─── Search ──────────────────────────────────────────────────────────────────

/// Escape character used in every `LIKE` condition.
const LIKE_ESCAPE: char = '\\';

/// Wrap `needle` in wildcards, escaping any wildcard it contains so it
/// matches literally.
pub fn like_pattern(needle: &str) -> String {
  let mut pattern = String::with_capacity(needle.len() + 2);
  pattern.push('%');
  for ch in needle.chars() {
    if matches!(ch, '%' | '_' | LIKE_ESCAPE) {
      pattern.push(LIKE_ESCAPE);
    }
    pattern.push(ch);
  }
  pattern.push('%');
  pattern
}

/// Booleans are stored as 0/1, so textual booleans are translated first.
fn stored_needle<'a>(column: &Column, needle: &'a str) -> &'a str {
  match (column.kind, needle) {
    (ColumnKind::Boolean, "true") => "1",
    (ColumnKind::Boolean, "false") => "0",
    _ => needle,
  }
}

/// A conjunction of case-insensitive partial matches, or `None` when the
/// filter has no conditions. Both sides are folded with
/// [`FOLD_CASE`](crate::functions::FOLD_CASE) so non-ASCII letters compare
/// case-insensitively too.
pub fn search(filter: &SearchFilter) -> Option<Statement> {
  if filter.is_empty() {
    return None;
  }

  let mut conditions = Vec::with_capacity(filter.conditions().len());
  let mut params = Vec::with_capacity(filter.conditions().len());

  for (idx, condition) in filter.conditions().iter().enumerate() {
    conditions.push(format!(
      "{FOLD_CASE}({}) LIKE ?{} ESCAPE '{LIKE_ESCAPE}'",
      quote_ident(condition.column.name),
      idx + 1
    ));
    let needle = stored_needle(condition.column, &condition.needle).to_lowercase();
    params.push(SqlValue::Text(like_pattern(&needle)));
  }

  let sql = format!(
    "SELECT {} FROM {CITIZENS_TABLE} WHERE {} ORDER BY {} ASC",
    *CITIZEN_SELECT,
    conditions.join(" AND "),
    quote_ident(ID_COLUMN)
  );
  Some(Statement { sql, params })
}
