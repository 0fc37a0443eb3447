//! SQL schema for the Census SQLite store.
//!
//! The `citizens` DDL is generated from the column catalog. There are no
//! migrations: each table is created once if it is absent, and an existing
//! table is never altered.

use std::fmt::Write as _;

use census_core::columns::{CITIZEN_COLUMNS, ColumnKind, ID_COLUMN};
use rusqlite::Connection;
use tracing::info;

use crate::query::quote_ident;

pub const CITIZENS_TABLE: &str = "citizens";
pub const STATISTICS_TABLE: &str = "statistics";

/// Connection-level settings applied before any existence check.
const PRAGMAS: &str = "
PRAGMA journal_mode = WAL;
";

/// Single-row table holding the current statistics snapshot.
/// Distributions are JSON objects of category → count.
const STATISTICS_DDL: &str = "
CREATE TABLE statistics (
    id                          INTEGER PRIMARY KEY CHECK (id = 1),
    avg_age_male                REAL,
    avg_age_female              REAL,
    gender_distribution         TEXT NOT NULL DEFAULT '{}',
    education_distribution      TEXT NOT NULL DEFAULT '{}',
    marital_status_distribution TEXT NOT NULL DEFAULT '{}',
    avg_salary                  REAL,
    avg_children_count          REAL,
    citizenship_distribution    TEXT NOT NULL DEFAULT '{}',
    last_updated                TEXT NOT NULL   -- RFC 3339 UTC
);
";

/// SQLite storage class used for each column kind. Lists are JSON arrays,
/// booleans are 0/1 and dates are `YYYY-MM-DD` text.
fn sql_type(kind: ColumnKind) -> &'static str {
  match kind {
    ColumnKind::Integer | ColumnKind::Boolean | ColumnKind::CitizenRef => {
      "INTEGER"
    }
    ColumnKind::Float => "REAL",
    ColumnKind::Text
    | ColumnKind::Date
    | ColumnKind::TextList
    | ColumnKind::CitizenRefList => "TEXT",
  }
}

/// `CREATE TABLE citizens (...)` for the full catalog.
pub fn citizens_ddl() -> String {
  let mut ddl = format!(
    "CREATE TABLE {CITIZENS_TABLE} (\n    {} INTEGER PRIMARY KEY AUTOINCREMENT",
    quote_ident(ID_COLUMN)
  );
  for column in CITIZEN_COLUMNS {
    let not_null = if column.required { " NOT NULL" } else { "" };
    // Writing to a String cannot fail.
    let _ = write!(
      ddl,
      ",\n    {} {}{not_null}",
      quote_ident(column.name),
      sql_type(column.kind)
    );
  }
  ddl.push_str("\n);");
  ddl
}

// ─── Bootstrap ───────────────────────────────────────────────────────────────

/// Which tables a [`bootstrap`] run had to create.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BootstrapReport {
  pub citizens_created:   bool,
  pub statistics_created: bool,
}

/// Ensure both tables exist. Running against an initialised database only
/// performs the existence checks.
pub fn bootstrap(conn: &Connection) -> rusqlite::Result<BootstrapReport> {
  conn.execute_batch(PRAGMAS)?;
  Ok(BootstrapReport {
    citizens_created:   ensure_table(conn, CITIZENS_TABLE, &citizens_ddl())?,
    statistics_created: ensure_table(conn, STATISTICS_TABLE, STATISTICS_DDL)?,
  })
}

fn table_exists(conn: &Connection, name: &str) -> rusqlite::Result<bool> {
  conn.query_row(
    "SELECT EXISTS (SELECT 1 FROM sqlite_master WHERE type = 'table' AND name = ?1)",
    [name],
    |row| row.get(0),
  )
}

/// Returns `true` if the table had to be created.
fn ensure_table(
  conn: &Connection,
  name: &str,
  ddl: &str,
) -> rusqlite::Result<bool> {
  if table_exists(conn, name)? {
    info!(table = name, "table already exists");
    return Ok(false);
  }

  info!(table = name, "creating table");
  conn.execute_batch(ddl)?;
  info!(table = name, "table created");
  Ok(true)
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn citizens_ddl_covers_catalog() {
    let ddl = citizens_ddl();
    assert!(ddl.contains("\"id\" INTEGER PRIMARY KEY AUTOINCREMENT"));
    assert!(ddl.contains("\"first_name\" TEXT NOT NULL"));
    assert!(ddl.contains("\"salary\" INTEGER,"));
    assert!(ddl.contains("\"ring_size\" REAL,"));
    assert!(ddl.contains("\"children\" TEXT,"));
    assert_eq!(ddl.matches(" NOT NULL").count(), 20);
  }

  #[test]
  fn bootstrap_is_idempotent() {
    let conn = Connection::open_in_memory().unwrap();

    let first = bootstrap(&conn).unwrap();
    assert!(first.citizens_created && first.statistics_created);

    let second = bootstrap(&conn).unwrap();
    assert_eq!(second, BootstrapReport::default());
  }

  #[test]
  fn bootstrap_leaves_existing_tables_alone() {
    let conn = Connection::open_in_memory().unwrap();
    conn
      .execute_batch("CREATE TABLE citizens (id INTEGER PRIMARY KEY, legacy TEXT);")
      .unwrap();

    let report = bootstrap(&conn).unwrap();
    assert!(!report.citizens_created);
    assert!(report.statistics_created);

    // The narrower legacy table was not retrofitted.
    let has_first_name: bool = conn
      .query_row(
        "SELECT EXISTS (SELECT 1 FROM pragma_table_info('citizens') WHERE name = 'first_name')",
        [],
        |row| row.get(0),
      )
      .unwrap();
    assert!(!has_first_name);
  }
}
