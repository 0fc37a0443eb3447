//! Scalar SQL functions registered on every connection.

use rusqlite::{
  Connection,
  functions::FunctionFlags,
  types::{Value, ValueRef},
};

/// `fold_case(x)`: Unicode lowercase of a text value; other values pass
/// through unchanged. SQLite's own `LIKE` only folds ASCII letters.
pub const FOLD_CASE: &str = "fold_case";

pub fn register(conn: &Connection) -> rusqlite::Result<()> {
  conn.create_scalar_function(
    FOLD_CASE,
    1,
    FunctionFlags::SQLITE_UTF8 | FunctionFlags::SQLITE_DETERMINISTIC,
    |ctx| Ok(fold_case(ctx.get_raw(0))),
  )
}

fn fold_case(value: ValueRef<'_>) -> Value {
  match value {
    ValueRef::Text(bytes) => Value::Text(String::from_utf8_lossy(bytes).to_lowercase()),
    other => Value::from(other),
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn eval(conn: &Connection, sql: &str) -> Value {
    conn.query_row(sql, [], |row| row.get(0)).unwrap()
  }

  #[test]
  fn folds_non_ascii_text() {
    let conn = Connection::open_in_memory().unwrap();
    register(&conn).unwrap();
    assert_eq!(
      eval(&conn, "SELECT fold_case('Москва ÄÖÜ')"),
      Value::Text("москва äöü".into())
    );
  }

  #[test]
  fn non_text_passes_through() {
    let conn = Connection::open_in_memory().unwrap();
    register(&conn).unwrap();
    assert_eq!(eval(&conn, "SELECT fold_case(42)"), Value::Integer(42));
    assert_eq!(eval(&conn, "SELECT fold_case(NULL)"), Value::Null);
  }
}
