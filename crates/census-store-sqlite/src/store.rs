//! [`SqliteStore`] — the SQLite implementation of [`CitizenStore`].

use std::{path::Path, sync::Arc};

use chrono::{DateTime, NaiveDate, Utc};
use rusqlite::{InterruptHandle, OptionalExtension as _, params, params_from_iter};
use tracing::{debug, info};

use census_core::{
  citizen::{Citizen, CitizenId, CitizenPage, CitizenSummary},
  fields::CitizenFields,
  filter::SearchFilter,
  statistics::StatisticsSnapshot,
  store::{CitizenStore, StatisticsRefresh},
};

use crate::{
  Error, Result,
  cancel::{CancelOnDrop, QueryTicket},
  encode::RawCitizen,
  functions,
  query::{self, Statement},
  schema::{self, BootstrapReport},
  statistics::{self, Stamp},
};

// ─── Store ───────────────────────────────────────────────────────────────────

/// A citizen registry backed by a single SQLite file.
///
/// Cloning is cheap — the inner connection is reference-counted. Every call
/// runs on the connection's own thread, so the connection is released when
/// the call returns on every path, and a transaction left uncommitted by an
/// error is rolled back when it is dropped. A search whose future is dropped
/// is skipped or interrupted on the connection thread.
#[derive(Clone)]
pub struct SqliteStore {
  pub(crate) conn: tokio_rusqlite::Connection,
  interrupt:       Arc<InterruptHandle>,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and bootstrap its schema.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    Self::prepare(tokio_rusqlite::Connection::open(path).await?).await
  }

  /// Open an in-memory store — useful for testing.
  pub async fn open_in_memory() -> Result<Self> {
    Self::prepare(tokio_rusqlite::Connection::open_in_memory().await?).await
  }

  async fn prepare(conn: tokio_rusqlite::Connection) -> Result<Self> {
    let interrupt = conn
      .call(|conn| {
        functions::register(conn)?;
        Ok(conn.get_interrupt_handle())
      })
      .await?;
    let store = Self { conn, interrupt: Arc::new(interrupt) };
    store.bootstrap().await?;
    Ok(store)
  }

  /// Create whichever tables are missing.
  pub async fn bootstrap(&self) -> Result<BootstrapReport> {
    let report = self
      .conn
      .call(|conn| Ok(schema::bootstrap(conn)?))
      .await?;
    debug!(?report, "schema bootstrap finished");
    Ok(report)
  }

  /// Recompute the snapshot as of the given instants.
  pub async fn recompute_statistics_at(
    &self,
    today: NaiveDate,
    now: DateTime<Utc>,
  ) -> Result<StatisticsSnapshot> {
    let stamp = Stamp::at(today, now);

    let raw = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        statistics::recompute(&tx, &stamp)?;
        let raw = statistics::latest(&tx)?;
        tx.commit()?;
        Ok(raw)
      })
      .await?;

    let snapshot = raw
      .ok_or_else(|| Error::Decode("statistics row missing after upsert".into()))?
      .into_snapshot()?;
    info!(last_updated = %snapshot.last_updated, "statistics updated");
    Ok(snapshot)
  }

  /// Run a `... RETURNING` write, optionally recomputing statistics in the
  /// same transaction. Returns `None` if the statement matched no row, in
  /// which case statistics are left untouched.
  async fn write_citizen(
    &self,
    stmt: Statement,
    refresh: StatisticsRefresh,
  ) -> Result<Option<Citizen>> {
    let Statement { sql, params } = stmt;
    let stamp = Stamp::now();
    debug!(%sql, params = params.len(), "executing citizen write");

    let raw = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        let raw = tx
          .query_row(&sql, params_from_iter(params), RawCitizen::from_row)
          .optional()?;
        if raw.is_some() && refresh == StatisticsRefresh::Transactional {
          statistics::recompute(&tx, &stamp)?;
        }
        tx.commit()?;
        Ok(raw)
      })
      .await?;

    raw.map(RawCitizen::into_citizen).transpose()
  }
}

// ─── CitizenStore impl ───────────────────────────────────────────────────────

impl CitizenStore for SqliteStore {
  type Error = Error;

  // ── Reads ─────────────────────────────────────────────────────────────────

  async fn get_citizen(&self, id: CitizenId) -> Result<Option<Citizen>> {
    let sql = query::select_by_id();

    let raw = self
      .conn
      .call(move |conn| {
        Ok(conn.query_row(&sql, params![id], RawCitizen::from_row).optional()?)
      })
      .await?;

    raw.map(RawCitizen::into_citizen).transpose()
  }

  async fn citizen_slice(
    &self,
    offset: u64,
    limit: u64,
  ) -> Result<CitizenPage<CitizenSummary>> {
    let count_sql = query::count_all();
    let slice_sql = query::select_slice();
    let offset = i64::try_from(offset).unwrap_or(i64::MAX);
    let limit = i64::try_from(limit).unwrap_or(i64::MAX);

    let (total, citizens) = self
      .conn
      .call(move |conn| {
        let total: i64 = conn.query_row(&count_sql, [], |row| row.get(0))?;
        if limit == 0 {
          return Ok((total, Vec::new()));
        }

        let mut stmt = conn.prepare(&slice_sql)?;
        let citizens = stmt
          .query_map(params![limit, offset], |row| {
            Ok(CitizenSummary {
              id:         row.get(0)?,
              first_name: row.get(1)?,
              last_name:  row.get(2)?,
              birth_date: row.get(3)?,
              address:    row.get(4)?,
            })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok((total, citizens))
      })
      .await?;

    Ok(CitizenPage {
      citizens,
      total_count: u64::try_from(total).unwrap_or_default(),
    })
  }

  async fn search_citizens(&self, filter: SearchFilter) -> Result<Vec<Citizen>> {
    let Some(Statement { sql, params }) = query::search(&filter) else {
      return Ok(Vec::new());
    };
    debug!(%sql, params = params.len(), "executing citizen search");

    let ticket = QueryTicket::new(Arc::clone(&self.interrupt));
    let _guard = CancelOnDrop(Arc::clone(&ticket));

    let raws = self
      .conn
      .call(move |conn| {
        if !ticket.begin() {
          return Ok(Vec::new());
        }
        let rows = (|| {
          let mut stmt = conn.prepare(&sql)?;
          let rows = stmt
            .query_map(params_from_iter(params), RawCitizen::from_row)?
            .collect::<rusqlite::Result<Vec<_>>>();
          rows
        })();
        ticket.finish();
        Ok(rows?)
      })
      .await?;

    raws.into_iter().map(RawCitizen::into_citizen).collect()
  }

  // ── Writes ────────────────────────────────────────────────────────────────

  async fn create_citizen(
    &self,
    fields: CitizenFields,
    refresh: StatisticsRefresh,
  ) -> Result<Citizen> {
    let stmt = query::insert(&fields)?;
    let citizen = self
      .write_citizen(stmt, refresh)
      .await?
      .ok_or_else(|| Error::Decode("insert returned no row".into()))?;
    info!(id = citizen.id, ?refresh, "citizen created");
    Ok(citizen)
  }

  async fn update_citizen(
    &self,
    id: CitizenId,
    fields: CitizenFields,
    refresh: StatisticsRefresh,
  ) -> Result<Option<Citizen>> {
    let stmt = query::update(id, &fields)?;
    let citizen = self.write_citizen(stmt, refresh).await?;
    match &citizen {
      Some(_) => info!(id, ?refresh, "citizen updated"),
      None => debug!(id, "update matched no citizen"),
    }
    Ok(citizen)
  }

  // ── Statistics ────────────────────────────────────────────────────────────

  async fn recompute_statistics(&self) -> Result<StatisticsSnapshot> {
    let now = Utc::now();
    self.recompute_statistics_at(now.date_naive(), now).await
  }

  async fn latest_statistics(&self) -> Result<Option<StatisticsSnapshot>> {
    let raw = self
      .conn
      .call(|conn| Ok(statistics::latest(conn)?))
      .await?;
    raw.map(|r| r.into_snapshot()).transpose()
  }
}
