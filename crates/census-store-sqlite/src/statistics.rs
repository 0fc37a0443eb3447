//! Statistics aggregation.
//!
//! A single statement computes every aggregate over `citizens` and upserts
//! the result into the one-row `statistics` table. Because it is one
//! statement, readers see either the previous snapshot or the new one in
//! full, and it joins whatever transaction the caller has open.

use census_core::statistics::SNAPSHOT_ID;
use chrono::{DateTime, NaiveDate, Utc};
use rusqlite::{Connection, OptionalExtension as _, params};

use crate::encode::{RawSnapshot, encode_dt};

/// Reference instants for one recomputation.
#[derive(Debug, Clone)]
pub struct Stamp {
  /// Ages are counted in full years up to this date.
  pub today: String,
  pub now:   String,
}

impl Stamp {
  pub fn at(today: NaiveDate, now: DateTime<Utc>) -> Self {
    Self { today: today.format("%Y-%m-%d").to_string(), now: encode_dt(now) }
  }

  pub fn now() -> Self {
    let now = Utc::now();
    Self::at(now.date_naive(), now)
  }
}

/// Binds `?1` = today, `?2` = now, `?3` = snapshot id.
///
/// `averages` makes one pass for the four means; each distribution is a
/// grouped count folded into a JSON object, so categories without rows never
/// appear and an empty table yields `{}`.
const RECOMPUTE_SQL: &str = "
WITH
  aged AS (
    SELECT
      gender,
      salary,
      children_count,
      CAST(strftime('%Y', ?1) AS INTEGER) - CAST(strftime('%Y', birth_date) AS INTEGER)
        - (strftime('%m-%d', ?1) < strftime('%m-%d', birth_date)) AS age
    FROM citizens
  ),
  averages AS (
    SELECT
      AVG(CASE WHEN lower(gender) = 'male'   THEN age END) AS avg_age_male,
      AVG(CASE WHEN lower(gender) = 'female' THEN age END) AS avg_age_female,
      AVG(salary)                                          AS avg_salary,
      AVG(children_count)                                  AS avg_children_count
    FROM aged
  ),
  gender_dist AS (
    SELECT COALESCE(json_group_object(gender, n), '{}') AS dist
    FROM (SELECT gender, COUNT(*) AS n FROM citizens
          WHERE gender IS NOT NULL GROUP BY gender)
  ),
  education_dist AS (
    SELECT COALESCE(json_group_object(education_level, n), '{}') AS dist
    FROM (SELECT education_level, COUNT(*) AS n FROM citizens
          WHERE education_level IS NOT NULL GROUP BY education_level)
  ),
  marital_dist AS (
    SELECT COALESCE(json_group_object(marital_status, n), '{}') AS dist
    FROM (SELECT marital_status, COUNT(*) AS n FROM citizens
          WHERE marital_status IS NOT NULL GROUP BY marital_status)
  ),
  citizenship_dist AS (
    SELECT COALESCE(json_group_object(citizenship, n), '{}') AS dist
    FROM (SELECT citizenship, COUNT(*) AS n FROM citizens
          WHERE citizenship IS NOT NULL GROUP BY citizenship)
  )
INSERT INTO statistics (
  id,
  avg_age_male,
  avg_age_female,
  gender_distribution,
  education_distribution,
  marital_status_distribution,
  avg_salary,
  avg_children_count,
  citizenship_distribution,
  last_updated
)
SELECT
  ?3,
  averages.avg_age_male,
  averages.avg_age_female,
  gender_dist.dist,
  education_dist.dist,
  marital_dist.dist,
  averages.avg_salary,
  averages.avg_children_count,
  citizenship_dist.dist,
  ?2
FROM averages, gender_dist, education_dist, marital_dist, citizenship_dist
WHERE true
ON CONFLICT (id) DO UPDATE SET
  avg_age_male                = excluded.avg_age_male,
  avg_age_female              = excluded.avg_age_female,
  gender_distribution         = excluded.gender_distribution,
  education_distribution      = excluded.education_distribution,
  marital_status_distribution = excluded.marital_status_distribution,
  avg_salary                  = excluded.avg_salary,
  avg_children_count          = excluded.avg_children_count,
  citizenship_distribution    = excluded.citizenship_distribution,
  last_updated                = excluded.last_updated
";

const LATEST_SQL: &str = "
SELECT
  id, avg_age_male, avg_age_female,
  gender_distribution, education_distribution, marital_status_distribution,
  avg_salary, avg_children_count, citizenship_distribution, last_updated
FROM statistics
WHERE id = ?1
";

/// Recompute and upsert the snapshot on `conn`, which may be a transaction.
pub fn recompute(conn: &Connection, stamp: &Stamp) -> rusqlite::Result<()> {
  conn.execute(RECOMPUTE_SQL, params![stamp.today, stamp.now, SNAPSHOT_ID])?;
  Ok(())
}

pub fn latest(conn: &Connection) -> rusqlite::Result<Option<RawSnapshot>> {
  conn
    .query_row(LATEST_SQL, params![SNAPSHOT_ID], RawSnapshot::from_row)
    .optional()
}
