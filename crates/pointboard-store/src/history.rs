//! The append-only points history log: appends, paginated reads, and
//! aggregate statistics.

use chrono::{DateTime, Utc};
use rusqlite::params;
use uuid::Uuid;

use pointboard_shared::types::{
    HistoryPage, HistoryRecord, HistoryStats, OverallStats, Pagination, TopClaimer, UserId,
};

use crate::database::Database;
use crate::error::Result;

impl Database {
    /// Append a single award record.  Records are never updated or deleted.
    pub fn append_history(&self, record: &HistoryRecord) -> Result<()> {
        self.conn().execute(
            "INSERT INTO points_history (id, user_id, user_name, points_awarded, timestamp)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                record.id.to_string(),
                record.user_id.to_string(),
                record.user_name,
                record.points_awarded,
                record.timestamp.to_rfc3339(),
            ],
        )?;
        Ok(())
    }

    /// Read one page of history, newest first.
    ///
    /// `page` is 1-based; a page past the end of the log yields an empty
    /// record list, not an error.  Inputs below the minimum are clamped.
    pub fn list_history(&self, page: u32, limit: u32) -> Result<HistoryPage> {
        let page = page.max(1);
        let limit = limit.max(1);

        let total: i64 =
            self.conn()
                .query_row("SELECT COUNT(*) FROM points_history", [], |row| row.get(0))?;
        let total = total as u64;

        // Clamped to the log length: anything past the end is an empty page,
        // and the clamp keeps the i64 cast below from wrapping negative.
        let offset = (page as u64 - 1).saturating_mul(limit as u64).min(total);

        // rowid breaks timestamp ties so paging never reorders records.
        let mut stmt = self.conn().prepare(
            "SELECT id, user_id, user_name, points_awarded, timestamp
             FROM points_history
             ORDER BY timestamp DESC, rowid DESC
             LIMIT ?1 OFFSET ?2",
        )?;

        let rows = stmt.query_map(params![limit as i64, offset as i64], row_to_history)?;

        let mut records = Vec::new();
        for row in rows {
            records.push(row?);
        }

        Ok(HistoryPage {
            records,
            pagination: Pagination {
                current: page,
                pages: total.div_ceil(limit as u64),
                total,
                limit,
            },
        })
    }

    /// Aggregate statistics over the full history log.
    ///
    /// Computed from the log, not from live user totals; the two agree as
    /// long as every increment is paired with exactly one append.
    pub fn history_stats(&self) -> Result<HistoryStats> {
        let overall = self.conn().query_row(
            "SELECT COALESCE(SUM(points_awarded), 0),
                    COUNT(*),
                    COALESCE(AVG(points_awarded), 0.0)
             FROM points_history",
            [],
            |row| {
                Ok(OverallStats {
                    total_points_awarded: row.get(0)?,
                    total_claims: row.get(1)?,
                    average_points: row.get(2)?,
                })
            },
        )?;

        let mut stmt = self.conn().prepare(
            "SELECT user_id, user_name, COUNT(*), SUM(points_awarded) AS earned
             FROM points_history
             GROUP BY user_id
             ORDER BY earned DESC
             LIMIT 5",
        )?;

        let rows = stmt.query_map([], |row| {
            let user_id_str: String = row.get(0)?;
            Ok((
                user_id_str,
                row.get::<_, String>(1)?,
                row.get::<_, i64>(2)?,
                row.get::<_, i64>(3)?,
            ))
        })?;

        let mut top_claimers = Vec::new();
        for row in rows {
            let (user_id_str, user_name, total_claims, total_points_earned) = row?;
            top_claimers.push(TopClaimer {
                user_id: UserId::parse(&user_id_str)?,
                user_name,
                total_claims,
                total_points_earned,
            });
        }

        Ok(HistoryStats {
            overall,
            top_claimers,
        })
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Map a `rusqlite::Row` to a [`HistoryRecord`].
fn row_to_history(row: &rusqlite::Row<'_>) -> rusqlite::Result<HistoryRecord> {
    let id_str: String = row.get(0)?;
    let user_id_str: String = row.get(1)?;
    let user_name: String = row.get(2)?;
    let points_awarded: i64 = row.get(3)?;
    let ts_str: String = row.get(4)?;

    let id = Uuid::parse_str(&id_str).map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(0, rusqlite::types::Type::Text, Box::new(e))
    })?;
    let user_id = UserId::parse(&user_id_str).map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(1, rusqlite::types::Type::Text, Box::new(e))
    })?;

    let timestamp: DateTime<Utc> = DateTime::parse_from_rfc3339(&ts_str)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(4, rusqlite::types::Type::Text, Box::new(e))
        })?;

    Ok(HistoryRecord {
        id,
        user_id,
        user_name,
        points_awarded,
        timestamp,
    })
}
