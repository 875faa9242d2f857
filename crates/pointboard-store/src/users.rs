//! CRUD operations for [`User`] rows.

use chrono::{DateTime, Utc};
use rusqlite::params;

use pointboard_shared::types::{User, UserId};

use crate::database::Database;
use crate::error::{Result, StoreError};

impl Database {
    // ------------------------------------------------------------------
    // Create
    // ------------------------------------------------------------------

    /// Insert a new user with zero points and return the stored row
    /// (including the store-assigned creation sequence).
    ///
    /// The caller is expected to have checked for duplicates via
    /// [`Database::find_user_by_name`]; the `COLLATE NOCASE` unique index is
    /// the backstop and surfaces as [`StoreError::DuplicateName`].
    pub fn create_user(
        &self,
        id: UserId,
        name: &str,
        created_at: DateTime<Utc>,
    ) -> Result<User> {
        self.conn()
            .execute(
                "INSERT INTO users (id, name, total_points, is_active, created_at)
                 VALUES (?1, ?2, 0, 1, ?3)",
                params![id.to_string(), name, created_at.to_rfc3339()],
            )
            .map_err(|e| match e {
                rusqlite::Error::SqliteFailure(err, _)
                    if err.code == rusqlite::ErrorCode::ConstraintViolation =>
                {
                    StoreError::DuplicateName
                }
                other => StoreError::Sqlite(other),
            })?;

        self.get_user(id)
    }

    // ------------------------------------------------------------------
    // Read
    // ------------------------------------------------------------------

    /// Fetch a single user by id, active or not.
    pub fn get_user(&self, id: UserId) -> Result<User> {
        self.conn()
            .query_row(
                "SELECT seq, id, name, total_points, is_active, created_at
                 FROM users
                 WHERE id = ?1",
                params![id.to_string()],
                row_to_user,
            )
            .map_err(|e| match e {
                rusqlite::Error::QueryReturnedNoRows => StoreError::NotFound,
                other => StoreError::Sqlite(other),
            })
    }

    /// Look up a user by name, case-insensitively, across active and
    /// inactive rows.  Returns `None` when the name is free.
    pub fn find_user_by_name(&self, name: &str) -> Result<Option<User>> {
        let result = self.conn().query_row(
            "SELECT seq, id, name, total_points, is_active, created_at
             FROM users
             WHERE name = ?1 COLLATE NOCASE",
            params![name],
            row_to_user,
        );

        match result {
            Ok(user) => Ok(Some(user)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(StoreError::Sqlite(e)),
        }
    }

    /// List all active users in creation order.
    ///
    /// The ranking engine applies its own sort; this ordering only needs to
    /// be stable.
    pub fn list_active_users(&self) -> Result<Vec<User>> {
        let mut stmt = self.conn().prepare(
            "SELECT seq, id, name, total_points, is_active, created_at
             FROM users
             WHERE is_active = 1
             ORDER BY seq ASC",
        )?;

        let rows = stmt.query_map([], row_to_user)?;

        let mut users = Vec::new();
        for row in rows {
            users.push(row?);
        }
        Ok(users)
    }

    /// Count all user rows, active and inactive.
    pub fn count_users(&self) -> Result<u64> {
        let count: i64 = self
            .conn()
            .query_row("SELECT COUNT(*) FROM users", [], |row| row.get(0))?;
        Ok(count as u64)
    }

    // ------------------------------------------------------------------
    // Update
    // ------------------------------------------------------------------

    /// Atomically add `points` to a user's total and return the updated row.
    ///
    /// The increment happens inside SQLite (`total_points = total_points + ?`),
    /// never as a read-modify-write on a stale snapshot, so concurrent awards
    /// to the same user cannot lose updates.
    pub fn add_points(&self, id: UserId, points: i64) -> Result<User> {
        let affected = self.conn().execute(
            "UPDATE users SET total_points = total_points + ?1 WHERE id = ?2",
            params![points, id.to_string()],
        )?;

        if affected == 0 {
            return Err(StoreError::NotFound);
        }

        self.get_user(id)
    }

    /// Soft-delete a user and return the updated row.
    ///
    /// The row is retained because history records reference it; the user
    /// merely drops out of the active set.
    pub fn deactivate_user(&self, id: UserId) -> Result<User> {
        let affected = self.conn().execute(
            "UPDATE users SET is_active = 0 WHERE id = ?1",
            params![id.to_string()],
        )?;

        if affected == 0 {
            return Err(StoreError::NotFound);
        }

        self.get_user(id)
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Map a `rusqlite::Row` to a [`User`].
fn row_to_user(row: &rusqlite::Row<'_>) -> rusqlite::Result<User> {
    let seq: i64 = row.get(0)?;
    let id_str: String = row.get(1)?;
    let name: String = row.get(2)?;
    let total_points: i64 = row.get(3)?;
    let is_active: bool = row.get(4)?;
    let created_str: String = row.get(5)?;

    let id = UserId::parse(&id_str).map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(1, rusqlite::types::Type::Text, Box::new(e))
    })?;

    let created_at: DateTime<Utc> = DateTime::parse_from_rfc3339(&created_str)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(5, rusqlite::types::Type::Text, Box::new(e))
        })?;

    Ok(User {
        id,
        name,
        total_points,
        is_active,
        created_at,
        created_seq: seq,
    })
}
