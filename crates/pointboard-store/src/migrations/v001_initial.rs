//! v001 -- Initial schema creation.
//!
//! Creates the two core tables: `users` and `points_history`.

use rusqlite::Connection;

/// SQL executed when upgrading from version 0 to version 1.
const UP_SQL: &str = r#"
-- ----------------------------------------------------------------
-- Users
-- ----------------------------------------------------------------
-- `seq` is a monotonic insertion counter; rankings use it to break
-- point ties deterministically.  Rows are never deleted, only
-- deactivated, because points_history references them.
CREATE TABLE IF NOT EXISTS users (
    seq          INTEGER PRIMARY KEY AUTOINCREMENT,
    id           TEXT NOT NULL UNIQUE,               -- UUID v4
    name         TEXT NOT NULL UNIQUE COLLATE NOCASE,
    total_points INTEGER NOT NULL DEFAULT 0 CHECK (total_points >= 0),
    is_active    INTEGER NOT NULL DEFAULT 1,         -- boolean 0/1
    created_at   TEXT NOT NULL                       -- ISO-8601 / RFC-3339
);

CREATE INDEX IF NOT EXISTS idx_users_points ON users(total_points DESC);

-- ----------------------------------------------------------------
-- Points history (append-only)
-- ----------------------------------------------------------------
CREATE TABLE IF NOT EXISTS points_history (
    id             TEXT PRIMARY KEY NOT NULL,        -- UUID v4
    user_id        TEXT NOT NULL,                    -- FK -> users(id)
    user_name      TEXT NOT NULL,                    -- denormalized at award time
    points_awarded INTEGER NOT NULL CHECK (points_awarded BETWEEN 1 AND 10),
    timestamp      TEXT NOT NULL,                    -- ISO-8601

    FOREIGN KEY (user_id) REFERENCES users(id)
);

CREATE INDEX IF NOT EXISTS idx_history_timestamp
    ON points_history(timestamp DESC);

CREATE INDEX IF NOT EXISTS idx_history_user_id ON points_history(user_id);
"#;

/// Apply the initial migration.
pub fn up(conn: &Connection) -> Result<(), rusqlite::Error> {
    conn.execute_batch(UP_SQL)
}
