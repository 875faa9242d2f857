//! Domain model structs shared between the store, the service layer, and the
//! wire protocol.
//!
//! Every struct derives `Serialize` and `Deserialize` with camelCase field
//! names so it can be handed directly to HTTP and WebSocket clients.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ---------------------------------------------------------------------------
// UserId
// ---------------------------------------------------------------------------

/// Unique user identifier (UUID v4), assigned at creation.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct UserId(pub Uuid);

impl UserId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn parse(s: &str) -> Result<Self, uuid::Error> {
        Uuid::parse_str(s).map(Self)
    }
}

impl Default for UserId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for UserId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// User
// ---------------------------------------------------------------------------

/// A leaderboard participant.
///
/// `total_points` only ever grows; deactivation flips `is_active` instead of
/// deleting the row, so history records keep a valid back-reference.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: UserId,
    pub name: String,
    pub total_points: i64,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    /// Monotonic insertion sequence assigned by the store.  Used as the
    /// deterministic tie-break key when two users hold equal points.
    pub created_seq: i64,
}

// ---------------------------------------------------------------------------
// RankedUser
// ---------------------------------------------------------------------------

/// A [`User`] annotated with its dense 1-based rank.
///
/// Derived on every recomputation, never persisted; only valid for the
/// active-user snapshot it was computed from.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RankedUser {
    #[serde(flatten)]
    pub user: User,
    pub rank: u32,
}

// ---------------------------------------------------------------------------
// HistoryRecord
// ---------------------------------------------------------------------------

/// One award event: who was awarded how many points, and when.
///
/// `user_name` is denormalized at award time so the log stays readable even
/// after the user is deactivated.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct HistoryRecord {
    pub id: Uuid,
    pub user_id: UserId,
    pub user_name: String,
    /// Always within `[1, 10]`.
    pub points_awarded: i64,
    pub timestamp: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// History pagination
// ---------------------------------------------------------------------------

/// Caller-side pagination metadata for a history page.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Pagination {
    /// The requested page (1-based).
    pub current: u32,
    /// Total number of pages at this limit.
    pub pages: u64,
    /// Total number of records in the log.
    pub total: u64,
    pub limit: u32,
}

/// A single page of history records, newest first.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct HistoryPage {
    pub records: Vec<HistoryRecord>,
    pub pagination: Pagination,
}

// ---------------------------------------------------------------------------
// History statistics
// ---------------------------------------------------------------------------

/// Aggregates over the full history log.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct OverallStats {
    pub total_points_awarded: i64,
    pub total_claims: i64,
    pub average_points: f64,
}

/// One entry of the top-5 leaderboard computed from history (not from live
/// totals -- the two agree as long as every increment flows through the log).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct TopClaimer {
    pub user_id: UserId,
    pub user_name: String,
    pub total_claims: i64,
    pub total_points_earned: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct HistoryStats {
    pub overall: OverallStats,
    pub top_claimers: Vec<TopClaimer>,
}
