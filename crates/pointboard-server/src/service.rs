//! The leaderboard service: the award pipeline, user administration, and
//! history queries.
//!
//! All mutation of the user table and history log flows through this module.
//! The service holds explicit handles to its collaborators (store,
//! notification channel, randomness source), injected at construction.

use std::sync::Arc;

use chrono::Utc;
use serde::Serialize;
use tokio::sync::Mutex;
use uuid::Uuid;

use pointboard_shared::name::normalize_name;
use pointboard_shared::protocol::RankingsSnapshot;
use pointboard_shared::ranking::compute_rankings;
use pointboard_shared::types::{
    HistoryPage, HistoryRecord, HistoryStats, RankedUser, User, UserId,
};
use pointboard_store::Database;

use crate::award::{PointSource, MAX_AWARD, MIN_AWARD};
use crate::broadcast::RankingUpdates;
use crate::error::ServiceError;

type Result<T> = std::result::Result<T, ServiceError>;

/// Outcome of a successful claim, returned to the caller.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClaimOutcome {
    pub user: User,
    pub points_awarded: i64,
    pub new_total_points: i64,
}

/// The leaderboard service.
///
/// The store sits behind a `Mutex`, so each mutation (claim, add,
/// deactivate) runs as one critical section: the atomic SQL increment, its
/// history append, and the ranking recompute all observe a consistent state.
/// Concurrent claims for the same user serialize here and at the SQL add,
/// so no update is ever lost.
#[derive(Clone)]
pub struct Leaderboard {
    db: Arc<Mutex<Database>>,
    updates: RankingUpdates,
    points: Arc<dyn PointSource>,
}

impl Leaderboard {
    pub fn new(
        db: Arc<Mutex<Database>>,
        updates: RankingUpdates,
        points: Arc<dyn PointSource>,
    ) -> Self {
        Self {
            db,
            updates,
            points,
        }
    }

    /// The notification channel this service publishes to.
    pub fn updates(&self) -> &RankingUpdates {
        &self.updates
    }

    // ------------------------------------------------------------------
    // Award pipeline
    // ------------------------------------------------------------------

    /// Award random points to an active user.
    ///
    /// Pipeline: validate the user is active, draw from the point source,
    /// atomically increment, append the history record, recompute rankings,
    /// broadcast.  A history-append failure after the increment committed is
    /// surfaced as [`ServiceError::HistoryAppendFailed`] with the increment
    /// retained.  Broadcast failures never fail the claim.
    pub async fn claim_points(&self, user_id: UserId) -> Result<ClaimOutcome> {
        let outcome = {
            let db = self.db.lock().await;

            let user = db.get_user(user_id)?;
            if !user.is_active {
                return Err(ServiceError::InactiveUser);
            }

            let points_awarded = self.points.draw();
            if !(MIN_AWARD..=MAX_AWARD).contains(&points_awarded) {
                return Err(ServiceError::AwardOutOfRange(points_awarded));
            }

            let user = db.add_points(user_id, points_awarded)?;

            let record = HistoryRecord {
                id: Uuid::new_v4(),
                user_id,
                user_name: user.name.clone(),
                points_awarded,
                timestamp: Utc::now(),
            };
            if let Err(source) = db.append_history(&record) {
                // The increment is already committed and stays authoritative.
                tracing::error!(
                    user = %user_id,
                    points = points_awarded,
                    error = %source,
                    "history append failed after a committed increment"
                );
                return Err(ServiceError::HistoryAppendFailed {
                    user_id,
                    points_awarded,
                    source,
                });
            }

            let snapshot = RankingsSnapshot::new(compute_rankings(db.list_active_users()?));
            // Published while still holding the lock so observers see
            // snapshots in commit order.  `publish` never blocks.
            self.updates.publish(snapshot);

            let new_total_points = user.total_points;
            ClaimOutcome {
                user,
                points_awarded,
                new_total_points,
            }
        };

        tracing::info!(
            user = %outcome.user.name,
            points = outcome.points_awarded,
            total = outcome.new_total_points,
            "points claimed"
        );

        Ok(outcome)
    }

    // ------------------------------------------------------------------
    // User admin
    // ------------------------------------------------------------------

    /// Create a user with zero points.
    ///
    /// The name is trimmed and length-checked, then probed for a
    /// case-insensitive collision across active and inactive users, all
    /// before any write.  Rankings are rebroadcast so observers pick up the
    /// new member.
    pub async fn add_user(&self, raw_name: &str) -> Result<User> {
        let name = normalize_name(raw_name)?;

        let user = {
            let db = self.db.lock().await;

            if db.find_user_by_name(&name)?.is_some() {
                return Err(ServiceError::DuplicateName);
            }

            let user = db.create_user(UserId::new(), &name, Utc::now())?;
            let snapshot = RankingsSnapshot::new(compute_rankings(db.list_active_users()?));
            self.updates.publish(snapshot);
            user
        };

        tracing::info!(user = %user.name, id = %user.id, "user created");

        Ok(user)
    }

    /// Soft-delete a user.  The row is kept for history integrity; the user
    /// drops out of the active ranking and everyone below shifts up a rank.
    pub async fn deactivate_user(&self, user_id: UserId) -> Result<User> {
        let user = {
            let db = self.db.lock().await;
            let user = db.deactivate_user(user_id)?;
            let snapshot = RankingsSnapshot::new(compute_rankings(db.list_active_users()?));
            self.updates.publish(snapshot);
            user
        };

        tracing::info!(user = %user.name, id = %user.id, "user deactivated");

        Ok(user)
    }

    // ------------------------------------------------------------------
    // Queries
    // ------------------------------------------------------------------

    /// Fetch any user by id, active or not.
    pub async fn get_user(&self, user_id: UserId) -> Result<User> {
        let db = self.db.lock().await;
        Ok(db.get_user(user_id)?)
    }

    /// The current ranked active-user list.
    pub async fn list_users(&self) -> Result<Vec<RankedUser>> {
        let db = self.db.lock().await;
        Ok(compute_rankings(db.list_active_users()?))
    }

    /// One page of award history, newest first.
    pub async fn history(&self, page: u32, limit: u32) -> Result<HistoryPage> {
        let db = self.db.lock().await;
        Ok(db.list_history(page, limit)?)
    }

    /// Aggregates over the full history log.
    pub async fn stats(&self) -> Result<HistoryStats> {
        let db = self.db.lock().await;
        Ok(db.history_stats()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;
    use tokio::sync::broadcast::error::TryRecvError;

    /// Point source that replays a fixed sequence, then falls back to 1.
    struct FixedPointSource {
        values: std::sync::Mutex<VecDeque<i64>>,
    }

    impl FixedPointSource {
        fn new(values: impl IntoIterator<Item = i64>) -> Self {
            Self {
                values: std::sync::Mutex::new(values.into_iter().collect()),
            }
        }
    }

    impl PointSource for FixedPointSource {
        fn draw(&self) -> i64 {
            self.values.lock().unwrap().pop_front().unwrap_or(1)
        }
    }

    fn leaderboard_with(points: impl IntoIterator<Item = i64>) -> (tempfile::TempDir, Leaderboard) {
        let dir = tempfile::tempdir().unwrap();
        let db = Database::open_at(&dir.path().join("test.db")).unwrap();
        let service = Leaderboard::new(
            Arc::new(Mutex::new(db)),
            RankingUpdates::new(),
            Arc::new(FixedPointSource::new(points)),
        );
        (dir, service)
    }

    #[tokio::test]
    async fn claim_awards_points_and_appends_history() {
        let (_dir, board) = leaderboard_with([6]);
        let user = board.add_user("Rahul").await.unwrap();

        let outcome = board.claim_points(user.id).await.unwrap();
        assert_eq!(outcome.points_awarded, 6);
        assert_eq!(outcome.new_total_points, 6);
        assert_eq!(outcome.user.total_points, 6);

        let page = board.history(1, 10).await.unwrap();
        assert_eq!(page.pagination.total, 1);
        assert_eq!(page.records[0].user_id, user.id);
        assert_eq!(page.records[0].user_name, "Rahul");
        assert_eq!(page.records[0].points_awarded, 6);
    }

    #[tokio::test]
    async fn claim_broadcasts_updated_rankings() {
        let (_dir, board) = leaderboard_with([4]);
        let user = board.add_user("Kamal").await.unwrap();

        let mut rx = board.updates().subscribe();
        board.claim_points(user.id).await.unwrap();

        let snapshot = rx.recv().await.unwrap();
        assert_eq!(snapshot.users.len(), 1);
        assert_eq!(snapshot.users[0].user.total_points, 4);
        assert_eq!(snapshot.users[0].rank, 1);
    }

    #[tokio::test]
    async fn claim_overtakes_tied_leaders() {
        // A(0), B(5), C(5) created in that order: B 1st, C 2nd, A 3rd.
        // A claims 6 and takes first place.
        let (_dir, board) = leaderboard_with([5, 5, 6]);
        let a = board.add_user("A1").await.unwrap();
        let b = board.add_user("B1").await.unwrap();
        let c = board.add_user("C1").await.unwrap();

        board.claim_points(b.id).await.unwrap();
        board.claim_points(c.id).await.unwrap();

        let before = board.list_users().await.unwrap();
        let names: Vec<&str> = before.iter().map(|r| r.user.name.as_str()).collect();
        assert_eq!(names, ["B1", "C1", "A1"]);

        board.claim_points(a.id).await.unwrap();

        let after = board.list_users().await.unwrap();
        let names: Vec<&str> = after.iter().map(|r| r.user.name.as_str()).collect();
        assert_eq!(names, ["A1", "B1", "C1"]);
        assert_eq!(after[0].user.total_points, 6);
    }

    #[tokio::test]
    async fn claim_for_missing_user_fails_without_side_effects() {
        let (_dir, board) = leaderboard_with([3]);
        let mut rx = board.updates().subscribe();

        let result = board.claim_points(UserId::new()).await;
        assert!(matches!(result, Err(ServiceError::UserNotFound)));

        assert_eq!(board.stats().await.unwrap().overall.total_claims, 0);
        assert!(matches!(rx.try_recv(), Err(TryRecvError::Empty)));
    }

    #[tokio::test]
    async fn claim_for_deactivated_user_is_rejected() {
        let (_dir, board) = leaderboard_with([3]);
        let user = board.add_user("Priya").await.unwrap();
        board.deactivate_user(user.id).await.unwrap();

        let mut rx = board.updates().subscribe();
        let result = board.claim_points(user.id).await;
        assert!(matches!(result, Err(ServiceError::InactiveUser)));

        // No history record, no broadcast.
        assert_eq!(board.stats().await.unwrap().overall.total_claims, 0);
        assert!(matches!(rx.try_recv(), Err(TryRecvError::Empty)));
    }

    #[tokio::test]
    async fn out_of_range_point_source_is_rejected_before_mutation() {
        let (_dir, board) = leaderboard_with([11]);
        let user = board.add_user("Amit").await.unwrap();

        let result = board.claim_points(user.id).await;
        assert!(matches!(result, Err(ServiceError::AwardOutOfRange(11))));

        let unchanged = board.get_user(user.id).await.unwrap();
        assert_eq!(unchanged.total_points, 0);
    }

    #[tokio::test]
    async fn add_user_validates_trims_and_rejects_duplicates() {
        let (_dir, board) = leaderboard_with([]);

        let al = board.add_user("Al").await.unwrap();
        assert_eq!(al.name, "Al");
        assert_eq!(al.total_points, 0);
        assert!(al.is_active);

        assert!(matches!(
            board.add_user("A").await,
            Err(ServiceError::InvalidName(_))
        ));
        assert!(matches!(
            board.add_user("Al").await,
            Err(ServiceError::DuplicateName)
        ));
        assert!(matches!(
            board.add_user("  Al  ").await,
            Err(ServiceError::DuplicateName)
        ));
        assert!(matches!(
            board.add_user("AL").await,
            Err(ServiceError::DuplicateName)
        ));
    }

    #[tokio::test]
    async fn duplicate_check_spans_deactivated_users() {
        let (_dir, board) = leaderboard_with([]);

        let user = board.add_user("Sneha").await.unwrap();
        board.deactivate_user(user.id).await.unwrap();

        assert!(matches!(
            board.add_user("sneha").await,
            Err(ServiceError::DuplicateName)
        ));
    }

    #[tokio::test]
    async fn add_user_broadcasts_membership_change() {
        let (_dir, board) = leaderboard_with([]);
        let mut rx = board.updates().subscribe();

        board.add_user("Ravi").await.unwrap();

        let snapshot = rx.recv().await.unwrap();
        assert_eq!(snapshot.users.len(), 1);
        assert_eq!(snapshot.users[0].user.name, "Ravi");
    }

    #[tokio::test]
    async fn deactivation_shifts_lower_ranks_up() {
        let (_dir, board) = leaderboard_with([9, 5, 2]);
        let first = board.add_user("First").await.unwrap();
        let second = board.add_user("Second").await.unwrap();
        let third = board.add_user("Third").await.unwrap();

        board.claim_points(first.id).await.unwrap();
        board.claim_points(second.id).await.unwrap();
        board.claim_points(third.id).await.unwrap();

        board.deactivate_user(first.id).await.unwrap();

        let ranked = board.list_users().await.unwrap();
        assert_eq!(ranked.len(), 2);
        assert_eq!(ranked[0].user.id, second.id);
        assert_eq!(ranked[0].rank, 1);
        assert_eq!(ranked[1].user.id, third.id);
        assert_eq!(ranked[1].rank, 2);
    }

    #[tokio::test]
    async fn deactivate_missing_user_is_not_found() {
        let (_dir, board) = leaderboard_with([]);
        assert!(matches!(
            board.deactivate_user(UserId::new()).await,
            Err(ServiceError::UserNotFound)
        ));
    }

    #[tokio::test]
    async fn list_users_is_idempotent_without_mutation() {
        let (_dir, board) = leaderboard_with([7]);
        let user = board.add_user("Pooja").await.unwrap();
        board.claim_points(user.id).await.unwrap();

        let first = board.list_users().await.unwrap();
        let second = board.list_users().await.unwrap();
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn get_user_returns_deactivated_rows() {
        let (_dir, board) = leaderboard_with([]);
        let user = board.add_user("Vikram").await.unwrap();
        board.deactivate_user(user.id).await.unwrap();

        let fetched = board.get_user(user.id).await.unwrap();
        assert_eq!(fetched.id, user.id);
        assert!(!fetched.is_active);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_claims_lose_no_updates() {
        let (_dir, board) = leaderboard_with(1..=10);
        let user = board.add_user("Anita").await.unwrap();

        let mut tasks = Vec::new();
        for _ in 0..10 {
            let board = board.clone();
            let id = user.id;
            tasks.push(tokio::spawn(async move {
                board.claim_points(id).await.unwrap().points_awarded
            }));
        }

        let mut awarded_sum = 0;
        for task in tasks {
            awarded_sum += task.await.unwrap();
        }

        let final_user = board.get_user(user.id).await.unwrap();
        assert_eq!(final_user.total_points, awarded_sum);
        // Every draw 1..=10 was handed out exactly once.
        assert_eq!(awarded_sum, 55);

        let page = board.history(1, 100).await.unwrap();
        assert_eq!(page.pagination.total, 10);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn last_broadcast_matches_final_state() {
        let (_dir, board) = leaderboard_with(1..=10);
        let user = board.add_user("Rahul").await.unwrap();

        let mut rx = board.updates().subscribe();

        let mut tasks = Vec::new();
        for _ in 0..10 {
            let board = board.clone();
            let id = user.id;
            tasks.push(tokio::spawn(async move {
                board.claim_points(id).await.unwrap();
            }));
        }
        for task in tasks {
            task.await.unwrap();
        }

        // Snapshots arrive in commit order, so the last one received must
        // equal the live ranking after all claims settled.
        let mut last = None;
        while let Ok(snapshot) = rx.try_recv() {
            last = Some(snapshot);
        }

        let current = board.list_users().await.unwrap();
        assert_eq!(last.unwrap().users, current);
    }
}
