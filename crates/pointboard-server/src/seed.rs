//! Default roster seeding for first launch.

use chrono::Utc;

use pointboard_shared::types::UserId;
use pointboard_store::{Database, StoreError};

/// Users created on a fresh database so the leaderboard is never empty.
pub const DEFAULT_USERS: [&str; 10] = [
    "Rahul", "Kamal", "Sanak", "Priya", "Amit", "Sneha", "Ravi", "Pooja", "Vikram", "Anita",
];

/// Insert the default roster when the users table is empty.  Returns the
/// number of users created (zero when the table already has rows).
pub fn seed_default_users(db: &Database) -> Result<usize, StoreError> {
    if db.count_users()? > 0 {
        return Ok(0);
    }

    for name in DEFAULT_USERS {
        db.create_user(UserId::new(), name, Utc::now())?;
    }

    tracing::info!(count = DEFAULT_USERS.len(), "seeded default users");
    Ok(DEFAULT_USERS.len())
}
