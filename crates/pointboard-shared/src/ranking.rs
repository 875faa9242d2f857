//! The ranking engine.
//!
//! A pure transformation from the current active-user set to a ranked
//! sequence.  Callers are responsible for filtering out inactive users
//! before invoking it.

use crate::types::{RankedUser, User};

/// Compute dense 1-based rankings over the given users.
///
/// Ordering: `total_points` descending, ties broken by `created_seq`
/// ascending (earlier-created users rank higher).  The secondary key makes
/// repeated computations over an unchanged snapshot identical, regardless of
/// the order the store returned the rows in.
pub fn compute_rankings(mut users: Vec<User>) -> Vec<RankedUser> {
    users.sort_by(|a, b| {
        b.total_points
            .cmp(&a.total_points)
            .then(a.created_seq.cmp(&b.created_seq))
    });

    users
        .into_iter()
        .enumerate()
        .map(|(i, user)| RankedUser {
            rank: (i + 1) as u32,
            user,
        })
        .collect()
}
