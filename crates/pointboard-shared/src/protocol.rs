//! Wire payloads pushed to connected observers.

use serde::{Deserialize, Serialize};

use crate::types::RankedUser;

/// Event name carried on every rankings push, matching the client contract.
pub const EVENT_RANKINGS_UPDATED: &str = "rankingsUpdated";

/// The full ranked active-user list at one point in time.
///
/// Published whenever active-user membership or any user's points change.
/// Consumers should treat each snapshot as a full replacement, not a delta.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RankingsSnapshot {
    pub users: Vec<RankedUser>,
}

impl RankingsSnapshot {
    pub fn new(users: Vec<RankedUser>) -> Self {
        Self { users }
    }

    /// Serialize this snapshot as a `rankingsUpdated` event frame.
    pub fn to_event_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(&WsEvent {
            event: EVENT_RANKINGS_UPDATED,
            data: &self.users,
        })
    }
}

/// Envelope for a single WebSocket event frame.
#[derive(Debug, Clone, Serialize)]
pub struct WsEvent<'a, T> {
    pub event: &'a str,
    pub data: T,
}
