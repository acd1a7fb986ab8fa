use serde::{Deserialize, Serialize};
use std::time::SystemTime;
use uuid::Uuid;

/// Identifier of a recorded run. Assigned by the store, increasing with insertion order.
pub type RunId = u64;

/// Completed run as persisted on the leaderboard.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RunEntity {
    /// Store-assigned identifier; ties in elapsed time are ranked by it.
    pub id: RunId,
    /// Participant nickname.
    pub name: String,
    /// Elapsed time in `00:MM:SS.mmm` form, validated before it reaches the store.
    pub elapsed: String,
    /// When the run was recorded.
    pub recorded_at: SystemTime,
}

/// Run about to be inserted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewRunEntity {
    /// Participant nickname.
    pub name: String,
    /// Elapsed time in `00:MM:SS.mmm` form.
    pub elapsed: String,
    /// Backfilled timestamp. `None` lets the store stamp the row with its own clock.
    pub recorded_at: Option<SystemTime>,
    /// Session the run finalizes. Stores keep at most one run per session, so inserting the
    /// same session again returns the run already recorded.
    pub session: Option<Uuid>,
}

impl NewRunEntity {
    /// Regular insert stamped by the store.
    pub fn new(name: String, elapsed: String) -> Self {
        Self {
            name,
            elapsed,
            recorded_at: None,
            session: None,
        }
    }

    /// Tie the run to the session it finalizes.
    pub fn for_session(mut self, session: Uuid) -> Self {
        self.session = Some(session);
        self
    }
}
