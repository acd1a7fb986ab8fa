use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tokio::sync::watch;
use utoipa::ToSchema;

/// Completion status a station reports for its task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum StationStatus {
    /// Nothing reported yet in this session.
    Pending,
    /// The station's task has been solved. Terminal for the session.
    Correct,
    /// A wrong answer was presented; the station may still self-correct.
    #[serde(alias = "wrong")]
    Incorrect,
}

impl StationStatus {
    /// Whether a station currently in `self` may move to `next`.
    ///
    /// `pending -> correct | incorrect`, `incorrect -> correct`. Nothing leaves `correct`.
    pub fn can_transition_to(self, next: StationStatus) -> bool {
        matches!(
            (self, next),
            (StationStatus::Pending, _)
                | (StationStatus::Incorrect, StationStatus::Incorrect)
                | (StationStatus::Incorrect, StationStatus::Correct)
                | (StationStatus::Correct, StationStatus::Correct)
        )
    }
}

/// Result of a single station report.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReportOutcome {
    /// Status held by the station after the report.
    pub status: StationStatus,
    /// False when the report was dropped because the transition is not allowed.
    pub applied: bool,
}

/// Consistent copy of every station's status.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BoardSnapshot {
    /// Increments on every reset; lets delayed resets detect that a new session began.
    pub generation: u64,
    /// Status per station id, in declaration / first-report order.
    pub stations: IndexMap<String, StationStatus>,
}

impl BoardSnapshot {
    /// True iff at least one station exists and every station is `correct`.
    pub fn is_victory(&self) -> bool {
        !self.stations.is_empty()
            && self
                .stations
                .values()
                .all(|status| *status == StationStatus::Correct)
    }
}

/// Holds per-station status for the current session.
///
/// Writers are serialized by the watch channel; readers get a borrow of the latest complete
/// board and never observe a half-applied report.
pub struct StationBoard {
    declared: Vec<String>,
    board: watch::Sender<BoardSnapshot>,
}

impl StationBoard {
    /// Build a board that re-creates `declared` stations as pending on every reset.
    pub fn new(declared: Vec<String>) -> Self {
        let initial = BoardSnapshot {
            generation: 0,
            stations: pending_board(&declared),
        };
        let (board, _rx) = watch::channel(initial);
        Self { declared, board }
    }

    /// Upsert the status of `station_id`. Unknown ids create a new entry.
    pub fn report_status(&self, station_id: &str, status: StationStatus) -> ReportOutcome {
        let mut outcome = ReportOutcome {
            status,
            applied: true,
        };
        self.board.send_if_modified(|board| {
            match board.stations.get_mut(station_id) {
                Some(current) if *current == status => false,
                Some(current) if !current.can_transition_to(status) => {
                    outcome = ReportOutcome {
                        status: *current,
                        applied: false,
                    };
                    false
                }
                Some(current) => {
                    *current = status;
                    true
                }
                None => {
                    board.stations.insert(station_id.to_owned(), status);
                    true
                }
            }
        });
        outcome
    }

    /// Copy of the current board.
    pub fn snapshot(&self) -> BoardSnapshot {
        self.board.borrow().clone()
    }

    /// Whether every station reports `correct`.
    pub fn is_victory(&self) -> bool {
        self.board.borrow().is_victory()
    }

    /// Start a fresh session: declared stations back to pending, undeclared ones dropped.
    /// Returns the new generation.
    pub fn reset_all(&self) -> u64 {
        let mut generation = 0;
        self.board.send_modify(|board| {
            board.generation += 1;
            board.stations = pending_board(&self.declared);
            generation = board.generation;
        });
        generation
    }

    /// Reset only if nobody reset the board since `generation` was observed.
    pub fn reset_if_generation(&self, generation: u64) -> bool {
        self.board.send_if_modified(|board| {
            if board.generation != generation {
                return false;
            }
            board.generation += 1;
            board.stations = pending_board(&self.declared);
            true
        })
    }

    /// Subscribe to board changes.
    pub fn subscribe(&self) -> watch::Receiver<BoardSnapshot> {
        self.board.subscribe()
    }
}

fn pending_board(declared: &[String]) -> IndexMap<String, StationStatus> {
    declared
        .iter()
        .map(|id| (id.clone(), StationStatus::Pending))
        .collect()
}
