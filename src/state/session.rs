use std::{
    sync::{
        Arc, Mutex, PoisonError,
        atomic::{AtomicBool, Ordering},
    },
    time::{Duration, SystemTime},
};

use thiserror::Error;
use tokio::{sync::RwLock, time::Instant};
use uuid::Uuid;

use crate::elapsed::ElapsedTime;

/// Unique identifier for a game session.
pub type SessionId = Uuid;

/// Stopwatch of a single run. Pausing is sticky: the first pause wins.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionClock {
    started_at: Instant,
    paused_at: Option<Instant>,
}

impl SessionClock {
    /// Start running at `now`.
    pub fn start(now: Instant) -> Self {
        Self {
            started_at: now,
            paused_at: None,
        }
    }

    /// Freeze the clock. Later calls keep the original pause instant.
    pub fn pause(&mut self, now: Instant) {
        self.paused_at.get_or_insert(now);
    }

    /// Whether the clock has been frozen.
    pub fn is_paused(&self) -> bool {
        self.paused_at.is_some()
    }

    /// Time elapsed between start and pause (or `now` while still running).
    pub fn elapsed(&self, now: Instant) -> Duration {
        self.paused_at
            .unwrap_or(now)
            .saturating_duration_since(self.started_at)
    }
}

/// Errors raised while starting a session.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    /// Only one session may run per game instance.
    #[error("a session for `{name}` is already running")]
    AlreadyRunning {
        /// Name of the participant currently playing.
        name: String,
    },
}

/// Errors raised by the one-shot finalization gate.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FinalizeError {
    /// No session is running.
    #[error("no session is running")]
    NoSession,
    /// Another caller already finalized (or is finalizing) this session.
    #[error("session `{0}` is already finalized")]
    AlreadyFinalized(SessionId),
    /// Victory was claimed but not every station reports correct.
    #[error("not every station reports correct yet")]
    NotVictorious,
}

/// The running session: who plays, since when, and whether it was finalized.
#[derive(Debug)]
pub struct ActiveSession {
    id: SessionId,
    name: String,
    started_at: SystemTime,
    board_generation: u64,
    clock: Mutex<SessionClock>,
    finalized: AtomicBool,
}

impl ActiveSession {
    fn new(name: String, board_generation: u64) -> Self {
        Self {
            id: Uuid::new_v4(),
            name,
            started_at: SystemTime::now(),
            board_generation,
            clock: Mutex::new(SessionClock::start(Instant::now())),
            finalized: AtomicBool::new(false),
        }
    }

    /// Session identifier.
    pub fn id(&self) -> SessionId {
        self.id
    }

    /// Participant name the run will be recorded under.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Wall-clock start time.
    pub fn started_at(&self) -> SystemTime {
        self.started_at
    }

    /// Station board generation the session started with.
    pub fn board_generation(&self) -> u64 {
        self.board_generation
    }

    /// Copy of the stopwatch.
    pub fn clock(&self) -> SessionClock {
        *self.clock.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Current elapsed time in codec form.
    pub fn elapsed(&self) -> ElapsedTime {
        ElapsedTime::from_duration_saturating(self.clock().elapsed(Instant::now()))
    }

    /// Whether the finalization gate has been taken.
    pub fn is_finalized(&self) -> bool {
        self.finalized.load(Ordering::Acquire)
    }
}

/// Proof that the caller won the finalization gate for a session.
#[derive(Debug)]
pub struct FinalizeTicket {
    session: Arc<ActiveSession>,
    elapsed: ElapsedTime,
}

impl FinalizeTicket {
    /// The session being finalized.
    pub fn session(&self) -> &Arc<ActiveSession> {
        &self.session
    }

    /// Frozen run time.
    pub fn elapsed(&self) -> ElapsedTime {
        self.elapsed
    }
}

/// Slot holding at most one running session.
#[derive(Default)]
pub struct SessionSlot {
    current: RwLock<Option<Arc<ActiveSession>>>,
}

impl SessionSlot {
    /// Create an empty slot.
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a session for `name`, failing when one is already running.
    ///
    /// `reset_board` runs under the slot lock once the slot is known to be free, so a rejected
    /// start never wipes the board of the running session. It returns the new board generation.
    pub async fn start(
        &self,
        name: String,
        reset_board: impl FnOnce() -> u64,
    ) -> Result<Arc<ActiveSession>, SessionError> {
        let mut slot = self.current.write().await;
        if let Some(existing) = slot.as_ref() {
            return Err(SessionError::AlreadyRunning {
                name: existing.name.clone(),
            });
        }
        let session = Arc::new(ActiveSession::new(name, reset_board()));
        *slot = Some(session.clone());
        Ok(session)
    }

    /// Running session, if any.
    pub async fn current(&self) -> Option<Arc<ActiveSession>> {
        self.current.read().await.clone()
    }

    /// Try to acquire the one-shot gate. Exactly one caller per session gets a ticket; the
    /// winner's clock is paused before the ticket is returned.
    pub async fn plan_finalize(&self) -> Result<FinalizeTicket, FinalizeError> {
        let session = self.current().await.ok_or(FinalizeError::NoSession)?;

        if session
            .finalized
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return Err(FinalizeError::AlreadyFinalized(session.id));
        }

        let elapsed = {
            let mut clock = session
                .clock
                .lock()
                .unwrap_or_else(PoisonError::into_inner);
            clock.pause(Instant::now());
            ElapsedTime::from_duration_saturating(clock.elapsed(Instant::now()))
        };

        Ok(FinalizeTicket { session, elapsed })
    }

    /// The run was persisted: discard the session if it is still the current one.
    ///
    /// The second value is false when the session was abandoned while its run was being
    /// written; the slot, and whatever session now occupies it, are left untouched.
    pub async fn apply_finalize(&self, ticket: FinalizeTicket) -> (Arc<ActiveSession>, bool) {
        let mut slot = self.current.write().await;
        let still_current = slot
            .as_ref()
            .is_some_and(|current| current.id == ticket.session.id);
        if still_current {
            slot.take();
        }
        (ticket.session, still_current)
    }

    /// Persisting failed: reopen the gate. The clock stays paused so a retry records the same time.
    pub fn abort_finalize(&self, ticket: FinalizeTicket) {
        ticket.session.finalized.store(false, Ordering::Release);
    }

    /// Drop the running session, if any. Safe to call at any time.
    pub async fn abandon(&self) -> Option<Arc<ActiveSession>> {
        self.current.write().await.take()
    }
}

/// One-shot latch for the physical finish buzzer: each press is observed by one reader.
#[derive(Debug, Default)]
pub struct BuzzerLatch {
    pressed: AtomicBool,
}

impl BuzzerLatch {
    /// Create a released latch.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a press.
    pub fn press(&self) {
        self.pressed.store(true, Ordering::Release);
    }

    /// Read and clear the latch.
    pub fn take(&self) -> bool {
        self.pressed.swap(false, Ordering::AcqRel)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::AtomicUsize;

    use tokio::sync::Barrier;

    use super::*;

    #[test]
    fn clock_pause_is_sticky() {
        let t0 = Instant::now();
        let mut clock = SessionClock::start(t0);
        assert_eq!(clock.elapsed(t0 + Duration::from_secs(3)), Duration::from_secs(3));

        clock.pause(t0 + Duration::from_secs(5));
        clock.pause(t0 + Duration::from_secs(9));
        assert!(clock.is_paused());
        assert_eq!(clock.elapsed(t0 + Duration::from_secs(60)), Duration::from_secs(5));
    }

    #[tokio::test]
    async fn only_one_session_at_a_time() {
        let slot = SessionSlot::new();
        slot.start("Ann".into(), || 1).await.unwrap();
        let err = slot
            .start("Bo".into(), || panic!("board reset while a session runs"))
            .await
            .unwrap_err();
        assert_eq!(err, SessionError::AlreadyRunning { name: "Ann".into() });

        slot.abandon().await;
        assert!(slot.start("Bo".into(), || 2).await.is_ok());
    }

    #[tokio::test]
    async fn finalize_without_session_fails() {
        let slot = SessionSlot::new();
        assert_eq!(
            slot.plan_finalize().await.unwrap_err(),
            FinalizeError::NoSession
        );
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn fifty_concurrent_finalizers_yield_one_winner() {
        const OBSERVERS: usize = 50;
        let slot = Arc::new(SessionSlot::new());
        slot.start("Ann".into(), || 1).await.unwrap();

        let barrier = Arc::new(Barrier::new(OBSERVERS));
        let winners = Arc::new(AtomicUsize::new(0));
        let mut handles = Vec::with_capacity(OBSERVERS);
        for _ in 0..OBSERVERS {
            let slot = slot.clone();
            let barrier = barrier.clone();
            let winners = winners.clone();
            handles.push(tokio::spawn(async move {
                barrier.wait().await;
                match slot.plan_finalize().await {
                    Ok(ticket) => {
                        winners.fetch_add(1, Ordering::SeqCst);
                        slot.apply_finalize(ticket).await;
                    }
                    Err(FinalizeError::AlreadyFinalized(_)) | Err(FinalizeError::NoSession) => {}
                    Err(other) => panic!("unexpected error: {other:?}"),
                }
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }

        assert_eq!(winners.load(Ordering::SeqCst), 1);
        assert!(slot.current().await.is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn aborted_finalize_can_be_retried_with_same_time() {
        let slot = SessionSlot::new();
        slot.start("Ann".into(), || 1).await.unwrap();
        tokio::time::sleep(Duration::from_millis(83_456)).await;

        let ticket = slot.plan_finalize().await.unwrap();
        assert_eq!(ticket.elapsed().to_string(), "00:01:23.456");
        assert!(matches!(
            slot.plan_finalize().await,
            Err(FinalizeError::AlreadyFinalized(_))
        ));
        slot.abort_finalize(ticket);

        tokio::time::sleep(Duration::from_secs(10)).await;
        let retry = slot.plan_finalize().await.unwrap();
        assert_eq!(retry.elapsed().to_string(), "00:01:23.456");
        let (session, still_current) = slot.apply_finalize(retry).await;
        assert_eq!(session.name(), "Ann");
        assert!(still_current);
        assert!(slot.current().await.is_none());
    }

    #[tokio::test]
    async fn finalize_after_abandon_leaves_the_new_session_alone() {
        let slot = SessionSlot::new();
        slot.start("Ann".into(), || 1).await.unwrap();
        let ticket = slot.plan_finalize().await.unwrap();

        slot.abandon().await;
        let replacement = slot.start("Ann".into(), || 2).await.unwrap();

        let (finished, still_current) = slot.apply_finalize(ticket).await;
        assert!(!still_current);
        assert_ne!(finished.id(), replacement.id());
        let current = slot.current().await.unwrap();
        assert_eq!(current.id(), replacement.id());
    }

    #[test]
    fn buzzer_press_is_observed_once() {
        let latch = BuzzerLatch::new();
        assert!(!latch.take());
        latch.press();
        latch.press();
        assert!(latch.take());
        assert!(!latch.take());
    }
}
