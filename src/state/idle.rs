//! Inactivity watchdog driving the kiosk's ambient (idle) mode.
//!
//! [`IdleState`] is the pure two-state machine; [`IdleWatchdog`] wraps it behind a mutex and
//! runs the timeout check on a cancellable background task. Activity and the timeout check
//! take the same lock, so an activity recorded before the check runs is always seen by it.

use std::{
    sync::{Arc, Mutex, MutexGuard, PoisonError},
    time::Duration,
};

use tokio::{
    sync::{Notify, watch},
    task::JoinHandle,
    time::{Instant, sleep_until},
};
use tracing::{debug, info};

/// Default inactivity period before ambient mode starts.
pub const DEFAULT_IDLE_TIMEOUT: Duration = Duration::from_secs(120);

/// Side effect requested by a state change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdleTransition {
    /// `active -> idle`: start the ambient behaviour.
    Started,
    /// `idle -> active`: stop the ambient behaviour.
    Stopped,
}

/// Hooks invoked on idle transitions. Called with the watchdog lock held: keep them short.
pub trait IdleHooks: Send + Sync {
    /// Entered idle mode.
    fn idle_started(&self);
    /// Left idle mode because activity happened.
    fn idle_stopped(&self);
}

/// Hooks that only log the transition.
#[derive(Debug, Default)]
pub struct LogIdleHooks;

impl IdleHooks for LogIdleHooks {
    fn idle_started(&self) {
        info!("no activity for a while; entering idle mode");
    }

    fn idle_stopped(&self) {
        info!("activity detected; leaving idle mode");
    }
}

/// `{lastActivityAt, idleTriggered}` plus the transition rules.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdleState {
    last_activity_at: Instant,
    idle_triggered: bool,
}

impl IdleState {
    /// Start active, with the countdown beginning at `now`.
    pub fn new(now: Instant) -> Self {
        Self {
            last_activity_at: now,
            idle_triggered: false,
        }
    }

    /// Whether ambient mode is on.
    pub fn is_idle(&self) -> bool {
        self.idle_triggered
    }

    /// Instant at which the countdown runs out.
    pub fn deadline(&self, limit: Duration) -> Instant {
        self.last_activity_at + limit
    }

    /// Register activity: restart the countdown and leave idle mode if it was on.
    pub fn record_activity(&mut self, now: Instant) -> Option<IdleTransition> {
        self.last_activity_at = now;
        if std::mem::replace(&mut self.idle_triggered, false) {
            Some(IdleTransition::Stopped)
        } else {
            None
        }
    }

    /// Timeout check: enter idle mode once per idle period.
    pub fn check(&mut self, now: Instant, limit: Duration) -> Option<IdleTransition> {
        if self.idle_triggered || now < self.deadline(limit) {
            return None;
        }
        self.idle_triggered = true;
        Some(IdleTransition::Started)
    }
}

struct Inner {
    state: Mutex<IdleState>,
    limit: Duration,
    hooks: Arc<dyn IdleHooks>,
    activity: Notify,
    idle_flag: watch::Sender<bool>,
}

impl Inner {
    fn lock(&self) -> MutexGuard<'_, IdleState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn dispatch(&self, transition: Option<IdleTransition>) {
        match transition {
            Some(IdleTransition::Started) => {
                self.hooks.idle_started();
                let _ = self.idle_flag.send_replace(true);
            }
            Some(IdleTransition::Stopped) => {
                self.hooks.idle_stopped();
                let _ = self.idle_flag.send_replace(false);
            }
            None => {}
        }
    }
}

/// Single-instance debounced watchdog timer with idle-start / idle-stop hooks.
#[derive(Clone)]
pub struct IdleWatchdog {
    inner: Arc<Inner>,
    task: Arc<Mutex<Option<JoinHandle<()>>>>,
}

impl IdleWatchdog {
    /// Create a watchdog in the active state. The countdown only fires once [`Self::start`] ran.
    pub fn new(limit: Duration, hooks: Arc<dyn IdleHooks>) -> Self {
        let (idle_flag, _rx) = watch::channel(false);
        Self {
            inner: Arc::new(Inner {
                state: Mutex::new(IdleState::new(Instant::now())),
                limit,
                hooks,
                activity: Notify::new(),
                idle_flag,
            }),
            task: Arc::new(Mutex::new(None)),
        }
    }

    /// Configured inactivity period.
    pub fn limit(&self) -> Duration {
        self.inner.limit
    }

    /// Spawn the background timeout task. Calling it again replaces the previous task.
    /// Must be called from within a Tokio runtime.
    pub fn start(&self) {
        let inner = self.inner.clone();
        let handle = tokio::spawn(async move { run(inner).await });
        let previous = self
            .task
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .replace(handle);
        if let Some(previous) = previous {
            previous.abort();
        }
    }

    /// Stop the background task. The state is kept; activity is still recorded.
    pub fn cancel(&self) {
        if let Some(handle) = self
            .task
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
        {
            handle.abort();
        }
    }

    /// Register an activity signal from the presentation layer.
    pub fn record_activity(&self) {
        let transition = {
            let mut state = self.inner.lock();
            let transition = state.record_activity(Instant::now());
            self.inner.dispatch(transition);
            transition
        };
        if transition.is_some() {
            debug!("idle countdown restarted after idle period");
        }
        self.inner.activity.notify_one();
    }

    /// Whether ambient mode is currently on.
    pub fn is_idle(&self) -> bool {
        self.inner.lock().is_idle()
    }

    /// Subscribe to idle flag changes.
    pub fn subscribe(&self) -> watch::Receiver<bool> {
        self.inner.idle_flag.subscribe()
    }
}

async fn run(inner: Arc<Inner>) {
    loop {
        let (deadline, idle) = {
            let state = inner.lock();
            (state.deadline(inner.limit), state.is_idle())
        };

        if idle {
            // Nothing to time while idle; wait for activity to restart the countdown.
            inner.activity.notified().await;
            continue;
        }

        tokio::select! {
            _ = sleep_until(deadline) => {
                let mut state = inner.lock();
                let transition = state.check(Instant::now(), inner.limit);
                inner.dispatch(transition);
            }
            _ = inner.activity.notified() => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;

    const LIMIT: Duration = Duration::from_secs(120);

    #[derive(Default)]
    struct CountingHooks {
        started: AtomicUsize,
        stopped: AtomicUsize,
    }

    impl IdleHooks for CountingHooks {
        fn idle_started(&self) {
            self.started.fetch_add(1, Ordering::SeqCst);
        }

        fn idle_stopped(&self) {
            self.stopped.fetch_add(1, Ordering::SeqCst);
        }
    }

    impl CountingHooks {
        fn counts(&self) -> (usize, usize) {
            (
                self.started.load(Ordering::SeqCst),
                self.stopped.load(Ordering::SeqCst),
            )
        }
    }

    #[test]
    fn state_fires_start_once_per_idle_period() {
        let t0 = Instant::now();
        let mut state = IdleState::new(t0);

        assert_eq!(state.check(t0 + LIMIT / 2, LIMIT), None);
        assert_eq!(state.check(t0 + LIMIT, LIMIT), Some(IdleTransition::Started));
        assert_eq!(state.check(t0 + LIMIT * 2, LIMIT), None);
        assert!(state.is_idle());
    }

    #[test]
    fn activity_while_active_only_resets_countdown() {
        let t0 = Instant::now();
        let mut state = IdleState::new(t0);

        assert_eq!(state.record_activity(t0 + LIMIT / 2), None);
        assert_eq!(state.check(t0 + LIMIT, LIMIT), None);
        assert_eq!(
            state.check(t0 + LIMIT / 2 + LIMIT, LIMIT),
            Some(IdleTransition::Started)
        );
    }

    #[test]
    fn activity_after_idle_stops_once() {
        let t0 = Instant::now();
        let mut state = IdleState::new(t0);
        state.check(t0 + LIMIT, LIMIT);

        assert_eq!(
            state.record_activity(t0 + LIMIT * 2),
            Some(IdleTransition::Stopped)
        );
        assert_eq!(state.record_activity(t0 + LIMIT * 2), None);
        assert!(!state.is_idle());
    }

    #[tokio::test(start_paused = true)]
    async fn watchdog_enters_idle_after_limit() {
        let hooks = Arc::new(CountingHooks::default());
        let watchdog = IdleWatchdog::new(LIMIT, hooks.clone());
        watchdog.start();

        tokio::time::sleep(LIMIT - Duration::from_secs(1)).await;
        assert_eq!(hooks.counts(), (0, 0));

        tokio::time::sleep(Duration::from_secs(2)).await;
        assert_eq!(hooks.counts(), (1, 0));
        assert!(watchdog.is_idle());

        tokio::time::sleep(LIMIT * 3).await;
        assert_eq!(hooks.counts(), (1, 0), "start must not repeat while idle");
        watchdog.cancel();
    }

    #[tokio::test(start_paused = true)]
    async fn activity_before_limit_suppresses_idle() {
        let hooks = Arc::new(CountingHooks::default());
        let watchdog = IdleWatchdog::new(LIMIT, hooks.clone());
        watchdog.start();

        for _ in 0..5 {
            tokio::time::sleep(LIMIT / 2).await;
            watchdog.record_activity();
        }
        tokio::time::sleep(LIMIT / 2).await;
        assert_eq!(hooks.counts(), (0, 0));
        assert!(!watchdog.is_idle());
        watchdog.cancel();
    }

    #[tokio::test(start_paused = true)]
    async fn activity_after_idle_triggers_stop_and_rearms() {
        let hooks = Arc::new(CountingHooks::default());
        let watchdog = IdleWatchdog::new(LIMIT, hooks.clone());
        let mut flag = watchdog.subscribe();
        watchdog.start();

        tokio::time::sleep(LIMIT + Duration::from_secs(1)).await;
        assert_eq!(hooks.counts(), (1, 0));
        assert!(*flag.borrow_and_update());

        watchdog.record_activity();
        watchdog.record_activity();
        assert_eq!(hooks.counts(), (1, 1));
        assert!(!*flag.borrow_and_update());

        tokio::time::sleep(LIMIT + Duration::from_secs(1)).await;
        assert_eq!(hooks.counts(), (2, 1));
        watchdog.cancel();
    }

    #[tokio::test(start_paused = true)]
    async fn cancelled_watchdog_never_fires() {
        let hooks = Arc::new(CountingHooks::default());
        let watchdog = IdleWatchdog::new(LIMIT, hooks.clone());
        watchdog.start();
        watchdog.cancel();

        tokio::time::sleep(LIMIT * 2).await;
        assert_eq!(hooks.counts(), (0, 0));
    }
}
