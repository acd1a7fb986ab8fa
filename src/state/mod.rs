pub mod idle;
pub mod names;
pub mod session;
pub mod stations;

use std::sync::Arc;

use tokio::sync::{RwLock, watch};

use crate::{config::AppConfig, dao::run_store::RunStore, error::ServiceError};

use self::{
    idle::{IdleHooks, IdleWatchdog, LogIdleHooks},
    names::NameRegistry,
    session::{BuzzerLatch, SessionSlot},
    stations::StationBoard,
};

pub type SharedState = Arc<AppState>;

/// Central application state: the in-memory game components plus the leaderboard store handle.
///
/// Claims, stations, the session clock and idle tracking never depend on storage, so they keep
/// working while the application is degraded.
pub struct AppState {
    config: AppConfig,
    run_store: RwLock<Option<Arc<dyn RunStore>>>,
    degraded: watch::Sender<bool>,
    names: NameRegistry,
    stations: StationBoard,
    session: SessionSlot,
    buzzer: BuzzerLatch,
    idle: IdleWatchdog,
}

impl AppState {
    /// Construct a new [`AppState`] wrapped in an [`Arc`] so it can be cloned cheaply.
    ///
    /// The application starts in degraded mode until a run store is installed. The idle watchdog
    /// is created but not started; call [`IdleWatchdog::start`] from within the runtime.
    pub fn new(config: AppConfig) -> SharedState {
        Self::with_idle_hooks(config, Arc::new(LogIdleHooks))
    }

    /// Same as [`Self::new`] with custom idle-start / idle-stop hooks.
    pub fn with_idle_hooks(config: AppConfig, hooks: Arc<dyn IdleHooks>) -> SharedState {
        let (degraded_tx, _rx) = watch::channel(true);
        let stations = StationBoard::new(config.station_ids());
        let idle = IdleWatchdog::new(config.idle_timeout, hooks);
        Arc::new(Self {
            config,
            run_store: RwLock::new(None),
            degraded: degraded_tx,
            names: NameRegistry::new(),
            stations,
            session: SessionSlot::new(),
            buzzer: BuzzerLatch::new(),
            idle,
        })
    }

    /// Runtime configuration.
    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Obtain a handle to the current run store, if one is installed.
    pub async fn run_store(&self) -> Option<Arc<dyn RunStore>> {
        let guard = self.run_store.read().await;
        guard.as_ref().cloned()
    }

    /// Run store handle, or [`ServiceError::Degraded`] while storage is unusable.
    pub async fn require_run_store(&self) -> Result<Arc<dyn RunStore>, ServiceError> {
        if self.is_degraded() {
            return Err(ServiceError::Degraded);
        }
        self.run_store().await.ok_or(ServiceError::Degraded)
    }

    /// Install a new run store implementation and leave degraded mode.
    pub async fn set_run_store(&self, store: Arc<dyn RunStore>) {
        {
            let mut guard = self.run_store.write().await;
            *guard = Some(store);
        }
        self.update_degraded(false);
    }

    /// Remove the current run store and enter degraded mode.
    pub async fn clear_run_store(&self) {
        {
            let mut guard = self.run_store.write().await;
            guard.take();
        }
        self.update_degraded(true);
    }

    /// Current degraded flag.
    pub fn is_degraded(&self) -> bool {
        *self.degraded.borrow()
    }

    /// Subscribe to degraded mode updates.
    pub fn degraded_watcher(&self) -> watch::Receiver<bool> {
        self.degraded.subscribe()
    }

    /// Update and broadcast the degraded flag when the value changes.
    pub fn update_degraded(&self, value: bool) {
        self.degraded.send_if_modified(|current| {
            if *current == value {
                return false;
            }
            *current = value;
            true
        });
    }

    /// Nicknames currently held by participants.
    pub fn names(&self) -> &NameRegistry {
        &self.names
    }

    /// Per-station status board.
    pub fn stations(&self) -> &StationBoard {
        &self.stations
    }

    /// The running session, if any.
    pub fn session(&self) -> &SessionSlot {
        &self.session
    }

    /// Finish buzzer latch.
    pub fn buzzer(&self) -> &BuzzerLatch {
        &self.buzzer
    }

    /// Inactivity watchdog.
    pub fn idle(&self) -> &IdleWatchdog {
        &self.idle
    }
}
