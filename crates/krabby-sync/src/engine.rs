//! # Sync Engine
//!
//! Keeps the console's [`Snapshot`] fresh.
//!
//! ## Architecture
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                          Sync Engine Actor                              │
//! │                                                                         │
//! │   SyncHandle ──(Refresh / StartPolling / StopPolling / Shutdown)──┐     │
//! │                                                                   ▼     │
//! │   ┌──────────────────────────────────────────────────────────────────┐ │
//! │   │  loop { select! { command, poll tick } }                         │ │
//! │   │                                                                  │ │
//! │   │  refresh #N ──spawn──▶ try_join!(tables, reservations,           │ │
//! │   │                                  waitlist, dashboard)            │ │
//! │   │                                   │                              │ │
//! │   │          ◀──── Completed { seq: N, result } ──┘                  │ │
//! │   │                                                                  │ │
//! │   │  N > last applied ─ Ok  ─▶ publish Arc<Snapshot> (all four)      │ │
//! │   │                   └ Err ─▶ keep snapshot, "Failed to load data"  │ │
//! │   │  N ≤ last applied ──────▶ discard silently                       │ │
//! │   └──────────────────────────────────────────────────────────────────┘ │
//! │                                   │                                     │
//! │                                   ▼                                     │
//! │              watch::Receiver<Arc<Snapshot>>  (every reader)            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Ordering
//! Refreshes are numbered when they start. Their reads overlap freely, but a
//! result is only published if no later-started refresh has been published
//! already. Stopping the poll timer does not cancel a refresh that is in
//! flight; its result is still applied.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use krabby_core::Snapshot;
use tokio::sync::{mpsc, oneshot, watch, RwLock};
use tokio::time::{Interval, MissedTickBehavior};
use tracing::{debug, info, warn};

use crate::error::{FailureKind, GatewayResult, SyncError, SyncResult};
use crate::gateway::{ResourceGateway, SharedGateway};
use crate::notify::NotificationCenter;

/// Notice shown when a refresh fails.
pub const LOAD_FAILED_MESSAGE: &str = "Failed to load data";

const COMMAND_BUFFER: usize = 64;

// =============================================================================
// Status
// =============================================================================

/// Observable state of the engine.
#[derive(Debug, Clone, Default)]
pub struct SyncStatus {
    pub polling: bool,
    pub poll_interval: Option<Duration>,
    /// Sequence number of the refresh currently published (0 = none yet).
    pub last_applied_seq: u64,
    pub last_refresh_at: Option<DateTime<Utc>>,
    /// Error of the most recent non-stale failed refresh, cleared on success.
    pub last_error: Option<String>,
    pub refreshes_in_flight: usize,
}

/// What happened to a refresh that completed successfully.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshOutcome {
    /// The result is now the published snapshot.
    Applied { seq: u64 },
    /// A later-started refresh had already been published.
    Stale { seq: u64, superseded_by: u64 },
}

type RefreshReply = oneshot::Sender<SyncResult<RefreshOutcome>>;

enum Command {
    Refresh {
        reply: Option<RefreshReply>,
    },
    StartPolling {
        every: Duration,
    },
    StopPolling,
    Completed {
        seq: u64,
        result: GatewayResult<Snapshot>,
        reply: Option<RefreshReply>,
    },
    Shutdown,
}

// =============================================================================
// Sync Handle
// =============================================================================

/// Handle for driving a running [`SyncEngine`] and reading its snapshot.
#[derive(Clone)]
pub struct SyncHandle {
    commands_tx: mpsc::Sender<Command>,
    snapshot_rx: watch::Receiver<Arc<Snapshot>>,
    status: Arc<RwLock<SyncStatus>>,
}

impl SyncHandle {
    async fn send(&self, command: Command) -> SyncResult<()> {
        self.commands_tx
            .send(command)
            .await
            .map_err(|_| SyncError::ShuttingDown)
    }

    /// Fetches all four collections and waits for the result.
    ///
    /// `Ok` covers both a published and a superseded result; `Err` means a
    /// read failed and the snapshot was left untouched.
    pub async fn refresh(&self) -> SyncResult<RefreshOutcome> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.send(Command::Refresh {
            reply: Some(reply_tx),
        })
        .await?;
        reply_rx.await.map_err(|_| SyncError::ShuttingDown)?
    }

    /// Starts a refresh without waiting for it.
    pub async fn request_refresh(&self) -> SyncResult<()> {
        self.send(Command::Refresh { reply: None }).await
    }

    /// Refreshes now and then every `every` until stopped.
    ///
    /// A second call while polling is running changes nothing.
    pub async fn start_polling(&self, every: Duration) -> SyncResult<()> {
        if every.is_zero() {
            return Err(SyncError::InvalidConfig(
                "poll interval must be greater than 0".into(),
            ));
        }
        self.send(Command::StartPolling { every }).await
    }

    /// Cancels the poll timer. Safe to call at any time, including when
    /// polling never started or the engine has stopped.
    pub async fn stop_polling(&self) {
        if self.send(Command::StopPolling).await.is_err() {
            debug!("Sync engine already stopped");
        }
    }

    /// The snapshot as last published.
    pub fn snapshot(&self) -> Arc<Snapshot> {
        Arc::clone(&self.snapshot_rx.borrow())
    }

    /// Receiver that wakes on every published snapshot.
    pub fn subscribe(&self) -> watch::Receiver<Arc<Snapshot>> {
        self.snapshot_rx.clone()
    }

    pub async fn status(&self) -> SyncStatus {
        self.status.read().await.clone()
    }

    /// Signals the engine to stop. In-flight results are dropped.
    pub async fn shutdown(&self) -> SyncResult<()> {
        self.send(Command::Shutdown).await
    }
}

// =============================================================================
// Sync Engine
// =============================================================================

/// Background task owning the published snapshot.
///
/// ## Usage
/// ```rust,ignore
/// let gateway: SharedGateway = Arc::new(HttpGateway::from_config(&config)?);
/// let notices = NotificationCenter::new(config.notification_window());
/// let sync = SyncEngine::spawn(gateway, notices.clone());
///
/// sync.start_polling(config.poll_interval()).await?;
/// let tables = &sync.snapshot().tables;
/// ```
pub struct SyncEngine {
    gateway: SharedGateway,
    notifier: NotificationCenter,
    commands_rx: mpsc::Receiver<Command>,
    /// Weak so the loop ends once every handle is dropped.
    completions_tx: mpsc::WeakSender<Command>,
    snapshot_tx: watch::Sender<Arc<Snapshot>>,
    status: Arc<RwLock<SyncStatus>>,
    ticker: Option<Interval>,
    next_seq: u64,
    applied_seq: u64,
}

impl SyncEngine {
    /// Spawns the engine on the current runtime. Nothing is fetched until
    /// the first refresh or `start_polling`.
    pub fn spawn(gateway: SharedGateway, notifier: NotificationCenter) -> SyncHandle {
        let (commands_tx, commands_rx) = mpsc::channel(COMMAND_BUFFER);
        let (snapshot_tx, snapshot_rx) = watch::channel(Arc::new(Snapshot::default()));
        let status = Arc::new(RwLock::new(SyncStatus::default()));

        let engine = SyncEngine {
            gateway,
            notifier,
            commands_rx,
            completions_tx: commands_tx.downgrade(),
            snapshot_tx,
            status: Arc::clone(&status),
            ticker: None,
            next_seq: 0,
            applied_seq: 0,
        };

        tokio::spawn(engine.run());

        SyncHandle {
            commands_tx,
            snapshot_rx,
            status,
        }
    }

    async fn run(mut self) {
        info!("Sync engine started");

        loop {
            tokio::select! {
                command = self.commands_rx.recv() => {
                    match command {
                        Some(Command::Shutdown) | None => {
                            info!("Sync engine received shutdown signal");
                            break;
                        }
                        Some(command) => self.handle(command).await,
                    }
                }
                _ = next_tick(&mut self.ticker) => {
                    debug!("Poll tick");
                    self.begin_refresh(None).await;
                }
            }
        }

        let mut status = self.status.write().await;
        status.polling = false;
        status.poll_interval = None;
        info!("Sync engine stopped");
    }

    async fn handle(&mut self, command: Command) {
        match command {
            Command::Refresh { reply } => self.begin_refresh(reply).await,
            Command::StartPolling { every } => self.start_polling(every).await,
            Command::StopPolling => self.stop_polling().await,
            Command::Completed { seq, result, reply } => self.complete(seq, result, reply).await,
            Command::Shutdown => {}
        }
    }

    async fn start_polling(&mut self, every: Duration) {
        if self.ticker.is_some() {
            debug!("Polling already running");
            return;
        }

        // The first tick fires immediately, which is the initial refresh.
        let mut interval = tokio::time::interval(every);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        self.ticker = Some(interval);

        let mut status = self.status.write().await;
        status.polling = true;
        status.poll_interval = Some(every);
        info!(?every, "Polling started");
    }

    async fn stop_polling(&mut self) {
        if self.ticker.take().is_some() {
            info!("Polling stopped");
        }
        let mut status = self.status.write().await;
        status.polling = false;
        status.poll_interval = None;
    }

    async fn begin_refresh(&mut self, reply: Option<RefreshReply>) {
        let Some(completions) = self.completions_tx.upgrade() else {
            if let Some(reply) = reply {
                let _ = reply.send(Err(SyncError::ShuttingDown));
            }
            return;
        };

        self.next_seq += 1;
        let seq = self.next_seq;
        self.status.write().await.refreshes_in_flight += 1;
        debug!(seq, "Refresh started");

        let gateway = Arc::clone(&self.gateway);
        tokio::spawn(async move {
            let result = fetch_snapshot(gateway.as_ref()).await;
            let _ = completions
                .send(Command::Completed { seq, result, reply })
                .await;
        });
    }

    async fn complete(
        &mut self,
        seq: u64,
        result: GatewayResult<Snapshot>,
        reply: Option<RefreshReply>,
    ) {
        {
            let mut status = self.status.write().await;
            status.refreshes_in_flight = status.refreshes_in_flight.saturating_sub(1);
        }

        let outcome = if seq <= self.applied_seq {
            let superseded_by = self.applied_seq;
            match &result {
                Ok(_) => debug!(seq, superseded_by, "Discarding superseded refresh"),
                Err(e) => debug!(seq, superseded_by, error = %e, "Superseded refresh failed"),
            }
            result
                .map(|_| RefreshOutcome::Stale { seq, superseded_by })
                .map_err(SyncError::DataLoadFailed)
        } else {
            match result {
                Ok(snapshot) => {
                    self.apply(seq, snapshot).await;
                    Ok(RefreshOutcome::Applied { seq })
                }
                Err(e) => {
                    warn!(seq, error = %e, "Refresh failed; keeping previous snapshot");
                    self.notifier
                        .raise_failure(LOAD_FAILED_MESSAGE, FailureKind::DataLoadFailed);
                    self.status.write().await.last_error = Some(e.to_string());
                    Err(SyncError::DataLoadFailed(e))
                }
            }
        };

        if let Some(reply) = reply {
            let _ = reply.send(outcome);
        }
    }

    async fn apply(&mut self, seq: u64, snapshot: Snapshot) {
        let previous = Arc::clone(&self.snapshot_tx.borrow());
        for finding in snapshot.audit(&previous) {
            warn!(seq, %finding, "Snapshot anomaly");
        }

        info!(
            seq,
            tables = snapshot.tables.len(),
            reservations = snapshot.reservations.len(),
            waitlist = snapshot.waitlist.len(),
            "Snapshot applied"
        );

        self.applied_seq = seq;
        self.snapshot_tx.send_replace(Arc::new(snapshot));

        let mut status = self.status.write().await;
        status.last_applied_seq = seq;
        status.last_refresh_at = Some(Utc::now());
        status.last_error = None;
    }
}

async fn next_tick(ticker: &mut Option<Interval>) {
    match ticker {
        Some(interval) => {
            interval.tick().await;
        }
        None => std::future::pending::<()>().await,
    }
}

/// Issues the four reads concurrently; any failure fails the whole fetch.
async fn fetch_snapshot(gateway: &dyn ResourceGateway) -> GatewayResult<Snapshot> {
    let (tables, reservations, waitlist, stats) = tokio::try_join!(
        gateway.list_tables(),
        gateway.list_reservations(),
        gateway.list_waitlist(),
        gateway.fetch_dashboard(),
    )?;

    Ok(Snapshot {
        tables,
        reservations,
        waitlist,
        stats,
    })
}
