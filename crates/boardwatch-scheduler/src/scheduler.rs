//! Poll scheduler — drives the engine forever at a fixed period.
//!
//! ```text
//! Idle ──► Running ──► Sleeping ──► Running ──► …
//!              └──────────┴──────► Stopped (shutdown)
//! ```
//!
//! A cycle may only start from `Idle` or `Sleeping`, and the loop awaits each
//! cycle to completion before sleeping, so two cycles never overlap. Periods
//! are anchored to cycle start: the next cycle begins one period after the
//! previous one began, or right after it ends if it overran.

use boardwatch_core::config::AppConfig;
use boardwatch_core::error::{BoardWatchError, Result};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::time::Instant;

use crate::engine::{CycleSummary, NotificationEngine};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SchedulerState {
    Idle,
    Running,
    Sleeping,
    Stopped,
}

impl SchedulerState {
    pub fn can_transition_to(self, next: SchedulerState) -> bool {
        use SchedulerState::*;
        matches!(
            (self, next),
            (Idle, Running) | (Sleeping, Running) | (Running, Sleeping) | (Idle | Running | Sleeping, Stopped)
        )
    }
}

impl std::fmt::Display for SchedulerState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SchedulerState::Idle => write!(f, "idle"),
            SchedulerState::Running => write!(f, "running"),
            SchedulerState::Sleeping => write!(f, "sleeping"),
            SchedulerState::Stopped => write!(f, "stopped"),
        }
    }
}

/// Published after every transition.
#[derive(Debug, Clone, Serialize)]
pub struct SchedulerSnapshot {
    pub state: SchedulerState,
    pub cycles: u64,
    pub consecutive_failures: u32,
    pub last_started_at: Option<DateTime<Utc>>,
    pub last_summary: Option<CycleSummary>,
    pub last_error: Option<String>,
}

impl Default for SchedulerSnapshot {
    fn default() -> Self {
        Self {
            state: SchedulerState::Idle,
            cycles: 0,
            consecutive_failures: 0,
            last_started_at: None,
            last_summary: None,
            last_error: None,
        }
    }
}

pub struct Scheduler {
    engine: Arc<NotificationEngine>,
    period: Duration,
    snapshot: SchedulerSnapshot,
    status_tx: watch::Sender<SchedulerSnapshot>,
}

impl Scheduler {
    pub fn new(engine: Arc<NotificationEngine>, period: Duration) -> Self {
        let (status_tx, _) = watch::channel(SchedulerSnapshot::default());
        Self {
            engine,
            period,
            snapshot: SchedulerSnapshot::default(),
            status_tx,
        }
    }

    pub fn from_config(engine: Arc<NotificationEngine>, config: &AppConfig) -> Self {
        Self::new(engine, config.poll_period())
    }

    pub fn state(&self) -> SchedulerState {
        self.snapshot.state
    }

    /// Live view of the scheduler, e.g. for a status endpoint.
    pub fn subscribe(&self) -> watch::Receiver<SchedulerSnapshot> {
        self.status_tx.subscribe()
    }

    fn transition(&mut self, next: SchedulerState) -> Result<()> {
        let current = self.snapshot.state;
        if !current.can_transition_to(next) {
            return Err(BoardWatchError::Other(format!(
                "illegal scheduler transition {current} -> {next}"
            )));
        }
        tracing::debug!("scheduler {current} -> {next}");
        self.snapshot.state = next;
        self.status_tx.send_replace(self.snapshot.clone());
        Ok(())
    }

    /// Run exactly one cycle. Failures are recorded, not returned; only an
    /// illegal state transition is an error.
    pub async fn run_once(&mut self) -> Result<()> {
        self.transition(SchedulerState::Running)?;
        self.snapshot.cycles += 1;
        let cycle = self.snapshot.cycles;
        let now = Utc::now();
        self.snapshot.last_started_at = Some(now);
        tracing::info!("Starting poll cycle #{cycle}");

        // Spawned so a panic inside the cycle is contained to it.
        let engine = Arc::clone(&self.engine);
        let result = tokio::spawn(async move { engine.poll(now).await }).await;

        match result {
            Ok(Ok(report)) => {
                tracing::info!("Completed poll cycle #{cycle}");
                self.snapshot.last_summary = Some(report.summary());
                self.snapshot.last_error = None;
                self.snapshot.consecutive_failures = 0;
            }
            Ok(Err(e)) => {
                if e.is_cycle_fatal() {
                    tracing::error!("Poll cycle #{cycle} aborted: {e}");
                } else {
                    tracing::warn!("Poll cycle #{cycle} failed: {e}");
                }
                self.record_failure(e.to_string());
            }
            Err(join_err) => {
                tracing::error!("Poll cycle #{cycle} crashed: {join_err}");
                self.record_failure(format!("cycle crashed: {join_err}"));
            }
        }
        self.status_tx.send_replace(self.snapshot.clone());
        Ok(())
    }

    fn record_failure(&mut self, error: String) {
        self.snapshot.last_error = Some(error);
        self.snapshot.consecutive_failures += 1;
    }

    /// Loop until `shutdown` flips to true (or its sender is dropped). An
    /// in-flight cycle always finishes first.
    pub async fn run(mut self, mut shutdown: watch::Receiver<bool>) -> Result<()> {
        tracing::info!("Poll loop started (every {}s)", self.period.as_secs());

        while !*shutdown.borrow() {
            let started = Instant::now();
            self.run_once().await?;
            self.transition(SchedulerState::Sleeping)?;

            let next_start = started + self.period;
            let wait = next_start.saturating_duration_since(Instant::now());
            tracing::info!("Waiting {}s until next poll...", wait.as_secs());

            tokio::select! {
                _ = tokio::time::sleep_until(next_start) => {}
                changed = shutdown.changed() => {
                    if changed.is_err() {
                        break;
                    }
                }
            }
        }

        self.transition(SchedulerState::Stopped)?;
        tracing::info!("Poll loop stopped after {} cycle(s)", self.snapshot.cycles);
        Ok(())
    }
}
