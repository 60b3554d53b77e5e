//! Periodic refresh of BAC readings.
//!
//! A reading has to be recomputed even when nothing new is logged, because
//! BAC keeps decaying. [`schedule`] runs a callback:
//! - once immediately,
//! - whenever [`ScheduleHandle::notify_changed`] is called,
//! - every `period` thereafter.
//!
//! The callback runs on the ambient tokio runtime. [`ScheduleHandle::cancel`]
//! takes the callback out of its slot, so once it returns no further
//! invocation can start. The callback must not cancel its own handle.
//!
//! [`RefreshScheduler`] wraps a handle in an explicit `Idle`/`Active`
//! lifecycle for consumers that start and stop displaying readings.

use crate::{Error, Result};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use tokio::sync::Notify;
use tokio::task::JoinHandle;
use tokio::time::{interval, MissedTickBehavior};

/// Default refresh period
pub const DEFAULT_REFRESH_PERIOD: Duration = Duration::from_secs(60);

/// Why a refresh ran
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RefreshTrigger {
    Started,
    DataChanged,
    Periodic,
}

type TickFn = Box<dyn FnMut(RefreshTrigger) + Send + 'static>;

struct Shared {
    on_tick: Mutex<Option<TickFn>>,
    changed: Notify,
}

impl Shared {
    fn slot(&self) -> MutexGuard<'_, Option<TickFn>> {
        // A panicking callback poisons the lock; the slot itself is still sound.
        self.on_tick
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Run the callback. Returns false once cancelled.
    fn fire(&self, trigger: RefreshTrigger) -> bool {
        let mut slot = self.slot();
        match slot.as_mut() {
            Some(on_tick) => {
                tracing::trace!("Refresh triggered: {:?}", trigger);
                on_tick(trigger);
                true
            }
            None => false,
        }
    }
}

/// Cancellation handle for a scheduled refresh. Dropping it cancels.
pub struct ScheduleHandle {
    shared: Arc<Shared>,
    task: JoinHandle<()>,
    period: Duration,
}

impl ScheduleHandle {
    /// Request an immediate refresh. Requests made while a refresh is running
    /// collapse into one.
    pub fn notify_changed(&self) {
        self.shared.changed.notify_one();
    }

    /// Stop all future refreshes. Idempotent.
    ///
    /// Blocks until an in-flight callback finishes, then guarantees no
    /// further invocation.
    pub fn cancel(&self) {
        let was_active = self.shared.slot().take().is_some();
        self.task.abort();
        if was_active {
            tracing::debug!("Refresh schedule cancelled (period {:?})", self.period);
        }
    }

    pub fn is_active(&self) -> bool {
        self.shared.slot().is_some()
    }

    pub fn period(&self) -> Duration {
        self.period
    }
}

impl Drop for ScheduleHandle {
    fn drop(&mut self) {
        self.cancel();
    }
}

impl std::fmt::Debug for ScheduleHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScheduleHandle")
            .field("period", &self.period)
            .field("active", &self.is_active())
            .finish()
    }
}

/// Run `on_tick` now, on every change notification, and every `period`
///
/// Must be called from within a tokio runtime.
pub fn schedule<F>(on_tick: F, period: Duration) -> Result<ScheduleHandle>
where
    F: FnMut(RefreshTrigger) + Send + 'static,
{
    if period.is_zero() {
        return Err(Error::Scheduler("refresh period must be non-zero".into()));
    }
    let runtime = tokio::runtime::Handle::try_current()
        .map_err(|e| Error::Scheduler(format!("no tokio runtime available: {}", e)))?;

    let shared = Arc::new(Shared {
        on_tick: Mutex::new(Some(Box::new(on_tick))),
        changed: Notify::new(),
    });
    let task = runtime.spawn(run(Arc::clone(&shared), period));

    tracing::debug!("Refresh schedule started (period {:?})", period);
    Ok(ScheduleHandle {
        shared,
        task,
        period,
    })
}

async fn run(shared: Arc<Shared>, period: Duration) {
    let mut ticker = interval(period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    // The first tick completes immediately.
    ticker.tick().await;
    if !shared.fire(RefreshTrigger::Started) {
        return;
    }

    loop {
        let trigger = tokio::select! {
            _ = ticker.tick() => RefreshTrigger::Periodic,
            _ = shared.changed.notified() => RefreshTrigger::DataChanged,
        };
        if !shared.fire(trigger) {
            break;
        }
    }
}

// ============================================================================
// Lifecycle
// ============================================================================

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SchedulerState {
    Idle,
    Active,
}

/// Owns at most one refresh schedule
#[derive(Debug)]
pub struct RefreshScheduler {
    period: Duration,
    active: Option<ScheduleHandle>,
}

impl Default for RefreshScheduler {
    fn default() -> Self {
        Self::new(DEFAULT_REFRESH_PERIOD)
    }
}

impl RefreshScheduler {
    pub fn new(period: Duration) -> Self {
        Self {
            period,
            active: None,
        }
    }

    pub fn state(&self) -> SchedulerState {
        match &self.active {
            Some(handle) if handle.is_active() => SchedulerState::Active,
            _ => SchedulerState::Idle,
        }
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    /// Idle → Active. Refreshes immediately; does nothing if already active.
    pub fn start<F>(&mut self, on_refresh: F) -> Result<()>
    where
        F: FnMut(RefreshTrigger) + Send + 'static,
    {
        if self.state() == SchedulerState::Active {
            tracing::debug!("Refresh scheduler already active");
            return Ok(());
        }
        self.active = Some(schedule(on_refresh, self.period)?);
        Ok(())
    }

    /// Recompute now because events or the profile changed. Ignored when idle.
    pub fn notify_changed(&self) {
        if let Some(handle) = &self.active {
            handle.notify_changed();
        }
    }

    /// Active → Idle. Idempotent.
    pub fn stop(&mut self) {
        if let Some(handle) = self.active.take() {
            handle.cancel();
        }
    }
}
