use std::sync::{Arc, Condvar, Mutex, RwLock};
use std::time::{Duration, Instant};

use tracing::{debug, warn};

use pacer_host::{ForegroundDispatcher, HostPlugin};

use crate::error::ScheduleError;
use crate::metrics::TimerMetrics;
use crate::pending::{ActionEntry, FireFn, PendingQueue};
use crate::task::BackgroundTask;
use crate::types::SchedulerConfig;

/// Cancellation handle for a scheduled action.
///
/// Cancellation is cooperative and lazy: it flips a flag that the worker
/// checks before firing and before re-inserting a repeating action. It does
/// not interrupt a firing already in progress and does not remove the
/// action from the queue eagerly.
#[derive(Clone)]
pub struct TimerHandle {
    entry: Arc<ActionEntry>,
}

impl std::fmt::Debug for TimerHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TimerHandle")
            .field("name", &self.entry.name)
            .finish_non_exhaustive()
    }
}

impl TimerHandle {
    /// Cancel the action. A one-shot that has not fired never fires; a
    /// repeating action is not re-inserted after its current firing.
    /// Idempotent.
    pub fn cancel(&self) {
        self.entry.cancel();
    }

    /// Whether the action has been canceled.
    pub fn is_canceled(&self) -> bool {
        self.entry.is_canceled()
    }
}

/// Queue and lifecycle flags, shared with the worker under one lock.
struct SchedState {
    queue: PendingQueue,
    /// Host lifecycle gate: actions only fire while the host is active.
    active: bool,
    /// True iff a worker thread is alive and will observe the queue.
    running: bool,
}

struct Inner {
    state: Mutex<SchedState>,
    /// Signaled whenever the worker must re-evaluate its wait: a new
    /// earliest-due action was inserted, or the host deactivated.
    wake: Condvar,
    dispatcher: Arc<dyn ForegroundDispatcher>,
    metrics: Arc<RwLock<TimerMetrics>>,
    config: SchedulerConfig,
}

/// Lifecycle-gated timer scheduler.
///
/// Runs at most one worker thread, started lazily when there is pending
/// work and the host is active, and stopped by the worker itself once the
/// queue empties or the host deactivates. Deactivating does not drop
/// pending actions; they resume firing on the next activation.
///
/// Task continuations never run on the worker thread; they are posted to
/// the injected [`ForegroundDispatcher`].
pub struct TimerScheduler {
    inner: Arc<Inner>,
}

impl TimerScheduler {
    /// Create a scheduler with the default configuration.
    pub fn new(dispatcher: Arc<dyn ForegroundDispatcher>) -> Self {
        Self::with_config(SchedulerConfig::default(), dispatcher)
    }

    /// Create a scheduler with the given configuration.
    pub fn with_config(config: SchedulerConfig, dispatcher: Arc<dyn ForegroundDispatcher>) -> Self {
        Self {
            inner: Arc::new(Inner {
                state: Mutex::new(SchedState {
                    queue: PendingQueue::new(),
                    active: false,
                    running: false,
                }),
                wake: Condvar::new(),
                dispatcher,
                metrics: Arc::new(RwLock::new(TimerMetrics::default())),
                config,
            }),
        }
    }

    /// Mark the host active and start a worker if there is pending work.
    /// Idempotent.
    pub fn activate(&self) {
        let start = {
            let mut st = self.inner.state.lock().unwrap();
            st.active = true;
            if !st.queue.is_empty() && !st.running {
                st.running = true;
                debug!("Host active with {} pending actions, starting worker", st.queue.len());
                true
            } else {
                false
            }
        };

        if start {
            self.spawn_worker();
        }
    }

    /// Mark the host inactive and wake the worker so it can exit after its
    /// current wait. Pending actions are retained; they resume firing on
    /// the next [`activate`](Self::activate).
    pub fn deactivate(&self) {
        let mut st = self.inner.state.lock().unwrap();
        st.active = false;
        if st.running {
            self.inner.wake.notify_all();
        }
    }

    /// Schedule `task` to fire once after `delay_ms` milliseconds.
    ///
    /// A zero or negative delay fires as soon as possible. Scheduling while
    /// the host is inactive is allowed; the action stays pending until the
    /// next activation, even past its nominal deadline.
    pub fn schedule_once<T: BackgroundTask>(&self, task: T, delay_ms: i64) -> TimerHandle {
        self.insert(task, delay_ms, None)
    }

    /// Schedule `task` to fire every `interval_ms` milliseconds.
    ///
    /// The first firing is `interval_ms` from now. Each subsequent firing
    /// is scheduled from the instant the previous one was taken off the
    /// queue, so the execution time of the background phase does not
    /// stretch the schedule, and the next instant is never in the past.
    ///
    /// `interval_ms` must be positive; zero or negative is a caller error.
    pub fn schedule_repeating<T: BackgroundTask>(
        &self,
        task: T,
        interval_ms: i64,
    ) -> Result<TimerHandle, ScheduleError> {
        if interval_ms <= 0 {
            return Err(ScheduleError::InvalidInterval(interval_ms));
        }
        let interval = Duration::from_millis(interval_ms as u64);
        Ok(self.insert(task, interval_ms, Some(interval)))
    }

    /// Whether a worker thread currently exists. Diagnostic hook.
    pub fn is_worker_running(&self) -> bool {
        self.inner.state.lock().unwrap().running
    }

    /// Snapshot of the scheduler's operational metrics.
    pub fn metrics(&self) -> TimerMetrics {
        self.inner.metrics.read().unwrap().clone()
    }

    fn insert<T: BackgroundTask>(
        &self,
        task: T,
        delay_ms: i64,
        interval: Option<Duration>,
    ) -> TimerHandle {
        let name = task.name().to_string();
        let entry = Arc::new(ActionEntry::new(name, erase(task), interval));
        let fire_at = fire_time_from_now(delay_ms);

        let start = {
            let mut st = self.inner.state.lock().unwrap();
            let became_head = st.queue.push(Arc::clone(&entry), fire_at);
            if !st.running {
                if st.active {
                    st.running = true;
                    true
                } else {
                    false
                }
            } else {
                if became_head {
                    // The worker may be sleeping toward a later deadline.
                    self.inner.wake.notify_all();
                }
                false
            }
        };

        if start {
            self.spawn_worker();
        }

        debug!(
            "Scheduled '{}' in {}ms (repeating: {})",
            entry.name,
            delay_ms,
            entry.interval.is_some()
        );
        TimerHandle { entry }
    }

    fn spawn_worker(&self) {
        let inner = Arc::clone(&self.inner);
        std::thread::Builder::new()
            .name(self.inner.config.worker_thread_name.clone())
            .spawn(move || worker_loop(inner))
            .expect("Failed to spawn timer worker thread");
    }
}

impl HostPlugin for TimerScheduler {
    fn name(&self) -> &str {
        "timer-scheduler"
    }

    fn on_resume(&self) -> anyhow::Result<()> {
        self.activate();
        Ok(())
    }

    fn on_pause(&self) -> anyhow::Result<()> {
        self.deactivate();
        Ok(())
    }
}

impl Drop for TimerScheduler {
    fn drop(&mut self) {
        // Tear-down: the worker exits after its current wait; pending
        // actions go away with the shared state.
        self.deactivate();
    }
}

fn fire_time_from_now(delay_ms: i64) -> Instant {
    let now = Instant::now();
    if delay_ms <= 0 {
        now
    } else {
        now + Duration::from_millis(delay_ms as u64)
    }
}

/// Wrap a task into its type-erased firing step. The closure runs the
/// background phase on the worker and posts exactly one continuation to the
/// dispatcher; failure is a value here, never an unwind.
fn erase<T: BackgroundTask>(task: T) -> FireFn {
    let task = Arc::new(task);
    Box::new(move |dispatcher| match task.run_background() {
        Ok(value) => {
            let task = Arc::clone(&task);
            dispatcher.post(Box::new(move || task.on_success(value)));
            true
        }
        Err(error) => {
            let task = Arc::clone(&task);
            dispatcher.post(Box::new(move || task.on_failure(error)));
            false
        }
    })
}

/// Worker body. Fires due actions until the queue empties or the host
/// deactivates, then clears `running` and exits; that check is the only
/// exit path, so at most one worker is alive per scheduler.
fn worker_loop(inner: Arc<Inner>) {
    debug!("Timer worker started");
    let mut st = inner.state.lock().unwrap();
    loop {
        let discarded = st.queue.discard_canceled_head();
        if discarded > 0 {
            if let Ok(mut m) = inner.metrics.write() {
                m.record_discarded(discarded);
            }
        }

        if !st.active || st.queue.is_empty() {
            st.running = false;
            debug!(
                "Timer worker exiting (active: {}, pending: {})",
                st.active,
                st.queue.len()
            );
            return;
        }

        let now = Instant::now();
        let head_at = match st.queue.peek() {
            Some((at, _)) => at,
            None => continue,
        };
        if head_at > now {
            // Wait for the deadline or a signal (new earlier action,
            // deactivation), whichever comes first. The head may have
            // changed by the time we wake, so re-evaluate from the top.
            let (guard, _) = inner.wake.wait_timeout(st, head_at - now).unwrap();
            st = guard;
            continue;
        }

        let (_, entry) = match st.queue.pop() {
            Some(due) => due,
            None => continue,
        };
        if entry.is_canceled() {
            if let Ok(mut m) = inner.metrics.write() {
                m.record_discarded(1);
            }
            continue;
        }

        // Never hold the lock across execution; the background phase may
        // be arbitrarily slow.
        drop(st);
        let succeeded = (entry.fire)(&inner.dispatcher);
        if succeeded {
            debug!("Fired '{}'", entry.name);
        } else {
            warn!("Background phase of '{}' failed, routed to on_failure", entry.name);
        }
        if let Ok(mut m) = inner.metrics.write() {
            m.record_firing(&entry.name, succeeded);
        }

        st = inner.state.lock().unwrap();
        if let Some(interval) = entry.interval {
            if !entry.is_canceled() {
                // Re-insert from the due instant read before execution, so
                // a slow background phase does not stretch the schedule.
                st.queue.push(entry, now + interval);
            }
        }
    }
}
