use std::sync::{Arc, Mutex};
use std::time::Duration;

use charcount_core::Millis;
use engine_logging::engine_trace;
use tokio::runtime::Handle;
use tokio_util::sync::CancellationToken;

use crate::{Clock, EngineError, ManualClock};

pub type TickFn = Arc<dyn Fn() + Send + Sync>;

/// Owned handle to a repeating timer. Cancelling twice is a no-op, and
/// dropping the handle cancels the timer.
#[derive(Debug)]
pub struct TimerHandle {
    token: CancellationToken,
}

impl TimerHandle {
    fn new(token: CancellationToken) -> Self {
        Self { token }
    }

    pub fn cancel(&self) {
        if !self.token.is_cancelled() {
            engine_trace!("reconciliation timer cancelled");
        }
        self.token.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }
}

impl Drop for TimerHandle {
    fn drop(&mut self) {
        self.token.cancel();
    }
}

pub trait Scheduler: Send + Sync {
    /// Calls `tick` every `interval` until the returned handle is cancelled.
    /// The first tick fires one interval after scheduling.
    fn schedule_repeating(&self, interval: Duration, tick: TickFn) -> TimerHandle;
}

/// Drives timers as tasks on a tokio runtime.
#[derive(Debug, Clone)]
pub struct TokioScheduler {
    runtime: Handle,
}

impl TokioScheduler {
    pub fn new(runtime: Handle) -> Self {
        Self { runtime }
    }

    /// Uses the runtime the caller is running on.
    pub fn current() -> Result<Self, EngineError> {
        Handle::try_current()
            .map(Self::new)
            .map_err(|_| EngineError::NoRuntime)
    }
}

impl Scheduler for TokioScheduler {
    fn schedule_repeating(&self, interval: Duration, tick: TickFn) -> TimerHandle {
        let token = CancellationToken::new();
        let cancelled = token.clone();
        self.runtime.spawn(async move {
            let start = tokio::time::Instant::now() + interval;
            let mut ticker = tokio::time::interval_at(start, interval);
            loop {
                tokio::select! {
                    _ = cancelled.cancelled() => break,
                    _ = ticker.tick() => tick(),
                }
            }
        });
        engine_trace!("reconciliation timer started interval_ms={}", interval.as_millis());
        TimerHandle::new(token)
    }
}

struct ManualTimer {
    token: CancellationToken,
    interval: Millis,
    next_due: Millis,
    tick: TickFn,
}

/// Deterministic scheduler that fires timers as a shared `ManualClock` is advanced.
pub struct ManualScheduler {
    clock: Arc<ManualClock>,
    timers: Mutex<Vec<ManualTimer>>,
}

impl ManualScheduler {
    pub fn new(clock: Arc<ManualClock>) -> Self {
        Self {
            clock,
            timers: Mutex::new(Vec::new()),
        }
    }

    /// Number of timers that have not been cancelled.
    pub fn active_timers(&self) -> usize {
        self.timers
            .lock()
            .map(|timers| {
                timers
                    .iter()
                    .filter(|timer| !timer.token.is_cancelled())
                    .count()
            })
            .unwrap_or(0)
    }

    /// Moves the clock forward by `by`, firing every tick that falls due in
    /// order of its deadline.
    pub fn advance(&self, by: Millis) {
        let target = self.clock.now_millis().saturating_add(by);
        while let Some((due, tick)) = self.next_due(target) {
            self.clock.set(due);
            tick();
        }
        self.clock.set(target);
    }

    fn next_due(&self, target: Millis) -> Option<(Millis, TickFn)> {
        let mut timers = self.timers.lock().ok()?;
        timers.retain(|timer| !timer.token.is_cancelled());
        let timer = timers
            .iter_mut()
            .filter(|timer| timer.next_due <= target)
            .min_by_key(|timer| timer.next_due)?;
        let due = timer.next_due;
        timer.next_due = due.saturating_add(timer.interval.max(1));
        Some((due, timer.tick.clone()))
    }
}

impl Scheduler for ManualScheduler {
    fn schedule_repeating(&self, interval: Duration, tick: TickFn) -> TimerHandle {
        let token = CancellationToken::new();
        let interval = Millis::try_from(interval.as_millis()).unwrap_or(Millis::MAX);
        if let Ok(mut timers) = self.timers.lock() {
            timers.push(ManualTimer {
                token: token.clone(),
                interval,
                next_due: self.clock.now_millis().saturating_add(interval),
                tick,
            });
        }
        TimerHandle::new(token)
    }
}
