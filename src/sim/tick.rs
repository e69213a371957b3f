//! Recurring timed actions
//!
//! A `Tick` runs its action every `delay` seconds of accumulated frame time.
//! Ticks are obtained from the scheduler's pool, placed in its slot array,
//! advanced once per frame and recycled once stopped.

use std::cell::Cell;
use std::fmt;
use std::rc::Rc;

use crate::error::SchedulerError;
use crate::pool::{ObjectPool, Poolable, SlotArray};

/// The action run each time a tick's delay elapses
pub type TickAction = Box<dyn FnMut()>;

/// Timing state shared between a tick and its handles
#[derive(Debug, Default)]
struct TickStatus {
    /// Seconds between actions
    delay: Cell<f32>,
    /// Seconds accumulated since the last action
    elapsed: Cell<f32>,
    /// Number of times the action ran
    fired: Cell<u32>,
    stopped: Cell<bool>,
}

impl TickStatus {
    fn clear(&self) {
        self.delay.set(0.0);
        self.elapsed.set(0.0);
        self.fired.set(0);
        self.stopped.set(false);
    }
}

/// A recurring timed action. Poolable.
#[derive(Default)]
pub struct Tick {
    action: Option<TickAction>,
    status: Rc<TickStatus>,
}

impl fmt::Debug for Tick {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Tick")
            .field("has_action", &self.action.is_some())
            .field("status", &self.status)
            .finish()
    }
}

impl Tick {
    /// Set the action executed every time the delay elapses
    pub fn action(mut self, action: impl FnMut() + 'static) -> Self {
        self.action = Some(Box::new(action));
        self
    }

    /// Set the delay in seconds between actions
    pub fn delay(self, seconds: f32) -> Self {
        self.status.delay.set(seconds);
        self
    }

    /// Handle for observing or stopping this tick once it is scheduled.
    ///
    /// Taking the handle before scheduling lets the action capture it and stop itself.
    pub fn handle(&self) -> TickHandle {
        TickHandle {
            status: Rc::clone(&self.status),
        }
    }

    pub fn has_action(&self) -> bool {
        self.action.is_some()
    }

    pub fn is_stopped(&self) -> bool {
        self.status.stopped.get()
    }

    /// Accumulate `delta` and run the action at most once.
    ///
    /// Returns true if the action ran.
    fn update(&mut self, delta: f32) -> bool {
        let status = &self.status;
        if status.stopped.get() {
            return false;
        }

        status.elapsed.set(status.elapsed.get() + delta);
        if status.elapsed.get() < status.delay.get() {
            return false;
        }

        let Some(action) = self.action.as_mut() else {
            unreachable!("scheduler placed a tick without an action");
        };
        action();
        status.elapsed.set(0.0);
        status.fired.set(status.fired.get().saturating_add(1));
        true
    }
}

impl Poolable for Tick {
    fn reset(&mut self) {
        self.action = None;
        if Rc::strong_count(&self.status) > 1 {
            // Outstanding handles keep the old status; the recycled tick starts fresh
            self.status = Rc::default();
        } else {
            self.status.clear();
        }
    }
}

/// Shared view of a scheduled tick.
///
/// Handles outlive recycling safely: once the tick returns to the pool, the
/// handle keeps reporting the tick's final state and `stop` has no effect on
/// whichever tick reuses the pooled instance.
#[derive(Debug, Clone)]
pub struct TickHandle {
    status: Rc<TickStatus>,
}

impl TickHandle {
    /// Stop the tick. Takes effect on the next scheduler pass; idempotent.
    pub fn stop(&self) {
        self.status.stopped.set(true);
    }

    pub fn is_stopped(&self) -> bool {
        self.status.stopped.get()
    }

    pub fn fired_count(&self) -> u32 {
        self.status.fired.get()
    }

    pub fn elapsed(&self) -> f32 {
        self.status.elapsed.get()
    }

    pub fn delay(&self) -> f32 {
        self.status.delay.get()
    }

    /// Change the delay while the tick runs
    pub fn set_delay(&self, seconds: f32) -> Result<(), SchedulerError> {
        validate_delay(seconds)?;
        self.status.delay.set(seconds);
        Ok(())
    }
}

fn validate_delay(seconds: f32) -> Result<(), SchedulerError> {
    if seconds.is_finite() && seconds >= 0.0 {
        Ok(())
    } else {
        Err(SchedulerError::InvalidDelay(seconds))
    }
}

/// Runs scheduled ticks and recycles stopped ones
#[derive(Debug)]
pub struct TickScheduler {
    running: SlotArray<Tick>,
    pool: ObjectPool<Tick>,
}

impl Default for TickScheduler {
    fn default() -> Self {
        Self::new(crate::consts::DEFAULT_TICK_CAPACITY)
    }
}

impl TickScheduler {
    /// Create a scheduler with room for `capacity` running ticks
    pub fn new(capacity: usize) -> Self {
        log::info!("Tick scheduler created with initial capacity of {}", capacity);
        Self {
            running: SlotArray::with_capacity(capacity),
            pool: ObjectPool::with_capacity(capacity),
        }
    }

    /// Pre-construct `count` pooled ticks
    pub fn prewarm(&mut self, count: usize) {
        self.pool.fill(count);
    }

    /// Obtain an unconfigured tick from the pool
    pub fn obtain(&mut self) -> Tick {
        self.pool.obtain()
    }

    /// Obtain a tick, configure it and start running it
    pub fn schedule(
        &mut self,
        action: impl FnMut() + 'static,
        delay: f32,
    ) -> Result<TickHandle, SchedulerError> {
        validate_delay(delay)?;
        let tick = self.pool.obtain().action(action).delay(delay);
        self.schedule_existing(tick)
    }

    /// Start running a tick configured by the caller.
    ///
    /// Fails without placing the tick if its action is unset or its delay is invalid;
    /// the rejected tick is returned to the pool.
    pub fn schedule_existing(&mut self, tick: Tick) -> Result<TickHandle, SchedulerError> {
        let check = if tick.has_action() {
            validate_delay(tick.status.delay.get())
        } else {
            Err(SchedulerError::MissingAction)
        };
        if let Err(err) = check {
            self.pool.free(tick);
            return Err(err);
        }

        let handle = tick.handle();
        let slot = self.running.insert(tick);
        log::trace!("Tick scheduled in slot {}", slot);
        Ok(handle)
    }

    /// Advance every running tick by `delta` seconds.
    ///
    /// Stopped ticks are recycled and their slot cleared. A running tick whose
    /// delay elapsed runs its action once, even if several delays fit in `delta`.
    pub fn advance(&mut self, delta: f32) {
        for index in 0..self.running.slot_count() {
            let stopped = match self.running.get(index) {
                Some(tick) => tick.is_stopped(),
                None => continue,
            };

            if stopped {
                if let Some(tick) = self.running.remove(index) {
                    self.pool.free(tick);
                    log::trace!("Recycled stopped tick from slot {}", index);
                }
                continue;
            }

            if let Some(tick) = self.running.get_mut(index) {
                tick.update(delta);
            }
        }
    }

    /// Stop every running tick; they are recycled on the next `advance`
    pub fn stop_all(&mut self) {
        for (_, tick) in self.running.iter() {
            tick.handle().stop();
        }
    }

    /// Number of ticks occupying a slot, including stopped ones awaiting recycling
    pub fn active_count(&self) -> usize {
        self.running.len()
    }

    pub fn pool(&self) -> &ObjectPool<Tick> {
        &self.pool
    }
}
