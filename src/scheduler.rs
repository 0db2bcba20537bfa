//! Periodic tick scheduling for the timer engine.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::Sender;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use tracing::{debug, trace};

/// Identifies one armed periodic schedule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ScheduleHandle(u64);

/// Message sent from a scheduler thread to the thread owning the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerMessage {
    /// The schedule identified by the handle fired.
    Tick(ScheduleHandle),
}

/// Arms and disarms periodic ticks.
pub trait Scheduler {
    /// Starts firing at roughly `interval` until disarmed.
    fn arm_periodic(&mut self, interval: Duration) -> ScheduleHandle;

    /// Stops the given schedule. Unknown handles are ignored.
    fn disarm(&mut self, handle: ScheduleHandle);
}

/// Fires ticks from a background thread onto an mpsc channel.
pub struct ThreadScheduler {
    tx: Sender<TimerMessage>,
    next_id: u64,
    active: HashMap<ScheduleHandle, Arc<AtomicBool>>,
}

impl ThreadScheduler {
    pub fn new(tx: Sender<TimerMessage>) -> Self {
        Self {
            tx,
            next_id: 0,
            active: HashMap::new(),
        }
    }
}

impl Scheduler for ThreadScheduler {
    fn arm_periodic(&mut self, interval: Duration) -> ScheduleHandle {
        self.next_id += 1;
        let handle = ScheduleHandle(self.next_id);
        let cancelled = Arc::new(AtomicBool::new(false));
        self.active.insert(handle, Arc::clone(&cancelled));

        let tx = self.tx.clone();
        thread::spawn(move || loop {
            thread::sleep(interval);
            if cancelled.load(Ordering::Acquire) {
                trace!(?handle, "tick thread stopped");
                break;
            }
            if tx.send(TimerMessage::Tick(handle)).is_err() {
                // Receiver is gone, nobody is listening anymore
                break;
            }
        });

        debug!(?handle, ?interval, "armed periodic tick");
        handle
    }

    fn disarm(&mut self, handle: ScheduleHandle) {
        if let Some(cancelled) = self.active.remove(&handle) {
            cancelled.store(true, Ordering::Release);
            debug!(?handle, "disarmed periodic tick");
        }
    }
}

impl Drop for ThreadScheduler {
    fn drop(&mut self) {
        for cancelled in self.active.values() {
            cancelled.store(true, Ordering::Release);
        }
    }
}

/// Records arm/disarm calls without spawning anything.
#[cfg(test)]
#[derive(Debug, Default)]
pub struct ManualScheduler {
    next_id: u64,
    pub armed: Vec<ScheduleHandle>,
    pub disarmed: Vec<ScheduleHandle>,
}

#[cfg(test)]
impl ManualScheduler {
    /// Handles that are armed and not yet disarmed.
    pub fn live(&self) -> Vec<ScheduleHandle> {
        self.armed
            .iter()
            .filter(|h| !self.disarmed.contains(h))
            .copied()
            .collect()
    }
}

#[cfg(test)]
impl Scheduler for ManualScheduler {
    fn arm_periodic(&mut self, _interval: Duration) -> ScheduleHandle {
        self.next_id += 1;
        let handle = ScheduleHandle(self.next_id);
        self.armed.push(handle);
        handle
    }

    fn disarm(&mut self, handle: ScheduleHandle) {
        self.disarmed.push(handle);
    }
}
