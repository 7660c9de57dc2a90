//! Cancellable repeating task.
//!
//! The bridge owns at most one [`RepeatingTask`]. Time is passed in explicitly
//! (`Instant`) so the host loop decides what "now" is and tests can drive ticks
//! deterministically.
//!
//! Cancelling a task means dropping it: the owner holds it in an `Option` and
//! `take()`s it. Every task gets a fresh [`TaskHandle`] so logs and callers can
//! tell a replacement apart from the task it replaced.

use std::time::{Duration, Instant};

/// Identity of one scheduled task.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TaskHandle(u64);

/// Hands out unique [`TaskHandle`]s.
#[derive(Debug, Default)]
pub struct HandleAllocator {
    next: u64,
}

impl HandleAllocator {
    pub fn next(&mut self) -> TaskHandle {
        let handle = TaskHandle(self.next);
        self.next += 1;
        handle
    }
}

/// A task that fires every `period`, starting one period after creation.
#[derive(Debug)]
pub struct RepeatingTask {
    handle: TaskHandle,
    period: Duration,
    next_due: Instant,
}

impl RepeatingTask {
    pub fn start(handle: TaskHandle, period: Duration, now: Instant) -> Self {
        Self {
            handle,
            period,
            next_due: now + period,
        }
    }

    #[inline]
    pub fn handle(&self) -> TaskHandle {
        self.handle
    }

    #[inline]
    pub fn next_due(&self) -> Instant {
        self.next_due
    }

    /// If the task is due at `now`, schedule the following tick and return `true`.
    ///
    /// Fires at most once per call. Periods missed while the host was busy are
    /// skipped rather than replayed back to back.
    pub fn fire_if_due(&mut self, now: Instant) -> bool {
        if now < self.next_due {
            return false;
        }
        self.next_due += self.period;
        if self.next_due <= now {
            self.next_due = now + self.period;
        }
        true
    }
}
