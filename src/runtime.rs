//! Single-threaded host loop.
//!
//! Hands the clock to the device source, drains its notifications, advances
//! the bridge's timers and sleeps until the next deadline. Nothing here runs concurrently with the bridge: events
//! and ticks are handled one after another on the calling thread.

use crate::bridge::Bridge;
use crate::device::DeviceSource;
use crate::sink::Sink;
use log::debug;
use std::time::{Duration, Instant};

/// Upper bound on one sleep, so device events are noticed promptly even when
/// no timer is pending.
pub const IDLE_WAIT: Duration = Duration::from_millis(10);

/// One loop iteration: deliver pending events, then fire due timers.
///
/// Returns how long the caller may sleep before the next iteration.
pub fn step<S: DeviceSource, K: Sink>(bridge: &mut Bridge<S, K>, now: Instant) -> Duration {
    bridge.source_mut().update(now);
    for event in bridge.source_mut().drain_events() {
        bridge.handle_event(event, now);
    }
    bridge.advance(now);

    bridge
        .next_deadline()
        .map_or(IDLE_WAIT, |due| due.saturating_duration_since(now))
        .min(IDLE_WAIT)
}

/// Start the bridge and run it until `keep_going` returns `false`.
///
/// `keep_going` is asked before every iteration; it is the only way out of the
/// loop, so a caller that never returns `false` runs until the process exits.
pub fn run<S, K, F>(bridge: &mut Bridge<S, K>, mut keep_going: F)
where
    S: DeviceSource,
    K: Sink,
    F: FnMut(&Bridge<S, K>) -> bool,
{
    bridge.start(Instant::now());

    while keep_going(bridge) {
        let wait = step(bridge, Instant::now());
        if !wait.is_zero() {
            std::thread::sleep(wait);
        }
    }
    debug!("Runtime stopped: {:?}", bridge.stats());
}
