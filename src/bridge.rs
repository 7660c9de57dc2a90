//! The input bridge.
//!
//! [`Bridge`] owns the whole session: the device source, the sink, the active
//! slot, the poll task and last frame's snapshot. It is driven from outside by
//! three kinds of calls, all on one thread:
//!
//! - [`Bridge::start`] once, then [`Bridge::advance`] whenever time passes
//!   (fires the handshake retry and poll ticks),
//! - [`Bridge::handle_event`] for host connect/disconnect notifications,
//! - direct operations a host may invoke: [`Bridge::connect_device`],
//!   [`Bridge::select`], [`Bridge::device_info`].
//!
//! # States
//! `Idle` (no active device, no poll task) and `Active` (one device, one poll
//! task). The poll task exists iff a device is active; every path that replaces
//! or clears the active device cancels the previous task first.
//!
//! # Example
//! ```
//! use padbridge::{Bridge, BridgeConfig, VirtualSource};
//! use std::time::{Duration, Instant};
//!
//! let mut source = VirtualSource::new();
//! source.plug("Pad A", 10, 4);
//! let mut bridge = Bridge::new(BridgeConfig::default(), source, Vec::<String>::new());
//!
//! let t0 = Instant::now();
//! bridge.start(t0);
//! assert_eq!(bridge.sink()[1], "contanki::on_connect::10::4::Pad A");
//!
//! bridge.source_mut().press(0, 2, true);
//! bridge.advance(t0 + Duration::from_millis(50));
//! assert_eq!(bridge.sink().last().unwrap(), "contanki::press::2::true");
//! ```

use crate::command::{encode_device_info, Command};
use crate::config::{BridgeConfig, EmissionMode, SelectionPolicy};
use crate::device::{DeviceSource, PadState};
use crate::error::BridgeError;
use crate::event::{DeviceEvent, InputChange};
use crate::sink::Sink;
use crate::snapshot::FrameSnapshot;
use crate::timer::{HandleAllocator, RepeatingTask, TaskHandle};
use log::{debug, info, trace, warn};
use std::time::Instant;

/// Coarse bridge state.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BridgeState {
    Idle,
    Active { slot: usize },
}

/// Counters, mostly for diagnostics and tests.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct BridgeStats {
    pub handshake_attempts: u64,
    pub tasks_started: u64,
    pub tasks_cancelled: u64,
    pub ticks: u64,
    pub sent: u64,
    pub send_failures: u64,
}

pub struct Bridge<S, K> {
    config: BridgeConfig,
    source: S,
    sink: K,
    /// Set once the handshake succeeded. Device events are dropped before that.
    ready: bool,
    handshake_retry: Option<Instant>,
    active: Option<usize>,
    poll_task: Option<RepeatingTask>,
    handles: HandleAllocator,
    snapshot: FrameSnapshot,
    /// Slots listed by the last discovery, in order. Indexed by [`Bridge::select`].
    registered: Vec<usize>,
    /// Latest time seen through `start`/`advance`/`handle_event`.
    clock: Instant,
    stats: BridgeStats,
}

impl<S: DeviceSource, K: Sink> Bridge<S, K> {
    pub fn new(config: BridgeConfig, source: S, sink: K) -> Self {
        Self {
            config,
            source,
            sink,
            ready: false,
            handshake_retry: None,
            active: None,
            poll_task: None,
            handles: HandleAllocator::default(),
            snapshot: FrameSnapshot::default(),
            registered: Vec::new(),
            clock: Instant::now(),
            stats: BridgeStats::default(),
        }
    }

    /// Begin the handshake. If the sink refuses, it is retried from
    /// [`advance`](Self::advance) every `handshake_retry_ms` until it succeeds.
    pub fn start(&mut self, now: Instant) {
        self.clock = now;
        self.try_initialise();
    }

    /// Fire whatever is due at `now`: the handshake retry, then at most one poll tick.
    pub fn advance(&mut self, now: Instant) {
        self.clock = now;

        if self.handshake_retry.is_some_and(|due| now >= due) {
            self.handshake_retry = None;
            self.try_initialise();
        }

        let tick = self
            .poll_task
            .as_mut()
            .is_some_and(|task| task.fire_if_due(now));
        if tick {
            self.poll();
        }
    }

    /// Earliest time [`advance`](Self::advance) has something to do.
    pub fn next_deadline(&self) -> Option<Instant> {
        let poll = self.poll_task.as_ref().map(RepeatingTask::next_due);
        match (self.handshake_retry, poll) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        }
    }

    /// Route a host notification. Ignored until the handshake has succeeded.
    pub fn handle_event(&mut self, event: DeviceEvent, now: Instant) {
        self.clock = now;
        if !self.ready {
            debug!("Dropping {event:?}: bridge not ready");
            return;
        }
        match event {
            DeviceEvent::Connected { .. } => self.on_device_connect(),
            DeviceEvent::Disconnected { slot } => match self.active {
                Some(active) if active == slot => self.on_device_disconnect(),
                Some(active) => {
                    debug!("Slot {slot} disconnected, keeping active slot {active}");
                }
                // Already idle (e.g. a poll tick saw the device go first): the
                // disconnect was reported then, only look for a replacement.
                None => {
                    debug!("Slot {slot} disconnected while idle");
                    if !self.source.connected().is_empty() {
                        self.on_device_connect();
                    }
                }
            },
        }
    }

    /// Discovery: list connected devices and pick one if none is active.
    pub fn on_device_connect(&mut self) {
        let present = self.source.connected();
        self.registered = present.iter().map(|(slot, _)| *slot).collect();

        if present.is_empty() {
            debug!("Discovery found no devices");
            self.emit(Command::Message(self.config.no_device_message.clone()));
            return;
        }

        if present.len() > 1 {
            let listing = present.iter().map(|(_, pad)| pad.summary()).collect();
            self.emit(Command::Register(listing));
        }

        if let Some(active) = self.active {
            if self.registered.contains(&active) {
                debug!("Slot {active} already active, keeping it");
                return;
            }
        }

        if let Some(slot) = select_device(&present, self.config.selection) {
            self.connect_device(slot);
        }
    }

    /// Make `slot` the active device. Returns `false` (and stays idle) if the
    /// slot no longer holds a connected device.
    pub fn connect_device(&mut self, slot: usize) -> bool {
        self.cancel_poll_task();

        let Some(pad) = self.source.slot(slot).filter(|pad| pad.connected) else {
            warn!("Slot {slot} vanished before it could be activated");
            self.active = None;
            self.snapshot.clear();
            self.emit(Command::Message(format!(
                "Controller {slot} is no longer available."
            )));
            return false;
        };

        info!(
            "Activating slot {slot}: {} ({} buttons, {} axes)",
            pad.id,
            pad.button_count(),
            pad.axis_count()
        );
        self.emit(Command::Connect {
            buttons: pad.button_count(),
            axes: pad.axis_count(),
            id: pad.id.clone(),
        });
        self.active = Some(slot);
        self.snapshot.reset(pad.button_count(), pad.axis_count());
        let task = RepeatingTask::start(self.handles.next(), self.config.poll_interval(), self.clock);
        trace!("Started poll task {:?} for slot {slot}", task.handle());
        self.poll_task = Some(task);
        self.stats.tasks_started += 1;
        true
    }

    /// Drop the active device, then fail over to any other connected device.
    pub fn on_device_disconnect(&mut self) {
        self.emit(Command::Disconnect);
        self.cancel_poll_task();
        if let Some(slot) = self.active.take() {
            info!("Slot {slot} disconnected");
        }
        self.snapshot.clear();

        if !self.source.connected().is_empty() {
            debug!("Other devices present, re-running discovery");
            self.on_device_connect();
        }
    }

    /// One poll tick. Normally called from [`advance`](Self::advance).
    pub fn poll(&mut self) {
        let Some(slot) = self.active else {
            return;
        };
        self.stats.ticks += 1;

        let pad = match self.source.slot(slot) {
            Some(pad) if pad.connected => pad,
            _ => {
                debug!("Active slot {slot} is gone");
                self.on_device_disconnect();
                return;
            }
        };

        if !self.snapshot.matches_shape(&pad) {
            info!("Slot {slot} changed layout, re-activating");
            self.connect_device(slot);
            return;
        }

        match self.config.emission {
            EmissionMode::Edge => {
                for change in self.snapshot.diff(&pad, self.config.axis_epsilon) {
                    self.emit(match change {
                        InputChange::Button { index, pressed } => Command::Press { index, pressed },
                        InputChange::Axis { index, value } => Command::Axis { index, value },
                    });
                }
            }
            EmissionMode::Snapshot => {
                self.snapshot.diff(&pad, self.config.axis_epsilon);
                self.emit(Command::Poll {
                    buttons: pad.pressed(),
                    axes: pad.axes,
                });
            }
        }
    }

    /// Activate the device at `position` in the last discovery listing.
    pub fn select(&mut self, position: usize) -> Result<bool, BridgeError> {
        let slot = *self
            .registered
            .get(position)
            .ok_or(BridgeError::UnknownSelection {
                position,
                available: self.registered.len(),
            })?;
        Ok(self.connect_device(slot))
    }

    /// `%%%<id>%<buttons>%<axes>` for every connected device. No side effects.
    pub fn device_info(&self) -> String {
        let summaries: Vec<_> = self
            .source
            .connected()
            .iter()
            .map(|(_, pad)| pad.summary())
            .collect();
        encode_device_info(&summaries)
    }

    pub fn state(&self) -> BridgeState {
        match self.active {
            Some(slot) => BridgeState::Active { slot },
            None => BridgeState::Idle,
        }
    }

    #[inline]
    pub fn is_ready(&self) -> bool {
        self.ready
    }

    #[inline]
    pub fn active_slot(&self) -> Option<usize> {
        self.active
    }

    #[inline]
    pub fn is_polling(&self) -> bool {
        self.poll_task.is_some()
    }

    pub fn registered(&self) -> &[usize] {
        &self.registered
    }

    pub fn snapshot(&self) -> &FrameSnapshot {
        &self.snapshot
    }

    pub fn stats(&self) -> BridgeStats {
        self.stats
    }

    /// Handle of the running poll task, if any.
    pub fn poll_task_handle(&self) -> Option<TaskHandle> {
        self.poll_task.as_ref().map(RepeatingTask::handle)
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn source_mut(&mut self) -> &mut S {
        &mut self.source
    }

    pub fn sink(&self) -> &K {
        &self.sink
    }

    pub fn sink_mut(&mut self) -> &mut K {
        &mut self.sink
    }

    fn try_initialise(&mut self) {
        if self.ready {
            return;
        }
        self.stats.handshake_attempts += 1;

        let line = Command::Initialise.encode(&self.config.namespace);
        if let Err(e) = self.sink.send(&line) {
            debug!(
                "Handshake failed ({e}), retrying in {} ms",
                self.config.handshake_retry_ms
            );
            self.handshake_retry = Some(self.clock + self.config.handshake_retry());
            return;
        }

        self.stats.sent += 1;
        self.ready = true;
        self.handshake_retry = None;
        info!(
            "Bridge ready after {} handshake attempt(s)",
            self.stats.handshake_attempts
        );

        if self.config.scan_on_ready && !self.source.connected().is_empty() {
            self.on_device_connect();
        }
    }

    fn cancel_poll_task(&mut self) {
        if let Some(task) = self.poll_task.take() {
            trace!("Cancelled poll task {:?}", task.handle());
            self.stats.tasks_cancelled += 1;
        }
    }

    fn emit(&mut self, command: Command) {
        let line = command.encode(&self.config.namespace);
        match self.sink.send(&line) {
            Ok(()) => {
                trace!("-> {line}");
                self.stats.sent += 1;
            }
            Err(e) => {
                warn!("Failed to send `{line}`: {e}");
                self.stats.send_failures += 1;
            }
        }
    }
}

/// Pick the slot to activate among connected devices.
///
/// `MostCapable` takes the device with the most digital inputs, the first one
/// in slot order on ties. `FirstSeen` takes the first one.
pub fn select_device(candidates: &[(usize, PadState)], policy: SelectionPolicy) -> Option<usize> {
    match policy {
        SelectionPolicy::FirstSeen => candidates.first().map(|(slot, _)| *slot),
        SelectionPolicy::MostCapable => {
            let mut best: Option<(usize, usize)> = None;
            for (slot, pad) in candidates {
                if best.map_or(true, |(_, count)| pad.button_count() > count) {
                    best = Some((*slot, pad.button_count()));
                }
            }
            best.map(|(slot, _)| slot)
        }
    }
}
