//! Device slots and the source trait.
//!
//! A [`DeviceSource`] is the host's gamepad enumeration API: an ordered list of
//! slots, each either empty or holding a [`PadState`]. Slot indices are the
//! stable handles the bridge records for the active device.
//!
//! ## Value conventions
//! - **Inputs:** `pressed` is the digital state, `value` is in `[0.0, 1.0]`
//!   (analog triggers report partial values).
//! - **Axes:** normalized to `[-1.0, 1.0]`, Y axes down-positive.

use crate::event::DeviceEvent;
use std::time::Instant;

/// State of one digital input.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct ButtonState {
    pub pressed: bool,
    pub value: f32,
}

impl ButtonState {
    pub fn new(pressed: bool, value: f32) -> Self {
        Self { pressed, value }
    }

    /// Fully pressed (`value = 1.0`) or fully released.
    pub fn digital(pressed: bool) -> Self {
        Self {
            pressed,
            value: if pressed { 1.0 } else { 0.0 },
        }
    }
}

/// Point-in-time view of one device slot.
#[derive(Clone, Debug, PartialEq)]
pub struct PadState {
    /// Identity string reported by the host.
    pub id: String,
    /// `false` when the slot still exists but the device has gone away.
    pub connected: bool,
    pub buttons: Vec<ButtonState>,
    pub axes: Vec<f32>,
}

impl PadState {
    /// A connected device with all inputs released and axes centred.
    pub fn new(id: impl Into<String>, buttons: usize, axes: usize) -> Self {
        Self {
            id: id.into(),
            connected: true,
            buttons: vec![ButtonState::default(); buttons],
            axes: vec![0.0; axes],
        }
    }

    #[inline]
    pub fn button_count(&self) -> usize {
        self.buttons.len()
    }

    #[inline]
    pub fn axis_count(&self) -> usize {
        self.axes.len()
    }

    /// Pressed flags in input order.
    pub fn pressed(&self) -> Vec<bool> {
        self.buttons.iter().map(|b| b.pressed).collect()
    }

    pub fn summary(&self) -> DeviceSummary {
        DeviceSummary {
            id: self.id.clone(),
            buttons: self.button_count(),
            axes: self.axis_count(),
        }
    }
}

/// Identity and shape of a device, as listed in register messages and the
/// info query.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DeviceSummary {
    pub id: String,
    pub buttons: usize,
    pub axes: usize,
}

/// Host gamepad enumeration API.
pub trait DeviceSource {
    /// All slots in enumeration order. Empty slots are `None`.
    fn slots(&self) -> Vec<Option<PadState>>;

    /// Re-fetch a single slot. `None` if the slot is empty or no longer exists.
    fn slot(&self, index: usize) -> Option<PadState> {
        self.slots().into_iter().nth(index).flatten()
    }

    /// Connect/disconnect notifications accumulated since the last call.
    fn drain_events(&mut self) -> Vec<DeviceEvent>;

    /// Let the source catch up to `now` before its events are drained.
    ///
    /// Live sources have nothing to do. Replayed sources use the caller's
    /// clock here instead of reading the wall clock themselves.
    fn update(&mut self, _now: Instant) {}

    /// Indices and states of every present, connected device, in slot order.
    fn connected(&self) -> Vec<(usize, PadState)> {
        self.slots()
            .into_iter()
            .enumerate()
            .filter_map(|(i, slot)| slot.filter(|pad| pad.connected).map(|pad| (i, pad)))
            .collect()
    }
}

impl<S: DeviceSource + ?Sized> DeviceSource for Box<S> {
    fn slots(&self) -> Vec<Option<PadState>> {
        (**self).slots()
    }

    fn slot(&self, index: usize) -> Option<PadState> {
        (**self).slot(index)
    }

    fn drain_events(&mut self) -> Vec<DeviceEvent> {
        (**self).drain_events()
    }

    fn update(&mut self, now: Instant) {
        (**self).update(now)
    }

    fn connected(&self) -> Vec<(usize, PadState)> {
        (**self).connected()
    }
}
