//! Device notifications and per-field changes.
//!
//! [`DeviceEvent`] is what the host tells the bridge (a device appeared or went
//! away). [`InputChange`] is what the bridge computes each poll tick: small,
//! index-addressed deltas against the previous frame.

/// Host notification about a device slot.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DeviceEvent {
    /// A device became available in `slot`.
    Connected { slot: usize },
    /// The device in `slot` went away.
    Disconnected { slot: usize },
}

/// A single field that differs from the previous frame.
///
/// Indices are device-local: input `index` matches `PadState::buttons[index]`,
/// axis `index` matches `PadState::axes[index]`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum InputChange {
    /// A digital input changed its pressed state.
    Button { index: usize, pressed: bool },
    /// An axis moved.
    Axis { index: usize, value: f32 },
}
