//! Hardware gamepads through `gilrs`.
//!
//! Every gamepad is exposed in the standard layout (the one browsers call
//! "standard mapping"), so hosts see the same indices regardless of platform.
//!
//! ## Inputs (17)
//! `0` South, `1` East, `2` West, `3` North, `4` LB, `5` RB, `6` LT, `7` RT,
//! `8` Select, `9` Start, `10` LThumb, `11` RThumb, `12..15` D-pad
//! up/down/left/right, `16` Mode.
//!
//! ## Axes (4)
//! `0` LX, `1` LY, `2` RX, `3` RY, normalized to `[-1, 1]`. Y axes are
//! **inverted** relative to gilrs (down = +1).

use crate::device::{ButtonState, DeviceSource, PadState};
use crate::error::BridgeError;
use crate::event::DeviceEvent;
use gilrs::{Axis, Button, EventType, Gamepad, Gilrs};

const BUTTON_ORDER: [Button; 17] = [
    Button::South,
    Button::East,
    Button::West,
    Button::North,
    Button::LeftTrigger,
    Button::RightTrigger,
    Button::LeftTrigger2,
    Button::RightTrigger2,
    Button::Select,
    Button::Start,
    Button::LeftThumb,
    Button::RightThumb,
    Button::DPadUp,
    Button::DPadDown,
    Button::DPadLeft,
    Button::DPadRight,
    Button::Mode,
];

/// (axis, inverted)
const AXIS_ORDER: [(Axis, bool); 4] = [
    (Axis::LeftStickX, false),
    (Axis::LeftStickY, true),
    (Axis::RightStickX, false),
    (Axis::RightStickY, true),
];

pub struct GilrsSource {
    gilrs: Gilrs,
}

impl GilrsSource {
    pub fn new() -> Result<Self, BridgeError> {
        let gilrs = Gilrs::new().map_err(|e| BridgeError::Backend(e.to_string()))?;
        Ok(Self { gilrs })
    }

    fn identity(pad: &Gamepad<'_>) -> String {
        match (pad.vendor_id(), pad.product_id()) {
            (Some(vid), Some(pid)) => format!(
                "{} (STANDARD GAMEPAD Vendor: {vid:04x} Product: {pid:04x})",
                pad.name()
            ),
            _ => pad.name().to_string(),
        }
    }

    fn read(pad: &Gamepad<'_>) -> PadState {
        let buttons = BUTTON_ORDER
            .iter()
            .map(|&b| {
                let value = pad.button_data(b).map_or(0.0, |d| d.value());
                ButtonState::new(pad.is_pressed(b), value)
            })
            .collect();
        let axes = AXIS_ORDER
            .iter()
            .map(|&(axis, inverted)| {
                let v = pad.value(axis);
                if inverted {
                    -v
                } else {
                    v
                }
            })
            .collect();

        PadState {
            id: Self::identity(pad),
            connected: pad.is_connected(),
            buttons,
            axes,
        }
    }
}

impl DeviceSource for GilrsSource {
    fn slots(&self) -> Vec<Option<PadState>> {
        let mut slots: Vec<Option<PadState>> = Vec::new();
        for (id, pad) in self.gilrs.gamepads() {
            let index = usize::from(id);
            if slots.len() <= index {
                slots.resize(index + 1, None);
            }
            slots[index] = Some(Self::read(&pad));
        }
        slots
    }

    fn slot(&self, index: usize) -> Option<PadState> {
        self.gilrs
            .gamepads()
            .find(|(id, _)| usize::from(*id) == index)
            .map(|(_, pad)| Self::read(&pad))
    }

    /// Pumps gilrs (which also refreshes cached pad state) and keeps only
    /// connect/disconnect notifications.
    fn drain_events(&mut self) -> Vec<DeviceEvent> {
        let mut events = Vec::new();
        while let Some(ev) = self.gilrs.next_event() {
            let slot = usize::from(ev.id);
            match ev.event {
                EventType::Connected => events.push(DeviceEvent::Connected { slot }),
                EventType::Disconnected => events.push(DeviceEvent::Disconnected { slot }),
                _ => {}
            }
        }
        events
    }
}
