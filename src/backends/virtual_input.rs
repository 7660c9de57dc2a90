//! In-memory device source.
//!
//! [`VirtualSource`] behaves like a host gamepad API with hot-pluggable slots:
//! plugging fills the first empty slot (as browsers and most OS APIs do) and
//! queues a `Connected` event, unplugging empties the slot and queues a
//! `Disconnected` event. Tests and the scripted CLI mode drive it directly.

use crate::device::{ButtonState, DeviceSource, PadState};
use crate::event::DeviceEvent;
use log::debug;

#[derive(Debug, Default)]
pub struct VirtualSource {
    slots: Vec<Option<PadState>>,
    events: Vec<DeviceEvent>,
}

impl VirtualSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Plug in a device with all inputs released. Returns its slot.
    pub fn plug(&mut self, id: &str, buttons: usize, axes: usize) -> usize {
        self.plug_state(PadState::new(id, buttons, axes))
    }

    /// Plug in a device with a given initial state. Returns its slot.
    pub fn plug_state(&mut self, pad: PadState) -> usize {
        let slot = match self.slots.iter().position(Option::is_none) {
            Some(free) => {
                self.slots[free] = Some(pad);
                free
            }
            None => {
                self.slots.push(Some(pad));
                self.slots.len() - 1
            }
        };
        debug!("virtual: plugged slot {slot}");
        self.events.push(DeviceEvent::Connected { slot });
        slot
    }

    /// Remove the device in `slot`. Returns `false` if the slot was already empty.
    pub fn unplug(&mut self, slot: usize) -> bool {
        match self.slots.get_mut(slot).and_then(Option::take) {
            Some(_) => {
                debug!("virtual: unplugged slot {slot}");
                self.events.push(DeviceEvent::Disconnected { slot });
                true
            }
            None => false,
        }
    }

    /// Flip the `connected` flag without queuing an event.
    ///
    /// Models a slot the host still lists after the device has gone.
    pub fn set_connected(&mut self, slot: usize, connected: bool) {
        if let Some(pad) = self.pad_mut(slot) {
            pad.connected = connected;
        }
    }

    /// Digital press/release; `value` follows as `1.0`/`0.0`.
    pub fn press(&mut self, slot: usize, button: usize, pressed: bool) {
        self.set_button(slot, button, ButtonState::digital(pressed));
    }

    pub fn set_button(&mut self, slot: usize, button: usize, state: ButtonState) {
        if let Some(b) = self.pad_mut(slot).and_then(|p| p.buttons.get_mut(button)) {
            *b = state;
        }
    }

    /// Set an axis, clamped to `[-1.0, 1.0]`.
    pub fn set_axis(&mut self, slot: usize, axis: usize, value: f32) {
        if let Some(a) = self.pad_mut(slot).and_then(|p| p.axes.get_mut(axis)) {
            *a = value.clamp(-1.0, 1.0);
        }
    }

    pub fn pad_mut(&mut self, slot: usize) -> Option<&mut PadState> {
        self.slots.get_mut(slot).and_then(Option::as_mut)
    }
}

impl DeviceSource for VirtualSource {
    fn slots(&self) -> Vec<Option<PadState>> {
        self.slots.clone()
    }

    fn slot(&self, index: usize) -> Option<PadState> {
        self.slots.get(index).cloned().flatten()
    }

    fn drain_events(&mut self) -> Vec<DeviceEvent> {
        std::mem::take(&mut self.events)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plug_reuses_first_free_slot() {
        let mut src = VirtualSource::new();
        assert_eq!(src.plug("a", 4, 2), 0);
        assert_eq!(src.plug("b", 4, 2), 1);
        assert!(src.unplug(0));
        assert_eq!(src.plug("c", 4, 2), 0);
        assert_eq!(src.slot(0).unwrap().id, "c");
        assert_eq!(
            src.drain_events(),
            vec![
                DeviceEvent::Connected { slot: 0 },
                DeviceEvent::Connected { slot: 1 },
                DeviceEvent::Disconnected { slot: 0 },
                DeviceEvent::Connected { slot: 0 },
            ]
        );
        assert!(src.drain_events().is_empty());
    }

    #[test]
    fn stale_slot_is_present_but_not_connected() {
        let mut src = VirtualSource::new();
        let slot = src.plug("a", 1, 1);
        src.set_connected(slot, false);
        assert!(src.slot(slot).is_some());
        assert!(src.connected().is_empty());
    }

    #[test]
    fn out_of_range_writes_are_ignored() {
        let mut src = VirtualSource::new();
        let slot = src.plug("a", 1, 1);
        src.press(slot, 5, true);
        src.set_axis(7, 0, 1.0);
        src.set_axis(slot, 0, 3.0);
        let pad = src.slot(slot).unwrap();
        assert_eq!(pad.pressed(), vec![false]);
        assert_eq!(pad.axes, vec![1.0]);
        assert!(!src.unplug(9));
    }
}
