//! Previous-frame snapshot of the active device.
//!
//! [`FrameSnapshot`] holds the pressed flags and axis values seen on the last
//! poll tick. [`FrameSnapshot::diff`] compares a fresh [`PadState`] against it,
//! returns one [`InputChange`] per differing field and updates itself in place.
//!
//! # Semantics
//! - Changes come out in input-index order, then axis-index order.
//! - An axis counts as changed when `|new - old| > epsilon`. With the default
//!   epsilon of `0.0` that is any change at all.
//! - The snapshot is only meaningful for the device it was [`reset`](FrameSnapshot::reset)
//!   for. The bridge resets it on every activation.

use crate::device::PadState;
use crate::event::InputChange;

/// Owned copy of last frame's input state.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FrameSnapshot {
    buttons: Vec<bool>,
    axes: Vec<f32>,
}

impl FrameSnapshot {
    /// All inputs released and axes centred, sized for a device.
    pub fn sized(buttons: usize, axes: usize) -> Self {
        Self {
            buttons: vec![false; buttons],
            axes: vec![0.0; axes],
        }
    }

    /// Resize to a (new) device and forget previous values.
    pub fn reset(&mut self, buttons: usize, axes: usize) {
        self.buttons.clear();
        self.buttons.resize(buttons, false);
        self.axes.clear();
        self.axes.resize(axes, 0.0);
    }

    /// Drop everything. Used when no device is active.
    pub fn clear(&mut self) {
        self.buttons.clear();
        self.axes.clear();
    }

    #[inline]
    pub fn buttons(&self) -> &[bool] {
        &self.buttons
    }

    #[inline]
    pub fn axes(&self) -> &[f32] {
        &self.axes
    }

    /// `true` if `pad` has the same number of inputs and axes as this snapshot.
    pub fn matches_shape(&self, pad: &PadState) -> bool {
        self.buttons.len() == pad.button_count() && self.axes.len() == pad.axis_count()
    }

    /// Compare `pad` against the snapshot, record its values, and return what changed.
    ///
    /// Fields beyond the snapshot's length are ignored; callers check
    /// [`matches_shape`](Self::matches_shape) first.
    pub fn diff(&mut self, pad: &PadState, epsilon: f32) -> Vec<InputChange> {
        let mut changes = Vec::new();

        for (index, (last, now)) in self.buttons.iter_mut().zip(&pad.buttons).enumerate() {
            if *last != now.pressed {
                *last = now.pressed;
                changes.push(InputChange::Button {
                    index,
                    pressed: now.pressed,
                });
            }
        }

        for (index, (last, &now)) in self.axes.iter_mut().zip(&pad.axes).enumerate() {
            if (now - *last).abs() > epsilon {
                *last = now;
                changes.push(InputChange::Axis { index, value: now });
            }
        }

        changes
    }
}
