//! Scripted virtual devices.
//!
//! A [`Script`] is a JSON list of timed actions applied to a [`VirtualSource`].
//! [`ScriptedSource`] plays one against the clock it is given through
//! [`DeviceSource::update`], so the CLI can demonstrate (or integration-test) a
//! bridge without hardware.
//!
//! ```json
//! [
//!   { "at_ms": 0,   "action": { "type": "plug", "id": "Pad A", "buttons": 10, "axes": 4 } },
//!   { "at_ms": 200, "action": { "type": "press", "slot": 0, "button": 3 } },
//!   { "at_ms": 400, "action": { "type": "axis", "slot": 0, "axis": 1, "value": -0.5 } },
//!   { "at_ms": 600, "action": { "type": "unplug", "slot": 0 } }
//! ]
//! ```

use crate::backends::virtual_input::VirtualSource;
use crate::device::{DeviceSource, PadState};
use crate::error::ScriptError;
use crate::event::DeviceEvent;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::{Duration, Instant};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Action {
    Plug {
        id: String,
        buttons: usize,
        axes: usize,
    },
    Unplug {
        slot: usize,
    },
    /// Device stays listed but reports not-connected.
    Stale {
        slot: usize,
    },
    Press {
        slot: usize,
        button: usize,
    },
    Release {
        slot: usize,
        button: usize,
    },
    Axis {
        slot: usize,
        axis: usize,
        value: f32,
    },
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Step {
    /// Offset from the start of playback.
    pub at_ms: u64,
    pub action: Action,
}

/// Timed actions, kept sorted by `at_ms` (stable for equal times).
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Script {
    steps: Vec<Step>,
}

impl Script {
    pub fn new(mut steps: Vec<Step>) -> Self {
        steps.sort_by_key(|s| s.at_ms);
        Self { steps }
    }

    pub fn from_json_str(text: &str) -> Result<Self, ScriptError> {
        let steps: Vec<Step> = serde_json::from_str(text)?;
        Ok(Self::new(steps))
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ScriptError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ScriptError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json_str(&text)
    }

    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    /// Time of the last step.
    pub fn duration(&self) -> Duration {
        Duration::from_millis(self.steps.last().map_or(0, |s| s.at_ms))
    }
}

/// Apply one action to a source.
pub fn apply(source: &mut VirtualSource, action: &Action) {
    match action {
        Action::Plug { id, buttons, axes } => {
            source.plug_state(PadState::new(id.as_str(), *buttons, *axes));
        }
        Action::Unplug { slot } => {
            source.unplug(*slot);
        }
        Action::Stale { slot } => source.set_connected(*slot, false),
        Action::Press { slot, button } => source.press(*slot, *button, true),
        Action::Release { slot, button } => source.press(*slot, *button, false),
        Action::Axis { slot, axis, value } => source.set_axis(*slot, *axis, *value),
    }
}

/// A [`VirtualSource`] that replays a [`Script`] as time passes.
pub struct ScriptedSource {
    inner: VirtualSource,
    script: Script,
    cursor: usize,
    started: Instant,
}

impl ScriptedSource {
    pub fn new(script: Script, started: Instant) -> Self {
        Self {
            inner: VirtualSource::new(),
            script,
            cursor: 0,
            started,
        }
    }

    /// Apply every step due at `now`. Returns how many were applied.
    pub fn advance_to(&mut self, now: Instant) -> usize {
        let elapsed = now.saturating_duration_since(self.started);
        let mut applied = 0;
        while let Some(step) = self.script.steps.get(self.cursor) {
            if Duration::from_millis(step.at_ms) > elapsed {
                break;
            }
            apply(&mut self.inner, &step.action);
            self.cursor += 1;
            applied += 1;
        }
        applied
    }

    pub fn is_finished(&self) -> bool {
        self.cursor >= self.script.steps.len()
    }

}

impl DeviceSource for ScriptedSource {
    fn slots(&self) -> Vec<Option<PadState>> {
        self.inner.slots()
    }

    fn slot(&self, index: usize) -> Option<PadState> {
        self.inner.slot(index)
    }

    fn drain_events(&mut self) -> Vec<DeviceEvent> {
        self.inner.drain_events()
    }

    fn update(&mut self, now: Instant) {
        self.advance_to(now);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SCRIPT: &str = r#"[
        { "at_ms": 100, "action": { "type": "press", "slot": 0, "button": 1 } },
        { "at_ms": 0,   "action": { "type": "plug", "id": "Pad A", "buttons": 4, "axes": 2 } },
        { "at_ms": 200, "action": { "type": "axis", "slot": 0, "axis": 1, "value": -0.5 } },
        { "at_ms": 300, "action": { "type": "unplug", "slot": 0 } }
    ]"#;

    #[test]
    fn parses_and_sorts_steps() {
        let script = Script::from_json_str(SCRIPT).unwrap();
        assert_eq!(script.steps().len(), 4);
        assert!(matches!(script.steps()[0].action, Action::Plug { .. }));
        assert_eq!(script.duration(), Duration::from_millis(300));
    }

    #[test]
    fn replays_steps_as_time_passes() {
        let t0 = Instant::now();
        let mut src = ScriptedSource::new(Script::from_json_str(SCRIPT).unwrap(), t0);

        assert_eq!(src.advance_to(t0), 1);
        assert_eq!(src.slot(0).unwrap().id, "Pad A");

        assert_eq!(src.advance_to(t0 + Duration::from_millis(250)), 2);
        let pad = src.slot(0).unwrap();
        assert_eq!(pad.pressed(), vec![false, true, false, false]);
        assert_eq!(pad.axes, vec![0.0, -0.5]);
        assert!(!src.is_finished());

        assert_eq!(src.advance_to(t0 + Duration::from_millis(300)), 1);
        assert!(src.slot(0).is_none());
        assert!(src.is_finished());
        assert_eq!(
            src.inner.drain_events(),
            vec![
                DeviceEvent::Connected { slot: 0 },
                DeviceEvent::Disconnected { slot: 0 }
            ]
        );
    }

    #[test]
    fn playback_follows_the_given_clock() {
        let t0 = Instant::now();
        let mut src = ScriptedSource::new(Script::from_json_str(SCRIPT).unwrap(), t0);

        // Draining alone never moves playback forward.
        assert!(src.drain_events().is_empty());
        assert!(src.slot(0).is_none());

        src.update(t0 + Duration::from_millis(150));
        assert_eq!(src.drain_events(), vec![DeviceEvent::Connected { slot: 0 }]);
        assert_eq!(src.slot(0).unwrap().pressed(), vec![false, true, false, false]);

        // A clock far in the future replays the rest at once.
        src.update(t0 + Duration::from_secs(60));
        assert!(src.is_finished());
        assert_eq!(src.drain_events(), vec![DeviceEvent::Disconnected { slot: 0 }]);
    }

    #[test]
    fn rejects_unknown_action() {
        let err = Script::from_json_str(r#"[{ "at_ms": 0, "action": { "type": "explode" } }]"#);
        assert!(matches!(err, Err(ScriptError::Json(_))));
    }
}
