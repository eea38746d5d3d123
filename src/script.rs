//! Timed pointer scripts for headless sessions
//!
//! A script is a JSON array of steps, each stamped with the session time at
//! which it is delivered:
//!
//! ```json
//! [
//!   { "at_ms": 100, "pointer": { "Down": { "pos": [95, 594], "t_ms": 100 } } },
//!   { "at_ms": 2700, "pointer": { "Up": { "pos": [95, 594] } } },
//!   { "at_ms": 9000, "reset": true }
//! ]
//! ```

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::layout::Layout;
use crate::sim::{PointerEvent, TickInput};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScriptStep {
    pub at_ms: f64,
    #[serde(default)]
    pub pointer: Option<PointerEvent>,
    #[serde(default)]
    pub reset: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Script {
    pub steps: Vec<ScriptStep>,
}

impl Script {
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        let mut script: Script = serde_json::from_str(json)?;
        script
            .steps
            .sort_by(|a, b| a.at_ms.total_cmp(&b.at_ms));
        Ok(script)
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Time of the last step
    pub fn end_ms(&self) -> f64 {
        self.steps.last().map_or(0.0, |s| s.at_ms)
    }

    /// Collect the steps in `(from_ms, to_ms]` into one tick's input
    pub fn input_between(&self, from_ms: f64, to_ms: f64) -> TickInput {
        let mut input = TickInput::default();
        for step in self
            .steps
            .iter()
            .filter(|s| s.at_ms > from_ms && s.at_ms <= to_ms)
        {
            input.reset |= step.reset;
            input.pointer.extend(step.pointer);
        }
        input
    }

    /// One full round: inflate, pivot, inhale, then a long flick at the cake
    pub fn demo(layout: &Layout) -> Self {
        let tank = layout.tank_zone.center;
        let open_air = layout.mouth + Vec2::new(80.0, -200.0);
        let flick_end = layout.mouth + Vec2::new(300.0, 60.0);

        let down = |at_ms: f64, pos: Vec2| ScriptStep {
            at_ms,
            pointer: Some(PointerEvent::Down { pos, t_ms: at_ms }),
            reset: false,
        };
        let mv = |at_ms: f64, pos: Vec2| ScriptStep {
            at_ms,
            pointer: Some(PointerEvent::Move { pos }),
            reset: false,
        };
        let up = |at_ms: f64, pos: Vec2| ScriptStep {
            at_ms,
            pointer: Some(PointerEvent::Up { pos }),
            reset: false,
        };

        Self {
            steps: vec![
                down(100.0, tank),
                up(2700.0, tank),
                down(4600.0, open_air),
                mv(4650.0, layout.chest),
                up(5800.0, layout.chest),
                down(6000.0, open_air),
                up(6100.0, flick_end),
            ],
        }
    }
}
