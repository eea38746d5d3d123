//! Commands for the render and audio collaborators
//!
//! The simulation never draws or plays anything itself; it queues these and
//! the host drains them after each tick.

use glam::Vec2;
use serde::Serialize;

use super::balloon::{Orientation, Zone};
use super::character::{Clip, HeroState};
use super::gust::GustCone;

/// Looping and one-shot sounds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Sound {
    /// Background music, started on the first touch
    Music,
    /// Tank hiss while inflating
    Airflow,
    /// Balloon burst
    Pop,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum AudioCommand {
    StartLoop(Sound),
    StopLoop(Sound),
    PlayOnce(Sound),
}

/// HUD meters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Meter {
    /// Fill relative to current capacity
    Balloon,
    /// Current capacity relative to a fresh balloon
    Capacity,
    Lungs,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum RenderCommand {
    /// Character switched phase
    HeroClip { state: HeroState, clip: Clip },
    BalloonVisual {
        zone: Zone,
        frame: u32,
        orientation: Orientation,
        visible: bool,
    },
    Meter { meter: Meter, fraction: f32 },
    Text {
        text: String,
        pos: Vec2,
        duration_ms: f32,
    },
    ShowGust { id: u32, cone: GustCone },
    HideGust { id: u32 },
    CandleOut { id: u32 },
    CandlesRemaining(usize),
}

/// Everything the simulation emits in one tick
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Output {
    Render(RenderCommand),
    Audio(AudioCommand),
    /// Every candle is out; emitted once per session
    Won,
}

impl From<RenderCommand> for Output {
    fn from(cmd: RenderCommand) -> Self {
        Output::Render(cmd)
    }
}

impl From<AudioCommand> for Output {
    fn from(cmd: AudioCommand) -> Self {
        Output::Audio(cmd)
    }
}
