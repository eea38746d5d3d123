//! Game state and presentation bookkeeping
//!
//! Everything a session needs lives here. Gameplay rules that mutate it are in
//! `tick`; this module owns construction, reset and the output queue.

use glam::Vec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;

use super::balloon::{Balloon, Holder, Orientation, Zone};
use super::candles::CandleField;
use super::character::{AirLevels, Character, HeroState};
use super::gesture::{GestureContext, GestureInterpreter};
use super::gust::GustCone;
use super::lungs::Lungs;
use super::output::{AudioCommand, Meter, Output, RenderCommand, Sound};
use super::timers::Timers;
use crate::consts::*;
use crate::layout::Layout;

/// Last balloon visual sent to the renderer
#[derive(Debug, Clone, Copy, PartialEq)]
struct BalloonVisual {
    zone: Zone,
    frame: u32,
    orientation: Orientation,
    visible: bool,
}

/// Complete session state (deterministic for a given seed and input stream)
#[derive(Debug, Clone)]
pub struct GameState {
    /// Session seed; reset re-seeds from it
    pub seed: u64,
    pub rng: Pcg32,
    /// Bumped on every reset; timers from older epochs are discarded
    pub epoch: u64,
    /// Simulation clock in milliseconds
    pub time_ms: f64,
    pub layout: Layout,
    pub balloon: Balloon,
    pub lungs: Lungs,
    pub candles: CandleField,
    pub hero: Character,
    pub gestures: GestureInterpreter,
    pub timers: Timers,
    /// Tank air is flowing (finger held on the tank)
    pub inflating: bool,
    /// Balloon air is flowing into the lungs
    pub inhaling: bool,
    /// Inflate released before the pivot reached the tank
    pub deferred_release: bool,
    /// Flick end point waiting for the blow clip
    pub pending_flick: Option<Vec2>,
    /// Gust currently on screen
    pub last_gust: Option<(u32, GustCone)>,
    music_started: bool,
    airflow_playing: bool,
    last_visual: Option<BalloonVisual>,
    last_meters: Option<[f32; 3]>,
    next_gust_id: u32,
    outputs: Vec<Output>,
}

impl GameState {
    /// Create a session on the default portrait layout
    pub fn new(seed: u64) -> Self {
        Self::with_layout(seed, Layout::default())
    }

    pub fn with_layout(seed: u64, layout: Layout) -> Self {
        let mut state = Self::fresh(seed, layout, 0, 0.0);
        state.announce();
        state
    }

    fn fresh(seed: u64, layout: Layout, epoch: u64, time_ms: f64) -> Self {
        let candles = CandleField::from_slots(&layout.cake.slots());
        Self {
            seed,
            rng: Pcg32::seed_from_u64(seed),
            epoch,
            time_ms,
            layout,
            balloon: Balloon::default(),
            lungs: Lungs::default(),
            candles,
            hero: Character::default(),
            gestures: GestureInterpreter::default(),
            timers: Timers::default(),
            inflating: false,
            inhaling: false,
            deferred_release: false,
            pending_flick: None,
            last_gust: None,
            music_started: false,
            airflow_playing: false,
            last_visual: None,
            last_meters: None,
            next_gust_id: 1,
            outputs: Vec::new(),
        }
    }

    /// Start over: new balloon, empty lungs, every candle lit, timers cancelled.
    /// Music keeps playing and already queued outputs are kept.
    pub fn reset(&mut self) {
        log::info!("Session reset (epoch {} -> {})", self.epoch, self.epoch + 1);

        if self.airflow_playing {
            self.emit(AudioCommand::StopLoop(Sound::Airflow));
        }
        if let Some((id, _)) = self.last_gust {
            self.emit(RenderCommand::HideGust { id });
        }

        let mut fresh = Self::fresh(
            self.seed,
            self.layout.clone(),
            self.epoch + 1,
            self.time_ms,
        );
        fresh.music_started = self.music_started;
        fresh.outputs = std::mem::take(&mut self.outputs);
        *self = fresh;
        self.announce();
    }

    /// Initial render state for a new session
    fn announce(&mut self) {
        let clip = self.hero.clip();
        self.emit(RenderCommand::HeroClip {
            state: self.hero.state(),
            clip,
        });
        self.emit(RenderCommand::CandlesRemaining(self.candles.remaining()));
        self.sync_presentation();
    }

    pub fn emit(&mut self, output: impl Into<Output>) {
        self.outputs.push(output.into());
    }

    /// Outputs queued since the last drain, oldest first
    pub fn outputs(&self) -> &[Output] {
        &self.outputs
    }

    pub fn drain_outputs(&mut self) -> Vec<Output> {
        std::mem::take(&mut self.outputs)
    }

    /// Allocate a gust id
    pub fn next_gust_id(&mut self) -> u32 {
        let id = self.next_gust_id;
        self.next_gust_id += 1;
        id
    }

    pub fn is_won(&self) -> bool {
        self.candles.is_won()
    }

    pub fn air(&self) -> AirLevels {
        AirLevels {
            fill: self.balloon.fill,
            lung_air: self.lungs.air,
        }
    }

    pub fn gesture_context(&self) -> GestureContext {
        GestureContext {
            hero: self.hero.state(),
            fill: self.balloon.fill,
            lung_air: self.lungs.air,
            inflating: self.inflating,
            inhaling: self.inhaling,
        }
    }

    /// Start the music on the first touch of the session
    pub fn note_first_touch(&mut self) {
        if !self.music_started {
            self.music_started = true;
            self.emit(AudioCommand::StartLoop(Sound::Music));
        }
    }

    /// Whether the balloon should be drawn right now
    pub fn balloon_visible(&self) -> bool {
        if self.balloon.holder == Holder::None {
            return false;
        }
        match self.hero.state() {
            HeroState::Idle
            | HeroState::PivotFromTank
            | HeroState::ReturningToIdle
            | HeroState::Scared
            | HeroState::StartledToCalm => false,
            HeroState::AtSuck
            | HeroState::Sucking
            | HeroState::BlowSetup
            | HeroState::Blowing
            | HeroState::SuckCycle => self.balloon.fill > 0.0,
            HeroState::PivotToTank
            | HeroState::AtTank
            | HeroState::PivotToSuck
            | HeroState::ReturningToTank => true,
        }
    }

    /// Where balloon feedback text is anchored
    pub fn balloon_anchor(&self) -> Vec2 {
        match self.balloon.orientation {
            Orientation::OpeningUp => self.layout.mouth,
            Orientation::OpeningDown => {
                let tank = self.layout.tank_zone;
                tank.center - Vec2::new(0.0, tank.size.y * 0.5)
            }
        }
    }

    /// Emit airflow, balloon and meter updates for anything that changed
    pub fn sync_presentation(&mut self) {
        let airflow = self.inflating
            && self.hero.state() == HeroState::AtTank
            && !self.balloon.awaiting_replacement;
        if airflow != self.airflow_playing {
            self.airflow_playing = airflow;
            let cmd = if airflow {
                AudioCommand::StartLoop(Sound::Airflow)
            } else {
                AudioCommand::StopLoop(Sound::Airflow)
            };
            self.emit(cmd);
        }

        let visual = BalloonVisual {
            zone: self.balloon.zone(),
            frame: self.balloon.frame_index(),
            orientation: self.balloon.orientation,
            visible: self.balloon_visible(),
        };
        if self.last_visual != Some(visual) {
            self.last_visual = Some(visual);
            self.emit(RenderCommand::BalloonVisual {
                zone: visual.zone,
                frame: visual.frame,
                orientation: visual.orientation,
                visible: visual.visible,
            });
        }

        let meters = [
            self.balloon.fill_ratio(),
            self.balloon.capacity / FULL_CAPACITY,
            self.lungs.fill_ratio(),
        ];
        let previous = self.last_meters;
        for (i, meter) in [Meter::Balloon, Meter::Capacity, Meter::Lungs]
            .into_iter()
            .enumerate()
        {
            if previous.is_none_or(|p| p[i] != meters[i]) {
                self.emit(RenderCommand::Meter {
                    meter,
                    fraction: meters[i],
                });
            }
        }
        self.last_meters = Some(meters);
    }
}
