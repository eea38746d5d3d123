//! Character animation/interaction state machine
//!
//! Each state either holds (waiting on a gesture) or plays a clip whose end
//! moves the machine on by itself. Clip-driven states refuse every request
//! except a balloon pop, which preempts anything that still holds a balloon.
//!
//! The machine is driven by two entry points:
//! - [`Character::fire`] for gesture-derived triggers
//! - [`Character::advance`] once per frame with elapsed time
//!
//! Both return the [`Signal`]s produced so the game can run side effects
//! (fire the gust, hide the balloon, flip it, ...).

use serde::{Deserialize, Serialize};

use super::balloon::Orientation;

/// Every visual/interaction phase of the character
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HeroState {
    Idle,
    PivotToTank,
    AtTank,
    PivotFromTank,
    PivotToSuck,
    AtSuck,
    /// Inhaling from the balloon (holds after its intro clip)
    Sucking,
    BlowSetup,
    Blowing,
    SuckCycle,
    ReturningToTank,
    ReturningToIdle,
    Scared,
    StartledToCalm,
}

/// Gestures a state may accept
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Gesture {
    TouchTank,
    ReleaseInflate,
    BeginInhale,
    ReleaseInhale,
    Flick,
}

/// Requests into the machine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Trigger {
    Gesture(Gesture),
    /// The balloon burst
    Pop,
}

/// Observable consequences of a transition or of clip progress
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Signal {
    Entered(HeroState),
    /// The character's back is to the camera: the balloon should flip
    CrossedMidpoint(Orientation),
}

/// Air levels that drive branching decisions
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct AirLevels {
    pub fill: f32,
    pub lung_air: f32,
}

/// A sprite clip, described only by its length and playback rate
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Clip {
    pub name: &'static str,
    pub frames: u32,
    pub fps: f32,
    pub reversed: bool,
}

impl Clip {
    const fn new(name: &'static str, frames: u32, fps: f32) -> Self {
        Self {
            name,
            frames,
            fps,
            reversed: false,
        }
    }

    const fn reverse(self) -> Self {
        Self {
            reversed: true,
            ..self
        }
    }

    const fn hold(name: &'static str) -> Self {
        Self::new(name, 1, 1.0)
    }

    pub fn duration_ms(&self) -> f32 {
        self.frames as f32 * 1000.0 / self.fps
    }

    /// Time at which the clip shows `frame` (1-based, counted in play order)
    pub fn time_of_frame(&self, frame: u32) -> f32 {
        frame.saturating_sub(1) as f32 * 1000.0 / self.fps
    }
}

const CLIP_IDLE: Clip = Clip::hold("idle");
const CLIP_AT_TANK: Clip = Clip::hold("at_tank");
const CLIP_AT_SUCK: Clip = Clip::hold("at_suck");
const CLIP_PIVOT_TO_TANK: Clip = Clip::new("pivot_to_tank", 20, 24.0);
const CLIP_PIVOT_TO_SUCK: Clip = Clip::new("pivot_to_suck", 51, 30.0);
const CLIP_SUCK_SETUP: Clip = Clip::new("suck_setup", 5, 24.0);
const CLIP_SUCK_CYCLE: Clip = Clip::new("suck_cycle", 9, 24.0);
const CLIP_BLOW_SETUP: Clip = Clip::new("blow_setup", 4, 24.0);
const CLIP_BLOW: Clip = Clip::new("blow", 9, 24.0);
const CLIP_SCARED: Clip = Clip::new("scared", 38, 24.0);
const CLIP_STARTLED_TO_CALM: Clip = Clip::new("startled_to_calm", 43, 24.0);

/// Frame of the 51-frame pivot at which the balloon flips
const PIVOT_FLIP_FRAME: u32 = 25;

impl HeroState {
    /// The only gestures this state will act on
    pub fn legal_gestures(self) -> &'static [Gesture] {
        use Gesture::*;
        match self {
            HeroState::Idle => &[TouchTank],
            HeroState::AtTank => &[TouchTank, ReleaseInflate],
            HeroState::AtSuck => &[BeginInhale, Flick, ReleaseInhale],
            HeroState::Sucking => &[ReleaseInhale],
            _ => &[],
        }
    }

    pub fn accepts(self, gesture: Gesture) -> bool {
        self.legal_gestures().contains(&gesture)
    }

    /// States whose exit is the end of their clip
    pub fn is_clip_driven(self) -> bool {
        !matches!(
            self,
            HeroState::Idle | HeroState::AtTank | HeroState::AtSuck | HeroState::Sucking
        )
    }

    /// A pop can only interrupt states where the character has a balloon
    pub fn holds_balloon(self) -> bool {
        !matches!(self, HeroState::Scared | HeroState::StartledToCalm)
    }
}

/// The character controller
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Character {
    state: HeroState,
    /// Time spent in the current state
    elapsed_ms: f32,
    /// Next exhale plays the blow setup clip; inhales use the short clip
    first_cycle: bool,
    midpoint_crossed: bool,
}

impl Default for Character {
    fn default() -> Self {
        Self {
            state: HeroState::Idle,
            elapsed_ms: 0.0,
            first_cycle: true,
            midpoint_crossed: false,
        }
    }
}

impl Character {
    pub fn state(&self) -> HeroState {
        self.state
    }

    pub fn elapsed_ms(&self) -> f32 {
        self.elapsed_ms
    }

    pub fn is_first_cycle(&self) -> bool {
        self.first_cycle
    }

    pub fn accepts(&self, gesture: Gesture) -> bool {
        self.state.accepts(gesture)
    }

    /// Clip the renderer should be playing now
    pub fn clip(&self) -> Clip {
        self.clip_for(self.state)
    }

    /// Clip for `state` given this character's cycle history
    pub fn clip_for(&self, state: HeroState) -> Clip {
        match state {
            HeroState::Idle => CLIP_IDLE,
            HeroState::PivotToTank => CLIP_PIVOT_TO_TANK,
            HeroState::AtTank => CLIP_AT_TANK,
            HeroState::PivotFromTank | HeroState::ReturningToIdle => CLIP_PIVOT_TO_TANK.reverse(),
            HeroState::PivotToSuck => CLIP_PIVOT_TO_SUCK,
            HeroState::AtSuck => CLIP_AT_SUCK,
            HeroState::Sucking if self.first_cycle => CLIP_SUCK_SETUP,
            HeroState::Sucking | HeroState::SuckCycle => CLIP_SUCK_CYCLE,
            HeroState::BlowSetup => CLIP_BLOW_SETUP,
            HeroState::Blowing => CLIP_BLOW,
            HeroState::ReturningToTank => CLIP_PIVOT_TO_SUCK.reverse(),
            HeroState::Scared => CLIP_SCARED,
            HeroState::StartledToCalm => CLIP_STARTLED_TO_CALM,
        }
    }

    /// Request a transition. `None` means the request was refused and nothing
    /// changed; `Some(signals)` means it was accepted (signals may be empty when
    /// the request needs no state change, e.g. touching the tank while at it).
    pub fn fire(&mut self, trigger: Trigger, air: AirLevels) -> Option<Vec<Signal>> {
        let gesture = match trigger {
            Trigger::Pop => {
                if !self.state.holds_balloon() {
                    return None;
                }
                let mut signals = Vec::new();
                self.enter(HeroState::Scared, &mut signals);
                return Some(signals);
            }
            Trigger::Gesture(g) => g,
        };

        if !self.state.accepts(gesture) {
            log::debug!("{:?} refused in {:?}", gesture, self.state);
            return None;
        }

        let mut signals = Vec::new();
        match (self.state, gesture) {
            (HeroState::Idle, Gesture::TouchTank) => {
                self.enter(HeroState::PivotToTank, &mut signals);
            }
            (HeroState::AtTank, Gesture::TouchTank) => {}
            (HeroState::AtTank, Gesture::ReleaseInflate) => {
                let next = if air.fill > 0.0 {
                    HeroState::PivotToSuck
                } else {
                    HeroState::PivotFromTank
                };
                self.enter(next, &mut signals);
            }
            (HeroState::AtSuck, Gesture::BeginInhale) => {
                if air.fill <= 0.0 {
                    return None;
                }
                self.enter(HeroState::Sucking, &mut signals);
            }
            (HeroState::AtSuck, Gesture::Flick) => {
                if air.lung_air <= 0.0 {
                    return None;
                }
                self.enter(HeroState::BlowSetup, &mut signals);
            }
            (HeroState::Sucking | HeroState::AtSuck, Gesture::ReleaseInhale) => {
                if air.fill <= 0.0 && air.lung_air <= 0.0 {
                    self.enter(HeroState::ReturningToIdle, &mut signals);
                } else if self.state == HeroState::Sucking {
                    self.enter(HeroState::AtSuck, &mut signals);
                } else {
                    return None;
                }
            }
            _ => return None,
        }
        Some(signals)
    }

    /// Advance clip time, emitting midpoint crossings and clip-end transitions.
    /// Leftover time carries into the next clip.
    pub fn advance(&mut self, dt_ms: f32, air: AirLevels) -> Vec<Signal> {
        let mut signals = Vec::new();
        self.elapsed_ms += dt_ms.max(0.0);

        // Bounded: a single frame never spans more than a handful of clips
        for _ in 0..8 {
            self.check_midpoint(&mut signals);

            if !self.state.is_clip_driven() {
                break;
            }
            let duration = self.clip().duration_ms();
            if self.elapsed_ms < duration {
                break;
            }
            let leftover = self.elapsed_ms - duration;
            let next = self.next_after_clip(air);
            self.enter(next, &mut signals);
            self.elapsed_ms = leftover;
        }
        signals
    }

    fn check_midpoint(&mut self, signals: &mut Vec<Signal>) {
        if self.midpoint_crossed {
            return;
        }
        let (flip_at, orientation) = match self.state {
            HeroState::PivotToSuck => (
                CLIP_PIVOT_TO_SUCK.time_of_frame(PIVOT_FLIP_FRAME),
                Orientation::OpeningUp,
            ),
            // Played backwards: frame 25 shows after 51 - 25 + 1 frames
            HeroState::ReturningToTank => (
                CLIP_PIVOT_TO_SUCK.time_of_frame(CLIP_PIVOT_TO_SUCK.frames - PIVOT_FLIP_FRAME + 1),
                Orientation::OpeningDown,
            ),
            _ => return,
        };
        if self.elapsed_ms >= flip_at {
            self.midpoint_crossed = true;
            signals.push(Signal::CrossedMidpoint(orientation));
        }
    }

    fn next_after_clip(&self, air: AirLevels) -> HeroState {
        match self.state {
            HeroState::PivotToTank => HeroState::AtTank,
            HeroState::PivotFromTank => HeroState::Idle,
            HeroState::PivotToSuck => HeroState::AtSuck,
            HeroState::BlowSetup => HeroState::Blowing,
            HeroState::Blowing => {
                if air.lung_air > 0.0 && air.fill > 0.0 {
                    HeroState::SuckCycle
                } else if air.lung_air > 0.0 {
                    HeroState::AtSuck
                } else {
                    HeroState::ReturningToTank
                }
            }
            HeroState::SuckCycle => HeroState::AtSuck,
            HeroState::ReturningToTank => HeroState::AtTank,
            HeroState::ReturningToIdle => HeroState::Idle,
            HeroState::Scared => HeroState::StartledToCalm,
            HeroState::StartledToCalm => HeroState::Idle,
            held => held,
        }
    }

    fn enter(&mut self, next: HeroState, signals: &mut Vec<Signal>) {
        let next = match next {
            // Later cycles go straight to the blow
            HeroState::BlowSetup if !self.first_cycle => HeroState::Blowing,
            other => other,
        };

        log::debug!("Character {:?} -> {:?}", self.state, next);
        self.state = next;
        self.elapsed_ms = 0.0;
        self.midpoint_crossed = false;

        match next {
            HeroState::Idle => self.first_cycle = true,
            HeroState::BlowSetup | HeroState::Blowing => self.first_cycle = false,
            _ => {}
        }
        signals.push(Signal::Entered(next));
    }
}
