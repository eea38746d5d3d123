//! Balloon fill, capacity degradation and pop hazards

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::tuning::Tuning;

/// Fill band relative to current capacity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Zone {
    /// 0-60%
    Green,
    /// Above 60% up to 85%
    Yellow,
    /// Above 85%
    Red,
}

impl Zone {
    pub fn classify(fill: f32, capacity: f32) -> Self {
        if capacity <= 0.0 {
            return Zone::Green;
        }
        // Cross-multiplied so exact boundaries survive a shrunken capacity
        let percent = fill * 100.0;
        if percent > YELLOW_ZONE_MAX * capacity {
            Zone::Red
        } else if percent > GREEN_ZONE_MAX * capacity {
            Zone::Yellow
        } else {
            Zone::Green
        }
    }
}

/// Who is holding the balloon
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Holder {
    None,
    Character,
}

/// Which way the balloon's opening points
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Orientation {
    /// Onto the tank nozzle
    OpeningDown,
    /// Into the character's mouth
    OpeningUp,
}

/// Result of ending an inflate gesture
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReleaseOutcome {
    pub zone: Zone,
    /// Fraction of capacity removed (0 in green)
    pub degraded_by: f32,
    /// The release roll popped the balloon
    pub popped: bool,
}

/// Probability of popping this tick after `ms_in_zone` of continuous red-zone
/// exposure: `1 - (1 - base_rate)^(ms / 100)`. Zero outside the red zone.
pub fn continuous_pop_check(zone: Zone, ms_in_zone: f32, base_rate: f32) -> f32 {
    if zone != Zone::Red {
        return 0.0;
    }
    let base_rate = base_rate.clamp(0.0, 1.0);
    let exposure = ms_in_zone.max(0.0) / 100.0;
    (1.0 - (1.0 - base_rate).powf(exposure)).clamp(0.0, 1.0)
}

/// The balloon currently in play
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Balloon {
    pub fill: f32,
    pub capacity: f32,
    /// `None` once popped; a held balloon may still be drawn
    pub holder: Holder,
    pub orientation: Orientation,
    /// Bumped on every replacement; pending replacements check it
    pub instance: u32,
    /// Popped and not yet replaced
    pub awaiting_replacement: bool,
    /// Session time at which fill last entered the red zone
    red_since_ms: Option<f64>,
}

impl Default for Balloon {
    fn default() -> Self {
        Self::new(1)
    }
}

impl Balloon {
    pub fn new(instance: u32) -> Self {
        Self {
            fill: 0.0,
            capacity: FULL_CAPACITY,
            holder: Holder::Character,
            orientation: Orientation::OpeningDown,
            instance,
            awaiting_replacement: false,
            red_since_ms: None,
        }
    }

    pub fn zone(&self) -> Zone {
        Zone::classify(self.fill, self.capacity)
    }

    /// Fill as a fraction of current capacity
    pub fn fill_ratio(&self) -> f32 {
        if self.capacity <= 0.0 {
            0.0
        } else {
            (self.fill / self.capacity).clamp(0.0, 1.0)
        }
    }

    /// Sprite frame for the current fill (1 = deflated, 40 = bursting)
    pub fn frame_index(&self) -> u32 {
        let percent = self.fill_ratio() * 100.0;
        ((percent * BALLOON_FRAMES as f32 / 100.0).ceil() as u32).clamp(1, BALLOON_FRAMES)
    }

    pub fn red_since_ms(&self) -> Option<f64> {
        self.red_since_ms
    }

    /// Add air from the tank. Returns the amount actually added, or `None`
    /// while waiting for a replacement.
    pub fn fill_tick(&mut self, amount: f32) -> Option<f32> {
        if self.awaiting_replacement {
            return None;
        }
        let before = self.fill;
        self.fill = (self.fill + amount.max(0.0)).clamp(0.0, self.capacity);
        Some(self.fill - before)
    }

    /// Time fill has stayed continuously in red as of `now_ms`, or `None`
    /// (clearing the entry time) when out of red. The first red sighting
    /// counts as zero exposure.
    pub fn track_red_exposure(&mut self, now_ms: f64) -> Option<f32> {
        if self.zone() != Zone::Red {
            self.red_since_ms = None;
            return None;
        }
        let since = *self.red_since_ms.get_or_insert(now_ms);
        Some((now_ms - since).max(0.0) as f32)
    }

    /// Move air into the lungs. Returns the amount moved (at most `amount`,
    /// the current fill and `lung_room`), or `None` while waiting for a
    /// replacement.
    pub fn transfer_to_lungs(&mut self, amount: f32, lung_room: f32) -> Option<f32> {
        if self.awaiting_replacement {
            return None;
        }
        let moved = amount.max(0.0).min(self.fill).min(lung_room.max(0.0));
        self.fill = (self.fill - moved).max(0.0);
        if self.zone() != Zone::Red {
            self.red_since_ms = None;
        }
        Some(moved)
    }

    /// One-shot penalty when an inflate gesture ends
    pub fn release_degrade<R: Rng>(&mut self, tuning: &Tuning, rng: &mut R) -> ReleaseOutcome {
        let roll: f32 = rng.random();
        self.degrade_with_roll(tuning, roll)
    }

    fn degrade_with_roll(&mut self, tuning: &Tuning, roll: f32) -> ReleaseOutcome {
        let zone = self.zone();
        let degraded_by = match zone {
            Zone::Green => 0.0,
            Zone::Yellow => tuning.degrade_yellow,
            Zone::Red => tuning.degrade_red,
        }
        .clamp(0.0, 0.9);

        if degraded_by > 0.0 {
            self.capacity = (self.capacity * (1.0 - degraded_by)).max(MIN_CAPACITY);
            self.fill = self.fill.min(self.capacity);
        }

        let popped = zone == Zone::Red && roll < tuning.release_pop_chance;
        if popped {
            self.pop();
        }

        ReleaseOutcome {
            zone,
            degraded_by,
            popped,
        }
    }

    /// Burst: empties the balloon and blocks mutation until [`Balloon::replace`]
    pub fn pop(&mut self) {
        self.fill = 0.0;
        self.holder = Holder::None;
        self.awaiting_replacement = true;
        self.red_since_ms = None;
    }

    /// Swap in a brand new balloon
    pub fn replace(&mut self) {
        *self = Self::new(self.instance.wrapping_add(1));
    }
}
