//! Game balance parameters
//!
//! A flat key → float table that a tuning panel may edit between frames. The
//! simulation never writes to it; every tick receives the current values.

use serde::{Deserialize, Serialize};

/// Largest fraction of capacity a single degradation may remove
const MAX_DEGRADE: f32 = 0.9;

/// All tunable parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    // === Gust shape ===
    /// Narrowest (laser) spread in degrees
    pub spread_angle_min: f32,
    /// Widest spread in degrees
    pub spread_angle_max: f32,
    /// Reach when fully wide (pixels)
    pub reach_at_max_spread: f32,
    /// Reach when laser (pixels)
    pub reach_at_min_spread: f32,
    /// Lung volume → gust power multiplier
    pub strength_multiplier: f32,

    // === Flick recognition ===
    /// Release closer than this to the mouth gives the widest gust
    pub near_threshold: f32,
    /// Release farther than this gives the narrowest gust
    pub far_threshold: f32,
    /// Release must land this far right of the mouth
    pub flick_min_dx: f32,
    /// Release must land this far from the mouth
    pub flick_min_distance: f32,

    // === Balloon ===
    /// Capacity lost when released in the yellow zone (fraction)
    pub degrade_yellow: f32,
    /// Capacity lost when released in the red zone (fraction)
    pub degrade_red: f32,
    /// Chance a red-zone release pops the balloon outright
    pub release_pop_chance: f32,
    /// Base pop probability per 100 ms spent in the red zone
    pub red_pop_rate: f32,
    /// Delay before a popped balloon is replaced (ms)
    pub balloon_replace_ms: f32,

    // === Speeds (per 60 Hz frame) ===
    /// Balloon fill per frame while inflating
    pub fill_speed: f32,
    /// Lung fill per frame while inhaling
    pub inhale_speed: f32,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            spread_angle_min: 5.0,
            spread_angle_max: 70.0,
            reach_at_max_spread: 50.0,
            reach_at_min_spread: 350.0,
            strength_multiplier: 1.0,

            near_threshold: 80.0,
            far_threshold: 250.0,
            flick_min_dx: 20.0,
            flick_min_distance: 50.0,

            degrade_yellow: 0.10,
            degrade_red: 0.15,
            release_pop_chance: 0.3,
            red_pop_rate: 0.002,
            balloon_replace_ms: 2500.0,

            fill_speed: 0.5,
            inhale_speed: 1.0,
        }
    }
}

impl Tuning {
    /// Every key accepted by [`Tuning::set`]
    pub const KEYS: [&'static str; 16] = [
        "spread_angle_min",
        "spread_angle_max",
        "reach_at_max_spread",
        "reach_at_min_spread",
        "strength_multiplier",
        "near_threshold",
        "far_threshold",
        "flick_min_dx",
        "flick_min_distance",
        "degrade_yellow",
        "degrade_red",
        "release_pop_chance",
        "red_pop_rate",
        "balloon_replace_ms",
        "fill_speed",
        "inhale_speed",
    ];

    fn slot_mut(&mut self, key: &str) -> Option<&mut f32> {
        let slot = match key {
            "spread_angle_min" => &mut self.spread_angle_min,
            "spread_angle_max" => &mut self.spread_angle_max,
            "reach_at_max_spread" => &mut self.reach_at_max_spread,
            "reach_at_min_spread" => &mut self.reach_at_min_spread,
            "strength_multiplier" => &mut self.strength_multiplier,
            "near_threshold" => &mut self.near_threshold,
            "far_threshold" => &mut self.far_threshold,
            "flick_min_dx" => &mut self.flick_min_dx,
            "flick_min_distance" => &mut self.flick_min_distance,
            "degrade_yellow" => &mut self.degrade_yellow,
            "degrade_red" => &mut self.degrade_red,
            "release_pop_chance" => &mut self.release_pop_chance,
            "red_pop_rate" => &mut self.red_pop_rate,
            "balloon_replace_ms" => &mut self.balloon_replace_ms,
            "fill_speed" => &mut self.fill_speed,
            "inhale_speed" => &mut self.inhale_speed,
            _ => return None,
        };
        Some(slot)
    }

    /// Read a parameter by key
    pub fn get(&self, key: &str) -> Option<f32> {
        let value = match key {
            "spread_angle_min" => self.spread_angle_min,
            "spread_angle_max" => self.spread_angle_max,
            "reach_at_max_spread" => self.reach_at_max_spread,
            "reach_at_min_spread" => self.reach_at_min_spread,
            "strength_multiplier" => self.strength_multiplier,
            "near_threshold" => self.near_threshold,
            "far_threshold" => self.far_threshold,
            "flick_min_dx" => self.flick_min_dx,
            "flick_min_distance" => self.flick_min_distance,
            "degrade_yellow" => self.degrade_yellow,
            "degrade_red" => self.degrade_red,
            "release_pop_chance" => self.release_pop_chance,
            "red_pop_rate" => self.red_pop_rate,
            "balloon_replace_ms" => self.balloon_replace_ms,
            "fill_speed" => self.fill_speed,
            "inhale_speed" => self.inhale_speed,
            _ => return None,
        };
        Some(value)
    }

    /// Live-edit a parameter. Unknown keys and non-finite values are ignored.
    pub fn set(&mut self, key: &str, value: f32) -> bool {
        if !value.is_finite() {
            log::warn!("Ignoring non-finite tuning value for {key}");
            return false;
        }
        match self.slot_mut(key) {
            Some(slot) => {
                *slot = value;
                true
            }
            None => {
                log::warn!("Unknown tuning key: {key}");
                false
            }
        }
    }

    /// Apply a batch of edits (e.g. from a tuning panel). Returns how many applied.
    pub fn apply<'a, I>(&mut self, edits: I) -> usize
    where
        I: IntoIterator<Item = (&'a str, f32)>,
    {
        edits
            .into_iter()
            .filter(|(key, value)| self.set(key, *value))
            .count()
    }

    /// Snapshot as (key, value) pairs in [`Tuning::KEYS`] order
    pub fn entries(&self) -> Vec<(&'static str, f32)> {
        Self::KEYS
            .iter()
            .filter_map(|&key| self.get(key).map(|v| (key, v)))
            .collect()
    }

    /// Parse from JSON; missing keys take their defaults
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str::<Self>(json).map(|t| t.sanitized())
    }

    /// Serialize to pretty JSON
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Copy with every value forced into a usable range
    pub fn sanitized(&self) -> Self {
        let mut t = self.clone();
        t.spread_angle_min = t.spread_angle_min.clamp(0.1, 179.0);
        t.spread_angle_max = t.spread_angle_max.clamp(t.spread_angle_min, 179.9);
        t.reach_at_max_spread = t.reach_at_max_spread.max(0.0);
        t.reach_at_min_spread = t.reach_at_min_spread.max(0.0);
        t.strength_multiplier = t.strength_multiplier.max(0.0);
        t.near_threshold = t.near_threshold.max(0.0);
        t.far_threshold = t.far_threshold.max(t.near_threshold);
        t.flick_min_dx = t.flick_min_dx.max(0.0);
        t.flick_min_distance = t.flick_min_distance.max(0.0);
        t.degrade_yellow = t.degrade_yellow.clamp(0.0, MAX_DEGRADE);
        t.degrade_red = t.degrade_red.clamp(0.0, MAX_DEGRADE);
        t.release_pop_chance = t.release_pop_chance.clamp(0.0, 1.0);
        t.red_pop_rate = t.red_pop_rate.clamp(0.0, 1.0);
        t.balloon_replace_ms = t.balloon_replace_ms.max(0.0);
        t.fill_speed = t.fill_speed.max(0.0);
        t.inhale_speed = t.inhale_speed.max(0.0);
        t
    }
}
