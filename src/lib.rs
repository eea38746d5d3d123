//! Balloon Blowout - gesture-driven candle blowing mini-game
//!
//! Core modules:
//! - `sim`: Deterministic simulation (balloon, lungs, gust, candles, character)
//! - `tuning`: Live-editable game balance parameters
//! - `layout`: Scene geometry (hot zones, mouth, cake tiers)
//! - `script`: Timed pointer scripts for headless runs

pub mod layout;
pub mod script;
pub mod sim;
pub mod tuning;

pub use layout::Layout;
pub use tuning::Tuning;

use glam::Vec2;

/// Game configuration constants
pub mod consts {
    /// Fixed simulation timestep in milliseconds (60 Hz)
    pub const SIM_DT_MS: f32 = 1000.0 / 60.0;
    /// Maximum substeps per frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 8;

    /// Reference frame length that per-frame tuning speeds are expressed in
    pub const REFERENCE_FRAME_MS: f32 = 1000.0 / 60.0;

    /// Capacity of a fresh balloon
    pub const FULL_CAPACITY: f32 = 100.0;
    /// Degradation never shrinks a balloon below this
    pub const MIN_CAPACITY: f32 = 1.0;
    /// Lung reservoir size
    pub const MAX_LUNG_AIR: f32 = 100.0;

    /// Zone thresholds (% of current capacity)
    pub const GREEN_ZONE_MAX: f32 = 60.0;
    pub const YELLOW_ZONE_MAX: f32 = 85.0;

    /// Balloon sprite sheet frame count (frame 1 = deflated)
    pub const BALLOON_FRAMES: u32 = 40;

    /// How long a gust cone stays on screen
    pub const GUST_VISIBLE_MS: f32 = 500.0;
}

/// Normalized angle to [-π, π)
#[inline]
pub fn normalize_angle(mut angle: f32) -> f32 {
    use std::f32::consts::PI;
    while angle >= PI {
        angle -= 2.0 * PI;
    }
    while angle < -PI {
        angle += 2.0 * PI;
    }
    angle
}

/// Convert polar (r, theta) to cartesian (x, y)
#[inline]
pub fn polar_to_cartesian(r: f32, theta: f32) -> Vec2 {
    Vec2::new(r * theta.cos(), r * theta.sin())
}

/// Convert cartesian (x, y) to polar (r, theta)
#[inline]
pub fn cartesian_to_polar(pos: Vec2) -> (f32, f32) {
    (pos.length(), pos.y.atan2(pos.x))
}

/// Linear interpolation from `a` to `b`
#[inline]
pub fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}
