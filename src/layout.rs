//! Scene geometry
//!
//! Positions of the tank hot zone, the character's chest and mouth, and the
//! candle slots on the tiered cake. Screen space: +x right, +y down.

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Axis-aligned rectangle given by its center and size
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub center: Vec2,
    pub size: Vec2,
}

impl Rect {
    pub fn new(center: Vec2, size: Vec2) -> Self {
        Self { center, size }
    }

    /// Edge-inclusive containment
    pub fn contains(&self, p: Vec2) -> bool {
        let half = self.size / 2.0;
        let d = (p - self.center).abs();
        d.x <= half.x && d.y <= half.y
    }
}

/// One cake tier: height above the cake base and width, both as fractions of
/// the cake sprite, and how many candles sit on it
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Tier {
    pub height: f32,
    pub width: f32,
    pub slots: u32,
}

const fn tier(height: f32, width: f32, slots: u32) -> Tier {
    Tier { height, width, slots }
}

/// Sixteen tiers from bottom to top, 80 candles total
pub const CAKE_TIERS: [Tier; 16] = [
    tier(0.19, 0.92, 9),
    tier(0.24, 0.87, 8),
    tier(0.29, 0.82, 8),
    tier(0.34, 0.77, 7),
    tier(0.39, 0.72, 7),
    tier(0.44, 0.67, 6),
    tier(0.49, 0.62, 6),
    tier(0.54, 0.56, 5),
    tier(0.59, 0.50, 5),
    tier(0.64, 0.44, 4),
    tier(0.69, 0.38, 4),
    tier(0.74, 0.32, 3),
    tier(0.79, 0.26, 3),
    tier(0.84, 0.21, 2),
    tier(0.89, 0.16, 2),
    tier(0.94, 0.12, 1),
];

/// Cake placement and tier table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cake {
    /// Bottom-center of the cake
    pub base: Vec2,
    pub width: f32,
    pub height: f32,
    pub tiers: Vec<Tier>,
}

/// A candle slot produced from the tier table
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CandleSlot {
    /// Flame position (used for hit detection)
    pub pos: Vec2,
    pub tier: u32,
    pub index: u32,
}

/// Flames sit this far above the slot line
const FLAME_OFFSET: f32 = 3.0;

impl Cake {
    /// Evenly spaced slots along the top of every tier
    pub fn slots(&self) -> Vec<CandleSlot> {
        let mut slots = Vec::new();
        for (tier_index, tier) in self.tiers.iter().enumerate() {
            let y = self.base.y - self.height * tier.height;
            let tier_width = self.width * tier.width;
            let spacing = tier_width / (tier.slots + 1) as f32;
            for s in 0..tier.slots {
                let x = self.base.x - tier_width / 2.0 + spacing * (s + 1) as f32;
                slots.push(CandleSlot {
                    pos: Vec2::new(x, y - FLAME_OFFSET),
                    tier: tier_index as u32,
                    index: s,
                });
            }
        }
        slots
    }
}

/// Full scene layout
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Layout {
    pub width: f32,
    pub height: f32,
    /// Pointer-down here starts inflating
    pub tank_zone: Rect,
    /// Dragging within `chest_radius` of this starts inhaling
    pub chest: Vec2,
    pub chest_radius: f32,
    /// Gust apex and flick reference point
    pub mouth: Vec2,
    pub cake: Cake,
}

impl Default for Layout {
    fn default() -> Self {
        Self::portrait(390.0, 844.0)
    }
}

impl Layout {
    /// Portrait arrangement: tank on the left, character center-left, cake right
    pub fn portrait(width: f32, height: f32) -> Self {
        let ground_y = height - 150.0;
        let tank_x = 95.0;
        let character = Vec2::new(width * 0.42, ground_y);

        let cake_scale = 0.33;
        Self {
            width,
            height,
            tank_zone: Rect::new(Vec2::new(tank_x, ground_y - 100.0), Vec2::new(110.0, 260.0)),
            chest: character + Vec2::new(20.0, -140.0),
            chest_radius: 50.0,
            mouth: character + Vec2::new(50.0, -200.0),
            cake: Cake {
                base: Vec2::new(width - 90.0, ground_y),
                width: 506.0 * cake_scale,
                height: 1024.0 * cake_scale,
                tiers: CAKE_TIERS.to_vec(),
            },
        }
    }

    pub fn in_tank_zone(&self, p: Vec2) -> bool {
        self.tank_zone.contains(p)
    }

    pub fn in_chest_zone(&self, p: Vec2) -> bool {
        p.distance(self.chest) < self.chest_radius
    }
}
