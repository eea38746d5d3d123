//! Candle field: point targets on the cake

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::gust::GustCone;
use crate::layout::CandleSlot;

/// A candle flame. Once out it stays out for the session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Candle {
    pub id: u32,
    pub pos: Vec2,
    pub tier: u32,
    pub lit: bool,
}

/// All candles on the cake plus the win latch
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CandleField {
    pub candles: Vec<Candle>,
    won: bool,
}

impl CandleField {
    /// One lit candle per slot
    pub fn from_slots(slots: &[CandleSlot]) -> Self {
        Self::from_pattern(slots, &[])
    }

    /// Light only the slots whose pattern entry is `true`; slots past the end
    /// of the pattern are lit
    pub fn from_pattern(slots: &[CandleSlot], pattern: &[bool]) -> Self {
        let candles = slots
            .iter()
            .enumerate()
            .filter(|(i, _)| pattern.get(*i).copied().unwrap_or(true))
            .map(|(i, slot)| Candle {
                id: i as u32,
                pos: slot.pos,
                tier: slot.tier,
                lit: true,
            })
            .collect();
        Self {
            candles,
            won: false,
        }
    }

    pub fn remaining(&self) -> usize {
        self.candles.iter().filter(|c| c.lit).count()
    }

    pub fn is_won(&self) -> bool {
        self.won
    }

    /// Blow out every lit candle inside the cone. All hits resolve together;
    /// returns the ids extinguished, in id order.
    pub fn extinguish_in(&mut self, cone: &GustCone) -> Vec<u32> {
        let mut hits = Vec::new();
        for candle in self.candles.iter_mut().filter(|c| c.lit) {
            if cone.contains(candle.pos) {
                candle.lit = false;
                hits.push(candle.id);
            }
        }
        hits
    }

    /// Latch the win when nothing is left lit. True only the first time.
    pub fn resolve_win(&mut self) -> bool {
        if self.won || self.remaining() > 0 || self.candles.is_empty() {
            return false;
        }
        self.won = true;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn slot(x: f32, y: f32) -> CandleSlot {
        CandleSlot {
            pos: Vec2::new(x, y),
            tier: 0,
            index: 0,
        }
    }

    fn laser_right() -> GustCone {
        GustCone {
            origin: Vec2::ZERO,
            direction: 0.0,
            half_angle: 0.1,
            reach: 200.0,
            power: 10.0,
        }
    }

    #[test]
    fn test_extinguish_only_inside() {
        let mut field = CandleField::from_slots(&[slot(100.0, 0.0), slot(0.0, 100.0), slot(201.0, 0.0)]);
        let hits = field.extinguish_in(&laser_right());
        assert_eq!(hits, vec![0]);
        assert_eq!(field.remaining(), 2);
    }

    #[test]
    fn test_unlit_stays_unlit() {
        let mut field = CandleField::from_slots(&[slot(100.0, 0.0), slot(150.0, 0.0)]);
        assert_eq!(field.extinguish_in(&laser_right()).len(), 2);
        // Second gust finds nothing to hit
        assert!(field.extinguish_in(&laser_right()).is_empty());
        assert!(field.candles.iter().all(|c| !c.lit));
    }

    #[test]
    fn test_win_fires_once() {
        let mut field = CandleField::from_slots(&[slot(100.0, 0.0), slot(0.0, 100.0)]);
        field.extinguish_in(&laser_right());
        assert!(!field.resolve_win());

        let down = GustCone {
            direction: std::f32::consts::FRAC_PI_2,
            ..laser_right()
        };
        field.extinguish_in(&down);
        assert_eq!(field.remaining(), 0);
        assert!(field.resolve_win());
        assert!(!field.resolve_win());
        assert!(field.is_won());
    }

    #[test]
    fn test_pattern_skips_slots() {
        let slots = [slot(1.0, 0.0), slot(2.0, 0.0), slot(3.0, 0.0)];
        let field = CandleField::from_pattern(&slots, &[true, false]);
        let ids: Vec<u32> = field.candles.iter().map(|c| c.id).collect();
        assert_eq!(ids, vec![0, 2]);
    }
}
