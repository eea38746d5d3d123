//! Lung air reservoir

use serde::{Deserialize, Serialize};

use crate::consts::MAX_LUNG_AIR;

/// Air held in the character's lungs. Survives balloon pops.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Lungs {
    pub air: f32,
    pub max_air: f32,
}

impl Default for Lungs {
    fn default() -> Self {
        Self {
            air: 0.0,
            max_air: MAX_LUNG_AIR,
        }
    }
}

impl Lungs {
    /// Space left before the lungs are full
    pub fn room(&self) -> f32 {
        (self.max_air - self.air).max(0.0)
    }

    pub fn fill_ratio(&self) -> f32 {
        (self.air / self.max_air).clamp(0.0, 1.0)
    }

    pub fn has_air(&self) -> bool {
        self.air > 0.0
    }

    /// Take in air, clamped to capacity. Returns the amount accepted.
    pub fn receive(&mut self, amount: f32) -> f32 {
        let accepted = amount.max(0.0).min(self.room());
        self.air = (self.air + accepted).min(self.max_air);
        accepted
    }

    /// Exhale everything. Partial exhales do not exist.
    pub fn dump_all(&mut self) -> f32 {
        std::mem::take(&mut self.air)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_receive_clamps() {
        let mut lungs = Lungs::default();
        assert_eq!(lungs.receive(60.0), 60.0);
        assert_eq!(lungs.receive(60.0), 40.0);
        assert_eq!(lungs.air, 100.0);
        assert_eq!(lungs.receive(-3.0), 0.0);
    }

    #[test]
    fn test_dump_all_is_total() {
        let mut lungs = Lungs::default();
        lungs.receive(37.5);
        assert_eq!(lungs.dump_all(), 37.5);
        assert_eq!(lungs.air, 0.0);
        assert!(!lungs.has_air());
        assert_eq!(lungs.dump_all(), 0.0);
    }
}
