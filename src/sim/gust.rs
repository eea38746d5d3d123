//! Gust cone geometry and hit testing
//!
//! A flick released close to the mouth makes a wide, short gust; a flick
//! released far away makes a narrow, long "laser". The cone is a wedge with its
//! apex at the mouth.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::tuning::Tuning;
use crate::{cartesian_to_polar, lerp, normalize_angle, polar_to_cartesian};

/// A single exhale, as a 2D wedge
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GustCone {
    /// Apex (the mouth)
    pub origin: Vec2,
    /// Axis angle in radians
    pub direction: f32,
    /// Half of the full spread, radians
    pub half_angle: f32,
    /// Radius of the wedge
    pub reach: f32,
    /// Lung volume × strength multiplier (presentation only)
    pub power: f32,
}

/// 0 for releases nearer than `near`, 1 beyond `far`, linear between
pub fn flick_ratio(dist: f32, near: f32, far: f32) -> f32 {
    let span = far - near;
    if span <= f32::EPSILON {
        return if dist >= far { 1.0 } else { 0.0 };
    }
    ((dist - near) / span).clamp(0.0, 1.0)
}

/// Full spread in degrees for a release `dist` pixels from the mouth
pub fn spread_for_distance(dist: f32, tuning: &Tuning) -> f32 {
    let ratio = flick_ratio(dist, tuning.near_threshold, tuning.far_threshold);
    lerp(tuning.spread_angle_max, tuning.spread_angle_min, ratio)
}

/// Reach for a given spread: laser spread reaches farthest
pub fn reach_for_spread(spread_deg: f32, tuning: &Tuning) -> f32 {
    let span = tuning.spread_angle_max - tuning.spread_angle_min;
    let ratio = if span.abs() <= f32::EPSILON {
        0.0
    } else {
        ((spread_deg - tuning.spread_angle_min) / span).clamp(0.0, 1.0)
    };
    lerp(tuning.reach_at_min_spread, tuning.reach_at_max_spread, ratio)
}

impl GustCone {
    /// Build the gust for a flick released at `end`
    pub fn from_flick(mouth: Vec2, end: Vec2, lung_air: f32, tuning: &Tuning) -> Self {
        let (dist, direction) = cartesian_to_polar(end - mouth);
        let spread_deg = spread_for_distance(dist, tuning);
        Self {
            origin: mouth,
            direction,
            half_angle: spread_deg.to_radians() / 2.0,
            reach: reach_for_spread(spread_deg, tuning),
            power: lung_air.max(0.0) * tuning.strength_multiplier,
        }
    }

    /// Full spread in degrees
    pub fn spread_deg(&self) -> f32 {
        (self.half_angle * 2.0).to_degrees()
    }

    /// Angle between the cone axis and `point`, in [0, π]
    pub fn angular_offset(&self, point: Vec2) -> f32 {
        let (_, theta) = cartesian_to_polar(point - self.origin);
        normalize_angle(theta - self.direction).abs()
    }

    /// Inside the wedge (edges inclusive). Power plays no part.
    pub fn contains(&self, point: Vec2) -> bool {
        let distance = point.distance(self.origin);
        if distance > self.reach {
            return false;
        }
        // The apex itself is always inside
        distance <= f32::EPSILON || self.angular_offset(point) <= self.half_angle
    }

    /// Outline points along the arc, for drawing
    pub fn sample_arc(&self, num_points: usize) -> Vec<Vec2> {
        let start = self.direction - self.half_angle;
        let span = self.half_angle * 2.0;
        (0..num_points)
            .map(|i| {
                let t = i as f32 / (num_points - 1).max(1) as f32;
                self.origin + polar_to_cartesian(self.reach, start + t * span)
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cone_at_origin(end: Vec2) -> GustCone {
        GustCone::from_flick(Vec2::ZERO, end, 50.0, &Tuning::default())
    }

    #[test]
    fn test_far_release_is_laser() {
        let cone = cone_at_origin(Vec2::new(300.0, 0.0));
        assert!((cone.spread_deg() - 5.0).abs() < 1e-3);
        assert!((cone.reach - 350.0).abs() < 1e-3);
        assert!(cone.direction.abs() < 1e-6);
    }

    #[test]
    fn test_near_release_is_wide() {
        let cone = cone_at_origin(Vec2::new(50.0, 50.0));
        assert!((cone.spread_deg() - 70.0).abs() < 1e-3);
        assert!((cone.reach - 50.0).abs() < 1e-3);
        assert!((cone.direction - std::f32::consts::FRAC_PI_4).abs() < 1e-5);
    }

    #[test]
    fn test_midway_release_interpolates() {
        // 165 px is halfway between the 80 and 250 thresholds
        let cone = cone_at_origin(Vec2::new(165.0, 0.0));
        assert!((cone.spread_deg() - 37.5).abs() < 1e-3);
        assert!((cone.reach - 200.0).abs() < 1e-3);
    }

    #[test]
    fn test_on_axis_hit_and_reach_miss() {
        let cone = cone_at_origin(Vec2::new(300.0, 0.0));
        assert!(cone.contains(Vec2::new(cone.reach - 1.0, 0.0)));
        assert!(cone.contains(Vec2::new(cone.reach, 0.0)));
        assert!(!cone.contains(Vec2::new(cone.reach + 1.0, 0.0)));
    }

    #[test]
    fn test_angular_edge() {
        let cone = cone_at_origin(Vec2::new(165.0, 0.0));
        let eps = 1e-3;
        let inside = polar_to_cartesian(100.0, cone.half_angle - eps);
        let outside = polar_to_cartesian(100.0, cone.half_angle + eps);
        let outside_below = polar_to_cartesian(100.0, -(cone.half_angle + eps));
        assert!(cone.contains(inside));
        assert!(!cone.contains(outside));
        assert!(!cone.contains(outside_below));
    }

    #[test]
    fn test_offset_wraps_across_pi() {
        // Cone pointing left; a point just below the negative x axis is near it
        let cone = GustCone {
            origin: Vec2::ZERO,
            direction: std::f32::consts::PI - 0.05,
            half_angle: 0.2,
            reach: 100.0,
            power: 1.0,
        };
        assert!(cone.contains(Vec2::new(-50.0, -2.0)));
        assert!(cone.angular_offset(Vec2::new(-50.0, -2.0)) < 0.2);
    }

    #[test]
    fn test_power_scales_with_strength() {
        let mut tuning = Tuning::default();
        tuning.strength_multiplier = 2.0;
        let cone = GustCone::from_flick(Vec2::ZERO, Vec2::new(100.0, 0.0), 37.5, &tuning);
        assert_eq!(cone.power, 75.0);
    }

    #[test]
    fn test_equal_spreads_do_not_divide_by_zero() {
        let mut tuning = Tuning::default();
        tuning.spread_angle_min = 20.0;
        tuning.spread_angle_max = 20.0;
        let cone = GustCone::from_flick(Vec2::ZERO, Vec2::new(120.0, 0.0), 10.0, &tuning);
        assert!(cone.reach.is_finite());
        assert_eq!(cone.reach, tuning.reach_at_min_spread);
    }

    #[test]
    fn test_sample_arc_endpoints_on_edges() {
        let cone = cone_at_origin(Vec2::new(165.0, 0.0));
        let pts = cone.sample_arc(5);
        assert_eq!(pts.len(), 5);
        for p in &pts {
            assert!((p.length() - cone.reach).abs() < 1e-2);
        }
    }
}
