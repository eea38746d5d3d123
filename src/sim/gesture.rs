//! Pointer stream → domain intents
//!
//! Only one pointer is tracked. The interpreter remembers where a press began;
//! whether air is flowing, and what the character can do, it reads from the
//! game through [`GestureContext`] so it never emits an intent the game cannot
//! take.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::character::{Gesture, HeroState};
use crate::layout::Layout;
use crate::tuning::Tuning;

/// Raw input from the single pointer
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum PointerEvent {
    Down { pos: Vec2, t_ms: f64 },
    Move { pos: Vec2 },
    Up { pos: Vec2 },
}

/// What a pointer event means for the game
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Intent {
    /// Pressed the tank from Idle or AtTank
    StartInflate,
    /// Dragged off the tank; fill stops without a release
    StopInflate,
    /// Let go of the tank
    ReleaseInflate,
    /// Dragged the balloon to the chest
    StartInhale,
    /// Let go while inhaling
    ReleaseInhale,
    /// A valid flick released at `end`
    Exhale { end: Vec2 },
}

/// Snapshot of what the interpreter needs to know about the game
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GestureContext {
    pub hero: HeroState,
    pub fill: f32,
    pub lung_air: f32,
    /// Tank air is flowing
    pub inflating: bool,
    /// Balloon air is flowing into the lungs
    pub inhaling: bool,
}

/// Where a flick must land, relative to the mouth
pub fn is_valid_flick(mouth: Vec2, end: Vec2, tuning: &Tuning) -> bool {
    let delta = end - mouth;
    delta.x > tuning.flick_min_dx && delta.length() > tuning.flick_min_distance
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GestureInterpreter {
    pointer_down: bool,
    /// Press position, when the press began outside both hot zones
    flick_start: Option<Vec2>,
}

impl GestureInterpreter {
    pub fn is_pointer_down(&self) -> bool {
        self.pointer_down
    }

    pub fn flick_start(&self) -> Option<Vec2> {
        self.flick_start
    }

    pub fn on_pointer(
        &mut self,
        event: PointerEvent,
        layout: &Layout,
        ctx: GestureContext,
        tuning: &Tuning,
    ) -> Option<Intent> {
        match event {
            PointerEvent::Down { pos, .. } => self.on_down(pos, layout, ctx),
            PointerEvent::Move { pos } => self.on_move(pos, layout, ctx),
            PointerEvent::Up { pos } => self.on_up(pos, layout, ctx, tuning),
        }
    }

    fn on_down(&mut self, pos: Vec2, layout: &Layout, ctx: GestureContext) -> Option<Intent> {
        if self.pointer_down {
            // Second pointer: ignored
            return None;
        }
        self.pointer_down = true;
        self.flick_start = None;

        if layout.in_tank_zone(pos) {
            if ctx.hero.accepts(Gesture::TouchTank) {
                return Some(Intent::StartInflate);
            }
            return None;
        }
        if !layout.in_chest_zone(pos) {
            self.flick_start = Some(pos);
        }
        None
    }

    fn on_move(&mut self, pos: Vec2, layout: &Layout, ctx: GestureContext) -> Option<Intent> {
        if !self.pointer_down {
            return None;
        }

        if layout.in_chest_zone(pos)
            && ctx.fill > 0.0
            && !ctx.inflating
            && ctx.hero == HeroState::AtSuck
            && ctx.hero.accepts(Gesture::BeginInhale)
        {
            if !ctx.inhaling {
                return Some(Intent::StartInhale);
            }
        } else if ctx.inflating && !layout.in_tank_zone(pos) {
            return Some(Intent::StopInflate);
        }
        None
    }

    fn on_up(
        &mut self,
        pos: Vec2,
        layout: &Layout,
        ctx: GestureContext,
        tuning: &Tuning,
    ) -> Option<Intent> {
        if !self.pointer_down {
            return None;
        }

        let intent = if ctx.inflating {
            Some(Intent::ReleaseInflate)
        } else if ctx.inhaling {
            Some(Intent::ReleaseInhale)
        } else if self.flick_start.is_some()
            && ctx.lung_air > 0.0
            && ctx.hero.accepts(Gesture::Flick)
            && is_valid_flick(layout.mouth, pos, tuning)
        {
            Some(Intent::Exhale { end: pos })
        } else {
            if self.flick_start.is_some() {
                log::debug!("Flick to {pos} discarded in {:?}", ctx.hero);
            }
            None
        };

        self.pointer_down = false;
        self.flick_start = None;
        intent
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx(hero: HeroState, fill: f32, lung_air: f32) -> GestureContext {
        GestureContext {
            hero,
            fill,
            lung_air,
            inflating: false,
            inhaling: false,
        }
    }

    fn inflating(c: GestureContext) -> GestureContext {
        GestureContext { inflating: true, ..c }
    }

    fn inhaling(c: GestureContext) -> GestureContext {
        GestureContext { inhaling: true, ..c }
    }

    fn down(pos: Vec2) -> PointerEvent {
        PointerEvent::Down { pos, t_ms: 0.0 }
    }

    /// A spot away from the tank and the chest
    fn open_air(layout: &Layout) -> Vec2 {
        layout.mouth + Vec2::new(80.0, -200.0)
    }

    #[test]
    fn test_tank_press_from_idle_and_at_tank() {
        let layout = Layout::default();
        let tuning = Tuning::default();
        let tank = layout.tank_zone.center;

        for hero in [HeroState::Idle, HeroState::AtTank] {
            let mut g = GestureInterpreter::default();
            let intent = g.on_pointer(down(tank), &layout, ctx(hero, 0.0, 0.0), &tuning);
            assert_eq!(intent, Some(Intent::StartInflate));
            assert!(g.is_pointer_down());
        }

        let mut g = GestureInterpreter::default();
        let intent = g.on_pointer(down(tank), &layout, ctx(HeroState::AtSuck, 10.0, 0.0), &tuning);
        assert_eq!(intent, None);
    }

    #[test]
    fn test_release_inflate() {
        let layout = Layout::default();
        let tuning = Tuning::default();
        let c = ctx(HeroState::AtTank, 10.0, 0.0);
        let mut g = GestureInterpreter::default();
        g.on_pointer(down(layout.tank_zone.center), &layout, c, &tuning);
        let up = PointerEvent::Up { pos: layout.tank_zone.center };
        assert_eq!(
            g.on_pointer(up, &layout, inflating(c), &tuning),
            Some(Intent::ReleaseInflate)
        );
        assert!(!g.is_pointer_down());

        // Flow already stopped (popped under the finger): nothing to release
        let mut g = GestureInterpreter::default();
        g.on_pointer(down(layout.tank_zone.center), &layout, c, &tuning);
        assert_eq!(g.on_pointer(up, &layout, c, &tuning), None);
    }

    #[test]
    fn test_drag_off_tank_stops_inflate() {
        let layout = Layout::default();
        let tuning = Tuning::default();
        let c = ctx(HeroState::AtTank, 10.0, 0.0);
        let mut g = GestureInterpreter::default();
        g.on_pointer(down(layout.tank_zone.center), &layout, c, &tuning);
        let mv = PointerEvent::Move { pos: open_air(&layout) };
        assert_eq!(g.on_pointer(mv, &layout, inflating(c), &tuning), Some(Intent::StopInflate));
        // Still on the tank: keep filling
        let on_tank = PointerEvent::Move { pos: layout.tank_zone.center };
        assert_eq!(g.on_pointer(on_tank, &layout, inflating(c), &tuning), None);
        // Releasing after the stop is not an inflate release
        let intent = g.on_pointer(PointerEvent::Up { pos: open_air(&layout) }, &layout, c, &tuning);
        assert_eq!(intent, None);
    }

    #[test]
    fn test_drag_to_chest_starts_inhale_once() {
        let layout = Layout::default();
        let tuning = Tuning::default();
        let c = ctx(HeroState::AtSuck, 40.0, 0.0);
        let mut g = GestureInterpreter::default();
        g.on_pointer(down(open_air(&layout)), &layout, c, &tuning);
        let mv = PointerEvent::Move { pos: layout.chest };
        assert_eq!(g.on_pointer(mv, &layout, c, &tuning), Some(Intent::StartInhale));
        assert_eq!(g.on_pointer(mv, &layout, inhaling(c), &tuning), None);
        let up = PointerEvent::Up { pos: layout.chest };
        assert_eq!(g.on_pointer(up, &layout, inhaling(c), &tuning), Some(Intent::ReleaseInhale));
    }

    #[test]
    fn test_chest_drag_refused_without_fill_or_in_idle() {
        let layout = Layout::default();
        let tuning = Tuning::default();
        let mv = PointerEvent::Move { pos: layout.chest };

        for c in [ctx(HeroState::AtSuck, 0.0, 0.0), ctx(HeroState::Idle, 40.0, 0.0)] {
            let mut g = GestureInterpreter::default();
            g.on_pointer(down(open_air(&layout)), &layout, c, &tuning);
            assert_eq!(g.on_pointer(mv, &layout, c, &tuning), None);
        }
    }

    #[test]
    fn test_flick_validity() {
        let layout = Layout::default();
        let tuning = Tuning::default();
        let c = ctx(HeroState::AtSuck, 0.0, 30.0);
        let good = layout.mouth + Vec2::new(150.0, 40.0);

        let mut g = GestureInterpreter::default();
        g.on_pointer(down(open_air(&layout)), &layout, c, &tuning);
        let intent = g.on_pointer(PointerEvent::Up { pos: good }, &layout, c, &tuning);
        assert_eq!(intent, Some(Intent::Exhale { end: good }));

        // Left of the mouth
        let mut g = GestureInterpreter::default();
        g.on_pointer(down(open_air(&layout)), &layout, c, &tuning);
        let left = layout.mouth + Vec2::new(-150.0, 0.0);
        assert_eq!(g.on_pointer(PointerEvent::Up { pos: left }, &layout, c, &tuning), None);

        // Too short
        let mut g = GestureInterpreter::default();
        g.on_pointer(down(open_air(&layout)), &layout, c, &tuning);
        let short = layout.mouth + Vec2::new(30.0, 0.0);
        assert_eq!(g.on_pointer(PointerEvent::Up { pos: short }, &layout, c, &tuning), None);

        // Empty lungs
        let empty = ctx(HeroState::AtSuck, 0.0, 0.0);
        let mut g = GestureInterpreter::default();
        g.on_pointer(down(open_air(&layout)), &layout, empty, &tuning);
        assert_eq!(g.on_pointer(PointerEvent::Up { pos: good }, &layout, empty, &tuning), None);
    }

    #[test]
    fn test_flick_must_start_outside_zones() {
        let layout = Layout::default();
        let tuning = Tuning::default();
        let c = ctx(HeroState::AtSuck, 0.0, 30.0);
        let good = layout.mouth + Vec2::new(150.0, 40.0);

        let mut g = GestureInterpreter::default();
        g.on_pointer(down(layout.chest), &layout, c, &tuning);
        assert_eq!(g.flick_start(), None);
        assert_eq!(g.on_pointer(PointerEvent::Up { pos: good }, &layout, c, &tuning), None);
    }

    #[test]
    fn test_second_pointer_ignored() {
        let layout = Layout::default();
        let tuning = Tuning::default();
        let c = ctx(HeroState::Idle, 0.0, 0.0);
        let mut g = GestureInterpreter::default();
        let first = open_air(&layout);
        g.on_pointer(down(first), &layout, c, &tuning);
        assert_eq!(g.on_pointer(down(layout.tank_zone.center), &layout, c, &tuning), None);
        assert_eq!(g.flick_start(), Some(first));
    }
}
