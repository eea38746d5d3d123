//! Per-frame simulation step
//!
//! Order within a tick: reset, pointer events, due timers, animation advance,
//! then continuous inflate/inhale.

use rand::Rng;
use serde::{Deserialize, Serialize};

use super::balloon::{Zone, continuous_pop_check};
use super::character::{Gesture, HeroState, Signal, Trigger};
use super::gesture::{Intent, PointerEvent};
use super::gust::GustCone;
use super::output::{AudioCommand, Output, RenderCommand, Sound};
use super::state::GameState;
use super::timers::TimerAction;
use crate::consts::*;
use crate::tuning::Tuning;

/// Input for a single tick
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TickInput {
    /// Pointer events since the last tick, in arrival order
    #[serde(default)]
    pub pointer: Vec<PointerEvent>,
    /// Start a fresh session before anything else
    #[serde(default)]
    pub reset: bool,
}

/// Advance the game by `dt_ms` milliseconds
pub fn tick(state: &mut GameState, input: &TickInput, tuning: &Tuning, dt_ms: f32) {
    let dt_ms = if dt_ms.is_finite() { dt_ms.max(0.0) } else { 0.0 };

    if input.reset {
        state.reset();
    }

    for &event in &input.pointer {
        handle_pointer(state, event, tuning);
    }

    state.time_ms += dt_ms as f64;
    fire_due_timers(state);

    let air = state.air();
    let signals = state.hero.advance(dt_ms, air);
    dispatch(state, signals, tuning);

    update_air(state, tuning, dt_ms);

    state.sync_presentation();
}

/// Feed one pointer event through the gesture interpreter
pub fn handle_pointer(state: &mut GameState, event: PointerEvent, tuning: &Tuning) {
    if matches!(event, PointerEvent::Down { .. }) {
        state.note_first_touch();
    }
    let ctx = state.gesture_context();
    if let Some(intent) = state.gestures.on_pointer(event, &state.layout, ctx, tuning) {
        apply_intent(state, intent, tuning);
    }
}

/// Carry out a domain intent. Intents the character cannot take are dropped.
pub fn apply_intent(state: &mut GameState, intent: Intent, tuning: &Tuning) {
    log::debug!("{:?} in {:?}", intent, state.hero.state());

    match intent {
        Intent::StartInflate => {
            let air = state.air();
            let Some(signals) = state.hero.fire(Trigger::Gesture(Gesture::TouchTank), air) else {
                return;
            };
            state.inflating = true;
            dispatch(state, signals, tuning);
        }
        Intent::StopInflate => {
            state.inflating = false;
        }
        Intent::ReleaseInflate => {
            if !state.inflating {
                return;
            }
            state.inflating = false;
            if state.hero.state() == HeroState::PivotToTank {
                state.deferred_release = true;
                return;
            }
            finish_inflate(state, tuning);
        }
        Intent::StartInhale => {
            let air = state.air();
            let Some(signals) = state.hero.fire(Trigger::Gesture(Gesture::BeginInhale), air) else {
                return;
            };
            state.inhaling = true;
            dispatch(state, signals, tuning);
        }
        Intent::ReleaseInhale => {
            if !state.inhaling {
                return;
            }
            state.inhaling = false;
            let air = state.air();
            if let Some(signals) = state.hero.fire(Trigger::Gesture(Gesture::ReleaseInhale), air) {
                dispatch(state, signals, tuning);
            }
        }
        Intent::Exhale { end } => {
            state.pending_flick = Some(end);
            let air = state.air();
            match state.hero.fire(Trigger::Gesture(Gesture::Flick), air) {
                Some(signals) => dispatch(state, signals, tuning),
                None => state.pending_flick = None,
            }
        }
    }
}

/// End of an inflate gesture: degrade, maybe pop, then pivot
fn finish_inflate(state: &mut GameState, tuning: &Tuning) {
    if state.balloon.fill > 0.0 && !state.balloon.awaiting_replacement {
        let outcome = state.balloon.release_degrade(tuning, &mut state.rng);
        if outcome.degraded_by > 0.0 {
            let label = match outcome.zone {
                Zone::Red => "RED!",
                _ => "Yellow",
            };
            log::debug!(
                "Balloon {} degraded by {:.0}% (capacity {:.1})",
                state.balloon.instance,
                outcome.degraded_by * 100.0,
                state.balloon.capacity
            );
            let pos = state.balloon_anchor() - glam::Vec2::new(0.0, 50.0);
            state.emit(RenderCommand::Text {
                text: format!("{label} -{:.0}%", outcome.degraded_by * 100.0),
                pos,
                duration_ms: 1000.0,
            });
        }
        if outcome.popped {
            pop_balloon(state, tuning);
            return;
        }
    }

    let air = state.air();
    if let Some(signals) = state.hero.fire(Trigger::Gesture(Gesture::ReleaseInflate), air) {
        dispatch(state, signals, tuning);
    }
}

/// Burst the balloon: scare the character and schedule a replacement
pub fn pop_balloon(state: &mut GameState, tuning: &Tuning) {
    log::info!(
        "Balloon {} popped at {:.1}/{:.1}",
        state.balloon.instance,
        state.balloon.fill,
        state.balloon.capacity
    );

    let pos = state.balloon_anchor();
    state.balloon.pop();
    state.inflating = false;
    state.inhaling = false;
    state.deferred_release = false;
    state.pending_flick = None;

    state.emit(AudioCommand::PlayOnce(Sound::Pop));
    state.emit(RenderCommand::Text {
        text: "POP!".to_string(),
        pos,
        duration_ms: 500.0,
    });

    let instance = state.balloon.instance;
    state.timers.schedule(
        state.time_ms,
        tuning.balloon_replace_ms,
        state.epoch,
        TimerAction::ReplaceBalloon { instance },
    );

    let air = state.air();
    if let Some(signals) = state.hero.fire(Trigger::Pop, air) {
        dispatch(state, signals, tuning);
    }
}

/// Run the side effects of character signals
fn dispatch(state: &mut GameState, signals: Vec<Signal>, tuning: &Tuning) {
    for signal in signals {
        match signal {
            Signal::Entered(hero) => {
                let clip = state.hero.clip_for(hero);
                state.emit(RenderCommand::HeroClip { state: hero, clip });

                match hero {
                    HeroState::AtTank if state.deferred_release => {
                        state.deferred_release = false;
                        finish_inflate(state, tuning);
                    }
                    HeroState::Blowing => fire_gust(state, tuning),
                    HeroState::ReturningToIdle => {
                        // Used up: a fresh balloon for the next round
                        state.balloon.replace();
                    }
                    _ => {}
                }
            }
            Signal::CrossedMidpoint(orientation) => {
                state.balloon.orientation = orientation;
            }
        }
    }
}

/// Exhale the whole reservoir as a cone and blow out whatever it covers
fn fire_gust(state: &mut GameState, tuning: &Tuning) {
    let Some(end) = state.pending_flick.take() else {
        log::warn!("Blow started without a flick");
        return;
    };

    let lung_air = state.lungs.dump_all();
    let cone = GustCone::from_flick(state.layout.mouth, end, lung_air, tuning);
    let id = state.next_gust_id();
    log::debug!(
        "Gust {id}: spread {:.1} deg, reach {:.0}, power {:.1}",
        cone.spread_deg(),
        cone.reach,
        cone.power
    );

    state.emit(RenderCommand::ShowGust { id, cone });
    state.timers.schedule(
        state.time_ms,
        GUST_VISIBLE_MS,
        state.epoch,
        TimerAction::HideGust { id },
    );
    state.last_gust = Some((id, cone));

    let hits = state.candles.extinguish_in(&cone);
    for &candle in &hits {
        state.emit(RenderCommand::CandleOut { id: candle });
    }
    if !hits.is_empty() {
        let remaining = state.candles.remaining();
        state.emit(RenderCommand::CandlesRemaining(remaining));
    }

    if state.candles.resolve_win() {
        log::info!("All candles out");
        state.emit(Output::Won);
    }
}

/// Fire every timer that has come due, skipping stale ones
fn fire_due_timers(state: &mut GameState) {
    for timer in state.timers.take_due(state.time_ms) {
        if timer.epoch != state.epoch {
            log::debug!("Dropping timer from epoch {}", timer.epoch);
            continue;
        }
        match timer.action {
            TimerAction::ReplaceBalloon { instance } => {
                if state.balloon.instance != instance || !state.balloon.awaiting_replacement {
                    log::debug!("Dropping replacement for balloon {instance}");
                    continue;
                }
                state.balloon.replace();
                log::info!("Balloon {} ready", state.balloon.instance);
            }
            TimerAction::HideGust { id } => {
                state.emit(RenderCommand::HideGust { id });
                if state.last_gust.is_some_and(|(shown, _)| shown == id) {
                    state.last_gust = None;
                }
            }
        }
    }
}

/// Continuous tank fill (with the red-zone hazard) and balloon-to-lung transfer
fn update_air(state: &mut GameState, tuning: &Tuning, dt_ms: f32) {
    let frames = dt_ms / REFERENCE_FRAME_MS;

    let filled = state.inflating
        && state.hero.state() == HeroState::AtTank
        && state.balloon.fill_tick(tuning.fill_speed * frames).is_some();

    // Exposure runs on the session clock whether or not air is flowing
    let exposure = state.balloon.track_red_exposure(state.time_ms);
    if let (true, Some(ms)) = (filled, exposure) {
        let chance = continuous_pop_check(Zone::Red, ms, tuning.red_pop_rate);
        if chance > 0.0 && state.rng.random::<f32>() < chance {
            pop_balloon(state, tuning);
        }
    }

    if state.inhaling && state.hero.state() == HeroState::Sucking {
        let room = state.lungs.room();
        if let Some(moved) = state
            .balloon
            .transfer_to_lungs(tuning.inhale_speed * frames, room)
        {
            state.lungs.receive(moved);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec2;

    const DT: f32 = SIM_DT_MS;

    /// Tuning with both pop hazards disabled
    fn safe_tuning() -> Tuning {
        Tuning {
            release_pop_chance: 0.0,
            red_pop_rate: 0.0,
            ..Tuning::default()
        }
    }

    fn run(state: &mut GameState, tuning: &Tuning, ms: f32) {
        let mut t = 0.0;
        while t < ms {
            tick(state, &TickInput::default(), tuning, DT);
            t += DT;
        }
    }

    fn at_tank_inflating(state: &mut GameState, tuning: &Tuning) {
        apply_intent(state, Intent::StartInflate, tuning);
        run(state, tuning, 900.0);
        assert_eq!(state.hero.state(), HeroState::AtTank);
    }

    #[test]
    fn test_fill_only_at_tank() {
        let tuning = safe_tuning();
        let mut state = GameState::new(1);
        apply_intent(&mut state, Intent::StartInflate, &tuning);
        assert_eq!(state.hero.state(), HeroState::PivotToTank);
        tick(&mut state, &TickInput::default(), &tuning, DT);
        assert_eq!(state.balloon.fill, 0.0);

        run(&mut state, &tuning, 900.0);
        assert!(state.balloon.fill > 0.0);
    }

    #[test]
    fn test_fill_rate_matches_reference_frame() {
        let tuning = safe_tuning();
        let mut state = GameState::new(1);
        at_tank_inflating(&mut state, &tuning);
        let before = state.balloon.fill;
        tick(&mut state, &TickInput::default(), &tuning, REFERENCE_FRAME_MS);
        assert!((state.balloon.fill - before - tuning.fill_speed).abs() < 1e-4);
    }

    #[test]
    fn test_release_during_pivot_is_deferred() {
        let tuning = safe_tuning();
        let mut state = GameState::new(1);
        apply_intent(&mut state, Intent::StartInflate, &tuning);
        apply_intent(&mut state, Intent::ReleaseInflate, &tuning);
        assert!(state.deferred_release);
        assert_eq!(state.hero.state(), HeroState::PivotToTank);

        // Arrives at the tank with nothing in the balloon and pivots away
        run(&mut state, &tuning, 900.0);
        assert!(!state.deferred_release);
        assert_eq!(state.hero.state(), HeroState::PivotFromTank);
    }

    #[test]
    fn test_stop_inflate_keeps_capacity() {
        let tuning = safe_tuning();
        let mut state = GameState::new(1);
        at_tank_inflating(&mut state, &tuning);
        state.balloon.fill = 80.0;
        apply_intent(&mut state, Intent::StopInflate, &tuning);
        run(&mut state, &tuning, 100.0);
        assert_eq!(state.balloon.fill, 80.0);
        assert_eq!(state.balloon.capacity, 100.0);
        assert_eq!(state.hero.state(), HeroState::AtTank);
    }

    #[test]
    fn test_forced_release_pop() {
        let tuning = Tuning {
            release_pop_chance: 1.0,
            red_pop_rate: 0.0,
            ..Tuning::default()
        };
        let mut state = GameState::new(1);
        at_tank_inflating(&mut state, &tuning);
        state.balloon.fill = 95.0;
        state.drain_outputs();
        apply_intent(&mut state, Intent::ReleaseInflate, &tuning);

        assert!(state.balloon.awaiting_replacement);
        assert_eq!(state.hero.state(), HeroState::Scared);
        let outputs = state.drain_outputs();
        assert!(outputs.contains(&Output::Audio(AudioCommand::PlayOnce(Sound::Pop))));
        assert!(state.timers.is_pending(TimerAction::ReplaceBalloon {
            instance: state.balloon.instance
        }));
    }

    #[test]
    fn test_certain_red_hazard_pops_while_inflating() {
        let tuning = Tuning {
            red_pop_rate: 1.0,
            ..Tuning::default()
        };
        let mut state = GameState::new(1);
        at_tank_inflating(&mut state, &tuning);
        state.balloon.fill = 99.0;
        // First red tick has zero exposure, the next one pops
        run(&mut state, &tuning, 2.0 * DT);
        assert!(state.balloon.awaiting_replacement);
        assert!(!state.inflating);
    }

    #[test]
    fn test_red_exposure_keeps_running_while_not_filling() {
        let tuning = safe_tuning();
        let mut state = GameState::new(1);
        at_tank_inflating(&mut state, &tuning);
        state.balloon.fill = 95.0;
        tick(&mut state, &TickInput::default(), &tuning, DT);
        let entered = state.balloon.red_since_ms().unwrap();

        // Finger off the tank for three seconds, then back on
        apply_intent(&mut state, Intent::StopInflate, &tuning);
        run(&mut state, &tuning, 3000.0);
        apply_intent(&mut state, Intent::StartInflate, &tuning);
        tick(&mut state, &TickInput::default(), &tuning, DT);

        assert_eq!(state.balloon.red_since_ms(), Some(entered));
        assert!(state.time_ms - entered >= 3000.0);
    }

    #[test]
    fn test_gust_hidden_after_delay() {
        let tuning = safe_tuning();
        let mut state = GameState::new(1);
        state.lungs.receive(30.0);
        state.pending_flick = Some(state.layout.mouth + Vec2::new(200.0, 0.0));
        fire_gust(&mut state, &tuning);
        let (id, _) = state.last_gust.unwrap();
        assert_eq!(state.lungs.air, 0.0);

        run(&mut state, &tuning, GUST_VISIBLE_MS + DT);
        assert!(state.last_gust.is_none());
        assert!(
            state
                .drain_outputs()
                .contains(&Output::Render(RenderCommand::HideGust { id }))
        );
    }

    #[test]
    fn test_stale_epoch_timer_dropped() {
        let tuning = safe_tuning();
        let mut state = GameState::new(1);
        state.balloon.pop();
        let instance = state.balloon.instance;
        state.timers.schedule(
            state.time_ms,
            10.0,
            state.epoch + 7,
            TimerAction::ReplaceBalloon { instance },
        );
        run(&mut state, &tuning, 50.0);
        assert!(state.balloon.awaiting_replacement);
    }
}
