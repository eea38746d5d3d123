//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Time only advances through `tick`
//! - Seeded RNG only
//! - Stable iteration order (candles by id, timers by due time)
//! - No rendering or audio dependencies; those receive `Output` commands

pub mod balloon;
pub mod candles;
pub mod character;
pub mod gesture;
pub mod gust;
pub mod lungs;
pub mod output;
pub mod state;
pub mod tick;
pub mod timers;

pub use balloon::{Balloon, Holder, Orientation, ReleaseOutcome, Zone, continuous_pop_check};
pub use candles::{Candle, CandleField};
pub use character::{AirLevels, Character, Clip, Gesture, HeroState, Signal, Trigger};
pub use gesture::{GestureContext, GestureInterpreter, Intent, PointerEvent, is_valid_flick};
pub use gust::{GustCone, flick_ratio, reach_for_spread, spread_for_distance};
pub use lungs::Lungs;
pub use output::{AudioCommand, Meter, Output, RenderCommand, Sound};
pub use state::GameState;
pub use tick::{TickInput, apply_intent, handle_pointer, pop_balloon, tick};
pub use timers::{Timer, TimerAction, Timers};
