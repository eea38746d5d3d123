//! Balloon Blowout - headless native driver
//!
//! Usage: `balloon-blowout [tuning.json] [script.json]`
//!
//! Runs a pointer script through the simulation at a fixed 60 Hz step and logs
//! every command the game emits. Without a script the built-in demo round is
//! played. Set `RUST_LOG=debug` to also see gesture and transition detail.

use balloon_blowout::consts::*;
use balloon_blowout::script::Script;
use balloon_blowout::sim::{GameState, Output, RenderCommand, tick};
use balloon_blowout::{Layout, Tuning};

/// Extra time simulated after the last scripted step
const TAIL_MS: f64 = 4000.0;

/// Points per gust outline edge in debug logs
const GUST_OUTLINE_POINTS: usize = 9;

/// Fixed-step session runner
struct Session {
    state: GameState,
    tuning: Tuning,
    script: Script,
    accumulator: f32,
}

impl Session {
    fn new(seed: u64, tuning: Tuning, script: Script) -> Self {
        Self {
            state: GameState::new(seed),
            tuning,
            script,
            accumulator: 0.0,
        }
    }

    /// Advance by a wall-clock frame, in as many fixed steps as fit
    fn update(&mut self, frame_ms: f32) {
        self.accumulator += frame_ms.min(100.0);

        let mut substeps = 0;
        while self.accumulator >= SIM_DT_MS && substeps < MAX_SUBSTEPS {
            let from = self.state.time_ms;
            let input = self.script.input_between(from, from + SIM_DT_MS as f64);
            tick(&mut self.state, &input, &self.tuning, SIM_DT_MS);
            self.accumulator -= SIM_DT_MS;
            substeps += 1;
        }

        for output in self.state.drain_outputs() {
            report(self.state.time_ms, &output);
        }
    }

    fn run(&mut self) {
        let end = self.script.end_ms() + TAIL_MS;
        while self.state.time_ms < end {
            self.update(SIM_DT_MS);
        }
    }
}

fn report(time_ms: f64, output: &Output) {
    match output {
        Output::Won => log::info!("[{time_ms:>8.0} ms] ALL CANDLES OUT!"),
        other => match serde_json::to_string(other) {
            Ok(json) => log::info!("[{time_ms:>8.0} ms] {json}"),
            Err(e) => log::warn!("[{time_ms:>8.0} ms] unserializable output {other:?}: {e}"),
        },
    }

    if let Output::Render(RenderCommand::ShowGust { id, cone }) = output {
        let outline: Vec<[f32; 2]> = cone
            .sample_arc(GUST_OUTLINE_POINTS)
            .into_iter()
            .map(|p| [p.x.round(), p.y.round()])
            .collect();
        log::debug!("Gust {id} outline: {outline:?}");
    }
}

fn load_tuning(path: Option<&str>) -> Tuning {
    let Some(path) = path else {
        log::info!("Using default tuning");
        return Tuning::default();
    };
    match std::fs::read_to_string(path) {
        Ok(json) => match Tuning::from_json(&json) {
            Ok(tuning) => {
                log::info!("Loaded tuning from {path}");
                tuning
            }
            Err(e) => {
                log::warn!("Bad tuning file {path}: {e}; using defaults");
                Tuning::default()
            }
        },
        Err(e) => {
            log::warn!("Cannot read {path}: {e}; using defaults");
            Tuning::default()
        }
    }
}

fn load_script(path: Option<&str>) -> Script {
    let demo = || Script::demo(&Layout::default());
    let Some(path) = path else {
        log::info!("No script given, playing the demo round");
        return demo();
    };
    match std::fs::read_to_string(path).map(|json| Script::from_json(&json)) {
        Ok(Ok(script)) => {
            log::info!("Loaded {} scripted steps from {path}", script.steps.len());
            script
        }
        Ok(Err(e)) => {
            log::warn!("Bad script {path}: {e}; playing the demo round");
            demo()
        }
        Err(e) => {
            log::warn!("Cannot read {path}: {e}; playing the demo round");
            demo()
        }
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    log::info!("Balloon Blowout (native) starting...");

    let args: Vec<String> = std::env::args().skip(1).collect();
    let tuning = load_tuning(args.first().map(String::as_str));
    match tuning.to_json() {
        Ok(json) => log::debug!("Effective tuning:\n{json}"),
        Err(e) => log::warn!("Cannot serialize tuning: {e}"),
    }
    let script = load_script(args.get(1).map(String::as_str));

    let seed = 0xB411_0007;
    log::info!("Session seed: {seed}");
    let mut session = Session::new(seed, tuning, script);
    session.run();

    let state = &session.state;
    log::info!(
        "Finished at {:.0} ms: {} candles lit, hero {:?}{}",
        state.time_ms,
        state.candles.remaining(),
        state.hero.state(),
        if state.is_won() { ", won" } else { "" }
    );
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // The simulation is driven by the host page on the web
}
