use anyhow::{anyhow, Result};
use drift_core::{check_pace, Autopilot, GameStore, PaceVerdict, Steering, World};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::util::seed_to_hex;

/// Fixed frame time for headless runs.
pub const FRAME_DT: f32 = 1.0 / 60.0;

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RunMetrics {
    pub seed: u32,
    pub seed_hex: String,
    pub max_frames: u32,
    pub frame_count: u32,
    pub final_score: u32,
    pub final_speed: f32,
    pub simulated_secs: f64,
    pub points_per_sec: f64,
    pub passed_obstacles: u32,
    pub speed_ups: u32,
    pub crashed: bool,
    pub final_rng_state: u32,
    /// Would the server accept this score if it was submitted the instant the
    /// run ended.
    pub submission_plausible: bool,
}

/// Plays one bot game on `seed` until a crash or `max_frames`.
pub fn run(autopilot: &Autopilot, seed: u32, max_frames: u32) -> Result<RunMetrics> {
    if max_frames == 0 {
        return Err(anyhow!("max_frames must be > 0"));
    }

    let mut world = World::with_autopilot(seed, autopilot.clone());
    let mut store = GameStore::new();
    store.start_bot_game();
    world.respawn_obstacles();

    let mut frame_count = 0u32;
    let mut passed_obstacles = 0u32;
    let mut speed_ups = 0u32;
    while frame_count < max_frames && store.is_playing() {
        let outcome = world.step(&mut store, Steering::default(), FRAME_DT);
        frame_count += 1;
        passed_obstacles += outcome.passed;
        speed_ups += outcome.speed_ups;
    }

    let simulated_secs = f64::from(frame_count) * f64::from(FRAME_DT);
    let final_score = store.score();
    let points_per_sec = if simulated_secs > 0.0 {
        f64::from(final_score) / simulated_secs
    } else {
        0.0
    };
    let verdict: PaceVerdict = check_pace(f64::from(final_score), simulated_secs);

    Ok(RunMetrics {
        seed,
        seed_hex: seed_to_hex(seed),
        max_frames,
        frame_count,
        final_score,
        final_speed: store.speed(),
        simulated_secs,
        points_per_sec,
        passed_obstacles,
        speed_ups,
        crashed: store.is_game_over(),
        final_rng_state: world.rng_state(),
        submission_plausible: verdict.is_accepted(),
    })
}

pub fn write_metrics(path: &Path, metrics: &RunMetrics) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, serde_json::to_vec_pretty(metrics)?)?;
    Ok(())
}
