use crate::runner::{self, RunMetrics};
use anyhow::{anyhow, Context, Result};
use drift_core::{Autopilot, AutopilotConfig};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct BenchmarkReport {
    pub generated_unix_s: u64,
    pub autopilot: AutopilotConfig,
    pub max_frames: u32,
    pub seed_count: usize,
    pub avg_score: f64,
    pub max_score: u32,
    pub avg_frames: f64,
    pub avg_points_per_sec: f64,
    /// Share of runs that reached `max_frames` without crashing.
    pub survival_rate: f64,
    pub implausible_runs: usize,
    /// Best score first.
    pub runs: Vec<RunMetrics>,
}

pub struct BenchmarkConfig {
    pub autopilot: AutopilotConfig,
    pub seeds: Vec<u32>,
    pub max_frames: u32,
    /// `summary.json` is written here when set.
    pub out_dir: Option<PathBuf>,
    pub jobs: Option<usize>,
}

pub fn run_benchmark(config: BenchmarkConfig) -> Result<BenchmarkReport> {
    if config.seeds.is_empty() {
        return Err(anyhow!("benchmark requires at least one seed"));
    }

    let autopilot = Autopilot::new(config.autopilot.clone())
        .map_err(|err| anyhow!("invalid autopilot config: {err}"))?;

    let run_one = |seed: &u32| -> Result<RunMetrics> {
        runner::run(&autopilot, *seed, config.max_frames)
            .with_context(|| format!("benchmark run failed for seed={seed:#x}"))
    };

    let run_results: Vec<Result<RunMetrics>> = if let Some(jobs) = config.jobs {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(jobs)
            .build()
            .context("failed to build rayon threadpool")?;
        pool.install(|| config.seeds.par_iter().map(run_one).collect())
    } else {
        config.seeds.par_iter().map(run_one).collect()
    };

    let mut runs = run_results.into_iter().collect::<Result<Vec<_>>>()?;

    let total_runs = runs.len() as f64;
    let sum_score: u64 = runs.iter().map(|r| u64::from(r.final_score)).sum();
    let max_score = runs.iter().map(|r| r.final_score).max().unwrap_or(0);
    let sum_frames: u64 = runs.iter().map(|r| u64::from(r.frame_count)).sum();
    let sum_rate: f64 = runs.iter().map(|r| r.points_per_sec).sum();
    let survived = runs
        .iter()
        .filter(|r| !r.crashed && r.frame_count >= config.max_frames)
        .count();
    let implausible_runs = runs.iter().filter(|r| !r.submission_plausible).count();

    runs.sort_by(|a, b| b.final_score.cmp(&a.final_score).then(a.seed.cmp(&b.seed)));

    let report = BenchmarkReport {
        generated_unix_s: SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_secs(),
        autopilot: config.autopilot,
        max_frames: config.max_frames,
        seed_count: runs.len(),
        avg_score: sum_score as f64 / total_runs,
        max_score,
        avg_frames: sum_frames as f64 / total_runs,
        avg_points_per_sec: sum_rate / total_runs,
        survival_rate: survived as f64 / total_runs,
        implausible_runs,
        runs,
    };

    if let Some(out_dir) = &config.out_dir {
        fs::create_dir_all(out_dir)
            .with_context(|| format!("failed creating {}", out_dir.display()))?;
        let report_path = out_dir.join("summary.json");
        fs::write(
            &report_path,
            serde_json::to_vec_pretty(&report).context("failed to serialize summary")?,
        )?;
    }

    Ok(report)
}
