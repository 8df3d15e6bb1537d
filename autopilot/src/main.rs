use anyhow::{anyhow, Result};
use clap::{Parser, Subcommand};
use drift_autopilot::benchmark::{run_benchmark, BenchmarkConfig};
use drift_autopilot::runner::{run, write_metrics};
use drift_autopilot::util::{load_autopilot_config, parse_seed, parse_seed_csv, seed_range};
use drift_core::{Autopilot, AutopilotConfig};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "drift-autopilot")]
#[command(about = "Headless Quantum Drift autopilot runs and seed benchmarks")]
struct Cli {
    /// JSON autopilot config; omitted fields keep their defaults
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Play one bot game and print its run record
    Run {
        #[arg(long)]
        seed: String,
        /// 5 min at 60fps
        #[arg(long, default_value_t = 18_000)]
        max_frames: u32,
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Play many seeds in parallel and summarize
    Benchmark {
        #[arg(long, conflicts_with = "seed_start")]
        seeds: Option<String>,
        #[arg(long)]
        seed_start: Option<String>,
        #[arg(long, default_value_t = 12)]
        seed_count: u32,
        #[arg(long, default_value_t = 18_000)]
        max_frames: u32,
        #[arg(long)]
        out_dir: Option<PathBuf>,
        #[arg(long)]
        jobs: Option<usize>,
    },
    /// Print the default autopilot config as JSON
    DefaultConfig,
}

fn main() -> Result<()> {
    let Cli { config, command } = Cli::parse();
    let autopilot_config = match &config {
        Some(path) => load_autopilot_config(path)?,
        None => AutopilotConfig::default(),
    };

    match command {
        Commands::Run {
            seed,
            max_frames,
            output,
        } => {
            let seed = parse_seed(&seed)?;
            let autopilot = Autopilot::new(autopilot_config)
                .map_err(|err| anyhow!("invalid autopilot config: {err}"))?;
            let metrics = run(&autopilot, seed, max_frames)?;

            println!("seed={}", metrics.seed_hex);
            println!("frames={}", metrics.frame_count);
            println!("score={}", metrics.final_score);
            println!("speed={:.3}", metrics.final_speed);
            println!("secs={:.2}", metrics.simulated_secs);
            println!("points_per_sec={:.2}", metrics.points_per_sec);
            println!("crashed={}", metrics.crashed);
            println!("plausible={}", metrics.submission_plausible);
            if let Some(path) = output {
                write_metrics(&path, &metrics)?;
                println!("output={}", path.display());
            }
        }
        Commands::Benchmark {
            seeds,
            seed_start,
            seed_count,
            max_frames,
            out_dir,
            jobs,
        } => {
            let seeds = match (seeds, seed_start) {
                (Some(csv), _) => parse_seed_csv(&csv)?,
                (None, Some(start)) => seed_range(parse_seed(&start)?, seed_count)?,
                (None, None) => seed_range(1, seed_count)?,
            };

            let report = run_benchmark(BenchmarkConfig {
                autopilot: autopilot_config,
                seeds,
                max_frames,
                out_dir: out_dir.clone(),
                jobs,
            })?;

            println!("seeds={}", report.seed_count);
            println!("avg_score={:.1}", report.avg_score);
            println!("max_score={}", report.max_score);
            println!("avg_frames={:.1}", report.avg_frames);
            println!("avg_points_per_sec={:.2}", report.avg_points_per_sec);
            println!("survival_rate={:.3}", report.survival_rate);
            println!("implausible_runs={}", report.implausible_runs);
            if let Some(best) = report.runs.first() {
                println!("best_seed={} best_score={}", best.seed_hex, best.final_score);
            }
            if let Some(dir) = out_dir {
                println!("summary={}", dir.join("summary.json").display());
            }
        }
        Commands::DefaultConfig => {
            println!(
                "{}",
                serde_json::to_string_pretty(&AutopilotConfig::default())?
            );
        }
    }

    Ok(())
}
