use std::fs;
use std::io::Write;
use std::path::Path;
use std::time::{Instant, SystemTime, UNIX_EPOCH};

use anyhow::{Context, Result};
use drone_landing_env::render::RenderMode;
use drone_landing_env::{Action, DroneEnvironment, DroneEnvironmentConfig};
use rand::seq::SliceRandom;

const NUM_EPISODES: usize = 3;
const MAX_STEPS: usize = 200;
const SCREENSHOT_INTERVAL: usize = 10;

const ENV_ID: &str = "DroneLanding2D";

// Training-monitor layout: one `#`-prefixed JSON metadata line, then the CSV header.
fn write_monitor_header<W: Write>(out: &mut W, t_start: f64) -> std::io::Result<()> {
    let metadata = serde_json::json!({ "t_start": t_start, "env_id": ENV_ID });
    writeln!(out, "#{}", metadata)?;
    writeln!(out, "r,l,t")
}

// Random-action smoke test: dumps frames and a per-episode reward log.
fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    let mut config = match std::env::args().nth(1) {
        Some(path) => DroneEnvironmentConfig::from_yaml_file(&path)
            .with_context(|| format!("failed to load config from {path}"))?,
        None => DroneEnvironmentConfig::default(),
    };
    config.episode.render_mode = Some(RenderMode::RgbArray);

    let screenshots = Path::new("screenshots");
    let logs = Path::new("logs");
    fs::create_dir_all(screenshots)?;
    fs::create_dir_all(logs)?;

    let mut env = DroneEnvironment::new(config)?;
    let mut monitor = fs::File::create(logs.join("monitor.csv"))?;
    let t_start = SystemTime::now().duration_since(UNIX_EPOCH)?.as_secs_f64();
    write_monitor_header(&mut monitor, t_start)?;
    let started = Instant::now();

    let mut rng = rand::thread_rng();
    for episode in 1..=NUM_EPISODES {
        tracing::info!("=== episode {} ===", episode);
        env.reset(None, None);

        let mut total_reward = 0.0;
        let mut step = 0;
        let mut screenshot_count = 0;
        loop {
            let action = *Action::ALL.choose(&mut rng).unwrap_or(&Action::None);
            let result = env.step(action)?;
            total_reward += result.reward;
            step += 1;

            if step % SCREENSHOT_INTERVAL == 0 {
                if let Some(frame) = env.render()? {
                    let name = format!("ep_{:02}_step_{:04}.png", episode, screenshot_count);
                    frame.save_png(screenshots.join(name))?;
                    screenshot_count += 1;
                    tracing::info!("screenshot at step {}", step);
                }
            }

            if result.done() || step >= MAX_STEPS {
                break;
            }
        }

        tracing::info!(
            "episode {} finished after {} steps, total reward {:.2}",
            episode,
            step,
            total_reward
        );
        writeln!(
            monitor,
            "{},{},{:.6}",
            total_reward,
            step,
            started.elapsed().as_secs_f64()
        )?;
    }

    env.close();
    Ok(())
}
