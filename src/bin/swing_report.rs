use anyhow::{bail, Context, Result};
use std::fs;
use tracing_subscriber::EnvFilter;

use swing_analyst::config::Config;
use swing_analyst::pose::Landmark;
use swing_analyst::session::SwingSession;

const CONFIG_PATH: &str = "config.toml";

// Usage: swing_report <recording.json> [config.toml]
fn parse_args() -> Result<(String, String)> {
    let args: Vec<String> = std::env::args().collect();
    match args.len() {
        2 => Ok((args[1].clone(), CONFIG_PATH.to_string())),
        3 => Ok((args[1].clone(), args[2].clone())),
        _ => bail!("Usage: swing_report <recording.json> [config.toml]"),
    }
}

fn load_recording(path: &str) -> Result<Vec<Vec<Option<Landmark>>>> {
    let content =
        fs::read_to_string(path).with_context(|| format!("Failed to read recording: {}", path))?;
    let frames = serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse recording: {}", path))?;
    Ok(frames)
}

fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let (recording_path, config_path) = parse_args()?;
    let config = Config::load_or_default(&config_path);
    tracing::info!(
        fps = config.capture.fps,
        impact = config.metrics.impact.name(),
        "config loaded"
    );

    let frames = load_recording(&recording_path)?;
    tracing::info!("Recording: {} frames", frames.len());

    let mut session = SwingSession::from_config(&config);
    for frame in &frames {
        session.push_frame(frame);
    }
    tracing::info!(
        "Normalized {} frames, trail {} points",
        session.history().len(),
        session.path().len()
    );

    let Some(report) = session.finish() else {
        bail!("No swing metrics: recording too short or no usable body frame");
    };

    tracing::info!(
        shoulder = report.metrics.shoulder_rotation,
        hip = report.metrics.hip_rotation,
        x_factor = report.metrics.x_factor,
        top_of_swing = report.metrics.top_of_swing_frame,
        impact = report.metrics.impact_frame,
        "swing analysed"
    );

    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}
