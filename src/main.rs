//! Lumen shell driver.
//!
//! Runs the single-threaded frame loop: remote-control requests arrive as
//! JSON lines on stdin (marshalled onto the update thread through a
//! channel), the scene updates once per tick at the configured frame rate,
//! and responses plus scene notifications leave as JSON lines on stdout.

use std::io::BufRead;
use std::sync::mpsc::{self, TryRecvError};
use std::thread;
use std::time::{Duration, Instant};

use anyhow::Result;
use tracing::warn;

use lumen_api::{ShellNotification, decode_request, dispatch};
use lumen_config::ShellConfig;
use lumen_scene::surface::Resolution;
use lumen_scene::Scene;

fn main() -> Result<()> {
    let mut config_path: Option<String> = None;
    let mut max_frames: Option<u64> = None;
    let mut args = std::env::args().skip(1);
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--config" => config_path = args.next(),
            "--frames" => max_frames = args.next().and_then(|v| v.parse().ok()),
            other => eprintln!("ignoring unknown argument: {}", other),
        }
    }

    let config = match config_path {
        Some(path) => {
            let mut config = ShellConfig::load_from_file(&path)?;
            config.merge_with_env();
            config
        }
        None => ShellConfig::load(),
    };

    let filter = config.logging.filter.clone().unwrap_or_else(|| "info".to_string());
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::new(filter))
        .with_writer(std::io::stderr)
        .init();

    let mut scene = Scene::new(Resolution::new(config.display.width, config.display.height));
    let frame_budget = Duration::from_secs_f64(1.0 / f64::from(config.timing.frame_rate.max(1)));

    // Requests come in on a reader thread and are drained on the update
    // thread; the scene itself is never touched concurrently.
    let (tx, rx) = mpsc::channel::<String>();
    thread::spawn(move || {
        let stdin = std::io::stdin();
        for line in stdin.lock().lines() {
            let Ok(line) = line else { break };
            if tx.send(line).is_err() {
                break;
            }
        }
    });

    let mut frames: u64 = 0;
    loop {
        let frame_start = Instant::now();

        loop {
            match rx.try_recv() {
                Ok(line) => {
                    if line.trim().is_empty() {
                        continue;
                    }
                    match decode_request(&line) {
                        Ok(request) => {
                            let response = dispatch(&mut scene, request);
                            println!("{}", serde_json::to_string(&response)?);
                        }
                        Err(err) => warn!(%err, "dropping malformed request"),
                    }
                }
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => break,
            }
        }

        scene.update();
        for event in scene.drain_events() {
            let notification = ShellNotification::from(event);
            println!("{}", serde_json::to_string(&notification)?);
        }

        frames += 1;
        if let Some(max) = max_frames {
            if frames >= max {
                break;
            }
        }

        let elapsed = frame_start.elapsed();
        if elapsed < frame_budget {
            thread::sleep(frame_budget - elapsed);
        }
    }

    Ok(())
}
