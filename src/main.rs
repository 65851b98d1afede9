//! Sightline demo — runs the gaze engine against a synthetic reading
//! session and logs focus updates, gestures, and scroll commands.

use std::sync::Arc;

use clap::Parser;
use tracing::info;

use sightline::clock::TestClock;
use sightline::config::EngineConfig;
use sightline::engine::{GazeEngine, PlanarProjector};
use sightline::sample::{SampleProvider, SyntheticReadingProvider};
use sightline::scroll::Viewport;

#[derive(Parser, Debug)]
#[command(name = "sightline", about = "Gaze-driven reading engine demo")]
struct Cli {
    /// Session length in seconds
    #[arg(long, default_value = "10.0")]
    duration: f64,

    /// Tracking sample rate (Hz)
    #[arg(long, default_value = "60.0")]
    rate: f64,

    /// Screen resolution (WxH)
    #[arg(long, default_value = "375x812")]
    screen: String,

    /// Content height in screen heights
    #[arg(long, default_value = "4.0")]
    pages: f32,
}

fn parse_screen(s: &str) -> Option<(f32, f32)> {
    let (w, h) = s.split_once('x')?;
    Some((w.parse().ok()?, h.parse().ok()?))
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "sightline=info".into()),
        )
        .init();

    let (width, height) = parse_screen(&cli.screen)
        .ok_or_else(|| anyhow::anyhow!("invalid screen resolution '{}'", cli.screen))?;

    info!("sightline v{} starting", env!("CARGO_PKG_VERSION"));
    info!(
        "screen {}x{}, {:.0}s session at {:.0}Hz",
        width, height, cli.duration, cli.rate
    );

    let config = EngineConfig::default();
    let projector = PlanarProjector::new(width, height, 0.2, 0.2);
    // The session runs faster than real time, so cooldowns follow the
    // simulated clock, advanced one sample period per frame.
    let clock = Arc::new(TestClock::new());
    let mut engine = GazeEngine::new(config, Box::new(projector), clock.clone());

    let mut provider = SyntheticReadingProvider::new(cli.duration, cli.rate);
    let mut offset_y = 0.0f32;
    let content_height = height * cli.pages;

    // Simulated schedule: one scroll poll every 100ms of sample time.
    let poll_every = (cli.rate / 10.0).max(1.0) as u64;
    let mut frame: u64 = 0;
    let mut scrolls = 0u32;
    let mut gestures = 0u32;

    let frame_period = std::time::Duration::from_secs_f64(1.0 / cli.rate);

    while let Some(sample) = provider.next_sample() {
        clock.advance(frame_period);
        let out = engine.on_sample(&sample);
        if out.gesture_detected() {
            gestures += 1;
            info!("double blink at t={:.2}s", sample.timestamp_s);
        }

        frame += 1;
        if frame % poll_every == 0 {
            let viewport = Viewport::new(width, height, offset_y, content_height);
            if let Some(cmd) = engine.poll(&viewport) {
                // The demo host applies the scroll instantly.
                offset_y = cmd.target_offset;
                scrolls += 1;
                info!(
                    "scroll {} -> offset {:.0}",
                    cmd.direction.as_str(),
                    cmd.target_offset
                );
            }
        }
    }

    info!(
        "session complete: {} frames, {} scrolls, {} gestures, final offset {:.0}",
        frame, scrolls, gestures, offset_y
    );
    Ok(())
}
