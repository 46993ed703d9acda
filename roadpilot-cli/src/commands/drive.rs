//! Drive command - replay a recorded location stream through a live
//! telemetry session.
//!
//! The replay file holds one event per line:
//!
//! ```text
//! {"latitude":41.01,"longitude":28.97,"speed_mps":13.9,"timestamp_millis":1700000000000}
//! [{"latitude":...}, {"latitude":...}]      # a burst of samples
//! "permission_denied"                       # location access revoked
//! ```
//!
//! Blank lines and lines starting with `#` are skipped.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use console::style;
use roadpilot::alert::TerminalBellSink;
use roadpilot::telemetry::{
    FixStatus, LocationEvent, LocationSample, TelemetryDisplay, TelemetryOutputs, TelemetrySession,
};
use serde::Deserialize;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use super::common::overpass_client;
use crate::error::CliError;
use crate::runner::CliRunner;

/// Longest pause honoured between two samples in realtime mode.
const MAX_REPLAY_GAP: Duration = Duration::from_secs(10);

pub struct DriveArgs {
    pub replay: PathBuf,
    pub realtime: bool,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ReplayLine {
    Sample(LocationSample),
    Burst(Vec<LocationSample>),
    Marker(String),
}

/// Parse one replay line. Returns `Ok(None)` for blank and comment lines.
fn parse_replay_line(line: &str) -> Result<Option<LocationEvent>, String> {
    let line = line.trim();
    if line.is_empty() || line.starts_with('#') {
        return Ok(None);
    }

    match serde_json::from_str::<ReplayLine>(line).map_err(|e| e.to_string())? {
        ReplayLine::Sample(sample) => Ok(Some(LocationEvent::Samples(vec![sample]))),
        ReplayLine::Burst(samples) if samples.is_empty() => Ok(None),
        ReplayLine::Burst(samples) => Ok(Some(LocationEvent::Samples(samples))),
        ReplayLine::Marker(marker) if marker == "permission_denied" => {
            Ok(Some(LocationEvent::PermissionDenied))
        }
        ReplayLine::Marker(marker) => Err(format!("unknown marker '{}'", marker)),
    }
}

fn last_timestamp(event: &LocationEvent) -> Option<i64> {
    match event {
        LocationEvent::Samples(samples) => samples.last().map(|s| s.timestamp_millis),
        LocationEvent::PermissionDenied => None,
    }
}

/// Run the drive command.
pub fn run(args: DriveArgs) -> Result<(), CliError> {
    let runner = CliRunner::new()?;
    runner.log_startup("drive");
    let config = runner.config();

    let http = runner.http_client(config.speed_limit.timeout_secs)?;
    let provider = overpass_client(config, http);
    let classifier = config.hazard_classifier()?;

    println!("RoadPilot Drive v{}", roadpilot::VERSION);
    println!("==================");
    println!();
    println!("Replay:      {}", args.replay.display());
    println!("Mode:        {}", if args.realtime { "realtime" } else { "as fast as possible" });
    println!("Limits from: {}", config.speed_limit.endpoint);
    println!("Hazards:     {}", classifier.name());
    println!();
    println!("Press Ctrl+C to stop");
    println!();

    let shutdown = CancellationToken::new();
    let shutdown_handler = shutdown.clone();
    ctrlc::set_handler(move || {
        println!();
        println!("Received shutdown signal, stopping...");
        shutdown_handler.cancel();
    })
    .map_err(|e| CliError::Config(format!("Failed to set signal handler: {}", e)))?;

    let speed_config = config.speed_limit_config();
    let replay = args.replay.clone();
    let realtime = args.realtime;

    let stats = runner.block_on(async move {
        let file = tokio::fs::File::open(&replay)
            .await
            .map_err(|e| CliError::Replay(format!("{}: {}", replay.display(), e)))?;

        let (session, outputs) = TelemetrySession::with_provider(
            provider,
            speed_config,
            classifier,
            Arc::new(TerminalBellSink),
        );
        let (tx, rx) = mpsc::channel(64);

        let session_handle = tokio::spawn(session.run(rx, shutdown.clone()));
        let printer_handle = tokio::spawn(print_updates(outputs));
        let feed = feed_replay(BufReader::new(file), tx, realtime, shutdown.clone()).await;

        let stats = session_handle
            .await
            .map_err(|e| CliError::Runtime(e.to_string()))?;
        let _ = printer_handle.await;
        feed.map(|_| stats)
    })?;

    println!();
    println!("Session Summary");
    println!("───────────────");
    println!("  Samples:        {}", stats.samples);
    println!("  Limit queries:  {}", stats.queries_issued);
    println!("  Limit updates:  {}", stats.limit_updates);
    println!("  Alert tones:    {}", stats.tones_played);
    Ok(())
}

/// Read events from the replay and send them to the session. Dropping the
/// sender on return closes the session's input.
async fn feed_replay<R>(
    reader: BufReader<R>,
    tx: mpsc::Sender<LocationEvent>,
    realtime: bool,
    shutdown: CancellationToken,
) -> Result<(), CliError>
where
    R: tokio::io::AsyncRead + Unpin,
{
    let mut lines = reader.lines();
    let mut previous_ts: Option<i64> = None;
    let mut line_no = 0usize;

    loop {
        let line = tokio::select! {
            _ = shutdown.cancelled() => return Ok(()),
            line = lines.next_line() => line.map_err(|e| CliError::Replay(e.to_string()))?,
        };
        let Some(line) = line else {
            debug!(lines = line_no, "Replay finished");
            return Ok(());
        };
        line_no += 1;

        let event = match parse_replay_line(&line) {
            Ok(Some(event)) => event,
            Ok(None) => continue,
            Err(e) => {
                warn!(line = line_no, error = %e, "Skipping unreadable replay line");
                continue;
            }
        };

        if realtime {
            if let (Some(prev), Some(ts)) = (previous_ts, last_timestamp(&event)) {
                let gap = Duration::from_millis(ts.saturating_sub(prev).max(0) as u64);
                tokio::select! {
                    _ = shutdown.cancelled() => return Ok(()),
                    _ = tokio::time::sleep(gap.min(MAX_REPLAY_GAP)) => {}
                }
            }
        }
        if let Some(ts) = last_timestamp(&event) {
            previous_ts = Some(ts);
        }

        if tx.send(event).await.is_err() {
            return Ok(());
        }
    }
}

async fn print_updates(mut outputs: TelemetryOutputs) {
    loop {
        tokio::select! {
            Some(notice) = outputs.notices.recv() => {
                println!("{}", style(notice).yellow().bold());
            }
            changed = outputs.display.changed() => {
                if changed.is_err() {
                    break;
                }
                let display = outputs.display.borrow_and_update().clone();
                println!("{}", format_display(&display));
            }
        }
    }
}

fn format_display(display: &TelemetryDisplay) -> String {
    if display.fix == FixStatus::WaitingForFix {
        return style("Waiting for position fix...").dim().to_string();
    }

    let speed = format!("{:>3} km/h", display.speed_kph);
    let speed = if display.over_limit {
        style(speed).red().bold().to_string()
    } else {
        style(speed).bold().to_string()
    };

    let limit = if display.limit_known {
        format!("limit {}", display.limit_kph)
    } else {
        format!("limit {} (default)", display.limit_kph)
    };

    let mut line = format!("{}  {}", speed, limit);
    if let Some(hazard) = &display.hazard {
        line.push_str(&format!("  {}", style(format!("⚠ {}", hazard)).yellow()));
    }
    if let Some(camera) = &display.camera {
        line.push_str(&format!(
            "  [camera {:.5},{:.5} z{}]",
            camera.target.latitude, camera.target.longitude, camera.zoom
        ));
    }
    line
}
