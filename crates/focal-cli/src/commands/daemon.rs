/// Session lifecycle command handlers
use anyhow::{Context, Result};
use std::process::{Command, Stdio};

use focal_core::analytics::format_hms;
use focal_core::config::EngineConfig;
use focal_core::ipc::{IpcRequest, IpcResponse};
use focal_core::{Daemon, SessionMode, StatusSnapshot};

use super::helpers;

pub async fn handle_start(pomodoro: bool) -> Result<()> {
    if helpers::daemon_running().await {
        println!("A session is already running. Stop it first with `focal stop`.");
        return Ok(());
    }

    let exe = std::env::current_exe().context("Failed to locate the focal binary")?;
    let mut command = Command::new(exe);
    command.arg("daemon-internal-start");
    if pomodoro {
        command.arg("--pomodoro");
    }
    command
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()
        .context("Failed to spawn the tracking daemon")?;

    let mode = if pomodoro { "pomodoro" } else { "free-run" };
    println!("Started a {mode} session.");
    Ok(())
}

pub async fn run_daemon(pomodoro: bool) -> Result<()> {
    let mode = if pomodoro {
        SessionMode::Pomodoro
    } else {
        SessionMode::FreeRun
    };

    log::info!("focal daemon starting ({} mode)", mode.description());
    let mut daemon = Daemon::new(mode, EngineConfig::default()).await?;
    daemon.run_with_signals().await
}

pub async fn handle_stop() -> Result<()> {
    let client = helpers::client()?;
    match client.send_command(IpcRequest::Shutdown).await {
        Ok(_) => println!("Session stopped."),
        Err(_) => println!("No session is running."),
    }
    Ok(())
}

pub async fn handle_status() -> Result<()> {
    let client = helpers::client()?;
    let Ok(IpcResponse::Status(status)) = client.send_command(IpcRequest::Status).await else {
        println!("No session is running.");
        return Ok(());
    };

    print_status(&status);
    Ok(())
}

fn print_status(status: &StatusSnapshot) {
    if !status.running {
        println!("No session is running.");
        return;
    }

    let mode = status.mode.map_or("unknown", |mode| mode.description());
    match status.started_at {
        Some(started_at) => println!(
            "Session: running ({mode}), started {}",
            started_at.format("%Y-%m-%d %H:%M:%S UTC")
        ),
        None => println!("Session: running ({mode})"),
    }

    if let Some(phase) = &status.phase {
        println!(
            "Phase: {} ({} left, {} work phases completed)",
            phase.phase.description(),
            format_hms(phase.time_left_secs),
            phase.completed_work_phases
        );
    }

    if let Some(totals) = &status.totals {
        println!(
            "Productive: {}  Distracted: {}  Total: {}",
            format_hms(totals.productive_secs),
            format_hms(totals.distracted_secs),
            format_hms(totals.total_secs)
        );
    }

    match &status.current_app {
        Some(app) => println!("Current window: {app}"),
        None => println!("Current window: (none)"),
    }
}
