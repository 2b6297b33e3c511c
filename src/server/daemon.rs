//! Daemon `start|stop|restart|status` (§6). Thin PID-file supervisor for
//! the vectorization worker's background process — the spec treats the
//! daemon supervisor itself as an external collaborator (§1), so this
//! only manages process lifetime, never the worker's business logic.

use super::cli::DaemonCommand;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::{error, info, warn};

fn pid_file(root: &Path) -> PathBuf {
    root.join(".codeloom-worker.pid")
}

pub fn run(action: &DaemonCommand, root: &Path) -> ExitCode {
    match action {
        DaemonCommand::Start => start(root),
        DaemonCommand::Stop => stop(root),
        DaemonCommand::Restart => {
            let _ = stop(root);
            start(root)
        }
        DaemonCommand::Status => status(root),
    }
}

fn start(root: &Path) -> ExitCode {
    let pid_path = pid_file(root);
    if let Some(pid) = read_pid(&pid_path) {
        if process_alive(pid) {
            warn!(pid, "worker already running");
            return ExitCode::FAILURE;
        }
    }

    match std::process::Command::new(std::env::current_exe().expect("current executable path must be readable"))
        .arg("--root")
        .arg(root)
        .arg("daemon-worker")
        .spawn()
    {
        Ok(child) => {
            if let Err(err) = std::fs::write(&pid_path, child.id().to_string()) {
                error!(%err, "failed to write pid file");
                return ExitCode::FAILURE;
            }
            info!(pid = child.id(), "worker started");
            ExitCode::SUCCESS
        }
        Err(err) => {
            error!(%err, "failed to spawn worker process");
            ExitCode::FAILURE
        }
    }
}

fn stop(root: &Path) -> ExitCode {
    let pid_path = pid_file(root);
    let Some(pid) = read_pid(&pid_path) else {
        warn!("no pid file; worker is not running");
        return ExitCode::FAILURE;
    };
    let status = std::process::Command::new("kill").arg("-TERM").arg(pid.to_string()).status();
    let _ = std::fs::remove_file(&pid_path);
    match status {
        Ok(status) if status.success() => {
            info!(pid, "worker stopped");
            ExitCode::SUCCESS
        }
        _ => {
            warn!(pid, "failed to signal worker process (it may have already exited)");
            ExitCode::FAILURE
        }
    }
}

fn status(root: &Path) -> ExitCode {
    let pid_path = pid_file(root);
    match read_pid(&pid_path) {
        Some(pid) if process_alive(pid) => {
            println!("{{\"running\": true, \"pid\": {pid}}}");
            ExitCode::SUCCESS
        }
        Some(pid) => {
            println!("{{\"running\": false, \"stale_pid\": {pid}}}");
            ExitCode::FAILURE
        }
        None => {
            println!("{{\"running\": false}}");
            ExitCode::FAILURE
        }
    }
}

fn read_pid(pid_path: &Path) -> Option<u32> {
    std::fs::read_to_string(pid_path).ok()?.trim().parse().ok()
}

fn process_alive(pid: u32) -> bool {
    std::process::Command::new("kill").arg("-0").arg(pid.to_string()).status().map(|status| status.success()).unwrap_or(false)
}
