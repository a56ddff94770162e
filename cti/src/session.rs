//! Remote invocation and stream capture.
//!
//! Opens the two-hop session (gateway, then the workspace coordinator inside
//! it), forwards the run parameters, and duplicates the remote output to the
//! terminal and to a uniquely named session log. Blocks until the remote
//! side terminates or the user interrupts; the remote side owns termination,
//! there is no local timeout.

use cti_common::stream::{Tee, drain};
use cti_common::{CleanupPolicy, CtiError, ResolvedArtifact, RunConfig, Settings};
use std::borrow::Cow;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use tokio::process::Command;
use tracing::{info, warn};
use uuid::Uuid;

/// Fixed command the coordinator runs to deploy and exercise an image.
const REMOTE_COMMAND: &str = "cluster-test";

/// Conventional exit code for a signal-terminated session.
const INTERRUPTED_EXIT: i32 = 130;

/// Outcome of one remote session.
#[derive(Debug)]
pub struct SessionResult {
    /// Remote exit code, mirrored as our own.
    pub exit_code: i32,
    /// Whether the user interrupted the session.
    pub interrupted: bool,
    /// Durable copy of the combined remote output.
    pub log_path: PathBuf,
}

fn quote(s: &str) -> String {
    shell_escape::escape(Cow::from(s)).into_owned()
}

fn env_assignment(key: &str, value: &str) -> String {
    format!("{key}={}", quote(value))
}

/// Unique per-run session log path under the system temp dir.
pub fn session_log_path() -> PathBuf {
    std::env::temp_dir().join(format!("cti-{}.log", Uuid::new_v4()))
}

/// Assemble the command executed on the coordinator.
///
/// The marker rides along as two independent variables (`CT_MARKER`,
/// `CT_REMOTE_USER`), the caller's env entries keep their order, and the
/// passthrough arguments follow the fixed flags verbatim.
pub fn remote_command(config: &RunConfig, artifact: &ResolvedArtifact) -> String {
    let mut parts = Vec::new();
    parts.push(env_assignment("CT_MARKER", &config.marker));
    parts.push(env_assignment("CT_REMOTE_USER", &config.marker));
    for entry in &config.extra_env {
        // Validated as KEY=VALUE by the config resolver.
        let (key, value) = entry.split_once('=').unwrap_or((entry.as_str(), ""));
        parts.push(env_assignment(key, value));
    }
    parts.push(REMOTE_COMMAND.to_string());
    parts.push("--deploy".to_string());
    parts.push(quote(&config.workspace));
    parts.push("--image".to_string());
    parts.push(quote(&artifact.tag));
    for arg in &config.passthrough_args {
        parts.push(quote(arg));
    }
    parts.join(" ")
}

/// Run the remote session, streaming output to the terminal and to the
/// session log simultaneously.
pub async fn run(
    config: &RunConfig,
    artifact: &ResolvedArtifact,
    settings: &Settings,
) -> Result<SessionResult, CtiError> {
    let gateway = settings.gateway_host(&config.workspace);
    let coordinator = Settings::coordinator_host(&config.workspace);
    let inner = remote_command(config, artifact);
    let hop = format!("ssh {coordinator} {}", quote(&inner));

    let log_path = session_log_path();
    // Announced up front so a disconnected run can be inspected or resumed.
    println!("session output: {}", log_path.display());
    info!("opening session via {gateway} to {coordinator}");

    let session_error = |detail: String| CtiError::Session { detail };

    let mut child = Command::new("ssh")
        .args(["-o", "BatchMode=yes"])
        .arg(&gateway)
        .arg(&hop)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .map_err(|err| session_error(format!("failed to start ssh: {err}")))?;

    let child_stdout = child
        .stdout
        .take()
        .ok_or_else(|| session_error("ssh stdout not captured".to_string()))?;
    let child_stderr = child
        .stderr
        .take()
        .ok_or_else(|| session_error("ssh stderr not captured".to_string()))?;

    // One append handle per stream; both land in the same file.
    let open_log = || async {
        tokio::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&log_path)
            .await
    };
    let out_log = open_log()
        .await
        .map_err(|err| session_error(format!("cannot open session log: {err}")))?;
    let err_log = open_log()
        .await
        .map_err(|err| session_error(format!("cannot open session log: {err}")))?;

    let out_task = tokio::spawn(async move {
        let mut tee = Tee::new(tokio::io::stdout(), out_log);
        drain(child_stdout, &mut tee).await
    });
    let err_task = tokio::spawn(async move {
        let mut tee = Tee::new(tokio::io::stderr(), err_log);
        drain(child_stderr, &mut tee).await
    });

    let mut interrupted = false;
    let status = tokio::select! {
        status = child.wait() => {
            status.map_err(|err| session_error(format!("waiting for ssh: {err}")))?
        }
        _ = tokio::signal::ctrl_c() => {
            interrupted = true;
            warn!("interrupt received, terminating remote session");
            let _ = child.start_kill();
            child
                .wait()
                .await
                .map_err(|err| session_error(format!("waiting for ssh: {err}")))?
        }
    };

    // Let the drains finish flushing whatever the pipes still hold.
    for task in [out_task, err_task] {
        match task.await {
            Ok(Ok(_)) => {}
            Ok(Err(err)) => warn!("session stream capture ended early: {err}"),
            Err(err) => warn!("session stream task failed: {err}"),
        }
    }

    Ok(SessionResult {
        exit_code: status.code().unwrap_or(INTERRUPTED_EXIT),
        interrupted,
        log_path,
    })
}

/// Apply the configured session-log cleanup policy.
pub fn apply_cleanup(policy: CleanupPolicy, log_path: &Path) {
    match policy {
        CleanupPolicy::Keep => {
            info!("session log retained at {}", log_path.display());
        }
        CleanupPolicy::Remove => {
            if let Err(err) = std::fs::remove_file(log_path) {
                if err.kind() != std::io::ErrorKind::NotFound {
                    warn!("could not remove session log {}: {err}", log_path.display());
                }
            }
        }
    }
}
