//! Fail-fast preflight checks.
//!
//! Both checks are read-only and run before anything expensive or mutating:
//! an unreachable gateway makes a build pointless, and a dead credential
//! makes the build fail late instead of early.

use cti_common::CtiError;
use std::process::Stdio;
use tokio::process::Command;
use tracing::debug;

const CONNECT_TIMEOUT_SECS: u32 = 10;

/// Verify the access gateway accepts a session.
pub async fn check_gateway(host: &str) -> Result<(), CtiError> {
    debug!("probing access gateway {host}");
    let result = Command::new("ssh")
        .args(["-o", "BatchMode=yes"])
        .arg("-o")
        .arg(format!("ConnectTimeout={CONNECT_TIMEOUT_SECS}"))
        .arg(host)
        .arg("true")
        .stdin(Stdio::null())
        .output()
        .await;

    match result {
        Ok(output) if output.status.success() => Ok(()),
        Ok(output) => {
            // The raw ssh diagnostic is rarely actionable; keep it at debug.
            debug!(
                "gateway probe diagnostics: {}",
                String::from_utf8_lossy(&output.stderr).trim()
            );
            Err(CtiError::Connectivity {
                host: host.to_string(),
                detail: output.status.to_string(),
            })
        }
        Err(err) => Err(CtiError::Connectivity {
            host: host.to_string(),
            detail: err.to_string(),
        }),
    }
}

/// Verify build credentials by running the configured probe command.
pub async fn check_build_credentials(probe: &[String]) -> Result<(), CtiError> {
    let Some((program, args)) = probe.split_first() else {
        return Err(CtiError::Credential {
            detail: "credential probe command is empty".to_string(),
        });
    };
    debug!("probing build credentials with {program}");
    let result = Command::new(program)
        .args(args)
        .stdin(Stdio::null())
        .output()
        .await;

    match result {
        Ok(output) if output.status.success() => Ok(()),
        Ok(output) => {
            debug!(
                "credential probe diagnostics: {}",
                String::from_utf8_lossy(&output.stderr).trim()
            );
            Err(CtiError::Credential {
                detail: format!("{program} reported {}", output.status),
            })
        }
        Err(err) => Err(CtiError::Credential {
            detail: format!("failed to run {program}: {err}"),
        }),
    }
}
