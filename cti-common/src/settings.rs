//! Environment-derived settings.
//!
//! Everything here has a working default; the environment only overrides.
//! Values are resolved through a lookup function so tests never have to
//! mutate the process environment.

use serde::{Deserialize, Serialize};
use tracing::warn;

/// What to do with the session log after the run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CleanupPolicy {
    /// Retain the file as a recovery/debug artifact (default).
    Keep,
    /// Delete the file once the post-session extraction pass has run.
    Remove,
}

impl Default for CleanupPolicy {
    fn default() -> Self {
        Self::Keep
    }
}

/// Resolved settings for one invocation.
#[derive(Debug, Clone)]
pub struct Settings {
    /// Gateway host override; when unset the host is derived from the
    /// workspace name.
    pub bastion_host: Option<String>,
    /// Build collaborator command, whitespace-split into argv.
    pub build_command: Vec<String>,
    /// Credential probe command, whitespace-split into argv.
    pub auth_probe: Vec<String>,
    /// Session log cleanup policy.
    pub cleanup: CleanupPolicy,
}

fn default_build_command() -> Vec<String> {
    vec!["cluster-image-build".to_string()]
}

fn default_auth_probe() -> Vec<String> {
    ["aws", "sts", "get-caller-identity"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            bastion_host: None,
            build_command: default_build_command(),
            auth_probe: default_auth_probe(),
            cleanup: CleanupPolicy::default(),
        }
    }
}

impl Settings {
    /// Load settings from the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load settings through an arbitrary lookup function.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut settings = Self::default();

        if let Some(host) = lookup("CTI_BASTION_HOST").filter(|v| !v.is_empty()) {
            settings.bastion_host = Some(host);
        }
        if let Some(argv) = lookup("CTI_BUILD_CMD").and_then(|v| split_command(&v)) {
            settings.build_command = argv;
        }
        if let Some(argv) = lookup("CTI_AUTH_PROBE").and_then(|v| split_command(&v)) {
            settings.auth_probe = argv;
        }
        if let Some(value) = lookup("CTI_CLEANUP_LOGS") {
            settings.cleanup = parse_cleanup(&value);
        }

        settings
    }

    /// Access gateway host for a workspace: the override when present,
    /// otherwise derived from the workspace name.
    pub fn gateway_host(&self, workspace: &str) -> String {
        match &self.bastion_host {
            Some(host) => host.clone(),
            None => format!("bastion.{workspace}.internal"),
        }
    }

    /// Internal coordinator host scoped to a workspace, reachable only from
    /// inside the gateway session.
    pub fn coordinator_host(workspace: &str) -> String {
        format!("coordinator.{workspace}.internal")
    }
}

fn split_command(value: &str) -> Option<Vec<String>> {
    let argv: Vec<String> = value.split_whitespace().map(|s| s.to_string()).collect();
    if argv.is_empty() { None } else { Some(argv) }
}

fn parse_cleanup(value: &str) -> CleanupPolicy {
    match value.to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => CleanupPolicy::Remove,
        "0" | "false" | "no" | "off" | "" => CleanupPolicy::Keep,
        other => {
            warn!("unrecognized CTI_CLEANUP_LOGS value '{other}', keeping session logs");
            CleanupPolicy::Keep
        }
    }
}
