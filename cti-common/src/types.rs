//! Common types used across CTI components.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Workspace targeted when the caller does not name one.
pub const DEFAULT_WORKSPACE: &str = "ct-0";

/// Sentinel tag meaning "deploy the last known-good image"; resolved by the
/// remote coordinator, never built locally.
pub const LATEST_TAG: &str = "latest";

/// Validated configuration for one invocation.
///
/// Invariant: exactly one of `tag` / `pull_request` is set by the time the
/// pipeline starts; the config resolver rejects everything else.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunConfig {
    /// Explicit image tag. When set, the build collaborator is never contacted.
    pub tag: Option<String>,
    /// Pull-request id used as the build key when no tag is given.
    pub pull_request: Option<String>,
    /// Named test environment instance to deploy into.
    pub workspace: String,
    /// `KEY=VALUE` entries forwarded to the remote command, order preserved.
    #[serde(default)]
    pub extra_env: Vec<String>,
    /// Where to write the extracted json report, if requested.
    pub report_path: Option<PathBuf>,
    /// Identity forwarded to the remote side; defaults to the invoking user.
    pub marker: String,
    /// Arguments passed verbatim to the remote command after its fixed flags.
    #[serde(default)]
    pub passthrough_args: Vec<String>,
}

impl RunConfig {
    /// Whether this run needs the external image build before deploying.
    pub fn needs_build(&self) -> bool {
        self.tag.is_none()
    }
}

/// A concrete deployable image identifier, immutable once resolved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedArtifact {
    pub tag: String,
}

impl ResolvedArtifact {
    pub fn new(tag: impl Into<String>) -> Self {
        Self { tag: tag.into() }
    }
}

/// Derive the tag a successful pull-request build is published under.
///
/// Pure function of (identity, pull-request) so a later run can reproduce the
/// tag and skip the build entirely.
pub fn derived_tag(marker: &str, pull_request: &str) -> String {
    format!("dev_{marker}_pull_{pull_request}")
}

/// Default marker identity: the invoking username.
pub fn default_marker() -> String {
    whoami::username().unwrap_or_else(|_| "unknown".to_string())
}
