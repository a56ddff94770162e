//! Error taxonomy for the invocation pipeline.
//!
//! Every variant that fires before the remote session carries a distinct exit
//! code, and the remediation hint lives in the type so the top-level reporter
//! can print it next to the error without re-deriving context.

use thiserror::Error;

/// Errors raised by the invocation pipeline before or around the remote
/// session. Remote task failures are not represented here; their exit code is
/// mirrored directly.
#[derive(Debug, Error)]
pub enum CtiError {
    /// Bad, missing, or conflicting arguments, or use of a reserved flag.
    #[error("{message}")]
    Usage { message: String },

    /// The access gateway could not be reached.
    #[error("cannot reach access gateway {host}: {detail}")]
    Connectivity { host: String, detail: String },

    /// The build credential probe failed.
    #[error("build credential check failed: {detail}")]
    Credential { detail: String },

    /// The external image build reported failure.
    #[error("image build failed for {selector}: {detail}")]
    Build { selector: String, detail: String },

    /// The remote session could not be started or its output not captured.
    #[error("remote session error: {detail}")]
    Session { detail: String },
}

impl CtiError {
    pub fn usage(message: impl Into<String>) -> Self {
        Self::Usage {
            message: message.into(),
        }
    }

    /// Process exit code for this error. All pipeline errors exit before any
    /// remote session is opened.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Usage { .. } => 2,
            Self::Connectivity { .. } => 3,
            Self::Credential { .. } => 4,
            Self::Build { .. } => 5,
            Self::Session { .. } => 1,
        }
    }

    /// Short actionable hint, distinct from the underlying tool's raw
    /// diagnostic (which is logged at debug level instead).
    pub fn remediation(&self) -> Option<&'static str> {
        match self {
            Self::Usage { .. } | Self::Session { .. } => None,
            Self::Connectivity { .. } => {
                Some("load your ssh key (ssh-add) and check the VPN connection")
            }
            Self::Credential { .. } => Some("renew your build credentials and retry"),
            Self::Build { .. } => {
                Some("inspect the build output above; the cluster was not touched")
            }
        }
    }
}
