//! Shared types and utilities for the Cluster Test Invoker.

pub mod errors;
pub mod report;
pub mod settings;
pub mod stream;
pub mod types;

pub use errors::CtiError;
pub use report::{REPORT_BEGIN, REPORT_END, extract_report, write_report};
pub use settings::{CleanupPolicy, Settings};
pub use stream::Tee;
pub use types::{
    DEFAULT_WORKSPACE, LATEST_TAG, ResolvedArtifact, RunConfig, default_marker, derived_tag,
};
