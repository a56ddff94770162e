//! Artifact resolution: explicit tag pass-through or external image build.

use cti_common::{CtiError, ResolvedArtifact, RunConfig, Settings, derived_tag};
use tokio::process::Command;
use tracing::{debug, info};

/// Resolve the run selector into a concrete image tag.
///
/// An explicit tag passes through untouched and the build collaborator is
/// never contacted. Otherwise the build command is invoked with the
/// pull-request selector as its sole build key, and the tag is derived from
/// (marker, pull-request) so a later run can replay it without rebuilding.
pub async fn resolve(
    config: &RunConfig,
    settings: &Settings,
) -> Result<ResolvedArtifact, CtiError> {
    if let Some(tag) = &config.tag {
        debug!("explicit tag {tag}, skipping image build");
        return Ok(ResolvedArtifact::new(tag.clone()));
    }

    let Some(pr) = config.pull_request.as_deref() else {
        // Unreachable past the config resolver; kept as a usage error rather
        // than a panic so a future caller cannot turn it into one.
        return Err(CtiError::usage("one of --tag or --pr is required"));
    };
    let selector = format!("pull/{pr}");

    let Some((program, args)) = settings.build_command.split_first() else {
        return Err(CtiError::Build {
            selector,
            detail: "build command is empty".to_string(),
        });
    };

    info!("building image for {selector}, this may take a while");
    // The build inherits our stdio so its progress stays visible.
    let status = Command::new(program)
        .args(args)
        .arg(&selector)
        .status()
        .await
        .map_err(|err| CtiError::Build {
            selector: selector.clone(),
            detail: format!("failed to run {program}: {err}"),
        })?;

    if !status.success() {
        return Err(CtiError::Build {
            selector,
            detail: status.to_string(),
        });
    }

    Ok(ResolvedArtifact::new(derived_tag(&config.marker, pr)))
}
