//! Command-line surface and run configuration validation.

use clap::{CommandFactory, Parser};
use cti_common::{CtiError, DEFAULT_WORKSPACE, LATEST_TAG, RunConfig, default_marker};
use std::path::PathBuf;

/// Flags owned internally by the remote invoker. Allowing a caller to set
/// them would change the deployment target without going through artifact
/// resolution, so they are rejected in one table check before anything else.
const RESERVED_FLAGS: [(&str, &str); 3] = [
    ("-c/--container", "the container selector is set by the remote invoker"),
    ("-i/--image", "the image reference comes from artifact resolution"),
    ("-d/--deploy", "the deploy target comes from the workspace"),
];

/// Run a cluster validation against a chosen build.
///
/// The first unrecognized token ends option parsing; everything after it is
/// forwarded verbatim to the remote cluster-test command.
#[derive(Parser, Debug)]
#[command(name = "cti", version, about)]
pub struct Cli {
    /// Extract the json report from the run output to this path.
    #[arg(short = 'R', long = "report", value_name = "PATH")]
    pub report: Option<PathBuf>,

    /// Pull-request number to build and deploy.
    #[arg(short = 'p', long = "pr", value_name = "NUMBER")]
    pub pr: Option<String>,

    /// Deploy the latest known-good image instead of building one.
    #[arg(short = 'M', long = "latest")]
    pub latest: bool,

    /// Deploy an existing image tag, skipping the build.
    #[arg(short = 'T', long = "tag", value_name = "TAG")]
    pub tag: Option<String>,

    /// Workspace to run against.
    #[arg(short = 'W', long = "workspace", value_name = "NAME", default_value = DEFAULT_WORKSPACE)]
    pub workspace: String,

    /// Extra KEY=VALUE environment entry for the remote command; repeatable,
    /// forwarded in the order given.
    #[arg(short = 'E', long = "env", value_name = "KEY=VALUE")]
    pub env: Vec<String>,

    /// Marker identity forwarded to the remote side; defaults to the
    /// invoking user.
    #[arg(short = 'm', long = "marker", value_name = "MARKER")]
    pub marker: Option<String>,

    // Reserved; declared so their use is caught here instead of leaking into
    // the passthrough arguments.
    #[arg(short = 'c', long = "container", hide = true, value_name = "NAME")]
    pub container: Option<String>,
    #[arg(short = 'i', long = "image", hide = true, value_name = "IMAGE")]
    pub image: Option<String>,
    #[arg(short = 'd', long = "deploy", hide = true, value_name = "TARGET")]
    pub deploy: Option<String>,

    /// Arguments forwarded verbatim to the remote command.
    #[arg(trailing_var_arg = true, allow_hyphen_values = true, value_name = "ARGS")]
    pub passthrough: Vec<String>,
}

impl Cli {
    /// Validate the parsed arguments into a `RunConfig`.
    ///
    /// Rejection order: reserved flags first, then conflicting selectors,
    /// then malformed env entries, then the missing-selector case (the only
    /// path that prints the full usage text).
    pub fn into_run_config(self) -> Result<RunConfig, CtiError> {
        let present = [
            self.container.is_some(),
            self.image.is_some(),
            self.deploy.is_some(),
        ];
        for ((flag, reason), set) in RESERVED_FLAGS.iter().zip(present) {
            if set {
                return Err(CtiError::usage(format!("{flag} is reserved: {reason}")));
            }
        }

        let tag = match (self.tag, self.latest) {
            (Some(_), true) => {
                return Err(CtiError::usage("--tag and --latest are mutually exclusive"));
            }
            (Some(tag), false) => Some(tag),
            (None, true) => Some(LATEST_TAG.to_string()),
            (None, false) => None,
        };
        if tag.is_some() && self.pr.is_some() {
            return Err(CtiError::usage(
                "--pr conflicts with --tag/--latest: the tag already names the image",
            ));
        }

        for entry in &self.env {
            match entry.split_once('=') {
                Some((key, _)) if !key.is_empty() => {}
                _ => {
                    return Err(CtiError::usage(format!(
                        "malformed --env entry '{entry}': expected KEY=VALUE"
                    )));
                }
            }
        }

        if tag.is_none() && self.pr.is_none() {
            let mut cmd = Cli::command();
            return Err(CtiError::usage(format!(
                "one of --tag, --latest, or --pr is required\n\n{}",
                cmd.render_long_help()
            )));
        }

        Ok(RunConfig {
            tag,
            pull_request: self.pr,
            workspace: self.workspace,
            extra_env: self.env,
            report_path: self.report,
            marker: self.marker.unwrap_or_else(default_marker),
            passthrough_args: self.passthrough,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Result<RunConfig, CtiError> {
        Cli::try_parse_from(std::iter::once("cti").chain(args.iter().copied()))
            .expect("clap parse")
            .into_run_config()
    }

    #[test]
    fn test_pr_run() {
        let config = parse(&["--pr", "42", "--marker", "alice"]).unwrap();
        assert_eq!(config.pull_request.as_deref(), Some("42"));
        assert_eq!(config.tag, None);
        assert_eq!(config.workspace, DEFAULT_WORKSPACE);
        assert_eq!(config.marker, "alice");
        assert!(config.needs_build());
    }

    #[test]
    fn test_explicit_tag_skips_build() {
        let config = parse(&["--tag", "dev_alice_pull_42"]).unwrap();
        assert_eq!(config.tag.as_deref(), Some("dev_alice_pull_42"));
        assert!(!config.needs_build());
    }

    #[test]
    fn test_latest_sets_sentinel_tag() {
        let config = parse(&["--latest"]).unwrap();
        assert_eq!(config.tag.as_deref(), Some(LATEST_TAG));
    }

    #[test]
    fn test_missing_selector_prints_usage() {
        let err = parse(&[]).unwrap_err();
        assert_eq!(err.exit_code(), 2);
        let message = err.to_string();
        assert!(message.contains("one of --tag, --latest, or --pr is required"));
        // The full usage text is part of this error and only this error.
        assert!(message.contains("--workspace"));
    }

    #[test]
    fn test_reserved_flags_rejected_first() {
        // Reserved flag plus a missing selector: the reserved rejection wins.
        for args in [
            ["--container", "ct-runner"],
            ["--image", "some:image"],
            ["--deploy", "prod"],
        ] {
            let err = parse(&args).unwrap_err();
            assert_eq!(err.exit_code(), 2);
            assert!(err.to_string().contains("reserved"), "{err}");
            assert!(!err.to_string().contains("--workspace"));
        }
    }

    #[test]
    fn test_tag_conflicts() {
        let err = parse(&["--tag", "t", "--latest"]).unwrap_err();
        assert!(err.to_string().contains("mutually exclusive"));

        let err = parse(&["--tag", "t", "--pr", "42"]).unwrap_err();
        assert!(err.to_string().contains("conflicts"));
    }

    #[test]
    fn test_env_entries_ordered_and_validated() {
        let config = parse(&["--pr", "42", "-E", "A=1", "-E", "B=two words"]).unwrap();
        assert_eq!(config.extra_env, vec!["A=1", "B=two words"]);

        let err = parse(&["--pr", "42", "-E", "NOEQUALS"]).unwrap_err();
        assert!(err.to_string().contains("malformed"));
    }

    #[test]
    fn test_passthrough_after_first_bare_token() {
        let config = parse(&["--pr", "42", "run-bench", "--duration", "300", "-c", "5"]).unwrap();
        assert_eq!(
            config.passthrough_args,
            vec!["run-bench", "--duration", "300", "-c", "5"]
        );
        // A reserved-looking flag inside the passthrough is not ours to judge.
        assert!(config.tag.is_none());
    }

    #[test]
    fn test_report_path() {
        let config = parse(&["--pr", "42", "--report", "/tmp/report.json"]).unwrap();
        assert_eq!(
            config.report_path.as_deref(),
            Some(std::path::Path::new("/tmp/report.json"))
        );
    }
}
