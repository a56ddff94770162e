//! cti - run a remote cluster validation against a chosen build.
//!
//! Pipeline: parse and validate arguments, preflight the gateway (and build
//! credentials when a build is needed), resolve the image tag, run the
//! remote session with dual-sink capture, then extract the report if one was
//! requested. Every stage fails fast before anything expensive happens.

mod artifact;
mod cli;
mod preflight;
mod session;

use clap::Parser;
use cti_common::{CtiError, Settings, write_report};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    // Diagnostics go to stderr; stdout carries the remote stream and the
    // replay hint.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = cli::Cli::parse();
    let code = match run(cli).await {
        Ok(code) => code,
        Err(err) => {
            eprintln!("error: {err}");
            if let Some(hint) = err.remediation() {
                eprintln!("hint: {hint}");
            }
            err.exit_code()
        }
    };
    std::process::exit(code);
}

async fn run(cli: cli::Cli) -> Result<i32, CtiError> {
    let config = cli.into_run_config()?;
    let settings = Settings::from_env();

    preflight::check_gateway(&settings.gateway_host(&config.workspace)).await?;
    if config.needs_build() {
        preflight::check_build_credentials(&settings.auth_probe).await?;
    }

    let resolved = artifact::resolve(&config, &settings).await?;
    println!(
        "image tag: {tag} (rerun with --tag {tag} to skip the build)",
        tag = resolved.tag
    );

    let result = session::run(&config, &resolved, &settings).await?;
    if result.interrupted {
        warn!("session interrupted; processing output captured so far");
    }

    if let Some(report_path) = &config.report_path {
        write_report(&result.log_path, report_path).map_err(|err| CtiError::Session {
            detail: format!("failed to write report to {}: {err}", report_path.display()),
        })?;
        info!("report written to {}", report_path.display());
    }

    session::apply_cleanup(settings.cleanup, &result.log_path);

    Ok(result.exit_code)
}
