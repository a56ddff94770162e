//! End-to-end report extraction against real files.

use cti_common::{REPORT_BEGIN, REPORT_END, write_report};

#[test]
fn report_written_from_session_log() {
    let dir = tempfile::tempdir().unwrap();
    let session_log = dir.path().join("session.log");
    let report_path = dir.path().join("report.json");

    std::fs::write(
        &session_log,
        format!("deploying image...\n{REPORT_BEGIN}\n{{\"x\":1}}\n{REPORT_END}\ndone\n"),
    )
    .unwrap();

    write_report(&session_log, &report_path).unwrap();
    assert_eq!(std::fs::read_to_string(&report_path).unwrap(), "{\"x\":1}\n");
}

#[test]
fn report_overwrites_previous_content() {
    let dir = tempfile::tempdir().unwrap();
    let session_log = dir.path().join("session.log");
    let report_path = dir.path().join("report.json");

    std::fs::write(&report_path, "stale content from an earlier run").unwrap();
    std::fs::write(
        &session_log,
        format!("{REPORT_BEGIN}\n{{}}\n{REPORT_END}\n"),
    )
    .unwrap();

    write_report(&session_log, &report_path).unwrap();
    assert_eq!(std::fs::read_to_string(&report_path).unwrap(), "{}\n");
}

#[test]
fn interrupted_run_without_sentinels_yields_empty_report() {
    let dir = tempfile::tempdir().unwrap();
    let session_log = dir.path().join("session.log");
    let report_path = dir.path().join("report.json");

    std::fs::write(&session_log, "load generation running...\n^C\n").unwrap();

    write_report(&session_log, &report_path).unwrap();
    assert_eq!(std::fs::read_to_string(&report_path).unwrap(), "");
}
