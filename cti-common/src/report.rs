//! Sentinel-delimited report extraction from captured session output.
//!
//! The remote runner embeds its structured report between fixed delimiter
//! lines in free-form output. We only delimit and copy; the content is never
//! parsed or validated here.

use std::fs;
use std::io;
use std::path::Path;

/// Line marking the start of the embedded report.
pub const REPORT_BEGIN: &str = "====json-report-begin===";
/// Line marking the end of the embedded report.
pub const REPORT_END: &str = "====json-report-end===";

/// Extract the lines strictly between the begin and end sentinels, excluding
/// the sentinel lines themselves.
///
/// Returns an empty string when the begin sentinel is absent, or when no end
/// sentinel follows it; a truncated capture is not an error.
pub fn extract_report(captured: &str) -> String {
    let mut inside = false;
    let mut report = String::new();
    for line in captured.lines() {
        let line = line.strip_suffix('\r').unwrap_or(line);
        if !inside {
            if line == REPORT_BEGIN {
                inside = true;
            }
            continue;
        }
        if line == REPORT_END {
            return report;
        }
        report.push_str(line);
        report.push('\n');
    }
    // Begin without end: the run was cut short before the report closed.
    String::new()
}

/// Slice the report out of a session log and write it to `report_path`,
/// overwriting any existing content. Missing sentinels produce an empty file.
pub fn write_report(session_log: &Path, report_path: &Path) -> io::Result<()> {
    let captured = fs::read(session_log)?;
    let report = extract_report(&String::from_utf8_lossy(&captured));
    fs::write(report_path, report)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extracts_between_sentinels() {
        let captured = "a\n====json-report-begin===\n{\"x\":1}\n====json-report-end===\nb\n";
        assert_eq!(extract_report(captured), "{\"x\":1}\n");
    }

    #[test]
    fn test_multiline_report() {
        let captured = format!("noise\n{REPORT_BEGIN}\nline1\nline2\n{REPORT_END}\ntail\n");
        assert_eq!(extract_report(&captured), "line1\nline2\n");
    }

    #[test]
    fn test_missing_begin_is_empty() {
        let captured = format!("just output\n{REPORT_END}\n");
        assert_eq!(extract_report(&captured), "");
    }

    #[test]
    fn test_begin_without_end_is_empty() {
        let captured = format!("{REPORT_BEGIN}\npartial\n");
        assert_eq!(extract_report(&captured), "");
    }

    #[test]
    fn test_crlf_sentinels() {
        let captured = format!("{REPORT_BEGIN}\r\n{{\"x\":1}}\r\n{REPORT_END}\r\n");
        assert_eq!(extract_report(&captured), "{\"x\":1}\n");
    }
}
