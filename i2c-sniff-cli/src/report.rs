//! Diff report rendering
//!
//! Turns a [`DiffReport`] into the text shown on stdout, or into JSON for
//! tooling that post-processes comparison results.

use anyhow::Result;
use i2c_sniff_decoder::DiffReport;
use std::fmt::Write;
use std::path::Path;

/// Render a diff report as human-readable text
pub fn render_text(report: &DiffReport, left: &Path, right: &Path) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Comparing I2C transaction logs");
    let _ = writeln!(out, "  left:  {}", left.display());
    let _ = writeln!(out, "  right: {}", right.display());
    let _ = writeln!(out);

    if report.is_empty() {
        let _ = writeln!(out, "✓ No differences detected - equivalent captures.");
        return out;
    }

    for diff in &report.field_diffs {
        let _ = writeln!(
            out,
            "transaction {}: {} differs: left={} right={}",
            diff.index, diff.field, diff.left, diff.right
        );
    }
    for index in &report.unmatched_left {
        let _ = writeln!(out, "transaction {}: only in left log", index);
    }
    for index in &report.unmatched_right {
        let _ = writeln!(out, "transaction {}: only in right log", index);
    }

    let total =
        report.field_diffs.len() + report.unmatched_left.len() + report.unmatched_right.len();
    let _ = writeln!(out);
    let _ = writeln!(out, "✗ {} difference(s) found.", total);
    out
}

/// Render a diff report as pretty-printed JSON
pub fn render_json(report: &DiffReport) -> Result<String> {
    Ok(serde_json::to_string_pretty(report)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use i2c_sniff_decoder::{FieldDiff, TransactionField};
    use std::path::PathBuf;

    #[test]
    fn test_empty_report_text() {
        let text = render_text(
            &DiffReport::default(),
            &PathBuf::from("a.log"),
            &PathBuf::from("b.log"),
        );
        assert!(text.contains("No differences detected"));
    }

    #[test]
    fn test_diff_report_text() {
        let report = DiffReport {
            field_diffs: vec![FieldDiff {
                index: 2,
                field: TransactionField::DataBytes,
                left: "0x01:ACK".to_string(),
                right: "0x02:ACK".to_string(),
            }],
            unmatched_left: vec![],
            unmatched_right: vec![5],
        };
        let text = render_text(&report, &PathBuf::from("a.log"), &PathBuf::from("b.log"));
        assert!(text.contains("transaction 2: data differs"));
        assert!(text.contains("transaction 5: only in right log"));
        assert!(text.contains("2 difference(s)"));
    }

    #[test]
    fn test_json_report_shape() {
        let json = render_json(&DiffReport::default()).unwrap();
        assert!(json.contains("field_diffs"));
        assert!(json.contains("unmatched_left"));
    }
}
