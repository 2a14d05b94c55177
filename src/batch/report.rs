//! Console table and CSV export for batch timing.

use std::path::Path;

use crate::error::Result;

use super::{display_name, TimingRecord, TimingSummary};

/// Longest error excerpt shown in a console row.
const ERROR_EXCERPT_CHARS: usize = 30;

const RULE_WIDTH: usize = 60;

/// Column header followed by a dashed rule.
#[must_use]
pub fn table_header() -> String {
    format!(
        "{:<6} {:<20} {:<20} {:<12}\n{}",
        "Index",
        "IR Path",
        "Visible Path",
        "Fusion Time(ms)",
        "-".repeat(RULE_WIDTH)
    )
}

/// Console row for a fused pair; paths are shown by file name.
#[must_use]
pub fn success_row(record: &TimingRecord) -> String {
    format!(
        "{:<6} {:<20} {:<20} {:<12.2}",
        record.pair,
        display_name(&record.ir_path),
        display_name(&record.vis_path),
        record.time_ms
    )
}

/// Console row for a failed pair with a truncated error message.
#[must_use]
pub fn failure_row(pair: usize, reason: &str) -> String {
    let excerpt: String = reason.chars().take(ERROR_EXCERPT_CHARS).collect();
    format!("{pair:<6} Processing error: {excerpt}")
}

/// Multi-line statistics block framed by `=` rules.
#[must_use]
pub fn summary_block(summary: &TimingSummary) -> String {
    let rule = "=".repeat(RULE_WIDTH);

    format!(
        "{rule}\n\
         Fusion Time Statistics Summary\n\
         Total Pairs: {} (Success: {})\n\
         Average Time: {:.2} ms\n\
         Minimum Time: {:.2} ms\n\
         Maximum Time: {:.2} ms\n\
         Standard Deviation: {:.2} ms\n\
         {rule}",
        summary.total,
        summary.succeeded,
        summary.mean_ms,
        summary.min_ms,
        summary.max_ms,
        summary.std_dev_ms,
    )
}

/// Write `records` to `path` as CSV with a
/// `pair,ir_path,vis_path,time_ms,output` header.
///
/// # Errors
///
/// Returns an error if the file cannot be written.
pub fn write_csv<'a>(path: &Path, records: impl IntoIterator<Item = &'a TimingRecord>) -> Result<()> {
    let mut csv = String::from("pair,ir_path,vis_path,time_ms,output\n");

    for record in records {
        csv.push_str(&format!(
            "{},{},{},{},{}\n",
            record.pair,
            csv_field(&record.ir_path.display().to_string()),
            csv_field(&record.vis_path.display().to_string()),
            record.time_ms,
            csv_field(&record.output.display().to_string()),
        ));
    }

    std::fs::write(path, csv)?;
    tracing::debug!("Wrote timing report to {}", path.display());
    Ok(())
}

/// Quote a field if it contains a delimiter, quote or line break.
fn csv_field(value: &str) -> String {
    if value.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn record() -> TimingRecord {
        TimingRecord {
            pair: 1,
            ir_path: PathBuf::from("ir_grey/IR1.jpg"),
            vis_path: PathBuf::from("vis_grey/VIS1.jpg"),
            time_ms: 12.5,
            output: PathBuf::from("out/fused_01.jpg"),
        }
    }

    #[test]
    fn test_success_row_uses_file_names() {
        let row = success_row(&record());
        assert!(row.starts_with("1      IR1.jpg"));
        assert!(row.contains("VIS1.jpg"));
        assert!(row.contains("12.50"));
        assert!(!row.contains("ir_grey"));
    }

    #[test]
    fn test_failure_row_truncates() {
        let row = failure_row(2, &"x".repeat(100));
        assert_eq!(row, format!("2      Processing error: {}", "x".repeat(30)));
    }

    #[test]
    fn test_header_has_rule() {
        let header = table_header();
        assert!(header.starts_with("Index"));
        assert!(header.ends_with(&"-".repeat(60)));
    }

    #[test]
    fn test_summary_block() {
        let block = summary_block(&TimingSummary {
            total: 3,
            succeeded: 2,
            mean_ms: 15.0,
            min_ms: 10.0,
            max_ms: 20.0,
            std_dev_ms: 5.0,
        });
        assert!(block.contains("Total Pairs: 3 (Success: 2)"));
        assert!(block.contains("Average Time: 15.00 ms"));
        assert!(block.contains("Standard Deviation: 5.00 ms"));

        let lines: Vec<&str> = block.lines().collect();
        assert_eq!(lines.len(), 8);
        assert_eq!(lines[0], "=".repeat(60));
        assert_eq!(lines[1], "Fusion Time Statistics Summary");
        assert_eq!(lines[7], "=".repeat(60));
    }

    #[test]
    fn test_csv_field_escaping() {
        assert_eq!(csv_field("plain.jpg"), "plain.jpg");
        assert_eq!(csv_field("a,b.jpg"), "\"a,b.jpg\"");
        assert_eq!(csv_field("say \"hi\""), "\"say \"\"hi\"\"\"");
    }

    #[test]
    fn test_write_csv() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("timing_report.csv");
        write_csv(&path, [&record()]).unwrap();

        let contents = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = contents.lines().collect();
        assert_eq!(lines[0], "pair,ir_path,vis_path,time_ms,output");
        assert_eq!(lines[1], "1,ir_grey/IR1.jpg,vis_grey/VIS1.jpg,12.5,out/fused_01.jpg");
        assert_eq!(lines.len(), 2);
        assert!(contents.ends_with('\n'));
    }
}
