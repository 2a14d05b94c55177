//! Sequential batch processing of image pairs with timing statistics.

mod report;

pub use report::{failure_row, success_row, summary_block, table_header, write_csv};

use std::path::{Path, PathBuf};
use std::time::Instant;

use indicatif::{ProgressBar, ProgressStyle};

use crate::error::{Error, Result};
use crate::fusion::Fuser;
use crate::image::save_gray;

/// File name of the CSV timing export inside the output directory.
pub const TIMING_REPORT_FILE: &str = "timing_report.csv";

/// One infrared/visible input pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImagePair {
    pub infrared: PathBuf,
    pub visible: PathBuf,
}

impl ImagePair {
    #[must_use]
    pub fn new(infrared: impl Into<PathBuf>, visible: impl Into<PathBuf>) -> Self {
        Self {
            infrared: infrared.into(),
            visible: visible.into(),
        }
    }
}

/// Configuration for a batch run.
#[derive(Debug, Clone)]
pub struct BatchConfig {
    /// Directory receiving fused images and the timing report.
    pub output_dir: PathBuf,

    /// Extension of the fused images; selects the output format.
    pub extension: String,

    /// JPEG quality (1-100).
    pub quality: u8,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("fusion_results"),
            extension: "jpg".to_string(),
            quality: 95,
        }
    }
}

impl BatchConfig {
    /// Default settings writing into `output_dir`.
    #[must_use]
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
            ..Self::default()
        }
    }

    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if any parameter is out of valid range.
    pub fn validate(&self) -> Result<()> {
        if !(1..=100).contains(&self.quality) {
            return Err(Error::invalid_parameter("quality", "must be between 1 and 100"));
        }

        let extension = self.extension.trim_start_matches('.');
        if extension.is_empty() || extension.contains(['/', '\\']) {
            return Err(Error::invalid_parameter(
                "extension",
                format!("{:?} is not a file extension", self.extension),
            ));
        }

        Ok(())
    }

    /// Output path for the fused image of the 1-based pair `index`.
    #[must_use]
    pub fn output_path(&self, index: usize) -> PathBuf {
        let extension = self.extension.trim_start_matches('.');
        self.output_dir.join(format!("fused_{index:02}.{extension}"))
    }
}

/// Timing of one successfully fused pair.
#[derive(Debug, Clone, PartialEq)]
pub struct TimingRecord {
    /// 1-based position of the pair in the batch.
    pub pair: usize,
    pub ir_path: PathBuf,
    pub vis_path: PathBuf,
    /// Load + fuse + save time in milliseconds.
    pub time_ms: f64,
    pub output: PathBuf,
}

/// Result of processing one pair.
#[derive(Debug, Clone, PartialEq)]
pub enum PairOutcome {
    /// The pair was fused and written.
    Fused(TimingRecord),
    /// The pair was skipped.
    Failed { pair: usize, reason: String },
}

impl PairOutcome {
    /// The timing record, if the pair succeeded.
    #[must_use]
    pub const fn record(&self) -> Option<&TimingRecord> {
        match self {
            Self::Fused(record) => Some(record),
            Self::Failed { .. } => None,
        }
    }

    /// 1-based pair index.
    #[must_use]
    pub const fn pair(&self) -> usize {
        match self {
            Self::Fused(record) => record.pair,
            Self::Failed { pair, .. } => *pair,
        }
    }
}

/// Aggregate timing over the successful pairs of a batch.
#[derive(Debug, Clone, PartialEq)]
pub struct TimingSummary {
    /// Pairs attempted.
    pub total: usize,
    /// Pairs that produced a record.
    pub succeeded: usize,
    pub mean_ms: f64,
    pub min_ms: f64,
    pub max_ms: f64,
    /// Population standard deviation.
    pub std_dev_ms: f64,
}

impl TimingSummary {
    /// Summarize `records` out of `total` attempted pairs.
    ///
    /// Returns `None` when there are no records.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn from_records<'a>(records: impl IntoIterator<Item = &'a TimingRecord>, total: usize) -> Option<Self> {
        let times: Vec<f64> = records.into_iter().map(|r| r.time_ms).collect();
        if times.is_empty() {
            return None;
        }

        let n = times.len() as f64;
        let mean_ms = times.iter().sum::<f64>() / n;
        let variance = times.iter().map(|t| (t - mean_ms).powi(2)).sum::<f64>() / n;

        Some(Self {
            total,
            succeeded: times.len(),
            mean_ms,
            min_ms: times.iter().copied().fold(f64::INFINITY, f64::min),
            max_ms: times.iter().copied().fold(f64::NEG_INFINITY, f64::max),
            std_dev_ms: variance.sqrt(),
        })
    }
}

/// Everything a batch run produced.
#[derive(Debug, Clone, Default)]
pub struct BatchReport {
    /// One outcome per input pair, in input order.
    pub outcomes: Vec<PairOutcome>,
    /// Location of the CSV export, if one was written.
    pub csv_path: Option<PathBuf>,
}

impl BatchReport {
    /// Timing records of the successful pairs, in input order.
    pub fn records(&self) -> impl Iterator<Item = &TimingRecord> {
        self.outcomes.iter().filter_map(PairOutcome::record)
    }

    /// `(pair, reason)` for every failed pair.
    pub fn failures(&self) -> impl Iterator<Item = (usize, &str)> {
        self.outcomes.iter().filter_map(|outcome| match outcome {
            PairOutcome::Failed { pair, reason } => Some((*pair, reason.as_str())),
            PairOutcome::Fused(_) => None,
        })
    }

    /// Statistics over the successful pairs, or `None` if every pair failed.
    #[must_use]
    pub fn summary(&self) -> Option<TimingSummary> {
        TimingSummary::from_records(self.records(), self.outcomes.len())
    }
}

/// Fuse every pair in order, writing `fused_NN.<ext>` files and a timing
/// report into the configured output directory.
///
/// A failing pair is logged and recorded as [`PairOutcome::Failed`]; the
/// remaining pairs still run. The CSV report is written only if at least one
/// pair succeeded.
///
/// # Errors
///
/// Returns an error if the configuration is invalid, the output directory
/// cannot be created, or the timing report cannot be written.
pub fn run_batch<F: Fuser + ?Sized>(fuser: &F, pairs: &[ImagePair], config: &BatchConfig) -> Result<BatchReport> {
    config.validate()?;
    std::fs::create_dir_all(&config.output_dir)?;

    tracing::info!(
        "Fusing {} pairs with the {} rule into {}",
        pairs.len(),
        fuser.name(),
        config.output_dir.display()
    );

    let pb = ProgressBar::new(pairs.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} Fusing [{bar:40.cyan/blue}] {pos}/{len}")
            .expect("valid template")
            .progress_chars("#>-"),
    );
    pb.suspend(|| println!("{}", table_header()));

    let mut report = BatchReport::default();
    for (offset, pair) in pairs.iter().enumerate() {
        let index = offset + 1;

        let outcome = match process_pair(fuser, index, pair, config) {
            Ok(record) => {
                tracing::debug!("Pair {index} fused in {:.2} ms", record.time_ms);
                pb.suspend(|| println!("{}", success_row(&record)));
                PairOutcome::Fused(record)
            }
            Err(err) => {
                tracing::warn!("Pair {index} failed: {err}");
                let reason = err.to_string();
                pb.suspend(|| println!("{}", failure_row(index, &reason)));
                PairOutcome::Failed {
                    pair: index,
                    reason,
                }
            }
        };
        report.outcomes.push(outcome);
        pb.inc(1);
    }
    pb.finish_and_clear();

    if let Some(summary) = report.summary() {
        println!("\n{}", summary_block(&summary));

        let csv_path = config.output_dir.join(TIMING_REPORT_FILE);
        write_csv(&csv_path, report.records())?;
        println!("\nDetailed time record saved to: {}", csv_path.display());
        report.csv_path = Some(csv_path);
    } else {
        tracing::warn!("No pair was fused; skipping the timing report");
    }

    Ok(report)
}

/// Load, fuse and save one pair, timing the whole round trip.
fn process_pair<F: Fuser + ?Sized>(
    fuser: &F,
    index: usize,
    pair: &ImagePair,
    config: &BatchConfig,
) -> Result<TimingRecord> {
    let output = config.output_path(index);
    let start = Instant::now();

    let fused = fuser.fuse_files(&pair.infrared, &pair.visible)?;
    save_gray(&fused, &output, config.quality)?;

    let time_ms = start.elapsed().as_secs_f64() * 1000.0;

    Ok(TimingRecord {
        pair: index,
        ir_path: pair.infrared.clone(),
        vis_path: pair.visible.clone(),
        time_ms,
        output,
    })
}

/// File name of `path` for display, falling back to the whole path.
pub(crate) fn display_name(path: &Path) -> String {
    path.file_name()
        .map_or_else(|| path.display().to_string(), |name| name.to_string_lossy().into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(pair: usize, time_ms: f64) -> TimingRecord {
        TimingRecord {
            pair,
            ir_path: PathBuf::from(format!("ir/IR{pair}.jpg")),
            vis_path: PathBuf::from(format!("vis/VIS{pair}.jpg")),
            time_ms,
            output: PathBuf::from(format!("out/fused_{pair:02}.jpg")),
        }
    }

    #[test]
    fn test_output_path_is_zero_padded() {
        let config = BatchConfig::new("out");
        assert_eq!(config.output_path(3), PathBuf::from("out/fused_03.jpg"));
        assert_eq!(config.output_path(12), PathBuf::from("out/fused_12.jpg"));
    }

    #[test]
    fn test_output_path_strips_leading_dot() {
        let config = BatchConfig {
            extension: ".png".to_string(),
            ..BatchConfig::new("out")
        };
        assert_eq!(config.output_path(1), PathBuf::from("out/fused_01.png"));
    }

    #[test]
    fn test_invalid_quality() {
        let config = BatchConfig {
            quality: 0,
            ..BatchConfig::default()
        };
        assert!(matches!(config.validate(), Err(Error::InvalidParameter { .. })));
    }

    #[test]
    fn test_invalid_extension() {
        for extension in ["", ".", "a/b"] {
            let config = BatchConfig {
                extension: extension.to_string(),
                ..BatchConfig::default()
            };
            assert!(config.validate().is_err(), "{extension:?}");
        }
    }

    #[test]
    fn test_summary_statistics() {
        let records = [record(1, 10.0), record(2, 20.0), record(4, 30.0)];
        let summary = TimingSummary::from_records(&records, 4).unwrap();

        assert_eq!(summary.total, 4);
        assert_eq!(summary.succeeded, 3);
        assert!((summary.mean_ms - 20.0).abs() < 1e-9);
        assert!((summary.min_ms - 10.0).abs() < 1e-9);
        assert!((summary.max_ms - 30.0).abs() < 1e-9);
        // population std of [10, 20, 30]
        assert!((summary.std_dev_ms - (200.0_f64 / 3.0).sqrt()).abs() < 1e-9);
    }

    #[test]
    fn test_summary_of_nothing() {
        let none: [TimingRecord; 0] = [];
        assert!(TimingSummary::from_records(&none, 3).is_none());
    }

    #[test]
    fn test_report_separates_outcomes() {
        let report = BatchReport {
            outcomes: vec![
                PairOutcome::Fused(record(1, 5.0)),
                PairOutcome::Failed {
                    pair: 2,
                    reason: "boom".to_string(),
                },
                PairOutcome::Fused(record(3, 7.0)),
            ],
            csv_path: None,
        };

        let pairs: Vec<usize> = report.records().map(|r| r.pair).collect();
        assert_eq!(pairs, vec![1, 3]);
        assert_eq!(report.failures().collect::<Vec<_>>(), vec![(2, "boom")]);
        assert_eq!(report.outcomes[1].pair(), 2);

        let summary = report.summary().unwrap();
        assert_eq!(summary.total, 3);
        assert_eq!(summary.succeeded, 2);
    }

    #[test]
    fn test_display_name() {
        assert_eq!(display_name(Path::new("ir_grey/IR1.jpg")), "IR1.jpg");
        assert_eq!(display_name(Path::new("/")), "/");
    }
}
