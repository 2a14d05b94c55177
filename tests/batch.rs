//! End-to-end batch runs against image files on disk.

use std::path::{Path, PathBuf};

use image::{GrayImage, Luma};
use irvis_fusion::batch::{run_batch, BatchConfig, ImagePair, PairOutcome, TIMING_REPORT_FILE};
use irvis_fusion::image::load_grayscale;
use irvis_fusion::{Error, PowerLawConfig, PowerLawFuser, Wavelet, WaveletConfig, WaveletFuser};
use tempfile::TempDir;

fn write_uniform(dir: &Path, name: &str, size: u32, value: u8) -> PathBuf {
    let path = dir.join(name);
    GrayImage::from_pixel(size, size, Luma([value]))
        .save(&path)
        .unwrap();
    path
}

#[allow(clippy::cast_possible_truncation)]
fn write_textured(dir: &Path, name: &str, width: u32, height: u32) -> PathBuf {
    let path = dir.join(name);
    GrayImage::from_fn(width, height, |x, y| Luma([((x * 13 + y * 7) % 256) as u8]))
        .save(&path)
        .unwrap();
    path
}

fn png_config(dir: &Path) -> BatchConfig {
    BatchConfig {
        extension: "png".to_string(),
        ..BatchConfig::new(dir.join("out"))
    }
}

#[test]
fn uniform_pair_fuses_to_mean_intensity() {
    let tmp = TempDir::new().unwrap();
    let ir = write_uniform(tmp.path(), "ir.png", 256, 200);
    let vis = write_uniform(tmp.path(), "vis.png", 256, 50);

    let fuser = WaveletFuser::new(&WaveletConfig {
        wavelet: Wavelet::Haar,
        levels: 1,
    })
    .unwrap();
    let config = png_config(tmp.path());
    let report = run_batch(&fuser, &[ImagePair::new(ir, vis)], &config).unwrap();

    let records: Vec<_> = report.records().collect();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].output, config.output_dir.join("fused_01.png"));

    let fused = load_grayscale(&records[0].output).unwrap();
    assert_eq!(fused.dimensions(), (256, 256));
    assert!(fused.pixels().all(|p| p[0] == 125));
}

#[test]
fn missing_infrared_is_skipped() {
    let tmp = TempDir::new().unwrap();
    let pairs = [
        ImagePair::new(
            write_textured(tmp.path(), "IR1.png", 64, 48),
            write_textured(tmp.path(), "VIS1.png", 64, 48),
        ),
        ImagePair::new(
            tmp.path().join("IR2.png"),
            write_textured(tmp.path(), "VIS2.png", 64, 48),
        ),
        ImagePair::new(
            write_textured(tmp.path(), "IR3.png", 32, 32),
            write_textured(tmp.path(), "VIS3.png", 40, 24),
        ),
    ];

    let fuser = WaveletFuser::new(&WaveletConfig::default()).unwrap();
    let config = png_config(tmp.path());
    let report = run_batch(&fuser, &pairs, &config).unwrap();

    let fused: Vec<usize> = report.records().map(|r| r.pair).collect();
    assert_eq!(fused, vec![1, 3]);

    let failures: Vec<_> = report.failures().collect();
    assert_eq!(failures.len(), 1);
    assert_eq!(failures[0].0, 2);
    assert!(failures[0].1.contains("IR2.png"));
    assert!(matches!(report.outcomes[1], PairOutcome::Failed { pair: 2, .. }));

    let summary = report.summary().unwrap();
    assert_eq!(summary.total, 3);
    assert_eq!(summary.succeeded, 2);
    assert!(summary.min_ms <= summary.mean_ms && summary.mean_ms <= summary.max_ms);

    assert!(config.output_dir.join("fused_01.png").exists());
    assert!(!config.output_dir.join("fused_02.png").exists());
    // resampled visible image, infrared shape kept
    let third = load_grayscale(config.output_dir.join("fused_03.png")).unwrap();
    assert_eq!(third.dimensions(), (32, 32));

    let csv_path = report.csv_path.clone().unwrap();
    assert_eq!(csv_path, config.output_dir.join(TIMING_REPORT_FILE));
    let csv = std::fs::read_to_string(csv_path).unwrap();
    let lines: Vec<&str> = csv.lines().collect();
    assert_eq!(lines.len(), 3);
    assert_eq!(lines[0], "pair,ir_path,vis_path,time_ms,output");
    assert!(lines[1].starts_with("1,"));
    assert!(lines[2].starts_with("3,"));
}

#[test]
fn all_failures_write_no_report() {
    let tmp = TempDir::new().unwrap();
    let pairs = [ImagePair::new(tmp.path().join("a.png"), tmp.path().join("b.png"))];

    let fuser = PowerLawFuser::new(PowerLawConfig::default()).unwrap();
    let config = png_config(tmp.path());
    let report = run_batch(&fuser, &pairs, &config).unwrap();

    assert_eq!(report.records().count(), 0);
    assert!(report.summary().is_none());
    assert!(report.csv_path.is_none());
    assert!(!config.output_dir.join(TIMING_REPORT_FILE).exists());
}

#[test]
fn too_deep_decomposition_fails_per_pair() {
    let tmp = TempDir::new().unwrap();
    let pairs = [ImagePair::new(
        write_textured(tmp.path(), "ir.png", 8, 8),
        write_textured(tmp.path(), "vis.png", 8, 8),
    )];

    let fuser = WaveletFuser::new(&WaveletConfig {
        wavelet: Wavelet::Db4,
        levels: 2,
    })
    .unwrap();
    let report = run_batch(&fuser, &pairs, &png_config(tmp.path())).unwrap();

    let failures: Vec<_> = report.failures().collect();
    assert_eq!(failures.len(), 1);
    assert!(failures[0].1.contains("levels"));
}

#[test]
fn power_law_batch_writes_jpeg() {
    let tmp = TempDir::new().unwrap();
    let pairs = [ImagePair::new(
        write_uniform(tmp.path(), "ir.png", 32, 0),
        write_uniform(tmp.path(), "vis.png", 32, 255),
    )];

    let fuser = PowerLawFuser::new(PowerLawConfig {
        alpha: 0.5,
        gamma: 1.0,
    })
    .unwrap();
    let config = BatchConfig::new(tmp.path().join("out"));
    let report = run_batch(&fuser, &pairs, &config).unwrap();

    let output = &report.records().next().unwrap().output;
    assert_eq!(output, &config.output_dir.join("fused_01.jpg"));

    let fused = load_grayscale(output).unwrap();
    assert_eq!(fused.dimensions(), (32, 32));
    // 127 before JPEG compression
    assert!(fused.pixels().all(|p| (i16::from(p[0]) - 127).abs() <= 2));
}

#[test]
fn invalid_quality_aborts_batch() {
    let tmp = TempDir::new().unwrap();
    let fuser = WaveletFuser::new(&WaveletConfig::default()).unwrap();
    let config = BatchConfig {
        quality: 101,
        ..png_config(tmp.path())
    };

    assert!(matches!(
        run_batch(&fuser, &[], &config),
        Err(Error::InvalidParameter { .. })
    ));
}
