//! `irvis-fusion` CLI - Fuse infrared and visible-light image pairs.

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use irvis_fusion::batch::{run_batch, BatchConfig, ImagePair};
use irvis_fusion::{Fuser, PowerLawConfig, PowerLawFuser, Wavelet, WaveletConfig, WaveletFuser};

/// Fuse infrared and visible-light images and report per-pair timing.
#[derive(Parser, Debug)]
#[command(name = "irvis-fusion")]
#[command(version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    method: Method,

    /// Enable verbose output.
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand, Debug)]
enum Method {
    /// Wavelet-domain fusion: averaged approximation, max-magnitude details.
    Wavelet {
        /// Wavelet basis (haar, db1, db2, db3, db4).
        #[arg(short, long, default_value = "haar", value_name = "NAME")]
        wavelet: String,

        /// Number of decomposition levels.
        #[arg(short, long, default_value = "2", value_name = "INT")]
        levels: usize,

        /// Directory for fused images and the timing report.
        #[arg(short, long, default_value = "fusion_results_wavelet", value_name = "DIR")]
        output_dir: PathBuf,

        #[command(flatten)]
        batch: BatchArgs,
    },

    /// Power-law fusion: weighted average followed by gamma correction.
    PowerLaw {
        /// Weight of the visible image (0.0-1.0).
        #[arg(short, long, default_value = "0.5", value_name = "FLOAT")]
        alpha: f32,

        /// Gamma exponent applied after blending.
        #[arg(short, long, default_value = "0.6", value_name = "FLOAT")]
        gamma: f32,

        /// Directory for fused images and the timing report.
        #[arg(short, long, default_value = "fusion_results_powerlaw", value_name = "DIR")]
        output_dir: PathBuf,

        #[command(flatten)]
        batch: BatchArgs,
    },
}

#[derive(Args, Debug)]
struct BatchArgs {
    /// Infrared and visible image paths; repeat for more pairs.
    #[arg(short, long = "pair", num_args = 2, value_names = ["IR", "VIS"], required = true)]
    pairs: Vec<PathBuf>,

    /// Extension of the fused images (selects the format).
    #[arg(short, long, default_value = "jpg", value_name = "EXT")]
    extension: String,

    /// Output JPEG quality (1-100).
    #[arg(short, long, default_value = "95", value_name = "INT")]
    quality: u8,
}

impl BatchArgs {
    fn image_pairs(&self) -> Vec<ImagePair> {
        self.pairs
            .chunks_exact(2)
            .map(|pair| ImagePair::new(&pair[0], &pair[1]))
            .collect()
    }

    fn config(&self, output_dir: PathBuf) -> BatchConfig {
        BatchConfig {
            output_dir,
            extension: self.extension.clone(),
            quality: self.quality,
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    // Initialize logging
    let log_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| format!("irvis_fusion={log_level}").into()),
        )
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();

    match run(&cli) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(err) => {
            tracing::error!("{err:#}");
            ExitCode::FAILURE
        }
    }
}

/// Run the selected method; `Ok(false)` means no pair was fused.
fn run(cli: &Cli) -> Result<bool> {
    match &cli.method {
        Method::Wavelet {
            wavelet,
            levels,
            output_dir,
            batch,
        } => {
            let config = WaveletConfig {
                wavelet: wavelet.parse::<Wavelet>()?,
                levels: *levels,
            };
            let fuser = WaveletFuser::new(&config).context("Invalid wavelet settings")?;
            run_method(&fuser, batch, output_dir.clone())
        }
        Method::PowerLaw {
            alpha,
            gamma,
            output_dir,
            batch,
        } => {
            let config = PowerLawConfig {
                alpha: *alpha,
                gamma: *gamma,
            };
            let fuser = PowerLawFuser::new(config).context("Invalid power-law settings")?;
            run_method(&fuser, batch, output_dir.clone())
        }
    }
}

fn run_method(fuser: &dyn Fuser, batch: &BatchArgs, output_dir: PathBuf) -> Result<bool> {
    let pairs = batch.image_pairs();
    let config = batch.config(output_dir);

    let report = run_batch(fuser, &pairs, &config).context("Batch processing failed")?;

    let failed = report.failures().count();
    if failed > 0 {
        tracing::warn!("{failed} of {} pairs failed", report.outcomes.len());
    }

    Ok(report.csv_path.is_some())
}
