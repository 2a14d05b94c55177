//! # `irvis-fusion`
//!
//! Fuses an infrared and a visible-light image into one grayscale image.
//!
//! Two rules are available:
//!
//! - **Wavelet**: both images are decomposed with a multi-level 2-D discrete
//!   wavelet transform. Approximation subbands are averaged, each detail
//!   coefficient keeps whichever source has the larger magnitude, and the
//!   result is transformed back.
//! - **Power law**: a weighted average of the two images followed by gamma
//!   correction.
//!
//! [`batch::run_batch`] drives either rule over a list of image pairs and
//! records per-pair timing.
//!
//! ## Example
//!
//! ```no_run
//! use irvis_fusion::batch::{run_batch, BatchConfig, ImagePair};
//! use irvis_fusion::{WaveletConfig, WaveletFuser};
//!
//! # fn main() -> irvis_fusion::Result<()> {
//! let fuser = WaveletFuser::new(&WaveletConfig::default())?;
//! let pairs = [ImagePair::new("ir_grey/IR1.jpg", "vis_grey/VIS1.jpg")];
//!
//! let report = run_batch(&fuser, &pairs, &BatchConfig::new("fusion_results_wavelet"))?;
//! println!("{} pairs fused", report.records().count());
//! # Ok(())
//! # }
//! ```

pub mod batch;
pub mod error;
pub mod fusion;
pub mod image;
pub mod wavelet;

pub use error::{Error, Result};
pub use fusion::{Fuser, PowerLawConfig, PowerLawFuser, WaveletConfig, WaveletFuser};
pub use wavelet::{MultiLevelTransform, Wavelet};
