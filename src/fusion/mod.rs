//! Infrared/visible fusion rules.

mod power_law;
mod wavelet;

pub use power_law::{PowerLawConfig, PowerLawFuser};
pub use wavelet::{fuse, fuse_decompositions, WaveletConfig, WaveletFuser};

use std::path::Path;

use image::GrayImage;

use crate::error::Result;
use crate::image::load_grayscale;

/// A rule that combines an infrared and a visible image into one.
pub trait Fuser {
    /// Short method name used in logs.
    fn name(&self) -> &'static str;

    /// Fuse two in-memory grayscale images.
    ///
    /// # Errors
    ///
    /// Returns an error if the images cannot be combined with this rule.
    fn fuse(&self, infrared: &GrayImage, visible: &GrayImage) -> Result<GrayImage>;

    /// Load both images from disk and fuse them.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::ImageLoad`] if either file cannot be read, or
    /// any error from [`Fuser::fuse`].
    fn fuse_files(&self, infrared: &Path, visible: &Path) -> Result<GrayImage> {
        let infrared = load_grayscale(infrared)?;
        let visible = load_grayscale(visible)?;
        self.fuse(&infrared, &visible)
    }
}
