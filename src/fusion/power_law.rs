//! Power-law fusion: weighted average followed by gamma correction.

use image::{GrayImage, Luma};

use crate::error::{Error, Result};
use crate::image::{resize_to_match, MAX_INTENSITY};

use super::Fuser;

/// Configuration for power-law fusion.
#[derive(Debug, Clone, PartialEq)]
pub struct PowerLawConfig {
    /// Weight of the visible image (0.0-1.0); infrared gets `1 - alpha`.
    pub alpha: f32,

    /// Exponent applied to the blended intensity. Values below 1 brighten.
    pub gamma: f32,
}

impl Default for PowerLawConfig {
    fn default() -> Self {
        Self {
            alpha: 0.5,
            gamma: 0.6,
        }
    }
}

impl PowerLawConfig {
    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if any parameter is out of valid range.
    pub fn validate(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.alpha) {
            return Err(Error::invalid_parameter("alpha", "must be between 0.0 and 1.0"));
        }

        if !self.gamma.is_finite() || self.gamma <= 0.0 {
            return Err(Error::invalid_parameter("gamma", "must be a finite value greater than 0"));
        }

        Ok(())
    }
}

/// Blends visible and infrared intensities, then applies a power law.
#[derive(Debug, Clone)]
pub struct PowerLawFuser {
    config: PowerLawConfig,
}

impl PowerLawFuser {
    /// Create a fuser from a validated configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid.
    pub fn new(config: PowerLawConfig) -> Result<Self> {
        config.validate()?;
        tracing::debug!(
            "Power-law fuser: alpha={} gamma={}",
            config.alpha,
            config.gamma
        );
        Ok(Self { config })
    }

    /// The configuration this fuser was built with.
    #[must_use]
    pub const fn config(&self) -> &PowerLawConfig {
        &self.config
    }

    /// Fuse one pair of samples.
    #[inline]
    #[allow(
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss,
        clippy::suboptimal_flops
    )]
    fn fuse_sample(&self, visible: u8, infrared: u8) -> u8 {
        let PowerLawConfig { alpha, gamma } = self.config;
        let vis = f32::from(visible) / MAX_INTENSITY;
        let ir = f32::from(infrared) / MAX_INTENSITY;

        // Two roundings, not a fused multiply-add: the truncating cast below
        // turns a one-ulp difference into a whole intensity step.
        let blended = alpha * vis + (1.0 - alpha) * ir;
        let corrected = blended.powf(gamma);

        // Safe: clamped to [0, 255] before the truncating cast
        (corrected * MAX_INTENSITY).clamp(0.0, MAX_INTENSITY) as u8
    }
}

impl Fuser for PowerLawFuser {
    fn name(&self) -> &'static str {
        "power-law"
    }

    /// The infrared image is resampled to the visible size, so the result has
    /// the visible image's dimensions.
    fn fuse(&self, infrared: &GrayImage, visible: &GrayImage) -> Result<GrayImage> {
        let (width, height) = visible.dimensions();
        let infrared = resize_to_match(infrared, width, height);

        let mut fused = GrayImage::new(width, height);
        for ((out, vis), ir) in fused
            .pixels_mut()
            .zip(visible.pixels())
            .zip(infrared.pixels())
        {
            *out = Luma([self.fuse_sample(vis[0], ir[0])]);
        }

        Ok(fused)
    }
}
