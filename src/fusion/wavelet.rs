//! Wavelet-domain fusion: mean of approximations, max-magnitude details.

use image::GrayImage;
use ndarray::Zip;

use crate::error::{Error, Result};
use crate::image::{gray_to_plane, plane_to_gray, resize_to_match, Plane};
use crate::wavelet::{Decomposition, DetailLevel, MultiLevelTransform, Wavelet};

use super::Fuser;

/// Configuration for wavelet-domain fusion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WaveletConfig {
    /// Basis used for both decomposition and reconstruction.
    pub wavelet: Wavelet,

    /// Number of decomposition passes.
    pub levels: usize,
}

impl Default for WaveletConfig {
    fn default() -> Self {
        Self {
            wavelet: Wavelet::Haar,
            levels: 2,
        }
    }
}

impl WaveletConfig {
    /// Validate the configuration.
    ///
    /// Whether `levels` fits a particular image is only known once the image
    /// is loaded, so that check happens during fusion.
    ///
    /// # Errors
    ///
    /// Returns an error if `levels` is zero.
    pub fn validate(&self) -> Result<()> {
        validate_levels(self.levels)
    }
}

fn validate_levels(levels: usize) -> Result<()> {
    if levels == 0 {
        return Err(Error::invalid_parameter("levels", "must be greater than 0"));
    }
    Ok(())
}

/// Fuses images in the wavelet domain of any [`MultiLevelTransform`].
#[derive(Debug, Clone)]
pub struct WaveletFuser<T = Wavelet> {
    transform: T,
    levels: usize,
}

impl WaveletFuser<Wavelet> {
    /// Create a fuser from a validated configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid.
    pub fn new(config: &WaveletConfig) -> Result<Self> {
        tracing::debug!("Wavelet fuser: {} with {} levels", config.wavelet, config.levels);
        Self::with_transform(config.wavelet, config.levels)
    }
}

impl<T: MultiLevelTransform> WaveletFuser<T> {
    /// Create a fuser over an arbitrary transform.
    ///
    /// # Errors
    ///
    /// Returns an error if `levels` is zero.
    pub fn with_transform(transform: T, levels: usize) -> Result<Self> {
        validate_levels(levels)?;
        Ok(Self { transform, levels })
    }

    /// Fuse two normalized planes of identical shape.
    ///
    /// The result is the raw reconstruction and may leave [0, 1].
    ///
    /// # Errors
    ///
    /// Returns an error if the shapes differ, `levels` does not fit the
    /// planes, or the transform fails.
    pub fn fuse_planes(&self, infrared: &Plane, visible: &Plane) -> Result<Plane> {
        if infrared.dim() != visible.dim() {
            return Err(Error::fusion(format!(
                "planes differ in shape: {:?} and {:?}",
                infrared.dim(),
                visible.dim()
            )));
        }

        let ir = self.transform.decompose(infrared, self.levels)?;
        let vis = self.transform.decompose(visible, self.levels)?;
        let fused = fuse_decompositions(&ir, &vis)?;

        self.transform.reconstruct(&fused)
    }
}

impl<T: MultiLevelTransform> Fuser for WaveletFuser<T> {
    fn name(&self) -> &'static str {
        "wavelet"
    }

    fn fuse(&self, infrared: &GrayImage, visible: &GrayImage) -> Result<GrayImage> {
        let (width, height) = infrared.dimensions();
        let visible = resize_to_match(visible, width, height);

        let fused = self.fuse_planes(&gray_to_plane(infrared), &gray_to_plane(&visible))?;

        plane_to_gray(&fused)
    }
}

/// Fuse `infrared` and `visible` with `levels` passes of `wavelet`.
///
/// The visible image is resampled to the infrared size when they differ, and
/// the result has the infrared image's dimensions.
///
/// # Errors
///
/// Returns [`Error::InvalidParameter`] if `levels` is zero or too deep for the
/// image, or [`Error::Fusion`] if the transform fails.
pub fn fuse(
    infrared: &GrayImage,
    visible: &GrayImage,
    wavelet: Wavelet,
    levels: usize,
) -> Result<GrayImage> {
    WaveletFuser::new(&WaveletConfig { wavelet, levels })?.fuse(infrared, visible)
}

/// Combine two compatible decompositions.
///
/// The approximation is the element-wise mean. Each detail coefficient comes
/// from the infrared side only when its magnitude is strictly larger, so ties
/// keep the visible coefficient.
///
/// # Errors
///
/// Returns [`Error::Fusion`] if the decompositions differ in structure.
pub fn fuse_decompositions(infrared: &Decomposition, visible: &Decomposition) -> Result<Decomposition> {
    infrared.ensure_compatible(visible)?;

    let approximation = Zip::from(&infrared.approximation)
        .and(&visible.approximation)
        .map_collect(|&ir, &vis| (ir + vis) / 2.0);

    let details = infrared
        .details
        .iter()
        .zip(&visible.details)
        .map(|(ir, vis)| DetailLevel {
            horizontal: select_max_magnitude(&ir.horizontal, &vis.horizontal),
            vertical: select_max_magnitude(&ir.vertical, &vis.vertical),
            diagonal: select_max_magnitude(&ir.diagonal, &vis.diagonal),
        })
        .collect();

    Ok(Decomposition {
        approximation,
        details,
        shape: infrared.shape,
    })
}

fn select_max_magnitude(infrared: &Plane, visible: &Plane) -> Plane {
    Zip::from(infrared)
        .and(visible)
        .map_collect(|&ir, &vis| if ir.abs() > vis.abs() { ir } else { vis })
}
