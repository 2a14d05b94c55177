//! Image loading utilities.

use std::borrow::Cow;
use std::path::Path;

use image::{imageops::FilterType, GrayImage};

use crate::error::{Error, Result};

use super::{Plane, MAX_INTENSITY};

/// Load an image from disk as 8-bit grayscale.
///
/// Color images are converted with the `image` crate's luma transform.
///
/// # Errors
///
/// Returns [`Error::ImageLoad`] if the file cannot be read or decoded.
pub fn load_grayscale<P: AsRef<Path>>(path: P) -> Result<GrayImage> {
    let path = path.as_ref();

    let img = image::open(path).map_err(|source| Error::ImageLoad {
        path: path.to_path_buf(),
        source,
    })?;

    Ok(img.into_luma8())
}

/// Resample `img` to `width` x `height` unless it already has that size.
///
/// Uses bilinear (triangle) filtering; the output dimensions always match the
/// requested ones exactly. An image that already fits is borrowed, not copied.
#[must_use]
pub fn resize_to_match(img: &GrayImage, width: u32, height: u32) -> Cow<'_, GrayImage> {
    if img.dimensions() == (width, height) {
        return Cow::Borrowed(img);
    }

    tracing::debug!(
        "Resampling {}x{} image to {width}x{height}",
        img.width(),
        img.height()
    );
    Cow::Owned(image::imageops::resize(img, width, height, FilterType::Triangle))
}

/// Convert an 8-bit grayscale image to a plane normalized to [0, 1].
#[must_use]
pub fn gray_to_plane(img: &GrayImage) -> Plane {
    let (width, height) = img.dimensions();

    #[allow(clippy::cast_possible_truncation)]
    Plane::from_shape_fn((height as usize, width as usize), |(y, x)| {
        // Safe: x and y are bounded by the image dimensions, which came from u32
        f32::from(img.get_pixel(x as u32, y as u32)[0]) / MAX_INTENSITY
    })
}
