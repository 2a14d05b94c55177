//! Image saving utilities.

use std::path::Path;

use image::{DynamicImage, GrayImage, Luma};

use crate::error::{Error, Result};

use super::{Plane, MAX_INTENSITY};

/// Convert a normalized plane to an 8-bit grayscale image.
///
/// Every sample is clamped to [0, 1] and then scaled to [0, 255] with
/// round-to-nearest.
///
/// # Errors
///
/// Returns an error if the plane is too large to be addressed as an image.
pub fn plane_to_gray(plane: &Plane) -> Result<GrayImage> {
    let (height, width) = plane.dim();
    let (w, h) = match (u32::try_from(width), u32::try_from(height)) {
        (Ok(w), Ok(h)) => (w, h),
        _ => {
            return Err(Error::fusion(format!(
                "plane of {width}x{height} exceeds image limits"
            )))
        }
    };

    let mut img = GrayImage::new(w, h);
    for ((y, x), &value) in plane.indexed_iter() {
        // Safe: x and y are bounded by w and h, which fit in u32
        #[allow(clippy::cast_possible_truncation)]
        img.put_pixel(x as u32, y as u32, Luma([denormalize(value)]));
    }

    Ok(img)
}

/// Save a grayscale image; the format is inferred from the extension.
///
/// # Arguments
///
/// * `img` - Image to write
/// * `path` - Output file path
/// * `quality` - JPEG quality (1-100), ignored for other formats
///
/// # Errors
///
/// Returns an error if the image cannot be saved.
pub fn save_gray<P: AsRef<Path>>(img: &GrayImage, path: P, quality: u8) -> Result<()> {
    let path = path.as_ref();

    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("png")
        .to_lowercase();

    match extension.as_str() {
        "jpg" | "jpeg" => {
            let mut output = std::fs::File::create(path)?;
            let encoder = image::codecs::jpeg::JpegEncoder::new_with_quality(&mut output, quality);
            DynamicImage::ImageLuma8(img.clone())
                .write_with_encoder(encoder)
                .map_err(|source| Error::ImageSave {
                    path: path.to_path_buf(),
                    source,
                })?;
        }
        _ => {
            img.save(path).map_err(|source| Error::ImageSave {
                path: path.to_path_buf(),
                source,
            })?;
        }
    }

    Ok(())
}

/// Map a normalized sample to [0, 255] with clamping.
#[inline]
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn denormalize(value: f32) -> u8 {
    // Safe: clamped to [0, 1] before scaling, so the product fits in u8
    (value.clamp(0.0, 1.0) * MAX_INTENSITY).round() as u8
}
