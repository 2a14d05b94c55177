//! Image loading, conversion, and saving utilities.

mod load;
mod save;

pub use load::{gray_to_plane, load_grayscale, resize_to_match};
pub use save::{plane_to_gray, save_gray};

use ndarray::Array2;

/// A single-channel grid of `f32` samples indexed `[row, col]`.
/// Image planes hold intensities normalized to [0, 1]; wavelet subbands reuse
/// the same type for coefficients.
pub type Plane = Array2<f32>;

/// Largest 8-bit intensity, used to map between `u8` samples and [0, 1].
pub const MAX_INTENSITY: f32 = 255.0;
