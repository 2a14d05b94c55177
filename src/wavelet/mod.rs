//! Orthogonal wavelet bases and the multi-level 2-D transform.
//!
//! The fusion rules only need a decomposition/reconstruction pair, exposed
//! here as [`MultiLevelTransform`]. [`Wavelet`] implements it with a
//! separable filter-bank DWT.

mod decomposition;
mod filters;

pub use decomposition::{Decomposition, DetailLevel};
pub use filters::FilterBank;

use std::fmt;
use std::str::FromStr;

use crate::error::{Error, Result};
use crate::image::Plane;

/// Multi-resolution decomposition and its inverse.
pub trait MultiLevelTransform {
    /// Decompose `plane` into one approximation and `levels` detail triples.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidParameter`] if `levels` is zero or larger than
    /// [`MultiLevelTransform::max_level`] allows for the plane's shape.
    fn decompose(&self, plane: &Plane, levels: usize) -> Result<Decomposition>;

    /// Invert [`MultiLevelTransform::decompose`], returning a plane with the
    /// shape of the original input.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Fusion`] if the subband shapes are inconsistent.
    fn reconstruct(&self, decomposition: &Decomposition) -> Result<Plane>;

    /// Deepest useful decomposition for a `rows` x `cols` plane.
    fn max_level(&self, rows: usize, cols: usize) -> usize;
}

/// Daubechies scaling filters, normalized so the taps sum to sqrt(2).
const HAAR: [f64; 2] = [std::f64::consts::FRAC_1_SQRT_2, std::f64::consts::FRAC_1_SQRT_2];

const DB2: [f64; 4] = [
    0.482_962_913_144_534_1,
    0.836_516_303_737_807_7,
    0.224_143_868_042_013_4,
    -0.129_409_522_551_260_34,
];

const DB3: [f64; 6] = [
    0.332_670_552_950_082_63,
    0.806_891_509_311_092_5,
    0.459_877_502_118_491_54,
    -0.135_011_020_010_254_58,
    -0.085_441_273_882_026_66,
    0.035_226_291_885_709_53,
];

const DB4: [f64; 8] = [
    0.230_377_813_308_896_5,
    0.714_846_570_552_915_7,
    0.630_880_767_929_858_9,
    -0.027_983_769_416_859_854,
    -0.187_034_811_719_093_09,
    0.030_841_381_835_560_764,
    0.032_883_011_666_885_2,
    -0.010_597_401_785_069_032,
];

/// Supported wavelet bases.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Wavelet {
    /// Haar wavelet (also accepted as `db1`).
    #[default]
    Haar,
    /// Daubechies, 2 vanishing moments.
    Db2,
    /// Daubechies, 3 vanishing moments.
    Db3,
    /// Daubechies, 4 vanishing moments.
    Db4,
}

impl Wavelet {
    /// Every supported basis, in catalogue order.
    pub const ALL: [Self; 4] = [Self::Haar, Self::Db2, Self::Db3, Self::Db4];

    /// Canonical name of this basis.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Haar => "haar",
            Self::Db2 => "db2",
            Self::Db3 => "db3",
            Self::Db4 => "db4",
        }
    }

    /// Orthonormal scaling (reconstruction low-pass) filter.
    #[must_use]
    pub const fn scaling_filter(&self) -> &'static [f64] {
        match self {
            Self::Haar => &HAAR,
            Self::Db2 => &DB2,
            Self::Db3 => &DB3,
            Self::Db4 => &DB4,
        }
    }

    /// Number of filter taps.
    #[must_use]
    pub const fn filter_len(&self) -> usize {
        self.scaling_filter().len()
    }

    /// Build the analysis/synthesis filter bank for this basis.
    #[must_use]
    pub fn filter_bank(&self) -> FilterBank {
        FilterBank::from_scaling(self.scaling_filter())
    }
}

impl fmt::Display for Wavelet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Wavelet {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "haar" | "db1" => Ok(Self::Haar),
            "db2" => Ok(Self::Db2),
            "db3" => Ok(Self::Db3),
            "db4" => Ok(Self::Db4),
            _ => Err(Error::UnsupportedWavelet {
                name: s.to_string(),
            }),
        }
    }
}

impl MultiLevelTransform for Wavelet {
    fn decompose(&self, plane: &Plane, levels: usize) -> Result<Decomposition> {
        let (rows, cols) = plane.dim();
        let max = self.max_level(rows, cols);

        if levels == 0 {
            return Err(Error::invalid_parameter("levels", "must be greater than 0"));
        }
        if levels > max {
            return Err(Error::invalid_parameter(
                "levels",
                format!(
                    "{levels} levels of {self} need a larger image than {cols}x{rows} (at most {max})"
                ),
            ));
        }

        Ok(decomposition::wavedec2(plane, &self.filter_bank(), levels))
    }

    fn reconstruct(&self, decomposition: &Decomposition) -> Result<Plane> {
        decomposition::waverec2(decomposition, &self.filter_bank())
    }

    fn max_level(&self, rows: usize, cols: usize) -> usize {
        max_level(rows.min(cols), self.filter_len())
    }
}

/// Deepest decomposition for a signal of `len` samples before every
/// coefficient is dominated by boundary extension.
fn max_level(len: usize, filter_len: usize) -> usize {
    if filter_len <= 1 || len < filter_len - 1 {
        return 0;
    }
    // floor(log2(len / (filter_len - 1))); floor of the ratio does not change it
    (len / (filter_len - 1)).ilog2() as usize
}
