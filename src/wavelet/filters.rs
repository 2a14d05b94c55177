//! One-dimensional analysis and synthesis filter banks.
//!
//! Signals are extended past their ends by half-sample symmetric reflection
//! (`x[-1] = x[0]`, `x[n] = x[n - 1]`), which keeps constant signals constant
//! in the approximation band and free of energy in the detail band.

use ndarray::{ArrayView1, ArrayViewMut1};

/// Decomposition and reconstruction filters of an orthogonal wavelet.
#[derive(Debug, Clone, PartialEq)]
pub struct FilterBank {
    pub dec_lo: Vec<f32>,
    pub dec_hi: Vec<f32>,
    pub rec_lo: Vec<f32>,
    pub rec_hi: Vec<f32>,
}

impl FilterBank {
    /// Build the full bank from an orthonormal scaling filter.
    ///
    /// `rec_lo` is the scaling filter itself, `rec_hi` its quadrature mirror
    /// (`rec_hi[k] = (-1)^k * rec_lo[len - 1 - k]`), and the decomposition
    /// filters are the time reverses of the reconstruction ones.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn from_scaling(scaling: &[f64]) -> Self {
        let len = scaling.len();
        let rec_lo: Vec<f32> = scaling.iter().map(|&h| h as f32).collect();
        let rec_hi: Vec<f32> = (0..len)
            .map(|k| {
                let mirrored = rec_lo[len - 1 - k];
                if k % 2 == 0 {
                    mirrored
                } else {
                    -mirrored
                }
            })
            .collect();
        let dec_lo = rec_lo.iter().rev().copied().collect();
        let dec_hi = rec_hi.iter().rev().copied().collect();

        Self {
            dec_lo,
            dec_hi,
            rec_lo,
            rec_hi,
        }
    }

    /// Number of taps per filter.
    pub(crate) fn len(&self) -> usize {
        self.rec_lo.len()
    }

    /// Number of coefficients per band produced from `signal_len` samples.
    #[must_use]
    pub fn analysis_len(&self, signal_len: usize) -> usize {
        (signal_len + self.len() - 1) / 2
    }

    /// Number of samples rebuilt from `coeff_len` coefficients per band.
    #[must_use]
    pub fn synthesis_len(&self, coeff_len: usize) -> usize {
        (2 * coeff_len + 2).saturating_sub(self.len())
    }

    /// Split `signal` into its low-pass (`lo`) and high-pass (`hi`) bands.
    ///
    /// `lo` and `hi` must both hold `analysis_len(signal.len())` elements.
    pub fn analyze(&self, signal: ArrayView1<'_, f32>, mut lo: ArrayViewMut1<'_, f32>, mut hi: ArrayViewMut1<'_, f32>) {
        let n = signal.len();
        debug_assert_eq!(lo.len(), self.analysis_len(n));
        debug_assert_eq!(hi.len(), lo.len());

        for o in 0..lo.len() {
            let center = 2 * o + 1;
            let mut approx = 0.0_f32;
            let mut detail = 0.0_f32;
            for (j, (&l, &h)) in self.dec_lo.iter().zip(&self.dec_hi).enumerate() {
                let sample = signal[symmetric_index(center, j, n)];
                approx += l * sample;
                detail += h * sample;
            }
            lo[o] = approx;
            hi[o] = detail;
        }
    }

    /// Rebuild a signal from its low-pass and high-pass bands.
    ///
    /// `out` must hold `synthesis_len(lo.len())` elements.
    pub fn synthesize(&self, lo: ArrayView1<'_, f32>, hi: ArrayView1<'_, f32>, mut out: ArrayViewMut1<'_, f32>) {
        let taps = self.len();
        let n = lo.len();
        debug_assert_eq!(hi.len(), n);
        debug_assert_eq!(out.len(), self.synthesis_len(n));

        for m in 0..out.len() {
            // y[m] = sum_k a[k] * rec_lo[m + taps - 2 - 2k] + d[k] * rec_hi[...]
            let offset = m + taps - 2;
            let mut acc = 0.0_f32;
            let mut j = offset % 2;
            while j < taps && j <= offset {
                let k = (offset - j) / 2;
                if k < n {
                    acc += lo[k] * self.rec_lo[j] + hi[k] * self.rec_hi[j];
                }
                j += 2;
            }
            out[m] = acc;
        }
    }
}

/// Index of `x[center - tap]` after half-sample symmetric extension of a
/// signal of length `len`. Folds repeatedly, so taps longer than the signal
/// are fine.
#[inline]
fn symmetric_index(center: usize, tap: usize, len: usize) -> usize {
    let period = 2 * len;
    // center - tap may be negative; shift by a whole number of periods first.
    let shifted = (center + period * (tap / period + 1) - tap) % period;
    if shifted < len {
        shifted
    } else {
        period - 1 - shifted
    }
}
