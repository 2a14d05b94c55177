//! Separable 2-D wavelet decomposition over several levels.

use ndarray::{s, Axis, Zip};

use crate::error::{Error, Result};
use crate::image::Plane;

use super::FilterBank;

/// The three detail subbands produced by one decomposition pass.
#[derive(Debug, Clone, PartialEq)]
pub struct DetailLevel {
    /// High-pass along rows (axis 0), low-pass along columns.
    pub horizontal: Plane,
    /// Low-pass along rows, high-pass along columns (axis 1).
    pub vertical: Plane,
    /// High-pass along both axes.
    pub diagonal: Plane,
}

impl DetailLevel {
    /// Shape shared by the three subbands.
    #[must_use]
    pub fn dim(&self) -> (usize, usize) {
        self.horizontal.dim()
    }

    /// Iterate the subbands as `(name, plane)` in horizontal, vertical,
    /// diagonal order.
    pub fn subbands(&self) -> impl Iterator<Item = (&'static str, &Plane)> {
        [
            ("horizontal", &self.horizontal),
            ("vertical", &self.vertical),
            ("diagonal", &self.diagonal),
        ]
        .into_iter()
    }
}

/// A multi-level wavelet decomposition of one plane.
#[derive(Debug, Clone, PartialEq)]
pub struct Decomposition {
    /// Coarsest approximation subband.
    pub approximation: Plane,
    /// Detail subbands ordered from coarsest (index 0) to finest.
    pub details: Vec<DetailLevel>,
    /// Shape of the plane that was decomposed, restored on reconstruction.
    pub shape: (usize, usize),
}

impl Decomposition {
    /// Number of decomposition passes.
    #[must_use]
    pub fn levels(&self) -> usize {
        self.details.len()
    }

    /// Check that `other` has the same level count and subband shapes.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Fusion`] describing the first mismatch.
    pub fn ensure_compatible(&self, other: &Self) -> Result<()> {
        if self.levels() != other.levels() {
            return Err(Error::fusion(format!(
                "decompositions have {} and {} levels",
                self.levels(),
                other.levels()
            )));
        }
        if self.approximation.dim() != other.approximation.dim() {
            return Err(Error::fusion(format!(
                "approximation subbands are {:?} and {:?}",
                self.approximation.dim(),
                other.approximation.dim()
            )));
        }
        for (level, (a, b)) in self.details.iter().zip(&other.details).enumerate() {
            for ((name, pa), (_, pb)) in a.subbands().zip(b.subbands()) {
                if pa.dim() != pb.dim() {
                    return Err(Error::fusion(format!(
                        "{name} subband at level {} is {:?} and {:?}",
                        level + 1,
                        pa.dim(),
                        pb.dim()
                    )));
                }
            }
        }
        Ok(())
    }
}

/// Filter every lane of `plane` along `axis` into low and high bands.
fn analyze_axis(plane: &Plane, axis: Axis, bank: &FilterBank) -> (Plane, Plane) {
    let mut shape = plane.raw_dim();
    shape[axis.index()] = bank.analysis_len(plane.len_of(axis));

    let mut lo = Plane::zeros(shape);
    let mut hi = Plane::zeros(shape);
    Zip::from(plane.lanes(axis))
        .and(lo.lanes_mut(axis))
        .and(hi.lanes_mut(axis))
        .for_each(|signal, lo, hi| bank.analyze(signal, lo, hi));

    (lo, hi)
}

/// Recombine low and high bands along `axis`.
fn synthesize_axis(lo: &Plane, hi: &Plane, axis: Axis, bank: &FilterBank) -> Result<Plane> {
    if lo.dim() != hi.dim() {
        return Err(Error::fusion(format!(
            "cannot combine bands of shape {:?} and {:?}",
            lo.dim(),
            hi.dim()
        )));
    }

    let mut shape = lo.raw_dim();
    shape[axis.index()] = bank.synthesis_len(lo.len_of(axis));

    let mut out = Plane::zeros(shape);
    Zip::from(lo.lanes(axis))
        .and(hi.lanes(axis))
        .and(out.lanes_mut(axis))
        .for_each(|lo, hi, out| bank.synthesize(lo, hi, out));

    Ok(out)
}

/// One 2-D analysis pass: rows first, then columns.
fn dwt2(plane: &Plane, bank: &FilterBank) -> (Plane, DetailLevel) {
    let (row_lo, row_hi) = analyze_axis(plane, Axis(0), bank);
    let (approx, vertical) = analyze_axis(&row_lo, Axis(1), bank);
    let (horizontal, diagonal) = analyze_axis(&row_hi, Axis(1), bank);

    (
        approx,
        DetailLevel {
            horizontal,
            vertical,
            diagonal,
        },
    )
}

/// One 2-D synthesis pass, undoing [`dwt2`] in reverse axis order.
fn idwt2(approx: &Plane, detail: &DetailLevel, bank: &FilterBank) -> Result<Plane> {
    let row_lo = synthesize_axis(approx, &detail.vertical, Axis(1), bank)?;
    let row_hi = synthesize_axis(&detail.horizontal, &detail.diagonal, Axis(1), bank)?;
    synthesize_axis(&row_lo, &row_hi, Axis(0), bank)
}

/// Decompose `plane` `levels` times. Callers validate `levels`.
pub(super) fn wavedec2(plane: &Plane, bank: &FilterBank, levels: usize) -> Decomposition {
    let mut approximation = plane.clone();
    let mut details = Vec::with_capacity(levels);

    for _ in 0..levels {
        let (next, detail) = dwt2(&approximation, bank);
        tracing::trace!("decomposed {:?} into {:?}", approximation.dim(), next.dim());
        details.push(detail);
        approximation = next;
    }
    details.reverse();

    Decomposition {
        approximation,
        details,
        shape: plane.dim(),
    }
}

/// Rebuild the plane described by `decomposition`.
pub(super) fn waverec2(decomposition: &Decomposition, bank: &FilterBank) -> Result<Plane> {
    let mut current = decomposition.approximation.clone();

    for (level, detail) in decomposition.details.iter().enumerate() {
        let (rows, cols) = detail.dim();
        let (have_rows, have_cols) = current.dim();
        if have_rows < rows || have_cols < cols {
            return Err(Error::fusion(format!(
                "approximation {:?} is smaller than level {} details {:?}",
                current.dim(),
                level + 1,
                detail.dim()
            )));
        }
        // Odd lengths leave the rebuilt approximation one sample too long.
        if (have_rows, have_cols) != (rows, cols) {
            current = current.slice(s![..rows, ..cols]).to_owned();
        }
        current = idwt2(&current, detail, bank)?;
    }

    let (rows, cols) = decomposition.shape;
    let (have_rows, have_cols) = current.dim();
    if have_rows < rows || have_cols < cols {
        return Err(Error::fusion(format!(
            "reconstruction {:?} is smaller than the original {:?}",
            current.dim(),
            decomposition.shape
        )));
    }
    if (have_rows, have_cols) != (rows, cols) {
        current = current.slice(s![..rows, ..cols]).to_owned();
    }

    Ok(current)
}
