//! Per-axis weight tables for separable resampling.
//!
//! A [`WeightTable`] maps every destination index on one axis to the list of
//! source indices that contribute to it and their normalized weights.
//!
//! For destination index `i` the source-space center is
//! `c = (i + 0.5) * S / D - 0.5`. When minifying (`S > D`) the kernel is
//! stretched by `S / D` so every source pixel contributes; otherwise the
//! kernel is used as is.
//!
//! # Example
//!
//! ```rust
//! use pixa_ops::kernel::Filter;
//! use pixa_ops::weights::WeightTable;
//!
//! let filter = Filter::Box.resolve().unwrap();
//! let table = WeightTable::build(4, 2, &filter, None).unwrap();
//! assert_eq!(table.len(), 2);
//! let row = table.row(0);
//! assert_eq!(row.len(), 2);
//! assert!((row[0].weight - 0.5).abs() < 1e-12);
//! ```

use crate::kernel::ResampleFilter;
use crate::{OpsError, OpsResult};
use tracing::trace;

/// Largest widened kernel support, in source samples.
///
/// Each destination index evaluates the kernel at up to `2 * support + 2`
/// positions.
pub const MAX_SUPPORT: f64 = 16_777_216.0;

/// One contribution of a source pixel to a destination pixel.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tap {
    /// Source index, clamped into `[0, S - 1]`.
    pub index: usize,
    /// Normalized weight.
    pub weight: f64,
}

/// Weight table for one axis.
///
/// Rows are stored back to back; `offsets[i]..offsets[i + 1]` is row `i`.
#[derive(Debug, Clone)]
pub struct WeightTable {
    src_len: usize,
    taps: Vec<Tap>,
    offsets: Vec<usize>,
}

impl WeightTable {
    /// Builds the table for resampling `src_len` samples to `dst_len`.
    ///
    /// `scale` overrides the kernel widening factor, which otherwise is
    /// `src_len / dst_len`. It is never allowed below 1.
    ///
    /// # Errors
    ///
    /// - [`OpsError::InvalidDimension`] if either length is zero
    /// - [`OpsError::InvalidParameter`] if `scale` is not finite or the
    ///   widened support exceeds [`MAX_SUPPORT`]
    /// - [`OpsError::DegenerateFilter`] if a row's weights sum to zero
    pub fn build(
        src_len: usize,
        dst_len: usize,
        filter: &ResampleFilter,
        scale: Option<f64>,
    ) -> OpsResult<Self> {
        if src_len == 0 || dst_len == 0 {
            return Err(OpsError::InvalidDimension(format!(
                "weight table {src_len} -> {dst_len}: extents must be > 0"
            )));
        }

        let ratio = src_len as f64 / dst_len as f64;
        let scale = scale.unwrap_or(ratio);
        if !scale.is_finite() {
            return Err(OpsError::InvalidParameter(format!(
                "resample scale must be finite, got {scale}"
            )));
        }
        let scale = scale.max(1.0);
        let support = filter.radius() * scale;
        if support > MAX_SUPPORT {
            return Err(OpsError::InvalidParameter(format!(
                "filter support {support} exceeds the limit of {MAX_SUPPORT} source samples"
            )));
        }
        let last = (src_len - 1) as i64;

        // Merged taps are unique per row, so a row never holds more than `src_len`.
        let per_row = (2 * support.ceil() as usize + 1).min(src_len);
        let mut taps = Vec::with_capacity(dst_len.saturating_mul(per_row));
        let mut offsets = Vec::with_capacity(dst_len + 1);
        offsets.push(0);

        for i in 0..dst_len {
            let center = (i as f64 + 0.5) * ratio - 0.5;
            let start = (center - support).floor() as i64;
            let end = (center + support).ceil() as i64;
            let row_start = taps.len();

            for j in start..=end {
                let w = filter.weight((j as f64 - center) / scale);
                if w == 0.0 {
                    continue;
                }
                // Clamped indices are non-decreasing, so duplicates are adjacent.
                let index = j.clamp(0, last) as usize;
                match taps[row_start..].last_mut() {
                    Some(Tap { index: prev, weight }) if *prev == index => *weight += w,
                    _ => taps.push(Tap { index, weight: w }),
                }
            }

            let row = &mut taps[row_start..];
            let sum: f64 = row.iter().map(|t| t.weight).sum();
            if sum == 0.0 || !sum.is_finite() {
                return Err(OpsError::DegenerateFilter(format!(
                    "weights for destination index {i} of {dst_len} sum to {sum}"
                )));
            }
            for tap in row.iter_mut() {
                tap.weight /= sum;
            }
            offsets.push(taps.len());
        }

        trace!(
            src_len,
            dst_len,
            support,
            taps = taps.len(),
            "built weight table"
        );

        Ok(Self {
            src_len,
            taps,
            offsets,
        })
    }

    /// Number of rows (the destination extent).
    #[inline]
    pub fn len(&self) -> usize {
        self.offsets.len() - 1
    }

    /// Returns `true` if the table has no rows.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Source extent the table was built for.
    #[inline]
    pub fn src_len(&self) -> usize {
        self.src_len
    }

    /// Taps of destination index `i`.
    ///
    /// # Panics
    ///
    /// Panics if `i >= self.len()`.
    #[inline]
    pub fn row(&self, i: usize) -> &[Tap] {
        &self.taps[self.offsets[i]..self.offsets[i + 1]]
    }

    /// Iterates over all rows in destination order.
    pub fn rows(&self) -> impl Iterator<Item = &[Tap]> + '_ {
        self.offsets.windows(2).map(|w| &self.taps[w[0]..w[1]])
    }

    /// Largest number of taps in any row.
    pub fn max_taps(&self) -> usize {
        self.offsets
            .windows(2)
            .map(|w| w[1] - w[0])
            .max()
            .unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kernel::{CATALOG, CustomFilter, Filter};
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_rows_are_normalized() {
        let sizes = [(1, 1), (1, 7), (7, 1), (10, 3), (3, 10), (64, 17), (17, 64), (100, 100)];
        for (_, filter) in CATALOG.iter() {
            let resolved = filter.resolve().unwrap();
            for &(s, d) in &sizes {
                let table = WeightTable::build(s, d, &resolved, None).unwrap();
                assert_eq!(table.len(), d);
                for row in table.rows() {
                    let sum: f64 = row.iter().map(|t| t.weight).sum();
                    assert_abs_diff_eq!(sum, 1.0, epsilon = 1e-6);
                }
            }
        }
    }

    #[test]
    fn test_indices_clamped_and_unique() {
        let filter = Filter::Lanczos(3).resolve().unwrap();
        let table = WeightTable::build(5, 23, &filter, None).unwrap();
        for row in table.rows() {
            for pair in row.windows(2) {
                assert!(pair[0].index < pair[1].index);
            }
            assert!(row.iter().all(|t| t.index < 5));
        }
    }

    #[test]
    fn test_nearest_identity_has_single_tap() {
        let filter = Filter::NearestNeighbor.resolve().unwrap();
        let table = WeightTable::build(9, 9, &filter, None).unwrap();
        for (i, row) in table.rows().enumerate() {
            assert_eq!(row, &[Tap { index: i, weight: 1.0 }]);
        }
    }

    #[test]
    fn test_support_widens_when_downsampling() {
        let filter = Filter::Linear.resolve().unwrap();
        let up = WeightTable::build(8, 16, &filter, None).unwrap();
        let down = WeightTable::build(16, 4, &filter, None).unwrap();
        assert!(up.max_taps() <= 2);
        // Linear radius 1 stretched by 4 covers 8 source pixels.
        assert!(down.max_taps() >= 7);
    }

    #[test]
    fn test_scale_override() {
        let filter = Filter::Linear.resolve().unwrap();
        let plain = WeightTable::build(16, 16, &filter, None).unwrap();
        let wide = WeightTable::build(16, 16, &filter, Some(3.0)).unwrap();
        assert_eq!(plain.max_taps(), 1);
        assert!(wide.max_taps() >= 5);
        // Below 1 is clamped to 1.
        let narrow = WeightTable::build(16, 16, &filter, Some(0.25)).unwrap();
        assert_eq!(narrow.max_taps(), 1);
        assert!(WeightTable::build(16, 16, &filter, Some(f64::INFINITY)).is_err());
    }

    #[test]
    fn test_box_downsample_weights() {
        let filter = Filter::Box.resolve().unwrap();
        let table = WeightTable::build(4, 2, &filter, None).unwrap();
        assert_eq!(table.row(0), &[Tap { index: 0, weight: 0.5 }, Tap { index: 1, weight: 0.5 }]);
        assert_eq!(table.row(1), &[Tap { index: 2, weight: 0.5 }, Tap { index: 3, weight: 0.5 }]);
    }

    #[test]
    fn test_zero_extent_rejected() {
        let filter = Filter::Linear.resolve().unwrap();
        assert!(matches!(
            WeightTable::build(0, 4, &filter, None),
            Err(OpsError::InvalidDimension(_))
        ));
        assert!(matches!(
            WeightTable::build(4, 0, &filter, None),
            Err(OpsError::InvalidDimension(_))
        ));
    }

    #[test]
    fn test_support_limit() {
        let huge = Filter::Custom(CustomFilter::new(1e300, |_| 1.0).unwrap());
        assert!(matches!(
            WeightTable::build(8, 4, &huge.resolve().unwrap(), None),
            Err(OpsError::InvalidParameter(_))
        ));

        let linear = Filter::Linear.resolve().unwrap();
        for scale in [1e300, f64::MAX, MAX_SUPPORT * 2.0] {
            assert!(matches!(
                WeightTable::build(8, 4, &linear, Some(scale)),
                Err(OpsError::InvalidParameter(_))
            ));
        }

        // Wide but bounded support folds everything onto the source samples.
        let flat = Filter::Custom(CustomFilter::new(1000.0, |_| 1.0).unwrap());
        let table = WeightTable::build(8, 4, &flat.resolve().unwrap(), None).unwrap();
        assert_eq!(table.max_taps(), 8);
        for row in table.rows() {
            let sum: f64 = row.iter().map(|t| t.weight).sum();
            assert_abs_diff_eq!(sum, 1.0, epsilon = 1e-9);
        }
    }

    #[test]
    fn test_degenerate_kernel() {
        let zero = Filter::Custom(CustomFilter::new(2.0, |_| 0.0).unwrap());
        let err = WeightTable::build(8, 4, &zero.resolve().unwrap(), None).unwrap_err();
        assert!(matches!(err, OpsError::DegenerateFilter(_)));

        let nan = Filter::Custom(CustomFilter::new(1.0, |_| f64::NAN).unwrap());
        assert!(matches!(
            WeightTable::build(8, 4, &nan.resolve().unwrap(), None),
            Err(OpsError::DegenerateFilter(_))
        ));
    }
}
