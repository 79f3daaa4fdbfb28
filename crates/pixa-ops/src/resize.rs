//! Image resize and resampling operations.
//!
//! Scaling is separable: a horizontal pass resamples every source row into
//! an `f32` intermediate of `new_width x src_height`, then a vertical pass
//! produces the final `new_width x new_height` image. Each pass reads its
//! coefficients from a [`WeightTable`] built once per call.
//!
//! # Operations
//!
//! - [`resize`] - Exact size, one side may be inferred from the aspect ratio
//! - [`fit`] - Largest size inside a bounding box, never upscales
//! - [`thumbnail`] - Exact size, scale to cover then center-crop
//!
//! # Example
//!
//! ```rust
//! use pixa_core::RgbaImage;
//! use pixa_ops::resize::{resize, Filter};
//!
//! let src = RgbaImage::filled(64, 48, [10, 20, 30, 255]);
//! let dst = resize(&src, 32, 0, &Filter::Lanczos(3)).unwrap();
//! assert_eq!(dst.dimensions(), (32, 24));
//! ```

use pixa_core::{CHANNELS, RgbaImage};
use tracing::debug;

use crate::filter::quantize;
use crate::parallel::Executor;
use crate::weights::{Tap, WeightTable};
use crate::{OpsError, OpsResult};

pub use crate::kernel::Filter;

/// Resolves requested output dimensions, inferring a zero side from the
/// source aspect ratio.
///
/// # Errors
///
/// [`OpsError::InvalidDimension`] if both sides are zero, the source is
/// empty, or an inferred side rounds to zero or overflows.
///
/// # Example
///
/// ```rust
/// use pixa_ops::resize::resolve_dimensions;
///
/// assert_eq!(resolve_dimensions(1920, 1080, 800, 0).unwrap(), (800, 450));
/// assert_eq!(resolve_dimensions(1920, 1080, 0, 540).unwrap(), (960, 540));
/// assert!(resolve_dimensions(1920, 1080, 0, 0).is_err());
/// ```
pub fn resolve_dimensions(
    src_w: u32,
    src_h: u32,
    width: u32,
    height: u32,
) -> OpsResult<(u32, u32)> {
    if width == 0 && height == 0 {
        return Err(OpsError::InvalidDimension(
            "width and height cannot both be 0".into(),
        ));
    }
    if src_w == 0 || src_h == 0 {
        return Err(OpsError::InvalidDimension(format!(
            "cannot resample an empty {src_w}x{src_h} image"
        )));
    }

    let infer = |known: u32, num: u32, den: u32| -> OpsResult<u32> {
        let v = (f64::from(known) * f64::from(num) / f64::from(den)).round();
        if v < 1.0 || v > f64::from(u32::MAX) {
            return Err(OpsError::InvalidDimension(format!(
                "inferred dimension {v} for {src_w}x{src_h} -> {width}x{height} is out of range"
            )));
        }
        Ok(v as u32)
    };

    match (width, height) {
        (0, h) => Ok((infer(h, src_w, src_h)?, h)),
        (w, 0) => Ok((w, infer(w, src_h, src_w)?)),
        (w, h) => Ok((w, h)),
    }
}

/// Calculates the aspect-preserving size that fits inside `max_w x max_h`.
///
/// The limiting side equals its bound exactly; the other is rounded and at
/// least 1. The result may be larger than the source.
///
/// # Example
///
/// ```rust
/// use pixa_ops::resize::fit_dimensions;
///
/// // Fit 1920x1080 into 640x480 box
/// let (w, h) = fit_dimensions(1920, 1080, 640, 480);
/// assert_eq!((w, h), (640, 360)); // Letterboxed
/// ```
pub fn fit_dimensions(src_w: u32, src_h: u32, max_w: u32, max_h: u32) -> (u32, u32) {
    let src_aspect = f64::from(src_w) / f64::from(src_h);
    let max_aspect = f64::from(max_w) / f64::from(max_h);

    if src_aspect > max_aspect {
        let h = (f64::from(max_w) * f64::from(src_h) / f64::from(src_w)).round() as u32;
        (max_w, h.max(1))
    } else {
        let w = (f64::from(max_h) * f64::from(src_w) / f64::from(src_h)).round() as u32;
        (w.max(1), max_h)
    }
}

/// Calculates the aspect-preserving size that covers `min_w x min_h`.
///
/// One side equals its target exactly, the other is at least its target.
///
/// # Example
///
/// ```rust
/// use pixa_ops::resize::fill_dimensions;
///
/// // Fill 640x480 with 1920x1080 (crop sides)
/// let (w, h) = fill_dimensions(1920, 1080, 640, 480);
/// assert_eq!((w, h), (853, 480));
/// ```
pub fn fill_dimensions(src_w: u32, src_h: u32, min_w: u32, min_h: u32) -> (u32, u32) {
    let src_aspect = f64::from(src_w) / f64::from(src_h);
    let min_aspect = f64::from(min_w) / f64::from(min_h);

    if src_aspect < min_aspect {
        let h = (f64::from(min_w) * f64::from(src_h) / f64::from(src_w)).round() as u32;
        (min_w, h.max(min_h))
    } else {
        let w = (f64::from(min_h) * f64::from(src_w) / f64::from(src_h)).round() as u32;
        (w.max(min_w), min_h)
    }
}

/// Horizontal pass of one row.
fn resample_row(src_row: &[u8], table: &WeightTable, out: &mut [f32]) {
    for (taps, px_out) in table.rows().zip(out.chunks_exact_mut(CHANNELS)) {
        let mut acc = [0.0f64; CHANNELS];
        for &Tap { index, weight } in taps {
            let px = &src_row[index * CHANNELS..index * CHANNELS + CHANNELS];
            for c in 0..CHANNELS {
                acc[c] += weight * f64::from(px[c]);
            }
        }
        for c in 0..CHANNELS {
            px_out[c] = acc[c] as f32;
        }
    }
}

/// Vertical pass producing one destination row from the intermediate rows.
fn resample_column(temp: &[f32], row_len: usize, taps: &[Tap], out: &mut [u8]) {
    let mut acc = vec![0.0f64; row_len];
    for &Tap { index, weight } in taps {
        let src = &temp[index * row_len..(index + 1) * row_len];
        for (a, &v) in acc.iter_mut().zip(src) {
            *a += weight * f64::from(v);
        }
    }
    for (o, a) in out.iter_mut().zip(acc) {
        *o = quantize(a);
    }
}

impl Executor {
    /// Resize on this executor's pool. See [`resize`].
    pub fn resize(
        &self,
        src: &RgbaImage,
        width: u32,
        height: u32,
        filter: &Filter,
    ) -> OpsResult<RgbaImage> {
        let (src_w, src_h) = src.dimensions();
        let (dst_w, dst_h) = resolve_dimensions(src_w, src_h, width, height)?;
        debug!(src_w, src_h, dst_w, dst_h, filter = %filter, "resize");

        let kernel = filter.resolve()?;
        let h_table = WeightTable::build(src_w as usize, dst_w as usize, &kernel, None)?;
        let v_table = WeightTable::build(src_h as usize, dst_h as usize, &kernel, None)?;

        let row_len = dst_w as usize * CHANNELS;

        let mut temp = vec![0.0f32; row_len * src_h as usize];
        self.for_each_row(&mut temp, row_len, |y, row| {
            resample_row(src.row(y as u32), &h_table, row);
            Ok(())
        })?;

        let mut out = vec![0u8; row_len * dst_h as usize];
        self.for_each_row(&mut out, row_len, |y, row| {
            resample_column(&temp, row_len, v_table.row(y), row);
            Ok(())
        })?;

        Ok(RgbaImage::from_raw(dst_w, dst_h, out)?)
    }

    /// Fit on this executor's pool. See [`fit`].
    pub fn fit(
        &self,
        src: &RgbaImage,
        max_width: u32,
        max_height: u32,
        filter: &Filter,
    ) -> OpsResult<RgbaImage> {
        if max_width == 0 || max_height == 0 {
            return Err(OpsError::InvalidDimension(format!(
                "fit bounds must be > 0, got {max_width}x{max_height}"
            )));
        }
        let (src_w, src_h) = src.dimensions();
        if src.is_empty() {
            return Err(OpsError::InvalidDimension(format!(
                "cannot resample an empty {src_w}x{src_h} image"
            )));
        }
        if src_w <= max_width && src_h <= max_height {
            return Ok(src.clone());
        }

        let (w, h) = fit_dimensions(src_w, src_h, max_width, max_height);
        self.resize(src, w, h, filter)
    }

    /// Thumbnail on this executor's pool. See [`thumbnail`].
    pub fn thumbnail(
        &self,
        src: &RgbaImage,
        width: u32,
        height: u32,
        filter: &Filter,
    ) -> OpsResult<RgbaImage> {
        if width == 0 || height == 0 {
            return Err(OpsError::InvalidDimension(format!(
                "thumbnail size must be > 0, got {width}x{height}"
            )));
        }
        let (src_w, src_h) = src.dimensions();
        if src.is_empty() {
            return Err(OpsError::InvalidDimension(format!(
                "cannot resample an empty {src_w}x{src_h} image"
            )));
        }
        if (src_w, src_h) == (width, height) {
            return Ok(src.clone());
        }

        let (cover_w, cover_h) = fill_dimensions(src_w, src_h, width, height);
        let covered = self.resize(src, cover_w, cover_h, filter)?;
        let x = (cover_w - width) / 2;
        let y = (cover_h - height) / 2;
        Ok(covered.crop(x, y, width, height)?)
    }
}

/// Resizes `src` to `width x height`.
///
/// If one of `width`/`height` is 0 it is computed from the other so the
/// source aspect ratio is kept.
///
/// # Errors
///
/// - [`OpsError::InvalidDimension`] for `0 x 0`, an empty source, or an
///   inferred side that rounds to 0
/// - [`OpsError::InvalidParameter`] for a windowed-sinc radius of 0
/// - [`OpsError::DegenerateFilter`] for a custom kernel whose weights sum to 0
///
/// # Example
///
/// ```rust
/// use pixa_core::RgbaImage;
/// use pixa_ops::resize::{resize, Filter};
///
/// let src = RgbaImage::filled(16, 16, [128, 128, 128, 255]);
/// let dst = resize(&src, 32, 32, &Filter::Linear).unwrap();
/// assert_eq!(dst.pixel(31, 31), [128, 128, 128, 255]);
/// ```
pub fn resize(src: &RgbaImage, width: u32, height: u32, filter: &Filter) -> OpsResult<RgbaImage> {
    Executor::global()?.resize(src, width, height, filter)
}

/// Scales `src` down to fit inside `max_width x max_height`, keeping the
/// aspect ratio. Returns a copy if it already fits.
///
/// # Example
///
/// ```rust
/// use pixa_core::RgbaImage;
/// use pixa_ops::resize::{fit, Filter};
///
/// let src = RgbaImage::new(400, 100);
/// assert_eq!(fit(&src, 200, 200, &Filter::Box).unwrap().dimensions(), (200, 50));
/// assert_eq!(fit(&src, 800, 800, &Filter::Box).unwrap().dimensions(), (400, 100));
/// ```
pub fn fit(src: &RgbaImage, max_width: u32, max_height: u32, filter: &Filter) -> OpsResult<RgbaImage> {
    Executor::global()?.fit(src, max_width, max_height, filter)
}

/// Scales `src` to cover `width x height` and center-crops to exactly that size.
///
/// # Example
///
/// ```rust
/// use pixa_core::RgbaImage;
/// use pixa_ops::resize::{thumbnail, Filter};
///
/// let src = RgbaImage::new(300, 100);
/// let thumb = thumbnail(&src, 50, 50, &Filter::CatmullRom).unwrap();
/// assert_eq!(thumb.dimensions(), (50, 50));
/// ```
pub fn thumbnail(src: &RgbaImage, width: u32, height: u32, filter: &Filter) -> OpsResult<RgbaImage> {
    Executor::global()?.thumbnail(src, width, height, filter)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kernel::CustomFilter;
    use crate::parallel::ExecutorConfig;

    fn exec() -> Executor {
        Executor::new(ExecutorConfig::with_threads(3)).unwrap()
    }

    fn gradient(width: u32, height: u32) -> RgbaImage {
        let mut img = RgbaImage::new(width, height);
        for y in 0..height {
            for x in 0..width {
                img.set_pixel(x, y, [(x * 7 % 256) as u8, (y * 11 % 256) as u8, ((x + y) % 256) as u8, 255]);
            }
        }
        img
    }

    #[test]
    fn test_resize_identity_nearest() {
        let src = gradient(13, 9);
        let dst = exec().resize(&src, 13, 9, &Filter::NearestNeighbor).unwrap();
        assert_eq!(dst, src);
    }

    #[test]
    fn test_resize_identity_sinc() {
        // Windowed sinc vanishes at integer offsets, so same-size is exact.
        let src = gradient(10, 6);
        let dst = exec().resize(&src, 10, 6, &Filter::Lanczos(3)).unwrap();
        assert_eq!(dst, src);
    }

    #[test]
    fn test_resize_upscale_constant() {
        let src = RgbaImage::filled(4, 4, [128, 64, 32, 200]);
        for filter in [Filter::Linear, Filter::CatmullRom, Filter::Lanczos(3), Filter::Gaussian] {
            let dst = exec().resize(&src, 8, 8, &filter).unwrap();
            assert_eq!(dst.dimensions(), (8, 8));
            assert!(dst.pixels().all(|(_, _, px)| px == [128, 64, 32, 200]), "{filter}");
        }
    }

    #[test]
    fn test_resize_downscale() {
        let src = RgbaImage::filled(64, 64, [64, 64, 64, 255]);
        let dst = exec().resize(&src, 16, 16, &Filter::Lanczos(3)).unwrap();
        assert_eq!(dst.dimensions(), (16, 16));
        assert_eq!(dst.pixel(8, 8), [64, 64, 64, 255]);
    }

    #[test]
    fn test_resize_box_checkerboard() {
        let mut src = RgbaImage::new(4, 4);
        for y in 0..4 {
            for x in 0..4 {
                let v = if (x + y) % 2 == 0 { 0 } else { 255 };
                src.set_pixel(x, y, [v, v, v, 255]);
            }
        }
        let dst = exec().resize(&src, 2, 2, &Filter::Box).unwrap();
        assert_eq!(dst.dimensions(), (2, 2));
        for (_, _, px) in dst.pixels() {
            assert_eq!(px, [128, 128, 128, 255]);
        }
    }

    #[test]
    fn test_resize_alpha_resampled_like_color() {
        let mut src = RgbaImage::new(2, 1);
        src.set_pixel(0, 0, [255, 255, 255, 0]);
        src.set_pixel(1, 0, [255, 255, 255, 255]);
        let dst = exec().resize(&src, 1, 1, &Filter::Box).unwrap();
        assert_eq!(dst.pixel(0, 0), [255, 255, 255, 128]);
    }

    #[test]
    fn test_resize_infers_dimension() {
        let src = RgbaImage::new(300, 200);
        let e = exec();
        assert_eq!(e.resize(&src, 150, 0, &Filter::Box).unwrap().dimensions(), (150, 100));
        assert_eq!(e.resize(&src, 0, 50, &Filter::Box).unwrap().dimensions(), (75, 50));
    }

    #[test]
    fn test_resize_invalid_dimensions() {
        let src = RgbaImage::new(8, 8);
        let e = exec();
        assert!(matches!(e.resize(&src, 0, 0, &Filter::Box), Err(OpsError::InvalidDimension(_))));
        assert!(matches!(
            e.resize(&RgbaImage::new(0, 0), 4, 4, &Filter::Box),
            Err(OpsError::InvalidDimension(_))
        ));
        // 1000x1 -> height inferred for width 1 rounds to 0.
        assert!(matches!(
            e.resize(&RgbaImage::new(1000, 1), 1, 0, &Filter::Box),
            Err(OpsError::InvalidDimension(_))
        ));
    }

    #[test]
    fn test_resize_degenerate_filter() {
        let bad = Filter::Custom(CustomFilter::new(1.0, |_| 0.0).unwrap());
        let src = RgbaImage::new(8, 8);
        assert!(matches!(exec().resize(&src, 4, 4, &bad), Err(OpsError::DegenerateFilter(_))));
    }

    #[test]
    fn test_resize_oversized_custom_support() {
        let huge = Filter::Custom(CustomFilter::new(1e300, |_| 1.0).unwrap());
        let src = gradient(8, 8);
        assert!(matches!(exec().resize(&src, 4, 4, &huge), Err(OpsError::InvalidParameter(_))));
        assert!(matches!(exec().thumbnail(&src, 3, 5, &huge), Err(OpsError::InvalidParameter(_))));
    }

    #[test]
    fn test_resize_custom_filter() {
        let tent = Filter::Custom(CustomFilter::new(1.0, |x| 1.0 - x.abs()).unwrap());
        let src = gradient(20, 10);
        let a = exec().resize(&src, 7, 5, &tent).unwrap();
        let b = exec().resize(&src, 7, 5, &Filter::Linear).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_fit_dimensions() {
        // Wide image into square box
        assert_eq!(fit_dimensions(1920, 1080, 640, 640), (640, 360));
        // Tall image into square box
        assert_eq!(fit_dimensions(1080, 1920, 640, 640), (360, 640));
        // Same aspect, larger box
        assert_eq!(fit_dimensions(320, 240, 640, 480), (640, 480));
        // Extreme aspect keeps at least one pixel
        assert_eq!(fit_dimensions(10000, 1, 100, 100), (100, 1));
    }

    #[test]
    fn test_fill_dimensions() {
        // Wide image to fill square
        assert_eq!(fill_dimensions(1920, 1080, 640, 640), (1138, 640));
        // Tall image to fill square
        assert_eq!(fill_dimensions(1080, 1920, 640, 640), (640, 1138));
    }

    #[test]
    fn test_fit_never_upscales() {
        let src = gradient(40, 30);
        let e = exec();
        assert_eq!(e.fit(&src, 40, 30, &Filter::Lanczos(3)).unwrap(), src);
        assert_eq!(e.fit(&src, 400, 31, &Filter::Lanczos(3)).unwrap(), src);
        let small = e.fit(&src, 20, 20, &Filter::Lanczos(3)).unwrap();
        assert_eq!(small.dimensions(), (20, 15));
        assert!(matches!(e.fit(&src, 0, 10, &Filter::Box), Err(OpsError::InvalidDimension(_))));
    }

    #[test]
    fn test_thumbnail_exact_size() {
        let e = exec();
        for (w, h) in [(300, 100), (100, 300), (100, 100), (37, 91), (10, 10)] {
            let src = gradient(w, h);
            let thumb = e.thumbnail(&src, 64, 48, &Filter::CatmullRom).unwrap();
            assert_eq!(thumb.dimensions(), (64, 48), "{w}x{h}");
        }
        assert!(matches!(
            e.thumbnail(&gradient(4, 4), 0, 4, &Filter::Box),
            Err(OpsError::InvalidDimension(_))
        ));
    }

    #[test]
    fn test_thumbnail_center_crop() {
        // Left third red, middle green, right third blue; square crop keeps green.
        let mut src = RgbaImage::new(30, 10);
        for y in 0..10 {
            for x in 0..30 {
                let px = match x / 10 {
                    0 => [255, 0, 0, 255],
                    1 => [0, 255, 0, 255],
                    _ => [0, 0, 255, 255],
                };
                src.set_pixel(x, y, px);
            }
        }
        let thumb = exec().thumbnail(&src, 10, 10, &Filter::NearestNeighbor).unwrap();
        assert!(thumb.pixels().all(|(_, _, px)| px == [0, 255, 0, 255]));
    }

    #[test]
    fn test_source_not_mutated() {
        let src = gradient(16, 16);
        let before = src.clone();
        let _ = exec().resize(&src, 5, 7, &Filter::MitchellNetravali).unwrap();
        assert_eq!(src, before);
    }
}
