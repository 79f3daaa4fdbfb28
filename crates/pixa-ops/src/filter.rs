//! Gaussian blur and unsharp-mask sharpening.
//!
//! Both operations run a separable convolution: a horizontal pass into an
//! `f32` intermediate, then a vertical pass back to 8 bits. Taps that fall
//! outside the image reuse the nearest edge pixel.
//!
//! # Example
//!
//! ```rust
//! use pixa_core::RgbaImage;
//! use pixa_ops::filter::{blur, sharpen};
//!
//! let src = RgbaImage::filled(16, 16, [128, 64, 32, 255]);
//! let blurred = blur(&src, 1.5).unwrap();
//! let sharp = sharpen(&src, 1.0).unwrap();
//! assert_eq!(blurred, src);
//! assert_eq!(sharp.dimensions(), (16, 16));
//! ```

use pixa_core::{CHANNELS, RgbaImage};
use tracing::{debug, trace};

use crate::parallel::Executor;
use crate::{OpsError, OpsResult};

/// Largest Gaussian kernel half-width, in taps.
pub const MAX_GAUSSIAN_RADIUS: usize = 1 << 20;

/// Rounds to the nearest integer and clamps into `[0, 255]`.
#[inline]
pub(crate) fn quantize(v: f64) -> u8 {
    v.round().clamp(0.0, 255.0) as u8
}

/// Edge-clamped index into `[0, len)`.
#[inline]
fn clamp_index(i: isize, len: usize) -> usize {
    i.clamp(0, len as isize - 1) as usize
}

/// Normalized 1-D Gaussian kernel.
///
/// Holds `2 * ceil(3 * sigma) + 1` samples of `exp(-x^2 / (2 sigma^2))` at
/// integer offsets, scaled to sum to 1.
#[derive(Debug, Clone, PartialEq)]
pub struct GaussianKernel {
    sigma: f64,
    weights: Vec<f64>,
}

impl GaussianKernel {
    /// Builds the kernel for `sigma`.
    ///
    /// # Errors
    ///
    /// [`OpsError::InvalidParameter`] unless `sigma` is finite and `> 0`,
    /// or if `ceil(3 * sigma)` exceeds [`MAX_GAUSSIAN_RADIUS`].
    ///
    /// # Example
    ///
    /// ```rust
    /// use pixa_ops::filter::GaussianKernel;
    ///
    /// let k = GaussianKernel::new(1.0).unwrap();
    /// assert_eq!(k.weights().len(), 7);
    /// assert_eq!(k.radius(), 3);
    /// ```
    pub fn new(sigma: f64) -> OpsResult<Self> {
        if !sigma.is_finite() || sigma <= 0.0 {
            return Err(OpsError::InvalidParameter(format!(
                "sigma must be finite and > 0, got {sigma}"
            )));
        }

        let radius = (3.0 * sigma).ceil();
        if radius > MAX_GAUSSIAN_RADIUS as f64 {
            return Err(OpsError::InvalidParameter(format!(
                "sigma {sigma} needs a kernel radius of {radius}, limit is {MAX_GAUSSIAN_RADIUS}"
            )));
        }
        let radius = radius as isize;
        let mut weights: Vec<f64> = (-radius..=radius)
            .map(|x| (-0.5 * (x as f64 / sigma).powi(2)).exp())
            .collect();

        let sum: f64 = weights.iter().sum();
        for w in &mut weights {
            *w /= sum;
        }

        Ok(Self { sigma, weights })
    }

    /// Standard deviation the kernel was built for.
    #[inline]
    pub fn sigma(&self) -> f64 {
        self.sigma
    }

    /// Kernel weights, index `radius()` is the center tap.
    #[inline]
    pub fn weights(&self) -> &[f64] {
        &self.weights
    }

    /// Half-width of the kernel.
    #[inline]
    pub fn radius(&self) -> usize {
        self.weights.len() / 2
    }
}

/// Unsharp-mask parameters.
///
/// Output is `orig + amount * (orig - blurred)` wherever
/// `|orig - blurred| > threshold`, and `orig` elsewhere.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UnsharpMask {
    /// Blur sigma.
    pub sigma: f64,
    /// Strength; `1.0` adds the full detail layer once.
    pub amount: f64,
    /// Minimum per-channel difference that gets sharpened.
    pub threshold: u8,
}

impl UnsharpMask {
    /// Unit amount, zero threshold.
    pub fn new(sigma: f64) -> Self {
        Self {
            sigma,
            amount: 1.0,
            threshold: 0,
        }
    }

    /// Sets the strength.
    pub fn amount(mut self, amount: f64) -> Self {
        self.amount = amount;
        self
    }

    /// Sets the noise threshold.
    pub fn threshold(mut self, threshold: u8) -> Self {
        self.threshold = threshold;
        self
    }
}

/// Horizontal pass of one row: 8-bit source row into `f32` output row.
fn convolve_row(src_row: &[u8], width: usize, kernel: &GaussianKernel, out: &mut [f32]) {
    let radius = kernel.radius() as isize;
    for x in 0..width {
        let mut acc = [0.0f64; CHANNELS];
        for (k, &kw) in kernel.weights().iter().enumerate() {
            let sx = clamp_index(x as isize + k as isize - radius, width);
            let px = &src_row[sx * CHANNELS..sx * CHANNELS + CHANNELS];
            for c in 0..CHANNELS {
                acc[c] += kw * f64::from(px[c]);
            }
        }
        for c in 0..CHANNELS {
            out[x * CHANNELS + c] = acc[c] as f32;
        }
    }
}

/// Vertical pass producing destination row `y` from the intermediate buffer.
fn convolve_column(
    temp: &[f32],
    row_len: usize,
    height: usize,
    y: usize,
    kernel: &GaussianKernel,
    out: &mut [u8],
) {
    let radius = kernel.radius() as isize;
    let mut acc = vec![0.0f64; row_len];
    for (k, &kw) in kernel.weights().iter().enumerate() {
        let sy = clamp_index(y as isize + k as isize - radius, height);
        let src = &temp[sy * row_len..(sy + 1) * row_len];
        for (a, &v) in acc.iter_mut().zip(src) {
            *a += kw * f64::from(v);
        }
    }
    for (o, a) in out.iter_mut().zip(acc) {
        *o = quantize(a);
    }
}

impl Executor {
    /// Gaussian blur on this executor's pool. See [`blur`].
    pub fn blur(&self, src: &RgbaImage, sigma: f64) -> OpsResult<RgbaImage> {
        let kernel = GaussianKernel::new(sigma)?;
        if src.is_empty() {
            return Ok(src.clone());
        }

        let (width, height) = (src.width() as usize, src.height() as usize);
        let row_len = src.row_len();
        debug!(width, height, sigma, taps = kernel.weights().len(), "blur");

        let mut temp = vec![0.0f32; row_len * height];
        self.for_each_row(&mut temp, row_len, |y, row| {
            convolve_row(src.row(y as u32), width, &kernel, row);
            Ok(())
        })?;

        let mut out = vec![0u8; row_len * height];
        self.for_each_row(&mut out, row_len, |y, row| {
            convolve_column(&temp, row_len, height, y, &kernel, row);
            Ok(())
        })?;

        Ok(RgbaImage::from_raw(src.width(), src.height(), out)?)
    }

    /// Unit-amount unsharp mask on this executor's pool. See [`sharpen`].
    pub fn sharpen(&self, src: &RgbaImage, sigma: f64) -> OpsResult<RgbaImage> {
        self.unsharp_mask(src, UnsharpMask::new(sigma))
    }

    /// Unsharp mask on this executor's pool. See [`unsharp_mask`].
    pub fn unsharp_mask(&self, src: &RgbaImage, params: UnsharpMask) -> OpsResult<RgbaImage> {
        if !params.amount.is_finite() || params.amount < 0.0 {
            return Err(OpsError::InvalidParameter(format!(
                "unsharp amount must be finite and >= 0, got {}",
                params.amount
            )));
        }
        let blurred = self.blur(src, params.sigma)?;
        if src.is_empty() {
            return Ok(blurred);
        }
        trace!(amount = params.amount, threshold = params.threshold, "unsharp mask");

        let row_len = src.row_len();
        let threshold = f64::from(params.threshold);
        let mut out = vec![0u8; src.data().len()];
        self.for_each_row(&mut out, row_len, |y, row| {
            let orig = src.row(y as u32);
            let soft = blurred.row(y as u32);
            for ((o, &a), &b) in row.iter_mut().zip(orig).zip(soft) {
                let diff = f64::from(a) - f64::from(b);
                *o = if diff.abs() > threshold {
                    quantize(f64::from(a) + params.amount * diff)
                } else {
                    a
                };
            }
            Ok(())
        })?;

        Ok(RgbaImage::from_raw(src.width(), src.height(), out)?)
    }
}

/// Blurs `src` with a Gaussian of standard deviation `sigma`.
///
/// Output has the same dimensions as `src`.
///
/// # Errors
///
/// [`OpsError::InvalidParameter`] unless `sigma` is finite and `> 0`, or
/// if the kernel would exceed [`MAX_GAUSSIAN_RADIUS`].
pub fn blur(src: &RgbaImage, sigma: f64) -> OpsResult<RgbaImage> {
    Executor::global()?.blur(src, sigma)
}

/// Sharpens `src`: `clamp(orig + (orig - blur(orig, sigma)), 0, 255)`.
///
/// # Errors
///
/// Same as [`blur`].
pub fn sharpen(src: &RgbaImage, sigma: f64) -> OpsResult<RgbaImage> {
    Executor::global()?.sharpen(src, sigma)
}

/// Unsharp mask with explicit amount and threshold.
///
/// # Example
///
/// ```rust
/// use pixa_core::RgbaImage;
/// use pixa_ops::filter::{unsharp_mask, UnsharpMask};
///
/// let src = RgbaImage::filled(8, 8, [10, 20, 30, 255]);
/// let out = unsharp_mask(&src, UnsharpMask::new(2.0).amount(0.5).threshold(4)).unwrap();
/// assert_eq!(out, src);
/// ```
pub fn unsharp_mask(src: &RgbaImage, params: UnsharpMask) -> OpsResult<RgbaImage> {
    Executor::global()?.unsharp_mask(src, params)
}
