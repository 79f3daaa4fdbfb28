//! Resampling filter catalog.
//!
//! Every filter is a continuous weighting function `k(x)` plus a support
//! radius `r`; the weight is zero outside `[-r, r]`.
//!
//! # Filters
//!
//! | Filter                          | Radius | Notes                            |
//! |---------------------------------|--------|----------------------------------|
//! | [`Filter::NearestNeighbor`]     | 0.5    | Picks one tap, blocky            |
//! | [`Filter::Box`]                 | 0.5    | Area average when minifying      |
//! | [`Filter::Linear`]              | 1      | Triangle / bilinear              |
//! | [`Filter::Hermite`]             | 2      | Cubic, B=0 C=0                   |
//! | [`Filter::MitchellNetravali`]   | 2      | Cubic, B=1/3 C=1/3               |
//! | [`Filter::CatmullRom`]          | 2      | Cubic, B=0 C=1/2                 |
//! | [`Filter::BSpline`]             | 2      | Cubic, B=1 C=0 (very smooth)     |
//! | [`Filter::Gaussian`]            | 2      | `exp(-2x^2)`                     |
//! | [`Filter::Lanczos`] and friends | `a`    | Windowed sinc, default `a = 3`   |
//! | [`Filter::Custom`]              | any    | Caller-supplied kernel           |
//!
//! # Example
//!
//! ```rust
//! use pixa_ops::kernel::Filter;
//!
//! let f: Filter = "catmull-rom".parse().unwrap();
//! assert_eq!(f, Filter::CatmullRom);
//!
//! let lanczos = Filter::Lanczos(3).resolve().unwrap();
//! assert!((lanczos.weight(0.0) - 1.0).abs() < 1e-12);
//! assert_eq!(lanczos.weight(3.5), 0.0);
//! ```

use std::f64::consts::PI;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use crate::{OpsError, OpsResult};

/// Radius used by the windowed-sinc filters when none is given.
pub const DEFAULT_SINC_RADIUS: u32 = 3;

/// Kernel function signature shared by named and custom filters.
pub type KernelFn = dyn Fn(f64) -> f64 + Send + Sync;

/// Caller-supplied resampling kernel.
///
/// # Example
///
/// ```rust
/// use pixa_ops::kernel::{CustomFilter, Filter};
///
/// let tent = CustomFilter::new(1.0, |x| 1.0 - x.abs()).unwrap();
/// let filter = Filter::Custom(tent);
/// assert_eq!(filter.name(), "custom");
/// ```
#[derive(Clone)]
pub struct CustomFilter {
    radius: f64,
    kernel: Arc<KernelFn>,
}

impl CustomFilter {
    /// Wraps `kernel` with support radius `radius`.
    ///
    /// # Errors
    ///
    /// [`OpsError::InvalidParameter`] if `radius` is not finite and positive.
    pub fn new<F>(radius: f64, kernel: F) -> OpsResult<Self>
    where
        F: Fn(f64) -> f64 + Send + Sync + 'static,
    {
        if !radius.is_finite() || radius <= 0.0 {
            return Err(OpsError::InvalidParameter(format!(
                "custom filter radius must be finite and > 0, got {radius}"
            )));
        }
        Ok(Self {
            radius,
            kernel: Arc::new(kernel),
        })
    }

    /// Support radius.
    #[inline]
    pub fn radius(&self) -> f64 {
        self.radius
    }
}

impl fmt::Debug for CustomFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CustomFilter")
            .field("radius", &self.radius)
            .finish_non_exhaustive()
    }
}

impl PartialEq for CustomFilter {
    fn eq(&self, other: &Self) -> bool {
        self.radius == other.radius && Arc::ptr_eq(&self.kernel, &other.kernel)
    }
}

/// Resampling filter for resize operations.
///
/// Windowed-sinc variants carry their radius (lobes).
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Filter {
    /// Nearest-neighbor (fastest, no interpolation).
    NearestNeighbor,
    /// Box filter, averages the covered source pixels.
    Box,
    /// Linear (triangle) interpolation.
    Linear,
    /// Hermite cubic.
    Hermite,
    /// Mitchell-Netravali cubic (B=1/3, C=1/3).
    MitchellNetravali,
    /// Catmull-Rom cubic spline (B=0, C=1/2).
    #[default]
    CatmullRom,
    /// Cubic B-spline (B=1, C=0).
    BSpline,
    /// Gaussian resampling kernel.
    Gaussian,
    /// Lanczos: sinc windowed by sinc.
    Lanczos(u32),
    /// Sinc with a Hann window.
    Hann(u32),
    /// Sinc with a Hamming window.
    Hamming(u32),
    /// Sinc with a Blackman window.
    Blackman(u32),
    /// Sinc with a Bartlett (triangle) window.
    Bartlett(u32),
    /// Sinc with a Welch (parabolic) window.
    Welch(u32),
    /// Sinc with a cosine window.
    Cosine(u32),
    /// Caller-supplied kernel.
    Custom(CustomFilter),
}

/// Named filters, keyed by their canonical lowercase name.
pub static CATALOG: [(&str, Filter); 15] = [
    ("nearest", Filter::NearestNeighbor),
    ("box", Filter::Box),
    ("linear", Filter::Linear),
    ("hermite", Filter::Hermite),
    ("mitchell", Filter::MitchellNetravali),
    ("catmullrom", Filter::CatmullRom),
    ("bspline", Filter::BSpline),
    ("gaussian", Filter::Gaussian),
    ("lanczos", Filter::Lanczos(DEFAULT_SINC_RADIUS)),
    ("hann", Filter::Hann(DEFAULT_SINC_RADIUS)),
    ("hamming", Filter::Hamming(DEFAULT_SINC_RADIUS)),
    ("blackman", Filter::Blackman(DEFAULT_SINC_RADIUS)),
    ("bartlett", Filter::Bartlett(DEFAULT_SINC_RADIUS)),
    ("welch", Filter::Welch(DEFAULT_SINC_RADIUS)),
    ("cosine", Filter::Cosine(DEFAULT_SINC_RADIUS)),
];

impl Filter {
    /// Looks up a filter by name.
    ///
    /// Matching ignores case, `-`, `_` and spaces. Windowed-sinc names accept
    /// a radius suffix (`"lanczos5"`).
    ///
    /// # Errors
    ///
    /// [`OpsError::InvalidParameter`] for an unknown name.
    pub fn from_name(name: &str) -> OpsResult<Self> {
        let key: String = name
            .chars()
            .filter(|&c| !matches!(c, '-' | '_' | ' '))
            .flat_map(char::to_lowercase)
            .collect();

        let digits = key.len() - key.trim_end_matches(|c: char| c.is_ascii_digit()).len();
        let (base, suffix) = key.split_at(key.len() - digits);
        let base = match base {
            "nearestneighbor" | "nearestneighbour" | "point" => "nearest",
            "mitchellnetravali" => "mitchell",
            "bilinear" | "triangle" | "tent" => "linear",
            "catrom" => "catmullrom",
            other => other,
        };

        let unknown = || OpsError::InvalidParameter(format!("unknown filter: {name:?}"));
        let filter = CATALOG
            .iter()
            .find(|(n, _)| *n == base)
            .map(|(_, f)| f.clone())
            .ok_or_else(unknown)?;

        if suffix.is_empty() {
            return Ok(filter);
        }
        let radius: u32 = suffix.parse().map_err(|_| unknown())?;
        filter.with_radius(radius).ok_or_else(unknown)
    }

    /// Returns the same window with another radius, or `None` if this is not
    /// a windowed-sinc filter.
    pub fn with_radius(&self, radius: u32) -> Option<Self> {
        Some(match self {
            Filter::Lanczos(_) => Filter::Lanczos(radius),
            Filter::Hann(_) => Filter::Hann(radius),
            Filter::Hamming(_) => Filter::Hamming(radius),
            Filter::Blackman(_) => Filter::Blackman(radius),
            Filter::Bartlett(_) => Filter::Bartlett(radius),
            Filter::Welch(_) => Filter::Welch(radius),
            Filter::Cosine(_) => Filter::Cosine(radius),
            _ => return None,
        })
    }

    /// Canonical catalog name (`"custom"` for [`Filter::Custom`]).
    pub fn name(&self) -> &'static str {
        match self {
            Filter::NearestNeighbor => "nearest",
            Filter::Box => "box",
            Filter::Linear => "linear",
            Filter::Hermite => "hermite",
            Filter::MitchellNetravali => "mitchell",
            Filter::CatmullRom => "catmullrom",
            Filter::BSpline => "bspline",
            Filter::Gaussian => "gaussian",
            Filter::Lanczos(_) => "lanczos",
            Filter::Hann(_) => "hann",
            Filter::Hamming(_) => "hamming",
            Filter::Blackman(_) => "blackman",
            Filter::Bartlett(_) => "bartlett",
            Filter::Welch(_) => "welch",
            Filter::Cosine(_) => "cosine",
            Filter::Custom(_) => "custom",
        }
    }

    /// Returns the support radius for this filter.
    #[inline]
    pub fn support(&self) -> f64 {
        match self {
            Filter::NearestNeighbor | Filter::Box => 0.5,
            Filter::Linear => 1.0,
            Filter::Hermite
            | Filter::MitchellNetravali
            | Filter::CatmullRom
            | Filter::BSpline
            | Filter::Gaussian => 2.0,
            Filter::Lanczos(a)
            | Filter::Hann(a)
            | Filter::Hamming(a)
            | Filter::Blackman(a)
            | Filter::Bartlett(a)
            | Filter::Welch(a)
            | Filter::Cosine(a) => f64::from(*a),
            Filter::Custom(c) => c.radius,
        }
    }

    /// Resolves the variant into a concrete kernel and radius.
    ///
    /// Dispatch on the variant happens here, once per operation.
    ///
    /// # Errors
    ///
    /// [`OpsError::InvalidParameter`] for a windowed-sinc radius of zero.
    pub fn resolve(&self) -> OpsResult<ResampleFilter> {
        let kernel: Arc<KernelFn> = match self {
            Filter::NearestNeighbor => Arc::new(nearest),
            Filter::Box => Arc::new(box_kernel),
            Filter::Linear => Arc::new(linear),
            Filter::Hermite => Arc::new(|x| bc_spline(x, 0.0, 0.0)),
            Filter::MitchellNetravali => Arc::new(|x| bc_spline(x, 1.0 / 3.0, 1.0 / 3.0)),
            Filter::CatmullRom => Arc::new(|x| bc_spline(x, 0.0, 0.5)),
            Filter::BSpline => Arc::new(|x| bc_spline(x, 1.0, 0.0)),
            Filter::Gaussian => Arc::new(gaussian),
            Filter::Lanczos(a) => windowed(*a, lanczos_window)?,
            Filter::Hann(a) => windowed(*a, hann_window)?,
            Filter::Hamming(a) => windowed(*a, hamming_window)?,
            Filter::Blackman(a) => windowed(*a, blackman_window)?,
            Filter::Bartlett(a) => windowed(*a, bartlett_window)?,
            Filter::Welch(a) => windowed(*a, welch_window)?,
            Filter::Cosine(a) => windowed(*a, cosine_window)?,
            Filter::Custom(c) => Arc::clone(&c.kernel),
        };
        Ok(ResampleFilter {
            radius: self.support(),
            kernel,
        })
    }
}

impl fmt::Display for Filter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Filter::Lanczos(a)
            | Filter::Hann(a)
            | Filter::Hamming(a)
            | Filter::Blackman(a)
            | Filter::Bartlett(a)
            | Filter::Welch(a)
            | Filter::Cosine(a) => write!(f, "{}{}", self.name(), a),
            _ => f.write_str(self.name()),
        }
    }
}

impl FromStr for Filter {
    type Err = OpsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_name(s)
    }
}

/// A resolved filter: kernel function plus support radius.
#[derive(Clone)]
pub struct ResampleFilter {
    radius: f64,
    kernel: Arc<KernelFn>,
}

impl ResampleFilter {
    /// Support radius.
    #[inline]
    pub fn radius(&self) -> f64 {
        self.radius
    }

    /// Evaluates the kernel at `x`. Zero outside `[-radius, radius]`; the
    /// kernel function is not invoked there.
    #[inline]
    pub fn weight(&self, x: f64) -> f64 {
        if x.abs() > self.radius {
            0.0
        } else {
            (self.kernel)(x)
        }
    }
}

impl fmt::Debug for ResampleFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResampleFilter")
            .field("radius", &self.radius)
            .finish_non_exhaustive()
    }
}

#[inline]
fn sinc(x: f64) -> f64 {
    if x == 0.0 {
        1.0
    } else {
        let pi_x = PI * x;
        pi_x.sin() / pi_x
    }
}

/// Half-open so that a sample exactly between two pixels picks one of them.
#[inline]
fn nearest(x: f64) -> f64 {
    if (-0.5..0.5).contains(&x) { 1.0 } else { 0.0 }
}

#[inline]
fn box_kernel(x: f64) -> f64 {
    if x.abs() <= 0.5 { 1.0 } else { 0.0 }
}

#[inline]
fn linear(x: f64) -> f64 {
    let ax = x.abs();
    if ax < 1.0 { 1.0 - ax } else { 0.0 }
}

#[inline]
fn gaussian(x: f64) -> f64 {
    if x.abs() < 2.0 { (-2.0 * x * x).exp() } else { 0.0 }
}

/// Mitchell-Netravali two-piece cubic with parameters B and C.
#[inline]
fn bc_spline(x: f64, b: f64, c: f64) -> f64 {
    let ax = x.abs();
    if ax < 1.0 {
        ((12.0 - 9.0 * b - 6.0 * c) * ax * ax * ax
            + (-18.0 + 12.0 * b + 6.0 * c) * ax * ax
            + (6.0 - 2.0 * b))
            / 6.0
    } else if ax < 2.0 {
        ((-b - 6.0 * c) * ax * ax * ax
            + (6.0 * b + 30.0 * c) * ax * ax
            + (-12.0 * b - 48.0 * c) * ax
            + (8.0 * b + 24.0 * c))
            / 6.0
    } else {
        0.0
    }
}

type Window = fn(f64, f64) -> f64;

fn windowed(radius: u32, window: Window) -> OpsResult<Arc<KernelFn>> {
    if radius == 0 {
        return Err(OpsError::InvalidParameter(
            "windowed sinc radius must be > 0".into(),
        ));
    }
    let a = f64::from(radius);
    let kernel: Arc<KernelFn> = Arc::new(move |x: f64| {
        if x.abs() < a { sinc(x) * window(x, a) } else { 0.0 }
    });
    Ok(kernel)
}

fn lanczos_window(x: f64, a: f64) -> f64 {
    sinc(x / a)
}

fn hann_window(x: f64, a: f64) -> f64 {
    0.5 + 0.5 * (PI * x / a).cos()
}

fn hamming_window(x: f64, a: f64) -> f64 {
    0.54 + 0.46 * (PI * x / a).cos()
}

fn blackman_window(x: f64, a: f64) -> f64 {
    0.42 - 0.5 * (PI * x / a + PI).cos() + 0.08 * (2.0 * PI * x / a).cos()
}

fn bartlett_window(x: f64, a: f64) -> f64 {
    (a - x.abs()) / a
}

fn welch_window(x: f64, a: f64) -> f64 {
    1.0 - (x * x) / (a * a)
}

fn cosine_window(x: f64, a: f64) -> f64 {
    (PI / 2.0 * (x / a)).cos()
}
