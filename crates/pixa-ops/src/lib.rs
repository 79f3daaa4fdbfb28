//! # pixa-ops
//!
//! Resampling and convolution operations on [`pixa_core::RgbaImage`].
//!
//! Every operation reads an immutable source image and returns a newly
//! allocated one. Work is split by output rows across a Rayon pool; the
//! result is identical for any number of workers.
//!
//! # Modules
//!
//! - [`kernel`] - Resampling filter catalog and custom kernels
//! - [`weights`] - Per-axis weight tables
//! - [`resize`] - Resize, fit and thumbnail
//! - [`filter`] - Gaussian blur and unsharp-mask sharpening
//! - [`parallel`] - Row-parallel executor
//!
//! # Example
//!
//! ```rust
//! use pixa_core::RgbaImage;
//! use pixa_ops::{resize, thumbnail, blur, Filter};
//!
//! let src = RgbaImage::filled(320, 240, [200, 100, 50, 255]);
//! let half = resize(&src, 160, 0, &Filter::Lanczos(3)).unwrap();
//! assert_eq!(half.dimensions(), (160, 120));
//!
//! let thumb = thumbnail(&src, 64, 64, &Filter::CatmullRom).unwrap();
//! assert_eq!(thumb.dimensions(), (64, 64));
//!
//! let soft = blur(&src, 2.0).unwrap();
//! assert_eq!(soft, src);
//! ```
//!
//! # Thread Pool
//!
//! The free functions run on a process-wide pool sized to the machine.
//! Configure it once at startup, or build a dedicated [`Executor`]:
//!
//! ```rust,ignore
//! use pixa_ops::{Executor, ExecutorConfig};
//!
//! Executor::init_global(ExecutorConfig::with_threads(4))?;
//!
//! let exec = Executor::new(ExecutorConfig::with_threads(1))?;
//! let out = exec.resize(&image, 800, 0, &Filter::default())?;
//! ```

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

mod error;
pub mod filter;
pub mod kernel;
pub mod parallel;
pub mod resize;
pub mod weights;

pub use error::{OpsError, OpsResult};
pub use filter::{GaussianKernel, UnsharpMask, blur, sharpen, unsharp_mask};
pub use kernel::{CustomFilter, Filter};
pub use parallel::{Executor, ExecutorConfig};
pub use resize::{fit, resize, thumbnail};
