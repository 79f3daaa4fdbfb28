//! # pixa-core
//!
//! Core types for the pixa image-transform crates.
//!
//! - [`RgbaImage`] - Owned 8-bit RGBA pixel buffer, row-major, non-premultiplied
//! - [`Error`] / [`Result`] - Buffer-level error handling
//!
//! ## Crate Structure
//!
//! This crate has no internal dependencies. Every other pixa crate consumes
//! and produces [`RgbaImage`] values:
//!
//! ```text
//! pixa-core (this crate)
//!    ^
//!    |
//!    +-- pixa-ops (resize, fit, thumbnail, blur, sharpen)
//! ```

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

pub mod error;
pub mod image;

pub use error::{Error, Result};
pub use image::{CHANNELS, RgbaImage};

/// Prelude module for convenient imports.
///
/// ```
/// use pixa_core::prelude::*;
/// ```
pub mod prelude {
    pub use crate::error::{Error, Result};
    pub use crate::image::{CHANNELS, RgbaImage};
}
