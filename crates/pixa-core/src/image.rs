//! RGBA pixel buffer shared by every pixa operation.
//!
//! # Memory Layout
//!
//! Pixels are stored **row-major**, top-to-bottom, with no row padding.
//! Each pixel is four 8-bit channels, not premultiplied:
//!
//! ```text
//! Memory: [R G B A R G B A ...]  <- Row 0
//!         [R G B A R G B A ...]  <- Row 1
//!         ...
//! ```
//!
//! # Ownership
//!
//! An [`RgbaImage`] owns its bytes exclusively. Operations never mutate their
//! input: they allocate a fresh buffer and hand it to the caller.
//!
//! # Usage
//!
//! ```rust
//! use pixa_core::RgbaImage;
//!
//! let mut img = RgbaImage::new(64, 32);
//! img.set_pixel(10, 5, [255, 0, 0, 255]);
//! assert_eq!(img.pixel(10, 5), [255, 0, 0, 255]);
//! assert_eq!(img.data().len(), 64 * 32 * 4);
//! ```

use crate::{Error, Result};

/// Number of channels in every pixel (R, G, B, A).
pub const CHANNELS: usize = 4;

/// Owned 8-bit RGBA image buffer.
///
/// Invariant: `data.len() == width * height * 4`.
#[derive(Clone, PartialEq, Eq, Default)]
pub struct RgbaImage {
    width: u32,
    height: u32,
    data: Vec<u8>,
}

impl std::fmt::Debug for RgbaImage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RgbaImage")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("bytes", &self.data.len())
            .finish()
    }
}

/// Byte length of a `width x height` RGBA buffer, or `None` on overflow.
#[inline]
fn buffer_len(width: u32, height: u32) -> Option<usize> {
    (width as usize)
        .checked_mul(height as usize)
        .and_then(|n| n.checked_mul(CHANNELS))
}

impl RgbaImage {
    /// Creates a transparent black image.
    ///
    /// # Panics
    ///
    /// Panics if `width * height * 4` overflows `usize`.
    ///
    /// # Example
    ///
    /// ```rust
    /// use pixa_core::RgbaImage;
    ///
    /// let img = RgbaImage::new(1920, 1080);
    /// assert_eq!(img.dimensions(), (1920, 1080));
    /// ```
    pub fn new(width: u32, height: u32) -> Self {
        let len = buffer_len(width, height).expect("image size overflows usize");
        Self {
            width,
            height,
            data: vec![0; len],
        }
    }

    /// Creates an image where every pixel is `pixel`.
    ///
    /// # Example
    ///
    /// ```rust
    /// use pixa_core::RgbaImage;
    ///
    /// let white = RgbaImage::filled(8, 8, [255, 255, 255, 255]);
    /// assert_eq!(white.pixel(7, 7), [255, 255, 255, 255]);
    /// ```
    pub fn filled(width: u32, height: u32, pixel: [u8; CHANNELS]) -> Self {
        let mut img = Self::new(width, height);
        img.fill(pixel);
        img
    }

    /// Wraps existing RGBA bytes.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidDimensions`] if `data.len() != width * height * 4`.
    ///
    /// # Example
    ///
    /// ```rust
    /// use pixa_core::RgbaImage;
    ///
    /// let img = RgbaImage::from_raw(2, 1, vec![0u8; 8]).unwrap();
    /// assert_eq!(img.width(), 2);
    /// assert!(RgbaImage::from_raw(2, 2, vec![0u8; 8]).is_err());
    /// ```
    pub fn from_raw(width: u32, height: u32, data: Vec<u8>) -> Result<Self> {
        let expected = buffer_len(width, height)
            .ok_or_else(|| Error::invalid_dimensions(width, height, "buffer size overflows"))?;
        if data.len() != expected {
            return Err(Error::invalid_dimensions(
                width,
                height,
                format!("expected {} bytes, got {}", expected, data.len()),
            ));
        }
        Ok(Self {
            width,
            height,
            data,
        })
    }

    /// Returns the image width in pixels.
    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Returns the image height in pixels.
    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Returns the image dimensions as (width, height).
    #[inline]
    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Returns the number of bytes in one row.
    #[inline]
    pub fn row_len(&self) -> usize {
        self.width as usize * CHANNELS
    }

    /// Returns the total number of pixels.
    #[inline]
    pub fn pixel_count(&self) -> usize {
        self.width as usize * self.height as usize
    }

    /// Returns `true` if the image has zero area.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Returns the raw RGBA bytes.
    #[inline]
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Returns the raw RGBA bytes mutably.
    #[inline]
    pub fn data_mut(&mut self) -> &mut [u8] {
        &mut self.data
    }

    /// Consumes the image and returns its bytes.
    #[inline]
    pub fn into_raw(self) -> Vec<u8> {
        self.data
    }

    #[inline]
    fn pixel_offset(&self, x: u32, y: u32) -> usize {
        (y as usize * self.width as usize + x as usize) * CHANNELS
    }

    /// Returns the pixel at (x, y).
    ///
    /// # Panics
    ///
    /// Panics if (x, y) is out of bounds.
    #[inline]
    pub fn pixel(&self, x: u32, y: u32) -> [u8; CHANNELS] {
        assert!(x < self.width && y < self.height, "pixel out of bounds");
        let offset = self.pixel_offset(x, y);
        let mut px = [0u8; CHANNELS];
        px.copy_from_slice(&self.data[offset..offset + CHANNELS]);
        px
    }

    /// Returns the pixel at (x, y), or [`Error::OutOfBounds`].
    #[inline]
    pub fn get_pixel(&self, x: u32, y: u32) -> Result<[u8; CHANNELS]> {
        if x < self.width && y < self.height {
            Ok(self.pixel(x, y))
        } else {
            Err(Error::out_of_bounds(x, y, self.width, self.height))
        }
    }

    /// Sets the pixel at (x, y).
    ///
    /// # Panics
    ///
    /// Panics if (x, y) is out of bounds.
    #[inline]
    pub fn set_pixel(&mut self, x: u32, y: u32, pixel: [u8; CHANNELS]) {
        assert!(x < self.width && y < self.height, "pixel out of bounds");
        let offset = self.pixel_offset(x, y);
        self.data[offset..offset + CHANNELS].copy_from_slice(&pixel);
    }

    /// Fills the entire image with a pixel value.
    pub fn fill(&mut self, pixel: [u8; CHANNELS]) {
        for chunk in self.data.chunks_exact_mut(CHANNELS) {
            chunk.copy_from_slice(&pixel);
        }
    }

    /// Returns row `y` as a byte slice.
    ///
    /// # Panics
    ///
    /// Panics if y >= height.
    #[inline]
    pub fn row(&self, y: u32) -> &[u8] {
        assert!(y < self.height, "row out of bounds");
        let start = y as usize * self.row_len();
        &self.data[start..start + self.row_len()]
    }

    /// Iterates over all pixels with their coordinates.
    pub fn pixels(&self) -> impl Iterator<Item = (u32, u32, [u8; CHANNELS])> + '_ {
        (0..self.height).flat_map(move |y| (0..self.width).map(move |x| (x, y, self.pixel(x, y))))
    }

    /// Copies the `width x height` region at (x, y) into a new image.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidRegion`] if the region is not fully inside the image.
    ///
    /// # Example
    ///
    /// ```rust
    /// use pixa_core::RgbaImage;
    ///
    /// let img = RgbaImage::filled(10, 10, [1, 2, 3, 4]);
    /// let part = img.crop(2, 3, 4, 5).unwrap();
    /// assert_eq!(part.dimensions(), (4, 5));
    /// assert!(img.crop(8, 8, 4, 4).is_err());
    /// ```
    pub fn crop(&self, x: u32, y: u32, width: u32, height: u32) -> Result<Self> {
        let fits_x = x.checked_add(width).is_some_and(|r| r <= self.width);
        let fits_y = y.checked_add(height).is_some_and(|b| b <= self.height);
        if !fits_x || !fits_y {
            return Err(Error::invalid_region(
                x,
                y,
                width,
                height,
                self.width,
                self.height,
            ));
        }

        let row_bytes = width as usize * CHANNELS;
        let mut data = Vec::with_capacity(row_bytes * height as usize);
        for row in y..y + height {
            let start = self.pixel_offset(x, row);
            data.extend_from_slice(&self.data[start..start + row_bytes]);
        }

        Ok(Self {
            width,
            height,
            data,
        })
    }
}
