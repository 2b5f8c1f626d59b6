//! Raw pixel bitmaps: the value type every pixel backend consumes.
//!
//! A [`Bitmap`] is a plain row-major byte buffer with a declared
//! [`PixelFormat`] - no decoding, no color management, no ownership tricks.
//! Pixel `(x, y)` lives at byte offset `(y * width + x) * bytes_per_pixel`.
//!
//! Zero-sized bitmaps (width or height of 0) are legal values: every
//! operation on them produces empty output rather than an error, keeping the
//! rendering hot path panic- and error-free.
//!
//! # Examples
//!
//! ```
//! use termpix::{Bitmap, PixelFormat};
//!
//! // A 2×1 bitmap: one red pixel, one green pixel
//! let bitmap = Bitmap::new(
//!     2,
//!     1,
//!     PixelFormat::Rgba,
//!     vec![255, 0, 0, 255, 0, 255, 0, 255],
//! )
//! .unwrap();
//!
//! let doubled = bitmap.resize_nearest(4, 2);
//! assert_eq!((doubled.width(), doubled.height()), (4, 2));
//! ```

use tracing::{debug, error};

use crate::color::{over_opaque, Rgb, Rgba};
use crate::error::TermpixError;

/// Byte layout of a bitmap's pixel data
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PixelFormat {
    /// 3 bytes per pixel, no alpha
    Rgb,
    /// 4 bytes per pixel, straight alpha in the fourth byte
    Rgba,
}

impl PixelFormat {
    /// Bytes occupied by one pixel in this format
    #[inline]
    #[must_use]
    pub const fn bytes_per_pixel(self) -> usize {
        match self {
            Self::Rgb => 3,
            Self::Rgba => 4,
        }
    }
}

/// Row-major pixel buffer with explicit dimensions and format
///
/// Bitmaps are value types: created, consumed, discarded. Once handed to a
/// renderer they are only read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bitmap {
    width: usize,
    height: usize,
    format: PixelFormat,
    data: Vec<u8>,
}

impl Bitmap {
    /// Create a bitmap from raw bytes.
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfig` if `data.len()` is not exactly
    /// `width * height * bytes_per_pixel`.
    pub fn new(
        width: usize,
        height: usize,
        format: PixelFormat,
        data: Vec<u8>,
    ) -> Result<Self, TermpixError> {
        let expected = width * height * format.bytes_per_pixel();
        if data.len() != expected {
            error!(
                width,
                height,
                format = ?format,
                expected,
                actual = data.len(),
                "Bitmap data length does not match dimensions"
            );
            return Err(TermpixError::invalid_config(
                "bitmap data length",
                data.len(),
                format!("{expected} bytes for {width}×{height} {format:?}"),
            ));
        }
        Ok(Self {
            width,
            height,
            format,
            data,
        })
    }

    /// Create a bitmap filled with a single color.
    ///
    /// For [`PixelFormat::Rgb`] the alpha channel of `color` is dropped.
    #[must_use]
    pub fn filled(width: usize, height: usize, format: PixelFormat, color: Rgba) -> Self {
        let bpp = format.bytes_per_pixel();
        let mut data = Vec::with_capacity(width * height * bpp);
        for _ in 0..width * height {
            data.push(color.r);
            data.push(color.g);
            data.push(color.b);
            if matches!(format, PixelFormat::Rgba) {
                data.push(color.a);
            }
        }
        Self {
            width,
            height,
            format,
            data,
        }
    }

    /// The canonical empty bitmap (0×0 RGBA).
    #[must_use]
    pub const fn empty() -> Self {
        Self {
            width: 0,
            height: 0,
            format: PixelFormat::Rgba,
            data: Vec::new(),
        }
    }

    /// Width in pixels
    #[inline]
    #[must_use]
    pub const fn width(&self) -> usize {
        self.width
    }

    /// Height in pixels
    #[inline]
    #[must_use]
    pub const fn height(&self) -> usize {
        self.height
    }

    /// Pixel byte layout
    #[inline]
    #[must_use]
    pub const fn format(&self) -> PixelFormat {
        self.format
    }

    /// The raw row-major pixel bytes
    #[inline]
    #[must_use]
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Whether the bitmap covers zero pixels
    #[inline]
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Read the pixel at `(x, y)`, or `None` outside the bitmap.
    ///
    /// RGB-format bitmaps report alpha 255.
    #[inline]
    #[must_use]
    pub fn pixel(&self, x: usize, y: usize) -> Option<Rgba> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let bpp = self.format.bytes_per_pixel();
        let offset = (y * self.width + x) * bpp;
        let alpha = match self.format {
            PixelFormat::Rgb => 255,
            PixelFormat::Rgba => self.data[offset + 3],
        };
        Some(Rgba::new(
            self.data[offset],
            self.data[offset + 1],
            self.data[offset + 2],
            alpha,
        ))
    }

    /// Write the pixel at `(x, y)`; out-of-bounds writes are absorbed.
    ///
    /// RGB-format bitmaps drop the alpha channel.
    pub fn put_pixel(&mut self, x: usize, y: usize, color: Rgba) {
        if x >= self.width || y >= self.height {
            return;
        }
        let bpp = self.format.bytes_per_pixel();
        let offset = (y * self.width + x) * bpp;
        self.data[offset] = color.r;
        self.data[offset + 1] = color.g;
        self.data[offset + 2] = color.b;
        if matches!(self.format, PixelFormat::Rgba) {
            self.data[offset + 3] = color.a;
        }
    }

    /// Nearest-neighbor resize to the given pixel dimensions.
    ///
    /// Destination pixel `(x, y)` samples source pixel
    /// `(min(x·srcW/dstW, srcW−1), min(y·srcH/dstH, srcH−1))` (integer
    /// division, i.e. floor). A zero-sized destination - or a zero-sized
    /// source, which leaves nothing to sample - yields the empty bitmap.
    #[must_use]
    pub fn resize_nearest(&self, dst_width: usize, dst_height: usize) -> Self {
        if dst_width == 0 || dst_height == 0 || self.is_empty() {
            return Self::empty();
        }
        if dst_width == self.width && dst_height == self.height {
            return self.clone();
        }

        debug!(
            src_width = self.width,
            src_height = self.height,
            dst_width,
            dst_height,
            "Nearest-neighbor resize"
        );

        let bpp = self.format.bytes_per_pixel();
        let mut data = Vec::with_capacity(dst_width * dst_height * bpp);

        for y in 0..dst_height {
            let sy = (y * self.height / dst_height).min(self.height - 1);
            for x in 0..dst_width {
                let sx = (x * self.width / dst_width).min(self.width - 1);
                let offset = (sy * self.width + sx) * bpp;
                data.extend_from_slice(&self.data[offset..offset + bpp]);
            }
        }

        Self {
            width: dst_width,
            height: dst_height,
            format: self.format,
            data,
        }
    }

    /// Resolve alpha against an opaque background, producing a flat RGB
    /// buffer of `width * height` entries.
    ///
    /// Alpha 255 passes the source through, alpha 0 substitutes the
    /// background, anything between composites with straight alpha and
    /// per-channel rounding. RGB-format bitmaps copy through unchanged.
    #[must_use]
    pub fn resolved_rgb(&self, background: Rgb) -> Vec<Rgb> {
        let bpp = self.format.bytes_per_pixel();
        let mut out = Vec::with_capacity(self.width * self.height);

        for chunk in self.data.chunks_exact(bpp) {
            let pixel = match self.format {
                PixelFormat::Rgb => Rgb::new(chunk[0], chunk[1], chunk[2]),
                PixelFormat::Rgba => over_opaque(
                    Rgba::new(chunk[0], chunk[1], chunk[2], chunk[3]),
                    background,
                ),
            };
            out.push(pixel);
        }

        out
    }
}
