//! termpix - terminal graphics from pixel bitmaps and braille vectors
//!
#![warn(missing_docs)]
//!
//! This library turns raster bitmaps and vector drawing commands into byte
//! streams that a terminal emulator renders as pictures. Several mutually
//! incompatible graphics protocols coexist in the wild (Kitty, iTerm2 inline
//! images, Sixel) alongside universal text-mode fallbacks (256-color
//! half-blocks, ASCII luminance ramps, Unicode braille). termpix classifies
//! what the current terminal supports, picks the best usable representation,
//! and produces a bit-exact escape-sequence stream for it.
//!
//! The library performs **no I/O**: every operation returns a `String` of
//! escape bytes for the caller to write. It performs **no image decoding**:
//! it consumes raw RGB/RGBA pixel bytes, or passes pre-encoded PNG bytes
//! through to protocols that accept them.
//!
//! # Getting Started
//!
//! Draw on a braille canvas and serialize it:
//!
//! ```
//! use termpix::BrailleCanvas;
//! use termpix::primitives::draw_line;
//!
//! // 40×20 cells = 80×80 dots (2×4 dots per cell)
//! let mut canvas = BrailleCanvas::new(40, 20).unwrap();
//! draw_line(&mut canvas, 0, 0, 79, 79, None);
//! assert!(canvas.get_dot(0, 0) && canvas.get_dot(79, 79));
//! let ansi = canvas.to_ansi();
//! assert!(!ansi.is_empty());
//! ```
//!
//! Or render a bitmap through whatever the terminal supports:
//!
//! ```
//! use termpix::backend::{default_manager, ImageOptions, ImageSource};
//! use termpix::{Bitmap, PixelFormat};
//!
//! let bitmap = Bitmap::new(2, 2, PixelFormat::Rgba, vec![255; 16]).unwrap();
//! let mut manager = default_manager();
//! let stream = manager.render_image(&ImageSource::Pixels(&bitmap), &ImageOptions::default());
//! // `stream` is ready to write to stdout; empty if no backend is usable.
//! ```
//!
//! # Logging
//!
//! termpix uses the [`tracing`](https://docs.rs/tracing) crate for structured
//! logging. The library does **not** initialize a tracing subscriber - your
//! application must do this if you want to see log output.
//!
//! **Log Levels:**
//! - `ERROR`: Rejected inputs (invalid dimensions, bad configuration)
//! - `INFO`: Major operations (canvas creation, backend selection)
//! - `DEBUG`: Detailed flow (resize decisions, palette construction, probing)
//! - `TRACE`: Not used - per-pixel paths stay uninstrumented for performance
//!
//! # Thread Safety
//!
//! The core is single-threaded cooperative. The palette table is a `static`
//! immutable array and safe to share across readers. [`Bitmap`] and
//! [`render::CellMap`] are value types; once produced they are read-only.
//! A [`BrailleCanvas`] is exclusively owned while drawing. The two caches -
//! [`color::PaletteCache`] and the [`backend::GraphicsManager`] active-backend
//! memo - are caller-owned and explicitly invalidated; multi-threaded use
//! must be serialized externally.
//!
//! # License
//!
//! Licensed under either of:
//! - MIT license (<http://opensource.org/licenses/MIT>)
//! - Apache License, Version 2.0 (<http://www.apache.org/licenses/LICENSE-2.0>)
//!
//! at your option.

// Core modules
pub mod bitmap;
pub mod canvas;
pub mod color;
pub mod error;
pub mod prelude;
pub mod render;

// Graphics protocol backends and capability detection
pub mod backend;

// Drawing primitives over the braille canvas
pub mod primitives;

// Vector canvas to pixel backend bridge
pub mod vector;

// Re-export public types for convenience
pub use bitmap::{Bitmap, PixelFormat};
pub use canvas::BrailleCanvas;
pub use color::{Rgb, Rgba};
pub use error::TermpixError;

// Re-export the rendering pipeline types
pub use render::{cell_map_to_string, render_bitmap, Cell, CellMap, RasterMode, RasterOptions};

// Re-export the backend surface most callers touch
pub use backend::{
    BackendCapabilities, BackendName, ClearTarget, GraphicsBackend, GraphicsManager, ImageOptions,
    ImageSource,
};

// Re-export the vector bridge entry points
pub use vector::{canvas_to_pixel_bitmap, has_pixel_backend, render_vector, BridgeOptions};

/// Convenience type alias for Results using `TermpixError`
///
/// This allows writing `termpix::Result<T>` instead of `Result<T, TermpixError>`
/// in applications using this library.
pub type Result<T> = std::result::Result<T, TermpixError>;
