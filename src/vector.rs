//! Vector→pixel bridge: route a braille canvas through any backend.
//!
//! A [`BrailleCanvas`](crate::BrailleCanvas) is resolution-bound to braille
//! glyphs - unless the active backend can draw pixels, in which case the
//! canvas rasterizes to a real bitmap and rides the Kitty/iTerm2/Sixel
//! path at full cell resolution. This module is the switch:
//!
//! - [`has_pixel_backend`] - is the manager's active backend pixel-capable?
//! - [`canvas_to_pixel_bitmap`] - rasterize dots into an RGBA bitmap
//! - [`render_vector`] - one call that picks the best path
//!
//! # Rasterization geometry
//!
//! Each dot becomes a rectangular patch of `max(1, cell_w/2) ×
//! max(1, cell_h/4)` pixels, so a canvas cell occupies one terminal cell's
//! worth of pixels (default 8×16). Set dots paint their cell's stored
//! color, or the default foreground when the cell has none; everything
//! else is the opaque background.

use tracing::debug;

use crate::backend::{GraphicsManager, ImageOptions, ImageSource};
use crate::bitmap::{Bitmap, PixelFormat};
use crate::canvas::BrailleCanvas;
use crate::color::{Rgb, Rgba};

/// Geometry and colors for canvas rasterization
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BridgeOptions {
    /// Pixel width of one terminal cell (default 8)
    pub cell_w: usize,
    /// Pixel height of one terminal cell (default 16)
    pub cell_h: usize,
    /// Foreground for dots in cells without a stored color
    pub fg: Rgb,
    /// Opaque background behind everything
    pub bg: Rgb,
}

impl Default for BridgeOptions {
    fn default() -> Self {
        Self {
            cell_w: 8,
            cell_h: 16,
            fg: Rgb::white(),
            bg: Rgb::black(),
        }
    }
}

impl BridgeOptions {
    /// Set the pixel geometry of one terminal cell.
    #[must_use]
    pub const fn with_cell_size(mut self, cell_w: usize, cell_h: usize) -> Self {
        self.cell_w = cell_w;
        self.cell_h = cell_h;
        self
    }

    /// Set the default foreground and the background.
    #[must_use]
    pub const fn with_colors(mut self, fg: Rgb, bg: Rgb) -> Self {
        self.fg = fg;
        self.bg = bg;
        self
    }
}

/// Whether the manager's active backend consumes pixel data.
///
/// True for Kitty, iTerm2 and Sixel; false for the text modes and for no
/// backend at all.
pub fn has_pixel_backend(manager: &mut GraphicsManager) -> bool {
    manager
        .active()
        .is_some_and(crate::backend::BackendName::is_pixel_protocol)
}

/// Rasterize a canvas's dot buffer into an RGBA bitmap.
///
/// The bitmap is `dot_width·dot_w × dot_height·dot_h` pixels where
/// `dot_w × dot_h = max(1, cell_w/2) × max(1, cell_h/4)`, initialized to
/// the opaque background; each set dot fills its patch with the cell's
/// stored color or the default foreground.
#[must_use]
pub fn canvas_to_pixel_bitmap(canvas: &BrailleCanvas, opts: &BridgeOptions) -> Bitmap {
    let dot_w = (opts.cell_w / 2).max(1);
    let dot_h = (opts.cell_h / 4).max(1);
    let width = canvas.dot_width() * dot_w;
    let height = canvas.dot_height() * dot_h;

    debug!(
        width,
        height,
        dot_w,
        dot_h,
        "Rasterizing braille canvas to pixels"
    );

    let mut bitmap = Bitmap::filled(
        width,
        height,
        PixelFormat::Rgba,
        Rgba::new(opts.bg.r, opts.bg.g, opts.bg.b, 255),
    );

    for dot_y in 0..canvas.dot_height() {
        for dot_x in 0..canvas.dot_width() {
            if !canvas.get_dot(dot_x, dot_y) {
                continue;
            }
            let color = canvas
                .cell_color(dot_x / 2, dot_y / 4)
                .unwrap_or(opts.fg);
            let pixel = Rgba::new(color.r, color.g, color.b, 255);

            for py in 0..dot_h {
                for px in 0..dot_w {
                    bitmap.put_pixel(dot_x * dot_w + px, dot_y * dot_h + py, pixel);
                }
            }
        }
    }

    bitmap
}

/// Render a canvas through the best available representation.
///
/// With a pixel-capable backend active, the canvas rasterizes via
/// [`canvas_to_pixel_bitmap`] and routes through
/// [`GraphicsManager::render_image`] sized to the canvas's cell footprint
/// at `(x, y)`. Otherwise the braille serialization
/// ([`BrailleCanvas::to_ansi`]) is returned directly.
pub fn render_vector(
    canvas: &BrailleCanvas,
    manager: &mut GraphicsManager,
    x: u16,
    y: u16,
    opts: &BridgeOptions,
) -> String {
    if !has_pixel_backend(manager) {
        return canvas.to_ansi();
    }

    let bitmap = canvas_to_pixel_bitmap(canvas, opts);
    let image_opts = ImageOptions::default().at(x, y).sized(
        canvas.width_cells() as u16,
        canvas.height_cells() as u16,
    );
    manager.render_image(&ImageSource::Pixels(&bitmap), &image_opts)
}
