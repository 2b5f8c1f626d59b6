//! Bitmap → cell-grid rendering: half-block color, ASCII ramp, and braille.
//!
//! This is the text-mode half of the pipeline. A [`Bitmap`] goes in, a
//! [`CellMap`] (a grid of `{glyph, fg, bg}` cells in 256-color space) comes
//! out, and [`cell_map_to_string`] serializes the grid into an SGR escape
//! stream with run-length color emission.
//!
//! # Modes
//!
//! | Mode | Cell covers | Glyphs |
//! |------|-------------|--------|
//! | [`RasterMode::Color`] | 1×2 pixels | `▀` with fg=top / bg=bottom |
//! | [`RasterMode::Ascii`] | 1×1 pixel | luminance ramp `" .:-=+*#%@"` |
//! | [`RasterMode::Braille`] | 2×4 pixels | `U+2800`-`U+28FF` dot patterns |
//!
//! # Scaling
//!
//! When target cell dimensions are given, the bitmap is first resized
//! (nearest-neighbor) to the pixel size the mode needs: `w×2h` for color,
//! `w×h` for ASCII, `2w×4h` for braille. Without targets the source
//! dimensions are used as-is and partial edge blocks are handled (odd last
//! row in color mode renders against the background; braille cells average
//! only their in-bounds pixels).
//!
//! # Examples
//!
//! ```
//! use termpix::{render_bitmap, cell_map_to_string, Bitmap, PixelFormat, RasterOptions, RasterMode};
//!
//! let bitmap = Bitmap::filled(4, 4, PixelFormat::Rgb, termpix::Rgba::new(255, 0, 0, 255));
//! let opts = RasterOptions::default().with_mode(RasterMode::Color);
//! let map = render_bitmap(&bitmap, &opts);
//! assert_eq!((map.width(), map.height()), (4, 2));
//!
//! let ansi = cell_map_to_string(&map);
//! assert!(ansi.starts_with("\x1b[38;5;"));
//! assert!(ansi.ends_with("\x1b[0m"));
//! ```

pub mod dither;

use tracing::debug;

use crate::bitmap::Bitmap;
use crate::color::{perceived_luminance, PaletteCache, Rgb};

/// Bits for the 2×4 dot grid of one braille cell, indexed `[dy][dx]`.
///
/// Fixed by the Unicode braille standard:
/// ```text
/// (0,0)=0x01  (1,0)=0x08
/// (0,1)=0x02  (1,1)=0x10
/// (0,2)=0x04  (1,2)=0x20
/// (0,3)=0x40  (1,3)=0x80
/// ```
pub(crate) const BRAILLE_DOT_BITS: [[u8; 2]; 4] =
    [[0x01, 0x08], [0x02, 0x10], [0x04, 0x20], [0x40, 0x80]];

/// Luminance ramp for ASCII mode, darkest to brightest (10 glyphs).
const ASCII_RAMP: [char; 10] = [' ', '.', ':', '-', '=', '+', '*', '#', '%', '@'];

/// Upper half block: the glyph that packs two vertical pixels into one cell.
const UPPER_HALF_BLOCK: char = '\u{2580}';

/// Rendering mode selecting the bitmap-to-cell packing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RasterMode {
    /// 256-color half-blocks: one cell spans two vertical pixels
    #[default]
    Color,
    /// ASCII luminance ramp: one cell per pixel
    Ascii,
    /// Braille dot patterns: one cell spans a 2×4 pixel block
    Braille,
}

impl RasterMode {
    /// Pixels covered by one cell in this mode, `(width, height)`.
    #[inline]
    #[must_use]
    pub const fn pixels_per_cell(self) -> (usize, usize) {
        match self {
            Self::Color => (1, 2),
            Self::Ascii => (1, 1),
            Self::Braille => (2, 4),
        }
    }
}

/// Options for [`render_bitmap`]
///
/// The defaults render in color mode at source resolution with no dithering
/// against a black background.
#[derive(Debug, Clone, PartialEq)]
pub struct RasterOptions {
    /// Bitmap-to-cell packing mode
    pub mode: RasterMode,
    /// Target width in cells; `None` derives from the source width
    pub target_cell_w: Option<usize>,
    /// Target height in cells; `None` derives from the source height
    pub target_cell_h: Option<usize>,
    /// Run Floyd-Steinberg error diffusion before palette mapping
    /// (color mode only)
    pub dither: bool,
    /// Background composited under transparent pixels
    pub background: Rgb,
    /// Luminance at or above which a braille dot lights up
    pub braille_threshold: f32,
}

impl Default for RasterOptions {
    fn default() -> Self {
        Self {
            mode: RasterMode::Color,
            target_cell_w: None,
            target_cell_h: None,
            dither: false,
            background: Rgb::black(),
            braille_threshold: 0.5,
        }
    }
}

impl RasterOptions {
    /// Set the rendering mode
    #[must_use]
    pub const fn with_mode(mut self, mode: RasterMode) -> Self {
        self.mode = mode;
        self
    }

    /// Set the target size in cells
    #[must_use]
    pub const fn with_target_cells(mut self, width: usize, height: usize) -> Self {
        self.target_cell_w = Some(width);
        self.target_cell_h = Some(height);
        self
    }

    /// Enable or disable Floyd-Steinberg dithering
    #[must_use]
    pub const fn with_dither(mut self, dither: bool) -> Self {
        self.dither = dither;
        self
    }

    /// Set the background color for alpha resolution
    #[must_use]
    pub const fn with_background(mut self, background: Rgb) -> Self {
        self.background = background;
        self
    }

    /// Set the braille dot luminance threshold (default 0.5)
    #[must_use]
    pub const fn with_braille_threshold(mut self, threshold: f32) -> Self {
        self.braille_threshold = threshold;
        self
    }
}

/// One terminal character position: glyph plus 256-color fg/bg indices
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cell {
    /// The character occupying this position
    pub glyph: char,
    /// Foreground palette index
    pub fg: u8,
    /// Background palette index
    pub bg: u8,
}

/// A 2-D grid of [`Cell`]s representing a rendered image or canvas
///
/// Row-major flat storage; immutable once produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CellMap {
    width: usize,
    height: usize,
    cells: Vec<Cell>,
}

impl CellMap {
    /// The canonical empty cell map.
    #[must_use]
    pub const fn empty() -> Self {
        Self {
            width: 0,
            height: 0,
            cells: Vec::new(),
        }
    }

    /// Width in cells
    #[inline]
    #[must_use]
    pub const fn width(&self) -> usize {
        self.width
    }

    /// Height in cells
    #[inline]
    #[must_use]
    pub const fn height(&self) -> usize {
        self.height
    }

    /// The cell at `(x, y)`, or `None` outside the grid
    #[inline]
    #[must_use]
    pub fn cell(&self, x: usize, y: usize) -> Option<&Cell> {
        if x >= self.width || y >= self.height {
            return None;
        }
        self.cells.get(y * self.width + x)
    }

    /// All cells in row-major order
    #[inline]
    #[must_use]
    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }
}

/// Pixel dimensions the mode needs for a given cell target.
const fn pixel_target(mode: RasterMode, cells_w: usize, cells_h: usize) -> (usize, usize) {
    let (px, py) = mode.pixels_per_cell();
    (cells_w * px, cells_h * py)
}

/// Render a bitmap into a cell grid.
///
/// Zero-sized inputs and zero cell targets produce the empty [`CellMap`];
/// the function never fails or panics.
#[must_use]
pub fn render_bitmap(bitmap: &Bitmap, opts: &RasterOptions) -> CellMap {
    let (cell_px_w, cell_px_h) = opts.mode.pixels_per_cell();

    // Derive the cell grid from the source when no target is given.
    let cells_w = opts
        .target_cell_w
        .unwrap_or_else(|| bitmap.width().div_ceil(cell_px_w));
    let cells_h = opts
        .target_cell_h
        .unwrap_or_else(|| bitmap.height().div_ceil(cell_px_h));

    if cells_w == 0 || cells_h == 0 || bitmap.is_empty() {
        return CellMap::empty();
    }

    // Resize only when the caller asked for an explicit cell size; the
    // no-target path renders the source at native resolution with partial
    // edge blocks.
    let scaled;
    let source = if opts.target_cell_w.is_some() || opts.target_cell_h.is_some() {
        let (px_w, px_h) = pixel_target(opts.mode, cells_w, cells_h);
        scaled = bitmap.resize_nearest(px_w, px_h);
        &scaled
    } else {
        bitmap
    };

    if source.is_empty() {
        return CellMap::empty();
    }

    debug!(
        mode = ?opts.mode,
        cells_w,
        cells_h,
        src_w = source.width(),
        src_h = source.height(),
        dither = opts.dither,
        "Rendering bitmap to cell map"
    );

    let mut pixels = source.resolved_rgb(opts.background);
    if opts.dither && matches!(opts.mode, RasterMode::Color) {
        dither::floyd_steinberg_palette(&mut pixels, source.width(), source.height());
    }

    let mut cache = PaletteCache::new();
    let cells = match opts.mode {
        RasterMode::Color => {
            render_color(&pixels, source.width(), source.height(), cells_w, cells_h, opts, &mut cache)
        }
        RasterMode::Ascii => render_ascii(&pixels, source.width(), cells_w, cells_h, &mut cache),
        RasterMode::Braille => {
            render_braille(&pixels, source.width(), source.height(), cells_w, cells_h, opts, &mut cache)
        }
    };

    CellMap {
        width: cells_w,
        height: cells_h,
        cells,
    }
}

fn render_color(
    pixels: &[Rgb],
    width: usize,
    height: usize,
    cells_w: usize,
    cells_h: usize,
    opts: &RasterOptions,
    cache: &mut PaletteCache,
) -> Vec<Cell> {
    let bg_fallback = opts.background;
    let mut cells = Vec::with_capacity(cells_w * cells_h);

    for cy in 0..cells_h {
        let top_y = cy * 2;
        let bottom_y = top_y + 1;
        for cx in 0..cells_w {
            let top = pixel_at(pixels, width, height, cx, top_y).unwrap_or(bg_fallback);
            let bottom = pixel_at(pixels, width, height, cx, bottom_y).unwrap_or(bg_fallback);
            cells.push(Cell {
                glyph: UPPER_HALF_BLOCK,
                fg: cache.nearest(top.r, top.g, top.b),
                bg: cache.nearest(bottom.r, bottom.g, bottom.b),
            });
        }
    }

    cells
}

fn render_ascii(
    pixels: &[Rgb],
    width: usize,
    cells_w: usize,
    cells_h: usize,
    cache: &mut PaletteCache,
) -> Vec<Cell> {
    let mut cells = Vec::with_capacity(cells_w * cells_h);

    for y in 0..cells_h {
        for x in 0..cells_w {
            let pixel = pixels.get(y * width + x).copied().unwrap_or(Rgb::black());
            let luma = perceived_luminance(pixel).clamp(0.0, 1.0);
            let index = (luma * 9.0).round() as usize;
            cells.push(Cell {
                glyph: ASCII_RAMP[index.min(9)],
                fg: cache.nearest(pixel.r, pixel.g, pixel.b),
                bg: 0,
            });
        }
    }

    cells
}

fn render_braille(
    pixels: &[Rgb],
    width: usize,
    height: usize,
    cells_w: usize,
    cells_h: usize,
    opts: &RasterOptions,
    cache: &mut PaletteCache,
) -> Vec<Cell> {
    let mut cells = Vec::with_capacity(cells_w * cells_h);

    for cy in 0..cells_h {
        for cx in 0..cells_w {
            let mut pattern = 0u8;
            let mut sums = (0u32, 0u32, 0u32);
            let mut count = 0u32;

            for dy in 0..4 {
                for dx in 0..2 {
                    let Some(pixel) = pixel_at(pixels, width, height, cx * 2 + dx, cy * 4 + dy)
                    else {
                        continue;
                    };
                    count += 1;
                    sums.0 += u32::from(pixel.r);
                    sums.1 += u32::from(pixel.g);
                    sums.2 += u32::from(pixel.b);
                    if perceived_luminance(pixel) >= opts.braille_threshold {
                        pattern |= BRAILLE_DOT_BITS[dy][dx];
                    }
                }
            }

            let fg = if count == 0 {
                0
            } else {
                let avg = Rgb::new(
                    (sums.0 / count) as u8,
                    (sums.1 / count) as u8,
                    (sums.2 / count) as u8,
                );
                cache.nearest(avg.r, avg.g, avg.b)
            };

            cells.push(Cell {
                // 0x2800 + pattern is always a valid scalar value
                glyph: char::from_u32(0x2800 + u32::from(pattern)).unwrap_or('\u{2800}'),
                fg,
                bg: 0,
            });
        }
    }

    cells
}

#[inline]
fn pixel_at(pixels: &[Rgb], width: usize, height: usize, x: usize, y: usize) -> Option<Rgb> {
    if x >= width || y >= height {
        return None;
    }
    pixels.get(y * width + x).copied()
}

/// Serialize a cell map into an SGR escape stream.
///
/// Rows are joined by `\n`. A `ESC[38;5;F;48;5;Bm` pair is emitted only when
/// the `(fg, bg)` pair differs from the last one emitted; the run state is
/// carried across row boundaries since terminals do not reset SGR at
/// newlines. The stream always ends with `ESC[0m` - an empty map serializes
/// to just the reset.
#[must_use]
pub fn cell_map_to_string(map: &CellMap) -> String {
    // Worst case one SGR pair per cell: ~22 bytes + glyph
    let mut out = String::with_capacity(map.cells.len() * 8 + 8);
    let mut last: Option<(u8, u8)> = None;

    for y in 0..map.height {
        if y > 0 {
            out.push('\n');
        }
        for x in 0..map.width {
            // Rows are fully populated by construction
            let Some(cell) = map.cell(x, y) else { continue };
            if last != Some((cell.fg, cell.bg)) {
                out.push_str(&format!("\x1b[38;5;{};48;5;{}m", cell.fg, cell.bg));
                last = Some((cell.fg, cell.bg));
            }
            out.push(cell.glyph);
        }
    }

    out.push_str("\x1b[0m");
    out
}
