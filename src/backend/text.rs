//! Text-mode fallback backends: ANSI half-block, braille, and ASCII.
//!
//! These three are thin adapters over the cell renderer
//! ([`render_bitmap`]): build the raster options from the placement
//! options, render the bitmap to a [`CellMap`](crate::render::CellMap),
//! serialize it, and prepend a cursor-position sequence. They exist so the
//! [`GraphicsManager`](crate::backend::GraphicsManager) can fall through
//! from the pixel protocols to plain text without the caller noticing.
//!
//! - [`AnsiBackend`] - 256-color `▀` half-blocks, two pixels per cell
//! - [`BrailleBackend`] - `U+2800` dot patterns, eight pixels per cell
//! - [`AsciiBackend`] - the `" .:-=+*#%@"` luminance ramp, the output of
//!   last resort that renders literally anywhere

use crate::backend::{
    clear_area, cursor_position, BackendCapabilities, BackendName, ClearTarget, GraphicsBackend,
    ImageOptions, ImageSource,
};
use crate::render::{cell_map_to_string, render_bitmap, RasterMode, RasterOptions};

/// Capabilities shared by all three text backends: static cell output,
/// alpha resolved against a background.
const TEXT_CAPABILITIES: BackendCapabilities = BackendCapabilities {
    static_images: true,
    animation: false,
    alpha_channel: false,
    max_width: None,
    max_height: None,
};

/// Render an image through the cell renderer in the given mode.
///
/// PNG sources cannot be rasterized (decoding is out of scope), and an
/// empty cell map means there is nothing to position or paint - both
/// produce the canonical empty string.
fn render_cells(mode: RasterMode, image: &ImageSource<'_>, opts: &ImageOptions) -> String {
    let ImageSource::Pixels(bitmap) = image else {
        return String::new();
    };

    let raster = RasterOptions {
        mode,
        target_cell_w: opts.cols.map(usize::from),
        target_cell_h: opts.rows.map(usize::from),
        dither: opts.dither,
        background: opts.background,
        ..RasterOptions::default()
    };

    let map = render_bitmap(bitmap, &raster);
    if map.cells().is_empty() {
        return String::new();
    }

    let mut out = cursor_position(opts.x, opts.y);
    out.push_str(&cell_map_to_string(&map));
    out
}

/// 256-color half-block backend
///
/// One cell packs two vertical pixels via the `▀` glyph with independent
/// foreground and background palette indices.
#[derive(Debug, Clone, Copy, Default)]
pub struct AnsiBackend;

impl AnsiBackend {
    /// Create the backend.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl GraphicsBackend for AnsiBackend {
    fn name(&self) -> BackendName {
        BackendName::Ansi
    }

    fn capabilities(&self) -> BackendCapabilities {
        TEXT_CAPABILITIES
    }

    fn render(&self, image: &ImageSource<'_>, opts: &ImageOptions) -> String {
        render_cells(RasterMode::Color, image, opts)
    }

    fn clear(&self, _target: &ClearTarget) -> String {
        // Cell output lives in the text grid; erasing it is the caller's
        // screen management, not a protocol operation.
        String::new()
    }

    fn is_supported(&self) -> bool {
        crate::backend::detect::ansi_supported(&crate::backend::detect::SystemEnv)
    }
}

/// Unicode braille backend
///
/// One cell packs a 2×4 pixel block into a `U+2800`-`U+28FF` dot pattern;
/// the cell's foreground is the block's average color.
#[derive(Debug, Clone, Copy, Default)]
pub struct BrailleBackend;

impl BrailleBackend {
    /// Create the backend.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl GraphicsBackend for BrailleBackend {
    fn name(&self) -> BackendName {
        BackendName::Braille
    }

    fn capabilities(&self) -> BackendCapabilities {
        TEXT_CAPABILITIES
    }

    fn render(&self, image: &ImageSource<'_>, opts: &ImageOptions) -> String {
        render_cells(RasterMode::Braille, image, opts)
    }

    fn clear(&self, target: &ClearTarget) -> String {
        match target {
            ClearTarget::Area {
                x,
                y,
                width,
                height,
            } => clear_area(*x, *y, *width, *height),
            ClearTarget::All | ClearTarget::Image(_) => String::new(),
        }
    }

    fn is_supported(&self) -> bool {
        crate::backend::detect::braille_supported(&crate::backend::detect::SystemEnv)
    }
}

/// ASCII luminance-ramp backend
///
/// One glyph per pixel from `" .:-=+*#%@"`. The universal fallback: its
/// support probe always answers `true`.
#[derive(Debug, Clone, Copy, Default)]
pub struct AsciiBackend;

impl AsciiBackend {
    /// Create the backend.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl GraphicsBackend for AsciiBackend {
    fn name(&self) -> BackendName {
        BackendName::Ascii
    }

    fn capabilities(&self) -> BackendCapabilities {
        TEXT_CAPABILITIES
    }

    fn render(&self, image: &ImageSource<'_>, opts: &ImageOptions) -> String {
        render_cells(RasterMode::Ascii, image, opts)
    }

    fn clear(&self, target: &ClearTarget) -> String {
        match target {
            ClearTarget::Area {
                x,
                y,
                width,
                height,
            } => clear_area(*x, *y, *width, *height),
            ClearTarget::All | ClearTarget::Image(_) => String::new(),
        }
    }

    fn is_supported(&self) -> bool {
        true
    }
}
