//! Graphics protocol backends and the preference-ordered manager.
//!
//! Every way of putting pixels on a terminal - Kitty APC, iTerm2 OSC 1337,
//! Sixel DCS, and the text-mode fallbacks (ANSI half-block, braille, ASCII) -
//! implements [`GraphicsBackend`]: two byte-string producers (`render`,
//! `clear`), a capability description, and a support probe. The
//! [`GraphicsManager`] holds the registered backends behind the trait and
//! resolves the best usable one by walking its preference order.
//!
//! # Protocol backends
//!
//! - [`kitty::KittyBackend`] - APC `ESC_G` graphics (transmit, place,
//!   delete, animate, query)
//! - [`iterm2::Iterm2Backend`] - OSC 1337 inline images
//! - [`sixel::SixelBackend`] - DCS sixel bands with popularity palette
//! - [`text::AnsiBackend`] / [`text::BrailleBackend`] /
//!   [`text::AsciiBackend`] - adapters over the cell renderer
//!
//! # Examples
//!
//! ```
//! use termpix::backend::{default_manager, ImageOptions, ImageSource};
//! use termpix::{Bitmap, PixelFormat};
//!
//! let mut manager = default_manager();
//! let bitmap = Bitmap::filled(4, 4, PixelFormat::Rgba, termpix::Rgba::new(0, 200, 0, 255));
//! let stream = manager.render_image(&ImageSource::Pixels(&bitmap), &ImageOptions::default());
//! // Write `stream` to the terminal; it is empty only when nothing is usable.
//! ```

pub mod detect;
pub mod iterm2;
pub mod kitty;
pub mod sixel;
pub mod text;

use std::collections::HashMap;

use tracing::{debug, info};

use crate::bitmap::Bitmap;
use crate::color::Rgb;

pub use detect::{
    ansi_supported, braille_supported, iterm2_supported, kitty_supported, sixel_supported,
    EnvSource, SystemEnv,
};
pub use iterm2::{Iterm2Backend, SizeSpec};
pub use kitty::KittyBackend;
pub use sixel::{SixelBackend, SixelConfig};
pub use text::{AnsiBackend, AsciiBackend, BrailleBackend};

// ============================================================================
// Backend identity and capabilities
// ============================================================================

/// Identity of a graphics backend
///
/// Doubles as the registry key and the preference-order vocabulary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BackendName {
    /// Kitty graphics protocol (APC)
    Kitty,
    /// iTerm2 inline images (OSC 1337)
    Iterm2,
    /// Sixel graphics (DCS)
    Sixel,
    /// 256-color half-block cells
    Ansi,
    /// Unicode braille cells
    Braille,
    /// ASCII luminance ramp cells
    Ascii,
}

impl BackendName {
    /// Default preference order, most capable first.
    pub const DEFAULT_PREFERENCE: [Self; 6] = [
        Self::Kitty,
        Self::Iterm2,
        Self::Sixel,
        Self::Ansi,
        Self::Braille,
        Self::Ascii,
    ];

    /// Lowercase protocol name
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Kitty => "kitty",
            Self::Iterm2 => "iterm2",
            Self::Sixel => "sixel",
            Self::Ansi => "ansi",
            Self::Braille => "braille",
            Self::Ascii => "ascii",
        }
    }

    /// Whether this backend consumes pixel data (as opposed to cell text)
    #[must_use]
    pub const fn is_pixel_protocol(self) -> bool {
        matches!(self, Self::Kitty | Self::Iterm2 | Self::Sixel)
    }
}

impl std::fmt::Display for BackendName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What a backend can do, declared up front and immutable
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BackendCapabilities {
    /// Can display static images
    pub static_images: bool,
    /// Can upload and play animation frames
    pub animation: bool,
    /// Honors the alpha channel (vs compositing onto a background)
    pub alpha_channel: bool,
    /// Maximum image width in pixels, if the protocol has one
    pub max_width: Option<u32>,
    /// Maximum image height in pixels, if the protocol has one
    pub max_height: Option<u32>,
}

// ============================================================================
// Render inputs
// ============================================================================

/// Image handed to a backend: raw pixels or pre-encoded PNG bytes
///
/// The crate never decodes images. Pixel-consuming backends (sixel, the
/// text modes) return the canonical empty string for [`Self::Png`].
#[derive(Debug, Clone, Copy)]
pub enum ImageSource<'a> {
    /// Raw RGB/RGBA pixels
    Pixels(&'a Bitmap),
    /// Opaque pre-encoded PNG bytes, passed through to protocols that
    /// accept them (Kitty `f=100`, iTerm2)
    Png(&'a [u8]),
}

impl ImageSource<'_> {
    /// Pixel dimensions, when known (`None` for PNG pass-through)
    #[must_use]
    pub const fn dimensions(&self) -> Option<(usize, usize)> {
        match self {
            Self::Pixels(bitmap) => Some((bitmap.width(), bitmap.height())),
            Self::Png(_) => None,
        }
    }

    /// The raw payload bytes
    #[must_use]
    pub fn bytes(&self) -> &[u8] {
        match self {
            Self::Pixels(bitmap) => bitmap.data(),
            Self::Png(data) => data,
        }
    }
}

/// Placement and rendering options shared by every backend
///
/// Backends use the subset that applies to their protocol and ignore the
/// rest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageOptions {
    /// Cell column of the top-left corner (0-based)
    pub x: u16,
    /// Cell row of the top-left corner (0-based)
    pub y: u16,
    /// Display width in cells
    pub cols: Option<u16>,
    /// Display height in cells
    pub rows: Option<u16>,
    /// Protocol image id (Kitty)
    pub image_id: Option<u32>,
    /// Protocol placement id (Kitty)
    pub placement_id: Option<u32>,
    /// Z-index relative to text (Kitty)
    pub z_index: Option<i32>,
    /// Keep the cursor where it is after drawing (Kitty `C=1`)
    pub hold_cursor: bool,
    /// File name advertised to the terminal (iTerm2)
    pub name: Option<String>,
    /// Background composited under transparent pixels (text backends)
    pub background: Rgb,
    /// Floyd-Steinberg dithering for the half-block renderer
    pub dither: bool,
}

impl Default for ImageOptions {
    fn default() -> Self {
        Self {
            x: 0,
            y: 0,
            cols: None,
            rows: None,
            image_id: None,
            placement_id: None,
            z_index: None,
            hold_cursor: false,
            name: None,
            background: Rgb::black(),
            dither: false,
        }
    }
}

impl ImageOptions {
    /// Set the cell position of the top-left corner
    #[must_use]
    pub const fn at(mut self, x: u16, y: u16) -> Self {
        self.x = x;
        self.y = y;
        self
    }

    /// Set the display size in cells
    #[must_use]
    pub const fn sized(mut self, cols: u16, rows: u16) -> Self {
        self.cols = Some(cols);
        self.rows = Some(rows);
        self
    }

    /// Set the protocol image id
    #[must_use]
    pub const fn with_id(mut self, id: u32) -> Self {
        self.image_id = Some(id);
        self
    }

    /// Set the z-index
    #[must_use]
    pub const fn with_z_index(mut self, z: i32) -> Self {
        self.z_index = Some(z);
        self
    }

    /// Keep the cursor in place after drawing
    #[must_use]
    pub const fn holding_cursor(mut self) -> Self {
        self.hold_cursor = true;
        self
    }

    /// Set the background for text-mode alpha resolution
    #[must_use]
    pub const fn with_background(mut self, background: Rgb) -> Self {
        self.background = background;
        self
    }
}

/// What `clear` should remove
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClearTarget {
    /// Everything the backend has drawn
    All,
    /// One image by protocol id (Kitty)
    Image(u32),
    /// A rectangular cell region, overwritten with spaces by the text
    /// backends
    Area {
        /// Left cell column (0-based)
        x: u16,
        /// Top cell row (0-based)
        y: u16,
        /// Width in cells
        width: u16,
        /// Height in cells
        height: u16,
    },
}

// ============================================================================
// The backend trait
// ============================================================================

/// A terminal graphics protocol behind a uniform byte-string interface
///
/// Implementations are pure producers: `render` and `clear` return complete
/// escape streams and never touch the terminal themselves. `is_supported`
/// probes the environment without blocking or side effects.
pub trait GraphicsBackend {
    /// This backend's identity
    fn name(&self) -> BackendName;

    /// Immutable capability description
    fn capabilities(&self) -> BackendCapabilities;

    /// Produce the escape stream that draws `image` at `opts`'s position.
    ///
    /// Returns the empty string for inputs the protocol cannot express
    /// (e.g. PNG bytes handed to a pixel-consuming backend).
    fn render(&self, image: &ImageSource<'_>, opts: &ImageOptions) -> String;

    /// Produce the escape stream that removes previously drawn output.
    ///
    /// Returns the empty string when the protocol has nothing to emit for
    /// the target (e.g. text backends treat [`ClearTarget::All`] as the
    /// caller's screen-clear problem).
    fn clear(&self, target: &ClearTarget) -> String;

    /// Whether the current terminal understands this backend's output
    fn is_supported(&self) -> bool;
}

/// `ESC [ row ; col H` cursor positioning for a 0-based cell coordinate.
pub(crate) fn cursor_position(x: u16, y: u16) -> String {
    format!("\x1b[{};{}H", u32::from(y) + 1, u32::from(x) + 1)
}

/// Overwrite a cell rectangle with spaces, positioning each row.
///
/// Shared by the backends whose output lives in the text grid (sixel
/// occupies cells too, per its cell-height raster).
pub(crate) fn clear_area(x: u16, y: u16, width: u16, height: u16) -> String {
    let mut out = String::new();
    let blank = " ".repeat(usize::from(width));
    for row in 0..height {
        out.push_str(&cursor_position(x, y + row));
        out.push_str(&blank);
    }
    out
}

// ============================================================================
// Graphics manager
// ============================================================================

/// Registry of backends with a preference order and a cached selection
///
/// Selection is deterministic: given the same registered backends, the same
/// `is_supported` results, and the same preference order, the same backend
/// wins. The cached choice is invalidated by [`register`](Self::register)
/// and [`refresh`](Self::refresh); callers should refresh on terminal
/// capability change events.
pub struct GraphicsManager {
    backends: HashMap<BackendName, Box<dyn GraphicsBackend>>,
    preference: Vec<BackendName>,
    /// `None` = unresolved; `Some(None)` = resolved, nothing usable
    active: Option<Option<BackendName>>,
}

impl GraphicsManager {
    /// Create an empty manager with the default preference order.
    #[must_use]
    pub fn new() -> Self {
        Self {
            backends: HashMap::new(),
            preference: BackendName::DEFAULT_PREFERENCE.to_vec(),
            active: None,
        }
    }

    /// Create an empty manager with a custom preference order.
    ///
    /// Entries without a registered backend are skipped at selection time;
    /// backends missing from the order are never selected.
    #[must_use]
    pub fn with_preference(order: Vec<BackendName>) -> Self {
        Self {
            backends: HashMap::new(),
            preference: order,
            active: None,
        }
    }

    /// The current preference order.
    #[must_use]
    pub fn preference(&self) -> &[BackendName] {
        &self.preference
    }

    /// Register a backend under its own name, replacing any previous one.
    ///
    /// Invalidates the cached active selection.
    pub fn register(&mut self, backend: Box<dyn GraphicsBackend>) {
        let name = backend.name();
        debug!(backend = %name, "Registering graphics backend");
        self.backends.insert(name, backend);
        self.active = None;
    }

    /// Look up a registered backend by name.
    #[must_use]
    pub fn get(&self, name: BackendName) -> Option<&dyn GraphicsBackend> {
        self.backends.get(&name).map(AsRef::as_ref)
    }

    /// Resolve (and cache) the active backend name.
    ///
    /// Walks the preference order; the first registered backend whose
    /// `is_supported()` returns `true` wins. Returns `None` when nothing is
    /// usable.
    pub fn active(&mut self) -> Option<BackendName> {
        if let Some(resolved) = self.active {
            return resolved;
        }

        let found = self
            .preference
            .iter()
            .copied()
            .find(|name| self.backends.get(name).is_some_and(|b| b.is_supported()));

        match found {
            Some(name) => info!(backend = %name, "Selected graphics backend"),
            None => info!("No usable graphics backend"),
        }
        self.active = Some(found);
        found
    }

    /// The active backend as a trait object, resolving if needed.
    pub fn active_backend(&mut self) -> Option<&dyn GraphicsBackend> {
        let name = self.active()?;
        self.get(name)
    }

    /// Render through the active backend; empty string when none is usable.
    pub fn render_image(&mut self, image: &ImageSource<'_>, opts: &ImageOptions) -> String {
        match self.active_backend() {
            Some(backend) => backend.render(image, opts),
            None => String::new(),
        }
    }

    /// Clear through the active backend; empty string when none is usable.
    pub fn clear_image(&mut self, target: &ClearTarget) -> String {
        match self.active_backend() {
            Some(backend) => backend.clear(target),
            None => String::new(),
        }
    }

    /// Drop the cached selection and re-resolve.
    pub fn refresh(&mut self) -> Option<BackendName> {
        self.active = None;
        self.active()
    }
}

impl Default for GraphicsManager {
    fn default() -> Self {
        Self::new()
    }
}

/// A manager with every built-in backend registered at default settings.
#[must_use]
pub fn default_manager() -> GraphicsManager {
    let mut manager = GraphicsManager::new();
    manager.register(Box::new(KittyBackend::new()));
    manager.register(Box::new(Iterm2Backend::new()));
    manager.register(Box::new(SixelBackend::new(SixelConfig::default())));
    manager.register(Box::new(AnsiBackend::new()));
    manager.register(Box::new(BrailleBackend::new()));
    manager.register(Box::new(AsciiBackend::new()));
    manager
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Backend stub with scripted identity and support
    struct TestBackend {
        name: BackendName,
        supported: bool,
    }

    impl GraphicsBackend for TestBackend {
        fn name(&self) -> BackendName {
            self.name
        }

        fn capabilities(&self) -> BackendCapabilities {
            BackendCapabilities {
                static_images: true,
                animation: false,
                alpha_channel: false,
                max_width: None,
                max_height: None,
            }
        }

        fn render(&self, _image: &ImageSource<'_>, _opts: &ImageOptions) -> String {
            format!("render:{}", self.name)
        }

        fn clear(&self, _target: &ClearTarget) -> String {
            format!("clear:{}", self.name)
        }

        fn is_supported(&self) -> bool {
            self.supported
        }
    }

    fn boxed(name: BackendName, supported: bool) -> Box<dyn GraphicsBackend> {
        Box::new(TestBackend { name, supported })
    }

    #[test]
    fn test_selection_follows_preference_order() {
        // Registration order must not matter
        let mut manager = GraphicsManager::new();
        manager.register(boxed(BackendName::Ascii, true));
        manager.register(boxed(BackendName::Sixel, true));
        manager.register(boxed(BackendName::Kitty, true));
        assert_eq!(manager.active(), Some(BackendName::Kitty));
    }

    #[test]
    fn test_unsupported_backends_are_skipped() {
        let mut manager = GraphicsManager::new();
        manager.register(boxed(BackendName::Kitty, false));
        manager.register(boxed(BackendName::Sixel, true));
        assert_eq!(manager.active(), Some(BackendName::Sixel));
    }

    #[test]
    fn test_no_usable_backend_yields_none_and_empty_output() {
        let mut manager = GraphicsManager::new();
        manager.register(boxed(BackendName::Kitty, false));
        assert_eq!(manager.active(), None);

        let bitmap = Bitmap::empty();
        let out = manager.render_image(&ImageSource::Pixels(&bitmap), &ImageOptions::default());
        assert!(out.is_empty());
        assert!(manager.clear_image(&ClearTarget::All).is_empty());
    }

    #[test]
    fn test_register_invalidates_cache() {
        let mut manager = GraphicsManager::new();
        manager.register(boxed(BackendName::Braille, true));
        assert_eq!(manager.active(), Some(BackendName::Braille));

        // A better backend arrives: the cache must not pin the old choice
        manager.register(boxed(BackendName::Kitty, true));
        assert_eq!(manager.active(), Some(BackendName::Kitty));
    }

    #[test]
    fn test_preference_entries_without_backend_are_skipped() {
        let mut manager = GraphicsManager::with_preference(vec![
            BackendName::Kitty,
            BackendName::Ascii,
        ]);
        manager.register(boxed(BackendName::Ascii, true));
        assert_eq!(manager.active(), Some(BackendName::Ascii));
    }

    #[test]
    fn test_backend_outside_preference_is_never_selected() {
        let mut manager = GraphicsManager::with_preference(vec![BackendName::Kitty]);
        manager.register(boxed(BackendName::Ascii, true));
        assert_eq!(manager.active(), None);
    }

    #[test]
    fn test_render_delegates_to_active() {
        let mut manager = GraphicsManager::new();
        manager.register(boxed(BackendName::Sixel, true));
        let bitmap = Bitmap::empty();
        let out = manager.render_image(&ImageSource::Pixels(&bitmap), &ImageOptions::default());
        assert_eq!(out, "render:sixel");
    }

    #[test]
    fn test_refresh_rescans() {
        let mut manager = GraphicsManager::new();
        manager.register(boxed(BackendName::Ansi, true));
        assert_eq!(manager.active(), Some(BackendName::Ansi));
        assert_eq!(manager.refresh(), Some(BackendName::Ansi));
    }

    #[test]
    fn test_cursor_position_is_one_based() {
        assert_eq!(cursor_position(0, 0), "\x1b[1;1H");
        assert_eq!(cursor_position(5, 3), "\x1b[4;6H");
    }

    #[test]
    fn test_clear_area_positions_each_row() {
        let out = clear_area(2, 1, 3, 2);
        assert_eq!(out, "\x1b[2;3H   \x1b[3;3H   ");
    }
}
