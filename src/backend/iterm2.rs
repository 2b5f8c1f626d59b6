//! iTerm2 inline-image backend (OSC 1337).
//!
//! The simplest of the pixel protocols: one OSC sequence carries the whole
//! image,
//!
//! ```text
//! ESC ] 1337 ; File = <params> : <base64-payload> BEL
//! ```
//!
//! with `;`-joined parameters. The protocol transports *files* - callers
//! normally hand it pre-encoded PNG bytes ([`ImageSource::Png`]); raw pixel
//! sources are base64ed as-is, which only terminals accepting raw bitmap
//! files render.
//!
//! Display sizing uses [`SizeSpec`]: `auto`, pixels (`42px`), a percentage
//! of the session (`50%`), or bare cell counts.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;

use crate::backend::{
    clear_area, cursor_position, BackendCapabilities, BackendName, ClearTarget, GraphicsBackend,
    ImageOptions, ImageSource,
};

/// One dimension of an iTerm2 display size
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SizeSpec {
    /// Let the terminal pick (`auto`)
    Auto,
    /// Absolute pixels (`<n>px`)
    Px(u32),
    /// Percentage of the session's width/height (`<n>%`)
    Percent(u32),
    /// Terminal cells (bare `<n>`, the protocol default unit)
    Cells(u32),
}

impl std::fmt::Display for SizeSpec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Auto => f.write_str("auto"),
            Self::Px(n) => write!(f, "{n}px"),
            Self::Percent(n) => write!(f, "{n}%"),
            Self::Cells(n) => write!(f, "{n}"),
        }
    }
}

/// The iTerm2 inline-image backend
///
/// Construction parameters cover the protocol knobs that are properties of
/// the emission rather than of one image: explicit size specs, aspect-ratio
/// preservation, and inline vs. download-only transfer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Iterm2Backend {
    /// Display width; `None` defers to `ImageOptions::cols` or `auto`
    pub width: Option<SizeSpec>,
    /// Display height; `None` defers to `ImageOptions::rows` or `auto`
    pub height: Option<SizeSpec>,
    /// Let the terminal distort the image to fill both dimensions when
    /// `false` (`preserveAspectRatio=0`)
    pub preserve_aspect_ratio: bool,
    /// Display the image inline (`inline=1`) instead of offering a download
    pub inline: bool,
}

impl Default for Iterm2Backend {
    fn default() -> Self {
        Self {
            width: None,
            height: None,
            preserve_aspect_ratio: true,
            inline: true,
        }
    }
}

impl Iterm2Backend {
    /// Create the backend with default settings (inline, aspect preserved).
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set explicit display size specs.
    #[must_use]
    pub const fn with_size(mut self, width: SizeSpec, height: SizeSpec) -> Self {
        self.width = Some(width);
        self.height = Some(height);
        self
    }

    /// Allow the terminal to stretch the image (`preserveAspectRatio=0`).
    #[must_use]
    pub const fn stretching(mut self) -> Self {
        self.preserve_aspect_ratio = false;
        self
    }

    /// Build the OSC 1337 sequence without cursor positioning.
    #[must_use]
    pub fn encode(&self, image: &ImageSource<'_>, opts: &ImageOptions) -> String {
        let payload = image.bytes();
        let mut params: Vec<String> = Vec::new();

        if let Some(name) = &opts.name {
            params.push(format!("name={}", BASE64.encode(name.as_bytes())));
        }
        params.push(format!("size={}", payload.len()));
        params.push(format!("inline={}", u8::from(self.inline)));

        let width = self
            .width
            .or_else(|| opts.cols.map(|c| SizeSpec::Cells(u32::from(c))));
        if let Some(width) = width {
            params.push(format!("width={width}"));
        }
        let height = self
            .height
            .or_else(|| opts.rows.map(|r| SizeSpec::Cells(u32::from(r))));
        if let Some(height) = height {
            params.push(format!("height={height}"));
        }

        if !self.preserve_aspect_ratio {
            params.push("preserveAspectRatio=0".to_string());
        }

        format!(
            "\x1b]1337;File={}:{}\x07",
            params.join(";"),
            BASE64.encode(payload)
        )
    }
}

impl GraphicsBackend for Iterm2Backend {
    fn name(&self) -> BackendName {
        BackendName::Iterm2
    }

    fn capabilities(&self) -> BackendCapabilities {
        BackendCapabilities {
            static_images: true,
            animation: false,
            alpha_channel: true,
            max_width: None,
            max_height: None,
        }
    }

    fn render(&self, image: &ImageSource<'_>, opts: &ImageOptions) -> String {
        let mut out = cursor_position(opts.x, opts.y);
        out.push_str(&self.encode(image, opts));
        out
    }

    fn clear(&self, target: &ClearTarget) -> String {
        // The protocol has no deletion; a cell-area overwrite is the only
        // thing expressible.
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
        crate::backend::detect::iterm2_supported(&crate::backend::detect::SystemEnv)
    }
}
