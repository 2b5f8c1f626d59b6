//! Sixel graphics backend (DCS `ESC P q ... ESC \`).
//!
//! The DEC-origin raster protocol: the image is split into horizontal
//! *bands* of six pixel rows, and each band is painted one palette color at
//! a time as a run of printable characters whose low six bits select which
//! of the band's rows light up (`chr(63 + bits)`).
//!
//! ```text
//! ESC P q  #0;2;100;0;0 #1;2;0;100;0   <- palette: #n;2;R%;G%;B%
//! #0 ~~~~!12?  $                       <- band, color 0 ($ = return)
//! #1 ??!4~     $ -                     <- band, color 1 (- = next band)
//! ESC \
//! ```
//!
//! # Palette construction
//!
//! A popularity palette: histogram every opaque pixel's packed RGB, sort by
//! descending count, keep the first `max_colors`. Ties sort by ascending
//! packed value so the output is deterministic. Channel percentages round
//! from the 0-255 range (`round(c / 255 * 100)`).
//!
//! # Run-length encoding
//!
//! Runs of three or more identical column values emit the DECGRI repeat
//! introducer `! <count> <char>`; shorter runs stay literal. RLE can be
//! disabled wholesale in [`SixelConfig`].

use std::collections::HashMap;

use tracing::{debug, error};

use crate::backend::{
    clear_area, cursor_position, BackendCapabilities, BackendName, ClearTarget, GraphicsBackend,
    ImageOptions, ImageSource,
};
use crate::bitmap::Bitmap;
use crate::error::TermpixError;

/// Rows per sixel band.
const BAND_HEIGHT: usize = 6;

/// Smallest palette the protocol can express.
const PALETTE_MIN: usize = 2;

/// Largest palette the protocol can express.
const PALETTE_MAX: usize = 256;

/// Minimum run length worth a DECGRI `!<count>` introducer.
const RLE_THRESHOLD: usize = 3;

/// Construction parameters for the sixel encoder
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SixelConfig {
    /// Palette size cap, 2-256
    pub max_colors: usize,
    /// Emit DECGRI run-length encoding for runs of 3+
    pub rle: bool,
}

impl Default for SixelConfig {
    fn default() -> Self {
        Self {
            max_colors: PALETTE_MAX,
            rle: true,
        }
    }
}

impl SixelConfig {
    /// Create a validated configuration.
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfig` when `max_colors` is outside 2-256.
    pub fn new(max_colors: usize, rle: bool) -> Result<Self, TermpixError> {
        if !(PALETTE_MIN..=PALETTE_MAX).contains(&max_colors) {
            error!(
                max_colors,
                min = PALETTE_MIN,
                max = PALETTE_MAX,
                "Sixel palette size out of range"
            );
            return Err(TermpixError::invalid_config(
                "max_colors",
                max_colors,
                format!("{PALETTE_MIN}-{PALETTE_MAX}"),
            ));
        }
        Ok(Self { max_colors, rle })
    }
}

/// The sixel backend
#[derive(Debug, Clone, Copy, Default)]
pub struct SixelBackend {
    config: SixelConfig,
}

impl SixelBackend {
    /// Create the backend with the given configuration.
    #[must_use]
    pub const fn new(config: SixelConfig) -> Self {
        Self { config }
    }

    /// The active configuration.
    #[must_use]
    pub const fn config(&self) -> SixelConfig {
        self.config
    }

    /// Encode a bitmap as a complete DCS sixel sequence.
    ///
    /// Empty bitmaps - and bitmaps with no opaque pixel at all - produce
    /// the bare `ESC P q ESC \` frame.
    #[must_use]
    pub fn encode(&self, bitmap: &Bitmap) -> String {
        let mut out = String::from("\x1bPq");

        let palette = build_palette(bitmap, self.config.max_colors);
        if bitmap.is_empty() || palette.is_empty() {
            out.push_str("\x1b\\");
            return out;
        }

        debug!(
            width = bitmap.width(),
            height = bitmap.height(),
            colors = palette.len(),
            rle = self.config.rle,
            "Encoding sixel image"
        );

        // Palette header: #n;2;R%;G%;B%
        for (index, &packed) in palette.iter().enumerate() {
            let (r, g, b) = unpack(packed);
            out.push_str(&format!(
                "#{index};2;{};{};{}",
                percent(r),
                percent(g),
                percent(b)
            ));
        }

        let indices = map_pixels(bitmap, &palette);
        let width = bitmap.width();
        let height = bitmap.height();
        let bands = height.div_ceil(BAND_HEIGHT);
        let mut column_values = vec![0u8; width];

        for band in 0..bands {
            let band_y = band * BAND_HEIGHT;
            let band_rows = BAND_HEIGHT.min(height - band_y);

            for color in 0..palette.len() {
                let mut any = false;
                for (x, slot) in column_values.iter_mut().enumerate() {
                    let mut bits = 0u8;
                    for k in 0..band_rows {
                        if indices[(band_y + k) * width + x] == color as u8 {
                            bits |= 1 << k;
                        }
                    }
                    any |= bits != 0;
                    *slot = bits;
                }

                // Nothing of this color in the band: skip the block entirely
                if !any {
                    continue;
                }

                out.push('#');
                out.push_str(&color.to_string());
                encode_band_row(&column_values, self.config.rle, &mut out);
                out.push('$');
            }

            if band + 1 < bands {
                out.push('-');
            }
        }

        out.push_str("\x1b\\");
        out
    }
}

/// Popularity palette: packed RGB values, most frequent first.
///
/// Fully transparent pixels never enter the histogram. Count ties sort by
/// ascending packed value for deterministic output.
fn build_palette(bitmap: &Bitmap, max_colors: usize) -> Vec<u32> {
    let mut histogram: HashMap<u32, u32> = HashMap::new();
    for y in 0..bitmap.height() {
        for x in 0..bitmap.width() {
            let Some(pixel) = bitmap.pixel(x, y) else { continue };
            if pixel.a == 0 {
                continue;
            }
            let packed =
                (u32::from(pixel.r) << 16) | (u32::from(pixel.g) << 8) | u32::from(pixel.b);
            *histogram.entry(packed).or_insert(0) += 1;
        }
    }

    let mut entries: Vec<(u32, u32)> = histogram.into_iter().collect();
    entries.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(&b.0)));
    entries.truncate(max_colors);
    entries.into_iter().map(|(packed, _)| packed).collect()
}

/// Per-pixel palette indices.
///
/// Transparent pixels take index 0; everything else maps to the nearest
/// palette entry by squared distance, exiting early on an exact hit.
fn map_pixels(bitmap: &Bitmap, palette: &[u32]) -> Vec<u8> {
    let mut indices = Vec::with_capacity(bitmap.width() * bitmap.height());

    for y in 0..bitmap.height() {
        for x in 0..bitmap.width() {
            let Some(pixel) = bitmap.pixel(x, y) else { continue };
            if pixel.a == 0 {
                indices.push(0);
                continue;
            }

            let mut best = 0u8;
            let mut best_dist = u32::MAX;
            for (index, &packed) in palette.iter().enumerate() {
                let (pr, pg, pb) = unpack(packed);
                let dr = i32::from(pixel.r) - i32::from(pr);
                let dg = i32::from(pixel.g) - i32::from(pg);
                let db = i32::from(pixel.b) - i32::from(pb);
                let dist = (dr * dr + dg * dg + db * db) as u32;
                if dist == 0 {
                    best = index as u8;
                    break;
                }
                if dist < best_dist {
                    best_dist = dist;
                    best = index as u8;
                }
            }
            indices.push(best);
        }
    }

    indices
}

/// Emit one color's band row, raw or run-length encoded.
fn encode_band_row(values: &[u8], rle: bool, out: &mut String) {
    if !rle {
        for &value in values {
            out.push(sixel_char(value));
        }
        return;
    }

    let mut run_value = values[0];
    let mut run_length = 1usize;

    for &value in &values[1..] {
        if value == run_value {
            run_length += 1;
        } else {
            flush_run(run_value, run_length, out);
            run_value = value;
            run_length = 1;
        }
    }
    flush_run(run_value, run_length, out);
}

fn flush_run(value: u8, length: usize, out: &mut String) {
    if length >= RLE_THRESHOLD {
        out.push('!');
        out.push_str(&length.to_string());
        out.push(sixel_char(value));
    } else {
        for _ in 0..length {
            out.push(sixel_char(value));
        }
    }
}

/// The printable character for a six-bit column value.
#[inline]
const fn sixel_char(value: u8) -> char {
    (63 + value) as char
}

/// Channel percentage for the palette header.
#[inline]
fn percent(channel: u8) -> u32 {
    (f32::from(channel) / 255.0 * 100.0).round() as u32
}

const fn unpack(packed: u32) -> (u8, u8, u8) {
    (
        ((packed >> 16) & 0xff) as u8,
        ((packed >> 8) & 0xff) as u8,
        (packed & 0xff) as u8,
    )
}

impl GraphicsBackend for SixelBackend {
    fn name(&self) -> BackendName {
        BackendName::Sixel
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

    fn render(&self, image: &ImageSource<'_>, opts: &ImageOptions) -> String {
        // Sixel needs pixels; opaque PNG bytes cannot be rasterized here.
        let ImageSource::Pixels(bitmap) = image else {
            return String::new();
        };
        let mut out = cursor_position(opts.x, opts.y);
        out.push_str(&self.encode(bitmap));
        out
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
        crate::backend::detect::sixel_supported(&crate::backend::detect::SystemEnv)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bitmap::PixelFormat;
    use crate::color::Rgba;

    fn bitmap_rgba(width: usize, height: usize, pixels: &[(u8, u8, u8, u8)]) -> Bitmap {
        let data = pixels
            .iter()
            .flat_map(|&(r, g, b, a)| [r, g, b, a])
            .collect();
        Bitmap::new(width, height, PixelFormat::Rgba, data).unwrap()
    }

    #[test]
    fn test_config_validation() {
        assert!(SixelConfig::new(2, true).is_ok());
        assert!(SixelConfig::new(256, false).is_ok());
        assert!(matches!(
            SixelConfig::new(1, true),
            Err(TermpixError::InvalidConfig { .. })
        ));
        assert!(matches!(
            SixelConfig::new(257, true),
            Err(TermpixError::InvalidConfig { .. })
        ));
    }

    #[test]
    fn test_empty_image_emits_bare_frame() {
        let backend = SixelBackend::new(SixelConfig::default());
        let empty = Bitmap::empty();
        assert_eq!(backend.encode(&empty), "\x1bPq\x1b\\");
    }

    #[test]
    fn test_fully_transparent_image_emits_bare_frame() {
        let backend = SixelBackend::new(SixelConfig::default());
        let clear = Bitmap::filled(2, 2, PixelFormat::Rgba, Rgba::new(9, 9, 9, 0));
        assert_eq!(backend.encode(&clear), "\x1bPq\x1b\\");
    }

    #[test]
    fn test_palette_sorted_by_popularity() {
        // 10 red, 5 green, 1 blue
        let mut pixels = Vec::new();
        pixels.extend(std::iter::repeat((255u8, 0u8, 0u8, 255u8)).take(10));
        pixels.extend(std::iter::repeat((0, 255, 0, 255)).take(5));
        pixels.push((0, 0, 255, 255));
        let b = bitmap_rgba(16, 1, &pixels);

        let palette = build_palette(&b, 256);
        assert_eq!(palette, vec![0xff0000, 0x00ff00, 0x0000ff]);
    }

    #[test]
    fn test_palette_ties_break_by_packed_value() {
        let b = bitmap_rgba(2, 1, &[(255, 0, 0, 255), (0, 255, 0, 255)]);
        let palette = build_palette(&b, 256);
        assert_eq!(palette, vec![0x00ff00, 0xff0000]);
    }

    #[test]
    fn test_palette_respects_max_colors() {
        let b = bitmap_rgba(
            3,
            1,
            &[(255, 0, 0, 255), (255, 0, 0, 255), (0, 255, 0, 255)],
        );
        let palette = build_palette(&b, 2);
        assert_eq!(palette.len(), 2);

        let palette = build_palette(&b, 256);
        assert_eq!(palette.len(), 2); // only two distinct colors exist
    }

    #[test]
    fn test_palette_header_percentages() {
        let backend = SixelBackend::new(SixelConfig::default());
        let b = bitmap_rgba(1, 1, &[(255, 128, 0, 255)]);
        let out = backend.encode(&b);
        // 255 -> 100%, 128 -> 50%, 0 -> 0%
        assert!(out.contains("#0;2;100;50;0"));
    }

    #[test]
    fn test_two_column_bands() {
        // Column 0 red, column 1 green, 6 rows: exactly one band
        let mut pixels = Vec::new();
        for _ in 0..6 {
            pixels.push((255u8, 0u8, 0u8, 255u8));
            pixels.push((0, 255, 0, 255));
        }
        let b = bitmap_rgba(2, 6, &pixels);
        let backend = SixelBackend::new(SixelConfig::default());
        let out = backend.encode(&b);

        // Tie at 6 pixels each: green (0x00ff00) sorts before red (0xff0000)
        assert!(out.contains("#0;2;0;100;0"));
        assert!(out.contains("#1;2;100;0;0"));

        // Full column = all six bits = 63 -> chr(126) = '~'; empty = '?'
        assert!(out.contains("#0?~$"));
        assert!(out.contains("#1~?$"));

        // Single band: no newline separator
        assert!(!out.contains('-'));
        assert!(out.ends_with("\x1b\\"));
    }

    #[test]
    fn test_band_separator_between_bands() {
        let b = Bitmap::filled(1, 7, PixelFormat::Rgba, Rgba::new(255, 0, 0, 255));
        let backend = SixelBackend::new(SixelConfig::default());
        let out = backend.encode(&b);
        assert_eq!(out.matches('-').count(), 1); // 2 bands
        // Second band has only one row: bit 0 only -> '@' (63 + 1)
        assert!(out.contains("#0@$"));
    }

    #[test]
    fn test_rle_compresses_long_runs() {
        let b = Bitmap::filled(12, 6, PixelFormat::Rgba, Rgba::new(255, 0, 0, 255));
        let rle = SixelBackend::new(SixelConfig::default()).encode(&b);
        assert!(rle.contains("!12~"));

        let raw = SixelBackend::new(SixelConfig {
            max_colors: 256,
            rle: false,
        })
        .encode(&b);
        assert!(raw.contains(&"~".repeat(12)));
        assert!(!raw.contains('!'));
    }

    #[test]
    fn test_short_runs_stay_literal() {
        let b = bitmap_rgba(2, 6, &{
            let mut pixels = Vec::new();
            for _ in 0..6 {
                pixels.push((255u8, 0u8, 0u8, 255u8));
                pixels.push((255, 0, 0, 255));
            }
            pixels
        });
        let out = SixelBackend::new(SixelConfig::default()).encode(&b);
        // Run of 2 is below the threshold
        assert!(out.contains("~~"));
        assert!(!out.contains('!'));
    }

    #[test]
    fn test_render_requires_pixels() {
        let backend = SixelBackend::new(SixelConfig::default());
        let out = backend.render(&ImageSource::Png(&[1, 2, 3]), &ImageOptions::default());
        assert!(out.is_empty());
    }

    #[test]
    fn test_render_prefixes_cursor() {
        let backend = SixelBackend::new(SixelConfig::default());
        let b = Bitmap::filled(1, 1, PixelFormat::Rgba, Rgba::new(255, 0, 0, 255));
        let out = backend.render(&ImageSource::Pixels(&b), &ImageOptions::default().at(3, 1));
        assert!(out.starts_with("\x1b[2;4H\x1bPq"));
    }
}
