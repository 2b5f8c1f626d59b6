//! Hex parsing, HSL conversion, luminance and alpha blending.
//!
//! # Luminance
//!
//! Two luminance definitions coexist on purpose:
//!
//! - [`relative_luminance`] - the sRGB relative luminance (gamma-decoded
//!   channels weighted 0.2126 / 0.7152 / 0.0722). Used where perceptual
//!   contrast matters (WCAG-style comparisons).
//! - [`perceived_luminance`] - the BT.601 luma approximation
//!   (0.299 / 0.587 / 0.114 over raw channels). Cheap, monotonic enough for
//!   ramp mapping; this is what the ASCII and braille renderers use.
//!
//! # Blending
//!
//! Arithmetic saturates at the 0/255 channel bounds and never fails:
//! [`mix`] is a clamped linear interpolation, [`over`] is Porter-Duff
//! source-over with premultiplied output, [`over_opaque`] composites a
//! straight-alpha color onto an opaque background.

use tracing::error;

use crate::color::{Rgb, Rgba};
use crate::error::TermpixError;

// ============================================================================
// Hex strings
// ============================================================================

/// Parse a hex color string into RGB plus an alpha in `[0, 1]`.
///
/// Accepted forms:
/// - `#RGB` - each digit doubled (`#f80` = `#ff8800`), alpha 1.0
/// - `#RRGGBB` - alpha 1.0
/// - `#RRGGBBAA` - alpha byte scaled to `[0, 1]`
///
/// # Errors
///
/// Returns `InvalidHex` for any other shape: missing `#`, other lengths,
/// non-hex digits.
///
/// # Examples
///
/// ```
/// use termpix::color::hex_to_rgba;
///
/// let (rgb, alpha) = hex_to_rgba("#ff880080").unwrap();
/// assert_eq!((rgb.r, rgb.g, rgb.b), (255, 136, 0));
/// assert!((alpha - 128.0 / 255.0).abs() < 1e-6);
/// ```
pub fn hex_to_rgba(input: &str) -> Result<(Rgb, f32), TermpixError> {
    // Every malformed-input path funnels through here
    let invalid = || {
        error!(input, "Invalid hex color string");
        TermpixError::InvalidHex {
            input: input.to_string(),
        }
    };

    let digits = input.strip_prefix('#').ok_or_else(invalid)?;
    if !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
        return Err(invalid());
    }

    let byte = |s: &str| u8::from_str_radix(s, 16).map_err(|_| invalid());

    match digits.len() {
        3 => {
            let mut channels = [0u8; 3];
            for (slot, d) in channels.iter_mut().zip(digits.chars()) {
                let v = byte(&d.to_string())?;
                *slot = v * 16 + v; // double the nibble: f -> ff
            }
            Ok((Rgb::new(channels[0], channels[1], channels[2]), 1.0))
        }
        6 => Ok((
            Rgb::new(byte(&digits[0..2])?, byte(&digits[2..4])?, byte(&digits[4..6])?),
            1.0,
        )),
        8 => Ok((
            Rgb::new(byte(&digits[0..2])?, byte(&digits[2..4])?, byte(&digits[4..6])?),
            f32::from(byte(&digits[6..8])?) / 255.0,
        )),
        _ => Err(invalid()),
    }
}

/// Parse a hex color string, discarding any alpha component.
///
/// # Errors
///
/// Returns `InvalidHex` for malformed input; see [`hex_to_rgba`].
pub fn hex_to_rgb(input: &str) -> Result<Rgb, TermpixError> {
    hex_to_rgba(input).map(|(rgb, _)| rgb)
}

/// Format an RGB color as a lowercase `#rrggbb` string.
#[must_use]
pub fn rgb_to_hex(color: Rgb) -> String {
    format!("#{:02x}{:02x}{:02x}", color.r, color.g, color.b)
}

// ============================================================================
// Luminance
// ============================================================================

/// sRGB relative luminance in `[0, 1]`.
///
/// Each channel is gamma-decoded with the standard piecewise sRGB transfer
/// function, then weighted 0.2126 / 0.7152 / 0.0722.
#[must_use]
pub fn relative_luminance(color: Rgb) -> f32 {
    fn decode(channel: u8) -> f32 {
        let c = f32::from(channel) / 255.0;
        if c <= 0.039_28 {
            c / 12.92
        } else {
            ((c + 0.055) / 1.055).powf(2.4)
        }
    }

    0.2126 * decode(color.r) + 0.7152 * decode(color.g) + 0.0722 * decode(color.b)
}

/// BT.601 perceptual luminance in `[0, 1]`.
///
/// The weighted sum `0.299 R + 0.587 G + 0.114 B` over raw (gamma-encoded)
/// channels, normalized by 255. This is the cheap luma the text-mode
/// renderers map onto character ramps.
#[inline]
#[must_use]
pub fn perceived_luminance(color: Rgb) -> f32 {
    (0.299 * f32::from(color.r) + 0.587 * f32::from(color.g) + 0.114 * f32::from(color.b)) / 255.0
}

// ============================================================================
// HSL
// ============================================================================

/// Convert RGB to HSL.
///
/// Returns `(h, s, l)` with `h ∈ [0, 360)`, `s ∈ [0, 100]`, `l ∈ [0, 100]`.
/// Achromatic colors (all channels equal) map to `h = 0, s = 0`.
#[must_use]
pub fn rgb_to_hsl(color: Rgb) -> (f32, f32, f32) {
    let r = f32::from(color.r) / 255.0;
    let g = f32::from(color.g) / 255.0;
    let b = f32::from(color.b) / 255.0;

    let max = r.max(g).max(b);
    let min = r.min(g).min(b);
    let l = (max + min) / 2.0;

    if (max - min).abs() < f32::EPSILON {
        return (0.0, 0.0, l * 100.0);
    }

    let d = max - min;
    let s = if l > 0.5 { d / (2.0 - max - min) } else { d / (max + min) };

    let mut h = if (max - r).abs() < f32::EPSILON {
        (g - b) / d
    } else if (max - g).abs() < f32::EPSILON {
        (b - r) / d + 2.0
    } else {
        (r - g) / d + 4.0
    } * 60.0;

    if h < 0.0 {
        h += 360.0;
    }

    (h % 360.0, s * 100.0, l * 100.0)
}

/// Convert HSL to RGB.
///
/// Expects `h ∈ [0, 360)`, `s ∈ [0, 100]`, `l ∈ [0, 100]`; out-of-range
/// inputs are wrapped (hue) or clamped (saturation, lightness).
#[must_use]
pub fn hsl_to_rgb(h: f32, s: f32, l: f32) -> Rgb {
    let h = h.rem_euclid(360.0);
    let s = (s / 100.0).clamp(0.0, 1.0);
    let l = (l / 100.0).clamp(0.0, 1.0);

    let c = (1.0 - (2.0 * l - 1.0).abs()) * s;
    let hp = h / 60.0;
    let x = c * (1.0 - (hp % 2.0 - 1.0).abs());

    let (r1, g1, b1) = match hp as u32 {
        0 => (c, x, 0.0),
        1 => (x, c, 0.0),
        2 => (0.0, c, x),
        3 => (0.0, x, c),
        4 => (x, 0.0, c),
        _ => (c, 0.0, x),
    };

    let m = l - c / 2.0;
    let to_byte = |v: f32| ((v + m) * 255.0).round().clamp(0.0, 255.0) as u8;

    Rgb::new(to_byte(r1), to_byte(g1), to_byte(b1))
}

// ============================================================================
// Blending
// ============================================================================

/// Linear interpolation between two colors.
///
/// `t` is clamped to `[0, 1]`; `mix(a, b, 0) == a` and `mix(a, b, 1) == b`.
/// Channels are rounded to the nearest integer.
#[must_use]
pub fn mix(a: Rgb, b: Rgb, t: f32) -> Rgb {
    let t = t.clamp(0.0, 1.0);
    let lerp = |c1: u8, c2: u8| {
        (f32::from(c1) * (1.0 - t) + f32::from(c2) * t)
            .round()
            .clamp(0.0, 255.0) as u8
    };
    Rgb::new(lerp(a.r, b.r), lerp(a.g, b.g), lerp(a.b, b.b))
}

/// Porter-Duff source-over for two straight-alpha colors.
///
/// Returns the composite with **premultiplied** color channels:
/// `out_a = a_s + a_d (1 - a_s)` and
/// `out_c = c_s a_s + c_d a_d (1 - a_s)`, each rounded back to bytes.
/// A fully transparent result is all zeros.
#[must_use]
pub fn over(src: Rgba, dst: Rgba) -> Rgba {
    let a_s = f32::from(src.a) / 255.0;
    let a_d = f32::from(dst.a) / 255.0;
    let out_a = a_s + a_d * (1.0 - a_s);

    let channel = |c_s: u8, c_d: u8| {
        let v = f32::from(c_s) * a_s + f32::from(c_d) * a_d * (1.0 - a_s);
        v.round().clamp(0.0, 255.0) as u8
    };

    Rgba::new(
        channel(src.r, dst.r),
        channel(src.g, dst.g),
        channel(src.b, dst.b),
        (out_a * 255.0).round().clamp(0.0, 255.0) as u8,
    )
}

/// Composite a straight-alpha color onto an opaque background.
///
/// `out = α · src + (1 - α) · bg` per channel with rounding; the result is
/// opaque so plain RGB is returned. Alpha 255 passes the source through,
/// alpha 0 returns the background.
#[must_use]
pub fn over_opaque(src: Rgba, bg: Rgb) -> Rgb {
    match src.a {
        255 => src.rgb(),
        0 => bg,
        a => {
            let alpha = f32::from(a) / 255.0;
            let channel = |s: u8, d: u8| {
                (alpha * f32::from(s) + (1.0 - alpha) * f32::from(d))
                    .round()
                    .clamp(0.0, 255.0) as u8
            };
            Rgb::new(channel(src.r, bg.r), channel(src.g, bg.g), channel(src.b, bg.b))
        }
    }
}
