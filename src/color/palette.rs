//! The xterm 256-color palette and RGB quantization.
//!
//! # Palette Structure
//!
//! The ANSI 256-color palette is organized into three sections:
//!
//! ## Standard Colors (0-15)
//!
//! The 16 standard ANSI colors with their conventional RGB triples
//! (black, maroon, green, olive, navy, purple, teal, silver, then the
//! bright variants through white).
//!
//! ## 6×6×6 Color Cube (16-231)
//!
//! A cube of 216 colors with 6 levels per channel:
//! - Index = 16 + 36*r + 6*g + b (where r, g, b ∈ {0, 1, 2, 3, 4, 5})
//! - RGB values for each level: 0, 95, 135, 175, 215, 255
//!
//! ## Grayscale Ramp (232-255)
//!
//! 24 shades of gray from dark to light:
//! - Gray value = 8 + 10 * (index - 232)
//! - Values: 8, 18, 28, 38, ..., 238
//!
//! # Quantization
//!
//! [`rgb_to_color256`] performs an exhaustive nearest-neighbor search over
//! all 256 entries with squared Euclidean distance - exact but ~256 distance
//! computations per call. [`rgb_to_color256_smart`] is the O(1) heuristic
//! variant that routes grayish colors to the gray ramp and chromatic colors
//! to the cube. [`PaletteCache`] memoizes the exhaustive search for repeated
//! colors (photo rendering hits the same few hundred colors constantly).

use std::collections::HashMap;

use tracing::{debug, error};

use crate::error::TermpixError;

/// RGB values for each level in the 6×6×6 color cube.
const CUBE_LEVELS: [u8; 6] = [0, 95, 135, 175, 215, 255];

/// The 16 standard ANSI colors (indices 0-15).
const STANDARD_16: [(u8, u8, u8); 16] = [
    (0, 0, 0),       // 0: black
    (128, 0, 0),     // 1: maroon
    (0, 128, 0),     // 2: green
    (128, 128, 0),   // 3: olive
    (0, 0, 128),     // 4: navy
    (128, 0, 128),   // 5: purple
    (0, 128, 128),   // 6: teal
    (192, 192, 192), // 7: silver
    (128, 128, 128), // 8: gray
    (255, 0, 0),     // 9: red
    (0, 255, 0),     // 10: lime
    (255, 255, 0),   // 11: yellow
    (0, 0, 255),     // 12: blue
    (255, 0, 255),   // 13: fuchsia
    (0, 255, 255),   // 14: aqua
    (255, 255, 255), // 15: white
];

const fn build_palette() -> [(u8, u8, u8); 256] {
    let mut table = [(0u8, 0u8, 0u8); 256];

    let mut i = 0;
    while i < 16 {
        table[i] = STANDARD_16[i];
        i += 1;
    }

    // 6×6×6 cube: index 16 + 36r + 6g + b
    let mut r = 0;
    while r < 6 {
        let mut g = 0;
        while g < 6 {
            let mut b = 0;
            while b < 6 {
                table[16 + 36 * r + 6 * g + b] =
                    (CUBE_LEVELS[r], CUBE_LEVELS[g], CUBE_LEVELS[b]);
                b += 1;
            }
            g += 1;
        }
        r += 1;
    }

    // 24-step gray ramp: 8, 18, ..., 238
    let mut k = 0;
    while k < 24 {
        let v = 8 + 10 * k as u8;
        table[232 + k] = (v, v, v);
        k += 1;
    }

    table
}

/// The full 256-entry palette as RGB triples, indexed by Color256 value.
///
/// Immutable and identical across processes; safe to share between threads.
pub static PALETTE_RGB: [(u8, u8, u8); 256] = build_palette();

/// Calculate squared Euclidean distance between two RGB colors.
///
/// Squared distance avoids the sqrt; ordering is preserved for comparison.
#[inline]
const fn distance_squared(r1: u8, g1: u8, b1: u8, r2: u8, g2: u8, b2: u8) -> u32 {
    let dr = (r1 as i32) - (r2 as i32);
    let dg = (g1 as i32) - (g2 as i32);
    let db = (b1 as i32) - (b2 as i32);
    (dr * dr + dg * dg + db * db) as u32
}

/// Look up the RGB triple for a palette index.
#[inline]
#[must_use]
pub const fn color256_to_rgb(index: u8) -> (u8, u8, u8) {
    PALETTE_RGB[index as usize]
}

/// Checked conversion from an untrusted integer to a palette index.
///
/// Use this at boundaries where indices arrive as wider integers (wire
/// values, configuration). Internal APIs hold `u8` and are infallible.
///
/// # Errors
///
/// Returns `InvalidPaletteIndex` if `index > 255`.
pub fn color256_from(index: u32) -> Result<u8, TermpixError> {
    if index > 255 {
        error!(index, "Palette index out of range");
        return Err(TermpixError::InvalidPaletteIndex { index });
    }
    Ok(index as u8)
}

/// Compute the cube index `16 + 36r + 6g + b` for per-channel levels 0-5.
///
/// Levels above 5 are clamped; the function never produces an index outside
/// the cube range 16-231.
#[inline]
#[must_use]
pub const fn color_cube_index(r: u8, g: u8, b: u8) -> u8 {
    let r = if r > 5 { 5 } else { r };
    let g = if g > 5 { 5 } else { g };
    let b = if b > 5 { 5 } else { b };
    16 + 36 * r + 6 * g + b
}

/// Convert RGB to the nearest Color256 palette index.
///
/// Exhaustive nearest-neighbor search over the full 256-entry table using
/// squared Euclidean distance. Exits early on an exact match; distance ties
/// resolve to the lowest index (the scan is ascending and only a strictly
/// smaller distance replaces the candidate).
///
/// # Examples
///
/// ```
/// use termpix::color::rgb_to_color256;
///
/// // The standard colors map to themselves
/// assert_eq!(rgb_to_color256(0, 0, 0), 0);
/// assert_eq!(rgb_to_color256(255, 0, 0), 9);
/// assert_eq!(rgb_to_color256(255, 255, 255), 15);
/// ```
#[must_use]
pub fn rgb_to_color256(r: u8, g: u8, b: u8) -> u8 {
    let mut best = 0u8;
    let mut best_dist = u32::MAX;

    for (index, &(pr, pg, pb)) in PALETTE_RGB.iter().enumerate() {
        let dist = distance_squared(r, g, b, pr, pg, pb);
        if dist == 0 {
            return index as u8;
        }
        if dist < best_dist {
            best_dist = dist;
            best = index as u8;
        }
    }

    best
}

/// Find the closest cube level (0-5) for a channel value.
///
/// Boundaries are the midpoints between the cube levels 0, 95, 135, 175,
/// 215, 255.
#[inline]
const fn closest_cube_level(value: u8) -> u8 {
    match value {
        0..=47 => 0,
        48..=114 => 1,
        115..=154 => 2,
        155..=194 => 3,
        195..=234 => 4,
        235..=255 => 5,
    }
}

/// Convert RGB to Color256 with the fast gray/cube routing heuristic.
///
/// Grayish colors (`max channel - min channel <= 16`) map onto the 24-step
/// gray ramp via `232 + clamp(round((avg - 8) / 10), 0, 23)`; chromatic
/// colors map into the 6×6×6 cube by per-channel level thresholding. O(1)
/// instead of the exhaustive scan, at the cost of never using the standard
/// 0-15 entries.
///
/// # Examples
///
/// ```
/// use termpix::color::rgb_to_color256_smart;
///
/// // Mid-gray lands on the ramp, not the cube
/// let idx = rgb_to_color256_smart(128, 128, 128);
/// assert!((232..=255).contains(&idx));
///
/// // Saturated red lands in the cube
/// assert_eq!(rgb_to_color256_smart(255, 0, 0), 196);
/// ```
#[must_use]
pub fn rgb_to_color256_smart(r: u8, g: u8, b: u8) -> u8 {
    let max = r.max(g).max(b);
    let min = r.min(g).min(b);

    if max - min <= 16 {
        let avg = f32::from(u16::from(r) + u16::from(g) + u16::from(b)) / 3.0;
        let step = ((avg - 8.0) / 10.0).round().clamp(0.0, 23.0) as u8;
        return 232 + step;
    }

    color_cube_index(closest_cube_level(r), closest_cube_level(g), closest_cube_level(b))
}

/// Entry bound before the memo resets.
///
/// A photo quantized at 256 colors per frame never comes close; the bound
/// only matters for adversarial inputs cycling through all 16M colors.
const PALETTE_CACHE_LIMIT: usize = 1 << 16;

/// Caller-owned memoization of [`rgb_to_color256`].
///
/// Keyed by the packed 24-bit RGB triple. The cache is bounded (it resets
/// once [`PALETTE_CACHE_LIMIT`] distinct colors have been seen) and can be
/// cleared explicitly. Callers that need a custom distance function or a
/// restricted palette should bypass the cache and use the plain functions.
///
/// There is deliberately no process-wide instance: the cache is plain
/// mutable state owned by whoever renders.
///
/// # Examples
///
/// ```
/// use termpix::color::PaletteCache;
///
/// let mut cache = PaletteCache::new();
/// assert_eq!(cache.nearest(255, 0, 0), 9);
/// assert_eq!(cache.nearest(255, 0, 0), 9); // memoized
/// cache.clear();
/// assert!(cache.is_empty());
/// ```
#[derive(Debug, Default)]
pub struct PaletteCache {
    map: HashMap<u32, u8>,
}

impl PaletteCache {
    /// Create an empty cache.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Nearest palette index for the color, memoized.
    pub fn nearest(&mut self, r: u8, g: u8, b: u8) -> u8 {
        let key = (u32::from(r) << 16) | (u32::from(g) << 8) | u32::from(b);
        if let Some(&index) = self.map.get(&key) {
            return index;
        }

        let index = rgb_to_color256(r, g, b);
        if self.map.len() >= PALETTE_CACHE_LIMIT {
            debug!(entries = self.map.len(), "Palette cache limit reached, resetting");
            self.map.clear();
        }
        self.map.insert(key, index);
        index
    }

    /// Drop all memoized entries.
    pub fn clear(&mut self) {
        self.map.clear();
    }

    /// Number of memoized colors.
    #[must_use]
    pub fn len(&self) -> usize {
        self.map.len()
    }

    /// Whether the cache holds no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }
}
