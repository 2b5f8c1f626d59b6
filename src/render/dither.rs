//! Floyd-Steinberg error diffusion against the 256-color palette.
//!
//! The classic error-diffusion algorithm (Floyd & Steinberg, 1976) adapted
//! to palette quantization: each pixel is replaced by its nearest palette
//! color and the quantization residual is pushed onto the four unvisited
//! neighbors with the canonical coefficients:
//!
//! ```text
//!           x    7/16
//! 3/16   5/16    1/16
//! ```
//!
//! Neighbors outside the buffer are skipped; accumulated channels clamp to
//! `[0, 255]`. The pass mutates the caller's working buffer in place - the
//! renderer hands it a resolved copy, never the source bitmap.

use crate::color::{color256_to_rgb, PaletteCache, Rgb};

/// Diffusion targets relative to the current pixel: `(dx, dy, numerator)`
/// over a fixed denominator of 16.
const DIFFUSION: [(i32, i32, i32); 4] = [(1, 0, 7), (-1, 1, 3), (0, 1, 5), (1, 1, 1)];

/// Quantize a resolved RGB buffer to palette colors with Floyd-Steinberg
/// error diffusion.
///
/// After the pass every pixel holds an exact palette color, so the
/// subsequent nearest-palette mapping is a lossless lookup. Scan order is
/// row-major, left to right.
pub fn floyd_steinberg_palette(pixels: &mut [Rgb], width: usize, height: usize) {
    if width == 0 || height == 0 {
        return;
    }

    // Error accumulates in wider-than-byte space to survive clamping order
    let mut working: Vec<(i32, i32, i32)> = pixels
        .iter()
        .map(|p| (i32::from(p.r), i32::from(p.g), i32::from(p.b)))
        .collect();

    let mut cache = PaletteCache::new();

    for y in 0..height {
        for x in 0..width {
            let index = y * width + x;
            let (r, g, b) = working[index];
            let r = r.clamp(0, 255) as u8;
            let g = g.clamp(0, 255) as u8;
            let b = b.clamp(0, 255) as u8;

            let palette_index = cache.nearest(r, g, b);
            let (pr, pg, pb) = color256_to_rgb(palette_index);
            pixels[index] = Rgb::new(pr, pg, pb);

            let err = (
                i32::from(r) - i32::from(pr),
                i32::from(g) - i32::from(pg),
                i32::from(b) - i32::from(pb),
            );

            for &(dx, dy, weight) in &DIFFUSION {
                let nx = x as i32 + dx;
                let ny = y as i32 + dy;
                if nx < 0 || nx >= width as i32 || ny >= height as i32 {
                    continue;
                }
                let neighbor = ny as usize * width + nx as usize;
                let slot = &mut working[neighbor];
                slot.0 += err.0 * weight / 16;
                slot.1 += err.1 * weight / 16;
                slot.2 += err.2 * weight / 16;
            }
        }
    }
}
