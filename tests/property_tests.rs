//! Property-based tests for termpix
//!
//! Uses proptest to verify invariants that must hold for arbitrary inputs.
//! These tests catch edge cases that traditional unit tests might miss.
//!
//! ## Test Categories
//!
//! - **Color system**: hex/HSL round trips, quantization ranges, blending
//! - **Canvas operations**: dot set/get/clear, out-of-bounds absorption
//! - **Rendering**: dimension formulas, serialization framing
//! - **Backends**: kitty chunk reassembly, sixel never panics

use proptest::prelude::*;

// =============================================================================
// Color Property Tests
// =============================================================================

mod color_tests {
    use super::*;
    use termpix::color::{
        hex_to_rgb, hsl_to_rgb, mix, rgb_to_color256, rgb_to_color256_smart, rgb_to_hex,
        rgb_to_hsl, PaletteCache, PALETTE_RGB,
    };
    use termpix::Rgb;

    proptest! {
        /// Hex formatting and parsing are exact inverses
        #[test]
        fn hex_round_trip(r in any::<u8>(), g in any::<u8>(), b in any::<u8>()) {
            let color = Rgb::new(r, g, b);
            prop_assert_eq!(hex_to_rgb(&rgb_to_hex(color)).unwrap(), color);
        }

        /// HSL round trip stays within one unit per channel
        #[test]
        fn hsl_round_trip_tolerance(r in any::<u8>(), g in any::<u8>(), b in any::<u8>()) {
            let color = Rgb::new(r, g, b);
            let (h, s, l) = rgb_to_hsl(color);
            let back = hsl_to_rgb(h, s, l);
            prop_assert!((i16::from(back.r) - i16::from(color.r)).abs() <= 1);
            prop_assert!((i16::from(back.g) - i16::from(color.g)).abs() <= 1);
            prop_assert!((i16::from(back.b) - i16::from(color.b)).abs() <= 1);
        }

        /// HSL hue is always in [0, 360), saturation/lightness in [0, 100]
        #[test]
        fn hsl_ranges(r in any::<u8>(), g in any::<u8>(), b in any::<u8>()) {
            let (h, s, l) = rgb_to_hsl(Rgb::new(r, g, b));
            prop_assert!((0.0..360.0).contains(&h));
            prop_assert!((0.0..=100.0).contains(&s));
            prop_assert!((0.0..=100.0).contains(&l));
        }

        /// Quantizing any palette entry returns an index with that exact RGB
        #[test]
        fn quantize_palette_entries_is_exact(index in 0usize..256) {
            let (r, g, b) = PALETTE_RGB[index];
            let found = rgb_to_color256(r, g, b);
            prop_assert_eq!(PALETTE_RGB[found as usize], (r, g, b));
        }

        /// The smart variant always lands in the cube or the gray ramp
        #[test]
        fn smart_quantization_range(r in any::<u8>(), g in any::<u8>(), b in any::<u8>()) {
            let index = rgb_to_color256_smart(r, g, b);
            prop_assert!(index >= 16);
        }

        /// The cache never disagrees with the plain function
        #[test]
        fn cache_transparency(r in any::<u8>(), g in any::<u8>(), b in any::<u8>()) {
            let mut cache = PaletteCache::new();
            prop_assert_eq!(cache.nearest(r, g, b), rgb_to_color256(r, g, b));
            prop_assert_eq!(cache.nearest(r, g, b), rgb_to_color256(r, g, b));
        }

        /// mix endpoints are exact for any color pair
        #[test]
        fn mix_endpoints(
            r1 in any::<u8>(), g1 in any::<u8>(), b1 in any::<u8>(),
            r2 in any::<u8>(), g2 in any::<u8>(), b2 in any::<u8>(),
        ) {
            let a = Rgb::new(r1, g1, b1);
            let b = Rgb::new(r2, g2, b2);
            prop_assert_eq!(mix(a, b, 0.0), a);
            prop_assert_eq!(mix(a, b, 1.0), b);
            // Out-of-range t clamps to the endpoints
            prop_assert_eq!(mix(a, b, -1.5), a);
            prop_assert_eq!(mix(a, b, 2.5), b);
        }
    }
}

// =============================================================================
// Canvas Property Tests
// =============================================================================

mod canvas_tests {
    use super::*;
    use termpix::BrailleCanvas;

    proptest! {
        /// Canvas creation succeeds for any valid dimensions
        #[test]
        fn canvas_new_valid_dimensions(w in 1usize..200, h in 1usize..200) {
            let canvas = BrailleCanvas::new(w, h).unwrap();
            prop_assert_eq!(canvas.width_cells(), w);
            prop_assert_eq!(canvas.height_cells(), h);
            prop_assert_eq!(canvas.dot_width(), w * 2);
            prop_assert_eq!(canvas.dot_height(), h * 4);
        }

        /// set -> get -> clear -> get round-trips for any in-bounds dot
        #[test]
        fn dot_round_trip(
            w in 1usize..50,
            h in 1usize..50,
            x in 0usize..100,
            y in 0usize..200,
        ) {
            let mut canvas = BrailleCanvas::new(w, h).unwrap();
            let x = x % canvas.dot_width();
            let y = y % canvas.dot_height();

            prop_assert!(!canvas.get_dot(x, y));
            canvas.set_dot(x, y);
            prop_assert!(canvas.get_dot(x, y));
            canvas.clear_dot(x, y);
            prop_assert!(!canvas.get_dot(x, y));
        }

        /// Out-of-bounds dot operations never panic and never report set
        #[test]
        fn out_of_bounds_dots_absorbed(
            w in 1usize..20,
            h in 1usize..20,
            x in 0usize..10_000,
            y in 0usize..10_000,
        ) {
            let mut canvas = BrailleCanvas::new(w, h).unwrap();
            canvas.set_dot(x, y);
            canvas.clear_dot(x, y);
            if x >= canvas.dot_width() || y >= canvas.dot_height() {
                prop_assert!(!canvas.get_dot(x, y));
            }
        }

        /// Setting one dot changes exactly one cell's pattern
        #[test]
        fn single_dot_touches_single_cell(
            w in 1usize..20,
            h in 1usize..20,
            x in 0usize..40,
            y in 0usize..80,
        ) {
            let mut canvas = BrailleCanvas::new(w, h).unwrap();
            let x = x % canvas.dot_width();
            let y = y % canvas.dot_height();
            canvas.set_dot(x, y);

            let mut touched = 0;
            for cy in 0..h {
                for cx in 0..w {
                    if canvas.cell_pattern(cx, cy) != 0 {
                        touched += 1;
                        prop_assert_eq!((cx, cy), (x / 2, y / 4));
                    }
                }
            }
            prop_assert_eq!(touched, 1);
        }

        /// Every glyph the canvas produces is in the braille block
        #[test]
        fn glyphs_stay_in_braille_block(
            w in 1usize..10,
            h in 1usize..10,
            dots in prop::collection::vec((0usize..20, 0usize..40), 0..64),
        ) {
            let mut canvas = BrailleCanvas::new(w, h).unwrap();
            for (x, y) in dots {
                canvas.set_dot(x, y);
            }
            for cy in 0..h {
                for cx in 0..w {
                    let glyph = canvas.cell_char(cx, cy) as u32;
                    prop_assert!((0x2800..=0x28ff).contains(&glyph));
                }
            }
        }
    }
}

// =============================================================================
// Primitive Property Tests
// =============================================================================

mod primitive_tests {
    use super::*;
    use termpix::primitives::{draw_circle, draw_line, fill_rect};
    use termpix::BrailleCanvas;

    proptest! {
        /// A line always sets both in-bounds endpoints
        #[test]
        fn line_sets_endpoints(
            x0 in 0i32..40, y0 in 0i32..40,
            x1 in 0i32..40, y1 in 0i32..40,
        ) {
            let mut canvas = BrailleCanvas::new(20, 10).unwrap(); // 40×40 dots
            draw_line(&mut canvas, x0, y0, x1, y1, None);
            prop_assert!(canvas.get_dot(x0 as usize, y0 as usize));
            prop_assert!(canvas.get_dot(x1 as usize, y1 as usize));
        }

        /// Lines with arbitrary (possibly wild) coordinates never panic
        #[test]
        fn line_never_panics(
            x0 in -1000i32..1000, y0 in -1000i32..1000,
            x1 in -1000i32..1000, y1 in -1000i32..1000,
        ) {
            let mut canvas = BrailleCanvas::new(10, 10).unwrap();
            draw_line(&mut canvas, x0, y0, x1, y1, None);
        }

        /// Circles never panic regardless of center and radius
        #[test]
        fn circle_never_panics(
            cx in -100i32..100, cy in -100i32..100, r in -10i32..60,
        ) {
            let mut canvas = BrailleCanvas::new(10, 10).unwrap();
            draw_circle(&mut canvas, cx, cy, r, None);
        }

        /// fill_rect sets exactly w*h dots when fully in bounds
        #[test]
        fn fill_rect_dot_count(
            x in 0i32..10, y in 0i32..10,
            w in 1i32..10, h in 1i32..10,
        ) {
            let mut canvas = BrailleCanvas::new(10, 5).unwrap(); // 20×20 dots
            fill_rect(&mut canvas, x, y, w, h, None);

            let mut count = 0;
            for dy in 0..canvas.dot_height() {
                for dx in 0..canvas.dot_width() {
                    if canvas.get_dot(dx, dy) {
                        count += 1;
                    }
                }
            }
            prop_assert_eq!(count, (w * h) as usize);
        }
    }
}

// =============================================================================
// Rendering Property Tests
// =============================================================================

mod render_tests {
    use super::*;
    use termpix::{
        cell_map_to_string, render_bitmap, Bitmap, PixelFormat, RasterMode, RasterOptions, Rgba,
    };

    proptest! {
        /// Cell-map dimensions follow the mode formulas for any bitmap size
        #[test]
        fn dimension_formulas(w in 0usize..40, h in 0usize..40) {
            let bitmap = Bitmap::filled(w, h, PixelFormat::Rgba, Rgba::new(9, 9, 9, 255));

            let color = render_bitmap(&bitmap, &RasterOptions::default());
            let ascii = render_bitmap(
                &bitmap,
                &RasterOptions::default().with_mode(RasterMode::Ascii),
            );
            let braille = render_bitmap(
                &bitmap,
                &RasterOptions::default().with_mode(RasterMode::Braille),
            );

            if w == 0 || h == 0 {
                prop_assert_eq!((color.width(), color.height()), (0, 0));
                prop_assert_eq!((ascii.width(), ascii.height()), (0, 0));
                prop_assert_eq!((braille.width(), braille.height()), (0, 0));
            } else {
                prop_assert_eq!((color.width(), color.height()), (w, h.div_ceil(2)));
                prop_assert_eq!((ascii.width(), ascii.height()), (w, h));
                prop_assert_eq!(
                    (braille.width(), braille.height()),
                    (w.div_ceil(2), h.div_ceil(4))
                );
            }
        }

        /// Serialization always ends with the SGR reset and emits at most
        /// one color pair per cell
        #[test]
        fn serialization_framing(w in 1usize..16, h in 1usize..16, seed in any::<u32>()) {
            let mut data = Vec::new();
            let mut state = seed;
            for _ in 0..w * h {
                // Cheap xorshift so pixel data varies with the seed
                state ^= state << 13;
                state ^= state >> 17;
                state ^= state << 5;
                data.extend_from_slice(&[
                    (state >> 16) as u8,
                    (state >> 8) as u8,
                    state as u8,
                    255,
                ]);
            }
            let bitmap = Bitmap::new(w, h, PixelFormat::Rgba, data).unwrap();
            let map = render_bitmap(&bitmap, &RasterOptions::default());
            let out = cell_map_to_string(&map);

            prop_assert!(out.ends_with("\x1b[0m"));
            prop_assert!(out.matches("38;5;").count() <= map.width() * map.height());
            prop_assert_eq!(out.matches('\n').count(), map.height() - 1);
        }

        /// Nearest-neighbor resize hits the requested dimensions exactly
        #[test]
        fn resize_dimensions(
            sw in 1usize..32, sh in 1usize..32,
            dw in 0usize..64, dh in 0usize..64,
        ) {
            let bitmap = Bitmap::filled(sw, sh, PixelFormat::Rgb, Rgba::new(1, 2, 3, 255));
            let resized = bitmap.resize_nearest(dw, dh);
            if dw == 0 || dh == 0 {
                prop_assert!(resized.is_empty());
            } else {
                prop_assert_eq!((resized.width(), resized.height()), (dw, dh));
                prop_assert_eq!(resized.data().len(), dw * dh * 3);
            }
        }
    }
}

// =============================================================================
// Backend Property Tests
// =============================================================================

mod backend_tests {
    use super::*;
    use base64::engine::general_purpose::STANDARD as BASE64;
    use base64::Engine as _;
    use termpix::backend::{ImageOptions, ImageSource, KittyBackend, SixelBackend, SixelConfig};
    use termpix::{Bitmap, PixelFormat, Rgba};

    proptest! {
        /// Kitty chunk reassembly is lossless for any payload size
        #[test]
        fn kitty_chunks_reassemble(w in 1usize..64, h in 1usize..64) {
            let bitmap = Bitmap::filled(w, h, PixelFormat::Rgba, Rgba::new(7, 7, 7, 255));
            let payload = BASE64.encode(bitmap.data());
            let out = KittyBackend::new()
                .transmit_and_display(&ImageSource::Pixels(&bitmap), &ImageOptions::default());

            let reassembled: String = out
                .split("\x1b\\")
                .filter_map(|part| {
                    part.find("\x1b_G")
                        .map(|at| &part[at + 3..])
                        .and_then(|body| body.split(';').nth(1))
                })
                .collect();
            prop_assert_eq!(reassembled, payload);
        }

        /// Sixel encoding never panics and always frames correctly
        #[test]
        fn sixel_framing(w in 0usize..20, h in 0usize..20, value in any::<u8>()) {
            let bitmap = Bitmap::filled(w, h, PixelFormat::Rgba, Rgba::new(value, value, 100, 255));
            let out = SixelBackend::new(SixelConfig::default()).encode(&bitmap);
            prop_assert!(out.starts_with("\x1bPq"));
            prop_assert!(out.ends_with("\x1b\\"));
        }
    }
}
