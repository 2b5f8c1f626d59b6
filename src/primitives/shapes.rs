//! Rectangles and cubic Bezier curves.
//!
//! Rectangle outlines are four Bresenham lines; fills set every dot of the
//! half-open region `[x, x+w) × [y, y+h)`. Degenerate sizes (`w <= 0` or
//! `h <= 0`) are absorbed as no-ops.
//!
//! Cubic Beziers sample the parametric cubic with a step count derived
//! from the control polyline's length, then connect consecutive samples
//! with lines - enough density that the curve never shows gaps at braille
//! resolution.

use crate::canvas::BrailleCanvas;
use crate::color::Rgb;
use crate::primitives::line::{draw_line, draw_line_rounded};

/// Draw a rectangle outline.
///
/// The outline spans `[x, x+w-1] × [y, y+h-1]` drawn as four lines.
/// `w <= 0` or `h <= 0` is a no-op.
///
/// # Examples
///
/// ```
/// use termpix::BrailleCanvas;
/// use termpix::primitives::draw_rect;
///
/// let mut canvas = BrailleCanvas::new(10, 5).unwrap();
/// draw_rect(&mut canvas, 2, 2, 10, 8, None);
/// assert!(canvas.get_dot(2, 2));
/// assert!(canvas.get_dot(11, 9)); // opposite corner
/// ```
pub fn draw_rect(canvas: &mut BrailleCanvas, x: i32, y: i32, w: i32, h: i32, color: Option<Rgb>) {
    if w <= 0 || h <= 0 {
        return;
    }

    let x1 = x + w - 1;
    let y1 = y + h - 1;

    draw_line(canvas, x, y, x1, y, color);
    draw_line(canvas, x, y1, x1, y1, color);
    draw_line(canvas, x, y, x, y1, color);
    draw_line(canvas, x1, y, x1, y1, color);
}

/// Fill the half-open rectangle `[x, x+w) × [y, y+h)`.
///
/// Every dot in the region is set. `w <= 0` or `h <= 0` is a no-op.
pub fn fill_rect(canvas: &mut BrailleCanvas, x: i32, y: i32, w: i32, h: i32, color: Option<Rgb>) {
    if w <= 0 || h <= 0 {
        return;
    }

    for dy in 0..h {
        for dx in 0..w {
            canvas.plot(x + dx, y + dy, color);
        }
    }
}

/// Draw a cubic Bezier curve through four control points.
///
/// The step count approximates the curve length by the control polyline
/// (`max(2, ceil(|p0p1| + |p1p2| + |p2p3|))`); samples follow the standard
/// cubic formula
/// `(1−t)³·p0 + 3(1−t)²t·p1 + 3(1−t)t²·p2 + t³·p3`
/// and consecutive samples connect with line segments.
pub fn draw_bezier(
    canvas: &mut BrailleCanvas,
    p0: (f64, f64),
    p1: (f64, f64),
    p2: (f64, f64),
    p3: (f64, f64),
    color: Option<Rgb>,
) {
    let length = segment_length(p0, p1) + segment_length(p1, p2) + segment_length(p2, p3);
    let steps = length.ceil().max(2.0) as usize;

    let mut prev = p0;
    for step in 1..=steps {
        let t = step as f64 / steps as f64;
        let point = cubic_point(p0, p1, p2, p3, t);
        draw_line_rounded(canvas, prev.0, prev.1, point.0, point.1, color);
        prev = point;
    }
}

fn segment_length(a: (f64, f64), b: (f64, f64)) -> f64 {
    ((b.0 - a.0).powi(2) + (b.1 - a.1).powi(2)).sqrt()
}

fn cubic_point(
    p0: (f64, f64),
    p1: (f64, f64),
    p2: (f64, f64),
    p3: (f64, f64),
    t: f64,
) -> (f64, f64) {
    let u = 1.0 - t;
    let w0 = u * u * u;
    let w1 = 3.0 * u * u * t;
    let w2 = 3.0 * u * t * t;
    let w3 = t * t * t;
    (
        w0 * p0.0 + w1 * p1.0 + w2 * p2.0 + w3 * p3.0,
        w0 * p0.1 + w1 * p1.1 + w2 * p2.1 + w3 * p3.1,
    )
}
