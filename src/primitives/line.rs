//! Line drawing using Bresenham's algorithm.
//!
//! Bresenham's line algorithm is an integer-only algorithm for drawing
//! straight lines between two points: no floating point, no division, one
//! dot per step. It handles all octants (horizontal, vertical, diagonal,
//! arbitrary angles) and visits both endpoints.
//!
//! ## Coordinate System
//!
//! Dot coordinates, signed: negative and past-the-edge dots clip silently,
//! so lines may start or end off-canvas without any bounds juggling by the
//! caller.
//!
//! ## References
//!
//! - Bresenham, J.E. (1965). "Algorithm for computer control of a digital
//!   plotter"
//! - <https://en.wikipedia.org/wiki/Bresenham%27s_line_algorithm>

use crate::canvas::BrailleCanvas;
use crate::color::Rgb;

/// Draw a line between two points on the canvas.
///
/// Every visited dot is set; when `color` is given, the cell containing
/// each dot takes that foreground color.
///
/// # Examples
///
/// ```
/// use termpix::BrailleCanvas;
/// use termpix::primitives::draw_line;
///
/// let mut canvas = BrailleCanvas::new(40, 12).unwrap(); // 80×48 dots
///
/// // Horizontal, vertical, diagonal
/// draw_line(&mut canvas, 0, 0, 79, 0, None);
/// draw_line(&mut canvas, 0, 0, 0, 47, None);
/// draw_line(&mut canvas, 0, 0, 79, 47, None);
///
/// // Partially off-canvas: the visible span renders, the rest clips
/// draw_line(&mut canvas, -20, -20, 20, 20, None);
/// ```
pub fn draw_line(
    canvas: &mut BrailleCanvas,
    x0: i32,
    y0: i32,
    x1: i32,
    y1: i32,
    color: Option<Rgb>,
) {
    let dx = (x1 - x0).abs();
    let dy = (y1 - y0).abs();
    let sx = if x0 < x1 { 1 } else { -1 };
    let sy = if y0 < y1 { 1 } else { -1 };

    let mut err = dx - dy;
    let mut x = x0;
    let mut y = y0;

    loop {
        canvas.plot(x, y, color);

        if x == x1 && y == y1 {
            break;
        }

        let e2 = 2 * err;
        if e2 > -dy {
            err -= dy;
            x += sx;
        }
        if e2 < dx {
            err += dx;
            y += sy;
        }
    }
}

/// Round floating-point endpoints and draw the line between them.
///
/// Convenience for the curve primitives, which sample parametrically in
/// floating point and connect consecutive samples.
pub(crate) fn draw_line_rounded(
    canvas: &mut BrailleCanvas,
    x0: f64,
    y0: f64,
    x1: f64,
    y1: f64,
    color: Option<Rgb>,
) {
    draw_line(
        canvas,
        x0.round() as i32,
        y0.round() as i32,
        x1.round() as i32,
        y1.round() as i32,
        color,
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_horizontal_line_sets_every_dot() {
        let mut canvas = BrailleCanvas::new(5, 1).unwrap();
        draw_line(&mut canvas, 0, 0, 9, 0, None);
        for x in 0..10 {
            assert!(canvas.get_dot(x, 0), "dot {x} missing");
        }
        assert!(!canvas.get_dot(0, 1));
    }

    #[test]
    fn test_vertical_line_sets_every_dot() {
        let mut canvas = BrailleCanvas::new(1, 3).unwrap();
        draw_line(&mut canvas, 1, 0, 1, 11, None);
        for y in 0..12 {
            assert!(canvas.get_dot(1, y), "dot {y} missing");
        }
    }

    #[test]
    fn test_diagonal_line_hits_both_endpoints() {
        let mut canvas = BrailleCanvas::new(4, 2).unwrap();
        draw_line(&mut canvas, 0, 0, 7, 7, None);
        assert!(canvas.get_dot(0, 0));
        assert!(canvas.get_dot(7, 7));
        // Perfect diagonal visits exactly one dot per column
        for i in 0..8 {
            assert!(canvas.get_dot(i, i));
        }
    }

    #[test]
    fn test_line_direction_is_symmetric() {
        let mut forward = BrailleCanvas::new(6, 3).unwrap();
        let mut backward = BrailleCanvas::new(6, 3).unwrap();
        draw_line(&mut forward, 1, 2, 10, 9, None);
        draw_line(&mut backward, 10, 9, 1, 2, None);
        for y in 0..forward.dot_height() {
            for x in 0..forward.dot_width() {
                assert_eq!(forward.get_dot(x, y), backward.get_dot(x, y), "({x},{y})");
            }
        }
    }

    #[test]
    fn test_single_point_line() {
        let mut canvas = BrailleCanvas::new(2, 2).unwrap();
        draw_line(&mut canvas, 2, 3, 2, 3, None);
        assert!(canvas.get_dot(2, 3));
    }

    #[test]
    fn test_off_canvas_segments_clip() {
        let mut canvas = BrailleCanvas::new(2, 2).unwrap(); // 4×8 dots
        draw_line(&mut canvas, -5, -5, 10, 10, None);
        assert!(canvas.get_dot(0, 0));
        assert!(canvas.get_dot(3, 3));
    }

    #[test]
    fn test_line_color_lands_on_touched_cells() {
        let mut canvas = BrailleCanvas::new(4, 1).unwrap();
        let red = Rgb::new(255, 0, 0);
        draw_line(&mut canvas, 0, 0, 7, 0, Some(red));
        for cell_x in 0..4 {
            assert_eq!(canvas.cell_color(cell_x, 0), Some(red));
        }
    }
}
