//! Convenience re-exports for the common rendering workflow.
//!
//! Pulls the types most applications touch into one `use`:
//!
//! ```
//! use termpix::prelude::*;
//!
//! let mut canvas = BrailleCanvas::new(20, 10).unwrap();
//! draw_circle(&mut canvas, 20, 20, 15, Some(Rgb::new(0, 200, 255)));
//! let mut manager = default_manager();
//! let stream = render_vector(&canvas, &mut manager, 0, 0, &BridgeOptions::default());
//! assert!(!stream.is_empty());
//! ```

pub use crate::backend::{
    default_manager, BackendCapabilities, BackendName, ClearTarget, GraphicsBackend,
    GraphicsManager, ImageOptions, ImageSource,
};
pub use crate::bitmap::{Bitmap, PixelFormat};
pub use crate::canvas::BrailleCanvas;
pub use crate::color::{Rgb, Rgba};
pub use crate::error::TermpixError;
pub use crate::primitives::{
    draw_arc, draw_bezier, draw_circle, draw_ellipse, draw_line, draw_rect, fill_circle,
    fill_rect,
};
pub use crate::render::{
    cell_map_to_string, render_bitmap, Cell, CellMap, RasterMode, RasterOptions,
};
pub use crate::vector::{
    canvas_to_pixel_bitmap, has_pixel_backend, render_vector, BridgeOptions,
};
pub use crate::Result;
