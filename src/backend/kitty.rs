//! Kitty graphics protocol backend (APC `ESC _ G ... ESC \`).
//!
//! The most capable of the pixel protocols: images are transmitted once,
//! referenced by id, placed anywhere, deleted selectively, and animated
//! frame-by-frame - all through APC sequences of the form
//!
//! ```text
//! ESC _ G <control-key-csv> [ ; <base64-payload> ] ESC \
//! ```
//!
//! # Control keys
//!
//! | Key | Meaning |
//! |-----|---------|
//! | `a` | action: `T` transmit+display, `t` transmit, `p` place, `d` delete, `q` query, `f` frame, `a` animate |
//! | `f` | format: `24` RGB, `32` RGBA, `100` PNG |
//! | `t` | transport: `d` direct (payload in-band) |
//! | `m` | more-chunks flag |
//! | `s`,`v` | source pixel width / height |
//! | `i`,`p` | image id / placement id |
//! | `c`,`r` | display columns / rows |
//! | `z` | z-index |
//! | `C` | hold cursor |
//! | `d` | delete mode |
//! | `q` | quiet level (2 = suppress all responses) |
//!
//! # Chunking
//!
//! Payloads beyond 4096 base64 bytes are split: every chunk except the last
//! has a length that is a multiple of 4 and at most 4096. The first chunk
//! carries all control keys plus `m=1`, intermediate chunks only `m=1`, the
//! final chunk only `m=0`. Reassembling the chunks in order recovers the
//! original base64 exactly.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use tracing::{debug, error};

use crate::backend::{
    cursor_position, BackendCapabilities, BackendName, ClearTarget, GraphicsBackend, ImageOptions,
    ImageSource,
};
use crate::bitmap::{Bitmap, PixelFormat};
use crate::error::TermpixError;

/// Maximum base64 bytes per APC payload chunk.
const MAX_CHUNK: usize = 4096;

/// Quiet level transmitted with every sequence: suppress all responses.
const QUIET: &str = "2";

/// Selective deletion modes (`a=d`)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KittyDelete {
    /// Delete every visible image and free their data (`d=A`)
    All,
    /// Delete one image by id and free its data (`d=I`)
    Image(u32),
    /// Delete one image's placements but keep the pixels (`d=i`)
    ImageKeepData(u32),
    /// Delete images intersecting the cursor cell, freeing data (`d=C`)
    AtCursor,
    /// Delete images intersecting the cursor cell, keeping data (`d=c`)
    AtCursorKeepData,
}

/// Frame-upload parameters for animation (`a=f`)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FrameOptions {
    /// 1-based frame number being replaced or appended
    pub frame_number: u32,
    /// Frame to composite this one onto, if any
    pub background_frame: Option<u32>,
    /// How long the frame is displayed, in milliseconds
    pub duration_ms: u32,
    /// Sub-rectangle x offset within the image, if partial
    pub x: Option<u32>,
    /// Sub-rectangle y offset within the image, if partial
    pub y: Option<u32>,
}

/// The Kitty graphics backend
///
/// Stateless: every method is a pure byte-string producer. Animation
/// *scheduling* is the caller's problem; this backend only produces the
/// upload and playback-control sequences.
#[derive(Debug, Clone, Copy, Default)]
pub struct KittyBackend;

impl KittyBackend {
    /// Create the backend.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// The fixed capability-query handshake.
    ///
    /// Transmits a 1×1 RGB probe under the reserved id 31; a capable
    /// terminal answers with an APC response, an incapable one stays
    /// silent.
    #[must_use]
    pub fn query() -> String {
        // Payload: three zero bytes, base64 "AAAA"
        "\x1b_Gi=31,s=1,v=1,a=q,t=d,f=24;AAAA\x1b\\".to_string()
    }

    /// Transmit an image and display it at the cursor (`a=T`).
    ///
    /// Raw pixel sources carry their dimensions in `s,v`; PNG sources omit
    /// them (the terminal reads the header). The cursor-position prefix
    /// comes from `opts.x/y`.
    #[must_use]
    pub fn transmit_and_display(&self, image: &ImageSource<'_>, opts: &ImageOptions) -> String {
        let mut out = cursor_position(opts.x, opts.y);
        self.emit_transmission('T', image, opts, &mut out);
        out
    }

    /// Transmit an image without displaying it (`a=t`).
    ///
    /// Pair with [`place`](Self::place) to display it later by id.
    #[must_use]
    pub fn transmit(&self, image: &ImageSource<'_>, opts: &ImageOptions) -> String {
        let mut out = String::new();
        self.emit_transmission('t', image, opts, &mut out);
        out
    }

    /// Display a previously transmitted image (`a=p`).
    #[must_use]
    pub fn place(&self, image_id: u32, opts: &ImageOptions) -> String {
        let mut controls = vec![('a', "p".to_string()), ('i', image_id.to_string())];
        push_placement_keys(&mut controls, opts);
        controls.push(('q', QUIET.to_string()));

        let mut out = cursor_position(opts.x, opts.y);
        emit_sequence(&mut out, &controls, None);
        out
    }

    /// Delete images (`a=d`).
    #[must_use]
    pub fn delete(&self, mode: KittyDelete) -> String {
        let mut controls = vec![('a', "d".to_string())];
        match mode {
            KittyDelete::All => controls.push(('d', "A".to_string())),
            KittyDelete::Image(id) => {
                controls.push(('d', "I".to_string()));
                controls.push(('i', id.to_string()));
            }
            KittyDelete::ImageKeepData(id) => {
                controls.push(('d', "i".to_string()));
                controls.push(('i', id.to_string()));
            }
            KittyDelete::AtCursor => controls.push(('d', "C".to_string())),
            KittyDelete::AtCursorKeepData => controls.push(('d', "c".to_string())),
        }
        controls.push(('q', QUIET.to_string()));

        let mut out = String::new();
        emit_sequence(&mut out, &controls, None);
        out
    }

    /// Upload one animation frame for an image (`a=f`).
    ///
    /// The frame data rides the same chunked transmission as a normal
    /// image; `r` carries the frame number, `c` the background frame, `z`
    /// the display duration, and `x,y,s,v` the sub-rectangle.
    #[must_use]
    pub fn upload_frame(
        &self,
        image_id: u32,
        image: &ImageSource<'_>,
        frame: &FrameOptions,
    ) -> String {
        let mut controls = vec![
            ('a', "f".to_string()),
            ('f', image_format(image).to_string()),
            ('t', "d".to_string()),
            ('q', QUIET.to_string()),
            ('i', image_id.to_string()),
            ('r', frame.frame_number.to_string()),
        ];
        if let Some(bg) = frame.background_frame {
            controls.push(('c', bg.to_string()));
        }
        controls.push(('z', frame.duration_ms.to_string()));
        if let Some(x) = frame.x {
            controls.push(('x', x.to_string()));
        }
        if let Some(y) = frame.y {
            controls.push(('y', y.to_string()));
        }
        if let Some((width, height)) = image.dimensions() {
            controls.push(('s', width.to_string()));
            controls.push(('v', height.to_string()));
        }

        let payload = BASE64.encode(image.bytes());
        let mut out = String::new();
        emit_chunked(&mut out, controls, &payload);
        out
    }

    /// Start animation playback (`a=a, s=3`).
    ///
    /// `loops == 0` plays forever (`v=1`); otherwise `v = loops + 1` per
    /// the protocol's loop-count encoding.
    #[must_use]
    pub fn start_animation(&self, image_id: u32, loops: u32) -> String {
        let v = if loops == 0 { 1 } else { loops + 1 };
        let controls = vec![
            ('a', "a".to_string()),
            ('i', image_id.to_string()),
            ('s', "3".to_string()),
            ('v', v.to_string()),
            ('q', QUIET.to_string()),
        ];
        let mut out = String::new();
        emit_sequence(&mut out, &controls, None);
        out
    }

    /// Stop animation playback (`a=a, s=1`).
    #[must_use]
    pub fn stop_animation(&self, image_id: u32) -> String {
        let controls = vec![
            ('a', "a".to_string()),
            ('i', image_id.to_string()),
            ('s', "1".to_string()),
            ('q', QUIET.to_string()),
        ];
        let mut out = String::new();
        emit_sequence(&mut out, &controls, None);
        out
    }

    /// Upload a whole animation and start playback.
    ///
    /// The first frame transmits (and displays) as the root image; each
    /// further frame uploads with its delay; a playback-start sequence
    /// closes the stream.
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfig` when `frames` and `delays_ms` differ in
    /// length, when a delay is zero, or when `frames` is empty.
    pub fn transmit_animation(
        &self,
        image_id: u32,
        frames: &[&Bitmap],
        delays_ms: &[u32],
        loops: u32,
        opts: &ImageOptions,
    ) -> Result<String, TermpixError> {
        if frames.is_empty() {
            error!(image_id, "Animation rejected: no frames");
            return Err(TermpixError::invalid_config(
                "animation frames",
                0,
                "at least one frame",
            ));
        }
        if frames.len() != delays_ms.len() {
            error!(
                image_id,
                frame_count = frames.len(),
                delay_count = delays_ms.len(),
                "Animation rejected: frame/delay length mismatch"
            );
            return Err(TermpixError::invalid_config(
                "animation delays length",
                delays_ms.len(),
                format!("{} (one delay per frame)", frames.len()),
            ));
        }
        if let Some(zero) = delays_ms.iter().position(|&d| d == 0) {
            error!(image_id, delay_index = zero, "Animation rejected: zero frame delay");
            return Err(TermpixError::invalid_config(
                format!("animation delay #{zero}"),
                0,
                "a positive duration in milliseconds",
            ));
        }

        debug!(image_id, frame_count = frames.len(), loops, "Encoding kitty animation");

        let opts = opts.clone().with_id(image_id);
        let mut out = self.transmit_and_display(&ImageSource::Pixels(frames[0]), &opts);
        for (index, (frame, &delay)) in frames.iter().zip(delays_ms).enumerate().skip(1) {
            out.push_str(&self.upload_frame(
                image_id,
                &ImageSource::Pixels(frame),
                &FrameOptions {
                    frame_number: index as u32 + 1,
                    duration_ms: delay,
                    ..FrameOptions::default()
                },
            ));
        }
        out.push_str(&self.start_animation(image_id, loops));
        Ok(out)
    }

    /// Shared transmit body for `a=T` / `a=t`.
    fn emit_transmission(
        &self,
        action: char,
        image: &ImageSource<'_>,
        opts: &ImageOptions,
        out: &mut String,
    ) {
        let mut controls = vec![
            ('a', action.to_string()),
            ('f', image_format(image).to_string()),
            ('t', "d".to_string()),
            ('q', QUIET.to_string()),
        ];
        if let Some((width, height)) = image.dimensions() {
            controls.push(('s', width.to_string()));
            controls.push(('v', height.to_string()));
        }
        push_placement_keys(&mut controls, opts);
        if let Some(id) = opts.image_id {
            controls.push(('i', id.to_string()));
        }

        let payload = BASE64.encode(image.bytes());
        emit_chunked(out, controls, &payload);
    }
}

/// Format key value for an image source: 24 RGB, 32 RGBA, 100 PNG.
const fn image_format(image: &ImageSource<'_>) -> u32 {
    match image {
        ImageSource::Pixels(bitmap) => match bitmap.format() {
            PixelFormat::Rgb => 24,
            PixelFormat::Rgba => 32,
        },
        ImageSource::Png(_) => 100,
    }
}

/// Display keys shared by transmit+display and place: `c,r,p,z,C`.
fn push_placement_keys(controls: &mut Vec<(char, String)>, opts: &ImageOptions) {
    if let Some(cols) = opts.cols {
        controls.push(('c', cols.to_string()));
    }
    if let Some(rows) = opts.rows {
        controls.push(('r', rows.to_string()));
    }
    if let Some(placement) = opts.placement_id {
        controls.push(('p', placement.to_string()));
    }
    if let Some(z) = opts.z_index {
        controls.push(('z', z.to_string()));
    }
    if opts.hold_cursor {
        controls.push(('C', "1".to_string()));
    }
}

/// Emit one `ESC _ G controls ; payload ESC \` sequence.
fn emit_sequence(out: &mut String, controls: &[(char, String)], payload: Option<&str>) {
    out.push_str("\x1b_G");
    for (index, (key, value)) in controls.iter().enumerate() {
        if index > 0 {
            out.push(',');
        }
        out.push(*key);
        out.push('=');
        out.push_str(value);
    }
    if let Some(payload) = payload {
        out.push(';');
        out.push_str(payload);
    }
    out.push_str("\x1b\\");
}

/// Emit a payload across as many sequences as chunking requires.
fn emit_chunked(out: &mut String, mut controls: Vec<(char, String)>, payload: &str) {
    if payload.len() <= MAX_CHUNK {
        controls.push(('m', "0".to_string()));
        emit_sequence(out, &controls, Some(payload));
        return;
    }

    let chunks: Vec<&str> = payload
        .as_bytes()
        .chunks(MAX_CHUNK)
        .map(|c| std::str::from_utf8(c).unwrap_or(""))
        .collect();
    let last = chunks.len() - 1;

    for (index, chunk) in chunks.iter().enumerate() {
        if index == 0 {
            let mut first = controls.clone();
            first.push(('m', "1".to_string()));
            emit_sequence(out, &first, Some(chunk));
        } else if index < last {
            emit_sequence(out, &[('m', "1".to_string())], Some(chunk));
        } else {
            emit_sequence(out, &[('m', "0".to_string())], Some(chunk));
        }
    }
}

impl GraphicsBackend for KittyBackend {
    fn name(&self) -> BackendName {
        BackendName::Kitty
    }

    fn capabilities(&self) -> BackendCapabilities {
        BackendCapabilities {
            static_images: true,
            animation: true,
            alpha_channel: true,
            max_width: None,
            max_height: None,
        }
    }

    fn render(&self, image: &ImageSource<'_>, opts: &ImageOptions) -> String {
        self.transmit_and_display(image, opts)
    }

    fn clear(&self, target: &ClearTarget) -> String {
        match target {
            ClearTarget::All | ClearTarget::Area { .. } => self.delete(KittyDelete::All),
            ClearTarget::Image(id) => self.delete(KittyDelete::Image(*id)),
        }
    }

    fn is_supported(&self) -> bool {
        crate::backend::detect::kitty_supported(&crate::backend::detect::SystemEnv)
    }
}
