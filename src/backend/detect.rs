//! Terminal graphics capability detection.
//!
//! Pure predicates over an injectable environment source: which protocol a
//! terminal speaks is decided entirely by well-known environment variables
//! (`TERM`, `TERM_PROGRAM`, `KITTY_WINDOW_ID`, ...). Nothing here blocks,
//! queries the tty, or mutates state - detection can run anywhere, any
//! number of times.
//!
//! There is deliberately no process-wide memoization: the
//! [`GraphicsManager`](crate::backend::GraphicsManager) owns the only
//! selection cache, and its `refresh()` must observe environment changes
//! (a capability-change event after a terminal handoff, for example).
//!
//! # Examples
//!
//! ```
//! use termpix::backend::detect::{kitty_supported, EnvSource};
//!
//! struct Fake;
//! impl EnvSource for Fake {
//!     fn var(&self, name: &str) -> Option<String> {
//!         (name == "TERM").then(|| "xterm-kitty".to_string())
//!     }
//! }
//!
//! assert!(kitty_supported(&Fake));
//! ```

/// Read-only environment variable lookup
///
/// The production implementation is [`SystemEnv`]; tests substitute fixed
/// maps.
pub trait EnvSource {
    /// The variable's value, or `None` when unset
    fn var(&self, name: &str) -> Option<String>;
}

/// [`EnvSource`] backed by the process environment
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemEnv;

impl EnvSource for SystemEnv {
    fn var(&self, name: &str) -> Option<String> {
        std::env::var(name).ok()
    }
}

/// Terminal programs that speak the iTerm2 inline-image protocol.
const ITERM2_PROGRAMS: [&str; 3] = ["iTerm.app", "WezTerm", "mintty"];

/// Terminal programs with native sixel support.
const SIXEL_PROGRAMS: [&str; 4] = ["mlterm", "foot", "contour", "WezTerm"];

/// Terminal programs known to render 256-color SGR.
const ANSI_PROGRAMS: [&str; 5] = ["iTerm.app", "kitty", "WezTerm", "Alacritty", "vscode"];

/// Does the terminal speak the Kitty graphics protocol?
///
/// True for `TERM=xterm-kitty`, `TERM_PROGRAM=kitty`, or any session where
/// kitty exported `KITTY_WINDOW_ID`.
#[must_use]
pub fn kitty_supported(env: &dyn EnvSource) -> bool {
    if env.var("TERM").as_deref() == Some("xterm-kitty") {
        return true;
    }
    if env.var("TERM_PROGRAM").as_deref() == Some("kitty") {
        return true;
    }
    env.var("KITTY_WINDOW_ID").is_some()
}

/// Does the terminal speak the iTerm2 OSC 1337 inline-image protocol?
///
/// iTerm2 itself plus the emulators that adopted the protocol (WezTerm,
/// mintty), identified via `TERM_PROGRAM` or `LC_TERMINAL`.
#[must_use]
pub fn iterm2_supported(env: &dyn EnvSource) -> bool {
    for name in ["TERM_PROGRAM", "LC_TERMINAL"] {
        if let Some(value) = env.var(name) {
            if ITERM2_PROGRAMS.contains(&value.as_str()) {
                return true;
            }
        }
    }
    false
}

/// Does the terminal render sixel graphics?
///
/// xterm only does with sixel support compiled in, which `XTERM_VERSION`
/// stands in for; mlterm, foot, contour and WezTerm always do; otherwise
/// `TERM` itself may advertise it.
#[must_use]
pub fn sixel_supported(env: &dyn EnvSource) -> bool {
    if let Some(program) = env.var("TERM_PROGRAM") {
        if program == "xterm" && env.var("XTERM_VERSION").is_some() {
            return true;
        }
        if SIXEL_PROGRAMS.contains(&program.as_str()) {
            return true;
        }
    }
    if let Some(term) = env.var("TERM") {
        if term.contains("sixel") || term == "mlterm" {
            return true;
        }
    }
    false
}

/// Does the terminal render 256-color SGR sequences?
///
/// `NO_COLOR` (any value) vetoes color output entirely; otherwise `TERM`
/// advertising 256 colors, a known-good `TERM_PROGRAM`, or a plain
/// xterm/screen `TERM` qualifies.
#[must_use]
pub fn ansi_supported(env: &dyn EnvSource) -> bool {
    if env.var("NO_COLOR").is_some() {
        return false;
    }

    if let Some(term) = env.var("TERM") {
        if term.contains("256color") || term.contains("256-color") {
            return true;
        }
        if term.starts_with("xterm") || term.starts_with("screen") {
            return true;
        }
    }

    if let Some(program) = env.var("TERM_PROGRAM") {
        if ANSI_PROGRAMS.contains(&program.as_str()) {
            return true;
        }
    }

    false
}

/// Does the terminal display Unicode braille patterns?
///
/// Braille output is plain UTF-8 text, so the only real requirement is a
/// UTF-8 locale - and every terminal the other probes recognize has one.
/// The probe errs permissive: with no locale or terminal hints at all it
/// still answers `true`, making braille the universal text fallback.
#[must_use]
pub fn braille_supported(env: &dyn EnvSource) -> bool {
    for name in ["LANG", "LC_ALL"] {
        if let Some(locale) = env.var(name) {
            let locale = locale.to_ascii_lowercase();
            if locale.contains("utf-8") || locale.contains("utf8") {
                return true;
            }
        }
    }

    if kitty_supported(env) || iterm2_supported(env) || ansi_supported(env) {
        return true;
    }

    if let Some(term) = env.var("TERM") {
        let term = term.to_ascii_lowercase();
        if term.contains("utf") || term.contains("unicode") {
            return true;
        }
    }

    true
}
