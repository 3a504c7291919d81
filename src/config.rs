// src/config.rs
//
// Editor configuration. There is no config file: defaults are the fixed
// design values, and a few knobs can be overridden through the environment.

use crate::ops::DEFAULT_JPEG_QUALITY;
use tracing::warn;

pub const DEFAULT_MAX_DISPLAY_WIDTH: u32 = 500;
pub const DEFAULT_MAX_DISPLAY_HEIGHT: u32 = 400;

pub const ENV_MAX_DISPLAY: &str = "MINI_PHOTOSHOP_MAX_DISPLAY";
pub const ENV_JPEG_QUALITY: &str = "MINI_PHOTOSHOP_JPEG_QUALITY";
pub const ENV_AUTO_ORIENT: &str = "MINI_PHOTOSHOP_AUTO_ORIENT";

/// Viewport the preview frame must fit in.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DisplayBounds {
    pub max_width: u32,
    pub max_height: u32,
}

impl Default for DisplayBounds {
    fn default() -> Self {
        Self {
            max_width: DEFAULT_MAX_DISPLAY_WIDTH,
            max_height: DEFAULT_MAX_DISPLAY_HEIGHT,
        }
    }
}

impl DisplayBounds {
    pub fn new(max_width: u32, max_height: u32) -> Self {
        Self {
            max_width,
            max_height,
        }
    }

    /// Parse `WxH` (also accepts `X` and `*` as separator).
    pub fn parse(raw: &str) -> Option<Self> {
        let raw = raw.trim();
        let (w, h) = raw
            .split_once(['x', 'X', '*'])
            .map(|(w, h)| (w.trim(), h.trim()))?;
        let max_width = w.parse::<u32>().ok().filter(|v| *v > 0)?;
        let max_height = h.parse::<u32>().ok().filter(|v| *v > 0)?;
        Some(Self::new(max_width, max_height))
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EditorConfig {
    /// Preview viewport
    pub display: DisplayBounds,
    /// JPEG quality used on save (1-100)
    pub jpeg_quality: u8,
    /// Apply the EXIF Orientation tag when loading
    pub auto_orient: bool,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            display: DisplayBounds::default(),
            jpeg_quality: DEFAULT_JPEG_QUALITY,
            auto_orient: true,
        }
    }
}

impl EditorConfig {
    pub fn with_display(mut self, display: DisplayBounds) -> Self {
        self.display = display;
        self
    }

    pub fn with_jpeg_quality(mut self, quality: u8) -> Self {
        self.jpeg_quality = quality.clamp(1, 100);
        self
    }

    pub fn with_auto_orient(mut self, auto_orient: bool) -> Self {
        self.auto_orient = auto_orient;
        self
    }

    /// Defaults with environment overrides applied.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as `from_env` with an injectable lookup (keeps tests off the
    /// process environment).
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();

        if let Some(raw) = lookup(ENV_MAX_DISPLAY) {
            match DisplayBounds::parse(&raw) {
                Some(bounds) => config.display = bounds,
                None => warn!(
                    target: "mini_photoshop::config",
                    key = ENV_MAX_DISPLAY,
                    value = %raw,
                    "ignoring invalid display bounds, expected WxH"
                ),
            }
        }

        if let Some(raw) = lookup(ENV_JPEG_QUALITY) {
            match raw.trim().parse::<u8>() {
                Ok(q) if (1..=100).contains(&q) => config.jpeg_quality = q,
                _ => warn!(
                    target: "mini_photoshop::config",
                    key = ENV_JPEG_QUALITY,
                    value = %raw,
                    "ignoring invalid JPEG quality, expected 1-100"
                ),
            }
        }

        if let Some(raw) = lookup(ENV_AUTO_ORIENT) {
            match parse_bool(&raw) {
                Some(flag) => config.auto_orient = flag,
                None => warn!(
                    target: "mini_photoshop::config",
                    key = ENV_AUTO_ORIENT,
                    value = %raw,
                    "ignoring invalid flag, expected 0/1/true/false"
                ),
            }
        }

        config
    }
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
