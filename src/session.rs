// src/session.rs
//
// Editor session: owns the `original` and `processed` slots and routes UI
// commands to the codec, the filter engine and the display scaler.
//
// State rules:
// - `original` is replaced only by a successful load
// - every filter reads `original` and replaces `processed`
// - save reads `processed` only
// - a failed command leaves both slots untouched

use crate::buffer::ImageBuffer;
use crate::config::EditorConfig;
use crate::engine::{Codec, DisplayFrame, DisplayScaler, FileCodec, FilterEngine, SaveReport};
use crate::error::{EditorError, Result};
use crate::ops::FilterOperation;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Commands exposed to the UI. None of the filters take parameters.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Command {
    Load(PathBuf),
    Grayscale,
    Blur,
    Sharpen,
    EdgeDetect,
    BrightnessContrast,
    Save(PathBuf),
}

impl Command {
    /// The filter a command maps to, `None` for Load/Save.
    pub fn filter(&self) -> Option<FilterOperation> {
        match self {
            Command::Grayscale => Some(FilterOperation::grayscale()),
            Command::Blur => Some(FilterOperation::blur()),
            Command::Sharpen => Some(FilterOperation::sharpen()),
            Command::EdgeDetect => Some(FilterOperation::edge_detect()),
            Command::BrightnessContrast => Some(FilterOperation::brightness_contrast()),
            Command::Load(_) | Command::Save(_) => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Command::Load(_) => "load",
            Command::Grayscale => "grayscale",
            Command::Blur => "blur",
            Command::Sharpen => "sharpen",
            Command::EdgeDetect => "edge_detect",
            Command::BrightnessContrast => "brightness_contrast",
            Command::Save(_) => "save",
        }
    }
}

/// What a successful command hands back to the UI.
#[derive(Clone, Debug, PartialEq)]
pub enum CommandOutcome {
    /// New frame to render (load or filter)
    Rendered(DisplayFrame),
    /// File written (save)
    Saved(SaveReport),
}

pub struct EditorSession<C: Codec = FileCodec> {
    codec: C,
    engine: FilterEngine,
    scaler: DisplayScaler,
    original: Option<ImageBuffer>,
    processed: Option<ImageBuffer>,
}

impl Default for EditorSession {
    fn default() -> Self {
        Self::new(&EditorConfig::default())
    }
}

impl EditorSession {
    pub fn new(config: &EditorConfig) -> Self {
        Self::with_codec(config, FileCodec::new(config))
    }
}

impl<C: Codec> EditorSession<C> {
    pub fn with_codec(config: &EditorConfig, codec: C) -> Self {
        Self {
            codec,
            engine: FilterEngine::new(),
            scaler: DisplayScaler::new(config.display),
            original: None,
            processed: None,
        }
    }

    pub fn original(&self) -> Option<&ImageBuffer> {
        self.original.as_ref()
    }

    pub fn processed(&self) -> Option<&ImageBuffer> {
        self.processed.as_ref()
    }

    pub fn is_loaded(&self) -> bool {
        self.original.is_some()
    }

    /// Decode `path` into both slots and return its preview.
    pub fn load(&mut self, path: &Path) -> Result<DisplayFrame> {
        let decoded = self.codec.decode(path)?;
        let frame = self.scaler.fit(Some(&decoded))?;

        // Commit only after every fallible step succeeded.
        self.processed = Some(decoded.clone());
        self.original = Some(decoded);
        info!(
            target: "mini_photoshop::session",
            path = %path.display(),
            width = frame.width,
            height = frame.height,
            "loaded"
        );
        Ok(frame)
    }

    /// Run `op` on the original, store it as processed and return its preview.
    pub fn apply(&mut self, op: &FilterOperation) -> Result<DisplayFrame> {
        let processed = self.engine.apply(self.original.as_ref(), op)?;
        let frame = self.scaler.fit(Some(&processed))?;
        self.processed = Some(processed);
        debug!(target: "mini_photoshop::session", op = op.name(), "processed replaced");
        Ok(frame)
    }

    /// Encode the processed slot. Nothing is written when it is empty.
    pub fn save(&self, path: &Path) -> Result<SaveReport> {
        let processed = self
            .processed
            .as_ref()
            .ok_or_else(EditorError::no_image_loaded)?;
        let report = self.codec.encode(processed, path)?;
        info!(
            target: "mini_photoshop::session",
            path = %report.path.display(),
            format = report.format.name(),
            bytes = report.bytes_written,
            "saved"
        );
        Ok(report)
    }

    /// Re-render the processed slot, e.g. after the viewport changed.
    pub fn preview(&self) -> Result<DisplayFrame> {
        if self.processed.is_none() {
            return Err(EditorError::no_image_loaded());
        }
        self.scaler.fit(self.processed.as_ref())
    }

    pub fn dispatch(&mut self, command: Command) -> Result<CommandOutcome> {
        let name = command.name();
        let result = match command {
            Command::Load(path) => self.load(&path).map(CommandOutcome::Rendered),
            Command::Save(path) => self.save(&path).map(CommandOutcome::Saved),
            filter => match filter.filter() {
                Some(op) => self.apply(&op).map(CommandOutcome::Rendered),
                None => Err(EditorError::conversion_failed(
                    name,
                    "command has no filter mapping",
                )),
            },
        };
        if let Err(err) = &result {
            warn!(
                target: "mini_photoshop::session",
                command = name,
                kind = err.kind().as_str(),
                error = %err,
                "command failed"
            );
        }
        result
    }
}
