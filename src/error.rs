// src/error.rs
//
// Unified error handling for mini-photoshop
// Uses thiserror for simple, type-safe error handling
//
// Error Taxonomy:
// - Decode: unreadable, corrupt or unsupported input
// - Encode: unwritable target or empty buffer
// - Conversion: internal pixel-format mismatch during a filter step
// - NoImageLoaded: operation attempted on an absent buffer
// - Display: attempt to render an empty/zero-area frame

use std::borrow::Cow;
use thiserror::Error;

/// Error taxonomy surfaced to the UI boundary.
///
/// The core never presents errors itself; the caller maps each kind to a
/// dialog (or equivalent) and keeps its previous state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Unreadable, corrupt or unsupported input
    Decode,
    /// Unwritable target, unsupported output format or empty buffer
    Encode,
    /// Internal colorspace/format mismatch during a filter step
    Conversion,
    /// Operation attempted before any image was loaded
    NoImageLoaded,
    /// Attempt to render an empty or zero-area frame
    Display,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::Decode => "DecodeError",
            ErrorKind::Encode => "EncodeError",
            ErrorKind::Conversion => "ConversionError",
            ErrorKind::NoImageLoaded => "NoImageLoaded",
            ErrorKind::Display => "DisplayError",
        }
    }
}

/// mini-photoshop error types
///
/// Every variant carries enough context for a human-readable message.
#[derive(Debug, Error)]
pub enum EditorError {
    // File I/O Errors
    #[error("File not found: {path}")]
    FileNotFound { path: Cow<'static, str> },

    #[error("Failed to read file '{path}': {source}")]
    FileReadFailed {
        path: Cow<'static, str>,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write file '{path}': {source}")]
    FileWriteFailed {
        path: Cow<'static, str>,
        #[source]
        source: std::io::Error,
    },

    // Decode Errors
    #[error("Unsupported image format: {format}")]
    UnsupportedFormat { format: Cow<'static, str> },

    #[error("Failed to decode image: {message}")]
    DecodeFailed { message: Cow<'static, str> },

    #[error("Corrupted image data")]
    CorruptedImage,

    #[error("Image dimension {dimension} exceeds maximum {max}")]
    DimensionExceedsLimit { dimension: u32, max: u32 },

    #[error("Image pixel count {pixels} exceeds maximum {max}")]
    PixelCountExceedsLimit { pixels: u64, max: u64 },

    // Encode Errors
    #[error("Unsupported output format '{extension}'. Expected jpg, jpeg or png")]
    UnsupportedOutputFormat { extension: Cow<'static, str> },

    #[error("Failed to encode as {format}: {message}")]
    EncodeFailed {
        format: Cow<'static, str>,
        message: Cow<'static, str>,
    },

    #[error("Refusing to encode an empty buffer")]
    EmptyBuffer,

    // Conversion Errors
    #[error("Invalid pixel buffer: {width}x{height} with {len} bytes (expected {expected})")]
    InvalidBuffer {
        width: u32,
        height: u32,
        len: usize,
        expected: usize,
    },

    #[error("Invalid value for {name}: {value}. {reason}")]
    InvalidParameter {
        name: Cow<'static, str>,
        value: Cow<'static, str>,
        reason: Cow<'static, str>,
    },

    #[error("Conversion failed during {stage}: {message}")]
    ConversionFailed {
        stage: Cow<'static, str>,
        message: Cow<'static, str>,
    },

    // State Errors
    #[error("No image loaded. Open an image first")]
    NoImageLoaded,

    // Display Errors
    #[error("Cannot display image: {message}")]
    DisplayFailed { message: Cow<'static, str> },

    #[error("Resize failed ({source_width}x{source_height} -> {target_width}x{target_height}): {message}")]
    ResizeFailed {
        source_width: u32,
        source_height: u32,
        target_width: u32,
        target_height: u32,
        message: Cow<'static, str>,
    },
}

impl Clone for EditorError {
    fn clone(&self) -> Self {
        match self {
            Self::FileNotFound { path } => Self::FileNotFound { path: path.clone() },
            Self::FileReadFailed { path, source } => Self::FileReadFailed {
                path: path.clone(),
                source: std::io::Error::new(source.kind(), source.to_string()),
            },
            Self::FileWriteFailed { path, source } => Self::FileWriteFailed {
                path: path.clone(),
                source: std::io::Error::new(source.kind(), source.to_string()),
            },
            Self::UnsupportedFormat { format } => Self::UnsupportedFormat {
                format: format.clone(),
            },
            Self::DecodeFailed { message } => Self::DecodeFailed {
                message: message.clone(),
            },
            Self::CorruptedImage => Self::CorruptedImage,
            Self::DimensionExceedsLimit { dimension, max } => Self::DimensionExceedsLimit {
                dimension: *dimension,
                max: *max,
            },
            Self::PixelCountExceedsLimit { pixels, max } => Self::PixelCountExceedsLimit {
                pixels: *pixels,
                max: *max,
            },
            Self::UnsupportedOutputFormat { extension } => Self::UnsupportedOutputFormat {
                extension: extension.clone(),
            },
            Self::EncodeFailed { format, message } => Self::EncodeFailed {
                format: format.clone(),
                message: message.clone(),
            },
            Self::EmptyBuffer => Self::EmptyBuffer,
            Self::InvalidBuffer {
                width,
                height,
                len,
                expected,
            } => Self::InvalidBuffer {
                width: *width,
                height: *height,
                len: *len,
                expected: *expected,
            },
            Self::InvalidParameter {
                name,
                value,
                reason,
            } => Self::InvalidParameter {
                name: name.clone(),
                value: value.clone(),
                reason: reason.clone(),
            },
            Self::ConversionFailed { stage, message } => Self::ConversionFailed {
                stage: stage.clone(),
                message: message.clone(),
            },
            Self::NoImageLoaded => Self::NoImageLoaded,
            Self::DisplayFailed { message } => Self::DisplayFailed {
                message: message.clone(),
            },
            Self::ResizeFailed {
                source_width,
                source_height,
                target_width,
                target_height,
                message,
            } => Self::ResizeFailed {
                source_width: *source_width,
                source_height: *source_height,
                target_width: *target_width,
                target_height: *target_height,
                message: message.clone(),
            },
        }
    }
}

// Constructor Helpers
impl EditorError {
    pub fn file_not_found(path: impl Into<Cow<'static, str>>) -> Self {
        Self::FileNotFound { path: path.into() }
    }

    pub fn file_read_failed(path: impl Into<Cow<'static, str>>, source: std::io::Error) -> Self {
        Self::FileReadFailed {
            path: path.into(),
            source,
        }
    }

    pub fn file_write_failed(path: impl Into<Cow<'static, str>>, source: std::io::Error) -> Self {
        Self::FileWriteFailed {
            path: path.into(),
            source,
        }
    }

    pub fn unsupported_format(format: impl Into<Cow<'static, str>>) -> Self {
        Self::UnsupportedFormat {
            format: format.into(),
        }
    }

    pub fn decode_failed(message: impl Into<Cow<'static, str>>) -> Self {
        Self::DecodeFailed {
            message: message.into(),
        }
    }

    pub fn corrupted_image() -> Self {
        Self::CorruptedImage
    }

    pub fn dimension_exceeds_limit(dimension: u32, max: u32) -> Self {
        Self::DimensionExceedsLimit { dimension, max }
    }

    pub fn pixel_count_exceeds_limit(pixels: u64, max: u64) -> Self {
        Self::PixelCountExceedsLimit { pixels, max }
    }

    pub fn unsupported_output_format(extension: impl Into<Cow<'static, str>>) -> Self {
        Self::UnsupportedOutputFormat {
            extension: extension.into(),
        }
    }

    pub fn encode_failed(
        format: impl Into<Cow<'static, str>>,
        message: impl Into<Cow<'static, str>>,
    ) -> Self {
        Self::EncodeFailed {
            format: format.into(),
            message: message.into(),
        }
    }

    pub fn empty_buffer() -> Self {
        Self::EmptyBuffer
    }

    pub fn invalid_buffer(width: u32, height: u32, len: usize, expected: usize) -> Self {
        Self::InvalidBuffer {
            width,
            height,
            len,
            expected,
        }
    }

    pub fn invalid_parameter(
        name: impl Into<Cow<'static, str>>,
        value: impl Into<Cow<'static, str>>,
        reason: impl Into<Cow<'static, str>>,
    ) -> Self {
        Self::InvalidParameter {
            name: name.into(),
            value: value.into(),
            reason: reason.into(),
        }
    }

    pub fn conversion_failed(
        stage: impl Into<Cow<'static, str>>,
        message: impl Into<Cow<'static, str>>,
    ) -> Self {
        Self::ConversionFailed {
            stage: stage.into(),
            message: message.into(),
        }
    }

    pub fn no_image_loaded() -> Self {
        Self::NoImageLoaded
    }

    pub fn display_failed(message: impl Into<Cow<'static, str>>) -> Self {
        Self::DisplayFailed {
            message: message.into(),
        }
    }

    pub fn resize_failed(
        source_dims: (u32, u32),
        target_dims: (u32, u32),
        message: impl Into<Cow<'static, str>>,
    ) -> Self {
        Self::ResizeFailed {
            source_width: source_dims.0,
            source_height: source_dims.1,
            target_width: target_dims.0,
            target_height: target_dims.1,
            message: message.into(),
        }
    }

    /// Check if this error is recoverable (user can fix it)
    ///
    /// - Decode/Encode: pick another file or another destination
    /// - NoImageLoaded: load an image first
    /// - Conversion/Display: internal failures, nothing the user can change
    pub fn is_recoverable(&self) -> bool {
        match self.kind() {
            ErrorKind::Decode | ErrorKind::Encode | ErrorKind::NoImageLoaded => true,
            ErrorKind::Conversion | ErrorKind::Display => false,
        }
    }

    /// Get the error kind for this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::FileNotFound { .. }
            | Self::FileReadFailed { .. }
            | Self::UnsupportedFormat { .. }
            | Self::DecodeFailed { .. }
            | Self::CorruptedImage
            | Self::DimensionExceedsLimit { .. }
            | Self::PixelCountExceedsLimit { .. } => ErrorKind::Decode,

            Self::FileWriteFailed { .. }
            | Self::UnsupportedOutputFormat { .. }
            | Self::EncodeFailed { .. }
            | Self::EmptyBuffer => ErrorKind::Encode,

            // InvalidParameter is raised while preparing a filter step (kernel
            // size, thresholds, gain), so it lands with the other filter failures.
            Self::InvalidBuffer { .. }
            | Self::InvalidParameter { .. }
            | Self::ConversionFailed { .. } => ErrorKind::Conversion,

            Self::NoImageLoaded => ErrorKind::NoImageLoaded,

            Self::DisplayFailed { .. } | Self::ResizeFailed { .. } => ErrorKind::Display,
        }
    }
}

// Result type alias
pub type Result<T> = std::result::Result<T, EditorError>;
