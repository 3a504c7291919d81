// src/engine/io.rs
//
// The codec boundary: path in -> ImageBuffer, ImageBuffer -> path out.
// Container format is negotiated by magic bytes on read and by extension on write.

use crate::buffer::ImageBuffer;
use crate::config::EditorConfig;
use crate::engine::common::EngineResult;
use crate::engine::{decoder, encoder};
use crate::error::EditorError;
use crate::ops::{OutputFormat, DEFAULT_EXTENSION, DEFAULT_JPEG_QUALITY};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::Builder;
use tracing::{debug, info};

/// Result of a successful save.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SaveReport {
    /// Final path written (after default-extension resolution)
    pub path: PathBuf,
    pub format: OutputFormat,
    pub bytes_written: usize,
}

/// Decode/encode boundary used by the session.
///
/// Implementations must never return a zero-length or malformed buffer from
/// `decode`, and must report write failures as `Err` instead of panicking.
pub trait Codec {
    fn decode(&self, path: &Path) -> EngineResult<ImageBuffer>;
    fn encode(&self, buffer: &ImageBuffer, path: &Path) -> EngineResult<SaveReport>;
}

/// Filesystem codec backed by the engine's decoder/encoder.
#[derive(Clone, Debug)]
pub struct FileCodec {
    jpeg_quality: u8,
    auto_orient: bool,
}

impl Default for FileCodec {
    fn default() -> Self {
        Self {
            jpeg_quality: DEFAULT_JPEG_QUALITY,
            auto_orient: true,
        }
    }
}

impl FileCodec {
    pub fn new(config: &EditorConfig) -> Self {
        Self {
            jpeg_quality: config.jpeg_quality,
            auto_orient: config.auto_orient,
        }
    }
}

impl Codec for FileCodec {
    fn decode(&self, path: &Path) -> EngineResult<ImageBuffer> {
        let bytes = read_source(path)?;
        let (buffer, format) = decoder::decode_image(&bytes, self.auto_orient)?;
        info!(
            target: "mini_photoshop::codec",
            path = %path.display(),
            format = ?format,
            width = buffer.width(),
            height = buffer.height(),
            "image loaded"
        );
        Ok(buffer)
    }

    fn encode(&self, buffer: &ImageBuffer, path: &Path) -> EngineResult<SaveReport> {
        let (path, format) = resolve_output(path, self.jpeg_quality)?;
        let data = encoder::encode(buffer, format)?;
        write_atomic(&path, &data)?;
        info!(
            target: "mini_photoshop::codec",
            path = %path.display(),
            format = format.name(),
            bytes = data.len(),
            "image saved"
        );
        Ok(SaveReport {
            path,
            format,
            bytes_written: data.len(),
        })
    }
}

/// Read the whole file, mapping a missing file to FileNotFound.
pub fn read_source(path: &Path) -> EngineResult<Vec<u8>> {
    fs::read(path).map_err(|e| {
        let shown = path.to_string_lossy().to_string();
        if e.kind() == std::io::ErrorKind::NotFound {
            EditorError::file_not_found(shown)
        } else {
            EditorError::file_read_failed(shown, e)
        }
    })
}

/// Append the default extension when missing and pick the output format.
pub fn resolve_output(path: &Path, jpeg_quality: u8) -> EngineResult<(PathBuf, OutputFormat)> {
    if path.as_os_str().is_empty() {
        return Err(EditorError::file_write_failed(
            "",
            std::io::Error::new(std::io::ErrorKind::InvalidInput, "empty output path"),
        ));
    }
    let resolved = if path.extension().is_none() {
        path.with_extension(DEFAULT_EXTENSION)
    } else {
        path.to_path_buf()
    };
    let format = OutputFormat::from_path(&resolved, Some(jpeg_quality))?;
    Ok((resolved, format))
}

/// Temp files default to 0600. Saved images keep the mode of the file they
/// replace, or get 0644 (minus umask) when the target is new.
fn temp_builder(target: &Path) -> Builder<'static, 'static> {
    let mut builder = Builder::new();
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let permissions = fs::metadata(target)
            .map(|meta| meta.permissions())
            .unwrap_or_else(|_| fs::Permissions::from_mode(0o644));
        builder.permissions(permissions);
    }
    #[cfg(not(unix))]
    let _ = target;
    builder
}

/// Atomic write: write to a temp file in the target directory, then rename
/// on success. tempfile removes the temp file on drop if anything fails.
pub fn write_atomic(path: &Path, data: &[u8]) -> EngineResult<()> {
    let output_dir = match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir,
        _ => Path::new("."),
    };

    // Same directory as the target so rename() never crosses filesystems.
    let mut temp_file = temp_builder(path).tempfile_in(output_dir).map_err(|e| {
        EditorError::file_write_failed(output_dir.to_string_lossy().to_string(), e)
    })?;
    let temp_path = temp_file.path().to_path_buf();

    temp_file
        .write_all(data)
        .map_err(|e| EditorError::file_write_failed(temp_path.display().to_string(), e))?;
    temp_file
        .as_file_mut()
        .sync_all()
        .map_err(|e| EditorError::file_write_failed(temp_path.display().to_string(), e))?;

    temp_file.persist(path).map_err(|e| {
        EditorError::file_write_failed(path.to_string_lossy().to_string(), e.error)
    })?;

    debug!(
        target: "mini_photoshop::codec",
        path = %path.display(),
        bytes = data.len(),
        "persisted"
    );
    Ok(())
}
