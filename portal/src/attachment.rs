//! Photo attachments.
//!
//! Converts an image file into an [`InlineImage`]: decode, shrink to a
//! maximum width (aspect ratio kept), re-encode as JPEG, and wrap the bytes
//! in a base64 `data:` URL.
//!
//! Decoding runs on the blocking pool through [`PendingAttachment`], which
//! is tied to whoever holds it: dropping the handle cancels the work and
//! discards any late result.

use std::path::{Path, PathBuf};

use base64::Engine;
use image::imageops::FilterType;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;

use portal_proto::inline::InlineImage;

/// Default maximum width in pixels.
pub const DEFAULT_MAX_WIDTH: u32 = 800;

/// Default JPEG quality (1-100).
pub const DEFAULT_JPEG_QUALITY: u8 = 70;

const OUTPUT_MEDIA_TYPE: &str = "image/jpeg";

/// Errors that can occur while preparing an attachment.
#[derive(Debug, thiserror::Error)]
pub enum AttachmentError {
    /// The file could not be read.
    #[error("could not read {path}: {source}")]
    Read {
        /// File that was attempted.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// The bytes are not a readable image.
    #[error("not a readable image: {0}")]
    Decode(#[source] image::ImageError),

    /// Re-encoding the scaled image failed.
    #[error("could not encode image: {0}")]
    Encode(#[source] image::ImageError),

    /// The attachment was dropped before it finished.
    #[error("attachment cancelled")]
    Cancelled,
}

/// Downscaling parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DownscaleOptions {
    /// Images wider than this are shrunk to exactly this width.
    pub max_width: u32,
    /// JPEG quality for the re-encoded image (clamped to 1-100).
    pub jpeg_quality: u8,
}

impl Default for DownscaleOptions {
    fn default() -> Self {
        Self {
            max_width: DEFAULT_MAX_WIDTH,
            jpeg_quality: DEFAULT_JPEG_QUALITY,
        }
    }
}

/// Result of a successful downscale.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownscaledImage {
    /// Output width in pixels.
    pub width: u32,
    /// Output height in pixels.
    pub height: u32,
    /// The encoded image as a data URL.
    pub image: InlineImage,
}

/// Computes output dimensions for an image of `width` x `height`.
///
/// Images no wider than `max_width` keep their size; wider ones are scaled
/// to `max_width` with the height rounded to the nearest pixel (at least 1).
#[must_use]
pub fn target_dimensions(width: u32, height: u32, max_width: u32) -> (u32, u32) {
    if width <= max_width || width == 0 || max_width == 0 {
        return (width, height);
    }
    let scaled = (u64::from(height) * u64::from(max_width) + u64::from(width) / 2) / u64::from(width);
    let scaled = u32::try_from(scaled).unwrap_or(u32::MAX).max(1);
    (max_width, scaled)
}

/// Decodes `bytes`, shrinks the image if needed and re-encodes it inline.
///
/// # Errors
///
/// Returns [`AttachmentError::Decode`] if `bytes` is not a supported image,
/// or [`AttachmentError::Encode`] if JPEG encoding fails.
pub fn downscale(bytes: &[u8], options: &DownscaleOptions) -> Result<DownscaledImage, AttachmentError> {
    let decoded = image::load_from_memory(bytes).map_err(AttachmentError::Decode)?;
    let (width, height) = target_dimensions(decoded.width(), decoded.height(), options.max_width);

    let scaled = if (width, height) == (decoded.width(), decoded.height()) {
        decoded
    } else {
        decoded.resize_exact(width, height, FilterType::Triangle)
    };

    // JPEG has no alpha channel.
    let rgb = scaled.to_rgb8();
    let mut jpeg = Vec::new();
    let quality = options.jpeg_quality.clamp(1, 100);
    image::codecs::jpeg::JpegEncoder::new_with_quality(&mut jpeg, quality)
        .encode_image(&rgb)
        .map_err(AttachmentError::Encode)?;

    let payload = base64::engine::general_purpose::STANDARD.encode(&jpeg);
    tracing::debug!(
        width,
        height,
        bytes_in = bytes.len(),
        bytes_out = jpeg.len(),
        "image downscaled"
    );

    Ok(DownscaledImage {
        width,
        height,
        image: InlineImage::from_base64(OUTPUT_MEDIA_TYPE, &payload),
    })
}

/// Reads an image file and downscales it.
///
/// # Errors
///
/// Returns [`AttachmentError::Read`] if the file cannot be read, otherwise
/// the errors of [`downscale`].
pub fn load_file(path: &Path, options: &DownscaleOptions) -> Result<DownscaledImage, AttachmentError> {
    let bytes = std::fs::read(path).map_err(|source| AttachmentError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    downscale(&bytes, options)
}

/// An attachment being prepared in the background.
///
/// Dropping it aborts the work if it has not started and discards the
/// result otherwise.
pub struct PendingAttachment {
    path: PathBuf,
    rx: oneshot::Receiver<Result<DownscaledImage, AttachmentError>>,
    handle: JoinHandle<()>,
}

impl PendingAttachment {
    /// Starts loading `path` on the blocking pool.
    ///
    /// Must be called from within a tokio runtime.
    #[must_use]
    pub fn spawn(path: impl Into<PathBuf>, options: DownscaleOptions) -> Self {
        let path = path.into();
        let (tx, rx) = oneshot::channel();
        let job_path = path.clone();
        let handle = tokio::task::spawn_blocking(move || {
            if tx.is_closed() {
                return;
            }
            let result = load_file(&job_path, &options);
            if tx.send(result).is_err() {
                tracing::debug!(path = %job_path.display(), "attachment finished after cancel, result dropped");
            }
        });
        Self { path, rx, handle }
    }

    /// File being loaded.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns the result if it is ready, without waiting.
    pub fn try_take(&mut self) -> Option<Result<DownscaledImage, AttachmentError>> {
        match self.rx.try_recv() {
            Ok(result) => Some(result),
            Err(oneshot::error::TryRecvError::Empty) => None,
            Err(oneshot::error::TryRecvError::Closed) => Some(Err(AttachmentError::Cancelled)),
        }
    }

    /// Waits for the result.
    ///
    /// # Errors
    ///
    /// Returns the load error, or [`AttachmentError::Cancelled`] if the
    /// background task went away without answering.
    pub async fn wait(mut self) -> Result<DownscaledImage, AttachmentError> {
        (&mut self.rx)
            .await
            .unwrap_or(Err(AttachmentError::Cancelled))
    }
}

impl Drop for PendingAttachment {
    fn drop(&mut self) {
        self.rx.close();
        self.handle.abort();
    }
}
