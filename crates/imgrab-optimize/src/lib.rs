//! In-place lossy re-compression of downloaded raster images.
//!
//! Optimization is an optional capability: built with the `image` feature
//! (the default) it re-encodes files in place; built without it every call
//! reports [`OptimizeError::Unavailable`]. Callers resolve [`available`] once
//! at startup and decide then whether to wire the optimizer in — a failure
//! here never invalidates the download that produced the file.

use std::path::Path;

use thiserror::Error;

/// JPEG re-encode quality, out of 100.
#[cfg(feature = "image")]
const JPEG_QUALITY: u8 = 85;

#[derive(Debug, Error)]
pub enum OptimizeError {
    #[error("image support not compiled in")]
    Unavailable,

    #[cfg(feature = "image")]
    #[error("failed to decode image: {0}")]
    Decode(#[source] image::ImageError),

    #[cfg(feature = "image")]
    #[error("failed to re-encode image: {0}")]
    Encode(#[source] image::ImageError),

    #[cfg(feature = "image")]
    #[error("failed to rewrite image: {0}")]
    Io(#[source] std::io::Error),
}

/// Whether the optimization capability was compiled in.
pub fn available() -> bool {
    cfg!(feature = "image")
}

/// Re-encode a raster image in place to shrink its footprint.
///
/// Alpha channels are flattened to opaque RGB first (lossy and
/// irreversible); JPEG output is written at quality 85, other formats are
/// re-encoded as themselves. The new payload is encoded fully in memory
/// before the file is rewritten, so a decode or encode failure leaves the
/// original untouched.
#[cfg(feature = "image")]
pub fn optimize_in_place(path: &Path) -> Result<(), OptimizeError> {
    use std::io::Cursor;

    use image::codecs::jpeg::JpegEncoder;
    use image::{DynamicImage, ImageFormat};

    let format = ImageFormat::from_path(path).map_err(OptimizeError::Decode)?;
    let img = image::open(path).map_err(OptimizeError::Decode)?;

    let img = if img.color().has_alpha() {
        DynamicImage::ImageRgb8(img.to_rgb8())
    } else {
        img
    };

    let mut encoded = Cursor::new(Vec::new());
    match format {
        ImageFormat::Jpeg => {
            let encoder = JpegEncoder::new_with_quality(&mut encoded, JPEG_QUALITY);
            img.write_with_encoder(encoder).map_err(OptimizeError::Encode)?;
        }
        _ => img
            .write_to(&mut encoded, format)
            .map_err(OptimizeError::Encode)?,
    }

    std::fs::write(path, encoded.into_inner()).map_err(OptimizeError::Io)?;
    tracing::debug!("optimized {}", path.display());
    Ok(())
}

#[cfg(not(feature = "image"))]
pub fn optimize_in_place(_path: &Path) -> Result<(), OptimizeError> {
    Err(OptimizeError::Unavailable)
}
