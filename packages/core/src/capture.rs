//! Still capture from the live feed
//!
//! A capture grabs the current feed frame, redraws it at the feed's native
//! resolution into a fresh JPEG and uploads it for the current patient.

use crate::api::{Backend, UploadResponse};
use crate::{StationError, StationResult};
use image::codecs::jpeg::JpegEncoder;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Quality used when encoding the still (same default as a browser canvas)
pub const JPEG_QUALITY: u8 = 92;

pub const DEFAULT_CAPTURE_MESSAGE: &str = "Image captured";
pub const CAPTURE_FAILED_MESSAGE: &str = "Capture failed";

/// A still ready for upload
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CapturedFrame {
    pub width: u32,
    pub height: u32,
    pub jpeg: Vec<u8>,
}

/// Decode a feed frame and re-encode it at native resolution
pub fn encode_frame(feed_frame: &[u8]) -> StationResult<CapturedFrame> {
    let decoded = image::load_from_memory(feed_frame)
        .map_err(|e| StationError::FrameGrab(format!("undecodable feed frame: {}", e)))?;
    let rgb = decoded.to_rgb8();
    let (width, height) = rgb.dimensions();
    if width == 0 || height == 0 {
        return Err(StationError::FrameGrab("feed frame has no pixels".to_string()));
    }

    let mut jpeg = Vec::new();
    JpegEncoder::new_with_quality(&mut jpeg, JPEG_QUALITY).encode_image(&rgb)?;

    Ok(CapturedFrame {
        width,
        height,
        jpeg,
    })
}

/// What the upload endpoint said, mapped to what the user sees
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaptureOutcome {
    pub message: String,
    /// Name of the stored file; absent means nothing was stored
    pub stored_filename: Option<String>,
}

impl CaptureOutcome {
    pub fn from_response(response: UploadResponse) -> Self {
        Self {
            message: response
                .message
                .filter(|m| !m.is_empty())
                .unwrap_or_else(|| DEFAULT_CAPTURE_MESSAGE.to_string()),
            stored_filename: response.filename.filter(|f| !f.is_empty()),
        }
    }

    pub fn should_reload_gallery(&self) -> bool {
        self.stored_filename.is_some()
    }
}

/// Grab, encode and upload one still
pub async fn capture_and_upload(
    backend: Arc<dyn Backend>,
    cedula: String,
) -> StationResult<CaptureOutcome> {
    let feed_frame = backend.grab_frame().await?;

    let frame = tokio::task::spawn_blocking(move || encode_frame(&feed_frame))
        .await
        .map_err(|e| StationError::Task(e.to_string()))??;
    debug!(
        "Encoded {}x{} still ({} bytes)",
        frame.width,
        frame.height,
        frame.jpeg.len()
    );

    match backend.upload_capture(&cedula, frame.jpeg).await {
        Ok(response) => {
            let outcome = CaptureOutcome::from_response(response);
            match &outcome.stored_filename {
                Some(name) => info!("Capture stored as {}", name),
                None => warn!("Upload answered without a filename: {}", outcome.message),
            }
            Ok(outcome)
        }
        Err(e) => {
            warn!("Capture upload failed: {}", e);
            Err(e)
        }
    }
}
