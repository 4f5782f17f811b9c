//! Core data types shared across the proofing pipeline

use crate::error::Result;
use image::DynamicImage;
use serde::{Deserialize, Serialize};

/// Upload MIME types the host can thumbnail directly; anything else still
/// enters the upload list but gets a generic placeholder icon.
pub const PREVIEWABLE_MIME_TYPES: &[&str] = &["image/gif", "image/jpeg", "image/png"];

/// Whether the host UI can render a thumbnail for this MIME type
#[must_use]
pub fn is_previewable_mime(mime: &str) -> bool {
    PREVIEWABLE_MIME_TYPES.contains(&mime)
}

/// An uploaded photo after the external service removed its background.
///
/// Immutable once constructed. The encoded `data` is what the service
/// returned; `image` is the decoded raster the compositor draws from. Owned by
/// the composition that holds it and dropped with it — nothing is persisted.
#[derive(Debug, Clone)]
pub struct CutoutImage {
    id: String,
    original_filename: String,
    data: Vec<u8>,
    image: DynamicImage,
}

impl CutoutImage {
    /// Construct a cutout from the bytes fetched from the removal service
    ///
    /// # Errors
    /// - Image decode failure on a malformed payload
    pub fn from_bytes<S: Into<String>>(id: S, original_filename: S, data: Vec<u8>) -> Result<Self> {
        let image = image::load_from_memory(&data)?;
        Ok(Self {
            id: id.into(),
            original_filename: original_filename.into(),
            data,
            image,
        })
    }

    /// Opaque identifier (the removal task id)
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Filename of the originally uploaded photo
    #[must_use]
    pub fn original_filename(&self) -> &str {
        &self.original_filename
    }

    /// Encoded image bytes as returned by the service
    #[must_use]
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Decoded raster
    #[must_use]
    pub fn image(&self) -> &DynamicImage {
        &self.image
    }

    /// Source dimensions in pixels
    #[must_use]
    pub fn dimensions(&self) -> (u32, u32) {
        (self.image.width(), self.image.height())
    }

    /// Height-over-width ratio used to scale layers proportionally
    #[must_use]
    pub fn aspect_ratio(&self) -> f32 {
        let (w, h) = self.dimensions();
        if w == 0 {
            return 1.0;
        }
        h as f32 / w as f32
    }
}

/// A raw upload handed to the pipeline by the host's file-drop surface
#[derive(Debug, Clone)]
pub struct Upload {
    /// Original filename as reported by the drop surface
    pub filename: String,
    /// Raw image bytes
    pub bytes: Vec<u8>,
}

impl Upload {
    /// Wrap raw dropped-file bytes
    #[must_use]
    pub fn new<S: Into<String>>(filename: S, bytes: Vec<u8>) -> Self {
        Self {
            filename: filename.into(),
            bytes,
        }
    }
}

/// Response body of `POST /remove-background`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmitResponse {
    /// Identifier of the queued removal job
    pub task_id: String,
}

/// Response body of `GET /task-status/{task_id}`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusResponse {
    /// Literal job status string
    pub status: String,
}

/// Interpreted removal-job status
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskStatus {
    /// Job still running; poll again
    Processing,
    /// Job finished and the cutout is ready to fetch
    Completed,
    /// Any other terminal state, carrying the literal status string
    Terminal(String),
}

impl TaskStatus {
    /// Map the service's literal status string
    #[must_use]
    pub fn from_status_str(status: &str) -> Self {
        match status {
            "processing" => Self::Processing,
            "completed" => Self::Completed,
            other => Self::Terminal(other.to_owned()),
        }
    }
}
