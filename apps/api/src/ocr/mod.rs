//! OCR — turns a decoded raster image into recognized text.
//!
//! The extractor only sees the `OcrEngine` trait; the concrete engine is
//! chosen at startup and injected, so there is no process-wide OCR setting.

use image::DynamicImage;
use thiserror::Error;

pub mod tesseract;

pub use tesseract::{OcrConfig, TesseractOcr};

/// Failure to decode or recognize a single embedded image.
///
/// Never fatal to a document: the extractor records it inline and moves on.
#[derive(Debug, Error)]
pub enum OcrError {
    #[error("image decode failed: {0}")]
    Decode(String),

    #[error("image codec error: {0}")]
    Image(#[from] image::ImageError),

    #[error("OCR engine '{command}' is not installed or not on PATH")]
    EngineUnavailable { command: String },

    #[error("OCR engine exited with {status}: {stderr}")]
    EngineFailed { status: String, stderr: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// A blocking OCR backend. Implementations must be shareable across request
/// threads because the extractor is held in `AppState`.
pub trait OcrEngine: Send + Sync {
    fn recognize(&self, image: &DynamicImage) -> Result<String, OcrError>;
}
