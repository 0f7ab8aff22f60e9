use std::io::ErrorKind;
use std::path::PathBuf;
use std::process::Command;

use image::{DynamicImage, ImageFormat};
use tracing::debug;

use crate::ocr::{OcrEngine, OcrError};

/// Where the Tesseract binary lives and which language pack it should use.
#[derive(Debug, Clone)]
pub struct OcrConfig {
    pub command: PathBuf,
    pub language: String,
}

impl Default for OcrConfig {
    fn default() -> Self {
        Self {
            command: PathBuf::from("tesseract"),
            language: "eng".to_string(),
        }
    }
}

/// OCR engine backed by the `tesseract` command-line tool.
///
/// Each image is written to a temporary PNG which is removed when the
/// `NamedTempFile` guard drops, on success and on every error path.
#[derive(Debug, Clone)]
pub struct TesseractOcr {
    config: OcrConfig,
}

impl TesseractOcr {
    pub fn new(config: OcrConfig) -> Self {
        Self { config }
    }

    fn command_name(&self) -> String {
        self.config.command.display().to_string()
    }
}

impl OcrEngine for TesseractOcr {
    fn recognize(&self, image: &DynamicImage) -> Result<String, OcrError> {
        let input = tempfile::Builder::new()
            .prefix("fitcheck-ocr-")
            .suffix(".png")
            .tempfile()?;
        image.save_with_format(input.path(), ImageFormat::Png)?;

        let output = Command::new(&self.config.command)
            .arg(input.path())
            .arg("stdout")
            .arg("-l")
            .arg(&self.config.language)
            .output()
            .map_err(|e| {
                if e.kind() == ErrorKind::NotFound {
                    OcrError::EngineUnavailable {
                        command: self.command_name(),
                    }
                } else {
                    OcrError::Io(e)
                }
            })?;

        if !output.status.success() {
            return Err(OcrError::EngineFailed {
                status: output.status.to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        let text = String::from_utf8_lossy(&output.stdout).into_owned();
        debug!(
            width = image.width(),
            height = image.height(),
            chars = text.len(),
            "tesseract finished"
        );
        Ok(text)
    }
}
