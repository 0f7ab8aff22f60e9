//! Text Extractor — page text plus OCR of every embedded image, as one
//! labeled stream.

use std::path::Path;
use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::ocr::{OcrEngine, OcrError};
use crate::parse::document::{PagedDocument, PdfDocument};
use crate::parse::ParseError;

/// Separator between extracted blocks.
pub const BLOCK_SEPARATOR: &str = "\n\n";

/// Extracts the full text of a resume, falling back to OCR for any content
/// that only exists as images. The OCR engine is injected at construction.
#[derive(Clone)]
pub struct TextExtractor {
    ocr: Arc<dyn OcrEngine>,
}

impl TextExtractor {
    pub fn new(ocr: Arc<dyn OcrEngine>) -> Self {
        Self { ocr }
    }

    /// Opens the PDF at `path` and extracts its text.
    pub fn extract(&self, path: &Path) -> Result<String, ParseError> {
        if !path.is_file() {
            return Err(ParseError::NotFound(path.to_path_buf()));
        }

        let document = PdfDocument::open(path)?;
        let text = self.extract_document(&document);
        info!(
            path = %path.display(),
            pages = document.page_count(),
            chars = text.len(),
            "resume text extracted"
        );
        Ok(text)
    }

    /// Produces the labeled block stream for any paged document.
    ///
    /// Blocks are emitted page by page; within a page the text block comes
    /// first, then one block per image. A failing image contributes an inline
    /// error marker instead of aborting the document.
    pub fn extract_document(&self, document: &dyn PagedDocument) -> String {
        let mut blocks = Vec::new();

        for page in 1..=document.page_count() {
            let text = document.page_text(page);
            if !text.trim().is_empty() {
                blocks.push(format!("[Page {page} Text]\n{text}"));
            }

            for img_index in 1..=document.image_count(page) {
                match self.ocr_image(document, page, img_index) {
                    Ok(ocr_text) if !ocr_text.is_empty() => {
                        blocks.push(format!("[Page {page} Image {img_index} OCR]\n{ocr_text}"));
                    }
                    Ok(_) => {
                        debug!(page, image = img_index, "OCR found no text");
                    }
                    Err(e) => {
                        warn!(page, image = img_index, error = %e, "OCR failed for image");
                        blocks.push(format!("[Page {page} Image {img_index} OCR ERROR: {e}]"));
                    }
                }
            }
        }

        blocks.join(BLOCK_SEPARATOR)
    }

    /// Loads, decodes and recognizes one image. The pixel buffer is owned by
    /// this call and released when it returns, whichever way it returns.
    fn ocr_image(
        &self,
        document: &dyn PagedDocument,
        page: u32,
        img_index: usize,
    ) -> Result<String, OcrError> {
        let image = document.load_image(page, img_index)?.into_dynamic()?;
        let text = self.ocr.recognize(&image)?;
        Ok(text.trim().to_string())
    }
}
