use std::path::Path;
use std::sync::Arc;
use thiserror::Error;

use crate::decode::{self, DecodeError};
use crate::recognizer::{OcrBackend, OcrError};

/// Why text could not be pulled out of an image.
///
/// The display text is what clients see in the `error` field.
#[derive(Debug, Error)]
pub enum ExtractionError {
    #[error("Error processing image: {0}")]
    Decode(#[from] DecodeError),
    #[error("Error processing image: {0}")]
    Ocr(#[from] OcrError),
}

/// Turns an image file on disk into trimmed text: decode → PNG → OCR backend.
#[derive(Clone)]
pub struct TextExtractor {
    backend: Arc<dyn OcrBackend>,
}

impl TextExtractor {
    pub fn new(backend: Arc<dyn OcrBackend>) -> Self {
        Self { backend }
    }

    /// Blocking: decodes the image and waits on the OCR engine.
    pub fn extract(&self, path: &Path) -> Result<String, ExtractionError> {
        let png = decode::load_for_ocr(path)?;
        let text = self.backend.recognize(&png)?;
        Ok(text.trim().to_string())
    }
}

impl std::fmt::Debug for TextExtractor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TextExtractor").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::recognizer::{FailingRecognizer, MockRecognizer};
    use image::{DynamicImage, GrayImage, ImageBuffer, Luma};

    fn write_png(dir: &Path, name: &str) -> std::path::PathBuf {
        let img: GrayImage = ImageBuffer::from_fn(4, 4, |_, _| Luma([200u8]));
        let path = dir.join(name);
        DynamicImage::ImageLuma8(img)
            .save_with_format(&path, image::ImageFormat::Png)
            .unwrap();
        path
    }

    #[test]
    fn extract_trims_recognized_text() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_png(dir.path(), "note.png");
        let extractor = TextExtractor::new(Arc::new(MockRecognizer::new("\n  I am so happy today!  \n\n")));
        assert_eq!(extractor.extract(&path).unwrap(), "I am so happy today!");
    }

    #[test]
    fn corrupt_image_never_reaches_backend() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("corrupt.png");
        std::fs::write(&path, b"\x89PNG but not really").unwrap();
        let extractor = TextExtractor::new(Arc::new(MockRecognizer::new("should not appear")));

        let err = extractor.extract(&path).unwrap_err();
        assert!(matches!(err, ExtractionError::Decode(_)));
        assert!(err.to_string().starts_with("Error processing image: "));
    }

    #[test]
    fn engine_failure_is_extraction_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_png(dir.path(), "note.png");
        let extractor = TextExtractor::new(Arc::new(FailingRecognizer::new("out of memory")));

        let err = extractor.extract(&path).unwrap_err();
        assert!(matches!(err, ExtractionError::Ocr(_)));
        assert_eq!(
            err.to_string(),
            "Error processing image: OCR engine error: out of memory"
        );
    }

    #[test]
    fn blank_recognition_is_empty_text() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_png(dir.path(), "blank.png");
        let extractor = TextExtractor::new(Arc::new(MockRecognizer::new("   \n")));
        assert_eq!(extractor.extract(&path).unwrap(), "");
    }
}
