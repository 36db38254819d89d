use std::sync::Arc;

use moodscan_core::{EmotionClassifier, VaderScorer};
use moodscan_ocr::{OcrBackend, TextExtractor};

use crate::config::{OcrConfig, ServiceConfig};

/// Shared, read-only request context.
#[derive(Clone, Debug)]
pub struct AppState {
    pub config: Arc<ServiceConfig>,
    pub extractor: TextExtractor,
    pub classifier: EmotionClassifier,
}

impl AppState {
    pub fn new(config: ServiceConfig, extractor: TextExtractor, classifier: EmotionClassifier) -> Self {
        Self { config: Arc::new(config), extractor, classifier }
    }

    /// Production wiring: Tesseract for OCR, VADER for sentiment.
    pub fn from_config(config: ServiceConfig) -> Self {
        let extractor = TextExtractor::new(ocr_backend(&config.ocr));
        let classifier = EmotionClassifier::new(Arc::new(VaderScorer::new()));
        Self::new(config, extractor, classifier)
    }
}

#[cfg(not(feature = "leptess"))]
fn ocr_backend(ocr: &OcrConfig) -> Arc<dyn OcrBackend> {
    Arc::new(moodscan_ocr::TesseractCli::new(ocr.tesseract_cmd.clone(), &ocr.language))
}

// Links libtesseract directly; `tesseract_cmd` is unused in this build.
#[cfg(feature = "leptess")]
fn ocr_backend(ocr: &OcrConfig) -> Arc<dyn OcrBackend> {
    Arc::new(moodscan_ocr::LeptessRecognizer::new(None, &ocr.language))
}
