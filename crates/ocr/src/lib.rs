pub mod decode;
pub mod extractor;
pub mod recognizer;

pub use decode::{load_for_ocr, DecodeError};
pub use extractor::{ExtractionError, TextExtractor};
pub use recognizer::{FailingRecognizer, MockRecognizer, OcrBackend, OcrError, TesseractCli};

#[cfg(feature = "leptess")]
pub use recognizer::leptess_backend::LeptessRecognizer;
