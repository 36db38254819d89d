use std::io::Write;
use std::path::PathBuf;
use std::process::{Command, Stdio};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum OcrError {
    #[error("Image decode error: {0}")]
    ImageDecode(String),
    #[error("OCR engine error: {0}")]
    Engine(String),
    #[error("Tesseract not available at '{0}'")]
    NotAvailable(String),
}

/// Abstraction over an OCR backend.
/// Implementations accept PNG image bytes and return the recognized text.
pub trait OcrBackend: Send + Sync {
    fn recognize(&self, image_bytes: &[u8]) -> Result<String, OcrError>;
}

// ── Mock backends (always available, used for tests) ──────────────────────────

/// Returns a pre-set string without looking at the image.
pub struct MockRecognizer {
    pub text: String,
}

impl MockRecognizer {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }
}

impl OcrBackend for MockRecognizer {
    fn recognize(&self, _image_bytes: &[u8]) -> Result<String, OcrError> {
        Ok(self.text.clone())
    }
}

/// Always fails with an engine error.
pub struct FailingRecognizer {
    pub message: String,
}

impl FailingRecognizer {
    pub fn new(message: impl Into<String>) -> Self {
        Self { message: message.into() }
    }
}

impl OcrBackend for FailingRecognizer {
    fn recognize(&self, _image_bytes: &[u8]) -> Result<String, OcrError> {
        Err(OcrError::Engine(self.message.clone()))
    }
}

// ── Tesseract CLI backend ─────────────────────────────────────────────────────

/// Runs the `tesseract` binary, streaming the image on stdin and reading text from stdout.
#[derive(Debug, Clone)]
pub struct TesseractCli {
    command: PathBuf,
    language: String,
}

impl TesseractCli {
    pub fn new(command: impl Into<PathBuf>, language: &str) -> Self {
        Self { command: command.into(), language: language.to_string() }
    }

    pub fn command(&self) -> &PathBuf {
        &self.command
    }
}

impl OcrBackend for TesseractCli {
    fn recognize(&self, image_bytes: &[u8]) -> Result<String, OcrError> {
        let mut child = Command::new(&self.command)
            .args(["stdin", "stdout", "-l", self.language.as_str()])
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| match e.kind() {
                std::io::ErrorKind::NotFound => {
                    OcrError::NotAvailable(self.command.display().to_string())
                }
                _ => OcrError::Engine(format!("cannot start tesseract: {e}")),
            })?;

        // Tesseract reads all of stdin before it starts writing, so a plain
        // write-then-wait cannot deadlock.
        let written = match child.stdin.take() {
            Some(mut stdin) => stdin.write_all(image_bytes),
            None => Err(std::io::Error::other("tesseract stdin was not captured")),
        };

        let output = child
            .wait_with_output()
            .map_err(|e| OcrError::Engine(format!("tesseract did not finish: {e}")))?;

        if !output.status.success() {
            return Err(OcrError::Engine(format!(
                "tesseract exited with {}: {}",
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            )));
        }
        written.map_err(|e| OcrError::Engine(format!("cannot send image to tesseract: {e}")))?;

        String::from_utf8(output.stdout)
            .map_err(|e| OcrError::Engine(format!("tesseract produced non-UTF-8 output: {e}")))
    }
}

// ── libtesseract backend (optional, gated behind `leptess` feature) ───────────

#[cfg(feature = "leptess")]
pub mod leptess_backend {
    use super::{OcrBackend, OcrError};
    use leptess::LepTess;

    pub struct LeptessRecognizer {
        data_path: Option<String>,
        lang: String,
    }

    impl LeptessRecognizer {
        pub fn new(data_path: Option<String>, lang: &str) -> Self {
            Self { data_path, lang: lang.to_string() }
        }
    }

    impl OcrBackend for LeptessRecognizer {
        fn recognize(&self, image_bytes: &[u8]) -> Result<String, OcrError> {
            let mut lt = LepTess::new(self.data_path.as_deref(), &self.lang)
                .map_err(|e| OcrError::Engine(e.to_string()))?;
            lt.set_image_from_mem(image_bytes)
                .map_err(|e| OcrError::ImageDecode(e.to_string()))?;
            lt.get_utf8_text().map_err(|e| OcrError::Engine(e.to_string()))
        }
    }
}
