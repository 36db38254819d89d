use moodscan_core::EmotionalAnalysis;
use serde::Serialize;
use std::path::PathBuf;
use tracing::{info, warn};

use crate::error::ApiError;
use crate::state::AppState;

/// Outcome of running one image through extraction and classification.
///
/// Extraction failures are a normal outcome here, not an `ApiError`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum OcrResult {
    Success {
        text: String,
        emotional_analysis: EmotionalAnalysis,
    },
    Failure {
        error: String,
    },
}

impl OcrResult {
    pub fn is_success(&self) -> bool {
        matches!(self, OcrResult::Success { .. })
    }
}

/// Extract text from `path` on the blocking pool, then classify it.
///
/// A classifier failure or a lost worker is an `ApiError::Unexpected`.
pub async fn analyze_image(state: &AppState, path: PathBuf) -> Result<OcrResult, ApiError> {
    let extractor = state.extractor.clone();
    let worker_path = path.clone();
    let extracted = tokio::task::spawn_blocking(move || extractor.extract(&worker_path)).await?;

    let text = match extracted {
        Ok(text) => text,
        Err(e) => {
            warn!(path = %path.display(), "{e}");
            return Ok(OcrResult::Failure { error: e.to_string() });
        }
    };

    let emotional_analysis = state.classifier.classify(&text)?;
    info!(
        path = %path.display(),
        words = emotional_analysis.text_length,
        sentiment = %emotional_analysis.overall_sentiment,
        "Image analyzed"
    );
    Ok(OcrResult::Success { text, emotional_analysis })
}
