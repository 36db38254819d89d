use serde::Serialize;
use tracing::{error, info};

use crate::error::ApiError;
use crate::pipeline::{self, OcrResult};
use crate::state::AppState;

/// One file's outcome in a directory run: `{filename, text, emotional_analysis}`
/// or `{filename, error}`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BatchEntry {
    pub filename: String,
    #[serde(flatten)]
    pub result: OcrResult,
}

/// Analyze every allowed image already sitting in the upload directory.
///
/// Files are visited in filename order and left in place. A failure on one
/// file is recorded in its entry and the run continues.
pub async fn process_directory(state: &AppState) -> Result<Vec<BatchEntry>, ApiError> {
    let dir = &state.config.upload_dir;
    let mut read_dir = tokio::fs::read_dir(dir).await.map_err(|e| {
        ApiError::Unexpected(format!("cannot read {}: {e}", dir.display()))
    })?;

    let mut filenames = Vec::new();
    while let Some(entry) = read_dir.next_entry().await? {
        if !entry.file_type().await?.is_file() {
            continue;
        }
        let Some(name) = entry.file_name().to_str().map(str::to_owned) else {
            continue;
        };
        if state.config.is_allowed_filename(&name) {
            filenames.push(name);
        }
    }
    filenames.sort();

    let mut entries = Vec::with_capacity(filenames.len());
    for filename in filenames {
        let result = match pipeline::analyze_image(state, dir.join(&filename)).await {
            Ok(result) => result,
            Err(e) => {
                error!(filename = %filename, "Batch item failed: {e}");
                OcrResult::Failure { error: e.to_string() }
            }
        };
        entries.push(BatchEntry { filename, result });
    }

    info!(
        dir = %dir.display(),
        files = entries.len(),
        succeeded = entries.iter().filter(|e| e.result.is_success()).count(),
        "Directory processed"
    );
    Ok(entries)
}
