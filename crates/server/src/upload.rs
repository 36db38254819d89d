use axum::body::Bytes;
use axum::extract::Multipart;
use regex::Regex;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use tracing::{debug, warn};
use unicode_normalization::UnicodeNormalization;
use uuid::Uuid;

use crate::config::ServiceConfig;
use crate::error::ApiError;
use crate::pipeline::{self, OcrResult};
use crate::state::AppState;

/// Multipart field that carries the image.
pub const FILE_FIELD: &str = "file";

/// One file part as it arrived in the request.
#[derive(Debug, Clone)]
pub struct IncomingFile {
    pub filename: String,
    pub bytes: Bytes,
}

/// Read the `file` part out of a multipart body, skipping any other fields.
pub async fn read_file_field(mut multipart: Multipart) -> Result<IncomingFile, ApiError> {
    while let Some(field) = multipart.next_field().await? {
        if field.name() != Some(FILE_FIELD) {
            continue;
        }
        let filename = field.file_name().unwrap_or_default().to_string();
        let bytes = field.bytes().await?;
        return Ok(IncomingFile { filename, bytes });
    }
    Err(ApiError::BadRequest("No file part".into()))
}

// ── Filenames ─────────────────────────────────────────────────────────────────

fn unsafe_filename_chars() -> &'static Regex {
    static R: OnceLock<Regex> = OnceLock::new();
    R.get_or_init(|| Regex::new(r"[^A-Za-z0-9_.-]").expect("invalid regex"))
}

/// Reduce a client-supplied filename to a safe single path component.
///
/// Keeps only the last path component, folds it to ASCII via NFKD
/// (`café` → `cafe`), drops anything outside `[A-Za-z0-9_.-]`, joins
/// whitespace runs with `_` and strips leading and trailing `.`/`_`.
/// May return an empty string.
pub fn sanitize_filename(name: &str) -> String {
    let base = name.rsplit(['/', '\\']).next().unwrap_or_default();
    let ascii: String = base.nfkd().filter(char::is_ascii).collect();
    let joined = ascii.split_whitespace().collect::<Vec<_>>().join("_");
    unsafe_filename_chars()
        .replace_all(&joined, "")
        .trim_matches(|c: char| c == '.' || c == '_')
        .to_string()
}

/// A single request's upload, before and after it touches the disk.
#[derive(Debug, Clone, PartialEq)]
pub struct UploadedImage {
    pub original_filename: String,
    pub sanitized_filename: String,
    /// `<upload_dir>/<uuid>-<sanitized>`; unique per request.
    pub stored_path: PathBuf,
    pub allowed_extension: bool,
}

impl UploadedImage {
    pub fn describe(original_filename: &str, config: &ServiceConfig) -> Self {
        let sanitized_filename = sanitize_filename(original_filename);
        let stored_path =
            config.upload_dir.join(format!("{}-{}", Uuid::new_v4(), sanitized_filename));
        Self {
            original_filename: original_filename.to_string(),
            allowed_extension: config.is_allowed_filename(original_filename),
            sanitized_filename,
            stored_path,
        }
    }

    pub fn validate(&self) -> Result<(), ApiError> {
        if self.original_filename.is_empty() {
            return Err(ApiError::BadRequest("No selected file".into()));
        }
        if !self.allowed_extension {
            return Err(ApiError::UnsupportedType("Invalid file type".into()));
        }
        if self.sanitized_filename.is_empty() {
            return Err(ApiError::BadRequest("Invalid filename".into()));
        }
        Ok(())
    }
}

// ── Scoped storage ────────────────────────────────────────────────────────────

/// An uploaded file on disk. Removed when the guard drops, on every exit path.
#[derive(Debug)]
pub struct StoredUpload {
    path: PathBuf,
}

impl StoredUpload {
    pub async fn persist(path: PathBuf, bytes: &[u8]) -> std::io::Result<Self> {
        // Guard first so a partial write is cleaned up too.
        let guard = Self { path };
        tokio::fs::write(&guard.path, bytes).await?;
        Ok(guard)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for StoredUpload {
    fn drop(&mut self) {
        // Blocking unlink of a single small file; cheap enough for a runtime thread.
        match std::fs::remove_file(&self.path) {
            Ok(()) => debug!(path = %self.path.display(), "Removed upload"),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => warn!(path = %self.path.display(), "Failed to remove upload: {e}"),
        }
    }
}

// ── Handler ───────────────────────────────────────────────────────────────────

/// Validate, store, extract, classify, clean up.
pub async fn handle(state: &AppState, file: IncomingFile) -> Result<OcrResult, ApiError> {
    let image = UploadedImage::describe(&file.filename, &state.config);
    image.validate()?;

    let stored = StoredUpload::persist(image.stored_path.clone(), &file.bytes)
        .await
        .map_err(|e| ApiError::Unexpected(format!("cannot store upload: {e}")))?;
    debug!(
        original = %image.original_filename,
        path = %stored.path().display(),
        bytes = file.bytes.len(),
        "Stored upload"
    );

    pipeline::analyze_image(state, stored.path().to_path_buf()).await
}
