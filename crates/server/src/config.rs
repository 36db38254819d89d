//! Service configuration.
//!
//! Resolution order: built-in defaults, then an optional TOML file named by
//! `MOODSCAN_CONFIG`, then individual environment overrides.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use thiserror::Error;

pub const CONFIG_PATH_VAR: &str = "MOODSCAN_CONFIG";
pub const BIND_ADDR_VAR: &str = "MOODSCAN_BIND_ADDR";
pub const UPLOAD_DIR_VAR: &str = "MOODSCAN_UPLOAD_DIR";
pub const MAX_UPLOAD_BYTES_VAR: &str = "MOODSCAN_MAX_UPLOAD_BYTES";
pub const TESSERACT_CMD_VAR: &str = "TESSERACT_CMD";
pub const TESSERACT_LANG_VAR: &str = "TESSERACT_LANG";

pub const DEFAULT_ALLOWED_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "tiff", "bmp"];

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config file {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid config file {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error("invalid value for {var}: {message}")]
    Env { var: &'static str, message: String },
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OcrConfig {
    /// Path (or bare name on `PATH`) of the tesseract binary.
    pub tesseract_cmd: PathBuf,
    pub language: String,
}

impl Default for OcrConfig {
    fn default() -> Self {
        Self { tesseract_cmd: PathBuf::from("tesseract"), language: "eng".to_string() }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    pub bind_addr: SocketAddr,
    /// Holds transient uploads and is the scan target of the batch endpoint.
    pub upload_dir: PathBuf,
    /// Lowercase, without the leading dot.
    pub allowed_extensions: Vec<String>,
    pub max_upload_bytes: usize,
    pub ocr: OcrConfig,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([0, 0, 0, 0], 5001)),
            upload_dir: PathBuf::from("images"),
            allowed_extensions: DEFAULT_ALLOWED_EXTENSIONS.iter().map(|e| e.to_string()).collect(),
            max_upload_bytes: 16 * 1024 * 1024,
            ocr: OcrConfig::default(),
        }
    }
}

impl ServiceConfig {
    /// Load from the process environment.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(&std::env::vars().collect())
    }

    /// Load using a provided environment map (useful for testing).
    pub fn load_from(env: &HashMap<String, String>) -> Result<Self, ConfigError> {
        let mut config = match env.get(CONFIG_PATH_VAR) {
            Some(path) => Self::from_file(Path::new(path))?,
            None => Self::default(),
        };
        config.apply_env(env)?;
        config.validated()
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)
            .map_err(|source| ConfigError::Read { path: path.to_path_buf(), source })?;
        toml::from_str(&content)
            .map_err(|source| ConfigError::Parse { path: path.to_path_buf(), source })
    }

    fn apply_env(&mut self, env: &HashMap<String, String>) -> Result<(), ConfigError> {
        if let Some(v) = env.get(BIND_ADDR_VAR) {
            self.bind_addr = v.parse().map_err(|e: std::net::AddrParseError| ConfigError::Env {
                var: BIND_ADDR_VAR,
                message: e.to_string(),
            })?;
        }
        if let Some(v) = env.get(UPLOAD_DIR_VAR) {
            self.upload_dir = PathBuf::from(v);
        }
        if let Some(v) = env.get(MAX_UPLOAD_BYTES_VAR) {
            self.max_upload_bytes =
                v.parse().map_err(|e: std::num::ParseIntError| ConfigError::Env {
                    var: MAX_UPLOAD_BYTES_VAR,
                    message: e.to_string(),
                })?;
        }
        if let Some(v) = env.get(TESSERACT_CMD_VAR) {
            self.ocr.tesseract_cmd = PathBuf::from(v);
        }
        if let Some(v) = env.get(TESSERACT_LANG_VAR) {
            self.ocr.language = v.clone();
        }
        Ok(())
    }

    /// Normalize extensions and reject unusable settings.
    pub fn validated(mut self) -> Result<Self, ConfigError> {
        self.allowed_extensions = self
            .allowed_extensions
            .iter()
            .map(|e| e.trim().trim_start_matches('.').to_ascii_lowercase())
            .filter(|e| !e.is_empty())
            .collect();
        self.allowed_extensions.sort();
        self.allowed_extensions.dedup();

        if self.allowed_extensions.is_empty() {
            return Err(ConfigError::Invalid("allowed_extensions must not be empty".into()));
        }
        if self.max_upload_bytes == 0 {
            return Err(ConfigError::Invalid("max_upload_bytes must be greater than zero".into()));
        }
        if self.ocr.language.trim().is_empty() {
            return Err(ConfigError::Invalid("ocr.language must not be empty".into()));
        }
        Ok(self)
    }

    /// Case-insensitive check of the text after the last `.` in `filename`.
    pub fn is_allowed_filename(&self, filename: &str) -> bool {
        match filename.rsplit_once('.') {
            Some((_, ext)) => {
                let ext = ext.to_ascii_lowercase();
                self.allowed_extensions.iter().any(|allowed| *allowed == ext)
            }
            None => false,
        }
    }

    pub fn ensure_upload_dir(&self) -> std::io::Result<()> {
        std::fs::create_dir_all(&self.upload_dir)
    }
}
