pub mod batch;
pub mod config;
pub mod error;
pub mod pipeline;
pub mod routes;
pub mod state;
pub mod telemetry;
pub mod upload;

pub use batch::BatchEntry;
pub use config::{ConfigError, OcrConfig, ServiceConfig};
pub use error::ApiError;
pub use pipeline::OcrResult;
pub use routes::router;
pub use state::AppState;
