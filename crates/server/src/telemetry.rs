use tracing_bunyan_formatter::{BunyanFormattingLayer, JsonStorageLayer};
use tracing_subscriber::{layer::SubscriberExt, EnvFilter, Registry};

/// Install the global subscriber: `RUST_LOG` filtering (default `info`) and
/// bunyan-style JSON lines on stdout.
pub fn init(service_name: &str) -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let subscriber = Registry::default()
        .with(filter)
        .with(JsonStorageLayer)
        .with(BunyanFormattingLayer::new(service_name.to_string(), std::io::stdout));
    tracing::subscriber::set_global_default(subscriber)?;
    Ok(())
}
