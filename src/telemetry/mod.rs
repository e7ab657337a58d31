//! Tracing subscribers for binaries built on top of ringhash.
//! The library itself only emits events; installing a subscriber is up to the caller.
use tracing_bunyan_formatter::{BunyanFormattingLayer, JsonStorageLayer};
use tracing_subscriber::prelude::*;
use tracing_subscriber::{EnvFilter, Registry};

const SERVICE_NAME: &str = "ringhash";

/// Installs a subscriber that writes bunyan-formatted json lines to stderr.
/// The level is taken from `RUST_LOG`, defaulting to `info`.
pub fn initialize_json_subscriber() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let formatting_layer = BunyanFormattingLayer::new(SERVICE_NAME.to_string(), std::io::stderr);

    Registry::default()
        .with(env_filter)
        .with(JsonStorageLayer)
        .with(formatting_layer)
        .init();
}
