use std::sync::Once;

use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, fmt};

static INIT: Once = Once::new();

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
}

/// Install a human-readable subscriber writing to stderr.
///
/// The level comes from `RUST_LOG` (default `info`). Only the first call in a
/// process has any effect, and a subscriber installed elsewhere is left alone.
pub fn init_telemetry(service_name: &str) {
    INIT.call_once(|| {
        let installed = tracing_subscriber::registry()
            .with(env_filter())
            .with(fmt::layer().with_writer(std::io::stderr).with_target(true))
            .try_init()
            .is_ok();
        if installed {
            tracing::debug!(service.name = service_name, "telemetry initialized");
        }
    });
}

/// Install a subscriber writing one JSON object per event to stderr.
///
/// Same filtering and once-only behaviour as [`init_telemetry`].
pub fn init_json_telemetry(service_name: &str) {
    INIT.call_once(|| {
        let installed = tracing_subscriber::registry()
            .with(env_filter())
            .with(fmt::layer().json().with_writer(std::io::stderr).with_current_span(false))
            .try_init()
            .is_ok();
        if installed {
            tracing::debug!(service.name = service_name, "telemetry initialized");
        }
    });
}
