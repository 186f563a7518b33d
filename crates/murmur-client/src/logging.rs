use murmur_shared::constants::APP_NAME;
use tracing_subscriber::{fmt, EnvFilter};

/// Install the global tracing subscriber.
///
/// `RUST_LOG` wins; otherwise `default_filter` (usually
/// [`SyncConfig::log_filter`](crate::SyncConfig::log_filter)) applies.
/// Calling this twice is harmless: the second call leaves the first
/// subscriber in place.
pub fn init_tracing(default_filter: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    let installed = fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .try_init()
        .is_ok();

    if installed {
        tracing::info!("{} transcript engine logging initialised", APP_NAME);
    }
}
