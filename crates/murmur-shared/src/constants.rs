/// Application name
pub const APP_NAME: &str = "Murmur";

/// Default capacity of the change-event broadcast channel
pub const DEFAULT_EVENT_BUFFER: usize = 256;

/// Default tracing filter when neither `RUST_LOG` nor `MURMUR_LOG` is set
pub const DEFAULT_LOG_FILTER: &str = "murmur_client=info,murmur_store=info,warn";

/// Environment variables read by the client configuration
pub const ENV_DAY_OFFSET_MINUTES: &str = "MURMUR_DAY_OFFSET_MINUTES";
pub const ENV_EVENT_BUFFER: &str = "MURMUR_EVENT_BUFFER";
pub const ENV_LOG: &str = "MURMUR_LOG";
