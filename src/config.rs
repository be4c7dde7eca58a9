use std::time::Duration;

/// Application-level constants
pub const APP_NAME: &str = "sav-uplink";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Default item-database service endpoint.
pub const DEFAULT_API_BASE: &str = "https://items.bl4.dev";

/// Environment variable overriding the service endpoint.
pub const API_BASE_ENV: &str = "SAV_UPLINK_API_BASE";

/// Provenance tag attached to every serial submitted from a save file.
pub const SAVE_UPLOAD_SOURCE: &str = "save-upload";

/// Provenance tag for the single-item submission path.
pub const MANUAL_SUBMIT_SOURCE: &str = "community-frontend";

/// Request timeout for all service calls.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

/// Default page size for item listing.
pub const DEFAULT_PAGE_SIZE: u32 = 25;

/// Resolve the service base URL, honoring the env override.
pub fn api_base() -> String {
    std::env::var(API_BASE_ENV)
        .ok()
        .filter(|v| !v.trim().is_empty())
        .unwrap_or_else(|| DEFAULT_API_BASE.to_string())
}

/// Default tracing filter when RUST_LOG is not set.
pub fn default_log_filter() -> String {
    "sav_uplink=info".to_string()
}
