use std::sync::OnceLock;

use blog_sync::SyncConfig;

const DEV_API: &str = "http://localhost:8080";

/// Pick the gateway origin for a page served from `hostname`.
/// - In development (localhost): use http://localhost:8080
/// - In production: use the page's own origin (the gateway serves the UI)
pub fn api_base_for(hostname: &str, origin: &str) -> String {
    if hostname == "localhost" || hostname == "127.0.0.1" {
        DEV_API.to_string()
    } else {
        origin.trim_end_matches('/').to_string()
    }
}

fn get_api_base() -> String {
    let location = web_sys::window().map(|w| w.location());
    let hostname = location
        .as_ref()
        .and_then(|l| l.hostname().ok())
        .unwrap_or_default();
    let origin = location
        .as_ref()
        .and_then(|l| l.origin().ok())
        .unwrap_or_else(|| DEV_API.to_string());
    api_base_for(&hostname, &origin)
}

static API_BASE_CACHE: OnceLock<String> = OnceLock::new();

/// Cached gateway origin, computed on first use.
pub fn api_base() -> &'static str {
    API_BASE_CACHE.get_or_init(get_api_base).as_str()
}

/// Sync configuration for the browser: defaults with the page-derived origin.
pub fn browser_config() -> SyncConfig {
    SyncConfig {
        api_base_url: api_base().to_string(),
        ..SyncConfig::default()
    }
}
