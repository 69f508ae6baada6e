//! Runtime configuration, read from the environment with defaults that
//! work against a local backend.

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

fn env_parse<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

#[derive(Debug, Clone)]
pub struct Config {
    /// Catalog backend base URL.
    pub base_url: String,
    /// Static-asset host that song detail sound/video links point at.
    pub asset_host: String,
    pub request_timeout_secs: u64,
    /// Bin count used by the difficulty charts when the UI doesn't
    /// override it.
    pub default_bins: u32,
}

impl Config {
    pub fn from_env() -> Self {
        Self {
            base_url: env_or("SONGSTATS_BASE_URL", "http://localhost:8080"),
            asset_host: env_or("SONGSTATS_ASSET_HOST", "https://files.catbox.moe"),
            request_timeout_secs: env_parse("SONGSTATS_TIMEOUT_SECS", 30),
            default_bins: env_parse("SONGSTATS_BINS", 20),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::from_env()
    }
}
