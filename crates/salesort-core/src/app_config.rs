/// Process-level settings sourced from the environment.
///
/// Per-run inputs (collection handle, input file, pacing delay) come from the
/// command line instead; see the `salesort` binary.
#[derive(Clone)]
pub struct AppConfig {
    /// Store base URL, e.g. `https://example.myshopify.com`.
    pub store_url: String,
    pub access_token: String,
    /// Admin API version segment, e.g. `2024-10`.
    pub api_version: String,
    pub log_level: String,
    pub request_timeout_secs: u64,
    /// Pause applied after a rate-limit signal before the failure is reported.
    pub rate_limit_cooldown_secs: u64,
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("store_url", &self.store_url)
            .field("access_token", &"[redacted]")
            .field("api_version", &self.api_version)
            .field("log_level", &self.log_level)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .field("rate_limit_cooldown_secs", &self.rate_limit_cooldown_secs)
            .finish()
    }
}
