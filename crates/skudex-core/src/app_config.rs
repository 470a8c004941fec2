/// Runtime configuration shared by every extraction entrypoint.
///
/// All knobs come from `SKUDEX_*` environment variables and carry
/// defaults, so an empty environment yields a working config.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Per-request timeout applied to every outbound HTTP call.
    pub request_timeout_secs: u64,
    /// User-Agent header sent with every request.
    pub user_agent: String,
    /// Upper bound on concurrently fetched product pages. Never zero.
    pub max_concurrent_fetches: usize,
    /// Courtesy pause between requests to the same site.
    pub inter_request_delay_ms: u64,
    /// Retry attempts after the initial try for transient failures.
    pub max_retries: u32,
    /// Base for exponential retry backoff.
    pub retry_backoff_base_secs: u64,
    /// Cap on product pages visited per crawl. Zero means unlimited.
    pub max_items: usize,
}
