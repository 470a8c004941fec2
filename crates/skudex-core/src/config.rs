use crate::app_config::AppConfig;
use crate::ConfigError;

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if a `SKUDEX_*` value fails to parse or validate.
pub fn load_app_config() -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_app_config_from_env()
}

/// Load application configuration from environment variables already in the process.
///
/// Unlike [`load_app_config`], this does NOT load `.env` files — useful for testing
/// or when the caller manages env setup.
///
/// # Errors
///
/// Returns `ConfigError` if a `SKUDEX_*` value fails to parse or validate.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// This is the core parsing/validation logic, decoupled from the actual environment
/// so it can be tested with a pure `HashMap` lookup — no `set_var`/`remove_var` needed.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let parse_u32 = |var: &str, default: &str| -> Result<u32, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<u32>().map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })
    };

    let parse_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<u64>().map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })
    };

    let parse_usize = |var: &str, default: &str| -> Result<usize, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<usize>()
            .map_err(|e| ConfigError::InvalidEnvVar {
                var: var.to_string(),
                reason: e.to_string(),
            })
    };

    let request_timeout_secs = parse_u64("SKUDEX_REQUEST_TIMEOUT_SECS", "20")?;
    let user_agent = or_default("SKUDEX_USER_AGENT", "skudex/0.1 (catalog-extractor)");
    let max_concurrent_fetches = parse_usize("SKUDEX_MAX_CONCURRENT_FETCHES", "4")?;
    let inter_request_delay_ms = parse_u64("SKUDEX_INTER_REQUEST_DELAY_MS", "250")?;
    let max_retries = parse_u32("SKUDEX_MAX_RETRIES", "2")?;
    let retry_backoff_base_secs = parse_u64("SKUDEX_RETRY_BACKOFF_BASE_SECS", "1")?;
    let max_items = parse_usize("SKUDEX_MAX_ITEMS", "0")?;

    if max_concurrent_fetches == 0 {
        return Err(ConfigError::InvalidEnvVar {
            var: "SKUDEX_MAX_CONCURRENT_FETCHES".to_string(),
            reason: "must be at least 1".to_string(),
        });
    }

    Ok(AppConfig {
        request_timeout_secs,
        user_agent,
        max_concurrent_fetches,
        inter_request_delay_ms,
        max_retries,
        retry_backoff_base_secs,
        max_items,
    })
}
