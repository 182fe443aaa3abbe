use crate::app_config::{AppConfig, Environment};
use crate::ConfigError;

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if required env vars are missing or values are invalid.
pub fn load_app_config() -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_app_config_from_env()
}

/// Load application configuration from environment variables already in the
/// process, without touching `.env` files.
///
/// # Errors
///
/// Returns `ConfigError` if required env vars are missing or values are invalid.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// The core parsing/validation logic is decoupled from the actual environment
/// so it can be tested with a pure `HashMap` lookup.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    use std::net::SocketAddr;

    let require = |var: &str| -> Result<String, ConfigError> {
        lookup(var).map_err(|_| ConfigError::MissingEnvVar(var.to_string()))
    };

    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let parse_addr = |var: &str, default: &str| -> Result<SocketAddr, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<SocketAddr>()
            .map_err(|e| ConfigError::InvalidEnvVar {
                var: var.to_string(),
                reason: e.to_string(),
            })
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

    let database_url = require("DATABASE_URL")?;
    let env = parse_environment(&or_default("SIGDESK_ENV", "development"));
    let bind_addr = parse_addr("SIGDESK_BIND_ADDR", "0.0.0.0:3000")?;
    let log_level = or_default("SIGDESK_LOG_LEVEL", "info");

    let anthropic_api_key = lookup("ANTHROPIC_API_KEY").ok();
    let producthunt_api_token = lookup("PRODUCT_HUNT_API_TOKEN").ok();

    let db_max_connections = parse_u32("SIGDESK_DB_MAX_CONNECTIONS", "10")?;
    let db_min_connections = parse_u32("SIGDESK_DB_MIN_CONNECTIONS", "1")?;
    let db_acquire_timeout_secs = parse_u64("SIGDESK_DB_ACQUIRE_TIMEOUT_SECS", "10")?;

    let fetch_timeout_secs = parse_u64("SIGDESK_FETCH_TIMEOUT_SECS", "30")?;
    let fetch_user_agent = or_default("SIGDESK_FETCH_USER_AGENT", "sigdesk/0.1 (signal-desk)");
    let analysis_timeout_secs = parse_u64("SIGDESK_ANALYSIS_TIMEOUT_SECS", "45")?;
    let analysis_batch_size = parse_usize("SIGDESK_ANALYSIS_BATCH_SIZE", "3")?;
    let analysis_batch_delay_ms = parse_u64("SIGDESK_ANALYSIS_BATCH_DELAY_MS", "2000")?;
    let fetch_max_retries = parse_u32("SIGDESK_FETCH_MAX_RETRIES", "3")?;
    let fetch_retry_backoff_base_secs = parse_u64("SIGDESK_FETCH_RETRY_BACKOFF_BASE_SECS", "2")?;

    Ok(AppConfig {
        database_url,
        env,
        bind_addr,
        log_level,
        anthropic_api_key,
        producthunt_api_token,
        db_max_connections,
        db_min_connections,
        db_acquire_timeout_secs,
        fetch_timeout_secs,
        fetch_user_agent,
        analysis_timeout_secs,
        analysis_batch_size,
        analysis_batch_delay_ms,
        fetch_max_retries,
        fetch_retry_backoff_base_secs,
    })
}

fn parse_environment(raw: &str) -> Environment {
    match raw.to_ascii_lowercase().as_str() {
        "production" | "prod" => Environment::Production,
        "test" => Environment::Test,
        _ => Environment::Development,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::env::VarError;

    fn lookup_from<'a>(
        map: &'a HashMap<&'a str, &'a str>,
    ) -> impl Fn(&str) -> Result<String, VarError> + 'a {
        move |key| map.get(key).map(ToString::to_string).ok_or(VarError::NotPresent)
    }

    fn minimal_env() -> HashMap<&'static str, &'static str> {
        HashMap::from([("DATABASE_URL", "postgres://localhost/sigdesk")])
    }

    #[test]
    fn missing_database_url_is_an_error() {
        let map = HashMap::new();
        let err = build_app_config(lookup_from(&map)).unwrap_err();
        assert!(matches!(err, ConfigError::MissingEnvVar(ref v) if v == "DATABASE_URL"));
    }

    #[test]
    fn defaults_apply_when_only_database_url_is_set() {
        let map = minimal_env();
        let config = build_app_config(lookup_from(&map)).expect("config");

        assert_eq!(config.env, Environment::Development);
        assert_eq!(config.bind_addr.port(), 3000);
        assert_eq!(config.analysis_batch_size, 3);
        assert_eq!(config.analysis_batch_delay_ms, 2000);
        assert!(config.anthropic_api_key.is_none());
    }

    #[test]
    fn invalid_numeric_value_is_rejected_with_var_name() {
        let mut map = minimal_env();
        map.insert("SIGDESK_ANALYSIS_BATCH_SIZE", "three");
        let err = build_app_config(lookup_from(&map)).unwrap_err();
        assert!(
            matches!(err, ConfigError::InvalidEnvVar { ref var, .. } if var == "SIGDESK_ANALYSIS_BATCH_SIZE")
        );
    }

    #[test]
    fn environment_parsing_accepts_aliases() {
        let mut map = minimal_env();
        map.insert("SIGDESK_ENV", "prod");
        let config = build_app_config(lookup_from(&map)).expect("config");
        assert_eq!(config.env, Environment::Production);
    }

    #[test]
    fn debug_output_redacts_secrets() {
        let mut map = minimal_env();
        map.insert("ANTHROPIC_API_KEY", "sk-ant-secret-value");
        let config = build_app_config(lookup_from(&map)).expect("config");
        let debug = format!("{config:?}");
        assert!(!debug.contains("sk-ant-secret-value"));
        assert!(!debug.contains("postgres://"));
        assert!(debug.contains("[redacted]"));
    }
}
