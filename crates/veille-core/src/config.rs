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

/// Load application configuration from environment variables already in the process.
///
/// Unlike [`load_app_config`], this does NOT load `.env` files.
///
/// # Errors
///
/// Returns `ConfigError` if required env vars are missing or values are invalid.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// Both API keys are required so a misconfigured deployment fails at startup
/// instead of on the first search.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    use std::net::SocketAddr;

    let require = |var: &str| -> Result<String, ConfigError> {
        lookup(var)
            .ok()
            .filter(|v| !v.trim().is_empty())
            .ok_or_else(|| ConfigError::MissingEnvVar(var.to_string()))
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

    let parse_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<u64>().map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })
    };

    let newsdata_api_key = require("NEWSDATA_API_KEY")?;
    let mediastack_api_key = require("MEDIASTACK_API_KEY")?;

    let env = parse_environment(&or_default("VEILLE_ENV", "development"));
    let bind_addr = parse_addr("VEILLE_BIND_ADDR", "0.0.0.0:3000")?;
    let log_level = or_default("VEILLE_LOG_LEVEL", "info");
    let subject = or_default("VEILLE_SUBJECT", "DS Automobiles");
    if subject.trim().is_empty() {
        return Err(ConfigError::InvalidEnvVar {
            var: "VEILLE_SUBJECT".to_string(),
            reason: "subject must not be blank".to_string(),
        });
    }

    let newsdata_base_url = or_default("VEILLE_NEWSDATA_BASE_URL", "https://newsdata.io");
    let source_timeout_secs = parse_u64("VEILLE_SOURCE_TIMEOUT_SECS", "30")?;
    let tei_url = or_default("VEILLE_TEI_URL", "http://localhost:8080");
    let model_timeout_secs = parse_u64("VEILLE_MODEL_TIMEOUT_SECS", "30")?;
    let user_agent = or_default("VEILLE_USER_AGENT", "veille/0.1 (news-watch)");

    Ok(AppConfig {
        env,
        bind_addr,
        log_level,
        subject,
        newsdata_api_key,
        mediastack_api_key,
        newsdata_base_url,
        source_timeout_secs,
        tei_url,
        model_timeout_secs,
        user_agent,
    })
}

/// Parse a string into an `Environment` variant.
///
/// Unrecognized values default to `Environment::Development`.
fn parse_environment(s: &str) -> Environment {
    match s {
        "production" => Environment::Production,
        "test" => Environment::Test,
        _ => Environment::Development,
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::env::VarError;

    use super::*;

    fn lookup_from_map<'a>(
        map: &'a HashMap<&'a str, &'a str>,
    ) -> impl Fn(&str) -> Result<String, VarError> + 'a {
        move |key| {
            map.get(key)
                .map(|v| (*v).to_string())
                .ok_or(VarError::NotPresent)
        }
    }

    /// Returns a map with all required env vars populated.
    fn full_env<'a>() -> HashMap<&'a str, &'a str> {
        let mut m = HashMap::new();
        m.insert("NEWSDATA_API_KEY", "newsdata-key");
        m.insert("MEDIASTACK_API_KEY", "mediastack-key");
        m
    }

    #[test]
    fn parse_environment_production() {
        assert_eq!(parse_environment("production"), Environment::Production);
    }

    #[test]
    fn parse_environment_unknown_defaults_to_development() {
        assert_eq!(parse_environment("staging"), Environment::Development);
    }

    #[test]
    fn build_app_config_fails_without_newsdata_key() {
        let map: HashMap<&str, &str> = HashMap::new();
        let result = build_app_config(lookup_from_map(&map));
        assert!(
            matches!(result, Err(ConfigError::MissingEnvVar(ref v)) if v == "NEWSDATA_API_KEY"),
            "expected MissingEnvVar(NEWSDATA_API_KEY), got: {result:?}"
        );
    }

    #[test]
    fn build_app_config_fails_without_mediastack_key() {
        let mut map: HashMap<&str, &str> = HashMap::new();
        map.insert("NEWSDATA_API_KEY", "newsdata-key");
        let result = build_app_config(lookup_from_map(&map));
        assert!(
            matches!(result, Err(ConfigError::MissingEnvVar(ref v)) if v == "MEDIASTACK_API_KEY"),
            "expected MissingEnvVar(MEDIASTACK_API_KEY), got: {result:?}"
        );
    }

    #[test]
    fn build_app_config_treats_blank_key_as_missing() {
        let mut map = full_env();
        map.insert("NEWSDATA_API_KEY", "   ");
        let result = build_app_config(lookup_from_map(&map));
        assert!(
            matches!(result, Err(ConfigError::MissingEnvVar(ref v)) if v == "NEWSDATA_API_KEY"),
            "expected MissingEnvVar(NEWSDATA_API_KEY), got: {result:?}"
        );
    }

    #[test]
    fn build_app_config_fails_with_invalid_bind_addr() {
        let mut map = full_env();
        map.insert("VEILLE_BIND_ADDR", "not-a-socket-addr");
        let result = build_app_config(lookup_from_map(&map));
        assert!(
            matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "VEILLE_BIND_ADDR"),
            "expected InvalidEnvVar(VEILLE_BIND_ADDR), got: {result:?}"
        );
    }

    #[test]
    fn build_app_config_fails_with_invalid_model_timeout() {
        let mut map = full_env();
        map.insert("VEILLE_MODEL_TIMEOUT_SECS", "soon");
        let result = build_app_config(lookup_from_map(&map));
        assert!(
            matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "VEILLE_MODEL_TIMEOUT_SECS"),
            "expected InvalidEnvVar(VEILLE_MODEL_TIMEOUT_SECS), got: {result:?}"
        );
    }

    #[test]
    fn build_app_config_rejects_blank_subject() {
        let mut map = full_env();
        map.insert("VEILLE_SUBJECT", " ");
        let result = build_app_config(lookup_from_map(&map));
        assert!(
            matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "VEILLE_SUBJECT"),
            "expected InvalidEnvVar(VEILLE_SUBJECT), got: {result:?}"
        );
    }

    #[test]
    fn build_app_config_succeeds_with_all_required_vars() {
        let map = full_env();
        let cfg = build_app_config(lookup_from_map(&map)).expect("config should build");
        assert_eq!(cfg.env, Environment::Development);
        assert_eq!(cfg.bind_addr.to_string(), "0.0.0.0:3000");
        assert_eq!(cfg.log_level, "info");
        assert_eq!(cfg.subject, "DS Automobiles");
        assert_eq!(cfg.newsdata_api_key, "newsdata-key");
        assert_eq!(cfg.mediastack_api_key, "mediastack-key");
        assert_eq!(cfg.newsdata_base_url, "https://newsdata.io");
        assert_eq!(cfg.source_timeout_secs, 30);
        assert_eq!(cfg.tei_url, "http://localhost:8080");
        assert_eq!(cfg.model_timeout_secs, 30);
        assert_eq!(cfg.user_agent, "veille/0.1 (news-watch)");
    }

    #[test]
    fn build_app_config_applies_overrides() {
        let mut map = full_env();
        map.insert("VEILLE_SUBJECT", "Citroën");
        map.insert("VEILLE_SOURCE_TIMEOUT_SECS", "5");
        map.insert("VEILLE_TEI_URL", "http://tei:80");
        let cfg = build_app_config(lookup_from_map(&map)).expect("config should build");
        assert_eq!(cfg.subject, "Citroën");
        assert_eq!(cfg.source_timeout_secs, 5);
        assert_eq!(cfg.tei_url, "http://tei:80");
    }

    #[test]
    fn debug_output_redacts_api_keys() {
        let map = full_env();
        let cfg = build_app_config(lookup_from_map(&map)).expect("config should build");
        let debug = format!("{cfg:?}");
        assert!(!debug.contains("newsdata-key"));
        assert!(!debug.contains("mediastack-key"));
        assert!(debug.contains("[redacted]"));
    }
}
