use anyhow::{ensure, Context, Result};

/// One year; keeps expiry arithmetic far from `chrono` overflow.
const MAX_SESSION_TTL_MINUTES: i64 = 60 * 24 * 365;

/// Application configuration loaded from environment variables.
///
/// The LLM credential is optional here: a missing key surfaces as a request-time
/// error from each AI call, not as a startup failure.
#[derive(Debug, Clone)]
pub struct Config {
    pub gemini_api_key: Option<String>,
    pub port: u16,
    pub rust_log: String,
    /// Idle time after which a workflow session is discarded.
    pub session_ttl_minutes: i64,
    /// Toggles local keyword extraction for the matching prompt.
    pub keyword_enrichment: bool,
    pub max_upload_bytes: usize,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        let session_ttl_minutes: i64 = parse_env("SESSION_TTL_MINUTES", 120)?;
        ensure!(
            (1..=MAX_SESSION_TTL_MINUTES).contains(&session_ttl_minutes),
            "SESSION_TTL_MINUTES must be between 1 and {MAX_SESSION_TTL_MINUTES}, got {session_ttl_minutes}"
        );

        Ok(Config {
            gemini_api_key: optional_env("GEMINI_API_KEY"),
            port: parse_env("PORT", 8000)?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
            session_ttl_minutes,
            keyword_enrichment: parse_env("KEYWORD_ENRICHMENT", true)?,
            max_upload_bytes: parse_env("MAX_UPLOAD_BYTES", 20 * 1024 * 1024)?,
        })
    }
}

fn optional_env(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn parse_env<T>(key: &str, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match optional_env(key) {
        Some(raw) => raw
            .parse::<T>()
            .with_context(|| format!("Environment variable '{key}' has an invalid value: {raw}")),
        None => Ok(default),
    }
}

#[cfg(test)]
impl Config {
    /// Configuration used by handler tests; never touches the process environment.
    pub fn for_tests() -> Self {
        Config {
            gemini_api_key: Some("test-key".to_string()),
            port: 0,
            rust_log: "debug".to_string(),
            session_ttl_minutes: 30,
            keyword_enrichment: true,
            max_upload_bytes: 1024 * 1024,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_env_uses_default_when_unset() {
        let port: u16 = parse_env("RECRUITER_TEST_UNSET_PORT", 8000).unwrap();
        assert_eq!(port, 8000);
    }

    #[test]
    fn test_parse_env_rejects_invalid_value() {
        std::env::set_var("RECRUITER_TEST_BAD_BOOL", "maybe");
        let result: Result<bool> = parse_env("RECRUITER_TEST_BAD_BOOL", true);
        assert!(result.is_err());
        std::env::remove_var("RECRUITER_TEST_BAD_BOOL");
    }

    #[test]
    fn test_optional_env_treats_blank_as_missing() {
        std::env::set_var("RECRUITER_TEST_BLANK_KEY", "   ");
        assert!(optional_env("RECRUITER_TEST_BLANK_KEY").is_none());
        std::env::remove_var("RECRUITER_TEST_BLANK_KEY");
    }
}
