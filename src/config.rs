use std::{env, path::PathBuf};

use anyhow::Context;

const DEFAULT_MAX_UPLOAD_BYTES: usize = 20 * 1024 * 1024;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub host: String,
    pub port: u16,
    pub jwt_secret: String,
    pub jwt_ttl_hours: i64,
    pub media_root: PathBuf,
    pub media_url: String,
    pub cors_allowed_origins: Vec<String>,
    pub max_upload_bytes: usize,
    /// When set, property writes and uploads need an admin token.
    pub property_writes_require_admin: bool,
    /// Build media URLs from `X-Forwarded-*` headers. Only enable behind a proxy that sets them.
    pub trust_proxy_headers: bool,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the config from any key/value source; `from_env` passes the process environment.
    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let database_url = lookup("DATABASE_URL").context("DATABASE_URL must be set")?;
        let jwt_secret = lookup("JWT_SECRET").context("JWT_SECRET must be set")?;
        let host = lookup("APP_HOST").unwrap_or_else(|| "127.0.0.1".to_string());
        let port = lookup("APP_PORT")
            .and_then(|p| p.parse::<u16>().ok())
            .unwrap_or(3000);
        let jwt_ttl_hours = lookup("JWT_TTL_HOURS")
            .and_then(|h| h.parse::<i64>().ok())
            .filter(|h| *h > 0)
            .unwrap_or(24);
        let media_root = lookup("MEDIA_ROOT")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("media"));
        let media_url = normalize_media_url(
            &lookup("MEDIA_URL").unwrap_or_else(|| "/media/".to_string()),
        );
        let cors_allowed_origins = parse_csv(
            &lookup("CORS_ALLOWED_ORIGINS").unwrap_or_else(|| "http://localhost:5173".to_string()),
        );
        let max_upload_bytes = lookup("MAX_UPLOAD_BYTES")
            .and_then(|b| b.parse::<usize>().ok())
            .unwrap_or(DEFAULT_MAX_UPLOAD_BYTES);
        let property_writes_require_admin = lookup("PROPERTY_WRITES_REQUIRE_ADMIN")
            .map(|v| parse_bool(&v))
            .unwrap_or(false);
        let trust_proxy_headers = lookup("TRUST_PROXY_HEADERS")
            .map(|v| parse_bool(&v))
            .unwrap_or(false);

        Ok(Self {
            database_url,
            host,
            port,
            jwt_secret,
            jwt_ttl_hours,
            media_root,
            media_url,
            cors_allowed_origins,
            max_upload_bytes,
            property_writes_require_admin,
            trust_proxy_headers,
        })
    }
}

fn parse_csv(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

fn parse_bool(raw: &str) -> bool {
    matches!(
        raw.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}

// Always "/segment/": leading and trailing slash.
fn normalize_media_url(raw: &str) -> String {
    let trimmed = raw.trim().trim_matches('/');
    if trimmed.is_empty() {
        "/".to_string()
    } else {
        format!("/{trimmed}/")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn defaults_apply_when_only_required_keys_are_set() {
        let config = AppConfig::from_lookup(lookup_from(&[
            ("DATABASE_URL", "postgres://localhost/listings"),
            ("JWT_SECRET", "secret"),
        ]))
        .unwrap();

        assert_eq!(config.host, "127.0.0.1");
        assert_eq!(config.port, 3000);
        assert_eq!(config.jwt_ttl_hours, 24);
        assert_eq!(config.media_root, PathBuf::from("media"));
        assert_eq!(config.media_url, "/media/");
        assert_eq!(config.cors_allowed_origins, vec!["http://localhost:5173"]);
        assert_eq!(config.max_upload_bytes, DEFAULT_MAX_UPLOAD_BYTES);
        assert!(!config.property_writes_require_admin);
        assert!(!config.trust_proxy_headers);
    }

    #[test]
    fn missing_jwt_secret_is_an_error() {
        let err = AppConfig::from_lookup(lookup_from(&[(
            "DATABASE_URL",
            "postgres://localhost/listings",
        )]))
        .unwrap_err();
        assert!(err.to_string().contains("JWT_SECRET"));
    }

    #[test]
    fn overrides_are_parsed() {
        let config = AppConfig::from_lookup(lookup_from(&[
            ("DATABASE_URL", "postgres://localhost/listings"),
            ("JWT_SECRET", "secret"),
            ("APP_PORT", "8080"),
            ("MEDIA_URL", "uploads"),
            ("CORS_ALLOWED_ORIGINS", "http://a.test, http://b.test,,"),
            ("PROPERTY_WRITES_REQUIRE_ADMIN", "Yes"),
            ("JWT_TTL_HOURS", "-3"),
            ("TRUST_PROXY_HEADERS", "1"),
        ]))
        .unwrap();

        assert_eq!(config.port, 8080);
        assert_eq!(config.media_url, "/uploads/");
        assert_eq!(
            config.cors_allowed_origins,
            vec!["http://a.test", "http://b.test"]
        );
        assert!(config.property_writes_require_admin);
        assert!(config.trust_proxy_headers);
        assert_eq!(config.jwt_ttl_hours, 24);
    }
}
