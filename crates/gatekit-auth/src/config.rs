//! Session authentication configuration.
//!
//! Configuration for token lifetimes, the signing secret, the session-exempt
//! path prefix, and the refresh-token cookie. The signing secret is the one
//! piece of required configuration: an empty secret fails [`AuthConfig::validate`]
//! and must abort startup, it is never a per-request error.

use serde::{Deserialize, Serialize};
use std::time::Duration;

use cookie::{Cookie, SameSite};

/// Root session authentication configuration.
///
/// # Example (TOML)
///
/// ```toml
/// [auth]
/// secret = "change-me"
/// access_token_lifetime = "1day"
/// refresh_token_lifetime = "15days"
///
/// [auth.cookie]
/// domain = "api.example.com"
/// secure = true
/// ```
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct AuthConfig {
    /// Process-wide signing secret for both token kinds.
    /// Required; an empty secret fails validation at startup.
    pub secret: String,

    /// Access token lifetime. Access tokens are self-contained and checked
    /// without a store lookup, so keep this short.
    #[serde(with = "humantime_serde")]
    pub access_token_lifetime: Duration,

    /// Refresh token lifetime. Also bounds the revocation registry TTL.
    #[serde(with = "humantime_serde")]
    pub refresh_token_lifetime: Duration,

    /// Path prefix that bypasses the session decision engine entirely
    /// (sign-in/sign-up endpoints live under it).
    pub exempt_prefix: String,

    /// Refresh-token cookie settings.
    pub cookie: CookieConfig,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            secret: String::new(),
            access_token_lifetime: Duration::from_secs(24 * 3600), // 1 day
            refresh_token_lifetime: Duration::from_secs(15 * 24 * 3600), // 15 days
            exempt_prefix: "/auth".to_string(),
            cookie: CookieConfig::default(),
        }
    }
}

impl AuthConfig {
    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Missing` if the signing secret is empty and
    /// `ConfigError::InvalidValue` for zero lifetimes or an unknown
    /// `same_site` value.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.secret.is_empty() {
            return Err(ConfigError::Missing("auth.secret".to_string()));
        }

        if self.access_token_lifetime.is_zero() {
            return Err(ConfigError::InvalidValue(
                "access_token_lifetime must be > 0".to_string(),
            ));
        }

        if self.refresh_token_lifetime.is_zero() {
            return Err(ConfigError::InvalidValue(
                "refresh_token_lifetime must be > 0".to_string(),
            ));
        }

        if self.cookie.parse_same_site().is_none() {
            return Err(ConfigError::InvalidValue(format!(
                "Invalid same_site value: '{}'. Must be strict, lax, or none",
                self.cookie.same_site
            )));
        }

        Ok(())
    }
}

/// Refresh-token cookie configuration.
///
/// The cookie is always HttpOnly; `secure` should be enabled in any
/// production-like environment.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct CookieConfig {
    /// Cookie name presented to the browser.
    pub name: String,

    /// Set the `Secure` attribute (HTTPS only).
    pub secure: bool,

    /// Set the `HttpOnly` attribute. Defaults to `true`; scripts never need
    /// to read the refresh token.
    pub http_only: bool,

    /// `SameSite` attribute: "strict", "lax", or "none".
    pub same_site: String,

    /// Cookie path.
    pub path: String,

    /// Cookie domain, typically the configured backend domain.
    pub domain: Option<String>,
}

impl Default for CookieConfig {
    fn default() -> Self {
        Self {
            name: "refresh_token".to_string(),
            secure: false,
            http_only: true,
            same_site: "strict".to_string(),
            path: "/".to_string(),
            domain: None,
        }
    }
}

impl CookieConfig {
    /// Builds the refresh-token cookie with the given value and max age.
    #[must_use]
    pub fn build(&self, value: &str, max_age: Duration) -> Cookie<'static> {
        let mut builder = Cookie::build((self.name.clone(), value.to_owned()))
            .path(self.path.clone())
            .http_only(self.http_only)
            .secure(self.secure)
            .max_age(time::Duration::seconds(max_age.as_secs() as i64));

        if let Some(same_site) = self.parse_same_site() {
            builder = builder.same_site(same_site);
        }

        if let Some(domain) = &self.domain {
            builder = builder.domain(domain.clone());
        }

        builder.build()
    }

    /// Builds an expired cookie that instructs the browser to drop the
    /// refresh token (used on sign-out).
    #[must_use]
    pub fn removal(&self) -> Cookie<'static> {
        self.build("", Duration::ZERO)
    }

    fn parse_same_site(&self) -> Option<SameSite> {
        match self.same_site.to_ascii_lowercase().as_str() {
            "strict" => Some(SameSite::Strict),
            "lax" => Some(SameSite::Lax),
            "none" => Some(SameSite::None),
            _ => None,
        }
    }
}

/// Configuration validation errors.
#[derive(Debug, Clone, thiserror::Error)]
pub enum ConfigError {
    /// An invalid configuration value was provided.
    #[error("Invalid configuration value: {0}")]
    InvalidValue(String),

    /// A required configuration value is missing.
    #[error("Missing required configuration: {0}")]
    Missing(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config_with_secret() -> AuthConfig {
        AuthConfig {
            secret: "test-secret".to_string(),
            ..AuthConfig::default()
        }
    }

    #[test]
    fn test_default_lifetimes() {
        let config = AuthConfig::default();
        assert_eq!(config.access_token_lifetime, Duration::from_secs(86_400));
        assert_eq!(
            config.refresh_token_lifetime,
            Duration::from_secs(15 * 86_400)
        );
        assert_eq!(config.exempt_prefix, "/auth");
    }

    #[test]
    fn test_missing_secret_fails_validation() {
        let config = AuthConfig::default();
        let err = config.validate().unwrap_err();
        assert!(matches!(err, ConfigError::Missing(_)));
        assert!(err.to_string().contains("auth.secret"));
    }

    #[test]
    fn test_config_with_secret_validates() {
        assert!(config_with_secret().validate().is_ok());
    }

    #[test]
    fn test_zero_lifetime_fails_validation() {
        let mut config = config_with_secret();
        config.access_token_lifetime = Duration::ZERO;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("access_token_lifetime"));
    }

    #[test]
    fn test_invalid_same_site_fails_validation() {
        let mut config = config_with_secret();
        config.cookie.same_site = "sideways".to_string();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("same_site"));
    }

    #[test]
    fn test_build_cookie() {
        let config = CookieConfig {
            secure: true,
            domain: Some("api.example.com".to_string()),
            ..CookieConfig::default()
        };

        let cookie = config.build("token-value", Duration::from_secs(3600));
        let rendered = cookie.to_string();
        assert!(rendered.contains("refresh_token=token-value"));
        assert!(rendered.contains("HttpOnly"));
        assert!(rendered.contains("Secure"));
        assert!(rendered.contains("SameSite=Strict"));
        assert!(rendered.contains("Domain=api.example.com"));
        assert!(rendered.contains("Max-Age=3600"));
    }

    #[test]
    fn test_removal_cookie_expires_immediately() {
        let cookie = CookieConfig::default().removal();
        let rendered = cookie.to_string();
        assert!(rendered.contains("refresh_token="));
        assert!(rendered.contains("Max-Age=0"));
    }

    #[test]
    fn test_serde_roundtrip() {
        let config = config_with_secret();
        let json = serde_json::to_string(&config).unwrap();
        let parsed: AuthConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(config.secret, parsed.secret);
        assert_eq!(config.access_token_lifetime, parsed.access_token_lifetime);
        assert_eq!(config.cookie.name, parsed.cookie.name);
    }
}
