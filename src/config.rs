//! Configuration module
//!
//! Reads configuration from a TOML file
//! (`~/.config/hipp-identity/config.toml` by default) with environment
//! overrides for secrets. Loaded once at process start; required
//! security parameters are checked by [`AppConfig::validate`] so a
//! misconfigured process refuses to start instead of failing per
//! request.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::domain::{DomainError, DomainResult};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub database: DatabaseSettings,
    pub security: SecuritySettings,
    pub logging: LoggingSettings,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseSettings {
    /// Database URL (e.g., "sqlite://./hipp.db?mode=rwc")
    pub url: String,
}

impl Default for DatabaseSettings {
    fn default() -> Self {
        Self {
            url: "sqlite://./hipp.db?mode=rwc".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SecuritySettings {
    /// Signing secret for bearer tokens. No baked-in default: an empty
    /// value fails validation at startup.
    pub jwt_secret: String,
    pub jwt_issuer: String,
    pub jwt_audience: String,
    pub jwt_expiration_minutes: i64,
    /// How long a password-reset token stays redeemable.
    pub reset_token_ttl_hours: i64,
    /// How long an email-change verification token stays redeemable.
    pub email_token_ttl_hours: i64,
}

impl Default for SecuritySettings {
    fn default() -> Self {
        Self {
            jwt_secret: String::new(),
            jwt_issuer: "hipp-identity".to_string(),
            jwt_audience: "hipp-clients".to_string(),
            jwt_expiration_minutes: 60,
            reset_token_ttl_hours: 24,
            email_token_ttl_hours: 48,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    /// tracing env-filter directive, e.g. "info" or "hipp_identity=debug"
    pub level: String,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

impl AppConfig {
    /// Load from a TOML file and apply environment overrides.
    pub fn load(path: &Path) -> DomainResult<Self> {
        let raw = std::fs::read_to_string(path).map_err(|e| {
            DomainError::Configuration(format!("Failed to read {}: {e}", path.display()))
        })?;
        let mut cfg: AppConfig = toml::from_str(&raw).map_err(|e| {
            DomainError::Configuration(format!("Failed to parse {}: {e}", path.display()))
        })?;
        cfg.apply_env_overrides();
        Ok(cfg)
    }

    /// Defaults plus environment overrides, for setups without a config
    /// file.
    pub fn from_env() -> Self {
        let mut cfg = Self::default();
        cfg.apply_env_overrides();
        cfg
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(secret) = std::env::var("JWT_SECRET") {
            self.security.jwt_secret = secret;
        }
        if let Ok(url) = std::env::var("DATABASE_URL") {
            self.database.url = url;
        }
    }

    /// Fail-fast startup check; an absent security parameter is a
    /// `Configuration` error here, never a per-request failure.
    pub fn validate(&self) -> DomainResult<()> {
        if self.security.jwt_secret.is_empty() {
            return Err(DomainError::Configuration(
                "JWT secret is not configured".to_string(),
            ));
        }
        if self.security.jwt_issuer.is_empty() {
            return Err(DomainError::Configuration(
                "JWT issuer is not configured".to_string(),
            ));
        }
        if self.security.jwt_audience.is_empty() {
            return Err(DomainError::Configuration(
                "JWT audience is not configured".to_string(),
            ));
        }
        if self.security.jwt_expiration_minutes <= 0 {
            return Err(DomainError::Configuration(
                "JWT expiration must be positive".to_string(),
            ));
        }
        if self.database.url.is_empty() {
            return Err(DomainError::Configuration(
                "Database URL is not configured".to_string(),
            ));
        }
        Ok(())
    }
}

/// Default config file location under the platform config directory.
pub fn default_config_path() -> PathBuf {
    dirs_next::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("hipp-identity")
        .join("config.toml")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_fail_validation_without_secret() {
        let cfg = AppConfig::default();
        let err = cfg.validate().unwrap_err();
        assert!(matches!(err, DomainError::Configuration(_)));
    }

    #[test]
    fn parsed_config_with_secret_validates() {
        let cfg: AppConfig = toml::from_str(
            r#"
            [security]
            jwt_secret = "a-real-secret"
            jwt_expiration_minutes = 30

            [logging]
            level = "debug"
            "#,
        )
        .unwrap();

        cfg.validate().unwrap();
        assert_eq!(cfg.security.jwt_expiration_minutes, 30);
        assert_eq!(cfg.security.jwt_issuer, "hipp-identity");
        assert_eq!(cfg.logging.level, "debug");
        assert!(cfg.database.url.starts_with("sqlite://"));
    }

    #[test]
    fn zero_ttl_is_rejected() {
        let mut cfg = AppConfig::default();
        cfg.security.jwt_secret = "secret".into();
        cfg.security.jwt_expiration_minutes = 0;
        assert!(cfg.validate().is_err());
    }
}
