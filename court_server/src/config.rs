//! Server configuration management.
//!
//! Consolidates all environment variable reads and provides validated configuration.

use court_booking::wallet::TopUpLimits;
use std::net::SocketAddr;

/// Default HTTP bind address
pub const DEFAULT_BIND: SocketAddr = SocketAddr::new(
    std::net::IpAddr::V4(std::net::Ipv4Addr::new(127, 0, 0, 1)),
    8080,
);

/// Complete server configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Server bind address
    pub bind: SocketAddr,
    /// Prometheus exporter address; metrics are disabled when absent
    pub metrics_bind: Option<SocketAddr>,
    /// Security configuration
    pub security: SecurityConfig,
    /// Administrator created at startup
    pub bootstrap_admin: Option<AdminBootstrap>,
    /// Wallet top-up limits
    pub top_up: TopUpLimits,
}

/// Security-related configuration
#[derive(Debug, Clone)]
pub struct SecurityConfig {
    /// JWT signing secret (required)
    pub jwt_secret: String,
    /// Password hashing pepper (required)
    pub password_pepper: String,
    /// Access token lifetime in minutes
    pub access_token_minutes: i64,
}

/// Bootstrap administrator credentials
#[derive(Clone)]
pub struct AdminBootstrap {
    pub username: String,
    pub password: String,
}

impl std::fmt::Debug for AdminBootstrap {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AdminBootstrap")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

impl ServerConfig {
    /// Load configuration from environment variables
    ///
    /// # Arguments
    ///
    /// * `bind_override` - Optional bind address override (from CLI args)
    /// * `metrics_bind_override` - Optional metrics address override (from CLI args)
    ///
    /// # Errors
    ///
    /// Returns error if required variables are missing or invalid
    pub fn from_env(
        bind_override: Option<SocketAddr>,
        metrics_bind_override: Option<SocketAddr>,
    ) -> Result<Self, ConfigError> {
        let bind = match bind_override {
            Some(addr) => addr,
            None => parse_env_addr("SERVER_BIND")?.unwrap_or(DEFAULT_BIND),
        };

        let metrics_bind = match metrics_bind_override {
            Some(addr) => Some(addr),
            None => parse_env_addr("METRICS_BIND")?,
        };

        // Security configuration (REQUIRED)
        let jwt_secret = std::env::var("JWT_SECRET").map_err(|_| ConfigError::MissingRequired {
            var: "JWT_SECRET".to_string(),
            hint: "Generate with: openssl rand -hex 32".to_string(),
        })?;

        let password_pepper =
            std::env::var("PASSWORD_PEPPER").map_err(|_| ConfigError::MissingRequired {
                var: "PASSWORD_PEPPER".to_string(),
                hint: "Generate with: openssl rand -hex 16".to_string(),
            })?;

        if jwt_secret.len() < 32 {
            return Err(ConfigError::Invalid {
                var: "JWT_SECRET".to_string(),
                reason: "Must be at least 32 characters (128-bit security)".to_string(),
            });
        }

        if password_pepper.len() < 16 {
            return Err(ConfigError::Invalid {
                var: "PASSWORD_PEPPER".to_string(),
                reason: "Must be at least 16 characters (64-bit security)".to_string(),
            });
        }

        let security = SecurityConfig {
            jwt_secret,
            password_pepper,
            access_token_minutes: parse_env_or("ACCESS_TOKEN_MINUTES", 15),
        };

        let bootstrap_admin = match (
            std::env::var("ADMIN_USERNAME").ok(),
            std::env::var("ADMIN_PASSWORD").ok(),
        ) {
            (Some(username), Some(password)) => Some(AdminBootstrap { username, password }),
            (None, None) => None,
            (Some(_), None) => {
                return Err(ConfigError::MissingRequired {
                    var: "ADMIN_PASSWORD".to_string(),
                    hint: "Set it together with ADMIN_USERNAME".to_string(),
                });
            }
            (None, Some(_)) => {
                return Err(ConfigError::MissingRequired {
                    var: "ADMIN_USERNAME".to_string(),
                    hint: "Set it together with ADMIN_PASSWORD".to_string(),
                });
            }
        };

        Ok(ServerConfig {
            bind,
            metrics_bind,
            security,
            bootstrap_admin,
            top_up: TopUpLimits::from_env(),
        })
    }

    /// Validate configuration after loading
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.security.access_token_minutes <= 0 {
            return Err(ConfigError::Invalid {
                var: "ACCESS_TOKEN_MINUTES".to_string(),
                reason: "Must be greater than 0".to_string(),
            });
        }

        if !self.top_up.is_consistent() {
            return Err(ConfigError::Invalid {
                var: "TOPUP_MIN_CENTS".to_string(),
                reason: format!(
                    "Need 0 < min ({}) <= max ({}) <= daily limit ({})",
                    self.top_up.min_cents, self.top_up.max_cents, self.top_up.daily_limit_cents
                ),
            });
        }

        if let Some(admin) = &self.bootstrap_admin
            && admin.password.len() < 8
        {
            return Err(ConfigError::Invalid {
                var: "ADMIN_PASSWORD".to_string(),
                reason: "Must be at least 8 characters".to_string(),
            });
        }

        if self.metrics_bind == Some(self.bind) {
            return Err(ConfigError::Invalid {
                var: "METRICS_BIND".to_string(),
                reason: format!("Must differ from the server bind address ({})", self.bind),
            });
        }

        Ok(())
    }
}

/// Configuration error types
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {var}\nHint: {hint}")]
    MissingRequired { var: String, hint: String },

    #[error("Invalid configuration for {var}: {reason}")]
    Invalid { var: String, reason: String },
}

/// Helper to parse environment variable with default fallback
fn parse_env_or<T>(key: &str, default: T) -> T
where
    T: std::str::FromStr,
{
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

/// Optional socket address; a set but malformed value is an error
fn parse_env_addr(key: &str) -> Result<Option<SocketAddr>, ConfigError> {
    match std::env::var(key) {
        Ok(value) => value.parse().map(Some).map_err(|_| ConfigError::Invalid {
            var: key.to_string(),
            reason: format!("Not a socket address: {value}"),
        }),
        Err(_) => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    const VARS: [&str; 10] = [
        "SERVER_BIND",
        "METRICS_BIND",
        "JWT_SECRET",
        "PASSWORD_PEPPER",
        "ACCESS_TOKEN_MINUTES",
        "ADMIN_USERNAME",
        "ADMIN_PASSWORD",
        "TOPUP_MIN_CENTS",
        "TOPUP_MAX_CENTS",
        "TOPUP_DAILY_LIMIT_CENTS",
    ];

    /// Helper to start every test from a clean environment with valid secrets
    fn reset_env() {
        // SAFETY: tests touching the environment are serialized
        unsafe {
            for var in VARS {
                std::env::remove_var(var);
            }
            std::env::set_var("JWT_SECRET", "j".repeat(32));
            std::env::set_var("PASSWORD_PEPPER", "p".repeat(16));
        }
    }

    fn valid_config() -> ServerConfig {
        ServerConfig {
            bind: DEFAULT_BIND,
            metrics_bind: None,
            security: SecurityConfig {
                jwt_secret: "a".repeat(32),
                password_pepper: "a".repeat(16),
                access_token_minutes: 15,
            },
            bootstrap_admin: None,
            top_up: TopUpLimits::default(),
        }
    }

    #[test]
    fn test_config_error_display() {
        let err = ConfigError::MissingRequired {
            var: "JWT_SECRET".to_string(),
            hint: "Use openssl".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("JWT_SECRET"));
        assert!(msg.contains("Use openssl"));
    }

    #[test]
    #[serial]
    fn test_defaults_with_required_secrets() {
        reset_env();
        let config = ServerConfig::from_env(None, None).unwrap();
        assert_eq!(config.bind, DEFAULT_BIND);
        assert_eq!(config.metrics_bind, None);
        assert_eq!(config.security.access_token_minutes, 15);
        assert!(config.bootstrap_admin.is_none());
        assert_eq!(config.top_up, TopUpLimits::default());
        config.validate().unwrap();
    }

    #[test]
    #[serial]
    fn test_missing_jwt_secret() {
        reset_env();
        unsafe { std::env::remove_var("JWT_SECRET") };
        let err = ServerConfig::from_env(None, None).unwrap_err();
        assert!(matches!(err, ConfigError::MissingRequired { ref var, .. } if var == "JWT_SECRET"));
    }

    #[test]
    #[serial]
    fn test_short_pepper_rejected() {
        reset_env();
        unsafe { std::env::set_var("PASSWORD_PEPPER", "short") };
        let err = ServerConfig::from_env(None, None).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { ref var, .. } if var == "PASSWORD_PEPPER"));
    }

    #[test]
    #[serial]
    fn test_cli_override_beats_env() {
        reset_env();
        unsafe { std::env::set_var("SERVER_BIND", "0.0.0.0:9000") };
        let cli: SocketAddr = "127.0.0.1:7000".parse().unwrap();
        assert_eq!(ServerConfig::from_env(Some(cli), None).unwrap().bind, cli);
        assert_eq!(
            ServerConfig::from_env(None, None).unwrap().bind,
            "0.0.0.0:9000".parse::<SocketAddr>().unwrap()
        );
    }

    #[test]
    #[serial]
    fn test_malformed_bind_rejected() {
        reset_env();
        unsafe { std::env::set_var("METRICS_BIND", "not-an-address") };
        assert!(matches!(
            ServerConfig::from_env(None, None),
            Err(ConfigError::Invalid { .. })
        ));
    }

    #[test]
    #[serial]
    fn test_admin_requires_both_halves() {
        reset_env();
        unsafe { std::env::set_var("ADMIN_USERNAME", "root_admin") };
        assert!(matches!(
            ServerConfig::from_env(None, None),
            Err(ConfigError::MissingRequired { ref var, .. }) if var == "ADMIN_PASSWORD"
        ));

        unsafe { std::env::set_var("ADMIN_PASSWORD", "admin_password") };
        let admin = ServerConfig::from_env(None, None)
            .unwrap()
            .bootstrap_admin
            .unwrap();
        assert_eq!(admin.username, "root_admin");
        assert!(!format!("{admin:?}").contains("admin_password"));
    }

    #[test]
    fn test_validation_rejects_inverted_top_up_limits() {
        let mut config = valid_config();
        config.top_up.min_cents = config.top_up.max_cents + 1;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::Invalid { .. })
        ));
    }

    #[test]
    fn test_validation_rejects_zero_token_lifetime() {
        let mut config = valid_config();
        config.security.access_token_minutes = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validation_rejects_shared_metrics_port() {
        let mut config = valid_config();
        config.metrics_bind = Some(config.bind);
        assert!(config.validate().is_err());
    }
}
