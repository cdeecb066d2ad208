//! API configuration
//!
//! Read from `API_*` environment variables (e.g. `API_PORT`,
//! `API_BILLING_POLICY`); anything unset keeps its default.

use serde::Deserialize;
use validator::Validate;

use domain_billing::{BillingPolicy, PaymentMethod};

/// Log output format
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// API configuration
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(default)]
pub struct ApiConfig {
    /// Server host
    pub host: String,
    /// Server port
    #[validate(range(min = 1))]
    pub port: u16,
    /// JWT secret for authentication
    #[validate(length(min = 16, message = "jwt_secret must be at least 16 characters"))]
    pub jwt_secret: String,
    /// JWT expiration in seconds
    pub jwt_expiration_secs: u64,
    /// Log level or `EnvFilter` directive
    pub log_level: String,
    /// Log output format
    pub log_format: LogFormat,
    /// How much each billing run charges per contract
    pub billing_policy: BillingPolicy,
    /// Payment method recorded when capture is initiated
    pub payment_method: PaymentMethod,
    /// Capacity of the billing event channel
    #[validate(range(min = 1, max = 65536))]
    pub event_channel_capacity: usize,
    /// Calendar window length when the query gives no `window_end`
    #[validate(range(min = 1, max = 366))]
    pub calendar_window_days: u64,
    /// Base URL for sandbox approval links
    pub gateway_approval_base_url: String,
    /// Shared secret expected in the `X-Webhook-Secret` header
    #[validate(length(min = 8, message = "webhook_secret must be at least 8 characters"))]
    pub webhook_secret: String,
    /// JSON file of contract records to seed the contract store with
    pub contracts_file: Option<String>,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            jwt_secret: "change-me-in-production".to_string(),
            jwt_expiration_secs: 3600,
            log_level: "info".to_string(),
            log_format: LogFormat::Pretty,
            billing_policy: BillingPolicy::FlatDailyIncrement,
            payment_method: PaymentMethod::Wallet,
            event_channel_capacity: 256,
            calendar_window_days: 30,
            gateway_approval_base_url: "https://sandbox.payments.local".to_string(),
            webhook_secret: "change-me-webhook".to_string(),
            contracts_file: None,
        }
    }
}

impl ApiConfig {
    /// Loads configuration from `API_*` environment variables
    ///
    /// Fails on any unparsable or invalid value; nothing falls back to a
    /// default once it has been set.
    pub fn from_env() -> Result<Self, config::ConfigError> {
        Self::from_environment(config::Environment::with_prefix("API"))
    }

    /// Loads configuration from an environment source
    pub fn from_environment(env: config::Environment) -> Result<Self, config::ConfigError> {
        let config: Self = config::Config::builder()
            .add_source(env.try_parsing(true))
            .build()?
            .try_deserialize()?;

        config
            .validate()
            .map_err(|e| config::ConfigError::Message(e.to_string()))?;
        Ok(config)
    }

    /// Returns the server address
    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = ApiConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.server_addr(), "0.0.0.0:8080");
        assert_eq!(config.billing_policy, BillingPolicy::FlatDailyIncrement);
    }

    #[test]
    fn test_short_secret_rejected() {
        let config = ApiConfig {
            jwt_secret: "short".to_string(),
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    fn env(vars: &[(&str, &str)]) -> config::Environment {
        let mut map = config::Map::new();
        for (key, value) in vars {
            map.insert(key.to_string(), value.to_string());
        }
        config::Environment::with_prefix("API").source(Some(map))
    }

    #[test]
    fn test_environment_overrides_defaults() {
        let config = ApiConfig::from_environment(env(&[
            ("API_PORT", "9090"),
            ("API_JWT_SECRET", "a-long-enough-operator-secret"),
            ("API_BILLING_POLICY", "delta_since_last_billed"),
            ("API_CONTRACTS_FILE", "/srv/contracts.json"),
        ]))
        .unwrap();

        assert_eq!(config.port, 9090);
        assert_eq!(config.jwt_secret, "a-long-enough-operator-secret");
        assert_eq!(config.billing_policy, BillingPolicy::DeltaSinceLastBilled);
        assert_eq!(config.contracts_file.as_deref(), Some("/srv/contracts.json"));
    }

    #[test]
    fn test_invalid_secret_fails_loading() {
        let result = ApiConfig::from_environment(env(&[
            ("API_JWT_SECRET", "short"),
            ("API_BILLING_POLICY", "delta_since_last_billed"),
        ]));
        assert!(result.is_err());
    }

    #[test]
    fn test_unparsable_port_fails_loading() {
        let result = ApiConfig::from_environment(env(&[("API_PORT", "80a80")]));
        assert!(result.is_err());
    }
}
