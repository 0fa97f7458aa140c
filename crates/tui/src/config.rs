use oauth_callback_core::api::HttpExchangeApi;
use oauth_callback_core::callback::{MachineConfig, Messages, RetryPolicy};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

pub const BASE_URL_ENV: &str = "OAUTH_CALLBACK_BASE_URL";
pub const PROVIDER_ENV: &str = "OAUTH_CALLBACK_PROVIDER";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub retry: RetryConfig,
    pub messages: Messages,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub base_url: String,
    pub provider: String,
    pub connect_timeout_seconds: u64,
    pub timeout_seconds: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryConfig {
    pub max_retries: u32,
    pub base_delay_ms: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:3000".to_string(),
            provider: "github".to_string(),
            connect_timeout_seconds: 5,
            timeout_seconds: 20,
        }
    }
}

impl Default for RetryConfig {
    fn default() -> Self {
        let policy = RetryPolicy::default();
        Self {
            max_retries: policy.max_retries,
            base_delay_ms: policy.base_delay.as_millis() as u64,
        }
    }
}

impl Config {
    pub fn load(path: &Path) -> Result<Self, Box<dyn std::error::Error>> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    pub fn load_or_default(path: &Path) -> Self {
        match Self::load(path) {
            Ok(config) => config,
            Err(e) => {
                tracing::debug!("Using default config ({}): {}", path.display(), e);
                Self::default()
            }
        }
    }

    /// Environment variables win over the config file.
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(base_url) = std::env::var(BASE_URL_ENV) {
            self.server.base_url = base_url;
        }
        if let Ok(provider) = std::env::var(PROVIDER_ENV) {
            self.server.provider = provider;
        }
        self
    }

    pub fn machine_config(&self) -> MachineConfig {
        MachineConfig {
            policy: RetryPolicy {
                max_retries: self.retry.max_retries,
                base_delay: Duration::from_millis(self.retry.base_delay_ms),
            },
            messages: self.messages.clone(),
        }
    }

    pub fn exchange_api(&self) -> HttpExchangeApi {
        HttpExchangeApi::with_timeouts(
            self.server.base_url.clone(),
            self.server.provider.clone(),
            Duration::from_secs(self.server.connect_timeout_seconds),
            Duration::from_secs(self.server.timeout_seconds),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_file_keeps_defaults() {
        let config: Config = toml::from_str(
            r#"
            [server]
            provider = "oidc"

            [messages]
            login_success = "登录成功！"
            "#,
        )
        .expect("parse config");

        assert_eq!(config.server.provider, "oidc");
        assert_eq!(config.server.base_url, "http://localhost:3000");
        assert_eq!(config.retry.max_retries, 0);
        assert_eq!(config.messages.login_success, "登录成功！");
        assert_eq!(config.messages.bind_success, Messages::default().bind_success);
    }

    #[test]
    fn machine_config_uses_retry_section() {
        let config: Config = toml::from_str(
            r#"
            [retry]
            max_retries = 2
            base_delay_ms = 500
            "#,
        )
        .expect("parse config");

        let machine = config.machine_config();
        assert_eq!(machine.policy.max_retries, 2);
        assert_eq!(machine.policy.delay_for(2), Duration::from_millis(1000));
    }
}
