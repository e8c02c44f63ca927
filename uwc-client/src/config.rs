use serde::Deserialize;

/// Endpoints the client talks to. Loaded from `UWC_CLIENT__*` variables.
#[derive(Debug, Clone, Deserialize)]
pub struct ClientConfig {
    /// Base URL of the uwc-api service.
    #[serde(default = "default_api_url")]
    pub api_url: String,

    /// Base URL of the GoTrue-compatible identity service.
    #[serde(default = "default_auth_url")]
    pub auth_url: String,

    /// Public key sent as `apikey` on identity requests.
    #[serde(default)]
    pub anon_key: String,

    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_api_url() -> String {
    "http://localhost:8080".into()
}

fn default_auth_url() -> String {
    "http://localhost:9999".into()
}

fn default_timeout_secs() -> u64 {
    30
}

impl ClientConfig {
    pub fn load() -> Result<Self, config::ConfigError> {
        let config = config::Config::builder()
            .add_source(config::Environment::with_prefix("UWC_CLIENT").separator("__"))
            .build()?;
        config.try_deserialize()
    }

    pub fn new(api_url: impl Into<String>, auth_url: impl Into<String>) -> Self {
        Self {
            api_url: api_url.into(),
            auth_url: auth_url.into(),
            anon_key: String::new(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self::new(default_api_url(), default_auth_url())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_source_uses_local_defaults() {
        let config: ClientConfig = config::Config::builder()
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap();
        assert_eq!(config.api_url, "http://localhost:8080");
        assert_eq!(config.timeout_secs, 30);
        assert!(config.anon_key.is_empty());
    }

    #[test]
    fn overrides_are_read() {
        let config: ClientConfig = config::Config::builder()
            .set_override("api_url", "https://api.example.com")
            .unwrap()
            .set_override("anon_key", "anon")
            .unwrap()
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap();
        assert_eq!(config.api_url, "https://api.example.com");
        assert_eq!(config.anon_key, "anon");
    }
}
