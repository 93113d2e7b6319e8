use config::{Config, ConfigError, Environment, File};
use secrecy::SecretString;
use serde::{Deserialize, Deserializer};

use crate::session::DEFAULT_LOGIN_PATH;

#[derive(Debug, Deserialize, Clone)]
pub struct Settings {
    #[serde(default = "default_api_url")]
    pub api_url: String,

    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,

    #[serde(default = "default_login_path")]
    pub login_path: String,

    #[serde(default)]
    pub email: Option<String>,

    /// Redacted in `Debug` output
    #[serde(default, deserialize_with = "secret")]
    pub password: Option<SecretString>,
}

fn secret<'de, D>(deserializer: D) -> Result<Option<SecretString>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.map(SecretString::from))
}

fn default_api_url() -> String {
    "http://localhost:8080/api".to_string()
}

fn default_request_timeout() -> u64 {
    10
}

fn default_login_path() -> String {
    DEFAULT_LOGIN_PATH.to_string()
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            api_url: default_api_url(),
            request_timeout_secs: default_request_timeout(),
            login_path: default_login_path(),
            email: None,
            password: None,
        }
    }
}

impl Settings {
    /// Load from `TALLY_CONFIG` (or `config.toml`), then `TALLY__*` variables
    pub fn new() -> Result<Self, ConfigError> {
        let config_path =
            std::env::var("TALLY_CONFIG").unwrap_or_else(|_| "config.toml".to_string());
        Self::from_path(&config_path)
    }

    pub fn from_path(config_path: &str) -> Result<Self, ConfigError> {
        let settings = Config::builder()
            .add_source(File::with_name(config_path).required(false))
            .add_source(Environment::with_prefix("TALLY").separator("__"))
            .build()?;

        settings.try_deserialize()
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.api_url.is_empty() {
            return Err("api_url is required".to_string());
        }
        if !self.api_url.starts_with("http") {
            return Err("api_url must be a valid HTTP(S) URL".to_string());
        }
        if self.request_timeout_secs == 0 {
            return Err("request_timeout_secs must be greater than zero".to_string());
        }
        if !self.login_path.starts_with('/') {
            return Err("login_path must start with '/'".to_string());
        }
        Ok(())
    }
}
