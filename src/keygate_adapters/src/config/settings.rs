use http::HeaderValue;
use secrecy::Secret;
use serde::Deserialize;

use super::constants::prod;

/// Service configuration, loaded from an optional `keygate.json` file with
/// environment overrides (`KEYGATE__POSTGRES__URL` and friends).
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub app: AppSettings,
    pub postgres: PostgresSettings,
    pub email: EmailSettings,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppSettings {
    #[serde(default = "default_address")]
    pub address: String,
    /// CORS origins; `None` disables the CORS layer entirely.
    pub allowed_origins: Option<Vec<String>>,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            address: default_address(),
            allowed_origins: None,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct PostgresSettings {
    pub url: Secret<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct EmailSettings {
    #[serde(default = "default_email_base_url")]
    pub base_url: String,
    pub sender: String,
    pub auth_token: Secret<String>,
}

fn default_address() -> String {
    prod::APP_ADDRESS.to_string()
}

fn default_email_base_url() -> String {
    prod::email_client::BASE_URL.to_string()
}

impl Settings {
    pub fn load() -> Result<Self, config::ConfigError> {
        config::Config::builder()
            .add_source(config::File::with_name("keygate").required(false))
            .add_source(config::Environment::with_prefix("KEYGATE").separator("__"))
            .build()?
            .try_deserialize()
    }

    pub fn allowed_origins(&self) -> Option<AllowedOrigins> {
        self.app
            .allowed_origins
            .as_deref()
            .map(AllowedOrigins::parse)
    }
}

/// Origins permitted by the CORS layer.
#[derive(Debug, Clone, Default)]
pub struct AllowedOrigins(Vec<HeaderValue>);

impl AllowedOrigins {
    /// Parse a list of origin strings, skipping any that are not valid
    /// header values.
    pub fn parse(origins: &[String]) -> Self {
        Self(
            origins
                .iter()
                .filter_map(|o| HeaderValue::from_str(o.trim()).ok())
                .collect(),
        )
    }

    pub fn contains(&self, origin: &HeaderValue) -> bool {
        self.0.contains(origin)
    }
}
