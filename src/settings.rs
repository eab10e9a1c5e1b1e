use serde::{Deserialize, Serialize};
use std::fs;
use url::Url;

use crate::error::LoginError;

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct LoginSettings {
    #[serde(default)]
    pub discovery: DiscoverySettings,
    #[serde(default)]
    pub oauth: OAuthSettings,
    #[serde(default)]
    pub sso: SsoSettings,
    #[serde(default)]
    pub logging: LoggingSettings,
}

/// Where institution search and mobile-verify requests go.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DiscoverySettings {
    pub base_url: Url,
    pub per_page: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OAuthSettings {
    /// Client id for the PKCE variant. The manual variant receives its
    /// client from mobile verify instead.
    pub client_id: Option<String>,
    pub verifier_length: usize,
    /// Hosts that force the Canvas-native authentication provider even
    /// when a different provider was requested.
    pub canvas_native_hosts: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SsoSettings {
    /// Hosts allowed to hand off an SSO code via deep link.
    pub allowed_hosts: Vec<String>,
    pub callback_path: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    pub level: String,
}

impl Default for DiscoverySettings {
    fn default() -> Self {
        Self {
            base_url: Url::parse("https://canvas.instructure.com")
                .expect("default discovery URL is valid"),
            per_page: 50,
        }
    }
}

impl Default for OAuthSettings {
    fn default() -> Self {
        Self {
            client_id: None,
            verifier_length: 43,
            canvas_native_hosts: vec!["intelvio.instructure.com".to_string()],
        }
    }
}

impl Default for SsoSettings {
    fn default() -> Self {
        Self {
            allowed_hosts: vec![
                "sso.canvaslms.com".to_string(),
                "sso.beta.canvaslms.com".to_string(),
                "sso.test.canvaslms.com".to_string(),
            ],
            callback_path: "/canvas/login".to_string(),
        }
    }
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

impl LoginSettings {
    /// Load settings from `Login.toml` (or the file named by
    /// `LOGIN_SETTINGS_FILE`) and apply environment variable overrides.
    ///
    /// # Errors
    ///
    /// Returns [`LoginError::Settings`] if the settings file cannot be
    /// read or fails to parse.
    pub fn load() -> Result<Self, LoginError> {
        let mut settings = Self::load_base_settings()?;
        Self::apply_env_overrides(&mut settings);
        Ok(settings)
    }

    /// Initialize logging from the configured level. `RUST_LOG` still
    /// wins when set, matching `env_logger` convention.
    pub fn init_logging(&self) {
        let mut builder = env_logger::Builder::new();
        builder.parse_filters(&self.logging.level);
        if let Ok(filters) = std::env::var("RUST_LOG") {
            builder.parse_filters(&filters);
        }
        // A second init in tests is fine; keep the first logger.
        let _ = builder.try_init();
    }

    fn load_base_settings() -> Result<Self, LoginError> {
        let path = std::env::var("LOGIN_SETTINGS_FILE")
            .unwrap_or_else(|_| "Login.toml".to_string());
        let path = std::path::Path::new(&path);
        if !path.exists() {
            return Ok(Self::default());
        }
        let toml_content = fs::read_to_string(path)
            .map_err(|err| LoginError::Settings(format!("{}: {err}", path.display())))?;
        basic_toml::from_str(&toml_content)
            .map_err(|err| LoginError::Settings(format!("{}: {err}", path.display())))
    }

    fn apply_env_overrides(settings: &mut Self) {
        if let Ok(client_id) = std::env::var("CANVAS_CLIENT_ID") {
            if !client_id.is_empty() {
                settings.oauth.client_id = Some(client_id);
            }
        }
        if let Ok(base_url) = std::env::var("CANVAS_DISCOVERY_URL") {
            if let Ok(url) = Url::parse(&base_url) {
                settings.discovery.base_url = url;
            }
        }
        if let Ok(level) = std::env::var("LOGIN_LOG_LEVEL") {
            settings.logging.level = level;
        }
    }

    /// The PKCE client id, which must be configured out of band.
    ///
    /// # Errors
    ///
    /// Returns [`LoginError::MissingClientId`] when neither the settings
    /// file nor `CANVAS_CLIENT_ID` provides one.
    pub fn require_client_id(&self) -> Result<&str, LoginError> {
        self.oauth
            .client_id
            .as_deref()
            .filter(|id| !id.is_empty())
            .ok_or(LoginError::MissingClientId)
    }
}
