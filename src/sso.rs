//! SSO deep-link (QR code) login
//!
//! A scanned QR code or deep link carries a domain and a one-time code.
//! Parsing is strict but silent: anything that fails validation yields
//! `None` rather than an error. A valid link bypasses the embedded
//! browser entirely: mobile verify, then a manual-variant token exchange
//! with the one-time code.

use log::debug;
use url::Url;

use crate::api::mobile_verify::verify_client;
use crate::error::LoginError;
use crate::models::Session;
use crate::oauth::{query_value, token, OAuthFlow};
use crate::session::build_session;
use crate::settings::SsoSettings;

/// The app variant performing the login; selects the code query parameter
/// the SSO handoff uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum App {
    Student,
    Teacher,
    Parent,
    Horizon,
}

impl App {
    #[must_use]
    pub fn sso_code_param(self) -> &'static str {
        match self {
            Self::Teacher => "code_ios_teacher",
            Self::Student | Self::Parent | Self::Horizon => "code",
        }
    }
}

/// A validated SSO handoff: institution domain plus one-time code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SsoLogin {
    pub domain: String,
    pub code: String,
}

impl SsoLogin {
    /// Parse an SSO deep link.
    ///
    /// Valid only when the host is on the fixed allow-list, the path is
    /// the SSO callback path, and both the domain and the app-variant
    /// code parameter are present and non-empty. Anything else is `None`.
    #[must_use]
    pub fn parse(url: &Url, app: App, settings: &SsoSettings) -> Option<Self> {
        let host = url.host_str()?;
        if !settings
            .allowed_hosts
            .iter()
            .any(|allowed| allowed.eq_ignore_ascii_case(host))
        {
            return None;
        }
        if url.path() != settings.callback_path {
            return None;
        }
        let domain = query_value(url, "domain").filter(|domain| !domain.is_empty())?;
        let code = query_value(url, app.sso_code_param()).filter(|code| !code.is_empty())?;
        Some(Self { domain, code })
    }

    /// Perform the browser-less login: verify the domain's mobile client
    /// and exchange the one-time code with the manual variant.
    ///
    /// # Errors
    ///
    /// Returns [`LoginError::Unauthorized`] when the domain has no mobile
    /// client, [`LoginError::InvalidDomain`] when the verify response is
    /// incomplete, and fetch failures from either network call.
    pub async fn fetch(
        &self,
        http: &reqwest::Client,
        discovery_base: &Url,
    ) -> Result<Session, LoginError> {
        debug!("SSO login for domain {}", self.domain);
        let credentials = verify_client(http, discovery_base, &self.domain).await?;
        if !credentials.authorized {
            return Err(LoginError::Unauthorized {
                domain: self.domain.clone(),
            });
        }
        let (Some(base_url), Some(client_id), Some(client_secret)) = (
            credentials.base_url,
            credentials.client_id,
            credentials.client_secret,
        ) else {
            return Err(LoginError::InvalidDomain);
        };

        let flow = OAuthFlow::Manual {
            base_url,
            client_id,
            client_secret,
        };
        let response = token::exchange_code(http, &flow, &self.code).await?;
        Ok(build_session(&response, &flow))
    }
}
