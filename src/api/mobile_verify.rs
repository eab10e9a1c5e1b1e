//! Mobile client verification
//!
//! Exchanges a school domain for the OAuth client configured for it. An
//! unauthorized response means the domain exists but has no mobile client;
//! the manual-client variant must not proceed, though callers may still
//! attempt PKCE against the raw domain.

use serde::Deserialize;
use url::Url;

use crate::api::fetch_json;
use crate::error::LoginError;

/// Response of the mobile-verify endpoint.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct ClientCredentials {
    pub authorized: bool,
    #[serde(default)]
    pub base_url: Option<Url>,
    #[serde(default)]
    pub client_id: Option<String>,
    #[serde(default)]
    pub client_secret: Option<String>,
}

impl ClientCredentials {
    /// The manual flow needs all three of base URL, client id and secret.
    #[must_use]
    pub fn supports_manual_flow(&self) -> bool {
        self.authorized
            && self.base_url.is_some()
            && self.client_id.is_some()
            && self.client_secret.is_some()
    }
}

/// Strip a leading `http://`/`https://` scheme from user-entered domains.
#[must_use]
pub fn strip_scheme(domain: &str) -> &str {
    domain
        .strip_prefix("https://")
        .or_else(|| domain.strip_prefix("http://"))
        .unwrap_or(domain)
}

/// Look up the OAuth client configured for `domain`.
///
/// # Errors
///
/// Returns [`LoginError::InvalidDomain`] for an empty domain and
/// [`LoginError::Network`]/[`LoginError::Decoding`] for fetch failures,
/// all of which terminate the login attempt.
pub async fn verify_client(
    http: &reqwest::Client,
    discovery_base: &Url,
    domain: &str,
) -> Result<ClientCredentials, LoginError> {
    let domain = strip_scheme(domain.trim());
    if domain.is_empty() {
        debug_assert!(false, "caller must supply a non-empty domain");
        return Err(LoginError::InvalidDomain);
    }

    let mut url = discovery_base.clone();
    url.set_path("/api/v1/mobile_verify.json");
    url.set_query(None);
    url.query_pairs_mut().append_pair("domain", domain);
    fetch_json(http, url).await
}
