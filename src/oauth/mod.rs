//! OAuth flow core types
//!
//! This module provides the two OAuth flow variants (manual client-secret
//! and PKCE), authorization request construction, the PKCE challenge
//! generator and the token exchange client.

pub mod authorize;
pub mod pkce;
pub mod token;

pub use authorize::{AuthorizeRequest, AUTH_PATH, REDIRECT_URI, SAFARI_USER_AGENT};
pub use pkce::{ChallengePair, PkceChallenge};
pub use token::{TokenResponse, TokenUser};

use url::Url;

/// How the authorization request is decorated. Alters query parameters and
/// headers of the authorization page request only; the token exchange is
/// identical for all methods.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AuthorizationMethod {
    #[default]
    Normal,
    /// Forces the institution's own Canvas login form (`canvas_login=1`).
    CanvasNative,
    /// Delegated site-admin login; adds the `canvas_sa_delegated` cookie.
    SiteAdmin,
    /// Manually supplied OAuth client credentials.
    ManualOAuth,
}

/// The credentials a login attempt carries into the token exchange.
///
/// Chosen before any network interaction: `Manual` when mobile verify
/// returned a client secret, `Pkce` otherwise.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OAuthFlow {
    Manual {
        base_url: Url,
        client_id: String,
        client_secret: String,
    },
    Pkce {
        base_url: Url,
        client_id: String,
        code_verifier: String,
    },
}

impl OAuthFlow {
    #[must_use]
    pub fn base_url(&self) -> &Url {
        match self {
            Self::Manual { base_url, .. } | Self::Pkce { base_url, .. } => base_url,
        }
    }

    #[must_use]
    pub fn client_id(&self) -> &str {
        match self {
            Self::Manual { client_id, .. } | Self::Pkce { client_id, .. } => client_id,
        }
    }

    /// The variant-specific client parameter attached to token requests:
    /// `client_secret` for manual flows, `code_verifier` for PKCE.
    #[must_use]
    pub fn client_proof(&self) -> (&'static str, &str) {
        match self {
            Self::Manual { client_secret, .. } => ("client_secret", client_secret),
            Self::Pkce { code_verifier, .. } => ("code_verifier", code_verifier),
        }
    }
}

/// First value of a query parameter, at any position in the query.
pub(crate) fn query_value(url: &Url, name: &str) -> Option<String> {
    url.query_pairs()
        .find(|(key, _)| key == name)
        .map(|(_, value)| value.into_owned())
}
