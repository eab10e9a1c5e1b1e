//! Crate-wide error type for the login flow
//!
//! Every failure class the UI layer can surface is a variant here. None of
//! these are retried by the crate itself; retry, if any, is a fresh
//! user-initiated attempt with a freshly generated PKCE pair.

use thiserror::Error;

/// Errors produced by the login and OAuth session establishment flow.
///
/// The `AccessDenied`, `Timeout` and `InvalidDomain` display strings are the
/// fixed user-facing messages shown by the login UI and are part of the
/// crate's contract.
#[derive(Debug, Error)]
pub enum LoginError {
    /// Transport or HTTP-status failure. Not retried automatically.
    #[error("network request failed: {0}")]
    Network(#[from] reqwest::Error),

    /// Malformed server response. Treated as a fetch failure by the UI.
    #[error("malformed server response: {0}")]
    Decoding(#[from] serde_json::Error),

    /// The authorization server redirected with `error=access_denied`.
    /// Attributable to user choice, not system fault.
    #[error("Authentication failed. Most likely the user denied the request for access.")]
    AccessDenied,

    /// The authorization page never loaded a valid login form, or the
    /// mobile-verify endpoint rejected the domain.
    #[error("Go back and make sure you entered a valid institution name.")]
    InvalidDomain,

    /// The authorization page load timed out.
    #[error("We received no response from the institution.\nGo back and make sure you entered a valid institution name.")]
    Timeout,

    /// Mobile verify reported `authorized: false` for the domain.
    #[error("{domain} is not authorized for mobile access")]
    Unauthorized { domain: String },

    /// The pairing-code flow could not locate a registration UI element.
    #[error("Self registration is not allowed. Contact your school to create an account.")]
    SelfRegistrationUnavailable,

    /// PKCE login was requested but no app client id is configured.
    #[error("app client id is not configured")]
    MissingClientId,

    /// Settings file could not be read or parsed.
    #[error("failed to load settings: {0}")]
    Settings(String),
}

impl LoginError {
    /// Whether this error is a generic fetch failure (network or decoding),
    /// as opposed to a flow-specific terminal state.
    #[must_use]
    pub fn is_fetch_failure(&self) -> bool {
        matches!(self, Self::Network(_) | Self::Decoding(_))
    }
}
