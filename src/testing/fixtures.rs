//! Test fixtures providing pre-built test objects
//!
//! Commonly used flows, credentials and responses, so individual test
//! files do not recreate the same objects.

use url::Url;

use crate::api::ClientCredentials;
use crate::oauth::{OAuthFlow, TokenResponse};

use super::builders::TokenResponseBuilder;
use super::constants::{TEST_BASE_URL, TEST_CLIENT_ID, TEST_CLIENT_SECRET};

/// Central fixture provider for all test data
pub struct TestFixtures;

impl TestFixtures {
    /// An authorized mobile-verify result for the default institution.
    #[must_use]
    pub fn client_credentials() -> ClientCredentials {
        Self::client_credentials_for(TEST_BASE_URL)
    }

    /// An authorized mobile-verify result against a specific base URL,
    /// typically a mock server's.
    ///
    /// # Panics
    ///
    /// Panics if `base_url` does not parse.
    #[must_use]
    pub fn client_credentials_for(base_url: &str) -> ClientCredentials {
        ClientCredentials {
            authorized: true,
            base_url: Some(Url::parse(base_url).expect("test base URL parses")),
            client_id: Some(TEST_CLIENT_ID.to_string()),
            client_secret: Some(TEST_CLIENT_SECRET.to_string()),
        }
    }

    /// A manual-variant flow for the default institution.
    ///
    /// # Panics
    ///
    /// Panics if `base_url` does not parse.
    #[must_use]
    pub fn manual_flow(base_url: &str) -> OAuthFlow {
        OAuthFlow::Manual {
            base_url: Url::parse(base_url).expect("test base URL parses"),
            client_id: TEST_CLIENT_ID.to_string(),
            client_secret: TEST_CLIENT_SECRET.to_string(),
        }
    }

    /// A PKCE-variant flow with a fixed verifier.
    ///
    /// # Panics
    ///
    /// Panics if `base_url` does not parse.
    #[must_use]
    pub fn pkce_flow(base_url: &str) -> OAuthFlow {
        OAuthFlow::Pkce {
            base_url: Url::parse(base_url).expect("test base URL parses"),
            client_id: TEST_CLIENT_ID.to_string(),
            code_verifier: "dBjftJeZ4CVP-mB92K27uhbUJU1p1r_wW1gFWFOEjXk".to_string(),
        }
    }

    /// A typical successful token response.
    #[must_use]
    pub fn token_response() -> TokenResponse {
        TokenResponseBuilder::new().build()
    }
}
