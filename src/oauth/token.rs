//! Token exchange against the institution's token endpoint
//!
//! Posts the authorization code (with the flow's client proof) to
//! `/login/oauth2/token` and decodes the resulting access/refresh token
//! and user profile. A second entry point exchanges a stored refresh
//! token, used by session-refresh collaborators outside the login flow.
//!
//! Failures surface unmodified and are never retried here: authorization
//! codes are single-use per the OAuth spec.

use log::debug;
use serde::{Deserialize, Deserializer};
use url::Url;

use crate::error::LoginError;
use crate::oauth::OAuthFlow;

/// Path of the token endpoint on the institution's instance.
pub const TOKEN_PATH: &str = "/login/oauth2/token";

/// The acting (or real, for `real_user`) user profile embedded in a token
/// response. Canvas serializes ids as either JSON strings or numbers.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct TokenUser {
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub effective_locale: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
}

/// Ephemeral token endpoint response; consumed immediately by the session
/// factory.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct TokenResponse {
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
    #[serde(default)]
    pub token_type: Option<String>,
    /// Seconds until the access token expires; absent for non-expiring
    /// tokens.
    #[serde(default)]
    pub expires_in: Option<f64>,
    #[serde(default)]
    pub canvas_region: Option<String>,
    pub user: TokenUser,
    /// Present when an administrator is masquerading as `user`.
    #[serde(default)]
    pub real_user: Option<TokenUser>,
}

fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        String(String),
        Number(i64),
    }
    Ok(match Raw::deserialize(deserializer)? {
        Raw::String(value) => value,
        Raw::Number(value) => value.to_string(),
    })
}

/// Exchange an authorization code for tokens.
///
/// Posts `grant_type=authorization_code` with the flow's client id and
/// proof (`client_secret` or `code_verifier`).
///
/// # Errors
///
/// Returns [`LoginError::Network`] for transport/HTTP failures and
/// [`LoginError::Decoding`] for malformed response bodies.
pub async fn exchange_code(
    http: &reqwest::Client,
    flow: &OAuthFlow,
    code: &str,
) -> Result<TokenResponse, LoginError> {
    debug_assert!(!code.is_empty(), "authorization code must be non-empty");
    let (proof_name, proof_value) = flow.client_proof();
    let params = [
        ("client_id", flow.client_id()),
        (proof_name, proof_value),
        ("grant_type", "authorization_code"),
        ("code", code),
    ];
    post_token(http, flow.base_url(), &params).await
}

/// Exchange a stored refresh token for a fresh access token.
///
/// # Errors
///
/// Same failure modes as [`exchange_code`].
pub async fn refresh_access_token(
    http: &reqwest::Client,
    flow: &OAuthFlow,
    refresh_token: &str,
) -> Result<TokenResponse, LoginError> {
    let (proof_name, proof_value) = flow.client_proof();
    let params = [
        ("client_id", flow.client_id()),
        (proof_name, proof_value),
        ("grant_type", "refresh_token"),
        ("refresh_token", refresh_token),
    ];
    post_token(http, flow.base_url(), &params).await
}

async fn post_token(
    http: &reqwest::Client,
    base_url: &Url,
    params: &[(&str, &str)],
) -> Result<TokenResponse, LoginError> {
    let mut url = base_url.clone();
    url.set_path(TOKEN_PATH);
    debug!("Exchanging grant with token endpoint at {url}");

    let response = http.post(url).form(params).send().await?;
    let response = response.error_for_status()?;
    let body = response.text().await?;
    debug!("Raw token response: {body}");

    Ok(serde_json::from_str(&body)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_full_token_response() {
        let token: TokenResponse = serde_json::from_str(
            r#"{
                "access_token": "at",
                "refresh_token": "rt",
                "token_type": "Bearer",
                "expires_in": 3600,
                "canvas_region": "us-east-1",
                "user": {
                    "id": 1,
                    "name": "Eve Everyone",
                    "effective_locale": "en",
                    "email": "eve@cgnu.edu"
                },
                "real_user": { "id": "2", "name": "Admin" }
            }"#,
        )
        .unwrap();
        assert_eq!(token.access_token, "at");
        assert_eq!(token.user.id, "1");
        assert_eq!(token.user.email.as_deref(), Some("eve@cgnu.edu"));
        let real_user = token.real_user.unwrap();
        assert_eq!(real_user.id, "2");
        assert_eq!(token.expires_in, Some(3600.0));
        assert_eq!(token.canvas_region.as_deref(), Some("us-east-1"));
    }

    #[test]
    fn decodes_minimal_token_response() {
        let token: TokenResponse = serde_json::from_str(
            r#"{"access_token": "at", "user": {"id": "7", "name": "n"}}"#,
        )
        .unwrap();
        assert_eq!(token.user.id, "7");
        assert!(token.refresh_token.is_none());
        assert!(token.expires_in.is_none());
        assert!(token.real_user.is_none());
    }

    #[test]
    fn user_ids_decode_from_strings_and_numbers() {
        let from_number: TokenUser =
            serde_json::from_str(r#"{"id": 42, "name": "n"}"#).unwrap();
        let from_string: TokenUser =
            serde_json::from_str(r#"{"id": "42", "name": "n"}"#).unwrap();
        assert_eq!(from_number, from_string);
    }

    #[test]
    fn malformed_body_is_a_decoding_error() {
        let err = serde_json::from_str::<TokenResponse>("not json").unwrap_err();
        assert!(LoginError::from(err).is_fetch_failure());
    }
}
