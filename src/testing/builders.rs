//! Fluent builders for creating customizable test objects
//!
//! Builders keep sensible defaults so a test only states what it cares
//! about. `json()` emits the wire form for mock HTTP servers.

use serde_json::{json, Value};

use crate::oauth::{TokenResponse, TokenUser};

use super::constants::{
    TEST_ACCESS_TOKEN, TEST_EMAIL, TEST_REFRESH_TOKEN, TEST_USER_ID, TEST_USER_NAME,
};

/// Builder for token endpoint responses
pub struct TokenResponseBuilder {
    access_token: String,
    refresh_token: Option<String>,
    expires_in: Option<f64>,
    canvas_region: Option<String>,
    user_id: String,
    user_name: String,
    email: Option<String>,
    locale: Option<String>,
    real_user: Option<(String, String)>,
}

impl TokenResponseBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self {
            access_token: TEST_ACCESS_TOKEN.to_string(),
            refresh_token: Some(TEST_REFRESH_TOKEN.to_string()),
            expires_in: Some(3600.0),
            canvas_region: None,
            user_id: TEST_USER_ID.to_string(),
            user_name: TEST_USER_NAME.to_string(),
            email: Some(TEST_EMAIL.to_string()),
            locale: Some("en".to_string()),
            real_user: None,
        }
    }

    #[must_use]
    pub fn with_access_token(mut self, access_token: &str) -> Self {
        self.access_token = access_token.to_string();
        self
    }

    #[must_use]
    pub fn with_refresh_token(mut self, refresh_token: Option<&str>) -> Self {
        self.refresh_token = refresh_token.map(ToString::to_string);
        self
    }

    /// Seconds until expiry; `None` for a non-expiring token.
    #[must_use]
    pub fn expires_in(mut self, seconds: Option<f64>) -> Self {
        self.expires_in = seconds;
        self
    }

    #[must_use]
    pub fn with_region(mut self, region: &str) -> Self {
        self.canvas_region = Some(region.to_string());
        self
    }

    #[must_use]
    pub fn with_user(mut self, id: &str, name: &str) -> Self {
        self.user_id = id.to_string();
        self.user_name = name.to_string();
        self
    }

    #[must_use]
    pub fn with_email(mut self, email: Option<&str>) -> Self {
        self.email = email.map(ToString::to_string);
        self
    }

    #[must_use]
    pub fn with_locale(mut self, locale: Option<&str>) -> Self {
        self.locale = locale.map(ToString::to_string);
        self
    }

    /// Mark the response as a masquerade: `real_user` is the actor behind
    /// the acting `user`.
    #[must_use]
    pub fn masquerading_as(mut self, real_user_id: &str, real_user_name: &str) -> Self {
        self.real_user = Some((real_user_id.to_string(), real_user_name.to_string()));
        self
    }

    /// Build the decoded response.
    #[must_use]
    pub fn build(self) -> TokenResponse {
        TokenResponse {
            access_token: self.access_token,
            refresh_token: self.refresh_token,
            token_type: Some("Bearer".to_string()),
            expires_in: self.expires_in,
            canvas_region: self.canvas_region,
            user: TokenUser {
                id: self.user_id,
                name: self.user_name,
                effective_locale: self.locale,
                email: self.email,
            },
            real_user: self.real_user.map(|(id, name)| TokenUser {
                id,
                name,
                effective_locale: None,
                email: None,
            }),
        }
    }

    /// Build the wire form, for mock token endpoints.
    #[must_use]
    pub fn json(self) -> Value {
        let mut body = json!({
            "access_token": self.access_token,
            "token_type": "Bearer",
            "user": {
                "id": self.user_id,
                "name": self.user_name,
            },
        });
        if let Some(refresh_token) = &self.refresh_token {
            body["refresh_token"] = json!(refresh_token);
        }
        if let Some(expires_in) = self.expires_in {
            body["expires_in"] = json!(expires_in);
        }
        if let Some(region) = &self.canvas_region {
            body["canvas_region"] = json!(region);
        }
        if let Some(email) = &self.email {
            body["user"]["email"] = json!(email);
        }
        if let Some(locale) = &self.locale {
            body["user"]["effective_locale"] = json!(locale);
        }
        if let Some((id, name)) = &self.real_user {
            body["real_user"] = json!({"id": id, "name": name});
        }
        body
    }
}

impl Default for TokenResponseBuilder {
    fn default() -> Self {
        Self::new()
    }
}
