use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use url::Url;

/// An authenticated session against one LMS instance.
///
/// Immutable once created by the session factory; ownership passes to the
/// host application's session store. Destroyed on explicit logout, which is
/// a collaborator responsibility.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct Session {
    pub access_token: String,
    pub base_url: Url,
    pub expires_at: Option<DateTime<Utc>>,
    pub locale: Option<String>,
    /// Present only for masquerading sessions; points at the acting user
    /// (`{base_url}/users/{acting_user_id}`).
    pub masquerade_url: Option<Url>,
    pub refresh_token: Option<String>,
    /// The effective acting user.
    pub user_id: String,
    pub user_name: String,
    pub user_email: Option<String>,
    /// The real (masquerading) user when this session acts as someone else.
    pub original_user_id: Option<String>,
    /// Client credentials carried for later token refresh. PKCE sessions
    /// have a `client_id` but no `client_secret`.
    pub client_id: Option<String>,
    pub client_secret: Option<String>,
    pub region: Option<String>,
}

impl Session {
    /// Whether the access token has a known expiry in the past.
    /// Sessions without `expires_at` are treated as non-expiring.
    #[must_use]
    pub fn is_expired(&self) -> bool {
        self.expires_at.is_some_and(|at| at <= Utc::now())
    }

    /// Whether this session is an administrator acting as another user.
    #[must_use]
    pub fn is_masquerading(&self) -> bool {
        self.original_user_id.is_some()
    }

    /// Stable identity of this session within a store: one session per
    /// user per instance.
    #[must_use]
    pub fn unique_id(&self) -> String {
        format!("{}|{}", self.base_url, self.user_id)
    }
}
