//! Session assembly
//!
//! Pure transformation of a token response into an immutable [`Session`]
//! value, plus the injected session repository trait.

pub mod store;

pub use store::{MemorySessionStore, SessionStore};

use chrono::{DateTime, Duration, Utc};
use url::Url;

use crate::models::Session;
use crate::oauth::{OAuthFlow, TokenResponse};

/// Assemble a session from a successful token exchange.
///
/// `expires_at` is computed from `expires_in` when present; tokens without
/// one, or with an expiry too large to represent, are treated as
/// non-expiring. A `real_user` in the response marks a
/// masquerading session: the effective acting user stays `user`, the real
/// user's id is retained as `original_user_id`, and `masquerade_url`
/// points at the acting user on the instance.
///
/// No I/O and no failure modes; malformed input is a programmer error
/// upstream, not a runtime error here.
#[must_use]
pub fn build_session(token: &TokenResponse, flow: &OAuthFlow) -> Session {
    build_session_at(token, flow, Utc::now())
}

/// [`build_session`] with an injected clock, for deterministic tests.
#[must_use]
pub fn build_session_at(token: &TokenResponse, flow: &OAuthFlow, now: DateTime<Utc>) -> Session {
    let base_url = flow.base_url().clone();
    // expires_in is server-controlled; an out-of-range value must not
    // panic, it just makes the token non-expiring.
    #[allow(clippy::cast_possible_truncation)]
    let expires_at = token
        .expires_in
        .and_then(|seconds| Duration::try_seconds(seconds as i64))
        .and_then(|duration| now.checked_add_signed(duration));

    let masquerade_url = token
        .real_user
        .as_ref()
        .and_then(|_| user_url(&base_url, &token.user.id));

    let (client_id, client_secret) = match flow {
        OAuthFlow::Manual {
            client_id,
            client_secret,
            ..
        } => (Some(client_id.clone()), Some(client_secret.clone())),
        OAuthFlow::Pkce { client_id, .. } => (Some(client_id.clone()), None),
    };

    Session {
        access_token: token.access_token.clone(),
        base_url,
        expires_at,
        locale: token.user.effective_locale.clone(),
        masquerade_url,
        refresh_token: token.refresh_token.clone(),
        user_id: token.user.id.clone(),
        user_name: token.user.name.clone(),
        user_email: token.user.email.clone(),
        original_user_id: token.real_user.as_ref().map(|real| real.id.clone()),
        client_id,
        client_secret,
        region: token.canvas_region.clone(),
    }
}

fn user_url(base_url: &Url, user_id: &str) -> Option<Url> {
    let mut url = base_url.clone();
    url.path_segments_mut()
        .ok()?
        .pop_if_empty()
        .extend(["users", user_id]);
    Some(url)
}
