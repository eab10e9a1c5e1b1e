//! Authorization page request construction
//!
//! Builds the `/login/oauth2/auth` request loaded into the embedded
//! browser. Pure construction, no I/O: both branches are decided before
//! any network interaction based on whether client-secret credentials are
//! available (manual) or not (PKCE).

use std::time::Duration;

use url::Url;

use crate::error::LoginError;
use crate::oauth::pkce::PkceChallenge;
use crate::oauth::{AuthorizationMethod, OAuthFlow};

/// Fixed client-side redirect URI. Never resolved over the network; the
/// embedded browser intercepts navigations to it.
pub const REDIRECT_URI: &str = "https://canvas/login";

/// Path of the authorization endpoint on the institution's instance.
pub const AUTH_PATH: &str = "/login/oauth2/auth";

/// Timeout applied to the authorization page load.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Browser-identifying User-Agent sent with the authorization request.
/// Some institution SSO portals refuse login forms to non-browser agents.
pub const SAFARI_USER_AGENT: &str = "Mozilla/5.0 (iPhone; CPU iPhone OS 17_0 like Mac OS X) \
     AppleWebKit/605.1.15 (KHTML, like Gecko) Version/17.0 Mobile/15E148 Safari/604.1";

const SITE_ADMIN_COOKIE: &str = "canvas_sa_delegated=1";

/// A fully constructed authorization page request, ready to be loaded in
/// the embedded browser.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthorizeRequest {
    pub url: Url,
    /// Header name/value pairs. Always carries `User-Agent`; site-admin
    /// logins additionally carry the delegated-login cookie.
    pub headers: Vec<(&'static str, String)>,
    pub timeout: Duration,
}

/// Build the authorization request for a flow variant.
///
/// The manual branch decorates the query according to `method` and the
/// optional authentication provider. The PKCE branch derives the S256
/// challenge from the flow's verifier and forces the Canvas-native login
/// form only for hosts listed in `canvas_native_hosts` (a per-institution
/// carve-out kept as configuration data).
///
/// # Errors
///
/// Returns [`LoginError::InvalidDomain`] when the flow's base URL cannot
/// carry a path (e.g. a non-hierarchical URL).
pub fn build_authorize_request(
    flow: &OAuthFlow,
    method: AuthorizationMethod,
    authentication_provider: Option<&str>,
    canvas_native_hosts: &[String],
) -> Result<AuthorizeRequest, LoginError> {
    let mut url = flow.base_url().clone();
    if url.cannot_be_a_base() {
        return Err(LoginError::InvalidDomain);
    }
    url.set_path(AUTH_PATH);

    match flow {
        OAuthFlow::Manual { client_id, .. } => {
            let mut pairs = url.query_pairs_mut();
            pairs
                .append_pair("client_id", client_id)
                .append_pair("response_type", "code")
                .append_pair("redirect_uri", REDIRECT_URI)
                .append_pair("mobile", "1");
            if method == AuthorizationMethod::CanvasNative {
                pairs.append_pair("canvas_login", "1");
            }
            if let Some(provider) = authentication_provider {
                pairs.append_pair("authentication_provider", provider);
            }
        }
        OAuthFlow::Pkce {
            client_id,
            code_verifier,
            ..
        } => {
            let force_canvas_login = is_canvas_native_host(flow.base_url(), canvas_native_hosts);
            let mut pairs = url.query_pairs_mut();
            pairs
                .append_pair("client_id", client_id)
                .append_pair("redirect_uri", REDIRECT_URI)
                .append_pair("response_type", "code")
                .append_pair("code_challenge", &PkceChallenge::challenge_for(code_verifier))
                .append_pair("code_challenge_method", "S256")
                .append_pair("mobile", "1");
            if force_canvas_login {
                pairs.append_pair("canvas_login", "1");
            }
        }
    }

    let mut headers = vec![("User-Agent", SAFARI_USER_AGENT.to_string())];
    if method == AuthorizationMethod::SiteAdmin {
        headers.push(("Cookie", SITE_ADMIN_COOKIE.to_string()));
    }

    Ok(AuthorizeRequest {
        url,
        headers,
        timeout: REQUEST_TIMEOUT,
    })
}

fn is_canvas_native_host(base_url: &Url, canvas_native_hosts: &[String]) -> bool {
    base_url.host_str().is_some_and(|host| {
        canvas_native_hosts
            .iter()
            .any(|native| host.eq_ignore_ascii_case(native))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn query_map(url: &Url) -> HashMap<String, String> {
        url.query_pairs()
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect()
    }

    fn manual_flow() -> OAuthFlow {
        OAuthFlow::Manual {
            base_url: Url::parse("https://cgnu.edu").unwrap(),
            client_id: "cgnu".to_string(),
            client_secret: "s".to_string(),
        }
    }

    fn pkce_flow(host: &str) -> OAuthFlow {
        OAuthFlow::Pkce {
            base_url: Url::parse(&format!("https://{host}")).unwrap(),
            client_id: "1".to_string(),
            code_verifier: "dBjftJeZ4CVP-mB92K27uhbUJU1p1r_wW1gFWFOEjXk".to_string(),
        }
    }

    #[test]
    fn manual_request_carries_required_parameters() {
        let request =
            build_authorize_request(&manual_flow(), AuthorizationMethod::Normal, None, &[])
                .unwrap();
        assert_eq!(request.url.path(), "/login/oauth2/auth");
        assert_eq!(request.url.host_str(), Some("cgnu.edu"));
        let query = query_map(&request.url);
        assert_eq!(query["client_id"], "cgnu");
        assert_eq!(query["response_type"], "code");
        assert_eq!(query["redirect_uri"], "https://canvas/login");
        assert_eq!(query["mobile"], "1");
        assert!(!query.contains_key("canvas_login"));
        assert!(!query.contains_key("code_challenge"));
        assert_eq!(request.timeout, Duration::from_secs(30));
    }

    #[test]
    fn canvas_native_method_adds_canvas_login() {
        let request =
            build_authorize_request(&manual_flow(), AuthorizationMethod::CanvasNative, None, &[])
                .unwrap();
        assert_eq!(query_map(&request.url)["canvas_login"], "1");
    }

    #[test]
    fn authentication_provider_is_forwarded() {
        let request = build_authorize_request(
            &manual_flow(),
            AuthorizationMethod::Normal,
            Some("saml"),
            &[],
        )
        .unwrap();
        assert_eq!(query_map(&request.url)["authentication_provider"], "saml");
    }

    #[test]
    fn site_admin_method_adds_delegated_cookie() {
        let request =
            build_authorize_request(&manual_flow(), AuthorizationMethod::SiteAdmin, None, &[])
                .unwrap();
        assert!(request
            .headers
            .contains(&("Cookie", "canvas_sa_delegated=1".to_string())));
    }

    #[test]
    fn user_agent_identifies_a_browser() {
        let request =
            build_authorize_request(&manual_flow(), AuthorizationMethod::Normal, None, &[])
                .unwrap();
        let (_, agent) = request
            .headers
            .iter()
            .find(|(name, _)| *name == "User-Agent")
            .unwrap();
        assert!(agent.contains("Safari"));
    }

    #[test]
    fn pkce_request_carries_s256_challenge() {
        let request = build_authorize_request(
            &pkce_flow("localhost"),
            AuthorizationMethod::Normal,
            None,
            &[],
        )
        .unwrap();
        let query = query_map(&request.url);
        assert_eq!(query["client_id"], "1");
        // Known S256 pairing from RFC 7636 Appendix B.
        assert_eq!(
            query["code_challenge"],
            "E9Melhoa2OwvFrEMTJguCHaoeK1t8URWbuGJSstw-cM"
        );
        assert_eq!(query["code_challenge_method"], "S256");
        assert_eq!(query["mobile"], "1");
        assert!(!query.contains_key("canvas_login"));
    }

    #[test]
    fn pkce_parameter_order_matches_login_form_expectations() {
        let request = build_authorize_request(
            &pkce_flow("localhost"),
            AuthorizationMethod::Normal,
            None,
            &[],
        )
        .unwrap();
        let names: Vec<String> = request
            .url
            .query_pairs()
            .map(|(k, _)| k.into_owned())
            .collect();
        assert_eq!(
            names,
            [
                "client_id",
                "redirect_uri",
                "response_type",
                "code_challenge",
                "code_challenge_method",
                "mobile"
            ]
        );
    }

    #[test]
    fn listed_host_forces_canvas_native_pkce_login() {
        let hosts = vec!["intelvio.instructure.com".to_string()];
        let request = build_authorize_request(
            &pkce_flow("Intelvio.Instructure.com"),
            AuthorizationMethod::Normal,
            None,
            &hosts,
        )
        .unwrap();
        assert_eq!(query_map(&request.url)["canvas_login"], "1");

        let other = build_authorize_request(
            &pkce_flow("cgnu.edu"),
            AuthorizationMethod::Normal,
            None,
            &hosts,
        )
        .unwrap();
        assert!(!query_map(&other.url).contains_key("canvas_login"));
    }
}
