//! Embedded-browser login flow as an explicit state machine
//!
//! One login attempt is a value moving through
//! `Idle -> Loading -> {Redirected, Failed, Cancelled}`, with every
//! navigation decision made by inspecting the target URL. The machine is
//! pure (no I/O); [`driver`] runs the resulting token exchange.

pub mod driver;
pub mod page;

pub use driver::{TokenExchangeTask, WebLoginDriver};
pub use page::{
    AuthScheme, CanvasPageAdapter, ChallengeDisposition, CredentialPrompt, Credentials, MdmLogin,
    PageAction, PageAdapter,
};

use log::debug;
use url::Url;

use crate::api::ClientCredentials;
use crate::error::LoginError;
use crate::oauth::pkce::PkceChallenge;
use crate::oauth::{
    authorize, query_value, AuthorizationMethod, AuthorizeRequest, OAuthFlow, REDIRECT_URI,
};

/// Why a login attempt failed before reaching the token exchange.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureReason {
    /// The user denied the authorization request.
    AccessDenied,
    /// The institution never answered the page load.
    Timeout,
    /// The page load failed outright; most likely a bad institution name.
    InvalidDomain,
}

impl From<FailureReason> for LoginError {
    fn from(reason: FailureReason) -> Self {
        match reason {
            FailureReason::AccessDenied => Self::AccessDenied,
            FailureReason::Timeout => Self::Timeout,
            FailureReason::InvalidDomain => Self::InvalidDomain,
        }
    }
}

/// State of one login attempt. Terminal states absorb all further input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WebLoginState {
    Idle,
    Loading,
    Redirected { code: String },
    Failed(FailureReason),
    Cancelled,
}

impl WebLoginState {
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::Idle | Self::Loading)
    }
}

/// Answer handed back to the host browser for a navigation attempt.
/// Callbacks are answered exactly once per navigation decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavigationDecision {
    Allow,
    Cancel,
}

/// A failed provisional navigation, as reported by the host browser.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavigationFailure {
    /// Raised by the browser when we cancel a navigation ourselves; ignored.
    FrameLoadInterrupted,
    TimedOut,
    Other,
}

/// One embedded-browser login attempt.
///
/// Owns everything the attempt needs: the flow variant (and with it the
/// PKCE challenge pair, generated fresh inside [`pkce`](Self::pkce) and
/// never reusable across attempts), pending MDM credentials and the page
/// adapter. No state is shared between concurrent attempts.
pub struct WebLoginFlow {
    flow: OAuthFlow,
    method: AuthorizationMethod,
    authentication_provider: Option<String>,
    canvas_native_hosts: Vec<String>,
    mdm_login: Option<MdmLogin>,
    pairing_code: Option<String>,
    adapter: Box<dyn PageAdapter + Send + Sync>,
    state: WebLoginState,
}

impl WebLoginFlow {
    /// Build a manual-variant attempt from mobile-verify credentials.
    ///
    /// # Errors
    ///
    /// Returns [`LoginError::InvalidDomain`] when the credentials do not
    /// carry a complete manual client (unauthorized domain, or missing
    /// base URL/id/secret).
    pub fn manual(
        credentials: &ClientCredentials,
        method: AuthorizationMethod,
    ) -> Result<Self, LoginError> {
        if !credentials.supports_manual_flow() {
            return Err(LoginError::InvalidDomain);
        }
        let (Some(base_url), Some(client_id), Some(client_secret)) = (
            credentials.base_url.clone(),
            credentials.client_id.clone(),
            credentials.client_secret.clone(),
        ) else {
            return Err(LoginError::InvalidDomain);
        };
        Ok(Self::new(
            OAuthFlow::Manual {
                base_url,
                client_id,
                client_secret,
            },
            method,
        ))
    }

    /// Build a PKCE-variant attempt against a host, generating a fresh
    /// challenge pair owned by this attempt.
    #[must_use]
    pub fn pkce(
        base_url: Url,
        client_id: impl Into<String>,
        method: AuthorizationMethod,
        generator: PkceChallenge,
    ) -> Self {
        let pair = generator.generate();
        Self::new(
            OAuthFlow::Pkce {
                base_url,
                client_id: client_id.into(),
                code_verifier: pair.code_verifier,
            },
            method,
        )
    }

    fn new(flow: OAuthFlow, method: AuthorizationMethod) -> Self {
        Self {
            flow,
            method,
            authentication_provider: None,
            canvas_native_hosts: Vec::new(),
            mdm_login: None,
            pairing_code: None,
            adapter: Box::new(CanvasPageAdapter),
            state: WebLoginState::Idle,
        }
    }

    #[must_use]
    pub fn with_authentication_provider(mut self, provider: impl Into<String>) -> Self {
        self.authentication_provider = Some(provider.into());
        self
    }

    #[must_use]
    pub fn with_canvas_native_hosts(mut self, hosts: Vec<String>) -> Self {
        self.canvas_native_hosts = hosts;
        self
    }

    #[must_use]
    pub fn with_mdm_login(mut self, login: MdmLogin) -> Self {
        self.mdm_login = Some(login);
        self
    }

    #[must_use]
    pub fn with_pairing_code(mut self, code: impl Into<String>) -> Self {
        self.pairing_code = Some(code.into());
        self
    }

    #[must_use]
    pub fn with_page_adapter(mut self, adapter: Box<dyn PageAdapter + Send + Sync>) -> Self {
        self.adapter = adapter;
        self
    }

    #[must_use]
    pub fn state(&self) -> &WebLoginState {
        &self.state
    }

    #[must_use]
    pub fn oauth_flow(&self) -> &OAuthFlow {
        &self.flow
    }

    /// The captured authorization code, once redirected.
    #[must_use]
    pub fn authorized_code(&self) -> Option<&str> {
        match &self.state {
            WebLoginState::Redirected { code } => Some(code),
            _ => None,
        }
    }

    /// Begin the attempt: build the authorization page request to load.
    /// Transitions `Idle -> Loading`.
    ///
    /// # Errors
    ///
    /// Propagates authorization request construction failures.
    pub fn start(&mut self) -> Result<AuthorizeRequest, LoginError> {
        let request = authorize::build_authorize_request(
            &self.flow,
            self.method,
            self.authentication_provider.as_deref(),
            &self.canvas_native_hosts,
        )?;
        self.state = WebLoginState::Loading;
        Ok(request)
    }

    /// Decide whether the browser may perform a navigation.
    ///
    /// `about:blank` loads are cancelled silently (the LMS uses them for
    /// internal redirects). A navigation to the fixed redirect URI with a
    /// non-empty `code` parameter (any query position) captures the code
    /// and transitions to `Redirected`. An `error=access_denied` parameter
    /// anywhere fails the attempt. Everything else is a normal page load.
    pub fn decide_navigation(&mut self, url: &Url) -> NavigationDecision {
        if self.state != WebLoginState::Loading {
            return NavigationDecision::Cancel;
        }

        if url.scheme() == "about" {
            return NavigationDecision::Cancel;
        }

        if url.as_str().starts_with(REDIRECT_URI) {
            if let Some(code) = query_value(url, "code").filter(|code| !code.is_empty()) {
                debug!("Authorization redirect intercepted");
                self.state = WebLoginState::Redirected { code };
                return NavigationDecision::Cancel;
            }
        }

        // access_denied is the only error code the authorization server
        // currently sends on redirect.
        if query_value(url, "error").as_deref() == Some("access_denied") {
            self.state = WebLoginState::Failed(FailureReason::AccessDenied);
            return NavigationDecision::Cancel;
        }

        NavigationDecision::Allow
    }

    /// Record a failed provisional navigation.
    pub fn provisional_failure(&mut self, failure: NavigationFailure) {
        if self.state != WebLoginState::Loading {
            return;
        }
        match failure {
            NavigationFailure::FrameLoadInterrupted => {}
            NavigationFailure::TimedOut => {
                self.state = WebLoginState::Failed(FailureReason::Timeout);
            }
            NavigationFailure::Other => {
                self.state = WebLoginState::Failed(FailureReason::InvalidDomain);
            }
        }
    }

    /// A page finished loading: produce at most one scripted action.
    /// MDM credentials are scoped to their provisioned host and injected
    /// exactly once, cleared afterwards.
    pub fn page_finished(&mut self) -> Option<PageAction> {
        if self.state != WebLoginState::Loading {
            return None;
        }
        if self.mdm_login_matches_host() {
            if let Some(login) = self.mdm_login.take() {
                return Some(PageAction::PrefillLogin(
                    self.adapter.prefill_login_script(&login),
                ));
            }
        }
        if let Some(code) = &self.pairing_code {
            return Some(PageAction::ShowSelfRegistration(
                self.adapter.self_registration_script(code),
            ));
        }
        None
    }

    /// The self-registration script reported that no registration UI
    /// exists on the page. The attempt stays on the page (the user can
    /// still log in normally); the error is for the UI to surface.
    #[must_use]
    pub fn self_registration_unavailable(&self) -> LoginError {
        LoginError::SelfRegistrationUnavailable
    }

    /// Answer an HTTP auth challenge raised mid-flow. Basic and NTLM
    /// challenges prompt for credentials; other schemes defer to the
    /// browser's default handling without prompting.
    pub fn auth_challenge(
        &self,
        scheme: AuthScheme,
        prompt: &dyn CredentialPrompt,
    ) -> ChallengeDisposition {
        match scheme {
            AuthScheme::HttpBasic | AuthScheme::Ntlm => prompt
                .prompt()
                .map_or(ChallengeDisposition::PerformDefaultHandling, |credentials| {
                    ChallengeDisposition::UseCredential(credentials)
                }),
            AuthScheme::Other => ChallengeDisposition::PerformDefaultHandling,
        }
    }

    /// User-initiated cancellation: not an error, silently terminal.
    pub fn cancel(&mut self) {
        self.state = WebLoginState::Cancelled;
    }

    fn mdm_login_matches_host(&self) -> bool {
        let Some(login) = &self.mdm_login else {
            return false;
        };
        self.flow
            .base_url()
            .host_str()
            .is_some_and(|host| host.eq_ignore_ascii_case(&login.host))
    }
}
