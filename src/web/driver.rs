//! Async driver for the embedded-browser login attempt
//!
//! Couples the pure [`WebLoginFlow`] state machine to the token exchange.
//! Cancellation is structural: the exchange runs as an abortable task that
//! is torn down when the driver is cancelled or dropped, so a late
//! response can never be delivered after the user backs out.

use log::debug;
use tokio::task::JoinHandle;
use url::Url;

use crate::error::LoginError;
use crate::models::Session;
use crate::oauth::{token, AuthorizeRequest, OAuthFlow};
use crate::session::build_session;
use crate::web::{NavigationDecision, WebLoginFlow, WebLoginState};

/// An in-flight token exchange, aborted on drop.
#[derive(Debug)]
pub struct TokenExchangeTask {
    handle: Option<JoinHandle<Result<Session, LoginError>>>,
}

impl TokenExchangeTask {
    /// Spawn the exchange for an authorization code and build the session
    /// from the response.
    #[must_use]
    pub fn spawn(http: reqwest::Client, flow: OAuthFlow, code: String) -> Self {
        let handle = tokio::spawn(async move {
            let response = token::exchange_code(&http, &flow, &code).await?;
            Ok(build_session(&response, &flow))
        });
        Self {
            handle: Some(handle),
        }
    }

    /// Abort the exchange without consuming the task.
    pub fn abort(&self) {
        if let Some(handle) = &self.handle {
            handle.abort();
        }
    }

    /// Await the exchange. Returns `None` when the task was aborted; an
    /// aborted exchange is a silent no-op, not an error.
    pub async fn wait(mut self) -> Option<Result<Session, LoginError>> {
        let handle = self.handle.take()?;
        match handle.await {
            Ok(result) => Some(result),
            Err(join_error) if join_error.is_cancelled() => None,
            Err(join_error) => std::panic::resume_unwind(join_error.into_panic()),
        }
    }
}

impl Drop for TokenExchangeTask {
    fn drop(&mut self) {
        if let Some(handle) = &self.handle {
            handle.abort();
        }
    }
}

/// Drives one login attempt: forwards navigation decisions to the state
/// machine and starts the token exchange when the redirect is captured.
///
/// Dropping the driver aborts any in-flight exchange.
pub struct WebLoginDriver {
    http: reqwest::Client,
    flow: WebLoginFlow,
    exchange: Option<TokenExchangeTask>,
    // Authorization codes are single-use; once an exchange has been
    // spawned no later navigation callback may start another.
    exchange_started: bool,
    cancelled: bool,
}

impl WebLoginDriver {
    #[must_use]
    pub fn new(http: reqwest::Client, flow: WebLoginFlow) -> Self {
        Self {
            http,
            flow,
            exchange: None,
            exchange_started: false,
            cancelled: false,
        }
    }

    /// Begin the attempt; the returned request is loaded in the browser.
    ///
    /// # Errors
    ///
    /// Propagates authorization request construction failures.
    pub fn start(&mut self) -> Result<AuthorizeRequest, LoginError> {
        self.flow.start()
    }

    /// Forward a navigation decision; spawns the token exchange when the
    /// authorization redirect is captured. The exchange runs at most once
    /// per attempt, however many navigation callbacks follow.
    pub fn on_navigation(&mut self, url: &Url) -> NavigationDecision {
        let decision = self.flow.decide_navigation(url);
        if let Some(code) = self.flow.authorized_code() {
            if !self.exchange_started && !self.cancelled {
                debug!("Starting token exchange for captured authorization code");
                self.exchange_started = true;
                self.exchange = Some(TokenExchangeTask::spawn(
                    self.http.clone(),
                    self.flow.oauth_flow().clone(),
                    code.to_string(),
                ));
            }
        }
        decision
    }

    /// Await the session. `None` when no exchange was started or the
    /// attempt was cancelled while it was in flight.
    pub async fn session(&mut self) -> Option<Result<Session, LoginError>> {
        let exchange = self.exchange.take()?;
        let result = exchange.wait().await;
        if self.cancelled {
            // Late result after user cancellation is discarded.
            return None;
        }
        result
    }

    /// User-initiated teardown: aborts the in-flight exchange and makes
    /// the attempt silently terminal.
    pub fn cancel(&mut self) {
        self.cancelled = true;
        self.flow.cancel();
        if let Some(exchange) = self.exchange.take() {
            exchange.abort();
        }
    }

    #[must_use]
    pub fn state(&self) -> &WebLoginState {
        self.flow.state()
    }

    #[must_use]
    pub fn flow(&self) -> &WebLoginFlow {
        &self.flow
    }

    #[must_use]
    pub fn flow_mut(&mut self) -> &mut WebLoginFlow {
        &mut self.flow
    }
}
