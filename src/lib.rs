#![warn(clippy::pedantic)]
#![warn(clippy::cargo)]
#![deny(warnings)]
#![allow(clippy::multiple_crate_versions)]

/// Version of the canvas-login library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod api;
pub mod error;
pub mod models;
pub mod oauth;
pub mod session;
pub mod settings;
pub mod sso;
pub mod web;

#[cfg(any(test, feature = "testing"))]
pub mod testing;

/// Re-export commonly used items
pub use api::{AccountResult, AccountSearch, ClientCredentials};
pub use error::LoginError;
pub use models::Session;
pub use oauth::{AuthorizationMethod, OAuthFlow, PkceChallenge};
pub use session::{build_session, MemorySessionStore, SessionStore};
pub use settings::LoginSettings;
pub use sso::{App, SsoLogin};
pub use web::{
    NavigationDecision, WebLoginDriver, WebLoginFlow, WebLoginState,
};
