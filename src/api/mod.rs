//! Thin typed client for the unauthenticated discovery endpoints
//!
//! Covers the two pre-login REST calls: institution search and mobile
//! client verification. Both are issued against the fixed discovery host
//! without an auth header.

pub mod accounts;
pub mod mobile_verify;

pub use accounts::{AccountResult, AccountSearch};
pub use mobile_verify::ClientCredentials;

use log::debug;
use serde::de::DeserializeOwned;
use url::Url;

use crate::error::LoginError;

/// GET a JSON resource, surfacing HTTP failures as network errors and
/// body failures as decoding errors.
pub(crate) async fn fetch_json<T: DeserializeOwned>(
    http: &reqwest::Client,
    url: Url,
) -> Result<T, LoginError> {
    debug!("Fetching {url}");
    let response = http.get(url).send().await?;
    let response = response.error_for_status()?;
    let body = response.text().await?;
    Ok(serde_json::from_str(&body)?)
}
