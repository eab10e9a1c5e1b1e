//! Institution search (account lookup)
//!
//! Resolves a human-entered school name to candidate institutions via the
//! discovery host's search endpoint. Results are transient and
//! display-only; server order is preserved.

use serde::{Deserialize, Deserializer};
use tokio::task::{AbortHandle, JoinHandle};
use url::Url;

use crate::api::fetch_json;
use crate::error::LoginError;

/// One institution returned by the search endpoint.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct AccountResult {
    #[serde(deserialize_with = "trimmed")]
    pub name: String,
    pub domain: String,
    /// The server sends the literal string `"Null"` (or an empty string)
    /// for "no provider"; both normalize to `None`.
    #[serde(default, deserialize_with = "normalized_provider")]
    pub authentication_provider: Option<String>,
}

fn trimmed<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = String::deserialize(deserializer)?;
    Ok(value.trim().to_string())
}

fn normalized_provider<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<String>::deserialize(deserializer)?;
    Ok(value.filter(|provider| !provider.is_empty() && provider != "Null"))
}

/// Fetch institutions matching a free-text search term.
///
/// An empty or whitespace-only term yields an empty list without issuing
/// a network request.
///
/// # Errors
///
/// Returns [`LoginError::Network`] or [`LoginError::Decoding`]; callers
/// surface both as a generic fetch error without retrying.
pub async fn search_accounts(
    http: &reqwest::Client,
    discovery_base: &Url,
    search_term: &str,
    per_page: u32,
) -> Result<Vec<AccountResult>, LoginError> {
    let search_term = search_term.trim();
    if search_term.is_empty() {
        return Ok(Vec::new());
    }

    let mut url = discovery_base.clone();
    url.set_path("/api/v1/accounts/search");
    url.set_query(None);
    url.query_pairs_mut()
        .append_pair("per_page", &per_page.to_string())
        .append_pair("search_term", search_term);
    fetch_json(http, url).await
}

/// A search box's view of account lookup: at most one request in flight.
///
/// A fresh [`search`](Self::search) preempts any outstanding one before
/// issuing the next, so a user retyping never queues stale requests. The
/// superseded task's `JoinHandle` resolves to a cancellation `JoinError`,
/// which callers treat as a silent no-op.
#[derive(Debug)]
pub struct AccountSearch {
    http: reqwest::Client,
    discovery_base: Url,
    per_page: u32,
    in_flight: Option<AbortHandle>,
}

impl AccountSearch {
    #[must_use]
    pub fn new(http: reqwest::Client, discovery_base: Url, per_page: u32) -> Self {
        Self {
            http,
            discovery_base,
            per_page,
            in_flight: None,
        }
    }

    /// Start a search, aborting any search still in flight.
    pub fn search(
        &mut self,
        search_term: &str,
    ) -> JoinHandle<Result<Vec<AccountResult>, LoginError>> {
        if let Some(previous) = self.in_flight.take() {
            previous.abort();
        }
        let http = self.http.clone();
        let base = self.discovery_base.clone();
        let per_page = self.per_page;
        let term = search_term.to_string();
        let handle =
            tokio::spawn(async move { search_accounts(&http, &base, &term, per_page).await });
        self.in_flight = Some(handle.abort_handle());
        handle
    }
}
