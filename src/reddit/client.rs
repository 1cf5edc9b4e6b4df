//! Session setup against the Reddit API: credential resolution, the OAuth2
//! token exchange, the identity check, and the listing request.

use serde::Deserialize;
use std::env;
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

use super::SortOrder;

const TOKEN_URL: &str = "https://www.reddit.com/api/v1/access_token";
const API_BASE: &str = "https://oauth.reddit.com";
const DEFAULT_USER_AGENT: &str = concat!("reddit-scraper/", env!("CARGO_PKG_VERSION"));
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Error)]
pub enum ScrapeError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Reddit API returned {status} for {endpoint}")]
    Api { status: u16, endpoint: String },

    #[error("authentication failed: {reason}")]
    Auth { reason: String },

    #[error("malformed API response: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("missing credentials: set {var}")]
    MissingCredentials { var: &'static str },
}

/// Credentials for a Reddit script application.
///
/// Resolved from the environment by [`Credentials::from_env`], or constructed
/// directly by callers that inject their own (tests do).
#[derive(Clone, Debug)]
pub struct Credentials {
    pub client_id: String,
    pub client_secret: String,
    pub user_agent: String,
    /// Account name for a password-grant session. Leaving it (or the
    /// password) unset requests an application-only, read-only token.
    pub username: Option<String>,
    pub password: Option<String>,
}

impl Credentials {
    /// Read credentials from `REDDIT_CLIENT_ID`, `REDDIT_CLIENT_SECRET`,
    /// `REDDIT_USER_AGENT`, `REDDIT_USERNAME` and `REDDIT_PASSWORD`.
    ///
    /// Only the id and secret are required; the user agent falls back to the
    /// package default and the account pair is optional.
    pub fn from_env() -> Result<Self, ScrapeError> {
        let client_id = env::var("REDDIT_CLIENT_ID")
            .map_err(|_| ScrapeError::MissingCredentials { var: "REDDIT_CLIENT_ID" })?;
        let client_secret = env::var("REDDIT_CLIENT_SECRET")
            .map_err(|_| ScrapeError::MissingCredentials { var: "REDDIT_CLIENT_SECRET" })?;
        Ok(Self {
            client_id,
            client_secret,
            user_agent: env::var("REDDIT_USER_AGENT")
                .unwrap_or_else(|_| DEFAULT_USER_AGENT.to_string()),
            username: env::var("REDDIT_USERNAME").ok(),
            password: env::var("REDDIT_PASSWORD").ok(),
        })
    }

    fn account(&self) -> Option<(&str, &str)> {
        match (&self.username, &self.password) {
            (Some(user), Some(pass)) => Some((user, pass)),
            _ => None,
        }
    }
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: Option<String>,
    /// The token endpoint reports bad grants as 200 + an error body.
    error: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Identity {
    name: String,
}

/// Envelope of a listing response:
/// `{"kind": "Listing", "data": {"children": [...]}}`.
///
/// Children stay as raw JSON so the fetcher can decode them one at a time.
#[derive(Debug, Deserialize)]
struct Listing {
    data: ListingData,
}

#[derive(Debug, Deserialize)]
struct ListingData {
    children: Vec<serde_json::Value>,
}

/// An authenticated connection to the Reddit API.
///
/// Created once per invocation and read-only afterwards.
pub struct Session {
    http: reqwest::blocking::Client,
    access_token: String,
    identity: Option<String>,
}

impl Session {
    /// Exchange the credentials for an OAuth2 token and verify it.
    ///
    /// A password grant is verified by fetching `/api/v1/me`; any failure
    /// there aborts construction. An application-only grant carries no user
    /// identity, so [`Session::identity`] reports `None` and the caller
    /// decides whether read-only access is acceptable.
    pub fn connect(credentials: &Credentials) -> Result<Self, ScrapeError> {
        let http = reqwest::blocking::Client::builder()
            .user_agent(credentials.user_agent.clone())
            .timeout(REQUEST_TIMEOUT)
            .build()?;

        let params = match credentials.account() {
            Some((user, pass)) => vec![
                ("grant_type", "password".to_string()),
                ("username", user.to_string()),
                ("password", pass.to_string()),
            ],
            None => vec![("grant_type", "client_credentials".to_string())],
        };

        let response = http
            .post(TOKEN_URL)
            .basic_auth(&credentials.client_id, Some(&credentials.client_secret))
            .form(&params)
            .send()?;
        let status = response.status();
        if !status.is_success() {
            return Err(ScrapeError::Auth {
                reason: format!("token endpoint returned {status}"),
            });
        }
        let token: TokenResponse = response.json()?;
        let access_token = match token.access_token {
            Some(access_token) => access_token,
            None => {
                return Err(ScrapeError::Auth {
                    reason: token.error.unwrap_or_else(|| "no access token granted".to_string()),
                })
            }
        };

        let mut session = Self {
            http,
            access_token,
            identity: None,
        };
        if credentials.account().is_some() {
            let me: Identity = serde_json::from_value(session.get_json("/api/v1/me", &[])?)?;
            // An empty name still counts as a read-only session.
            if !me.name.is_empty() {
                debug!("Identity check passed for {}", me.name);
                session.identity = Some(me.name);
            }
        }
        Ok(session)
    }

    /// The authenticated account name, or `None` for a read-only session.
    pub fn identity(&self) -> Option<&str> {
        self.identity.as_deref()
    }

    /// Fetch one listing page from `feed` under `sort`, at most `limit` items.
    pub fn listing(
        &self,
        feed: &str,
        sort: SortOrder,
        limit: u32,
    ) -> Result<Vec<serde_json::Value>, ScrapeError> {
        let path = format!("/r/{feed}/{}", sort.as_str());
        let raw = self.get_json(&path, &[("limit", limit.to_string())])?;
        let listing: Listing = serde_json::from_value(raw)?;
        Ok(listing.data.children)
    }

    fn get_json(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<serde_json::Value, ScrapeError> {
        let response = self
            .http
            .get(format!("{API_BASE}{path}"))
            .bearer_auth(&self.access_token)
            .query(query)
            .send()?;
        let status = response.status();
        if !status.is_success() {
            return Err(ScrapeError::Api {
                status: status.as_u16(),
                endpoint: path.to_string(),
            });
        }
        Ok(response.json()?)
    }
}
