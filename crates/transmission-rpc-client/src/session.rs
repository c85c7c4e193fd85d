//! Authenticated transport to the daemon's RPC endpoint.
//!
//! The daemon protects its RPC endpoint with a session id that must be echoed back in the
//! [`SESSION_ID_HEADER`] header. The id is handed out on any response to an authenticated
//! request, and a request carrying a missing or stale id is rejected with `409 Conflict`.
//! [`SessionClient`] caches the id, fetches it on first use and, on a 409, refreshes it and
//! retries exactly once.

use std::fmt;

use reqwest::{Client, RequestBuilder, Response, StatusCode, header::CONTENT_TYPE};
use thiserror::Error;
use tracing::{debug, instrument, warn};
use url::Url;

use crate::config::ClientConfig;

/// Header carrying the daemon's anti-CSRF session id.
pub const SESSION_ID_HEADER: &str = "X-Transmission-Session-Id";

/// Path of the RPC endpoint, relative to the daemon base URL.
pub const RPC_PATH: &str = "transmission/rpc";

/// Errors raised by the transport layer.
#[derive(Error, Debug)]
pub enum TransportError {
    /// Connection, DNS, timeout or body read failure. Never retried.
    #[error("http transport: {0}")]
    Network(#[from] reqwest::Error),

    /// The base URL, or a download URL, could not be parsed.
    #[error("invalid url: {0}")]
    InvalidUrl(String),

    /// A torrent download answered with a non-success status.
    #[error("GET {url} returned {status}")]
    Download {
        /// The URL that was fetched.
        url: String,
        /// The status the server answered with.
        status: StatusCode,
    },
}

#[derive(Clone)]
struct Credentials {
    username: String,
    password: String,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Never print the password.
        write!(f, "Credentials(username=\"{}\", password=<set>)", self.username)
    }
}

/// A client for the daemon's RPC endpoint that keeps the session id current.
///
/// `execute` takes `&mut self` since it may replace the cached session id. To share one session
/// between tasks, serialize the calls (e.g. behind a `tokio::sync::Mutex`), or give each worker
/// its own `SessionClient`. The inner [`reqwest::Client`] pools connections either way.
pub struct SessionClient {
    rpc_url: Url,
    credentials: Option<Credentials>,
    session_id: Option<String>,
    http: Client,
}

impl fmt::Debug for SessionClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionClient")
            .field("rpc_url", &self.rpc_url.as_str())
            .field("credentials", &self.credentials)
            .field("session_id", &self.session_id)
            .finish()
    }
}

impl SessionClient {
    /// Create a session client for the daemon at `base_url`, authenticating with HTTP Basic
    /// credentials. Requests go to `<base_url>/transmission/rpc`.
    pub fn new(base_url: &str, username: &str, password: &str) -> Result<Self, TransportError> {
        let credentials = Credentials {
            username: username.to_owned(),
            password: password.to_owned(),
        };
        Self::with_http_client(base_url, Some(credentials), Client::new())
    }

    /// Create a session client for a daemon that does not require authentication.
    pub fn anonymous(base_url: &str) -> Result<Self, TransportError> {
        Self::with_http_client(base_url, None, Client::new())
    }

    /// Create a session client from a [`ClientConfig`].
    pub fn from_config(config: &ClientConfig) -> Result<Self, TransportError> {
        let mut builder = Client::builder();
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }
        let http = builder.build()?;

        let credentials = config.username.as_ref().map(|username| Credentials {
            username: username.clone(),
            password: config.password.clone().unwrap_or_default(),
        });
        Self::with_http_client(&config.base_url, credentials, http)
    }

    fn with_http_client(
        base_url: &str,
        credentials: Option<Credentials>,
        http: Client,
    ) -> Result<Self, TransportError> {
        let rpc_url = rpc_url(base_url)?;
        debug!("Transmission RPC endpoint is {}", rpc_url);
        Ok(Self {
            rpc_url,
            credentials,
            session_id: None,
            http,
        })
    }

    /// The RPC endpoint requests are posted to.
    pub fn rpc_url(&self) -> &Url {
        &self.rpc_url
    }

    /// The cached session id, if the daemon has handed one out.
    pub fn session_id(&self) -> Option<&str> {
        self.session_id.as_deref()
    }

    /// POST `body` to the RPC endpoint and return the response body.
    ///
    /// The body is returned whatever the response status: a daemon rejecting the credentials
    /// answers with a non-409 error status, and that answer is returned as is. Only a 409 is
    /// acted upon, by refreshing the session id and retrying once. A second 409 is returned
    /// like any other response.
    #[instrument(skip_all, fields(url = %self.rpc_url))]
    pub async fn execute(&mut self, body: &[u8]) -> Result<Vec<u8>, TransportError> {
        if self.session_id.is_none() {
            debug!("No session id cached, fetching one");
            self.refresh_session_id().await?;
        }

        let mut response = self.post(body).await?;
        if response.status() == StatusCode::CONFLICT {
            debug!("Session id rejected, refreshing and retrying once");
            self.refresh_session_id().await?;
            response = self.post(body).await?;
        }

        let status = response.status();
        let output = response.bytes().await?;
        debug!("RPC answered {status} with {} bytes", output.len());

        Ok(output.to_vec())
    }

    /// GET `url` without credentials or session id and return the body.
    #[instrument(skip(self))]
    pub async fn download(&self, url: &str) -> Result<Vec<u8>, TransportError> {
        let parsed = Url::parse(url).map_err(|e| TransportError::InvalidUrl(format!("{url}: {e}")))?;
        let response = self.http.get(parsed).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(TransportError::Download {
                url: url.to_owned(),
                status,
            });
        }

        let bytes = response.bytes().await?;
        debug!("Downloaded {} bytes", bytes.len());
        Ok(bytes.to_vec())
    }

    /// Ask the daemon for a session id and cache whatever it answers, even on error statuses:
    /// the id arrives on the 409 rejection. Without the header the cache is cleared.
    async fn refresh_session_id(&mut self) -> Result<(), TransportError> {
        let response = self
            .authorize(self.http.post(self.rpc_url.clone()))
            .send()
            .await?;

        self.session_id = response
            .headers()
            .get(SESSION_ID_HEADER)
            .and_then(|value| match value.to_str() {
                Ok(id) => Some(id.to_owned()),
                Err(e) => {
                    warn!("Ignoring unreadable {SESSION_ID_HEADER} header: {e}");
                    None
                }
            })
            .filter(|id| !id.is_empty());

        debug!(
            "Session id fetch answered {}, session id {}",
            response.status(),
            if self.session_id.is_some() {
                "received"
            } else {
                "missing"
            }
        );
        Ok(())
    }

    async fn post(&self, body: &[u8]) -> Result<Response, TransportError> {
        let request = self
            .http
            .post(self.rpc_url.clone())
            .header(SESSION_ID_HEADER, self.session_id.as_deref().unwrap_or_default())
            .header(CONTENT_TYPE, "application/json")
            .body(body.to_vec());

        Ok(self.authorize(request).send().await?)
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.credentials {
            Some(credentials) => {
                request.basic_auth(&credentials.username, Some(&credentials.password))
            }
            None => request,
        }
    }
}

/// Builds `<base_url>/transmission/rpc`, tolerating a trailing slash on the base.
fn rpc_url(base_url: &str) -> Result<Url, TransportError> {
    let endpoint = format!("{}/{RPC_PATH}", base_url.trim_end_matches('/'));
    Url::parse(&endpoint).map_err(|e| TransportError::InvalidUrl(format!("{base_url}: {e}")))
}
