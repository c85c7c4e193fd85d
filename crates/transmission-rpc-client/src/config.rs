//! Client configuration, read from the environment.

use std::{env, fmt, time::Duration};

use tracing::warn;

/// Daemon address used when none is configured.
pub const DEFAULT_BASE_URL: &str = "http://localhost:9091";

const URL_VAR: &str = "TRANSMISSION_URL";
const USERNAME_VAR: &str = "TRANSMISSION_USERNAME";
const PASSWORD_VAR: &str = "TRANSMISSION_PASSWORD";
const TIMEOUT_VAR: &str = "TRANSMISSION_TIMEOUT_SECS";

/// Configuration for a [`crate::SessionClient`].
#[derive(Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// The daemon base URL; the RPC endpoint is `<base_url>/transmission/rpc`.
    pub base_url: String,
    /// Basic auth user. Credentials are only sent when this is set.
    pub username: Option<String>,
    /// Basic auth password. Defaults to empty when a username is set.
    pub password: Option<String>,
    /// Overall deadline applied by the HTTP client to each request.
    pub timeout: Option<Duration>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self::new(DEFAULT_BASE_URL)
    }
}

impl ClientConfig {
    /// Configuration for an unauthenticated daemon at `base_url`.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            username: None,
            password: None,
            timeout: None,
        }
    }

    /// Sets the Basic auth credentials.
    pub fn with_credentials(
        mut self,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        self.username = Some(username.into());
        self.password = Some(password.into());
        self
    }

    /// Sets the request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Reads the configuration from the environment, loading a `.env` file first if present.
    ///
    /// Recognized variables: `TRANSMISSION_URL`, `TRANSMISSION_USERNAME`,
    /// `TRANSMISSION_PASSWORD` and `TRANSMISSION_TIMEOUT_SECS`.
    pub fn from_env() -> Self {
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary variable lookup. Empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|value| !value.is_empty());

        let timeout = get(TIMEOUT_VAR).and_then(|secs| match secs.trim().parse::<u64>() {
            Ok(secs) => Some(Duration::from_secs(secs)),
            Err(e) => {
                warn!("Ignoring {TIMEOUT_VAR}={secs}: {e}");
                None
            }
        });

        Self {
            base_url: get(URL_VAR).unwrap_or_else(|| DEFAULT_BASE_URL.to_owned()),
            username: get(USERNAME_VAR),
            password: get(PASSWORD_VAR),
            timeout,
        }
    }
}

impl fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Never print credentials.
        write!(
            f,
            "ClientConfig(base_url=\"{}\", username={:?}, password=<{}>, timeout={:?})",
            self.base_url,
            self.username,
            if self.password.is_some() {
                "set"
            } else {
                "unset"
            },
            self.timeout,
        )
    }
}
