//! Environment configuration.
//!
//! [`ClientConfig`] resolves the settings a [`Client`](crate::Client) needs
//! from `SL_*` variables. The client itself never reads the environment.

use std::time::Duration;

use crate::ClientBuilder;
use crate::ClientError;

pub const ENV_USERNAME: &str = "SL_USERNAME";
pub const ENV_API_KEY: &str = "SL_API_KEY";
pub const ENV_ENDPOINT_URL: &str = "SL_ENDPOINT_URL";
/// Timeout in seconds.
pub const ENV_TIMEOUT: &str = "SL_TIMEOUT";

/// Settings resolved from the environment.
///
/// Empty values count as unset.
#[derive(Clone, Default, PartialEq)]
pub struct ClientConfig {
    pub username: Option<String>,
    pub api_key: Option<String>,
    pub endpoint_url: Option<String>,
    pub timeout: Option<Duration>,
}

impl ClientConfig {
    /// Read the process environment.
    pub fn from_env() -> Result<Self, ClientError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Resolve settings through `lookup`.
    ///
    /// # Example
    ///
    /// ```
    /// use std::collections::HashMap;
    /// use softlayer_client::ClientConfig;
    ///
    /// let vars = HashMap::from([("SL_USERNAME", "user"), ("SL_API_KEY", "key")]);
    /// let config = ClientConfig::from_lookup(|name| vars.get(name).map(|v| v.to_string())).unwrap();
    /// assert_eq!(config.username.as_deref(), Some("user"));
    /// ```
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ClientError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let timeout = match get(ENV_TIMEOUT) {
            Some(raw) => {
                let secs: f64 = raw.trim().parse().map_err(|_| {
                    ClientError::configuration(format!("{ENV_TIMEOUT} is not a number: {raw:?}"))
                })?;
                let timeout = Duration::try_from_secs_f64(secs).map_err(|_| {
                    ClientError::configuration(format!("{ENV_TIMEOUT} out of range: {raw:?}"))
                })?;
                Some(timeout)
            }
            None => None,
        };

        Ok(Self {
            username: get(ENV_USERNAME),
            api_key: get(ENV_API_KEY),
            endpoint_url: get(ENV_ENDPOINT_URL),
            timeout,
        })
    }

    /// Whether both username and API key are present.
    pub fn has_credentials(&self) -> bool {
        self.username.is_some() && self.api_key.is_some()
    }

    /// Start a [`ClientBuilder`] from these settings.
    ///
    /// Without credentials the builder is left unauthenticated and
    /// [`ClientBuilder::build`] fails unless `anonymous()` is chosen.
    pub fn into_builder(self) -> ClientBuilder {
        let mut builder = ClientBuilder::new();
        if let Some(url) = self.endpoint_url {
            builder = builder.endpoint_url(url);
        }
        if let (Some(username), Some(api_key)) = (self.username, self.api_key) {
            builder = builder.credentials(username, api_key);
        }
        if let Some(timeout) = self.timeout {
            builder = builder.timeout(timeout);
        }
        builder
    }
}

impl std::fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientConfig")
            .field("username", &self.username)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("endpoint_url", &self.endpoint_url)
            .field("timeout", &self.timeout)
            .finish()
    }
}
