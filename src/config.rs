use std::time::Duration;

use secrecy::{ExposeSecret as _, SecretString};
use url::Url;

use crate::Result;
use crate::error::Error;

/// Production host of the labeling registry.
pub const DEFAULT_HOST: &str = "https://ismp.crpt.ru";
/// Path of the document creation endpoint, relative to the host.
pub const CREATE_DOCUMENT_PATH: &str = "/api/v3/lk/documents/create";

/// Client bootstrap configuration.
///
/// At most `capacity` submissions may begin per `period`; the budget is
/// topped back up to `capacity` at every period boundary.
#[derive(Clone, Debug)]
pub struct ClientConfig {
    pub host: Url,
    pub token: SecretString,
    pub period: Duration,
    pub capacity: u32,
}

impl ClientConfig {
    /// Configuration against [`DEFAULT_HOST`].
    pub fn new(token: SecretString, period: Duration, capacity: u32) -> Result<Self> {
        Self::from_raw(DEFAULT_HOST, token, period, capacity)
    }

    pub fn from_raw(
        host: &str,
        token: SecretString,
        period: Duration,
        capacity: u32,
    ) -> Result<Self> {
        let host = Url::parse(host)?;
        let config = Self {
            host,
            token,
            period,
            capacity,
        };
        config.validate()?;

        Ok(config)
    }

    #[must_use]
    pub fn with_host(mut self, host: Url) -> Self {
        self.host = host;
        self
    }

    pub(crate) fn validate(&self) -> Result<()> {
        if self.token.expose_secret().trim().is_empty() {
            return Err(Error::configuration("bearer token must not be empty"));
        }
        if self.period.is_zero() {
            return Err(Error::configuration(
                "rate limit period must be a positive duration",
            ));
        }
        if self.capacity == 0 {
            return Err(Error::configuration(
                "rate limit capacity must be a positive integer",
            ));
        }
        if self.host.cannot_be_a_base() {
            return Err(Error::configuration(format!(
                "host `{}` cannot be used as a base url",
                self.host
            )));
        }
        Ok(())
    }

    pub(crate) fn endpoint(&self) -> Result<Url> {
        Ok(self.host.join(CREATE_DOCUMENT_PATH)?)
    }
}
