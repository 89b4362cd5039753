//! Provider specific interruption signals.
//!
//! Every cloud announces a reclaim differently. The handler only needs the
//! answer to one question, so each provider is hidden behind
//! [`InterruptChecker`] and chosen once at startup through [`Checker`].

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::StatusCode;

pub use azure::{AZURE_METADATA_URL, AzureChecker};
pub use gcp::{GCP_METADATA_URL, GcpChecker};

mod azure;
mod gcp;

/// Answers whether this node has received a termination notice.
///
/// Calls are idempotent. An error leaves nothing changed and the caller
/// asks again on the next poll.
#[async_trait]
pub trait InterruptChecker: Send + Sync {
    async fn check(&self) -> Result<bool, CheckError>;
}

#[derive(Debug, thiserror::Error)]
pub enum CheckError {
    #[error("requesting instance metadata: {0}")]
    Request(#[from] reqwest::Error),

    #[error("instance metadata returned status {0}")]
    Status(StatusCode),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Provider {
    Azure,
    Gcp,
}

#[derive(Debug, thiserror::Error)]
#[error("unknown provider: {0}")]
pub struct UnknownProvider(String);

impl FromStr for Provider {
    type Err = UnknownProvider;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "azure" => Ok(Self::Azure),
            "gcp" => Ok(Self::Gcp),
            other => Err(UnknownProvider(other.to_string())),
        }
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Azure => f.write_str("azure"),
            Self::Gcp => f.write_str("gcp"),
        }
    }
}

/// The checker for the provider configured at startup.
#[derive(Clone, Debug)]
pub enum Checker {
    Azure(AzureChecker),
    Gcp(GcpChecker),
}

impl Checker {
    /// Builds the checker for `provider` against its default metadata endpoint.
    ///
    /// `timeout` bounds every metadata request and should not exceed the
    /// poll interval.
    pub fn new(provider: Provider, timeout: Duration) -> Result<Self, CheckError> {
        let client = metadata_client(timeout)?;
        let checker = match provider {
            Provider::Azure => Self::Azure(AzureChecker::new(client)),
            Provider::Gcp => Self::Gcp(GcpChecker::new(client)),
        };
        Ok(checker)
    }

    pub fn provider(&self) -> Provider {
        match self {
            Self::Azure(_) => Provider::Azure,
            Self::Gcp(_) => Provider::Gcp,
        }
    }
}

#[async_trait]
impl InterruptChecker for Checker {
    async fn check(&self) -> Result<bool, CheckError> {
        match self {
            Self::Azure(checker) => checker.check().await,
            Self::Gcp(checker) => checker.check().await,
        }
    }
}

/// HTTP client for link-local metadata services, which must never go through a proxy.
fn metadata_client(timeout: Duration) -> reqwest::Result<reqwest::Client> {
    reqwest::Client::builder()
        .no_proxy()
        .timeout(timeout)
        .build()
}
