use async_trait::async_trait;

use super::{CheckError, InterruptChecker};

pub const GCP_METADATA_URL: &str = "http://metadata.google.internal";

const PREEMPTED_PATH: &str = "/computeMetadata/v1/instance/preempted";

/// Reads the GCE `instance/preempted` metadata key, which flips to `TRUE`
/// once the instance is being preempted.
#[derive(Clone, Debug)]
pub struct GcpChecker {
    client: reqwest::Client,
    metadata_url: String,
}

impl GcpChecker {
    pub fn new(client: reqwest::Client) -> Self {
        Self::with_metadata_url(client, GCP_METADATA_URL)
    }

    pub fn with_metadata_url(client: reqwest::Client, metadata_url: impl ToString) -> Self {
        Self {
            client,
            metadata_url: metadata_url.to_string(),
        }
    }
}

#[async_trait]
impl InterruptChecker for GcpChecker {
    async fn check(&self) -> Result<bool, CheckError> {
        let url = format!("{}{PREEMPTED_PATH}", self.metadata_url);
        let response = self
            .client
            .get(url)
            .header("Metadata-Flavor", "Google")
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(CheckError::Status(status));
        }

        let body = response.text().await?;
        Ok(body.trim() == "TRUE")
    }
}
