use async_trait::async_trait;
use serde::Deserialize;

use super::{CheckError, InterruptChecker};

pub const AZURE_METADATA_URL: &str = "http://169.254.169.254";

const SCHEDULED_EVENTS_PATH: &str = "/metadata/scheduledevents";
const SCHEDULED_EVENTS_API_VERSION: &str = "2020-07-01";
const PREEMPT_EVENT_TYPE: &str = "Preempt";

/// Watches the Azure Scheduled Events API for a `Preempt` event.
#[derive(Clone, Debug)]
pub struct AzureChecker {
    client: reqwest::Client,
    metadata_url: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct ScheduledEvents {
    #[serde(default)]
    events: Vec<ScheduledEvent>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
struct ScheduledEvent {
    event_id: String,
    event_type: String,
    not_before: String,
}

impl AzureChecker {
    pub fn new(client: reqwest::Client) -> Self {
        Self::with_metadata_url(client, AZURE_METADATA_URL)
    }

    pub fn with_metadata_url(client: reqwest::Client, metadata_url: impl ToString) -> Self {
        Self {
            client,
            metadata_url: metadata_url.to_string(),
        }
    }

    async fn scheduled_events(&self) -> Result<ScheduledEvents, CheckError> {
        let url = format!("{}{SCHEDULED_EVENTS_PATH}", self.metadata_url);
        let response = self
            .client
            .get(url)
            .query(&[("api-version", SCHEDULED_EVENTS_API_VERSION)])
            .header("Metadata", "true")
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(CheckError::Status(status));
        }

        Ok(response.json().await?)
    }
}

#[async_trait]
impl InterruptChecker for AzureChecker {
    async fn check(&self) -> Result<bool, CheckError> {
        let events = self.scheduled_events().await?;
        let preempt = events
            .events
            .iter()
            .find(|event| event.event_type == PREEMPT_EVENT_TYPE);

        if let Some(event) = preempt {
            tracing::info!(
                event_id = %event.event_id,
                not_before = %event.not_before,
                "Azure preempt event scheduled"
            );
        }

        Ok(preempt.is_some())
    }
}
