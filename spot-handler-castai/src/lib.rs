//! Client for the CAST AI external cluster API.
//!
//! The spot handler reports a single kind of event: the node it runs on is
//! being interrupted by the cloud provider.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header;
use serde::Serialize;

pub use error::CastError;

mod error;

const HEADER_API_KEY: &str = "x-api-key";

/// Request timeout used when none is configured.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

/// Reports cloud events about this node to the control plane.
///
/// One request per call. A transport error and a non-success status are
/// both reported as [`CastError`] and nothing is retried here.
#[async_trait]
pub trait CloudEventSender: Send + Sync {
    async fn send_cloud_event(&self, req: &CloudEventRequest) -> Result<(), CastError>;
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CloudEventType {
    Interrupted,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct CloudEventRequest {
    pub event_type: CloudEventType,
    pub node_id: String,
}

impl CloudEventRequest {
    pub fn interrupted(node_id: impl ToString) -> Self {
        Self {
            event_type: CloudEventType::Interrupted,
            node_id: node_id.to_string(),
        }
    }
}

#[derive(Clone, Debug)]
pub struct CastConfig {
    pub api_url: String,
    pub api_key: String,
    pub cluster_id: String,
    pub timeout: Duration,
    /// Handler version, reported in the `User-Agent` header.
    pub version: String,
}

#[derive(Debug)]
pub struct CastClient {
    client: reqwest::Client,
    api_url: String,
    cluster_id: String,
}

impl CastClient {
    pub fn new(config: &CastConfig) -> Result<Self, CastError> {
        let mut api_key =
            header::HeaderValue::from_str(&config.api_key).map_err(CastError::InvalidApiKey)?;
        api_key.set_sensitive(true);

        let mut headers = header::HeaderMap::new();
        headers.insert(HEADER_API_KEY, api_key);

        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .user_agent(format!("castai-spot-handler/{}", config.version))
            .default_headers(headers)
            .build()?;

        Ok(Self {
            client,
            api_url: config.api_url.trim_end_matches('/').to_string(),
            cluster_id: config.cluster_id.clone(),
        })
    }

    fn events_url(&self) -> String {
        format!(
            "{}/v1/kubernetes/external-clusters/{}/events",
            self.api_url, self.cluster_id
        )
    }
}

#[async_trait]
impl CloudEventSender for CastClient {
    async fn send_cloud_event(&self, req: &CloudEventRequest) -> Result<(), CastError> {
        let url = self.events_url();
        tracing::debug!(%url, node_id = %req.node_id, event_type = ?req.event_type, "Sending cloud event");

        let response = self.client.post(&url).json(req).send().await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(CastError::Status { status, body });
        }

        Ok(())
    }
}
