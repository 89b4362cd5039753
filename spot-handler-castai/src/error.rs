use reqwest::StatusCode;
use reqwest::header::InvalidHeaderValue;

#[derive(Debug, thiserror::Error)]
pub enum CastError {
    #[error("invalid API key")]
    InvalidApiKey(#[source] InvalidHeaderValue),

    #[error("sending spot interrupt: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("sending spot interrupt: request error status_code={status} body={body}")]
    Status { status: StatusCode, body: String },
}

impl CastError {
    /// HTTP status returned by the API, when the request got that far.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            Self::Status { status, .. } => Some(*status),
            Self::Transport(err) => err.status(),
            Self::InvalidApiKey(_) => None,
        }
    }
}
