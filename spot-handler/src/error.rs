use spot_handler_castai::CastError;

use crate::RetryError;

#[derive(Debug, thiserror::Error)]
pub enum TaintError {
    #[error("fetching node {node:?}")]
    GetNode {
        node: String,
        #[source]
        source: kube::Error,
    },

    #[error("serializing node")]
    Serialize(#[from] serde_json::Error),

    #[error("patching node unschedulable")]
    Patch(#[source] RetryError<kube::Error>),

    #[error("node update canceled")]
    Canceled,
}

/// Failure of the reaction sequence. Always fatal for the handler.
#[derive(Debug, thiserror::Error)]
pub enum HandlerError {
    #[error("fetching node {node:?}")]
    GetNode {
        node: String,
        #[source]
        source: kube::Error,
    },

    #[error("sending interrupted event")]
    SendEvent(#[source] CastError),

    #[error("tainting node")]
    Taint(#[from] TaintError),

    #[error("interruption handling canceled")]
    Canceled,
}

impl TaintError {
    pub fn is_canceled(&self) -> bool {
        matches!(self, Self::Canceled | Self::Patch(RetryError::Canceled))
    }
}

impl HandlerError {
    /// True when the sequence stopped only because shutdown was requested.
    pub fn is_canceled(&self) -> bool {
        match self {
            Self::Canceled => true,
            Self::Taint(err) => err.is_canceled(),
            Self::GetNode { .. } | Self::SendEvent(_) => false,
        }
    }
}
